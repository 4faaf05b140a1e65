//! Output redirection for long-lived engines.

use std::fmt;
use std::io::{self, Write};

/// A rebindable `io::Write` adapter.
///
/// An engine always writes into a `ProxyWriter`, never into the caller's
/// destination directly. The marshaller binds the destination right before the
/// engine runs and releases it right after, so the same engine can serve a
/// different destination on every call.
///
/// The lifetime ties the binding to the call that supplied the destination:
/// once the proxy is dropped or released, nothing can reach the destination
/// through it.
///
/// ## Example
///
/// ```rust
/// use std::io::Write;
/// use cborpool_core::ProxyWriter;
///
/// let mut out = Vec::new();
/// let mut proxy = ProxyWriter::bound(&mut out);
/// proxy.write_all(b"abc").unwrap();
/// assert_eq!(proxy.release(), 3);
/// assert!(!proxy.is_bound());
/// assert_eq!(out, b"abc");
/// ```
#[derive(Default)]
pub struct ProxyWriter<'a> {
    target: Option<&'a mut dyn Write>,
    written: u64,
}

impl<'a> ProxyWriter<'a> {
    /// Create a proxy with no destination.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Create a proxy bound to `target`.
    #[must_use]
    pub fn bound(target: &'a mut dyn Write) -> Self {
        Self {
            target: Some(target),
            written: 0,
        }
    }

    /// Redirect subsequent writes to `target`.
    ///
    /// Any previous destination is dropped and the byte count restarts.
    pub fn bind(&mut self, target: &'a mut dyn Write) {
        self.target = Some(target);
        self.written = 0;
    }

    /// Clear the destination and return how many bytes it accepted.
    pub fn release(&mut self) -> u64 {
        self.target = None;
        std::mem::take(&mut self.written)
    }

    /// Check if a destination is bound.
    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    /// Bytes accepted by the current destination since it was bound.
    #[inline]
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    fn target(&mut self) -> io::Result<&mut (dyn Write + 'a)> {
        self.target.as_deref_mut().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotConnected,
                "proxy writer has no destination",
            )
        })
    }
}

impl Write for ProxyWriter<'_> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.target()?.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.target()?.flush()
    }
}

impl fmt::Debug for ProxyWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyWriter")
            .field("bound", &self.is_bound())
            .field("written", &self.written)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts at most `limit` bytes per write call.
    struct Trickle {
        data: Vec<u8>,
        limit: usize,
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_forwards_verbatim() {
        let mut out = Vec::new();
        let mut proxy = ProxyWriter::bound(&mut out);

        proxy.write_all(b"hello, ").unwrap();
        proxy.write_all(b"world").unwrap();
        proxy.flush().unwrap();
        assert_eq!(proxy.bytes_written(), 12);

        drop(proxy);
        assert_eq!(out, b"hello, world");
    }

    #[test]
    fn test_counts_accepted_bytes() {
        let mut sink = Trickle {
            data: Vec::new(),
            limit: 2,
        };
        let mut proxy = ProxyWriter::bound(&mut sink);

        // Short writes are reported as-is
        assert_eq!(proxy.write(b"abcde").unwrap(), 2);
        assert_eq!(proxy.bytes_written(), 2);

        proxy.write_all(b"cde").unwrap();
        assert_eq!(proxy.release(), 5);
        assert_eq!(sink.data, b"abcde");
    }

    #[test]
    fn test_detached_write_fails() {
        let mut proxy = ProxyWriter::detached();
        assert!(!proxy.is_bound());

        let err = proxy.write(b"lost").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert_eq!(proxy.flush().unwrap_err().kind(), io::ErrorKind::NotConnected);
        assert_eq!(proxy.bytes_written(), 0);
    }

    #[test]
    fn test_release_clears_target() {
        let mut out = Vec::new();
        let mut proxy = ProxyWriter::bound(&mut out);
        proxy.write_all(b"one").unwrap();

        assert_eq!(proxy.release(), 3);
        assert!(!proxy.is_bound());
        assert_eq!(proxy.bytes_written(), 0);
        assert!(proxy.write(b"two").is_err());

        drop(proxy);
        assert_eq!(out, b"one");
    }

    #[test]
    fn test_rebind() {
        let mut first = Vec::new();
        let mut second = Vec::new();

        {
            let mut proxy = ProxyWriter::detached();
            proxy.bind(&mut first);
            proxy.write_all(b"A").unwrap();
            proxy.bind(&mut second);
            assert_eq!(proxy.bytes_written(), 0);
            proxy.write_all(b"BB").unwrap();
            assert_eq!(proxy.release(), 2);
        }

        assert_eq!(first, b"A");
        assert_eq!(second, b"BB");
    }
}
