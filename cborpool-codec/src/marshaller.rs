//! Reusable single-owner marshaller.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use cborpool_core::{Engine, ProxyWriter};

use crate::cbor::CborEngine;

/// Default initial capacity for buffers returned by [`Marshaller::marshal`].
pub const DEFAULT_BUFFER_CAPACITY: usize = 256;

/// A long-lived encoder that owns one engine.
///
/// The engine is built once, in [`Marshaller::new`], and every call redirects
/// its output to the destination the caller passes in. A marshaller is not
/// internally synchronized; share it through a pool rather than a lock.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use cborpool_codec::Marshaller;
/// use cborpool_core::Atlas;
///
/// let mut marshaller: Marshaller = Marshaller::new(Arc::new(Atlas::open()));
///
/// let bytes = marshaller.marshal("hi").unwrap();
/// assert_eq!(bytes, [0x62, b'h', b'i']);
///
/// let mut out = Vec::new();
/// marshaller.encode(&true, &mut out).unwrap();
/// assert_eq!(out, [0xf5]);
/// ```
pub struct Marshaller<E: Engine = CborEngine> {
    engine: E,
    schema: Arc<E::Schema>,
    buffer_capacity: usize,
}

impl<E: Engine> Marshaller<E> {
    /// Create a marshaller whose engine is bound to `schema`.
    #[must_use]
    pub fn new(schema: Arc<E::Schema>) -> Self {
        Self {
            engine: E::new(Arc::clone(&schema)),
            schema,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Set the initial capacity of buffers allocated by [`Marshaller::marshal`].
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Encode `value` to `dest`.
    ///
    /// The destination is only reachable from the engine for the duration of
    /// this call. Engine errors are returned unchanged.
    pub fn encode<T, W>(&mut self, value: &T, dest: &mut W) -> Result<(), E::Error>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        let mut proxy = ProxyWriter::bound(dest);
        let result = self.engine.marshal(value, &mut proxy);
        let written = proxy.release();

        match &result {
            Ok(()) => tracing::trace!(written, "Encoded value"),
            Err(e) => tracing::debug!(written, error = %e, "Encode failed"),
        }

        result
    }

    /// Encode `value` into a freshly allocated buffer.
    pub fn marshal<T>(&mut self, value: &T) -> Result<Vec<u8>, E::Error>
    where
        T: Serialize + ?Sized,
    {
        let mut buf = Vec::with_capacity(self.buffer_capacity);
        self.encode(value, &mut buf)?;
        Ok(buf)
    }

    /// The schema the engine was built with.
    #[must_use]
    pub fn schema(&self) -> &Arc<E::Schema> {
        &self.schema
    }

    /// Read access to the engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Initial capacity of buffers returned by [`Marshaller::marshal`].
    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }
}

impl<E: Engine> std::fmt::Debug for Marshaller<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marshaller")
            .field("engine", &std::any::type_name::<E>())
            .field("buffer_capacity", &self.buffer_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use cborpool_core::{Atlas, AtlasEntry, EncodeError};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        age: u32,
    }

    /// Fails after accepting `budget` bytes.
    struct Budget {
        data: Vec<u8>,
        budget: usize,
    }

    impl Write for Budget {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "budget spent"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record(name: &str, age: u32) -> Record {
        Record {
            name: name.to_string(),
            age,
        }
    }

    fn marshaller() -> Marshaller {
        Marshaller::new(Arc::new(Atlas::build([AtlasEntry::of::<Record>()])))
    }

    #[test]
    fn test_marshal_roundtrip() {
        let mut m = marshaller();
        let bytes = m.marshal(&record("a", 1)).unwrap();

        let decoded: Record = ciborium::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(decoded, record("a", 1));
    }

    #[test]
    fn test_marshal_uses_buffer_capacity() {
        let mut m = marshaller().with_buffer_capacity(4096);
        assert_eq!(m.buffer_capacity(), 4096);

        let bytes = m.marshal(&record("b", 2)).unwrap();
        assert!(bytes.capacity() >= 4096);
    }

    #[test]
    fn test_encode_appends_to_stream() {
        let mut m = marshaller();
        let mut out = Vec::new();

        m.encode(&record("a", 1), &mut out).unwrap();
        let first = out.len();
        m.encode(&record("b", 2), &mut out).unwrap();
        assert!(out.len() > first);

        // Two CBOR items back to back
        let mut reader = out.as_slice();
        let a: Record = ciborium::from_reader(&mut reader).unwrap();
        let b: Record = ciborium::from_reader(&mut reader).unwrap();
        assert_eq!(a, record("a", 1));
        assert_eq!(b, record("b", 2));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_encode_matches_marshal() {
        let mut m = marshaller();
        let mut out = Vec::new();

        m.encode(&record("c", 3), &mut out).unwrap();
        assert_eq!(out, m.marshal(&record("c", 3)).unwrap());
    }

    #[test]
    fn test_error_passes_through() {
        let mut m = marshaller();

        let err = m.marshal(&42u64).unwrap_err();
        assert!(matches!(err, EncodeError::UnregisteredType(name) if name == "u64"));
    }

    #[test]
    fn test_destinations_do_not_leak_between_calls() {
        let mut m = marshaller();
        let mut failing = Budget {
            data: Vec::new(),
            budget: 3,
        };

        let err = m.encode(&record("first", 1), &mut failing).unwrap_err();
        assert!(err.is_io());
        assert_eq!(failing.data.len(), 3);

        // The next call only touches its own destination
        let mut out = Vec::new();
        m.encode(&record("second", 2), &mut out).unwrap();
        assert_eq!(failing.data.len(), 3);

        let decoded: Record = ciborium::from_reader(out.as_slice()).unwrap();
        assert_eq!(decoded, record("second", 2));
    }

    #[test]
    fn test_shares_schema_with_engine() {
        let m = marshaller();
        assert!(Arc::ptr_eq(m.schema(), m.engine().atlas()));
        assert!(format!("{m:?}").contains("CborEngine"));
    }
}
