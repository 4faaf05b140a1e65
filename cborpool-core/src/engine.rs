//! The encoding engine seam.
//!
//! An `Engine` is the stateful machinery that turns values into bytes. It is
//! expensive enough to build that encoders keep one alive and redirect its
//! output instead of rebuilding it per call.

use std::sync::Arc;

use serde::Serialize;

use crate::proxy::ProxyWriter;

/// A stateful, schema-bound encoder.
///
/// Implementations are built once per marshaller and reused for every value
/// that marshaller encodes. An engine is never used by two callers at once,
/// so `marshal` takes `&mut self` and implementations need no locking.
///
/// # Example
///
/// ```rust
/// use std::io::Write;
/// use std::sync::Arc;
///
/// use cborpool_core::{Engine, ProxyWriter};
/// use serde::Serialize;
///
/// /// Writes a fixed banner before every value.
/// struct Banner {
///     banner: Arc<String>,
/// }
///
/// impl Engine for Banner {
///     type Schema = String;
///     type Error = std::io::Error;
///
///     fn new(schema: Arc<String>) -> Self {
///         Self { banner: schema }
///     }
///
///     fn marshal<T>(&mut self, _value: &T, out: &mut ProxyWriter<'_>) -> Result<(), Self::Error>
///     where
///         T: Serialize + ?Sized,
///     {
///         out.write_all(self.banner.as_bytes())
///     }
/// }
/// ```
pub trait Engine: Send + Sized + 'static {
    /// Schema mapping shared read-only by every engine built from it.
    type Schema: Send + Sync + 'static;

    /// Error reported when a value cannot be encoded.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build an engine bound to `schema`.
    fn new(schema: Arc<Self::Schema>) -> Self;

    /// Encode `value` into `out`.
    ///
    /// `out` is bound to the caller's destination for the duration of the
    /// call. A failure must leave the engine usable for the next value.
    fn marshal<T>(&mut self, value: &T, out: &mut ProxyWriter<'_>) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized;
}
