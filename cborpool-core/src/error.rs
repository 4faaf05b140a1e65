//! Error types for cborpool encoders.

use std::sync::Arc;

/// Error produced while encoding a value.
///
/// This is the only error class the encoders recognize. The marshaller and the
/// pool hand it back to the caller exactly as the engine produced it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EncodeError {
    /// The atlas has no entry for the top-level type being encoded
    #[error("no atlas entry for type {0}")]
    UnregisteredType(&'static str),

    /// The value could not be represented in the wire format
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The destination rejected a write
    #[error("io error: {0}")]
    Io(Arc<std::io::Error>),
}

impl From<std::io::Error> for EncodeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

impl EncodeError {
    /// Create a serialization error from any displayable message.
    #[must_use]
    pub fn serialization(message: impl std::fmt::Display) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Check if the destination caused this error.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Check if the atlas rejected the value's type.
    #[must_use]
    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::UnregisteredType(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EncodeError::UnregisteredType("app::Record");
        assert_eq!(err.to_string(), "no atlas entry for type app::Record");

        let err = EncodeError::serialization("integer out of range");
        assert_eq!(err.to_string(), "serialization error: integer out of range");
    }

    #[test]
    fn test_io_conversion() {
        let err: EncodeError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer went away").into();
        assert!(err.is_io());
        assert!(!err.is_unregistered());
        assert_eq!(err.to_string(), "io error: peer went away");
    }

    #[test]
    fn test_source_chain() {
        let err: EncodeError = std::io::Error::other("disk full").into();
        assert!(std::error::Error::source(&err).is_none());

        // Clone shares the underlying io error
        let copy = err.clone();
        match (&err, &copy) {
            (EncodeError::Io(a), EncodeError::Io(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => unreachable!(),
        }
    }
}
