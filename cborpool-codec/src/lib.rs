//! # cborpool-codec
//!
//! ciborium-based CBOR encoding with reusable marshallers.
//!
//! This crate provides:
//! - `CborEngine` - `Engine` implementation honoring an `Atlas`
//! - `Marshaller` - Long-lived encoder that redirects one engine per call
//!
//! ## Encoding
//!
//! ```text
//! value --serde--> ciborium::Value --atlas--> tagged, key-sorted tree --> ProxyWriter --> destination
//! ```
//!
//! Building the engine is the expensive step; a marshaller does it once and
//! rebinds only the destination afterwards.

mod cbor;
mod marshaller;

pub use cbor::CborEngine;
pub use marshaller::{DEFAULT_BUFFER_CAPACITY, Marshaller};

// Re-export for convenience
pub use ciborium::Value;
