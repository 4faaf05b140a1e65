//! # cborpool
//!
//! Pooled, reusable CBOR marshallers for multi-threaded encoders.
//!
//! cborpool provides:
//! - **Reusable marshallers** that keep their encoding engine alive and only
//!   redirect the output destination per call
//! - **A bounded pool** that hands each caller exclusive use of one marshaller
//!   and blocks while all are busy
//! - **Schema mapping** through an [`Atlas`]: registered types, semantic tags,
//!   and canonical map key ordering
//! - **A pluggable engine seam** ([`Engine`]) with a ciborium-backed default
//!
//! ## Quick Start
//!
//! ```rust
//! use cborpool::prelude::*;
//!
//! #[derive(Serialize)]
//! struct Record {
//!     name: String,
//!     age: u32,
//! }
//!
//! let atlas = Atlas::build([AtlasEntry::of::<Record>()]).with_key_sort(KeySortMode::LengthFirst);
//! let pool: MarshallerPool = MarshallerPool::new(PoolConfig::new().capacity(4), atlas);
//!
//! // Encode to a fresh buffer
//! let bytes = pool.marshal(&Record { name: "a".into(), age: 1 }).unwrap();
//!
//! // Or to any writer
//! let mut out = Vec::new();
//! pool.encode(&Record { name: "a".into(), age: 1 }, &mut out).unwrap();
//! assert_eq!(bytes, out);
//! ```
//!
//! ## Architecture
//!
//! cborpool is composed of several crates:
//!
//! - [`cborpool-core`] - Engine trait, output redirection, atlas, and errors
//! - [`cborpool-codec`] - ciborium engine and the reusable `Marshaller`
//! - [`cborpool-pool`] - `MarshallerPool` and its configuration

// Re-export core types
pub use cborpool_core::{Atlas, AtlasEntry, EncodeError, Engine, KeySortMode, ProxyWriter};

// Re-export codec
pub use cborpool_codec::{CborEngine, DEFAULT_BUFFER_CAPACITY, Marshaller, Value};

// Re-export pool
pub use cborpool_pool::{MarshallerPool, PoolConfig, PoolStats, PooledMarshaller};

// Re-export serde for user convenience
pub use serde::Serialize;

/// Prelude module for convenient imports.
///
/// ```rust
/// use cborpool::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Atlas, AtlasEntry, EncodeError, KeySortMode, MarshallerPool, PoolConfig, Serialize,
    };

    pub use cborpool_core::Engine;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
