//! # cborpool-core
//!
//! Core types, traits, and error definitions for cborpool.
//!
//! This crate provides:
//! - The `Engine` trait, the seam between encoders and the wire format
//! - `ProxyWriter`, the per-call output redirection used by engines
//! - Schema mapping (`Atlas`, `AtlasEntry`, `KeySortMode`)
//! - Error types (`EncodeError`)

mod atlas;
mod engine;
mod error;
mod proxy;

pub use atlas::{Atlas, AtlasEntry, KeySortMode};
pub use engine::Engine;
pub use error::EncodeError;
pub use proxy::ProxyWriter;
