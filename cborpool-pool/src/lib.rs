//! # cborpool-pool
//!
//! Thread-safe pooling of reusable marshallers.
//!
//! This crate provides:
//! - `MarshallerPool` - Fixed-size pool with blocking checkout
//! - `PooledMarshaller` - Checkout guard that returns its marshaller on drop
//! - `PoolConfig` - Pool sizing and buffer settings

mod config;
mod pool;

pub use config::PoolConfig;
pub use pool::{MarshallerPool, PoolStats, PooledMarshaller};
