//! Pool configuration.

use cborpool_codec::DEFAULT_BUFFER_CAPACITY;

/// Pool size used when the available parallelism cannot be determined.
const FALLBACK_CAPACITY: usize = 4;

/// Configuration for a marshaller pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of marshallers built up front. Fixed for the pool's lifetime.
    pub capacity: usize,

    /// Initial capacity of buffers returned by `marshal`.
    pub buffer_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_CAPACITY),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of pooled marshallers.
    ///
    /// A capacity of zero is accepted; every checkout on such a pool waits
    /// forever.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the initial capacity of marshalled buffers.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::new();
        assert!(config.capacity >= 1);
        assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn test_builder() {
        let config = PoolConfig::default().capacity(0).buffer_capacity(1024);
        assert_eq!(
            config,
            PoolConfig {
                capacity: 0,
                buffer_capacity: 1024,
            }
        );
    }
}
