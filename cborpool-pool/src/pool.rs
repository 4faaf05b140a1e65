//! Bounded pool of reusable marshallers.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;

use cborpool_codec::{CborEngine, Marshaller};
use cborpool_core::Engine;

use crate::config::PoolConfig;

/// A marshaller checked out of a pool.
///
/// The guard has exclusive use of the marshaller and hands it back to the
/// pool when dropped, including during unwinding.
///
/// Passing the guard to [`std::mem::forget`] (or leaking it in a reference
/// cycle) takes its marshaller out of the pool for good: the pool does not
/// rebuild it, and [`PoolStats::in_use`] keeps counting it. Use
/// [`MarshallerPool::marshal`] or [`MarshallerPool::encode`] when the guard
/// does not need to outlive one call.
pub struct PooledMarshaller<E: Engine = CborEngine> {
    marshaller: Option<Marshaller<E>>,
    pool: Arc<MarshallerPoolInner<E>>,
}

impl<E: Engine> std::ops::Deref for PooledMarshaller<E> {
    type Target = Marshaller<E>;

    fn deref(&self) -> &Self::Target {
        self.marshaller.as_ref().expect("marshaller already released")
    }
}

impl<E: Engine> std::ops::DerefMut for PooledMarshaller<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.marshaller.as_mut().expect("marshaller already released")
    }
}

impl<E: Engine> Drop for PooledMarshaller<E> {
    fn drop(&mut self) {
        if let Some(marshaller) = self.marshaller.take() {
            self.pool.release(marshaller);
        }
    }
}

struct IdleSet<E: Engine> {
    marshallers: Vec<Marshaller<E>>,
    checked_out: usize,
}

struct MarshallerPoolInner<E: Engine> {
    idle: Mutex<IdleSet<E>>,
    returned: Condvar,
    schema: Arc<E::Schema>,
    capacity: usize,
    checkouts: AtomicU64,
    waits: AtomicU64,
}

impl<E: Engine> MarshallerPoolInner<E> {
    fn checkout(&self) -> Marshaller<E> {
        let mut idle = self.idle.lock();
        if idle.marshallers.is_empty() {
            self.waits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(capacity = self.capacity, "Waiting for an idle marshaller");
        }

        loop {
            if let Some(marshaller) = idle.marshallers.pop() {
                idle.checked_out += 1;
                self.checkouts.fetch_add(1, Ordering::Relaxed);
                return marshaller;
            }
            self.returned.wait(&mut idle);
        }
    }

    fn release(&self, marshaller: Marshaller<E>) {
        let mut idle = self.idle.lock();
        debug_assert!(idle.checked_out > 0, "released a marshaller that was not checked out");
        idle.checked_out -= 1;
        idle.marshallers.push(marshaller);
        drop(idle);
        self.returned.notify_one();
    }
}

/// Fixed-size pool of marshallers sharing one schema.
///
/// Every marshaller is built when the pool is, and the pool never grows,
/// shrinks, or rebuilds them. Callers get exclusive use of one marshaller per
/// call and block while all of them are busy. There is no acquire timeout;
/// wrap the call if you need one.
///
/// The schema is fixed at construction. To encode with a different atlas,
/// build a new pool.
///
/// ## Example
///
/// ```rust
/// use cborpool_core::{Atlas, AtlasEntry};
/// use cborpool_pool::{MarshallerPool, PoolConfig};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Record {
///     name: String,
///     age: u32,
/// }
///
/// let atlas = Atlas::build([AtlasEntry::of::<Record>()]);
/// let pool: MarshallerPool = MarshallerPool::new(PoolConfig::new().capacity(2), atlas);
///
/// let bytes = pool
///     .marshal(&Record { name: "a".into(), age: 1 })
///     .unwrap();
/// assert!(!bytes.is_empty());
/// assert_eq!(pool.available(), 2);
/// ```
pub struct MarshallerPool<E: Engine = CborEngine> {
    inner: Arc<MarshallerPoolInner<E>>,
}

impl<E: Engine> MarshallerPool<E> {
    /// Create a pool and build every marshaller up front.
    #[must_use]
    pub fn new(config: PoolConfig, schema: impl Into<Arc<E::Schema>>) -> Self {
        let schema = schema.into();
        let marshallers = (0..config.capacity)
            .map(|_| {
                Marshaller::new(Arc::clone(&schema)).with_buffer_capacity(config.buffer_capacity)
            })
            .collect();

        tracing::debug!(
            capacity = config.capacity,
            buffer_capacity = config.buffer_capacity,
            engine = std::any::type_name::<E>(),
            "Marshaller pool initialized"
        );

        Self {
            inner: Arc::new(MarshallerPoolInner {
                idle: Mutex::new(IdleSet {
                    marshallers,
                    checked_out: 0,
                }),
                returned: Condvar::new(),
                schema,
                capacity: config.capacity,
                checkouts: AtomicU64::new(0),
                waits: AtomicU64::new(0),
            }),
        }
    }

    /// Create a pool of `capacity` marshallers with default buffer settings.
    #[must_use]
    pub fn with_capacity(capacity: usize, schema: impl Into<Arc<E::Schema>>) -> Self {
        Self::new(PoolConfig::new().capacity(capacity), schema)
    }

    /// Take exclusive use of an idle marshaller, waiting for one if needed.
    ///
    /// On a pool with zero capacity this never returns. The marshaller comes
    /// back when the guard is dropped; a forgotten guard loses it.
    #[must_use]
    pub fn checkout(&self) -> PooledMarshaller<E> {
        PooledMarshaller {
            marshaller: Some(self.inner.checkout()),
            pool: Arc::clone(&self.inner),
        }
    }

    /// Encode `value` into a new buffer using a pooled marshaller.
    ///
    /// The marshaller goes back to the pool before this returns, whether or
    /// not encoding succeeded.
    pub fn marshal<T>(&self, value: &T) -> Result<Vec<u8>, E::Error>
    where
        T: Serialize + ?Sized,
    {
        self.checkout().marshal(value)
    }

    /// Encode `value` to `dest` using a pooled marshaller.
    ///
    /// The marshaller goes back to the pool before this returns, whether or
    /// not encoding succeeded.
    pub fn encode<T, W>(&self, value: &T, dest: &mut W) -> Result<(), E::Error>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        self.checkout().encode(value, dest)
    }

    /// Number of marshallers the pool owns.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of marshallers currently idle.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.idle.lock().marshallers.len()
    }

    /// The schema every marshaller in the pool was built with.
    #[must_use]
    pub fn schema(&self) -> &Arc<E::Schema> {
        &self.inner.schema
    }

    /// Get a snapshot of pool usage.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let (idle, in_use) = {
            let set = self.inner.idle.lock();
            (set.marshallers.len(), set.checked_out)
        };

        PoolStats {
            capacity: self.inner.capacity,
            idle,
            in_use,
            checkouts: self.inner.checkouts.load(Ordering::Relaxed),
            waits: self.inner.waits.load(Ordering::Relaxed),
        }
    }
}

impl<E: Engine> Clone for MarshallerPool<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Engine> std::fmt::Debug for MarshallerPool<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarshallerPool")
            .field("capacity", &self.inner.capacity)
            .field("available", &self.available())
            .finish()
    }
}

/// Usage snapshot for a marshaller pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Marshallers owned by the pool.
    pub capacity: usize,
    /// Marshallers idle at the time of the snapshot.
    pub idle: usize,
    /// Marshallers checked out at the time of the snapshot.
    ///
    /// Counted separately from `idle`, both read under one lock, so
    /// `idle + in_use == capacity` holds for every snapshot unless a
    /// marshaller was lost.
    pub in_use: usize,
    /// Successful checkouts since the pool was built.
    pub checkouts: u64,
    /// Checkouts that found no idle marshaller and had to wait.
    pub waits: u64,
}
