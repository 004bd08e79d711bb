//! Bounded pool of outgoing packet headers.
//!
//! Every packet the forwarder transmits holds one [`Lease`] until the face
//! drops it. When the pool is exhausted, packet construction fails and the
//! caller abandons that transmission.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct PoolInner {
    capacity: usize,
    in_use: AtomicUsize,
}

/// Fixed-capacity header pool, cheap to clone.
#[derive(Debug, Clone)]
pub struct HeaderPool {
    inner: Arc<PoolInner>,
}

impl HeaderPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                capacity,
                in_use: AtomicUsize::new(0),
            }),
        }
    }

    /// Take one header, or `None` if all are in use. Never blocks.
    pub fn try_alloc(&self) -> Option<Lease> {
        let cap = self.inner.capacity;
        self.inner
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < cap).then_some(n + 1))
            .ok()?;
        Some(Lease {
            pool: Arc::clone(&self.inner),
        })
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn in_use(&self) -> usize {
        self.inner.in_use.load(Ordering::Acquire)
    }
}

/// One allocated header, returned to its pool on drop.
pub struct Lease {
    pool: Arc<PoolInner>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.pool.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease").finish_non_exhaustive()
    }
}
