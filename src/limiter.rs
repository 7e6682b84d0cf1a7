use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting admission gate bounding how many tasks run at once.
///
/// Cloning shares the same gate. The limiter lives for the duration of
/// one gather call; acquisition suspends until a slot frees, and the
/// returned guard releases the slot on drop, success or panic alike.
#[derive(Debug, Clone)]
pub struct CapacityLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl CapacityLimiter {
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "capacity must be at least 1");
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> LimiterSlot {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("limiter semaphore is never closed");
        LimiterSlot { _permit: permit }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    #[inline]
    pub fn in_use(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

/// Held admission slot; dropping it releases the slot.
#[derive(Debug)]
pub struct LimiterSlot {
    _permit: OwnedSemaphorePermit,
}
