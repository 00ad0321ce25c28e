//! Reusable distance buffers keyed by side length.
//!
//! Validation builds one small distance grid per call. The pool keeps the
//! backing allocations around between calls. A checked-out buffer is owned
//! by its caller until the guard drops, so concurrent validations never
//! share a buffer mid-reset.

use crate::distance::DistanceBuffer;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Idle buffers kept per side length.
const MAX_IDLE_PER_SIDE: usize = 8;

#[derive(Debug)]
pub struct DistanceBufferPool {
    max_side: usize,
    free: Mutex<BTreeMap<usize, Vec<DistanceBuffer>>>,
}

impl DistanceBufferPool {
    /// A pool handing out buffers of at most `max_side` on a side.
    pub fn new(max_side: usize) -> Self {
        Self {
            max_side: max_side.max(1),
            free: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn max_side(&self) -> usize {
        self.max_side
    }

    /// The side a request for `side` will actually get.
    pub fn clamp_side(&self, side: usize) -> usize {
        side.clamp(1, self.max_side)
    }

    /// Take a reset buffer of (clamped) side `side`.
    ///
    /// Oversized requests are clamped to [`max_side`](Self::max_side), never
    /// rejected.
    pub fn checkout(&self, side: usize) -> PooledBuffer<'_> {
        let side = self.clamp_side(side);
        let reused = self.lock().get_mut(&side).and_then(Vec::pop);
        let buffer = match reused {
            Some(mut buffer) => {
                buffer.reset();
                buffer
            }
            None => {
                tracing::trace!(side, "allocating distance buffer");
                DistanceBuffer::new(side)
            }
        };
        PooledBuffer { pool: self, buffer }
    }

    /// Buffers currently waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    fn give_back(&self, buffer: DistanceBuffer) {
        let mut free = self.lock();
        let list = free.entry(buffer.side()).or_default();
        if list.len() < MAX_IDLE_PER_SIDE {
            list.push(buffer);
        }
    }

    // A panic while holding the lock cannot leave a free list half-written,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<usize, Vec<DistanceBuffer>>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive handle to a pooled buffer; returns it to the pool on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a DistanceBufferPool,
    buffer: DistanceBuffer,
}

impl Deref for PooledBuffer<'_> {
    type Target = DistanceBuffer;

    fn deref(&self) -> &DistanceBuffer {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut DistanceBuffer {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        if buffer.side() > 0 {
            self.pool.give_back(buffer);
        }
    }
}
