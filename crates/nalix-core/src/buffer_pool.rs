//! Size-classed buffer pool.
//!
//! Size classes double starting at `min_class` up to `max_class`. Each
//! class has its own bounded MPMC queue; renting picks the smallest
//! class that fits the request and falls back to a fresh allocation on
//! a queue miss, so the pool behaves as a cache rather than a hard cap
//! on buffers in flight.

use bytes::BytesMut;
use crossbeam_queue::ArrayQueue;
use tracing::{debug, trace};

/// Smallest size class, in bytes.
pub const DEFAULT_MIN_CLASS: usize = 256;

/// Largest size class, in bytes. Bounded by the protocol's `u16` frame
/// length so a rented buffer can always hold one maximal frame.
pub const DEFAULT_MAX_CLASS: usize = 64 * 1024;

/// Buffers cached per size class before renting falls back to a fresh
/// allocation.
pub const DEFAULT_CLASS_CAPACITY: usize = 256;

struct SizeClass {
    size: usize,
    queue: ArrayQueue<BytesMut>,
}

/// A pool of reusable, power-of-two sized byte buffers.
pub struct BufferPool {
    classes: Vec<SizeClass>,
}

impl BufferPool {
    /// Build a pool spanning `[min_class, max_class]`, doubling at each
    /// step, each class backed by a queue of `class_capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `min_class` is zero, `max_class < min_class`, or
    /// `max_class` exceeds `u16::MAX` (the largest frame the wire
    /// format can describe).
    #[must_use]
    pub fn new(min_class: usize, max_class: usize, class_capacity: usize) -> Self {
        assert!(min_class > 0, "min_class must be nonzero");
        assert!(max_class >= min_class, "max_class must be >= min_class");
        assert!(max_class <= u16::MAX as usize, "max_class must fit in a u16 frame length");

        let mut classes = Vec::new();
        let mut size = min_class.next_power_of_two();
        while size <= max_class {
            classes.push(SizeClass { size, queue: ArrayQueue::new(class_capacity) });
            size *= 2;
        }
        debug!(class_count = classes.len(), min_class, max_class, class_capacity, "buffer pool constructed");
        Self { classes }
    }

    /// Build a pool using the documented defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_MIN_CLASS, DEFAULT_MAX_CLASS, DEFAULT_CLASS_CAPACITY)
    }

    /// Rent a buffer able to hold at least `min_size` bytes, cleared of
    /// stale contents. Falls back to a fresh allocation of the matching
    /// size class if its queue is currently empty, or if `min_size`
    /// exceeds every configured class (the buffer is then sized exactly
    /// to `min_size`, not rounded up, and will not be pooled on return).
    #[must_use]
    pub fn rent(&self, min_size: usize) -> BytesMut {
        let Some(class) = self.classes.iter().find(|c| c.size >= min_size) else {
            trace!(min_size, "buffer pool miss: request exceeds largest size class, allocating exact");
            return BytesMut::with_capacity(min_size);
        };
        match class.queue.pop() {
            Some(mut buf) => {
                buf.clear();
                buf
            }
            None => {
                trace!(class_size = class.size, "buffer pool miss: class queue empty, allocating fresh");
                BytesMut::with_capacity(class.size)
            }
        }
    }

    /// Return a buffer to the pool. Silently dropped if it does not
    /// match one of the configured class sizes, or if that class's
    /// queue is full.
    pub fn release(&self, buf: BytesMut) {
        if let Some(class) = self.classes.iter().rev().find(|c| c.size <= buf.capacity()) {
            let _ = class.queue.push(buf);
        }
    }

    /// The configured size classes, smallest first.
    #[must_use]
    pub fn classes(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.size).collect()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_double_from_min_to_max() {
        let pool = BufferPool::new(256, 1024, 4);
        assert_eq!(pool.classes(), vec![256, 512, 1024]);
    }

    #[test]
    fn rent_picks_smallest_fitting_class() {
        let pool = BufferPool::new(256, 1024, 4);
        let buf = pool.rent(300);
        assert_eq!(buf.capacity(), 512);
    }

    #[test]
    fn rent_beyond_max_class_falls_back_to_exact_allocation() {
        let pool = BufferPool::new(256, 1024, 4);
        let buf = pool.rent(4096);
        assert_eq!(buf.capacity(), 4096);
    }

    #[test]
    fn released_buffer_is_reused() {
        let pool = BufferPool::new(256, 1024, 4);
        let mut buf = pool.rent(256);
        buf.extend_from_slice(b"stale");
        pool.release(buf);

        let reused = pool.rent(256);
        assert!(reused.is_empty(), "rented buffer must be cleared of stale contents");
    }

    #[test]
    fn pool_is_a_cache_not_a_hard_cap() {
        let pool = BufferPool::new(256, 256, 1);
        let a = pool.rent(256);
        let b = pool.rent(256);
        assert_eq!(a.capacity(), 256);
        assert_eq!(b.capacity(), 256);
    }
}
