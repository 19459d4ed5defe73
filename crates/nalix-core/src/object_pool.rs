//! Type-keyed object pool for reusable, non-buffer allocations (packet
//! structs, connection scratch state, ...).
//!
//! Each concrete type gets its own bounded queue, created lazily on the
//! first `get`/`put` for that type. Capacity defaults to
//! [`DEFAULT_CAPACITY`] and can be overridden per type with
//! [`ObjectPool::set_capacity`] before first use.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use crossbeam_queue::ArrayQueue;

/// Default bound on a single type's queue.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A type poolable by [`ObjectPool`].
///
/// Implementors must return themselves to a state indistinguishable
/// from freshly constructed, so a caller pulling from the pool never
/// observes another caller's leftover data.
pub trait Poolable: Send + 'static {
    /// Reset all fields to their pool-default values.
    fn reset_for_pool(&mut self);
}

struct TypedQueue {
    queue: ArrayQueue<Box<dyn Any + Send>>,
}

/// A bounded, type-keyed pool of reusable objects.
pub struct ObjectPool {
    queues: RwLock<HashMap<TypeId, TypedQueue>>,
    capacities: Mutex<HashMap<TypeId, usize>>,
}

impl ObjectPool {
    /// Build an empty pool; per-type queues are created on first use.
    #[must_use]
    pub fn new() -> Self {
        Self { queues: RwLock::new(HashMap::new()), capacities: Mutex::new(HashMap::new()) }
    }

    /// Override the queue capacity for `T`. Must be called before the
    /// first `get::<T>()`/`put::<T>()`; later calls are ignored once the
    /// queue for `T` has already been created.
    pub fn set_capacity<T: Poolable>(&self, capacity: usize) {
        self.capacities.lock().unwrap_or_else(|e| e.into_inner()).insert(TypeId::of::<T>(), capacity);
    }

    fn capacity_for<T: Poolable>(&self) -> usize {
        self.capacities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&TypeId::of::<T>())
            .copied()
            .unwrap_or(DEFAULT_CAPACITY)
    }

    /// Take an object of type `T` from the pool, or `None` if its queue
    /// is empty or has not yet been created (callers fall back to
    /// constructing a fresh `T` in that case).
    pub fn get<T: Poolable>(&self) -> Option<T> {
        let queues = self.queues.read().unwrap_or_else(|e| e.into_inner());
        let typed = queues.get(&TypeId::of::<T>())?;
        let boxed = typed.queue.pop()?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    /// Return an object to the pool after resetting it. Dropped silently
    /// if the type's queue is full.
    pub fn put<T: Poolable>(&self, mut value: T) {
        value.reset_for_pool();

        {
            let queues = self.queues.read().unwrap_or_else(|e| e.into_inner());
            if let Some(typed) = queues.get(&TypeId::of::<T>()) {
                let _ = typed.queue.push(Box::new(value));
                return;
            }
        }

        let capacity = self.capacity_for::<T>();
        let mut queues = self.queues.write().unwrap_or_else(|e| e.into_inner());
        let typed = queues
            .entry(TypeId::of::<T>())
            .or_insert_with(|| TypedQueue { queue: ArrayQueue::new(capacity) });
        let _ = typed.queue.push(Box::new(value));
    }
}

impl Default for ObjectPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Scratch {
        value: u32,
    }

    impl Poolable for Scratch {
        fn reset_for_pool(&mut self) {
            self.value = 0;
        }
    }

    #[test]
    fn get_on_empty_pool_returns_none() {
        let pool = ObjectPool::new();
        assert!(pool.get::<Scratch>().is_none());
    }

    #[test]
    fn put_then_get_resets_state() {
        let pool = ObjectPool::new();
        pool.put(Scratch { value: 42 });

        let recycled = pool.get::<Scratch>().expect("should have recycled instance");
        assert_eq!(recycled.value, 0);
    }

    #[test]
    fn capacity_override_bounds_the_queue() {
        let pool = ObjectPool::new();
        pool.set_capacity::<Scratch>(1);
        pool.put(Scratch { value: 1 });
        pool.put(Scratch { value: 2 });

        assert!(pool.get::<Scratch>().is_some());
        assert!(pool.get::<Scratch>().is_none());
    }
}
