//! Least-recently-used cache of payload reads.
//!
//! Payloads are keyed by a 128-bit hash of (scene source, path, time), so
//! adapters reading the same location at the same time share one copy.
//! The pool tracks an approximate memory footprint and evicts the least
//! recently used entries once it exceeds its budget.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use crate::errors::Result;
use crate::scene::{SceneInterface, SceneObject, ScenePath};

/// Budget of the process-wide pool, in bytes.
pub const DEFAULT_MAX_SIZE: usize = 500 * 1024 * 1024;

/// Cache key of one payload read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey(u128);

impl PoolKey {
    #[must_use]
    pub fn new(source: u64, path: &ScenePath, time: f64) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(&source.to_le_bytes());
        for segment in path.segments() {
            hasher.update(&(segment.len() as u64).to_le_bytes());
            hasher.update(segment.as_bytes());
        }
        hasher.update(&time.to_le_bytes());
        Self(hasher.digest128())
    }
}

#[derive(Debug)]
struct Entry {
    object: Arc<SceneObject>,
    size: usize,
    last_used: u64,
}

#[derive(Debug, Default)]
struct PoolState {
    entries: FxHashMap<PoolKey, Entry>,
    current_size: usize,
    max_size: usize,
    tick: u64,
}

impl PoolState {
    fn evict_until(&mut self, target: usize) {
        while self.current_size > target {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| *key)
            else {
                break;
            };
            if let Some(entry) = self.entries.remove(&oldest) {
                self.current_size -= entry.size;
            }
        }
    }
}

#[derive(Debug)]
pub struct ObjectPool {
    state: Mutex<PoolState>,
}

impl ObjectPool {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            state: Mutex::new(PoolState {
                max_size,
                ..Default::default()
            }),
        }
    }

    pub fn get(&self, key: PoolKey) -> Option<Arc<SceneObject>> {
        let mut state = self.state.lock();
        state.tick += 1;
        let tick = state.tick;
        state.entries.get_mut(&key).map(|entry| {
            entry.last_used = tick;
            Arc::clone(&entry.object)
        })
    }

    /// Stores `object`, evicting older entries as needed. Objects larger
    /// than the whole budget are not stored.
    pub fn insert(&self, key: PoolKey, object: Arc<SceneObject>) {
        let size = object.memory_usage();
        let mut state = self.state.lock();
        if size > state.max_size {
            return;
        }
        state.tick += 1;
        let last_used = state.tick;
        if let Some(previous) = state.entries.insert(
            key,
            Entry {
                object,
                size,
                last_used,
            },
        ) {
            state.current_size -= previous.size;
        }
        state.current_size += size;
        let max = state.max_size;
        state.evict_until(max);
    }

    /// Reads the payload at `location` through the pool.
    ///
    /// Readers without a source id bypass the cache.
    pub fn read_object(
        &self,
        location: &dyn SceneInterface,
        time: f64,
    ) -> Result<Option<Arc<SceneObject>>> {
        let Some(source) = location.source_id() else {
            return location.read_object(time);
        };
        let key = PoolKey::new(source, &location.path(), time);
        if let Some(hit) = self.get(key) {
            return Ok(Some(hit));
        }
        let object = location.read_object(time)?;
        if let Some(object) = &object {
            self.insert(key, Arc::clone(object));
        }
        Ok(object)
    }

    #[must_use]
    pub fn current_size(&self) -> usize {
        self.state.lock().current_size
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        self.state.lock().max_size
    }

    /// Changes the budget, evicting immediately if it shrank.
    pub fn set_max_size(&self, max_size: usize) {
        let mut state = self.state.lock();
        state.max_size = max_size;
        state.evict_until(max_size);
    }

    /// Evicts least recently used entries until at least `amount` bytes
    /// have been released or the pool is empty.
    pub fn reduce_by(&self, amount: usize) {
        let mut state = self.state.lock();
        let target = state.current_size.saturating_sub(amount);
        state.evict_until(target);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.current_size = 0;
    }
}

impl Default for ObjectPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

/// The process-wide pool shared by all adapters.
pub fn default_pool() -> Arc<ObjectPool> {
    static POOL: OnceLock<Arc<ObjectPool>> = OnceLock::new();
    Arc::clone(POOL.get_or_init(|| Arc::new(ObjectPool::default())))
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::{MemorySceneBuilder, MissingBehaviour, PointsPrimitive};

    fn points(count: usize) -> Arc<SceneObject> {
        Arc::new(SceneObject::Points(PointsPrimitive::new(vec![Vec3::ZERO; count])))
    }

    fn key(name: &str) -> PoolKey {
        PoolKey::new(1, &ScenePath::parse(name), 0.0)
    }

    #[test]
    fn evicts_least_recently_used() {
        let one = points(10).memory_usage();
        let pool = ObjectPool::new(one * 2);
        pool.insert(key("/a"), points(10));
        pool.insert(key("/b"), points(10));
        assert!(pool.get(key("/a")).is_some());

        pool.insert(key("/c"), points(10));
        assert_eq!(pool.len(), 2);
        assert!(pool.get(key("/b")).is_none());
        assert!(pool.get(key("/a")).is_some());
        assert_eq!(pool.current_size(), one * 2);
    }

    #[test]
    fn reduce_and_resize() {
        let one = points(4).memory_usage();
        let pool = ObjectPool::new(one * 10);
        for name in ["/a", "/b", "/c", "/d"] {
            pool.insert(key(name), points(4));
        }
        pool.reduce_by(one);
        assert_eq!(pool.len(), 3);
        assert!(pool.get(key("/a")).is_none());

        pool.set_max_size(one);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.max_size(), one);
        assert!(pool.get(key("/d")).is_some());
    }

    #[test]
    fn oversized_objects_are_not_kept() {
        let pool = ObjectPool::new(8);
        pool.insert(key("/big"), points(100));
        assert!(pool.is_empty());
        assert_eq!(pool.current_size(), 0);
    }

    #[test]
    fn keys_separate_time_and_source() {
        let path = ScenePath::parse("/a");
        assert_ne!(PoolKey::new(1, &path, 0.0), PoolKey::new(1, &path, 1.0));
        assert_ne!(PoolKey::new(1, &path, 0.0), PoolKey::new(2, &path, 0.0));
    }

    #[test]
    fn read_object_caches_payloads() {
        let mut builder = MemorySceneBuilder::new();
        let geo = builder.location("/geo");
        builder.set_object(geo, 0.0, SceneObject::Points(PointsPrimitive::new(vec![Vec3::ONE])));
        let scene = builder.build();
        let geo = scene
            .child("geo", MissingBehaviour::ThrowIfMissing)
            .unwrap()
            .unwrap();

        let pool = ObjectPool::default();
        let first = pool.read_object(geo.as_ref(), 0.0).unwrap().unwrap();
        let second = pool.read_object(geo.as_ref(), 0.0).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(pool.len(), 1);
        assert!(pool.read_object(scene.handle().as_ref(), 0.0).unwrap().is_none());
    }
}
