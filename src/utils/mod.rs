//! Utility Module
//!
//! This module provides shared infrastructure:
//!
//! - [`CriticalSection`]: Scoped lock serializing calls into the host interpreter
//! - [`ObjectPool`]: Memory-bounded LRU cache of payload reads
//!
//! # Object Pool
//!
//! Payload reads go through an [`ObjectPool`]. Adapters share the
//! process-wide [`default_pool`] unless given their own.
//!
//! ```rust,ignore
//! use scene_shape::utils::default_pool;
//!
//! let pool = default_pool();
//! pool.set_max_size(64 * 1024 * 1024);
//! ```

pub mod critical_section;
pub mod object_pool;

pub use critical_section::{CriticalSection, CriticalSectionGuard};
pub use object_pool::{DEFAULT_MAX_SIZE, ObjectPool, PoolKey, default_pool};
