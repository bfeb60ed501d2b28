//! The scene reader interface.
//!
//! [`SceneInterface`] is the read-only view of one location that the
//! adapter works against. [`resolve`] walks from a root handle to a
//! descendant path.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use glam::DMat4;

use crate::errors::{Result, SceneShapeError};
use crate::scene::attribute::AttributeValue;
use crate::scene::bound::Bound;
use crate::scene::object::SceneObject;
use crate::scene::path::ScenePath;

/// Shared handle to a location in a scene.
pub type SceneHandle = Arc<dyn SceneInterface>;

/// What [`SceneInterface::child`] does when the child does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingBehaviour {
    /// Report [`SceneShapeError::LocationNotFound`].
    ThrowIfMissing,
    /// Return `Ok(None)`.
    NullIfMissing,
}

bitflags! {
    /// Where a tag may be declared for [`SceneInterface::has_tag`] to match.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TagFilter: u8 {
        /// Declared on the location itself.
        const LOCAL      = 1 << 0;
        /// Declared on any descendant.
        const DESCENDANT = 1 << 1;
        /// Declared on any ancestor.
        const ANCESTOR   = 1 << 2;
        const EVERY = Self::LOCAL.bits() | Self::DESCENDANT.bits() | Self::ANCESTOR.bits();
    }
}

/// Read-only access to one location of a hierarchical, time-sampled scene.
///
/// Implementations are owned outside this crate (file readers, live host
/// scenes). The adapter never mutates a location; it only reads.
pub trait SceneInterface: Send + Sync + fmt::Debug {
    /// Absolute path of this location.
    fn path(&self) -> ScenePath;

    /// Names of the direct children, in the reader's order.
    fn child_names(&self) -> Vec<String>;

    fn child(&self, name: &str, missing: MissingBehaviour) -> Result<Option<SceneHandle>>;

    fn has_object(&self) -> bool;

    /// Payload at `time`; `None` when the location carries none.
    fn read_object(&self, time: f64) -> Result<Option<Arc<SceneObject>>>;

    fn has_attribute(&self, name: &str) -> bool;

    fn read_attribute(&self, name: &str, time: f64) -> Result<Option<AttributeValue>>;

    /// Local transform relative to the parent location.
    fn read_transform_as_matrix(&self, time: f64) -> Result<DMat4>;

    /// Bound in this location's local space, children included.
    fn read_bound(&self, time: f64) -> Result<Bound>;

    fn has_tag(&self, tag: &str, filter: TagFilter) -> bool;

    /// Number of distinct bound samples beneath this location, for sampled
    /// scenes. `None` means the scene is not sample based (for example a
    /// live host scene) and must be treated as animated.
    fn num_bound_samples(&self) -> Option<usize> {
        None
    }

    /// Identifier of the underlying scene source, stable for its lifetime.
    /// Payload caches key on it; `None` disables caching for this reader.
    fn source_id(&self) -> Option<u64> {
        None
    }

    /// `true` when more than one time sample exists beneath this location.
    fn is_animated(&self) -> bool {
        self.num_bound_samples().is_none_or(|samples| samples > 1)
    }
}

/// Navigates from `root` to the absolute `path`, which must lie at or below
/// it. Returns `root` itself when the paths are equal.
pub fn resolve(
    root: &SceneHandle,
    path: &ScenePath,
    missing: MissingBehaviour,
) -> Result<Option<SceneHandle>> {
    let own = root.path();
    let Some(relative) = path.strip_prefix(&own) else {
        return Err(SceneShapeError::PathOutsideRoot {
            path: path.to_string(),
            root: own.to_string(),
        });
    };
    let mut current = Arc::clone(root);
    for name in relative.segments() {
        match current.child(name, missing)? {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}
