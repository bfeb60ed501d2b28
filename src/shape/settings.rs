//! Adapter configuration.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Space in which transforms, bounds and payloads are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySpace {
    /// Relative to the adapter root.
    #[default]
    World,
    /// Relative to the location's parent.
    Local,
}

bitflags! {
    /// Toggles that affect what the preview draws.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DrawFlags: u8 {
        const GEOMETRY     = 1 << 0;
        const CHILD_BOUNDS = 1 << 1;
        const OBJECT_ONLY  = 1 << 2;
    }
}

// ---------------------------------------------------------------------------
// ShapeSettings
// ---------------------------------------------------------------------------

/// Persistent configuration of a scene-shape adapter.
///
/// Hosts typically store this alongside the node and restore it on load;
/// missing fields take their defaults.
///
/// # Fields
///
/// | Field               | Description                                   | Default |
/// |---------------------|-----------------------------------------------|---------|
/// | `object_only`       | Draw and bound the root location only         | `false` |
/// | `draw_geometry`     | Draw location payloads                        | `false` |
/// | `draw_child_bounds` | Draw a wireframe bound per location           | `false` |
/// | `draw_tags_filter`  | Whitespace-separated tags a location must have | `""`   |
/// | `query_space`       | Space used by queries                         | `World` |
///
/// # Example
///
/// ```rust,ignore
/// use scene_shape::shape::{ShapeSettings, QuerySpace};
///
/// let settings = ShapeSettings {
///     draw_geometry: true,
///     draw_tags_filter: "hero proxy".into(),
///     query_space: QuerySpace::Local,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSettings {
    pub object_only: bool,

    pub draw_geometry: bool,

    /// Named after the host attribute; applies to every location below the
    /// root, never to the root itself.
    pub draw_child_bounds: bool,

    /// Tags are matched on the location, its descendants and its ancestors.
    /// Tags the root does not know are ignored.
    pub draw_tags_filter: String,

    pub query_space: QuerySpace,
}

impl ShapeSettings {
    #[must_use]
    pub fn draw_flags(&self) -> DrawFlags {
        let mut flags = DrawFlags::empty();
        flags.set(DrawFlags::GEOMETRY, self.draw_geometry);
        flags.set(DrawFlags::CHILD_BOUNDS, self.draw_child_bounds);
        flags.set(DrawFlags::OBJECT_ONLY, self.object_only);
        flags
    }

    pub fn set_draw_flags(&mut self, flags: DrawFlags) {
        self.draw_geometry = flags.contains(DrawFlags::GEOMETRY);
        self.draw_child_bounds = flags.contains(DrawFlags::CHILD_BOUNDS);
        self.object_only = flags.contains(DrawFlags::OBJECT_ONLY);
    }

    /// The tag filter split into tags.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.draw_tags_filter.split_whitespace()
    }
}
