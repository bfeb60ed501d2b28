//! World transform accumulation and decomposition.

use std::sync::Arc;

use glam::{DMat4, DVec3, EulerRot};

use crate::errors::{Result, SceneShapeError};
use crate::scene::{MissingBehaviour, SceneHandle, ScenePath};

/// Composes the local transforms from just below `root` down to `path`.
///
/// The root's own transform is never included. When a location on the way
/// is missing, accumulation stops and the partial product is returned.
pub fn world_transform(root: &SceneHandle, path: &ScenePath, time: f64) -> Result<DMat4> {
    let root_path = root.path();
    let Some(relative) = path.strip_prefix(&root_path) else {
        return Err(SceneShapeError::PathOutsideRoot {
            path: path.to_string(),
            root: root_path.to_string(),
        });
    };

    let mut result = DMat4::IDENTITY;
    let mut current = Arc::clone(root);
    for name in relative.segments() {
        let Some(child) = current.child(name, MissingBehaviour::NullIfMissing)? else {
            log::trace!("'{name}' missing below '{}', using partial transform", current.path());
            break;
        };
        result *= child.read_transform_as_matrix(time)?;
        current = child;
    }
    Ok(result)
}

/// A transform split into translate, rotate and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponents {
    pub translate: DVec3,
    /// Euler angles in radians, applied X first, then Y, then Z.
    pub rotate: DVec3,
    pub scale: DVec3,
}

impl TransformComponents {
    /// Decomposes `matrix`. Shear is discarded.
    #[must_use]
    pub fn from_matrix(matrix: &DMat4) -> Self {
        let (scale, rotation, translate) = matrix.to_scale_rotation_translation();
        let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
        Self {
            translate,
            rotate: DVec3::new(x, y, z),
            scale,
        }
    }
}
