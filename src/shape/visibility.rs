//! Visibility along a location's path.

use std::sync::Arc;

use crate::errors::{Result, SceneShapeError};
use crate::scene::{MissingBehaviour, SceneHandle, SceneInterface, ScenePath, VISIBILITY_ATTRIBUTE};

fn visible_here(location: &dyn SceneInterface, time: f64) -> Result<bool> {
    if !location.has_attribute(VISIBILITY_ATTRIBUTE) {
        return Ok(true);
    }
    Ok(location
        .read_attribute(VISIBILITY_ATTRIBUTE, time)?
        .and_then(|value| value.as_bool())
        .unwrap_or(true))
}

/// `false` if `path` or any location above it, down from `root`, is hidden.
pub fn is_visible(root: &SceneHandle, path: &ScenePath, time: f64) -> Result<bool> {
    let root_path = root.path();
    let Some(relative) = path.strip_prefix(&root_path) else {
        return Err(SceneShapeError::PathOutsideRoot {
            path: path.to_string(),
            root: root_path.to_string(),
        });
    };
    if !visible_here(root.as_ref(), time)? {
        return Ok(false);
    }
    let mut current = Arc::clone(root);
    for name in relative.segments() {
        let Some(child) = current.child(name, MissingBehaviour::NullIfMissing)? else {
            return Err(SceneShapeError::LocationNotFound(path.to_string()));
        };
        if !visible_here(child.as_ref(), time)? {
            return Ok(false);
        }
        current = child;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemorySceneBuilder;

    #[test]
    fn hidden_ancestor_hides_descendants() {
        let mut builder = MemorySceneBuilder::new();
        let a = builder.location("/a");
        builder.location("/a/b");
        builder.location("/c");
        builder.set_attribute(a, VISIBILITY_ATTRIBUTE, 0.0, false);
        let root = builder.build().handle();

        assert!(!is_visible(&root, &"/a/b".into(), 0.0).unwrap());
        assert!(is_visible(&root, &"/c".into(), 0.0).unwrap());
        assert!(is_visible(&root, &ScenePath::root(), 0.0).unwrap());
        assert!(matches!(
            is_visible(&root, &"/zz".into(), 0.0),
            Err(SceneShapeError::LocationNotFound(_))
        ));
    }
}
