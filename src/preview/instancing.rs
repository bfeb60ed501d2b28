//! Content-hash based instancing of linked sub-scenes.
//!
//! Link locations are fingerprinted from their three link attributes. The
//! first location built with a given fingerprint is canonical; later ones
//! are recorded as pending and, once the build is complete, receive a copy
//! of the canonical group's subtree with every name re-rooted under the
//! instance's own name.

use std::fmt;

use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use crate::errors::Result;
use crate::preview::graph::PreviewScene;
use crate::preview::selection::SelectionIndex;
use crate::scene::{
    LINK_FILE_NAME_ATTRIBUTE, LINK_ROOT_ATTRIBUTE, LINK_TIME_ATTRIBUTE, SceneInterface,
};

/// Fingerprint of a link location's target.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(u128);

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:032x})", self.0)
    }
}

impl ContentHash {
    /// `true` if `location` links to external content.
    #[must_use]
    pub fn is_link(location: &dyn SceneInterface) -> bool {
        location.has_attribute(LINK_FILE_NAME_ATTRIBUTE)
    }

    /// Hashes the file name, root and time link attributes at `time`.
    pub fn of(location: &dyn SceneInterface, time: f64) -> Result<Self> {
        let mut hasher = Xxh3::new();
        for name in [
            LINK_FILE_NAME_ATTRIBUTE,
            LINK_ROOT_ATTRIBUTE,
            LINK_TIME_ATTRIBUTE,
        ] {
            match location.read_attribute(name, time)? {
                Some(value) => value.hash_into(&mut hasher),
                None => hasher.update(b"\0absent"),
            }
        }
        Ok(Self(hasher.digest128()))
    }
}

/// A link location whose content matched an earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInstance {
    pub instance: String,
    pub canonical: String,
}

/// Outcome of [`InstanceRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// First occurrence; build the subtree.
    Canonical,
    /// Already built under the given name; skip the subtree.
    Instance(String),
}

/// Per-build bookkeeping. Consumed by [`create_instances`].
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    hash_to_name: FxHashMap<ContentHash, String>,
    pending: Vec<PendingInstance>,
}

impl InstanceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hash: ContentHash, name: &str) -> LinkStatus {
        if let Some(canonical) = self.hash_to_name.get(&hash) {
            self.pending.push(PendingInstance {
                instance: name.to_owned(),
                canonical: canonical.clone(),
            });
            return LinkStatus::Instance(canonical.clone());
        }
        self.hash_to_name.insert(hash, name.to_owned());
        LinkStatus::Canonical
    }

    #[must_use]
    pub fn pending(&self) -> &[PendingInstance] {
        &self.pending
    }

    #[must_use]
    pub fn into_pending(self) -> Vec<PendingInstance> {
        self.pending
    }
}

/// Replaces the trailing segment's prefix: `"/a/geo"` under `"/b"` becomes
/// `"/b/geo"`. Names without a separator are kept.
fn rebase_name(name: &str, prefix: &str) -> Option<String> {
    name.rfind('/').map(|at| format!("{prefix}{}", &name[at..]))
}

/// Fills every pending instance group with a copy of its canonical group's
/// children, registering the copied names in `index`. Returns the number
/// of instances created.
pub fn create_instances(
    scene: &mut PreviewScene,
    index: &mut SelectionIndex,
    pending: Vec<PendingInstance>,
) -> usize {
    let mut created = 0;
    for PendingInstance { instance, canonical } in pending {
        let (Some(source), Some(target)) = (index.group(&canonical), index.group(&instance))
        else {
            log::warn!("Cannot instance '{canonical}' at '{instance}': group not built");
            continue;
        };
        if scene.is_ancestor(source, target) {
            log::warn!("Skipping instance '{instance}' nested inside its source '{canonical}'");
            continue;
        }
        scene.copy_children(
            source,
            target,
            &instance,
            &rebase_name,
            &mut |name, key| {
                index.register(name, key);
            },
        );
        created += 1;
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AttributeValue, MemorySceneBuilder, MissingBehaviour};

    #[test]
    fn rebase_uses_trailing_segment() {
        assert_eq!(rebase_name("/a/b/geo", "/x"), Some("/x/geo".into()));
        assert_eq!(rebase_name("geo", "/x"), None);
    }

    #[test]
    fn registry_marks_repeats() {
        let mut builder = MemorySceneBuilder::new();
        let a = builder.location("/a");
        let b = builder.location("/b");
        for key in [a, b] {
            builder
                .set_attribute(key, LINK_FILE_NAME_ATTRIBUTE, 0.0, "tree.scc")
                .set_attribute(key, LINK_ROOT_ATTRIBUTE, 0.0, AttributeValue::StringVector(vec![]))
                .set_attribute(key, LINK_TIME_ATTRIBUTE, 0.0, 1.0_f64);
        }
        let scene = builder.build();
        let a = scene.child("a", MissingBehaviour::ThrowIfMissing).unwrap().unwrap();
        let b = scene.child("b", MissingBehaviour::ThrowIfMissing).unwrap().unwrap();
        assert!(ContentHash::is_link(a.as_ref()));

        let ha = ContentHash::of(a.as_ref(), 0.0).unwrap();
        let hb = ContentHash::of(b.as_ref(), 0.0).unwrap();
        assert_eq!(ha, hb);

        let mut registry = InstanceRegistry::new();
        assert_eq!(registry.register(ha, "/a"), LinkStatus::Canonical);
        assert_eq!(registry.register(hb, "/b"), LinkStatus::Instance("/a".into()));
        assert_eq!(
            registry.into_pending(),
            vec![PendingInstance {
                instance: "/b".into(),
                canonical: "/a".into()
            }]
        );
    }

    #[test]
    fn time_attribute_changes_hash() {
        let mut builder = MemorySceneBuilder::new();
        let a = builder.location("/a");
        let b = builder.location("/b");
        builder
            .set_attribute(a, LINK_FILE_NAME_ATTRIBUTE, 0.0, "tree.scc")
            .set_attribute(a, LINK_TIME_ATTRIBUTE, 0.0, 1.0_f64)
            .set_attribute(b, LINK_FILE_NAME_ATTRIBUTE, 0.0, "tree.scc")
            .set_attribute(b, LINK_TIME_ATTRIBUTE, 0.0, 2.0_f64);
        let scene = builder.build();
        let a = scene.child("a", MissingBehaviour::ThrowIfMissing).unwrap().unwrap();
        let b = scene.child("b", MissingBehaviour::ThrowIfMissing).unwrap().unwrap();
        assert_ne!(
            ContentHash::of(a.as_ref(), 0.0).unwrap(),
            ContentHash::of(b.as_ref(), 0.0).unwrap()
        );
    }
}
