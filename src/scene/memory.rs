//! In-memory scene reader.
//!
//! [`MemoryScene`] implements [`SceneInterface`] over a tree assembled with
//! [`MemorySceneBuilder`]. Hosts use it for procedurally generated content;
//! the test suites use it as their scene source.
//!
//! Every property is time sampled. A read at time `t` returns the latest
//! sample at or before `t`, or the first sample when `t` precedes them all.
//! Bounds that were never authored are derived from the payload and the
//! children, each moved by its local transform.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::DMat4;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::errors::{Result, SceneShapeError};
use crate::scene::attribute::AttributeValue;
use crate::scene::bound::Bound;
use crate::scene::interface::{MissingBehaviour, SceneHandle, SceneInterface, TagFilter};
use crate::scene::object::SceneObject;
use crate::scene::path::ScenePath;

new_key_type! {
    pub struct LocationKey;
}

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Values keyed by time, kept sorted.
#[derive(Debug, Clone)]
pub struct Samples<T> {
    samples: Vec<(f64, T)>,
}

impl<T> Default for Samples<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<T> Samples<T> {
    /// Inserts a sample, replacing any sample at exactly the same time.
    pub fn insert(&mut self, time: f64, value: T) {
        let index = self.samples.partition_point(|(t, _)| *t < time);
        match self.samples.get_mut(index) {
            Some(slot) if slot.0 == time => slot.1 = value,
            _ => self.samples.insert(index, (time, value)),
        }
    }

    #[must_use]
    pub fn at(&self, time: f64) -> Option<&T> {
        let after = self.samples.partition_point(|(t, _)| *t <= time);
        let index = after.saturating_sub(1);
        self.samples.get(index).map(|(_, value)| value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|(t, _)| *t)
    }
}

#[derive(Debug, Default)]
struct LocationData {
    name: String,
    parent: Option<LocationKey>,
    children: Vec<LocationKey>,
    transform: Samples<DMat4>,
    object: Samples<Arc<SceneObject>>,
    bound: Samples<Bound>,
    attributes: FxHashMap<String, Samples<AttributeValue>>,
    tags: FxHashSet<String>,
}

#[derive(Debug)]
struct SceneData {
    id: u64,
    locations: SlotMap<LocationKey, LocationData>,
    root: LocationKey,
    /// Distinct sample times per subtree, filled by `MemorySceneBuilder::build`.
    sample_counts: SecondaryMap<LocationKey, usize>,
}

impl SceneData {
    fn path_of(&self, key: LocationKey) -> ScenePath {
        let mut names = Vec::new();
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            let location = &self.locations[k];
            if location.parent.is_some() {
                names.push(location.name.clone());
            }
            cursor = location.parent;
        }
        names.reverse();
        ScenePath::from_segments(names)
    }

    fn bound_of(&self, key: LocationKey, time: f64) -> Bound {
        let location = &self.locations[key];
        if let Some(bound) = location.bound.at(time) {
            return *bound;
        }
        let own = location
            .object
            .at(time)
            .map_or(Bound::EMPTY, |object| object.bound());
        location.children.iter().fold(own, |acc, &child| {
            let local = self.locations[child]
                .transform
                .at(time)
                .copied()
                .unwrap_or(DMat4::IDENTITY);
            acc.union(&self.bound_of(child, time).transform(&local))
        })
    }

    fn subtree_has_tag(&self, key: LocationKey, tag: &str) -> bool {
        let location = &self.locations[key];
        location
            .children
            .iter()
            .any(|&child| self.locations[child].tags.contains(tag) || self.subtree_has_tag(child, tag))
    }

    /// Records the distinct sample count of every subtree below `key` and
    /// returns the sorted, deduplicated times of `key`'s subtree.
    fn count_samples(&mut self, key: LocationKey) -> Vec<f64> {
        let location = &self.locations[key];
        let mut times: Vec<f64> = location
            .transform
            .times()
            .chain(location.object.times())
            .chain(location.bound.times())
            .chain(location.attributes.values().flat_map(|samples| samples.times()))
            .collect();
        let children = location.children.clone();
        for child in children {
            times.extend(self.count_samples(child));
        }
        times.sort_by(f64::total_cmp);
        times.dedup();
        self.sample_counts.insert(key, times.len().max(1));
        times
    }
}

/// Assembles the location tree of a [`MemoryScene`].
#[derive(Debug)]
pub struct MemorySceneBuilder {
    data: SceneData,
}

impl Default for MemorySceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySceneBuilder {
    #[must_use]
    pub fn new() -> Self {
        let mut locations = SlotMap::with_key();
        let root = locations.insert(LocationData::default());
        Self {
            data: SceneData {
                id: 0,
                locations,
                root,
                sample_counts: SecondaryMap::new(),
            },
        }
    }

    #[must_use]
    pub fn root(&self) -> LocationKey {
        self.data.root
    }

    /// Appends a child; children keep insertion order.
    pub fn add_child(&mut self, parent: LocationKey, name: &str) -> LocationKey {
        let key = self.data.locations.insert(LocationData {
            name: name.to_owned(),
            parent: Some(parent),
            ..Default::default()
        });
        if let Some(p) = self.data.locations.get_mut(parent) {
            p.children.push(key);
        }
        key
    }

    /// Returns the location at `path`, creating missing locations on the way.
    pub fn location(&mut self, path: &str) -> LocationKey {
        let mut current = self.data.root;
        for name in ScenePath::parse(path).segments() {
            let existing = self.data.locations[current]
                .children
                .iter()
                .copied()
                .find(|&c| self.data.locations[c].name == *name);
            current = match existing {
                Some(child) => child,
                None => self.add_child(current, name),
            };
        }
        current
    }

    pub fn set_transform(&mut self, key: LocationKey, time: f64, matrix: DMat4) -> &mut Self {
        if let Some(location) = self.data.locations.get_mut(key) {
            location.transform.insert(time, matrix);
        }
        self
    }

    pub fn set_object(&mut self, key: LocationKey, time: f64, object: SceneObject) -> &mut Self {
        if let Some(location) = self.data.locations.get_mut(key) {
            location.object.insert(time, Arc::new(object));
        }
        self
    }

    pub fn set_bound(&mut self, key: LocationKey, time: f64, bound: Bound) -> &mut Self {
        if let Some(location) = self.data.locations.get_mut(key) {
            location.bound.insert(time, bound);
        }
        self
    }

    pub fn set_attribute(
        &mut self,
        key: LocationKey,
        name: &str,
        time: f64,
        value: impl Into<AttributeValue>,
    ) -> &mut Self {
        if let Some(location) = self.data.locations.get_mut(key) {
            location
                .attributes
                .entry(name.to_owned())
                .or_default()
                .insert(time, value.into());
        }
        self
    }

    pub fn add_tags(&mut self, key: LocationKey, tags: &[&str]) -> &mut Self {
        if let Some(location) = self.data.locations.get_mut(key) {
            location.tags.extend(tags.iter().map(|t| (*t).to_owned()));
        }
        self
    }

    /// Freezes the tree and returns a handle to its root.
    #[must_use]
    pub fn build(mut self) -> MemoryScene {
        self.data.id = NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed);
        let root = self.data.root;
        self.data.count_samples(root);
        MemoryScene {
            data: Arc::new(self.data),
            key: root,
        }
    }
}

/// A location inside a frozen in-memory scene.
#[derive(Clone)]
pub struct MemoryScene {
    data: Arc<SceneData>,
    key: LocationKey,
}

impl fmt::Debug for MemoryScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryScene")
            .field("path", &self.path().to_string())
            .finish_non_exhaustive()
    }
}

impl MemoryScene {
    /// Wraps this location in a shared [`SceneHandle`].
    #[must_use]
    pub fn handle(&self) -> SceneHandle {
        Arc::new(self.clone())
    }

    #[inline]
    fn location(&self) -> &LocationData {
        &self.data.locations[self.key]
    }

    fn at(&self, key: LocationKey) -> Self {
        Self {
            data: Arc::clone(&self.data),
            key,
        }
    }
}

impl SceneInterface for MemoryScene {
    fn path(&self) -> ScenePath {
        self.data.path_of(self.key)
    }

    fn child_names(&self) -> Vec<String> {
        self.location()
            .children
            .iter()
            .map(|&c| self.data.locations[c].name.clone())
            .collect()
    }

    fn child(&self, name: &str, missing: MissingBehaviour) -> Result<Option<SceneHandle>> {
        let found = self
            .location()
            .children
            .iter()
            .copied()
            .find(|&c| self.data.locations[c].name == name);
        match (found, missing) {
            (Some(key), _) => Ok(Some(self.at(key).handle())),
            (None, MissingBehaviour::NullIfMissing) => Ok(None),
            (None, MissingBehaviour::ThrowIfMissing) => Err(SceneShapeError::LocationNotFound(
                self.path().child(name).to_string(),
            )),
        }
    }

    fn has_object(&self) -> bool {
        !self.location().object.is_empty()
    }

    fn read_object(&self, time: f64) -> Result<Option<Arc<SceneObject>>> {
        Ok(self.location().object.at(time).cloned())
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.location().attributes.contains_key(name)
    }

    fn read_attribute(&self, name: &str, time: f64) -> Result<Option<AttributeValue>> {
        Ok(self
            .location()
            .attributes
            .get(name)
            .and_then(|samples| samples.at(time))
            .cloned())
    }

    fn read_transform_as_matrix(&self, time: f64) -> Result<DMat4> {
        Ok(self
            .location()
            .transform
            .at(time)
            .copied()
            .unwrap_or(DMat4::IDENTITY))
    }

    fn read_bound(&self, time: f64) -> Result<Bound> {
        Ok(self.data.bound_of(self.key, time))
    }

    fn has_tag(&self, tag: &str, filter: TagFilter) -> bool {
        if filter.contains(TagFilter::LOCAL) && self.location().tags.contains(tag) {
            return true;
        }
        if filter.contains(TagFilter::DESCENDANT) && self.data.subtree_has_tag(self.key, tag) {
            return true;
        }
        if filter.contains(TagFilter::ANCESTOR) {
            let mut cursor = self.location().parent;
            while let Some(key) = cursor {
                let ancestor = &self.data.locations[key];
                if ancestor.tags.contains(tag) {
                    return true;
                }
                cursor = ancestor.parent;
            }
        }
        false
    }

    fn source_id(&self) -> Option<u64> {
        Some(self.data.id)
    }

    fn num_bound_samples(&self) -> Option<usize> {
        Some(self.data.sample_counts.get(self.key).copied().unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::scene::object::PointsPrimitive;

    #[test]
    fn samples_hold_previous_value() {
        let mut samples = Samples::default();
        samples.insert(1.0, "a");
        samples.insert(3.0, "b");
        samples.insert(1.0, "c");
        assert_eq!(samples.at(0.0), Some(&"c"));
        assert_eq!(samples.at(2.0), Some(&"c"));
        assert_eq!(samples.at(3.0), Some(&"b"));
        assert_eq!(samples.at(9.0), Some(&"b"));
        assert_eq!(samples.times().count(), 2);
    }

    #[test]
    fn paths_and_children() {
        let mut builder = MemorySceneBuilder::new();
        builder.location("/a/b");
        builder.location("/a/c");
        let scene = builder.build();

        assert_eq!(scene.path().to_string(), "/");
        let a = scene.child("a", MissingBehaviour::ThrowIfMissing).unwrap().unwrap();
        assert_eq!(a.child_names(), vec!["b".to_string(), "c".to_string()]);
        assert_eq!(
            a.child("b", MissingBehaviour::NullIfMissing).unwrap().unwrap().path().to_string(),
            "/a/b"
        );
        assert!(a.child("zz", MissingBehaviour::NullIfMissing).unwrap().is_none());
        assert!(matches!(
            a.child("zz", MissingBehaviour::ThrowIfMissing),
            Err(SceneShapeError::LocationNotFound(_))
        ));
    }

    #[test]
    fn derived_bound_includes_child_transforms() {
        let mut builder = MemorySceneBuilder::new();
        let child = builder.location("/geo");
        builder
            .set_transform(child, 0.0, DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0)))
            .set_object(
                child,
                0.0,
                SceneObject::Points(PointsPrimitive::new(vec![glam::Vec3::ZERO, glam::Vec3::ONE])),
            );
        let scene = builder.build();

        let bound = scene.read_bound(0.0).unwrap();
        assert_eq!(bound.min, DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(bound.max, DVec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn tag_filters() {
        let mut builder = MemorySceneBuilder::new();
        let child = builder.location("/a/b");
        builder.add_tags(child, &["fx"]);
        let scene = builder.build();

        let a = scene.child("a", MissingBehaviour::ThrowIfMissing).unwrap().unwrap();
        let b = a.child("b", MissingBehaviour::ThrowIfMissing).unwrap().unwrap();
        assert!(!a.has_tag("fx", TagFilter::LOCAL));
        assert!(a.has_tag("fx", TagFilter::DESCENDANT));
        assert!(b.has_tag("fx", TagFilter::LOCAL));
        assert!(!b.has_tag("fx", TagFilter::ANCESTOR));
        assert!(scene.has_tag("fx", TagFilter::EVERY));
    }

    #[test]
    fn sample_counting() {
        let mut builder = MemorySceneBuilder::new();
        let loc = builder.location("/a");
        builder.set_transform(loc, 0.0, DMat4::IDENTITY);
        assert!(!builder.build().is_animated());

        let mut builder = MemorySceneBuilder::new();
        let loc = builder.location("/a");
        builder
            .set_transform(loc, 0.0, DMat4::IDENTITY)
            .set_transform(loc, 1.0, DMat4::IDENTITY);
        let scene = builder.build();
        assert_eq!(scene.num_bound_samples(), Some(2));
        assert!(scene.is_animated());
    }

    #[test]
    fn sample_counts_are_per_subtree() {
        let mut builder = MemorySceneBuilder::new();
        let moving = builder.location("/moving/leaf");
        builder
            .set_transform(moving, 0.0, DMat4::IDENTITY)
            .set_attribute(moving, "user:flag", 2.0, true);
        let still = builder.location("/still");
        builder.set_transform(still, 0.0, DMat4::IDENTITY);
        let scene = builder.build();

        let child = |name: &str| {
            scene
                .child(name, MissingBehaviour::ThrowIfMissing)
                .unwrap()
                .unwrap()
        };
        assert_eq!(scene.num_bound_samples(), Some(2));
        assert_eq!(child("moving").num_bound_samples(), Some(2));
        assert_eq!(child("still").num_bound_samples(), Some(1));
        assert!(!child("still").is_animated());

        // Handles share the counts computed at build time.
        let again = child("moving");
        assert_eq!(again.num_bound_samples(), Some(2));
    }
}
