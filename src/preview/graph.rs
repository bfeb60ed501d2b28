//! Preview scene graph.
//!
//! A [`PreviewScene`] is an arena of [`Group`]s. Groups own their child
//! groups exclusively and hold drawable leaves through `Arc`, so copying a
//! subtree duplicates groups and shares geometry.

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::preview::primitive::Primitive;
use crate::scene::{AttributeValue, Bound};

new_key_type! {
    pub struct GroupKey;
}

/// Effective name of groups that neither carry nor inherit a name.
pub const UNNAMED: &str = "unnamed";

#[derive(Debug, Clone)]
pub enum PreviewChild {
    Group(GroupKey),
    Primitive(Arc<Primitive>),
}

/// Render state carried by a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupState {
    /// Name tag; unnamed groups inherit their ancestor's.
    pub name: Option<String>,
    pub attributes: FxHashMap<String, AttributeValue>,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub(crate) parent: Option<GroupKey>,
    pub(crate) children: Vec<PreviewChild>,
    pub transform: Mat4,
    pub state: GroupState,
}

impl Group {
    fn new(parent: Option<GroupKey>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            transform: Mat4::IDENTITY,
            state: GroupState::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<GroupKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[PreviewChild] {
        &self.children
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.state.name.as_deref()
    }

    pub fn child_groups(&self) -> impl Iterator<Item = GroupKey> + '_ {
        self.children.iter().filter_map(|child| match child {
            PreviewChild::Group(key) => Some(*key),
            PreviewChild::Primitive(_) => None,
        })
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Arc<Primitive>> + '_ {
        self.children.iter().filter_map(|child| match child {
            PreviewChild::Primitive(primitive) => Some(primitive),
            PreviewChild::Group(_) => None,
        })
    }
}

/// The drawable graph produced by one preview build.
#[derive(Debug, Clone)]
pub struct PreviewScene {
    groups: SlotMap<GroupKey, Group>,
    root: GroupKey,
}

impl Default for PreviewScene {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewScene {
    /// An empty scene holding only an unnamed root group.
    #[must_use]
    pub fn new() -> Self {
        let mut groups = SlotMap::with_key();
        let root = groups.insert(Group::new(None));
        Self { groups, root }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> GroupKey {
        self.root
    }

    #[must_use]
    pub fn group(&self, key: GroupKey) -> Option<&Group> {
        self.groups.get(key)
    }

    pub fn group_mut(&mut self, key: GroupKey) -> Option<&mut Group> {
        self.groups.get_mut(key)
    }

    #[must_use]
    pub fn contains(&self, key: GroupKey) -> bool {
        self.groups.contains_key(key)
    }

    /// Number of live groups, root included.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Appends an empty group under `parent`.
    ///
    /// Returns `None` if `parent` is not in the scene.
    pub fn add_group(&mut self, parent: GroupKey) -> Option<GroupKey> {
        if !self.groups.contains_key(parent) {
            log::warn!("Parent group not found, group not added");
            return None;
        }
        let key = self.groups.insert(Group::new(Some(parent)));
        self.groups[parent].children.push(PreviewChild::Group(key));
        Some(key)
    }

    pub fn add_primitive(&mut self, parent: GroupKey, primitive: Arc<Primitive>) {
        if let Some(group) = self.groups.get_mut(parent) {
            group.children.push(PreviewChild::Primitive(primitive));
        } else {
            log::warn!("Parent group not found, primitive dropped");
        }
    }

    /// The group's own name, else the nearest named ancestor's, else
    /// [`UNNAMED`].
    #[must_use]
    pub fn effective_name(&self, key: GroupKey) -> &str {
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            let Some(group) = self.groups.get(k) else {
                break;
            };
            if let Some(name) = group.name() {
                return name;
            }
            cursor = group.parent;
        }
        UNNAMED
    }

    /// `true` if `ancestor` is `key` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: GroupKey, key: GroupKey) -> bool {
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            if k == ancestor {
                return true;
            }
            cursor = self.groups.get(k).and_then(|g| g.parent);
        }
        false
    }

    /// Product of the transforms from the root down to `key`, inclusive.
    #[must_use]
    pub fn world_transform(&self, key: GroupKey) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            let Some(group) = self.groups.get(k) else {
                break;
            };
            matrix = group.transform * matrix;
            cursor = group.parent;
        }
        matrix
    }

    /// Bound of everything under `key`, in the group's own space (its own
    /// transform is not applied).
    #[must_use]
    pub fn local_bound(&self, key: GroupKey) -> Bound {
        let Some(group) = self.groups.get(key) else {
            return Bound::EMPTY;
        };
        group.children.iter().fold(Bound::EMPTY, |acc, child| {
            let bound = match child {
                PreviewChild::Primitive(primitive) => primitive.bound(),
                PreviewChild::Group(child_key) => {
                    let matrix = self.groups[*child_key].transform.as_dmat4();
                    self.local_bound(*child_key).transform(&matrix)
                }
            };
            acc.union(&bound)
        })
    }

    /// Bound of everything under `key`, in world space.
    #[must_use]
    pub fn world_bound(&self, key: GroupKey) -> Bound {
        self.local_bound(key)
            .transform(&self.world_transform(key).as_dmat4())
    }

    /// Number of drawable leaves under `key`, shared leaves counted once per
    /// reference.
    #[must_use]
    pub fn primitive_count(&self, key: GroupKey) -> usize {
        let Some(group) = self.groups.get(key) else {
            return 0;
        };
        group
            .children
            .iter()
            .map(|child| match child {
                PreviewChild::Primitive(_) => 1,
                PreviewChild::Group(child_key) => self.primitive_count(*child_key),
            })
            .sum()
    }

    /// Groups in depth-first pre-order, starting at the root.
    #[must_use]
    pub fn depth_first(&self) -> Vec<GroupKey> {
        let mut order = Vec::with_capacity(self.groups.len());
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            order.push(key);
            if let Some(group) = self.groups.get(key) {
                let children: Vec<GroupKey> = group.child_groups().collect();
                stack.extend(children.into_iter().rev());
            }
        }
        order
    }

    /// Copies the children of `source` into `target`.
    ///
    /// Groups and their state are duplicated, leaves are shared. `rename`
    /// is called for every copied group with its state's name and the name
    /// prefix in effect; it returns the new name (or `None` to keep the
    /// copied one) and the copy is reported through `on_copy`.
    pub fn copy_children<R, C>(
        &mut self,
        source: GroupKey,
        target: GroupKey,
        prefix: &str,
        rename: &R,
        on_copy: &mut C,
    ) where
        R: Fn(&str, &str) -> Option<String>,
        C: FnMut(&str, GroupKey),
    {
        let Some(children) = self.groups.get(source).map(|g| g.children.clone()) else {
            return;
        };
        for child in children {
            match child {
                PreviewChild::Primitive(primitive) => self.add_primitive(target, primitive),
                PreviewChild::Group(src_key) => {
                    let Some(new_key) = self.add_group(target) else {
                        return;
                    };
                    let src = &self.groups[src_key];
                    let mut state = src.state.clone();
                    let transform = src.transform;
                    let new_name = state.name.as_deref().and_then(|name| rename(name, prefix));
                    if let Some(name) = &new_name {
                        state.name = Some(name.clone());
                    }
                    let group = &mut self.groups[new_key];
                    group.state = state;
                    group.transform = transform;

                    let next_prefix = match &new_name {
                        Some(name) => {
                            on_copy(name, new_key);
                            name.clone()
                        }
                        None => prefix.to_owned(),
                    };
                    self.copy_children(src_key, new_key, &next_prefix, rename, on_copy);
                }
            }
        }
    }

    /// Removes `key` and its whole subtree. The root cannot be removed.
    pub fn remove_group(&mut self, key: GroupKey) {
        if key == self.root {
            log::warn!("Cannot remove the preview root group");
            return;
        }
        // 1. Take the child list first to avoid borrowing conflicts
        let Some(children) = self.groups.get(key).map(|g| g.children.clone()) else {
            return;
        };

        // 2. Recursively remove child groups
        for child in children {
            if let PreviewChild::Group(child_key) = child {
                self.remove_group(child_key);
            }
        }

        // 3. Detach from the parent
        if let Some(parent_key) = self.groups.get(key).and_then(|g| g.parent)
            && let Some(parent) = self.groups.get_mut(parent_key)
        {
            parent
                .children
                .retain(|c| !matches!(c, PreviewChild::Group(k) if *k == key));
        }

        self.groups.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use glam::{DVec3, Vec3};

    use super::*;
    use crate::scene::PointsPrimitive;

    fn unit_points() -> Arc<Primitive> {
        Arc::new(Primitive::Points(PointsPrimitive::new(vec![
            Vec3::ZERO,
            Vec3::ONE,
        ])))
    }

    #[test]
    fn names_are_inherited() {
        let mut scene = PreviewScene::new();
        let root = scene.root();
        let named = scene.add_group(root).unwrap();
        scene.group_mut(named).unwrap().state.name = Some("/a".into());
        let inner = scene.add_group(named).unwrap();

        assert_eq!(scene.effective_name(root), UNNAMED);
        assert_eq!(scene.effective_name(inner), "/a");
        assert!(scene.is_ancestor(named, inner));
        assert!(!scene.is_ancestor(inner, named));
    }

    #[test]
    fn bounds_and_transforms_compose() {
        let mut scene = PreviewScene::new();
        let root = scene.root();
        let a = scene.add_group(root).unwrap();
        scene.group_mut(a).unwrap().transform = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let b = scene.add_group(a).unwrap();
        scene.group_mut(b).unwrap().transform = Mat4::from_scale(Vec3::splat(2.0));
        scene.add_primitive(b, unit_points());

        assert_eq!(scene.world_transform(b).transform_point3(Vec3::ONE), Vec3::new(7.0, 2.0, 2.0));
        let bound = scene.local_bound(root);
        assert_eq!(bound.min, DVec3::new(5.0, 0.0, 0.0));
        assert_eq!(bound.max, DVec3::new(7.0, 2.0, 2.0));
        assert_eq!(scene.world_bound(b).max, DVec3::new(7.0, 2.0, 2.0));
        assert_eq!(scene.primitive_count(root), 1);
    }

    #[test]
    fn remove_subtree() {
        let mut scene = PreviewScene::new();
        let root = scene.root();
        let a = scene.add_group(root).unwrap();
        let b = scene.add_group(a).unwrap();
        scene.add_primitive(b, unit_points());
        assert_eq!(scene.group_count(), 3);

        scene.remove_group(a);
        assert_eq!(scene.group_count(), 1);
        assert!(!scene.contains(b));
        assert!(scene.group(root).unwrap().children().is_empty());

        scene.remove_group(root);
        assert_eq!(scene.group_count(), 1);
    }

    #[test]
    fn depth_first_is_pre_order() {
        let mut scene = PreviewScene::new();
        let root = scene.root();
        let a = scene.add_group(root).unwrap();
        let a1 = scene.add_group(a).unwrap();
        let b = scene.add_group(root).unwrap();
        assert_eq!(scene.depth_first(), vec![root, a, a1, b]);
    }

    #[test]
    fn copy_children_shares_leaves() {
        let mut scene = PreviewScene::new();
        let root = scene.root();
        let src = scene.add_group(root).unwrap();
        let child = scene.add_group(src).unwrap();
        scene.group_mut(child).unwrap().state.name = Some("/src/leaf".into());
        let leaf = unit_points();
        scene.add_primitive(child, Arc::clone(&leaf));
        let dst = scene.add_group(root).unwrap();

        let mut copied = Vec::new();
        scene.copy_children(
            src,
            dst,
            "/dst",
            &|name: &str, prefix: &str| name.rfind('/').map(|i| format!("{prefix}{}", &name[i..])),
            &mut |name: &str, key| copied.push((name.to_owned(), key)),
        );

        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0].0, "/dst/leaf");
        let copy = scene.group(copied[0].1).unwrap();
        let PreviewChild::Primitive(shared) = &copy.children()[0] else {
            panic!("expected a primitive");
        };
        assert!(Arc::ptr_eq(shared, &leaf));
        assert_eq!(scene.group(child).unwrap().name(), Some("/src/leaf"));
    }
}
