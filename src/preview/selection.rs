//! Name ↔ index mapping for interactive picking.

use rustc_hash::FxHashMap;

use crate::preview::graph::{GroupKey, PreviewScene, UNNAMED};

/// Dense, generation-local indices for the named groups of a preview graph.
///
/// Index `i` is the `i`-th distinct name met in depth-first order, followed
/// by names registered afterwards (instance copies).
#[derive(Debug, Clone, Default)]
pub struct SelectionIndex {
    names: Vec<String>,
    lookup: FxHashMap<String, (usize, GroupKey)>,
}

impl SelectionIndex {
    /// Indexes every group of `scene` whose effective name is not
    /// [`UNNAMED`]. Unnamed groups inherit their nearest named ancestor's
    /// name, so only the first group carrying a name is registered.
    #[must_use]
    pub fn build(scene: &PreviewScene) -> Self {
        let mut index = Self::default();
        index.walk(scene, scene.root(), UNNAMED);
        index
    }

    fn walk(&mut self, scene: &PreviewScene, key: GroupKey, inherited: &str) {
        let Some(group) = scene.group(key) else {
            return;
        };
        let name = group.name().unwrap_or(inherited);
        if name != UNNAMED {
            self.register(name, key);
        }
        for child in group.child_groups() {
            self.walk(scene, child, name);
        }
    }

    /// Registers `name` for `group` and returns its index. A name that is
    /// already registered keeps its original index and group.
    pub fn register(&mut self, name: &str, group: GroupKey) -> usize {
        if let Some((index, _)) = self.lookup.get(name) {
            return *index;
        }
        let index = self.names.len();
        self.names.push(name.to_owned());
        self.lookup.insert(name.to_owned(), (index, group));
        index
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).map(|(index, _)| *index)
    }

    /// Name at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; indices only come from this
    /// generation's [`SelectionIndex::index_of`] or [`SelectionIndex::names`].
    #[must_use]
    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    #[must_use]
    pub fn get_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<GroupKey> {
        self.lookup.get(name).map(|(_, key)| *key)
    }

    /// All names, in index order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(scene: &mut PreviewScene, parent: GroupKey, name: Option<&str>) -> GroupKey {
        let key = scene.add_group(parent).unwrap();
        scene.group_mut(key).unwrap().state.name = name.map(str::to_owned);
        key
    }

    #[test]
    fn depth_first_indices() {
        let mut scene = PreviewScene::new();
        let root = scene.root();
        let top = named(&mut scene, root, Some("/"));
        let inner = named(&mut scene, top, None);
        let a = named(&mut scene, inner, Some("/a"));
        named(&mut scene, a, None);
        let b = named(&mut scene, inner, Some("/b"));

        let index = SelectionIndex::build(&scene);
        assert_eq!(index.names(), &["/".to_string(), "/a".into(), "/b".into()]);
        assert_eq!(index.group("/"), Some(top));
        assert_eq!(index.group("/a"), Some(a));
        assert_eq!(index.index_of("/b"), Some(2));
        assert_eq!(index.group("/b"), Some(b));
        assert_eq!(index.index_of("/zz"), None);
    }

    #[test]
    fn register_keeps_first() {
        let mut scene = PreviewScene::new();
        let root = scene.root();
        let first = scene.add_group(root).unwrap();
        let second = scene.add_group(root).unwrap();

        let mut index = SelectionIndex::default();
        assert_eq!(index.register("/x", first), 0);
        assert_eq!(index.register("/x", second), 0);
        assert_eq!(index.len(), 1);
        assert_eq!(index.group("/x"), Some(first));
    }

    #[test]
    fn index_name_round_trip() {
        let mut scene = PreviewScene::new();
        let root = scene.root();
        for name in ["/p", "/q", "/r"] {
            named(&mut scene, root, Some(name));
        }
        let index = SelectionIndex::build(&scene);
        for i in 0..index.len() {
            assert_eq!(index.index_of(index.name(i)), Some(i));
        }
        assert!(index.get_name(index.len()).is_none());
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn out_of_range_name_panics() {
        let index = SelectionIndex::default();
        let _ = index.name(0);
    }
}
