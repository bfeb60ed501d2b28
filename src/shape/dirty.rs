//! Preview staleness tracking.

/// Edits reported to a [`DirtyFlag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeChange {
    DrawGeometry,
    DrawBounds,
    ObjectOnly,
    TagFilter,
    /// The evaluation time moved. Only animated scenes go stale.
    Time { animated: bool },
    SceneSource,
}

impl ShapeChange {
    #[must_use]
    pub fn invalidates_preview(self) -> bool {
        match self {
            Self::Time { animated } => animated,
            Self::DrawGeometry
            | Self::DrawBounds
            | Self::ObjectOnly
            | Self::TagFilter
            | Self::SceneSource => true,
        }
    }
}

/// "Preview is stale" flag.
///
/// Starts dirty. Any invalidating change sets it; only [`DirtyFlag::clear`],
/// called after a successful rebuild, resets it. Each clear starts a new
/// generation.
#[derive(Debug, Clone)]
pub struct DirtyFlag {
    dirty: bool,
    generation: u64,
}

impl Default for DirtyFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyFlag {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dirty: true,
            generation: 0,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Records `change`, returning `true` if it made the preview stale.
    pub fn notify(&mut self, change: ShapeChange) -> bool {
        let invalidates = change.invalidates_preview();
        if invalidates {
            log::trace!("Preview invalidated by {change:?}");
            self.dirty = true;
        }
        invalidates
    }

    /// Marks the preview fresh and advances the generation.
    pub fn clear(&mut self) {
        self.dirty = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of successful rebuilds so far.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_dirty() {
        let flag = DirtyFlag::new();
        assert!(flag.is_dirty());
        assert_eq!(flag.generation(), 0);
    }

    #[test]
    fn static_time_changes_are_ignored() {
        let mut flag = DirtyFlag::new();
        flag.clear();
        assert!(!flag.notify(ShapeChange::Time { animated: false }));
        assert!(!flag.is_dirty());
        assert!(flag.notify(ShapeChange::Time { animated: true }));
        assert!(flag.is_dirty());
    }

    #[test]
    fn clear_advances_generation() {
        let mut flag = DirtyFlag::new();
        flag.clear();
        flag.notify(ShapeChange::TagFilter);
        flag.clear();
        assert_eq!(flag.generation(), 2);
        assert!(!flag.is_dirty());
    }
}
