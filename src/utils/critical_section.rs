//! Scoped critical section.
//!
//! Calls into an external interpreter (the host's parameter parser) must be
//! serialized. [`CriticalSection::enter`] returns a guard; the section is
//! released when the guard drops, on every exit path including panics and
//! early returns.

use parking_lot::{Mutex, MutexGuard, const_mutex};

static GLOBAL: CriticalSection = CriticalSection {
    lock: const_mutex(()),
};

#[derive(Debug)]
pub struct CriticalSection {
    lock: Mutex<()>,
}

impl Default for CriticalSection {
    fn default() -> Self {
        Self::new()
    }
}

impl CriticalSection {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lock: const_mutex(()),
        }
    }

    /// The process-wide section guarding the host interpreter.
    #[must_use]
    pub fn global() -> &'static CriticalSection {
        &GLOBAL
    }

    /// Blocks until the section is free and enters it.
    pub fn enter(&self) -> CriticalSectionGuard<'_> {
        let guard = self.lock.lock();
        log::trace!("critical section entered");
        CriticalSectionGuard { _guard: guard }
    }

    /// Runs `f` inside the section.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        f()
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.lock.is_locked()
    }
}

/// Holds a [`CriticalSection`] until dropped.
pub struct CriticalSectionGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl Drop for CriticalSectionGuard<'_> {
    fn drop(&mut self) {
        log::trace!("critical section released");
    }
}
