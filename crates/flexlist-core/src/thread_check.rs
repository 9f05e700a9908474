//! Thread affinity checks.
//!
//! An adapter, its collection and its caches belong to the UI thread that
//! created them. Nothing in them locks for parallel mutation; these checks
//! only catch accidental use from another thread.
//!
//! ```
//! use flexlist_core::thread_check::ThreadAffinity;
//!
//! struct Rows {
//!     affinity: ThreadAffinity,
//!     rows: Vec<String>,
//! }
//!
//! impl Rows {
//!     fn push(&mut self, row: String) {
//!         self.affinity.debug_assert_same_thread("push");
//!         self.rows.push(row);
//!     }
//! }
//! ```
//!
//! [`ThreadAffinity::debug_assert_same_thread`] compiles away in release
//! builds; [`ThreadAffinity::assert_same_thread`] does not. Both are skipped
//! while checks are disabled with [`set_thread_checks_enabled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable thread checks globally.
///
/// Enabled by default in debug builds.
pub fn set_thread_checks_enabled(enabled: bool) {
    crate::flex_debug!(enabled, "thread checks toggled");
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Whether thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// The thread an object was created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Binds to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            owner: std::thread::current().id(),
        }
    }

    /// The owning thread.
    #[inline]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Whether the calling thread is the owner.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Panics if checks are enabled and `operation` runs off the owning
    /// thread.
    pub fn assert_same_thread(&self, operation: &str) {
        if are_thread_checks_enabled() && !self.is_same_thread() {
            self.wrong_thread(operation);
        }
    }

    /// Like [`assert_same_thread`](Self::assert_same_thread), but only in
    /// debug builds.
    #[inline]
    pub fn debug_assert_same_thread(&self, operation: &str) {
        #[cfg(debug_assertions)]
        self.assert_same_thread(operation);
        #[cfg(not(debug_assertions))]
        let _ = operation;
    }

    #[cold]
    #[inline(never)]
    fn wrong_thread(&self, operation: &str) -> ! {
        let current = std::thread::current();
        crate::flex_error!(
            operation,
            owner = ?self.owner,
            current = ?current.id(),
            "thread affinity violation"
        );
        panic!(
            "`{operation}` called from thread \"{}\" ({:?}), but the adapter belongs to {:?}",
            current.name().unwrap_or("<unnamed>"),
            current.id(),
            self.owner,
        )
    }
}
