//! store::dirty
//!
//! Unsaved-edit tracking.
//!
//! # Design
//!
//! One boolean for the whole session: set on every edit notification from
//! the composition surface, cleared only by a successful save. Callers
//! consult it before any operation that would discard in-memory content;
//! the tracker exposes the flag truthfully and imposes no policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide dirty flag for unsaved edits.
///
/// Cloning is cheap and clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    flag: Arc<AtomicBool>,
}

impl DirtyTracker {
    /// Create a clean tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an edit occurred. Idempotent.
    pub fn mark_dirty(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Record that all edits were persisted. Invoked only by the
    /// document store on save success.
    pub fn mark_clean(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Whether unsaved edits exist.
    pub fn is_dirty(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
