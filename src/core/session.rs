//! core::session
//!
//! Process-wide session state, modeled as an injectable context instead
//! of ambient globals.
//!
//! # Design
//!
//! The application root creates one [`SessionContext`] at process start,
//! passes it to the components that need it, and tears it down at exit.
//! It owns exactly two things: the held credential (maybe absent) and
//! the dirty flag for unsaved edits. Verification results are NOT cached
//! here; the gate re-verifies at the start of every protected session.
//!
//! # Security
//!
//! The credential never appears in Debug output, logs, or errors.

use std::sync::Mutex;

use crate::remote::CredentialProvider;
use crate::store::dirty::DirtyTracker;

/// Injectable session state: the held credential and the dirty flag.
pub struct SessionContext {
    /// Bearer credential, if one is held.
    credential: Mutex<Option<String>>,
    /// Tracker for unsaved edits.
    dirty: DirtyTracker,
}

// Custom Debug to avoid exposing the credential
impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("has_credential", &self.has_credential())
            .field("dirty", &self.dirty.is_dirty())
            .finish()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SessionContext {
    /// Create a session, optionally seeded with a persisted credential.
    pub fn new(credential: Option<String>) -> Self {
        Self {
            credential: Mutex::new(credential),
            dirty: DirtyTracker::new(),
        }
    }

    /// Whether a credential is currently held.
    pub fn has_credential(&self) -> bool {
        self.credential.lock().unwrap().is_some()
    }

    /// Get a clone of the held credential.
    ///
    /// # Security
    ///
    /// The returned value is the raw credential. Do not log or print it.
    pub fn credential(&self) -> Option<String> {
        self.credential.lock().unwrap().clone()
    }

    /// Replace the held credential.
    pub fn set_credential(&self, credential: String) {
        *self.credential.lock().unwrap() = Some(credential);
    }

    /// Discard the held credential (verification failure, sign-out).
    pub fn clear_credential(&self) {
        *self.credential.lock().unwrap() = None;
    }

    /// The dirty tracker for this session.
    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }
}

// The remote store pulls its bearer credential from the session on every
// request, so sign-in and discard take effect without rebuilding it.
impl CredentialProvider for SessionContext {
    fn credential(&self) -> Option<String> {
        self.credential.lock().unwrap().clone()
    }
}
