//! gate
//!
//! Authorization gate for the editing session.
//!
//! # Design
//!
//! Every mutating call passes through [`SessionGate::verify`] first. The
//! check runs four steps in order, each short-circuiting on failure:
//!
//! 1. a credential must be held (checked locally, no network)
//! 2. the credential must resolve to an identity
//! 3. the identity's handle must appear on the allow-list
//!    (case-insensitive)
//! 4. the repository must report push or admin permission
//!
//! On any failure the held credential is discarded and the caller is
//! expected to redirect to the unauthenticated entry point. Verification
//! results are never cached across processes: every protected session
//! start re-verifies. The check is idempotent and side-effect-free beyond
//! the two network calls.
//!
//! # Security
//!
//! Gate errors never contain the credential.

use std::sync::Arc;

use thiserror::Error;

use crate::core::session::SessionContext;
use crate::remote::{ContentStore, Identity};

/// Errors from session verification. Every variant is a hard stop: the
/// caller redirects to re-authentication rather than retrying in place.
#[derive(Debug, Error)]
pub enum GateError {
    /// No credential is held; step 1 failed without any network call.
    #[error("not signed in")]
    NoCredential,

    /// The identity endpoint rejected the credential.
    #[error("identity check failed: {0}")]
    IdentityCheckFailed(String),

    /// The resolved handle is not on the editor allow-list.
    #[error("user '{0}' is not on the editor allow-list")]
    NotAllowListed(String),

    /// The repository reports neither push nor admin permission.
    #[error("missing push or admin permission on the content repository")]
    InsufficientPermission,

    /// The permission lookup itself failed.
    #[error("permission check failed: {0}")]
    PermissionCheckFailed(String),
}

impl GateError {
    /// Stable machine-readable reason for quiet output and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            GateError::NoCredential => "no-credential",
            GateError::IdentityCheckFailed(_) => "identity-check-failed",
            GateError::NotAllowListed(_) => "not-allow-listed",
            GateError::InsufficientPermission | GateError::PermissionCheckFailed(_) => {
                "insufficient-permission"
            }
        }
    }
}

/// The authorization gate.
pub struct SessionGate {
    remote: Arc<dyn ContentStore>,
    allow_list: Vec<String>,
}

impl SessionGate {
    /// Create a gate checking against `allow_list`.
    pub fn new(remote: Arc<dyn ContentStore>, allow_list: Vec<String>) -> Self {
        Self { remote, allow_list }
    }

    /// Verify the session. Returns the resolved identity for display.
    ///
    /// On failure the session's credential is cleared; the caller must
    /// redirect to the unauthenticated entry point.
    ///
    /// # Errors
    ///
    /// One [`GateError`] per failed step, in step order.
    pub async fn verify(&self, session: &SessionContext) -> Result<Identity, GateError> {
        match self.verify_steps(session).await {
            Ok(identity) => Ok(identity),
            Err(e) => {
                session.clear_credential();
                Err(e)
            }
        }
    }

    async fn verify_steps(&self, session: &SessionContext) -> Result<Identity, GateError> {
        // Step 1: a credential must be present. No network on this path.
        if !session.has_credential() {
            return Err(GateError::NoCredential);
        }

        // Step 2: resolve the identity.
        let identity = self
            .remote
            .identity()
            .await
            .map_err(|e| GateError::IdentityCheckFailed(e.to_string()))?;

        // Step 3: allow-list, case-insensitive.
        let handle_lower = identity.handle.to_lowercase();
        let allowed = self
            .allow_list
            .iter()
            .any(|h| h.to_lowercase() == handle_lower);
        if !allowed {
            return Err(GateError::NotAllowListed(identity.handle));
        }

        // Step 4: repository write permission.
        let access = self
            .remote
            .repo_access()
            .await
            .map_err(|e| GateError::PermissionCheckFailed(e.to_string()))?;
        if !access.can_write {
            return Err(GateError::InsufficientPermission);
        }

        Ok(identity)
    }
}
