//! remote::traits
//!
//! ContentStore trait definition for the remote content repository.
//!
//! # Design
//!
//! The `ContentStore` trait is async because every operation is a network
//! round-trip. It exposes exactly the primitives the remote service offers:
//! read-current-version, conditional write, namespace listing, identity
//! resolution, and repository permission lookup. There are no multi-path
//! transactions; the version token is the only concurrency-control
//! mechanism.
//!
//! Conditional-write semantics are mandatory for implementors:
//! - omitting `expected_version` means "create only if absent"
//! - supplying it means "replace only if the path's current version equals
//!   this token"
//!
//! # Example
//!
//! ```ignore
//! use pagewright::remote::{ContentStore, RemoteError};
//!
//! async fn touch(remote: &dyn ContentStore) -> Result<(), RemoteError> {
//!     let file = remote.read("index.html").await?;
//!     remote
//!         .write("index.html", &file.content, Some(&file.version), "chore: touch")
//!         .await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from remote content operations.
///
/// Every failure mode the adapters can report is a distinct variant; the
/// stores above this layer branch on variants, never on message text.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Authentication is required but no credential is held.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid or expired credential).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested path or namespace was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A conditional write lost the compare-and-swap: the path's current
    /// version no longer matches the supplied token, or a token-less
    /// create found the path occupied.
    #[error("version conflict at '{0}'")]
    VersionConflict(String),

    /// The credential lacks permission for the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// The service returned an error outside the mapped statuses.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// A file read from the remote store.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Decoded file content.
    pub content: Vec<u8>,
    /// Opaque version token identifying this committed state. Valid only
    /// until the next write to the same path lands.
    pub version: String,
}

/// Result of a successful write.
#[derive(Debug, Clone)]
pub struct WrittenFile {
    /// The version token of the newly committed state.
    pub version: String,
}

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Anything else the service reports (symlinks, submodules).
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::Other => write!(f, "other"),
        }
    }
}

/// One entry of a namespace listing, in the order the service returned it.
#[derive(Debug, Clone)]
pub struct ListEntry {
    /// Bare file name (`about.html`).
    pub name: String,
    /// Full path from the repository root (`pages/about.html`).
    pub path: String,
    /// Entry kind.
    pub kind: EntryKind,
}

/// The identity resolved for the held credential.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Account handle (login name).
    pub handle: String,
}

/// Repository-level access for the held credential.
#[derive(Debug, Clone, Copy)]
pub struct RepoAccess {
    /// Whether the credential can write (push or administer) the repository.
    pub can_write: bool,
}

/// Trait supplying the bearer credential for each request.
///
/// The session context implements this, so a store built once observes
/// credential changes (sign-in, discard-on-failure) without rebuilding.
///
/// # Security
///
/// Implementors must never log or expose the credential value.
pub trait CredentialProvider: Send + Sync {
    /// The currently held credential, if any.
    fn credential(&self) -> Option<String>;
}

/// A fixed credential, for tests and one-shot tools.
pub struct StaticCredential {
    token: Option<String>,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl StaticCredential {
    /// A provider that always returns `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A provider with no credential.
    pub fn none() -> Self {
        Self { token: None }
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Option<String> {
        self.token.clone()
    }
}

/// The ContentStore trait for the remote, path-addressed blob store.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so one store can be shared across
/// async tasks behind an `Arc`.
///
/// # Error Handling
///
/// All methods return `Result<T, RemoteError>`. Callers should handle:
/// - `AuthRequired` / `AuthFailed`: re-authenticate
/// - `NotFound`: path or namespace absent (often not an error to callers)
/// - `VersionConflict`: a concurrent writer committed first
/// - `RateLimited` / `NetworkError`: retry manually later
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Get the store name (e.g., "github", "mock").
    fn name(&self) -> &'static str;

    /// Read the current content and version token at `path`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no file exists at `path`
    async fn read(&self, path: &str) -> Result<RemoteFile, RemoteError>;

    /// Write `content` to `path`, conditionally.
    ///
    /// With `expected_version` set, the write succeeds only if the path's
    /// current version still equals the token. Without it, the write
    /// succeeds only if the path does not yet exist.
    ///
    /// `message` is the human-readable change description recorded by the
    /// service alongside the new version.
    ///
    /// # Errors
    ///
    /// - `VersionConflict` if the condition did not hold
    /// - `NotFound` if a parent namespace cannot be written under
    /// - `PermissionDenied` if the credential cannot write
    async fn write(
        &self,
        path: &str,
        content: &[u8],
        expected_version: Option<&str>,
        message: &str,
    ) -> Result<WrittenFile, RemoteError>;

    /// List the entries directly under `namespace`, in service order.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the namespace does not exist (callers commonly map
    ///   this to an empty listing)
    async fn list(&self, namespace: &str) -> Result<Vec<ListEntry>, RemoteError>;

    /// Resolve the identity behind the held credential.
    async fn identity(&self) -> Result<Identity, RemoteError>;

    /// Query repository-level access for the held credential.
    async fn repo_access(&self) -> Result<RepoAccess, RemoteError>;
}
