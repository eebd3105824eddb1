//! store::documents
//!
//! Page documents: load/save/create/duplicate, and the compare-and-swap
//! save protocol.
//!
//! # The save protocol
//!
//! A save never trusts a cached version token. Each attempt reads the
//! path's current token (a missing path means this is a create and the
//! write omits the token), then issues the conditional write. If the
//! write loses the compare-and-swap because another writer committed
//! between the read and the write, the store re-reads and retries
//! exactly once.
//! A second conflict is surfaced as [`StoreError::SaveConflict`]; bounded
//! latency is preferred over convergence under sustained contention.
//!
//! The invariant this establishes: a losing concurrent writer either
//! succeeds after rebasing onto the latest version, or is explicitly told
//! to resolve the conflict. It is never silently dropped.
//!
//! # Create vs. save
//!
//! `create` is the same wire operation as a token-less save, but diverges
//! in intent: an occupied path is [`StoreError::AlreadyExists`], never
//! retried, never overwritten.

use std::sync::Arc;

use thiserror::Error;

use crate::remote::{ContentStore, RemoteError};
use crate::store::dirty::DirtyTracker;

/// Errors from document operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested page does not exist. Distinguishable so callers can
    /// offer creation.
    #[error("page not found: {0}")]
    PageNotFound(String),

    /// Create refused to overwrite an occupied path.
    #[error("page already exists: {0}")]
    AlreadyExists(String),

    /// The save lost the compare-and-swap twice; the path is contested
    /// and the operator must resolve it.
    #[error("save conflict on '{0}': the page changed upstream during both attempts")]
    SaveConflict(String),

    /// A non-conflict failure during save; not retried.
    #[error("failed to save '{path}': {source}")]
    SaveFailed {
        /// Target path.
        path: String,
        /// Underlying remote failure.
        source: RemoteError,
    },

    /// A non-not-found failure during load.
    #[error("failed to load '{path}': {source}")]
    LoadFailed {
        /// Requested path.
        path: String,
        /// Underlying remote failure.
        source: RemoteError,
    },
}

/// Save attempt state. One retry, then a terminal failure edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveAttempt {
    /// First pass through read-then-write.
    FirstAttempt,
    /// Second pass after a version conflict.
    Retrying,
}

/// Store for HTML page documents.
pub struct DocumentStore {
    remote: Arc<dyn ContentStore>,
    dirty: DirtyTracker,
}

impl DocumentStore {
    /// Create a document store over `remote`.
    ///
    /// `dirty` is the session's tracker; save success is the only thing
    /// that clears it.
    pub fn new(remote: Arc<dyn ContentStore>, dirty: DirtyTracker) -> Self {
        Self { remote, dirty }
    }

    /// Load a page's serialized body.
    ///
    /// # Errors
    ///
    /// - [`StoreError::PageNotFound`] if the path does not exist
    /// - [`StoreError::LoadFailed`] for any other remote failure
    pub async fn load(&self, path: &str) -> Result<String, StoreError> {
        match self.remote.read(path).await {
            Ok(file) => Ok(String::from_utf8_lossy(&file.content).into_owned()),
            Err(RemoteError::NotFound(_)) => Err(StoreError::PageNotFound(path.to_string())),
            Err(e) => Err(StoreError::LoadFailed {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    /// Save a full document body to `path`, replacing whatever is there.
    ///
    /// Runs the compare-and-swap protocol described in the module docs.
    /// On success the dirty flag is cleared and the path is returned.
    ///
    /// # Errors
    ///
    /// - [`StoreError::SaveConflict`] after a second version conflict
    /// - [`StoreError::SaveFailed`] for any non-conflict failure
    pub async fn save(&self, path: &str, content: &str) -> Result<String, StoreError> {
        let message = format!("chore: save {} from visual editor", path);
        let mut attempt = SaveAttempt::FirstAttempt;

        loop {
            // Step 1: fresh token. A missing path is a create, not an error.
            let version = match self.remote.read(path).await {
                Ok(file) => Some(file.version),
                Err(RemoteError::NotFound(_)) => None,
                Err(e) => {
                    return Err(StoreError::SaveFailed {
                        path: path.to_string(),
                        source: e,
                    })
                }
            };

            // Step 2: conditional write.
            match self
                .remote
                .write(path, content.as_bytes(), version.as_deref(), &message)
                .await
            {
                Ok(_) => {
                    self.dirty.mark_clean();
                    return Ok(path.to_string());
                }
                Err(RemoteError::VersionConflict(_)) => match attempt {
                    SaveAttempt::FirstAttempt => {
                        // A concurrent writer landed between steps 1 and 2.
                        // Rebase onto the now-current token, once.
                        attempt = SaveAttempt::Retrying;
                    }
                    SaveAttempt::Retrying => {
                        return Err(StoreError::SaveConflict(path.to_string()))
                    }
                },
                Err(e) => {
                    return Err(StoreError::SaveFailed {
                        path: path.to_string(),
                        source: e,
                    })
                }
            }
        }
    }

    /// Create a new page at `path`.
    ///
    /// The wire operation is a token-less write; the intent differs from
    /// save in exactly one way: an occupied path is an error, never an
    /// overwrite.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyExists`] if the path is occupied
    /// - [`StoreError::SaveFailed`] for any other remote failure
    pub async fn create(&self, path: &str, initial_content: &str) -> Result<String, StoreError> {
        let message = format!("chore: create {} from visual editor", path);

        match self
            .remote
            .write(path, initial_content.as_bytes(), None, &message)
            .await
        {
            Ok(_) => Ok(path.to_string()),
            Err(RemoteError::VersionConflict(_)) => {
                Err(StoreError::AlreadyExists(path.to_string()))
            }
            Err(e) => Err(StoreError::SaveFailed {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    /// Copy `source` to a new page at `target`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::PageNotFound`] if the source is missing
    /// - [`StoreError::AlreadyExists`] if the target is occupied
    pub async fn duplicate(&self, source: &str, target: &str) -> Result<String, StoreError> {
        let content = self.load(source).await?;
        self.create(target, &content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::{FailOn, MockContentStore, MockOperation};

    fn docs(remote: &MockContentStore) -> (DocumentStore, DirtyTracker) {
        let dirty = DirtyTracker::new();
        (
            DocumentStore::new(Arc::new(remote.clone()), dirty.clone()),
            dirty,
        )
    }

    #[tokio::test]
    async fn save_to_fresh_path_creates() {
        let remote = MockContentStore::new();
        let (store, dirty) = docs(&remote);
        dirty.mark_dirty();

        let path = store.save("index.html", "<h1>hi</h1>").await.unwrap();

        assert_eq!(path, "index.html");
        assert_eq!(remote.content_at("index.html").unwrap(), b"<h1>hi</h1>");
        assert!(!dirty.is_dirty());

        // Create path: the write carried no token
        assert!(remote.operations().contains(&MockOperation::Write {
            path: "index.html".into(),
            had_version: false,
        }));
    }

    #[tokio::test]
    async fn save_to_existing_path_uses_fresh_token() {
        let remote = MockContentStore::new();
        remote.seed("index.html", b"old");
        let (store, _) = docs(&remote);

        store.save("index.html", "new").await.unwrap();

        assert_eq!(remote.content_at("index.html").unwrap(), b"new");
        assert!(remote.operations().contains(&MockOperation::Write {
            path: "index.html".into(),
            had_version: true,
        }));
    }

    #[tokio::test]
    async fn one_conflict_recovers_and_wins() {
        let remote = MockContentStore::new();
        remote.seed("index.html", b"base");
        remote.contend_next_writes(1);
        let (store, dirty) = docs(&remote);
        dirty.mark_dirty();

        let path = store.save("index.html", "mine").await.unwrap();

        assert_eq!(path, "index.html");
        // The retry's content landed, not the concurrent writer's
        assert_eq!(remote.content_at("index.html").unwrap(), b"mine");
        assert_eq!(remote.write_count(), 2);
        assert!(!dirty.is_dirty());
    }

    #[tokio::test]
    async fn two_conflicts_surface_after_exactly_one_retry() {
        let remote = MockContentStore::new();
        remote.seed("index.html", b"base");
        remote.contend_next_writes(2);
        let (store, dirty) = docs(&remote);
        dirty.mark_dirty();

        let err = store.save("index.html", "mine").await.unwrap_err();

        assert!(matches!(err, StoreError::SaveConflict(_)));
        // Exactly two writes: first attempt plus one retry, no loop
        assert_eq!(remote.write_count(), 2);
        // A failed save never masquerades as saved
        assert!(dirty.is_dirty());
    }

    #[tokio::test]
    async fn non_conflict_failure_is_not_retried() {
        let remote = MockContentStore::new().fail_on(FailOn::Write(RemoteError::RateLimited));
        remote.seed("index.html", b"base");
        let (store, dirty) = docs(&remote);
        dirty.mark_dirty();

        let err = store.save("index.html", "mine").await.unwrap_err();

        assert!(matches!(
            err,
            StoreError::SaveFailed {
                source: RemoteError::RateLimited,
                ..
            }
        ));
        assert_eq!(remote.write_count(), 1);
        assert!(dirty.is_dirty());
    }

    #[tokio::test]
    async fn load_missing_is_page_not_found() {
        let remote = MockContentStore::new();
        let (store, _) = docs(&remote);

        let err = store.load("pages/ghost.html").await.unwrap_err();
        assert!(matches!(err, StoreError::PageNotFound(_)));
    }

    #[tokio::test]
    async fn load_other_failures_are_distinct() {
        let remote = MockContentStore::new().fail_on(FailOn::Read(RemoteError::RateLimited));
        let (store, _) = docs(&remote);

        let err = store.load("index.html").await.unwrap_err();
        assert!(matches!(err, StoreError::LoadFailed { .. }));
    }

    #[tokio::test]
    async fn create_on_occupied_path_is_already_exists() {
        let remote = MockContentStore::new();
        remote.seed("pages/x.html", b"taken");
        let (store, _) = docs(&remote);

        let err = store.create("pages/x.html", "new").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        // Never retried, never overwritten
        assert_eq!(remote.content_at("pages/x.html").unwrap(), b"taken");
        assert_eq!(remote.write_count(), 1);
    }

    #[tokio::test]
    async fn save_on_same_occupied_path_succeeds() {
        // The create/save divergence: same wire op, different intent.
        let remote = MockContentStore::new();
        remote.seed("pages/x.html", b"taken");
        let (store, _) = docs(&remote);

        store.save("pages/x.html", "replaced").await.unwrap();
        assert_eq!(remote.content_at("pages/x.html").unwrap(), b"replaced");
    }

    #[tokio::test]
    async fn duplicate_copies_content() {
        let remote = MockContentStore::new();
        remote.seed("pages/a.html", b"body");
        let (store, _) = docs(&remote);

        let target = store
            .duplicate("pages/a.html", "pages/b.html")
            .await
            .unwrap();

        assert_eq!(target, "pages/b.html");
        assert_eq!(remote.content_at("pages/b.html").unwrap(), b"body");
    }

    #[tokio::test]
    async fn duplicate_missing_source_is_page_not_found() {
        let remote = MockContentStore::new();
        let (store, _) = docs(&remote);

        let err = store
            .duplicate("pages/ghost.html", "pages/b.html")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PageNotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_occupied_target_is_already_exists() {
        let remote = MockContentStore::new();
        remote.seed("pages/a.html", b"body");
        remote.seed("pages/b.html", b"taken");
        let (store, _) = docs(&remote);

        let err = store
            .duplicate("pages/a.html", "pages/b.html")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(remote.content_at("pages/b.html").unwrap(), b"taken");
    }

    #[tokio::test]
    async fn duplicate_does_not_clear_dirty() {
        // Duplicating remote pages never touches the editing buffer.
        let remote = MockContentStore::new();
        remote.seed("pages/a.html", b"body");
        let (store, dirty) = docs(&remote);
        dirty.mark_dirty();

        store
            .duplicate("pages/a.html", "pages/b.html")
            .await
            .unwrap();
        assert!(dirty.is_dirty());
    }
}
