//! store::assets
//!
//! Asset uploads with collision-free naming.
//!
//! # Design
//!
//! Every upload mints a fresh path: `assets/<stamp>-<slug>`. The stamp is
//! a strictly monotonic millisecond value (if two uploads land in the
//! same millisecond the second takes `last + 1`), so identical source
//! names can never collide. Paths are never reused; assets are
//! append-only from this store's perspective, and new-path writes carry
//! no version token.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::core::naming::slugify_asset;
use crate::remote::{ContentStore, EntryKind, RemoteError};

/// Errors from asset operations.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The upload write failed; no partial state remains.
    #[error("failed to upload '{name}': {source}")]
    UploadFailed {
        /// The suggested (pre-slug) name.
        name: String,
        /// Underlying remote failure.
        source: RemoteError,
    },

    /// The namespace listing failed.
    #[error("failed to list assets: {0}")]
    ListFailed(RemoteError),
}

/// One known asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Repository path (`assets/1722440000000-photo.png`).
    pub path: String,
    /// Name shown to the operator.
    pub display_name: String,
}

/// Uploads binaries to the assets namespace and lists what exists.
pub struct AssetStore {
    remote: Arc<dyn ContentStore>,
    assets_dir: String,
    /// Last stamp handed out; the next is always strictly greater.
    last_stamp: AtomicI64,
}

impl AssetStore {
    /// Create a store uploading under `assets_dir`.
    pub fn new(remote: Arc<dyn ContentStore>, assets_dir: impl Into<String>) -> Self {
        Self {
            remote,
            assets_dir: assets_dir.into(),
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Upload a binary payload, returning the freshly minted path.
    ///
    /// # Errors
    ///
    /// Any transport or permission error surfaces as
    /// [`AssetError::UploadFailed`]; the path either exists fully or was
    /// never created.
    pub async fn upload(
        &self,
        payload: &[u8],
        suggested_name: &str,
    ) -> Result<String, AssetError> {
        let slug = slugify_asset(suggested_name);
        let stamp = self.next_stamp();
        let path = format!("{}/{}-{}", self.assets_dir, stamp, slug);

        let message = format!("chore: upload {} from visual editor", path);

        self.remote
            .write(&path, payload, None, &message)
            .await
            .map_err(|e| AssetError::UploadFailed {
                name: suggested_name.to_string(),
                source: e,
            })?;

        Ok(path)
    }

    /// List existing assets.
    ///
    /// A namespace that does not yet exist is an empty sequence, not an
    /// error. Non-file entries are excluded.
    pub async fn list_existing(&self) -> Result<Vec<AssetEntry>, AssetError> {
        let entries = match self.remote.list(&self.assets_dir).await {
            Ok(entries) => entries,
            Err(RemoteError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(AssetError::ListFailed(e)),
        };

        Ok(entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| AssetEntry {
                path: e.path,
                display_name: e.name,
            })
            .collect())
    }

    /// Mint the next stamp: wall-clock milliseconds, bumped past the
    /// previous stamp if the clock has not advanced (or went backwards).
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last_stamp.compare_exchange(
                prev,
                candidate,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::MockContentStore;

    fn store(remote: &MockContentStore) -> AssetStore {
        AssetStore::new(Arc::new(remote.clone()), "assets")
    }

    #[tokio::test]
    async fn upload_mints_assets_path() {
        let remote = MockContentStore::new();
        let path = store(&remote)
            .upload(b"bytes", "Photo!!.PNG")
            .await
            .unwrap();

        assert!(path.starts_with("assets/"));
        assert!(path.ends_with("-photo-.png"));
        assert_eq!(remote.content_at(&path).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn identical_names_same_instant_get_distinct_paths() {
        let remote = MockContentStore::new();
        let assets = store(&remote);

        let first = assets.upload(b"one", "Photo!!.PNG").await.unwrap();
        let second = assets.upload(b"two", "Photo!!.PNG").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(remote.count_under("assets"), 2);
    }

    #[tokio::test]
    async fn upload_writes_without_version_token() {
        let remote = MockContentStore::new();
        store(&remote).upload(b"x", "a.png").await.unwrap();

        let ops = remote.operations();
        assert!(ops.iter().any(|op| matches!(
            op,
            crate::remote::mock::MockOperation::Write {
                had_version: false,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn upload_failure_carries_the_suggested_name() {
        let remote = MockContentStore::new().fail_on(crate::remote::mock::FailOn::Write(
            RemoteError::PermissionDenied("read-only".into()),
        ));

        let err = store(&remote).upload(b"x", "Photo.png").await.unwrap_err();
        match err {
            AssetError::UploadFailed { name, source } => {
                assert_eq!(name, "Photo.png");
                assert!(matches!(source, RemoteError::PermissionDenied(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_namespace_lists_as_empty() {
        let remote = MockContentStore::new();
        let listed = store(&remote).list_existing().await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn listing_excludes_directories() {
        let remote = MockContentStore::new();
        remote.seed("assets/1-a.png", b"a");
        remote.seed("assets/thumbs/1-t.png", b"t");

        let listed = store(&remote).list_existing().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, "assets/1-a.png");
        assert_eq!(listed[0].display_name, "1-a.png");
    }

    #[test]
    fn stamps_strictly_increase() {
        let remote = MockContentStore::new();
        let assets = store(&remote);
        let mut last = 0;
        for _ in 0..100 {
            let stamp = assets.next_stamp();
            assert!(stamp > last);
            last = stamp;
        }
    }
}
