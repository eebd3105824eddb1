//! store::manifest
//!
//! Derived page manifest, aggregated from two independent remote listings.
//!
//! # Design
//!
//! The manifest has no single writer; it is rebuilt on demand from the
//! root namespace listing (for `index.html`) and the pages-subdirectory
//! listing. `index.html` always comes first when present; subdirectory
//! entries keep the order the service returned them in. A missing
//! namespace is an empty listing, not an error; that is the normal state
//! of a freshly created store.

use std::sync::Arc;

use crate::core::naming::{INDEX_PAGE, PAGE_EXT};
use crate::remote::{ContentStore, EntryKind, RemoteError};

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// Repository path (`pages/about.html`).
    pub path: String,
    /// Name shown to the operator (`about.html`).
    pub display_name: String,
}

/// Builds the page manifest from remote listings.
pub struct ManifestAggregator {
    remote: Arc<dyn ContentStore>,
    pages_dir: String,
}

impl ManifestAggregator {
    /// Create an aggregator listing pages under `pages_dir`.
    pub fn new(remote: Arc<dyn ContentStore>, pages_dir: impl Into<String>) -> Self {
        Self {
            remote,
            pages_dir: pages_dir.into(),
        }
    }

    /// Build the ordered manifest.
    ///
    /// # Errors
    ///
    /// Propagates remote failures other than `NotFound`; both listings
    /// treat `NotFound` as empty.
    pub async fn build(&self) -> Result<Vec<PageEntry>, RemoteError> {
        let root = self.list_or_empty("").await?;
        let pages = self.list_or_empty(&self.pages_dir).await?;

        let mut manifest = Vec::new();

        // index.html first, if the root has one
        if root
            .iter()
            .any(|e| e.kind == EntryKind::File && e.name == INDEX_PAGE)
        {
            manifest.push(PageEntry {
                path: INDEX_PAGE.to_string(),
                display_name: INDEX_PAGE.to_string(),
            });
        }

        // Remaining pages in listing order, never re-sorted
        for entry in pages {
            if entry.kind == EntryKind::File && entry.name.ends_with(PAGE_EXT) {
                manifest.push(PageEntry {
                    path: entry.path,
                    display_name: entry.name,
                });
            }
        }

        Ok(manifest)
    }

    async fn list_or_empty(
        &self,
        namespace: &str,
    ) -> Result<Vec<crate::remote::ListEntry>, RemoteError> {
        match self.remote.list(namespace).await {
            Ok(entries) => Ok(entries),
            Err(RemoteError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}
