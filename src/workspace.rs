//! workspace
//!
//! The operator-facing facade over the gate and the stores.
//!
//! # Architecture
//!
//! The surrounding application (CLI here, the visual editor shell in the
//! original deployment) talks only to [`Workspace`]. Every mutating
//! operation passes the session gate first; read operations do not. The
//! workspace owns the "current page" notion (defaulting to `index.html`)
//! and routes edit notifications from the composition surface into the
//! dirty tracker.
//!
//! The workspace imposes no dirty-discard policy: callers consult
//! [`Workspace::is_dirty`] before navigation that would drop in-memory
//! edits and decide for themselves (confirm, implicit save, or abort).

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::core::config::SiteConfig;
use crate::core::naming::INDEX_PAGE;
use crate::core::session::SessionContext;
use crate::gate::{GateError, SessionGate};
use crate::remote::{
    github::GitHubContentStore, ContentStore, CredentialProvider, Identity, RemoteError,
};
use crate::store::{
    AssetEntry, AssetError, AssetStore, DocumentStore, ManifestAggregator, PageEntry, StoreError,
};
use crate::surface::{parse_page, CompositionSurface, DocumentBody};

/// Errors from workspace operations.
///
/// Every operation's outcome is discriminable: unauthorized, not-found,
/// already-exists, conflict, and generic failure each surface distinctly.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The session gate rejected the operation. Hard stop; the caller
    /// redirects to re-authentication.
    #[error(transparent)]
    Unauthorized(#[from] GateError),

    /// A document operation failed.
    #[error(transparent)]
    Page(#[from] StoreError),

    /// An asset operation failed.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The manifest could not be built.
    #[error("failed to build the page manifest: {0}")]
    ManifestFailed(RemoteError),
}

/// The operator facade.
pub struct Workspace {
    session: Arc<SessionContext>,
    gate: SessionGate,
    documents: DocumentStore,
    assets: AssetStore,
    manifest: ManifestAggregator,
    site_title: String,
    current_path: Mutex<Option<String>>,
}

impl Workspace {
    /// Wire a workspace over an injected remote (tests, alternate
    /// backends).
    pub fn new(
        config: &SiteConfig,
        session: Arc<SessionContext>,
        remote: Arc<dyn ContentStore>,
    ) -> Self {
        let gate = SessionGate::new(Arc::clone(&remote), config.allow_list.clone());
        let documents = DocumentStore::new(Arc::clone(&remote), session.dirty().clone());
        let assets = AssetStore::new(Arc::clone(&remote), config.assets_dir.clone());
        let manifest = ManifestAggregator::new(Arc::clone(&remote), config.pages_dir.clone());

        Self {
            session,
            gate,
            documents,
            assets,
            manifest,
            site_title: config.site_title.clone(),
            current_path: Mutex::new(None),
        }
    }

    /// Wire a workspace over the GitHub backend named by `config`.
    ///
    /// The session doubles as the credential provider, so sign-in and
    /// discard take effect immediately.
    pub fn for_github(config: &SiteConfig, session: Arc<SessionContext>) -> Self {
        let credentials: Arc<dyn CredentialProvider> = session.clone();
        let remote: Arc<dyn ContentStore> = Arc::new(GitHubContentStore::with_api_base(
            credentials,
            config.owner.clone(),
            config.repo.clone(),
            config.branch.clone(),
            config.api_base.clone(),
        ));
        Self::new(config, session, remote)
    }

    /// Verify the session and return the operator's identity for display.
    ///
    /// Run at the start of every protected session; nothing is cached.
    pub async fn sign_in(&self) -> Result<Identity, WorkspaceError> {
        Ok(self.gate.verify(&self.session).await?)
    }

    /// Build the page manifest.
    pub async fn list_pages(&self) -> Result<Vec<PageEntry>, WorkspaceError> {
        self.manifest
            .build()
            .await
            .map_err(WorkspaceError::ManifestFailed)
    }

    /// Load a page into the composition surface and make it current.
    /// Returns the raw stored document.
    ///
    /// Callers must consult [`Workspace::is_dirty`] first when the
    /// surface holds unsaved edits; this method replaces the editing
    /// state unconditionally.
    pub async fn open_page(
        &self,
        path: &str,
        surface: &mut dyn CompositionSurface,
    ) -> Result<String, WorkspaceError> {
        let content = self.documents.load(path).await?;
        surface.load_document(parse_page(&content));
        *self.current_path.lock().unwrap() = Some(path.to_string());
        Ok(content)
    }

    /// Create a new page from a document body.
    ///
    /// Refuses to overwrite: an occupied path surfaces as
    /// [`StoreError::AlreadyExists`]. The new page does not become
    /// current and the dirty flag is untouched.
    pub async fn create_page(
        &self,
        path: &str,
        body: &DocumentBody,
    ) -> Result<String, WorkspaceError> {
        self.gate.verify(&self.session).await?;
        let rendered = body.render(&self.site_title);
        Ok(self.documents.create(path, &rendered).await?)
    }

    /// Save the surface's current document.
    ///
    /// With no `path`, saves to the current page, or `index.html` when
    /// nothing has been opened yet. On success the saved path becomes
    /// current and the dirty flag is cleared (by the document store).
    pub async fn save(
        &self,
        path: Option<&str>,
        surface: &dyn CompositionSurface,
    ) -> Result<String, WorkspaceError> {
        let target = match path {
            Some(p) => p.to_string(),
            None => self
                .current_path
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| INDEX_PAGE.to_string()),
        };

        self.gate.verify(&self.session).await?;

        let rendered = surface.document().render(&self.site_title);
        let saved = self.documents.save(&target, &rendered).await?;
        *self.current_path.lock().unwrap() = Some(saved.clone());
        Ok(saved)
    }

    /// Save the surface's current document under a new explicit path.
    pub async fn save_as(
        &self,
        path: &str,
        surface: &dyn CompositionSurface,
    ) -> Result<String, WorkspaceError> {
        self.save(Some(path), surface).await
    }

    /// Copy an existing page to a new path without touching the surface.
    pub async fn duplicate(&self, source: &str, target: &str) -> Result<String, WorkspaceError> {
        self.gate.verify(&self.session).await?;
        Ok(self.documents.duplicate(source, target).await?)
    }

    /// Upload a binary asset, returning its freshly minted path.
    pub async fn upload_asset(
        &self,
        payload: &[u8],
        suggested_name: &str,
    ) -> Result<String, WorkspaceError> {
        self.gate.verify(&self.session).await?;
        Ok(self.assets.upload(payload, suggested_name).await?)
    }

    /// List existing assets.
    pub async fn list_assets(&self) -> Result<Vec<AssetEntry>, WorkspaceError> {
        Ok(self.assets.list_existing().await?)
    }

    /// Record an edit notification from the composition surface.
    pub fn note_edit(&self) {
        self.session.dirty().mark_dirty();
    }

    /// Whether unsaved edits exist.
    pub fn is_dirty(&self) -> bool {
        self.session.dirty().is_dirty()
    }

    /// The current page path, if one is open.
    pub fn current_path(&self) -> Option<String> {
        self.current_path.lock().unwrap().clone()
    }

    /// An empty document body for a brand-new page.
    pub fn blank_page(&self) -> DocumentBody {
        DocumentBody::default()
    }
}
