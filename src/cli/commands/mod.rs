//! cli::commands
//!
//! Command handlers. Each handler loads what it needs, drives the
//! workspace facade, and reports a discrete outcome for every operation.

mod assets;
mod auth;
mod completion;
mod pages;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::cli::Context;
use crate::core::config::SiteConfig;
use crate::core::session::SessionContext;
use crate::gate::GateError;
use crate::secrets::{self, SecretStore, CREDENTIAL_KEY};
use crate::workspace::{Workspace, WorkspaceError};

/// Dispatch a parsed command to its handler.
pub async fn dispatch(command: Command, config_path: Option<&Path>, ctx: &Context) -> Result<()> {
    match command {
        Command::Auth {
            token,
            web,
            status,
            logout,
        } => auth::auth(ctx, config_path, token.as_deref(), web, status, logout).await,
        Command::Pages(cmd) => pages::run(ctx, config_path, cmd).await,
        Command::Assets(cmd) => assets::run(ctx, config_path, cmd).await,
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load the site configuration, honoring `--config`.
pub(crate) fn load_config(config_path: Option<&Path>) -> Result<SiteConfig> {
    match config_path {
        Some(path) => SiteConfig::load_from(path),
        None => SiteConfig::load(),
    }
    .context("Failed to load site configuration")
}

/// Build a session seeded with the persisted credential, plus the
/// workspace over the configured GitHub repository.
pub(crate) fn open_workspace(
    config: &SiteConfig,
) -> Result<(Arc<SessionContext>, Box<dyn SecretStore>, Workspace)> {
    let store = secrets::default_store().context("Failed to open credential storage")?;
    let credential = store
        .get(CREDENTIAL_KEY)
        .context("Failed to read stored credential")?;

    let session = Arc::new(SessionContext::new(credential));
    let workspace = Workspace::for_github(config, Arc::clone(&session));
    Ok((session, store, workspace))
}

/// Report a workspace failure. Gate rejections additionally delete the
/// persisted credential (the in-memory one is already discarded) and
/// point the operator back at sign-in.
pub(crate) fn report_failure(err: WorkspaceError, store: &dyn SecretStore) -> anyhow::Error {
    if let WorkspaceError::Unauthorized(ref gate_err) = err {
        // Idempotent; a failed delete changes nothing the next run
        // cannot handle.
        let _ = store.delete(CREDENTIAL_KEY);
        if !matches!(gate_err, GateError::NoCredential) {
            return anyhow::anyhow!("Access denied: {gate_err}. Run 'pw auth' to sign in again.");
        }
        return anyhow::anyhow!("Not signed in. Run 'pw auth' first.");
    }
    anyhow::Error::new(err)
}
