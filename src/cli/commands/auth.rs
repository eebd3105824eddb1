//! cli::commands::auth
//!
//! Authentication command for the editing session.
//!
//! # Design
//!
//! A pasted credential is verified before it is persisted: identity,
//! allow-list, and repository permission all have to pass. A credential
//! that fails any step is discarded immediately, in memory and on disk.
//!
//! This command NEVER prints the credential value.

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::secrets::CREDENTIAL_KEY;
use crate::ui::{output, prompts};

use super::{load_config, open_workspace, report_failure};

/// Run the auth command.
pub async fn auth(
    ctx: &Context,
    config_path: Option<&Path>,
    token: Option<&str>,
    web: bool,
    status: bool,
    logout: bool,
) -> Result<()> {
    let config = load_config(config_path)?;

    // Handle --web: hand off to the external sign-in entry point.
    if web {
        let url = config
            .sign_in_url
            .as_deref()
            .context("No sign_in_url configured; paste a token with 'pw auth' instead")?;
        output::print(format!("Opening {} ...", url), ctx.verbosity);
        open::that(url).context("Failed to open the sign-in page")?;
        output::print(
            "Complete the sign-in in your browser, then store the token with 'pw auth'.",
            ctx.verbosity,
        );
        return Ok(());
    }

    let (session, store, workspace) = open_workspace(&config)?;

    // Handle --status: verify whatever is stored, change nothing on
    // success.
    if status {
        if !session.has_credential() {
            if ctx.quiet {
                println!("not-signed-in");
            } else {
                println!("Not signed in. Run 'pw auth' to sign in.");
            }
            return Ok(());
        }
        return match workspace.sign_in().await {
            Ok(identity) => {
                if ctx.quiet {
                    println!("signed-in");
                } else {
                    println!("Signed in as {}.", identity.handle);
                }
                Ok(())
            }
            Err(e) => Err(report_failure(e, store.as_ref())),
        };
    }

    // Handle --logout.
    if logout {
        store
            .delete(CREDENTIAL_KEY)
            .context("Failed to remove stored credential")?;
        session.clear_credential();
        output::print("Signed out.", ctx.verbosity);
        return Ok(());
    }

    // Store a new credential: argument or masked prompt.
    let token_value = match token {
        Some(t) => t.to_string(),
        None => {
            if !ctx.interactive {
                bail!("Token required. Use --token <TOKEN> or run interactively.");
            }
            prompts::password("GitHub token", ctx.interactive)
                .context("Failed to read token")?
        }
    };

    if token_value.is_empty() {
        bail!("Token cannot be empty.");
    }

    // Verify before persisting; a bad credential is never written.
    session.set_credential(token_value.clone());
    match workspace.sign_in().await {
        Ok(identity) => {
            store
                .set(CREDENTIAL_KEY, &token_value)
                .context("Failed to store credential")?;
            output::success(
                format!("Signed in as {}. Access granted.", identity.handle),
                ctx.verbosity,
            );
            Ok(())
        }
        Err(e) => Err(report_failure(e, store.as_ref())),
    }
}
