//! cli::commands::assets
//!
//! Asset operations: upload and list.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::args::AssetsCommand;
use crate::cli::Context;
use crate::ui::output;

use super::{load_config, open_workspace, report_failure};

/// Dispatch an assets subcommand.
pub async fn run(ctx: &Context, config_path: Option<&Path>, cmd: AssetsCommand) -> Result<()> {
    let config = load_config(config_path)?;
    let (_session, store, workspace) = open_workspace(&config)?;

    match cmd {
        AssetsCommand::Upload { file, name } => {
            let payload = fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let suggested = name.unwrap_or_else(|| {
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });

            let path = workspace
                .upload_asset(&payload, &suggested)
                .await
                .map_err(|e| report_failure(e, store.as_ref()))?;

            // The minted path is the output other tools consume; print it
            // even in quiet mode.
            println!("{}", path);
            output::success("Upload complete.", ctx.verbosity);
            Ok(())
        }

        AssetsCommand::List => {
            let assets = workspace
                .list_assets()
                .await
                .map_err(|e| report_failure(e, store.as_ref()))?;
            if assets.is_empty() {
                output::print("No assets yet.", ctx.verbosity);
            } else {
                let entries: Vec<(String, String)> = assets
                    .into_iter()
                    .map(|a| (a.display_name, a.path))
                    .collect();
                println!("{}", output::format_listing(&entries));
            }
            Ok(())
        }
    }
}
