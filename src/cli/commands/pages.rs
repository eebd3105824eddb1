//! cli::commands::pages
//!
//! Page operations: list, get, save, new, duplicate.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::args::PagesCommand;
use crate::cli::Context;
use crate::core::naming::normalize_page_path;
use crate::store::StoreError;
use crate::surface::{BufferSurface, DocumentBody};
use crate::ui::output;
use crate::workspace::WorkspaceError;

use super::{load_config, open_workspace, report_failure};

/// Dispatch a pages subcommand.
pub async fn run(ctx: &Context, config_path: Option<&Path>, cmd: PagesCommand) -> Result<()> {
    let config = load_config(config_path)?;
    let (_session, store, workspace) = open_workspace(&config)?;

    match cmd {
        PagesCommand::List => {
            let pages = workspace
                .list_pages()
                .await
                .map_err(|e| report_failure(e, store.as_ref()))?;
            if pages.is_empty() {
                output::print("No pages yet.", ctx.verbosity);
            } else {
                let entries: Vec<(String, String)> = pages
                    .into_iter()
                    .map(|p| (p.display_name, p.path))
                    .collect();
                println!("{}", output::format_listing(&entries));
            }
            Ok(())
        }

        PagesCommand::Get { page, out } => {
            let path = normalize_page_path(&page, &config.pages_dir);
            let mut surface = BufferSurface::default();
            match workspace.open_page(&path, &mut surface).await {
                Ok(content) => {
                    match out {
                        Some(file) => {
                            fs::write(&file, content)
                                .with_context(|| format!("Failed to write {}", file.display()))?;
                            output::success(
                                format!("Fetched {} into {}.", path, file.display()),
                                ctx.verbosity,
                            );
                        }
                        None => println!("{}", content),
                    }
                    Ok(())
                }
                Err(WorkspaceError::Page(StoreError::PageNotFound(_))) => {
                    anyhow::bail!(
                        "Page '{}' does not exist. Create it with 'pw pages new {}'.",
                        path,
                        page
                    )
                }
                Err(e) => Err(report_failure(e, store.as_ref())),
            }
        }

        PagesCommand::Save { file, css, page } => {
            let body = read_body(&file, css.as_deref())?;
            let surface = BufferSurface::new(body);
            let target = page.map(|p| normalize_page_path(&p, &config.pages_dir));

            match workspace.save(target.as_deref(), &surface).await {
                Ok(saved) => {
                    output::success(format!("Saved {}.", saved), ctx.verbosity);
                    Ok(())
                }
                Err(WorkspaceError::Page(StoreError::SaveConflict(path))) => {
                    anyhow::bail!(
                        "Save conflict on '{}': someone else is editing this page. \
                         Fetch the latest version and retry.",
                        path
                    )
                }
                Err(e) => Err(report_failure(e, store.as_ref())),
            }
        }

        PagesCommand::New { page, file } => {
            let path = normalize_page_path(&page, &config.pages_dir);
            let body = match file {
                Some(f) => read_body(&f, None)?,
                None => DocumentBody::default(),
            };

            match workspace.create_page(&path, &body).await {
                Ok(created) => {
                    output::success(format!("Created {}.", created), ctx.verbosity);
                    Ok(())
                }
                Err(WorkspaceError::Page(StoreError::AlreadyExists(path))) => {
                    anyhow::bail!(
                        "Page '{}' already exists. Use 'pw pages save' to replace its content.",
                        path
                    )
                }
                Err(e) => Err(report_failure(e, store.as_ref())),
            }
        }

        PagesCommand::Duplicate { source, target } => {
            let source = normalize_page_path(&source, &config.pages_dir);
            let target = normalize_page_path(&target, &config.pages_dir);

            match workspace.duplicate(&source, &target).await {
                Ok(created) => {
                    output::success(
                        format!("Duplicated {} to {}.", source, created),
                        ctx.verbosity,
                    );
                    Ok(())
                }
                Err(WorkspaceError::Page(StoreError::PageNotFound(path))) => {
                    anyhow::bail!("Source page '{}' does not exist.", path)
                }
                Err(WorkspaceError::Page(StoreError::AlreadyExists(path))) => {
                    anyhow::bail!("Target page '{}' already exists.", path)
                }
                Err(e) => Err(report_failure(e, store.as_ref())),
            }
        }
    }
}

/// Read markup (and optionally a style sheet) into a document body.
fn read_body(markup_file: &Path, css_file: Option<&Path>) -> Result<DocumentBody> {
    let markup = fs::read_to_string(markup_file)
        .with_context(|| format!("Failed to read {}", markup_file.display()))?;
    let styles = match css_file {
        Some(f) => {
            fs::read_to_string(f).with_context(|| format!("Failed to read {}", f.display()))?
        }
        None => String::new(),
    };
    Ok(DocumentBody::new(markup, styles))
}
