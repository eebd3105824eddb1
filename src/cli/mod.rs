//! cli
//!
//! Command-line interface layer for Pagewright.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT talk to the remote directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! the command handlers, which drive everything through
//! [`crate::workspace::Workspace`]. Mutations are gated there, not here.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::ui::output::Verbosity;
use anyhow::Result;

/// Per-invocation context derived from global flags.
#[derive(Debug, Clone)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Minimal output.
    pub quiet: bool,
    /// Interactive prompts allowed.
    pub interactive: bool,
    /// Resolved output verbosity.
    pub verbosity: Verbosity,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };

    commands::dispatch(cli.command, cli.config.as_deref(), &ctx).await
}
