//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use an explicit config file
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Pagewright - edit a GitHub Pages site from the command line
#[derive(Parser, Debug)]
#[command(name = "pw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in, check status, or sign out
    #[command(
        name = "auth",
        long_about = "Store and verify the GitHub credential for the editing session.\n\n\
            The credential is verified against the editor allow-list and the \
            repository's push permission before it is accepted. A credential \
            that fails verification is discarded immediately.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Paste a token interactively (input is masked)
    pw auth

    # Non-interactive
    pw auth --token ghp_xxxx

    # Open the external sign-in page configured as sign_in_url
    pw auth --web

    # Check who is signed in
    pw auth --status

    # Discard the stored credential
    pw auth --logout"
    )]
    Auth {
        /// Provide the token directly instead of prompting
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,

        /// Open the configured external sign-in page in a browser
        #[arg(long, conflicts_with_all = ["token", "status", "logout"])]
        web: bool,

        /// Show authentication status instead of storing a token
        #[arg(long)]
        status: bool,

        /// Remove the stored credential
        #[arg(long)]
        logout: bool,
    },

    /// List, fetch, save, create, and duplicate site pages
    #[command(subcommand)]
    Pages(PagesCommand),

    /// Upload and list binary assets
    #[command(subcommand)]
    Assets(AssetsCommand),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Page operations.
#[derive(Subcommand, Debug)]
pub enum PagesCommand {
    /// List all known pages (index first, then the pages directory)
    List,

    /// Fetch a page into a local file
    Get {
        /// Page path (`index.html`, `pages/about.html`, or a bare name)
        page: String,

        /// Write the document here instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Save a local document to a page, replacing its content
    Save {
        /// Markup file to save
        #[arg(long, value_name = "FILE")]
        file: PathBuf,

        /// Style sheet inlined into the rendered page
        #[arg(long, value_name = "FILE")]
        css: Option<PathBuf>,

        /// Target page; defaults to index.html
        page: Option<String>,
    },

    /// Create a new page; refuses to overwrite an existing one
    New {
        /// Page path or bare name (`about` becomes `pages/about.html`)
        page: String,

        /// Markup file for the initial content; empty page if omitted
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Copy an existing page to a new path
    Duplicate {
        /// Source page path
        source: String,

        /// Target page path or bare name
        target: String,
    },
}

/// Asset operations.
#[derive(Subcommand, Debug)]
pub enum AssetsCommand {
    /// Upload a binary file; prints the minted asset path
    Upload {
        /// File to upload
        file: PathBuf,

        /// Name to derive the asset slug from; defaults to the file name
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// List existing assets
    List,
}

/// Shells completions can be generated for.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_pages_save_with_target() {
        let cli = Cli::try_parse_from([
            "pw", "pages", "save", "--file", "body.html", "pages/about.html",
        ])
        .unwrap();
        match cli.command {
            Command::Pages(PagesCommand::Save { page, file, css }) => {
                assert_eq!(page.as_deref(), Some("pages/about.html"));
                assert_eq!(file, PathBuf::from("body.html"));
                assert!(css.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn quiet_disables_interactive() {
        let cli = Cli::try_parse_from(["pw", "--quiet", "pages", "list"]).unwrap();
        assert!(!cli.interactive());
    }

    #[test]
    fn auth_web_conflicts_with_token() {
        let result = Cli::try_parse_from(["pw", "auth", "--web", "--token", "x"]);
        assert!(result.is_err());
    }
}
