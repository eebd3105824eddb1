//! core::config
//!
//! Site configuration schema and loading.
//!
//! # Overview
//!
//! One TOML file names the content repository and who may edit it:
//!
//! ```toml
//! owner = "farouk858"
//! repo = "farouk858-site"
//! branch = "main"
//! allow_list = ["farouk858"]
//! site_title = "farouk858 portfolio"
//! sign_in_url = "https://builder.example.workers.dev/login"
//! ```
//!
//! # Locations
//!
//! Searched in order, first hit wins:
//! 1. `$PAGEWRIGHT_CONFIG` if set
//! 2. `./pagewright.toml`
//! 3. `~/.config/pagewright/config.toml`
//!
//! Missing optional fields take defaults; a missing file is an error,
//! since the crate cannot guess the target repository.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::remote::github::DEFAULT_API_BASE;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PAGEWRIGHT_CONFIG";

/// Project-local config file name.
pub const PROJECT_CONFIG: &str = "pagewright.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config file found; create '{PROJECT_CONFIG}' or set ${CONFIG_ENV}")]
    NotFound,

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Site configuration.
///
/// Identifies the content repository, the branch it serves from, and the
/// operators allowed through the session gate.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch all reads and writes target.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Handles allowed to edit, compared case-insensitively.
    #[serde(default)]
    pub allow_list: Vec<String>,
    /// API base URL (override for GitHub Enterprise).
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Namespace for page documents other than the index.
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,
    /// Namespace for uploaded assets.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    /// Title rendered into saved page documents.
    #[serde(default = "default_site_title")]
    pub site_title: String,
    /// External sign-in entry point (the OAuth worker), if any.
    #[serde(default)]
    pub sign_in_url: Option<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

fn default_site_title() -> String {
    "pagewright site".to_string()
}

impl SiteConfig {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if no file is found, if the file cannot be
    /// parsed, or if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::find_config_file().ok_or(ConfigError::NotFound)?;
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: SiteConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (primarily for tests).
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Find the first existing config file per the documented precedence.
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let project = PathBuf::from(PROJECT_CONFIG);
        if project.exists() {
            return Some(project);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user = config_dir.join("pagewright").join("config.toml");
            if user.exists() {
                return Some(user);
            }
        }

        None
    }

    /// Validate loaded values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.trim().is_empty() {
            return Err(ConfigError::InvalidValue("owner must not be empty".into()));
        }
        if self.repo.trim().is_empty() {
            return Err(ConfigError::InvalidValue("repo must not be empty".into()));
        }
        if self.branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue("branch must not be empty".into()));
        }
        if self.pages_dir.contains('/') || self.assets_dir.contains('/') {
            return Err(ConfigError::InvalidValue(
                "pages_dir and assets_dir must be single path segments".into(),
            ));
        }
        Ok(())
    }
}
