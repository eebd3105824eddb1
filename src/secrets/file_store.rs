//! secrets::file_store
//!
//! File-based credential storage.
//!
//! # Security
//!
//! - Secrets are stored in `~/.pagewright/secrets.toml`
//! - File permissions are set to 0600 on Unix (owner read/write only)
//! - All writes are atomic (write to temp file, then rename)
//! - Secrets are NEVER logged, printed, or included in error messages

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

/// File-based credential storage.
///
/// Stores secrets in a TOML file at `~/.pagewright/secrets.toml`. This is
/// how the bearer credential survives between CLI invocations.
#[derive(Debug)]
pub struct FileSecretStore {
    /// Path to the secrets file
    path: PathBuf,
}

impl FileSecretStore {
    /// Create a store at the default location,
    /// `~/.pagewright/secrets.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        let path = home.join(".pagewright").join("secrets.toml");
        Ok(Self { path })
    }

    /// Create a store at a custom path (primarily for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the path to the secrets file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read all secrets from the file.
    fn read_secrets(&self) -> Result<HashMap<String, String>, SecretError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read secrets file: {}", e)))?;

        let secrets: HashMap<String, String> = toml::from_str(&content)
            .map_err(|e| SecretError::ReadError(format!("cannot parse secrets file: {}", e)))?;

        Ok(secrets)
    }

    /// Write secrets to the file with atomic write and 0600 permissions.
    fn write_secrets(&self, secrets: &HashMap<String, String>) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SecretError::WriteError(format!("cannot create directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(secrets)
            .map_err(|e| SecretError::WriteError(format!("cannot serialize secrets: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| SecretError::WriteError(format!("cannot create temp file: {}", e)))?;

            // Restrict permissions BEFORE writing content (Unix only)
            #[cfg(unix)]
            {
                let permissions = fs::Permissions::from_mode(0o600);
                file.set_permissions(permissions).map_err(|e| {
                    SecretError::WriteError(format!("cannot set permissions: {}", e))
                })?;
            }

            file.write_all(content.as_bytes())
                .map_err(|e| SecretError::WriteError(format!("cannot write secrets: {}", e)))?;

            file.sync_all()
                .map_err(|e| SecretError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| SecretError::WriteError(format!("cannot rename temp file: {}", e)))?;

        Ok(())
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        let secrets = self.read_secrets()?;
        Ok(secrets.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut secrets = self.read_secrets().unwrap_or_default();
        secrets.insert(key.to_string(), value.to_string());
        self.write_secrets(&secrets)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut secrets = match self.read_secrets() {
            Ok(s) => s,
            // Nothing stored means nothing to delete
            Err(_) => return Ok(()),
        };
        if secrets.remove(key).is_some() {
            self.write_secrets(&secrets)
                .map_err(|e| SecretError::DeleteError(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileSecretStore) {
        let dir = TempDir::new().unwrap();
        let store = FileSecretStore::with_path(dir.path().join("secrets.toml"));
        (dir, store)
    }

    #[test]
    fn get_missing_returns_none() {
        let (_dir, store) = temp_store();
        assert!(store.get("github.credential").unwrap().is_none());
    }

    #[test]
    fn set_then_get_round_trips() {
        let (_dir, store) = temp_store();
        store.set("github.credential", "tok-value").unwrap();
        assert_eq!(
            store.get("github.credential").unwrap().as_deref(),
            Some("tok-value")
        );
    }

    #[test]
    fn set_overwrites() {
        let (_dir, store) = temp_store();
        store.set("github.credential", "old").unwrap();
        store.set("github.credential", "new").unwrap();
        assert_eq!(
            store.get("github.credential").unwrap().as_deref(),
            Some("new")
        );
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, store) = temp_store();
        store.set("github.credential", "tok").unwrap();
        store.delete("github.credential").unwrap();
        store.delete("github.credential").unwrap();
        assert!(store.get("github.credential").unwrap().is_none());
    }

    #[test]
    fn exists_does_not_expose_value() {
        let (_dir, store) = temp_store();
        assert!(!store.exists("github.credential").unwrap());
        store.set("github.credential", "tok").unwrap();
        assert!(store.exists("github.credential").unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_owner_only() {
        let (_dir, store) = temp_store();
        store.set("github.credential", "tok").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
