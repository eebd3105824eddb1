//! secrets::traits
//!
//! Credential storage trait definition.
//!
//! # Design
//!
//! The `SecretStore` trait is a simple key-value interface. Keys are
//! namespaced (e.g., "github.credential") to avoid collisions.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include secrets in error messages
//! - Use storage mechanisms appropriate to the platform
//! - Be thread-safe (Send + Sync)

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Note: error messages intentionally do not include secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to read from secret storage.
    #[error("failed to read secret: {0}")]
    ReadError(String),

    /// Failed to write to secret storage.
    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// Failed to delete from secret storage.
    #[error("failed to delete secret: {0}")]
    DeleteError(String),
}

/// Trait for secret storage providers.
///
/// Implementations must be thread-safe (Send + Sync) and must never
/// log, print, or include secret values in error messages.
pub trait SecretStore: Send + Sync {
    /// Get a secret by key.
    ///
    /// Returns `Ok(Some(value))` if the secret exists, `Ok(None)` if it
    /// does not.
    ///
    /// # Security
    ///
    /// The returned value is the raw secret. Do not log or print it.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Set a secret, overwriting any existing value for the key.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Delete a secret.
    ///
    /// Returns `Ok(())` even if the secret did not exist, making delete
    /// idempotent.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    /// Check whether a secret exists without exposing its value.
    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}
