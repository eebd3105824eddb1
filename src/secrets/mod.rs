//! secrets
//!
//! Credential storage between processes.
//!
//! # Architecture
//!
//! The bearer credential captured by the external sign-in flow has to
//! survive from one CLI invocation to the next; it is read at process
//! start and deleted when verification fails. Storage goes through the
//! `SecretStore` trait with one implementation:
//!
//! - [`FileSecretStore`]: `~/.pagewright/secrets.toml` (0600 on Unix,
//!   atomic writes)
//!
//! # Security
//!
//! - Secrets are **never** logged or included in error messages
//! - All writes are atomic (temp file + rename)

mod file_store;
mod traits;

pub use file_store::FileSecretStore;
pub use traits::{SecretError, SecretStore};

/// Secret key under which the GitHub bearer credential is stored.
pub const CREDENTIAL_KEY: &str = "github.credential";

/// Create the default secret store.
pub fn default_store() -> Result<Box<dyn SecretStore>, SecretError> {
    Ok(Box::new(FileSecretStore::new()?))
}
