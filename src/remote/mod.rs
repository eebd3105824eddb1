//! remote
//!
//! Abstraction over the remote content repository.
//!
//! # Architecture
//!
//! The `ContentStore` trait defines the five primitives the remote service
//! offers: versioned read, conditional write, namespace listing, identity
//! resolution, and repository permission lookup. The stores in
//! [`crate::store`] are written against the trait and never against a
//! concrete backend.
//!
//! # Modules
//!
//! - `traits`: Core `ContentStore` trait and value types
//! - [`github`]: GitHub Contents API implementation
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use pagewright::remote::{github::GitHubContentStore, ContentStore};
//!
//! let remote = GitHubContentStore::new(Some(token), "owner", "site", "main");
//! let file = remote.read("index.html").await?;
//! println!("{} bytes at version {}", file.content.len(), file.version);
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
