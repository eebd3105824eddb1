//! store
//!
//! The document and asset store over the remote content repository.
//!
//! # Architecture
//!
//! Everything here is written against the [`crate::remote::ContentStore`]
//! trait; no module knows which backend it talks to. The remote offers
//! only per-path read-current-version and write-if-version-matches, so
//! the stores layer document semantics on top:
//!
//! - [`documents`]: page load/save/create/duplicate with the
//!   compare-and-swap retry-once save protocol
//! - [`assets`]: append-only uploads under collision-free minted paths
//! - [`manifest`]: the derived page manifest, aggregated from two
//!   independent listings
//! - [`dirty`]: the unsaved-edit flag guarding destructive navigation

pub mod assets;
pub mod dirty;
pub mod documents;
pub mod manifest;

pub use assets::{AssetEntry, AssetError, AssetStore};
pub use dirty::DirtyTracker;
pub use documents::{DocumentStore, StoreError};
pub use manifest::{ManifestAggregator, PageEntry};
