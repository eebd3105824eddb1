//! Pagewright - document and asset store for a GitHub-backed site editor
//!
//! Pagewright persists the pages and assets of a visually edited site
//! into a GitHub repository that also serves them (GitHub Pages). The
//! Contents API offers only read-current-version and
//! write-if-version-matches per path; this crate layers safe
//! concurrent-edit semantics on top: optimistic-concurrency saves with a
//! single bounded retry, a derived page manifest, collision-free asset
//! naming, an authorization gate in front of every mutation, and a
//! dirty-state tracker guarding unsaved edits.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the workspace)
//! - [`workspace`] - Operator facade wiring the gate and the stores
//! - [`store`] - Documents, assets, manifest, and the dirty flag
//! - [`gate`] - Session verification (identity, allow-list, permission)
//! - [`remote`] - ContentStore trait with GitHub and mock backends
//! - [`surface`] - Seam to the visual composition surface
//! - [`core`] - Configuration, naming rules, session context
//! - [`secrets`] - Credential persistence between processes
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! 1. Every mutation passes the session gate first
//! 2. A concurrent writer's intent is never silently overwritten: a save
//!    either rebases onto the latest version once or reports a conflict
//! 3. A failed save never reports the session clean
//! 4. Asset paths are minted fresh per upload and never reused

pub mod cli;
pub mod core;
pub mod gate;
pub mod remote;
pub mod secrets;
pub mod store;
pub mod surface;
pub mod ui;
pub mod workspace;
