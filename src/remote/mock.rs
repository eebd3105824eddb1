//! remote::mock
//!
//! Mock ContentStore implementation for deterministic testing.
//!
//! # Design
//!
//! The mock store keeps files in memory behind a mutex and enforces the
//! same conditional-write semantics the real service does: a token-less
//! write fails if the path is occupied, a tokened write fails if the
//! token is stale. Version tokens are minted from a counter.
//!
//! Two extra levers exist for exercising the save protocol:
//! - [`MockContentStore::contend_next_writes`] simulates a concurrent
//!   writer committing to the path just before each of the next N writes
//!   lands, so those writes lose the compare-and-swap.
//! - [`MockContentStore::fail_on`] forces a chosen operation to return a
//!   configured error.
//!
//! # Example
//!
//! ```
//! use pagewright::remote::mock::MockContentStore;
//! use pagewright::remote::ContentStore;
//!
//! # tokio_test::block_on(async {
//! let remote = MockContentStore::new();
//!
//! let written = remote
//!     .write("index.html", b"<h1>hi</h1>", None, "chore: create")
//!     .await
//!     .unwrap();
//!
//! let file = remote.read("index.html").await.unwrap();
//! assert_eq!(file.content, b"<h1>hi</h1>");
//! assert_eq!(file.version, written.version);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::traits::{
    ContentStore, EntryKind, Identity, ListEntry, RemoteError, RemoteFile, RepoAccess, WrittenFile,
};

/// Mock remote store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockContentStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockInner {
    /// Stored files by full path. BTreeMap keeps listing order stable
    /// unless a test overrides it via `set_listing_order`.
    files: BTreeMap<String, MockFile>,
    /// Explicit listing order per namespace, when a test needs non-sorted
    /// service order.
    listing_order: BTreeMap<String, Vec<String>>,
    /// Next version token to mint.
    next_version: u64,
    /// Writes that will lose the compare-and-swap to a simulated
    /// concurrent commit.
    contended_writes: u32,
    /// Operation to fail, if configured.
    fail_on: Option<FailOn>,
    /// Identity returned by `identity()`.
    identity: Result<Identity, RemoteError>,
    /// Access returned by `repo_access()`.
    access: Result<RepoAccess, RemoteError>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// A stored file.
#[derive(Debug, Clone)]
struct MockFile {
    content: Vec<u8>,
    version: String,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail read with the given error.
    Read(RemoteError),
    /// Fail write with the given error.
    Write(RemoteError),
    /// Fail list with the given error.
    List(RemoteError),
    /// Fail identity with the given error.
    Identity(RemoteError),
    /// Fail repo_access with the given error.
    RepoAccess(RemoteError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Read { path: String },
    Write { path: String, had_version: bool },
    List { namespace: String },
    Identity,
    RepoAccess,
}

impl Default for MockContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockContentStore {
    /// Create a new empty mock store.
    ///
    /// Identity defaults to handle `"octocat"` with write access.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner {
                files: BTreeMap::new(),
                listing_order: BTreeMap::new(),
                next_version: 1,
                contended_writes: 0,
                fail_on: None,
                identity: Ok(Identity {
                    handle: "octocat".to_string(),
                }),
                access: Ok(RepoAccess { can_write: true }),
                operations: Vec::new(),
            })),
        }
    }

    /// Seed a file, bypassing conditional-write checks.
    pub fn seed(&self, path: &str, content: &[u8]) -> String {
        let mut inner = self.inner.lock().unwrap();
        let version = format!("v{}", inner.next_version);
        inner.next_version += 1;
        inner.files.insert(
            path.to_string(),
            MockFile {
                content: content.to_vec(),
                version: version.clone(),
            },
        );
        version
    }

    /// Commit new content to a path as an out-of-band writer would,
    /// invalidating any token previously read for it.
    pub fn commit_external(&self, path: &str, content: &[u8]) -> String {
        self.seed(path, content)
    }

    /// Make the next `n` writes lose the compare-and-swap: immediately
    /// before each lands, a simulated concurrent writer commits to the
    /// target path.
    pub fn contend_next_writes(&self, n: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.contended_writes = n;
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Set the identity `identity()` resolves.
    pub fn with_identity(self, handle: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.identity = Ok(Identity {
                handle: handle.to_string(),
            });
        }
        self
    }

    /// Set the repository access `repo_access()` reports.
    pub fn with_access(self, can_write: bool) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.access = Ok(RepoAccess { can_write });
        }
        self
    }

    /// Fix the listing order of a namespace, overriding path-sorted order.
    ///
    /// Names are bare file names; entries not stored are skipped when the
    /// namespace is listed.
    pub fn set_listing_order(&self, namespace: &str, names: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        inner.listing_order.insert(
            namespace.to_string(),
            names.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Count of writes recorded so far.
    pub fn write_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::Write { .. }))
            .count()
    }

    /// Current content at a path (for test verification).
    pub fn content_at(&self, path: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.files.get(path).map(|f| f.content.clone())
    }

    /// Number of stored files under a namespace prefix.
    pub fn count_under(&self, namespace: &str) -> usize {
        let prefix = format!("{}/", namespace);
        let inner = self.inner.lock().unwrap();
        inner.files.keys().filter(|k| k.starts_with(&prefix)).count()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail<T>(&self, expected: &str) -> Option<Result<T, RemoteError>> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::Read(e)) if expected == "read" => Some(Err(e.clone())),
            Some(FailOn::Write(e)) if expected == "write" => Some(Err(e.clone())),
            Some(FailOn::List(e)) if expected == "list" => Some(Err(e.clone())),
            Some(FailOn::Identity(e)) if expected == "identity" => Some(Err(e.clone())),
            Some(FailOn::RepoAccess(e)) if expected == "repo_access" => Some(Err(e.clone())),
            _ => None,
        }
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn read(&self, path: &str) -> Result<RemoteFile, RemoteError> {
        self.record(MockOperation::Read {
            path: path.to_string(),
        });
        if let Some(fail) = self.check_fail("read") {
            return fail;
        }

        let inner = self.inner.lock().unwrap();
        match inner.files.get(path) {
            Some(file) => Ok(RemoteFile {
                content: file.content.clone(),
                version: file.version.clone(),
            }),
            None => Err(RemoteError::NotFound(path.to_string())),
        }
    }

    async fn write(
        &self,
        path: &str,
        content: &[u8],
        expected_version: Option<&str>,
        _message: &str,
    ) -> Result<WrittenFile, RemoteError> {
        self.record(MockOperation::Write {
            path: path.to_string(),
            had_version: expected_version.is_some(),
        });
        if let Some(fail) = self.check_fail("write") {
            return fail;
        }

        let mut inner = self.inner.lock().unwrap();

        // Simulated concurrent writer lands first and takes the version.
        if inner.contended_writes > 0 {
            inner.contended_writes -= 1;
            let version = format!("v{}", inner.next_version);
            inner.next_version += 1;
            inner.files.insert(
                path.to_string(),
                MockFile {
                    content: b"<!-- concurrent edit -->".to_vec(),
                    version,
                },
            );
            return Err(RemoteError::VersionConflict(path.to_string()));
        }

        match (inner.files.get(path), expected_version) {
            // Create: only if absent
            (Some(_), None) => return Err(RemoteError::VersionConflict(path.to_string())),
            // Replace: only if the token still matches
            (Some(existing), Some(expected)) if existing.version != expected => {
                return Err(RemoteError::VersionConflict(path.to_string()))
            }
            // A token for a path that no longer exists is stale too
            (None, Some(_)) => return Err(RemoteError::VersionConflict(path.to_string())),
            _ => {}
        }

        let version = format!("v{}", inner.next_version);
        inner.next_version += 1;
        inner.files.insert(
            path.to_string(),
            MockFile {
                content: content.to_vec(),
                version: version.clone(),
            },
        );

        Ok(WrittenFile { version })
    }

    async fn list(&self, namespace: &str) -> Result<Vec<ListEntry>, RemoteError> {
        self.record(MockOperation::List {
            namespace: namespace.to_string(),
        });
        if let Some(fail) = self.check_fail("list") {
            return fail;
        }

        let inner = self.inner.lock().unwrap();
        let prefix = if namespace.is_empty() {
            String::new()
        } else {
            format!("{}/", namespace)
        };

        // Direct children only; deeper paths show up as one directory entry.
        let mut entries: Vec<ListEntry> = Vec::new();
        let mut seen_dirs: Vec<String> = Vec::new();
        for path in inner.files.keys() {
            let rest = match path.strip_prefix(&prefix) {
                Some(r) => r,
                None => continue,
            };
            if rest.is_empty() {
                continue;
            }
            match rest.split_once('/') {
                None => entries.push(ListEntry {
                    name: rest.to_string(),
                    path: path.clone(),
                    kind: EntryKind::File,
                }),
                Some((dir, _)) => {
                    if !seen_dirs.iter().any(|d| d == dir) {
                        seen_dirs.push(dir.to_string());
                        entries.push(ListEntry {
                            name: dir.to_string(),
                            path: format!("{}{}", prefix, dir),
                            kind: EntryKind::Directory,
                        });
                    }
                }
            }
        }

        if entries.is_empty() {
            return Err(RemoteError::NotFound(namespace.to_string()));
        }

        // Apply forced service order if the test set one.
        if let Some(order) = inner.listing_order.get(namespace) {
            let mut ordered = Vec::new();
            for name in order {
                if let Some(pos) = entries.iter().position(|e| &e.name == name) {
                    ordered.push(entries.remove(pos));
                }
            }
            ordered.extend(entries);
            return Ok(ordered);
        }

        Ok(entries)
    }

    async fn identity(&self) -> Result<Identity, RemoteError> {
        self.record(MockOperation::Identity);
        if let Some(fail) = self.check_fail("identity") {
            return fail;
        }
        let inner = self.inner.lock().unwrap();
        inner.identity.clone()
    }

    async fn repo_access(&self) -> Result<RepoAccess, RemoteError> {
        self.record(MockOperation::RepoAccess);
        if let Some(fail) = self.check_fail("repo_access") {
            return fail;
        }
        let inner = self.inner.lock().unwrap();
        inner.access.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_read_round_trips() {
        let remote = MockContentStore::new();
        let written = remote
            .write("index.html", b"body", None, "chore: create")
            .await
            .unwrap();

        let file = remote.read("index.html").await.unwrap();
        assert_eq!(file.content, b"body");
        assert_eq!(file.version, written.version);
    }

    #[tokio::test]
    async fn create_on_occupied_path_conflicts() {
        let remote = MockContentStore::new();
        remote.seed("index.html", b"existing");

        let err = remote
            .write("index.html", b"new", None, "chore: create")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::VersionConflict(_)));
    }

    #[tokio::test]
    async fn stale_token_conflicts_fresh_token_wins() {
        let remote = MockContentStore::new();
        let stale = remote.seed("index.html", b"one");
        let fresh = remote.commit_external("index.html", b"two");

        let err = remote
            .write("index.html", b"three", Some(&stale), "chore: save")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::VersionConflict(_)));

        remote
            .write("index.html", b"three", Some(&fresh), "chore: save")
            .await
            .unwrap();
        assert_eq!(remote.content_at("index.html").unwrap(), b"three");
    }

    #[tokio::test]
    async fn contended_write_loses_then_recovers() {
        let remote = MockContentStore::new();
        let version = remote.seed("index.html", b"one");
        remote.contend_next_writes(1);

        let err = remote
            .write("index.html", b"mine", Some(&version), "chore: save")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::VersionConflict(_)));

        // Re-read picks up the concurrent commit's token; retry succeeds.
        let current = remote.read("index.html").await.unwrap();
        remote
            .write("index.html", b"mine", Some(&current.version), "chore: save")
            .await
            .unwrap();
        assert_eq!(remote.content_at("index.html").unwrap(), b"mine");
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let remote = MockContentStore::new();
        let err = remote.read("nope.html").await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_missing_namespace_is_not_found() {
        let remote = MockContentStore::new();
        let err = remote.list("assets").await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_root_shows_pages_dir_as_directory() {
        let remote = MockContentStore::new();
        remote.seed("index.html", b"x");
        remote.seed("pages/about.html", b"y");

        let entries = remote.list("").await.unwrap();
        let index = entries.iter().find(|e| e.name == "index.html").unwrap();
        let pages = entries.iter().find(|e| e.name == "pages").unwrap();
        assert_eq!(index.kind, EntryKind::File);
        assert_eq!(pages.kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn forced_listing_order_is_respected() {
        let remote = MockContentStore::new();
        remote.seed("pages/a.html", b"a");
        remote.seed("pages/b.html", b"b");
        remote.set_listing_order("pages", &["b.html", "a.html"]);

        let entries = remote.list("pages").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b.html", "a.html"]);
    }

    #[tokio::test]
    async fn fail_on_forces_configured_error() {
        let remote = MockContentStore::new().fail_on(FailOn::Write(RemoteError::RateLimited));
        let err = remote
            .write("index.html", b"x", None, "chore: create")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::RateLimited));

        remote.clear_fail_on();
        remote
            .write("index.html", b"x", None, "chore: create")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn operations_are_recorded() {
        let remote = MockContentStore::new();
        remote.seed("index.html", b"x");
        let _ = remote.read("index.html").await;
        let _ = remote.identity().await;

        let ops = remote.operations();
        assert_eq!(
            ops,
            vec![
                MockOperation::Read {
                    path: "index.html".into()
                },
                MockOperation::Identity,
            ]
        );
    }
}
