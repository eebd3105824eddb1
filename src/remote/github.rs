//! remote::github
//!
//! GitHub Contents API implementation of the `ContentStore` trait.
//!
//! # Design
//!
//! One repository on one branch is the whole store. Paths map directly to
//! Contents API paths; the opaque version token is the blob `sha` GitHub
//! returns on every read and write.
//!
//! Conditional-write mapping:
//! - write with a token → `PUT` with `sha`; a stale token comes back as
//!   HTTP 409 (and some deployments report it as 422 naming the sha)
//! - write without a token → `PUT` without `sha`; GitHub rejects this with
//!   a sha-naming 422 when the path is already occupied
//!
//! Both cases surface as [`RemoteError::VersionConflict`]. That mapping
//! lives here and only here; nothing above this layer inspects error text.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation returns
//! `RemoteError::RateLimited` when limits are hit and does not retry
//! (the caller's responsibility).

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{
    ContentStore, CredentialProvider, EntryKind, Identity, ListEntry, RemoteError, RemoteFile,
    RepoAccess, WrittenFile,
};
use async_trait::async_trait;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "pagewright-cli";

/// GitHub Contents API store.
///
/// Implements `ContentStore` against a single `owner/repo@branch`.
///
/// # Authentication
///
/// The bearer credential is pulled from a [`CredentialProvider`] on every
/// request, so a store built at process start observes later sign-ins and
/// discards. The store itself never refreshes or persists credentials;
/// the session layer owns that.
pub struct GitHubContentStore {
    /// HTTP client for making requests
    client: Client,
    /// Source of the bearer credential
    credentials: Arc<dyn CredentialProvider>,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// Branch all reads and writes target
    branch: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the credential
impl std::fmt::Debug for GitHubContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubContentStore")
            .field("has_token", &self.credentials.credential().is_some())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubContentStore {
    /// Create a store for `owner/repo@branch`.
    ///
    /// The provider may currently hold no credential; every request will
    /// then fail with `RemoteError::AuthRequired` without reaching the
    /// network.
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            credentials,
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a store with a custom API base URL (GitHub Enterprise).
    pub fn with_api_base(
        credentials: Arc<dyn CredentialProvider>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            credentials,
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            api_base: api_base.into(),
        }
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, RemoteError> {
        let token = self.credentials.credential().ok_or(RemoteError::AuthRequired)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteError::AuthFailed("credential is not header-safe".into()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a contents endpoint.
    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
        path: &str,
    ) -> Result<T, RemoteError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| RemoteError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status, path).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
        path: &str,
    ) -> Result<T, RemoteError> {
        // Try to get the error message from the body
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => RemoteError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => RemoteError::PermissionDenied(message),
            StatusCode::NOT_FOUND => RemoteError::NotFound(path.to_string()),
            StatusCode::CONFLICT => RemoteError::VersionConflict(path.to_string()),
            StatusCode::UNPROCESSABLE_ENTITY => {
                // GitHub reports a missing or stale `sha` on an occupied
                // path as a 422 whose message names the sha.
                if message.contains("sha") {
                    RemoteError::VersionConflict(path.to_string())
                } else {
                    RemoteError::ApiError {
                        status: status.as_u16(),
                        message,
                    }
                }
            }
            StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited,
            _ if status.is_server_error() => RemoteError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => RemoteError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl ContentStore for GitHubContentStore {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn read(&self, path: &str) -> Result<RemoteFile, RemoteError> {
        let url = format!("{}?ref={}", self.contents_url(path), self.branch);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| RemoteError::NetworkError(e.to_string()))?;

        let file: GitHubContentFile = self.handle_response(response, path).await?;

        let content = decode_content(&file.content).ok_or_else(|| RemoteError::ApiError {
            status: 200,
            message: format!("undecodable content at '{}'", path),
        })?;

        Ok(RemoteFile {
            content,
            version: file.sha,
        })
    }

    async fn write(
        &self,
        path: &str,
        content: &[u8],
        expected_version: Option<&str>,
        message: &str,
    ) -> Result<WrittenFile, RemoteError> {
        let url = self.contents_url(path);

        let body = PutContentBody {
            message,
            branch: &self.branch,
            content: STANDARD.encode(content),
            sha: expected_version,
        };

        let response = self
            .client
            .put(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::NetworkError(e.to_string()))?;

        let put: PutContentResponse = self.handle_response(response, path).await?;

        let version = put
            .content
            .map(|c| c.sha)
            .ok_or_else(|| RemoteError::ApiError {
                status: 200,
                message: format!("write response for '{}' carried no content sha", path),
            })?;

        Ok(WrittenFile { version })
    }

    async fn list(&self, namespace: &str) -> Result<Vec<ListEntry>, RemoteError> {
        let url = format!("{}?ref={}", self.contents_url(namespace), self.branch);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| RemoteError::NetworkError(e.to_string()))?;

        let entries: Vec<GitHubDirEntry> = self.handle_response(response, namespace).await?;

        Ok(entries.into_iter().map(Into::into).collect())
    }

    async fn identity(&self) -> Result<Identity, RemoteError> {
        let url = format!("{}/user", self.api_base);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| RemoteError::NetworkError(e.to_string()))?;

        let user: GitHubUser = self.handle_response(response, "user").await?;

        Ok(Identity { handle: user.login })
    }

    async fn repo_access(&self) -> Result<RepoAccess, RemoteError> {
        let url = format!("{}/repos/{}/{}", self.api_base, self.owner, self.repo);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| RemoteError::NetworkError(e.to_string()))?;

        let repo: GitHubRepo = self.handle_response(response, "repo").await?;

        let perms = repo.permissions.unwrap_or_default();
        Ok(RepoAccess {
            can_write: perms.push || perms.admin,
        })
    }
}

/// Decode the base64 the Contents API returns.
///
/// The body embeds newlines every 60 characters; strip all whitespace
/// before decoding.
fn decode_content(raw: &str) -> Option<Vec<u8>> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).ok()
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for a contents PUT.
#[derive(Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    branch: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// A file object from the contents endpoint.
#[derive(Deserialize)]
struct GitHubContentFile {
    sha: String,
    #[serde(default)]
    content: String,
}

/// Response to a contents PUT.
#[derive(Deserialize)]
struct PutContentResponse {
    content: Option<PutContentInfo>,
}

/// The content half of a PUT response.
#[derive(Deserialize)]
struct PutContentInfo {
    sha: String,
}

/// A directory listing entry from the contents endpoint.
#[derive(Deserialize)]
struct GitHubDirEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
}

impl From<GitHubDirEntry> for ListEntry {
    fn from(e: GitHubDirEntry) -> Self {
        let kind = match e.entry_type.as_str() {
            "file" => EntryKind::File,
            "dir" => EntryKind::Directory,
            _ => EntryKind::Other,
        };
        ListEntry {
            name: e.name,
            path: e.path,
            kind,
        }
    }
}

/// The authenticated user.
#[derive(Deserialize)]
struct GitHubUser {
    login: String,
}

/// Repository metadata (only the permissions block is consumed).
#[derive(Deserialize)]
struct GitHubRepo {
    permissions: Option<GitHubRepoPermissions>,
}

/// Repository permission flags for the credential.
#[derive(Deserialize, Default)]
struct GitHubRepoPermissions {
    #[serde(default)]
    push: bool,
    #[serde(default)]
    admin: bool,
}
