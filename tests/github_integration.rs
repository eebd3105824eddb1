//! Wire-level tests for the GitHub Contents API adapter.
//!
//! These tests run the real adapter against a stub HTTP server and pin
//! down the status-to-error mapping, the conditional-write body shape,
//! and the base64 handling. Store-level behavior is covered in
//! store_integration.rs against the mock backend.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pagewright::remote::github::GitHubContentStore;
use pagewright::remote::{
    ContentStore, CredentialProvider, EntryKind, RemoteError, StaticCredential,
};

fn store_for(server: &MockServer) -> GitHubContentStore {
    let creds: Arc<dyn CredentialProvider> = Arc::new(StaticCredential::new("test-token"));
    GitHubContentStore::with_api_base(creds, "octocat", "site", "main", server.uri())
}

// =============================================================================
// read
// =============================================================================

#[tokio::test]
async fn read_decodes_wrapped_base64_and_returns_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/contents/index.html"))
        .and(query_param("ref", "main"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "index.html",
            "path": "index.html",
            "sha": "abc123",
            "encoding": "base64",
            // GitHub wraps base64 at 60 columns
            "content": "PGgxPmhp\nPC9oMT4=\n"
        })))
        .mount(&server)
        .await;

    let file = store_for(&server).read("index.html").await.unwrap();

    assert_eq!(file.content, b"<h1>hi</h1>");
    assert_eq!(file.version, "abc123");
}

#[tokio::test]
async fn read_404_is_not_found_with_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/contents/pages/ghost.html"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found"
        })))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .read("pages/ghost.html")
        .await
        .unwrap_err();

    match err {
        RemoteError::NotFound(path) => assert_eq!(path, "pages/ghost.html"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn no_credential_fails_before_any_request() {
    let server = MockServer::start().await;
    let creds: Arc<dyn CredentialProvider> = Arc::new(StaticCredential::none());
    let store = GitHubContentStore::with_api_base(creds, "octocat", "site", "main", server.uri());

    let err = store.read("index.html").await.unwrap_err();

    assert!(matches!(err, RemoteError::AuthRequired));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// write
// =============================================================================

#[tokio::test]
async fn create_write_omits_sha_and_encodes_content() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/site/contents/pages/new.html"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": { "sha": "fresh1" },
            "commit": { "sha": "c1" }
        })))
        .mount(&server)
        .await;

    let written = store_for(&server)
        .write("pages/new.html", b"<p>x</p>", None, "chore: create")
        .await
        .unwrap();
    assert_eq!(written.version, "fresh1");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("sha").is_none());
    assert_eq!(body["branch"], "main");
    assert_eq!(body["message"], "chore: create");
    assert_eq!(body["content"], STANDARD.encode(b"<p>x</p>"));
}

#[tokio::test]
async fn cas_write_carries_the_version_token() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/site/contents/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": { "sha": "next2" },
            "commit": { "sha": "c2" }
        })))
        .mount(&server)
        .await;

    store_for(&server)
        .write("index.html", b"x", Some("abc123"), "chore: save")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["sha"], "abc123");
}

#[tokio::test]
async fn conflict_409_maps_to_version_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/site/contents/index.html"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "index.html does not match"
        })))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .write("index.html", b"x", Some("stale"), "chore: save")
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::VersionConflict(_)));
}

#[tokio::test]
async fn sha_422_maps_to_version_conflict_other_422_does_not() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/site/contents/occupied.html"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Invalid request.\n\n\"sha\" wasn't supplied."
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/site/contents/bad.html"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed"
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);

    let err = store
        .write("occupied.html", b"x", None, "chore: create")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::VersionConflict(_)));

    let err = store
        .write("bad.html", b"x", None, "chore: create")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::ApiError { status: 422, .. }));
}

#[tokio::test]
async fn auth_and_permission_failures_are_distinct() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/site/contents/a.html"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/site/contents/b.html"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Resource not accessible by integration"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/site/contents/c.html"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "message": "API rate limit exceeded"
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);

    assert!(matches!(
        store.write("a.html", b"x", None, "m").await.unwrap_err(),
        RemoteError::AuthFailed(_)
    ));
    assert!(matches!(
        store.write("b.html", b"x", None, "m").await.unwrap_err(),
        RemoteError::PermissionDenied(_)
    ));
    assert!(matches!(
        store.write("c.html", b"x", None, "m").await.unwrap_err(),
        RemoteError::RateLimited
    ));
}

// =============================================================================
// list
// =============================================================================

#[tokio::test]
async fn list_maps_entry_kinds_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/contents/pages"))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "b.html", "path": "pages/b.html", "type": "file", "sha": "s1" },
            { "name": "a.html", "path": "pages/a.html", "type": "file", "sha": "s2" },
            { "name": "drafts", "path": "pages/drafts", "type": "dir", "sha": "s3" },
            { "name": "linked", "path": "pages/linked", "type": "symlink", "sha": "s4" }
        ])))
        .mount(&server)
        .await;

    let entries = store_for(&server).list("pages").await.unwrap();

    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["b.html", "a.html", "drafts", "linked"]);
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[2].kind, EntryKind::Directory);
    assert_eq!(entries[3].kind, EntryKind::Other);
}

#[tokio::test]
async fn list_missing_namespace_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/contents/assets"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found"
        })))
        .mount(&server)
        .await;

    let err = store_for(&server).list("assets").await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(_)));
}

// =============================================================================
// identity and permissions
// =============================================================================

#[tokio::test]
async fn identity_resolves_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": "octocat",
            "id": 1
        })))
        .mount(&server)
        .await;

    let identity = store_for(&server).identity().await.unwrap();
    assert_eq!(identity.handle, "octocat");
}

#[tokio::test]
async fn identity_rejects_bad_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials"
        })))
        .mount(&server)
        .await;

    let err = store_for(&server).identity().await.unwrap_err();
    assert!(matches!(err, RemoteError::AuthFailed(_)));
}

#[tokio::test]
async fn repo_access_requires_push_or_admin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "octocat/site",
            "permissions": { "admin": false, "push": false, "pull": true }
        })))
        .mount(&server)
        .await;

    let access = store_for(&server).repo_access().await.unwrap();
    assert!(!access.can_write);
}

#[tokio::test]
async fn repo_access_accepts_push() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "octocat/site",
            "permissions": { "admin": false, "push": true, "pull": true }
        })))
        .mount(&server)
        .await;

    let access = store_for(&server).repo_access().await.unwrap();
    assert!(access.can_write);
}
