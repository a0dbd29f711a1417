//! GitHub client behavior against an in-memory repository.

mod support;

use serde_json::json;
use support::{FakeGitHub, OWNER, REPO, Scripted, status};
use vts_sync::{FileChange, GitHubClient, Method, RetryPolicy, SyncError, UpsertOutcome};

fn client() -> GitHubClient<FakeGitHub> {
    GitHubClient::new(FakeGitHub::default(), OWNER, REPO)
}

fn document(hash: &str, value: u32) -> String {
    let mut text = serde_json::to_string_pretty(&json!({"contentHash": hash, "value": value})).unwrap();
    text.push('\n');
    text
}

fn change(path: &str, hash: &str, value: u32) -> FileChange {
    FileChange {
        path: path.to_string(),
        content: document(hash, value),
        content_hash: hash.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_validate_token() {
    let client = client();
    assert_eq!(client.validate_token().await.unwrap(), "octocat");
}

#[tokio::test]
async fn test_repository_metadata() {
    let client = client();
    let repository = client.repository().await.unwrap();
    assert_eq!(repository.default_branch, "main");
    assert_eq!(repository.full_name.as_deref(), Some("acme/tokens"));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_token_is_not_retried() {
    let client = client();
    client.transport().script(Method::Get, "/user", status(401));
    let err = client.validate_token().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.suggestion().unwrap().contains("GITHUB_TOKEN"));
    assert_eq!(client.transport().requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_client_errors_are_never_retried() {
    for code in [403, 404, 422] {
        let client = client();
        client.transport().script(Method::Get, "/repos/acme/tokens", status(code));
        let err = client.repository().await.unwrap_err();
        assert_eq!(err.status(), Some(code));
        assert_eq!(client.transport().requests().len(), 1, "status {code}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_transient_errors_are_retried() {
    let client = client();
    client.transport().script(Method::Get, "/user", Scripted::NetworkError);
    client.transport().script(Method::Get, "/user", status(502));
    assert_eq!(client.validate_token().await.unwrap(), "octocat");
    assert_eq!(client.transport().requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retries_stop_after_max_attempts() {
    let client = client();
    for _ in 0..3 {
        client.transport().script(Method::Get, "/user", status(503));
    }
    let err = client.validate_token().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(client.transport().requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_custom_retry_policy() {
    let client = client().with_retry_policy(RetryPolicy::new(1, 10));
    client.transport().script(Method::Get, "/user", status(500));
    assert!(client.validate_token().await.is_err());
    assert_eq!(client.transport().requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_existing_branch_is_noop() {
    let client = client();
    assert!(!client.ensure_branch("main").await.unwrap());
    assert_eq!(client.transport().count(Method::Post), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_branch_created_from_default() {
    let client = client();
    assert!(client.ensure_branch("tokens/update").await.unwrap());
    assert!(client.transport().has_branch("tokens/update"));

    let requests = client.transport().requests();
    let paths: Vec<&str> = requests.iter().map(|(_, path)| path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/repos/acme/tokens/git/ref/heads/tokens/update",
            "/repos/acme/tokens",
            "/repos/acme/tokens/git/ref/heads/main",
            "/repos/acme/tokens/git/refs",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_branch_lookup_failure_is_fatal() {
    let client = client();
    client
        .transport()
        .script(Method::Get, "/repos/acme/tokens/git/ref/heads/dev", status(403));
    let err = client.ensure_branch("dev").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(!client.transport().has_branch("dev"));
}

#[tokio::test(start_paused = true)]
async fn test_get_existing_file() {
    let client = client();
    assert!(client.get_existing_file("tokens/tokens.json", "main").await.unwrap().is_none());

    let text = document("h1", 1).repeat(5);
    client.transport().put_file("main", "tokens/tokens.json", &text);
    let file = client
        .get_existing_file("tokens/tokens.json", "main")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(file.content, text);
    assert!(file.sha.starts_with("blob-"));
    assert_eq!(
        file.url.as_deref(),
        Some("https://github.com/acme/tokens/blob/main/tokens/tokens.json")
    );
}

#[tokio::test(start_paused = true)]
async fn test_upsert_creates_then_skips() {
    let client = client();
    let file = change("tokens/tokens.json", "h1", 1);

    let first = client.upsert_file(&file, "main", "sync").await.unwrap();
    assert!(matches!(first, UpsertOutcome::Written { .. }));
    assert_eq!(client.transport().file("main", "tokens/tokens.json"), Some(file.content.clone()));

    client.transport().clear_requests();
    let second = client.upsert_file(&file, "main", "sync").await.unwrap();
    assert!(matches!(second, UpsertOutcome::Skipped { .. }));
    assert_eq!(client.transport().count(Method::Put), 0);
}

#[tokio::test(start_paused = true)]
async fn test_upsert_updates_with_sha() {
    let client = client();
    client.transport().put_file("main", "tokens/tokens.json", &document("old", 0));

    let file = change("tokens/tokens.json", "new", 2);
    let outcome = client.upsert_file(&file, "main", "sync").await.unwrap();
    assert!(matches!(outcome, UpsertOutcome::Written { .. }));
    assert_eq!(client.transport().file("main", "tokens/tokens.json"), Some(file.content));
}

#[tokio::test(start_paused = true)]
async fn test_conflict_resolved_by_matching_refetch() {
    let client = client();
    let file = change("tokens/tokens.json", "h2", 2);
    client.transport().script(
        Method::Put,
        "/repos/acme/tokens/contents/tokens/tokens.json",
        Scripted::ConflictAfterWrite(file.content.clone()),
    );

    let outcome = client.upsert_file(&file, "main", "sync").await.unwrap();
    assert!(matches!(outcome, UpsertOutcome::Skipped { .. }));
    assert_eq!(client.transport().count(Method::Put), 1);
    assert_eq!(client.transport().count(Method::Get), 2);
}

#[tokio::test(start_paused = true)]
async fn test_conflict_retried_once_with_fresh_sha() {
    let client = client();
    let file = change("tokens/tokens.json", "mine", 2);
    client.transport().script(
        Method::Put,
        "/repos/acme/tokens/contents/tokens/tokens.json",
        Scripted::ConflictAfterWrite(document("theirs", 9)),
    );

    let outcome = client.upsert_file(&file, "main", "sync").await.unwrap();
    assert!(matches!(outcome, UpsertOutcome::Written { .. }));
    assert_eq!(client.transport().count(Method::Put), 2);
    assert_eq!(client.transport().file("main", "tokens/tokens.json"), Some(file.content));
}

#[tokio::test(start_paused = true)]
async fn test_second_conflict_is_fatal() {
    let client = client();
    let file = change("tokens/tokens.json", "mine", 2);
    let path = "/repos/acme/tokens/contents/tokens/tokens.json";
    client
        .transport()
        .script(Method::Put, path, Scripted::ConflictAfterWrite(document("a", 1)));
    client
        .transport()
        .script(Method::Put, path, Scripted::ConflictAfterWrite(document("b", 2)));

    let err = client.upsert_file(&file, "main", "sync").await.unwrap_err();
    assert!(matches!(err, SyncError::Conflict { ref path } if path == "tokens/tokens.json"));
    assert_eq!(client.transport().count(Method::Put), 2);
}

#[tokio::test(start_paused = true)]
async fn test_commit_files_is_idempotent() {
    let client = client();
    let files = vec![
        change("tokens/colors.json", "c1", 1),
        change("tokens/spacing.json", "s1", 2),
    ];

    let first = client.commit_files("main", &files, "sync").await.unwrap();
    assert!(!first.skipped);
    assert_eq!(first.written, vec!["tokens/colors.json", "tokens/spacing.json"]);
    assert_eq!(
        first.url.as_deref(),
        Some("https://github.com/acme/tokens/blob/main/tokens/spacing.json")
    );

    client.transport().clear_requests();
    let second = client.commit_files("main", &files, "sync").await.unwrap();
    assert!(second.skipped);
    assert!(second.written.is_empty());
    assert_eq!(second.skipped_files.len(), 2);
    assert!(second.url.is_some());
    assert_eq!(client.transport().count(Method::Put), 0);
}

#[tokio::test(start_paused = true)]
async fn test_commit_to_new_branch() {
    let client = client();
    let files = vec![change("tokens/tokens.json", "h", 1)];
    let result = client.commit_files("design/tokens", &files, "sync").await.unwrap();
    assert!(!result.skipped);
    assert!(client.transport().has_branch("design/tokens"));
    assert!(client.transport().file("design/tokens", "tokens/tokens.json").is_some());
    assert!(client.transport().file("main", "tokens/tokens.json").is_none());
}
