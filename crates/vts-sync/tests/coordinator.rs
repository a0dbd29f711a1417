//! End-to-end sync of exported bundles.

mod support;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use support::{FakeGitHub, OWNER, REPO, status};
use vts_model::{Collection, DocumentSnapshot, Mode, ResolvedType, Variable};
use vts_sync::{
    GitHubClient, MemoryStateStore, Method, SyncCoordinator, SyncOptions, SyncState,
    SyncStateStore,
};
use vts_transform::{ExportBundle, ExportConfig, ExportFormat, ExportType, build_export_bundle_at};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, hour, 0, 0).unwrap()
}

fn snapshot(base_spacing: u32) -> DocumentSnapshot {
    DocumentSnapshot::new("Design System")
        .with_collection(Collection::new(
            "c:colors",
            "Colors",
            vec![Mode::new("m:light", "Light")],
        ))
        .with_collection(Collection::new(
            "c:spacing",
            "Spacing",
            vec![Mode::new("m:default", "Default")],
        ))
        .with_variable(
            Variable::new("v:primary", "Brand/Primary", "c:colors", ResolvedType::Color)
                .with_value("m:light", json!({"r": 1, "g": 0, "b": 0, "a": 1})),
        )
        .with_variable(
            Variable::new("v:base", "base", "c:spacing", ResolvedType::Float)
                .with_value("m:default", json!(base_spacing)),
        )
}

async fn per_collection(snapshot: &DocumentSnapshot, hour: u32) -> ExportBundle {
    let config = ExportConfig::new(ExportFormat::FigmaNative, ExportType::PerCollection);
    build_export_bundle_at(snapshot, &config, at(hour)).await.unwrap()
}

fn options() -> SyncOptions {
    SyncOptions {
        branch: "main".to_string(),
        base_path: "tokens".to_string(),
        message_prefix: Some("chore:".to_string()),
    }
}

fn client() -> GitHubClient<FakeGitHub> {
    GitHubClient::new(FakeGitHub::default(), OWNER, REPO)
}

#[tokio::test(start_paused = true)]
async fn test_first_sync_writes_everything() {
    let client = client();
    let store = MemoryStateStore::default();
    let bundle = per_collection(&snapshot(8), 9).await;

    let report = SyncCoordinator::new(&client, &store)
        .sync_bundle(&bundle, &options(), at(10))
        .await
        .unwrap();

    assert!(!report.skipped);
    assert_eq!(report.written, vec!["tokens/colors.json", "tokens/spacing.json"]);
    let message = report.message.unwrap();
    assert!(message.starts_with("chore: Update design tokens: 2 variables in 2 collections"));
    assert!(message.ends_with("(2026-05-04T10:00:00.000Z)"));

    let committed = client.transport().file("main", "tokens/colors.json").unwrap();
    assert_eq!(committed, bundle.documents[0].to_text().unwrap());

    let state = store.snapshot().unwrap();
    assert_eq!(state.hashes.len(), 2);
    assert_eq!(
        state.hash("tokens/spacing.json"),
        Some(bundle.documents[1].content_hash.as_str())
    );
    assert_eq!(state.updated_at, Some(at(10)));
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_bundle_skips_without_network() {
    let client = client();
    let store = MemoryStateStore::default();
    let coordinator = SyncCoordinator::new(&client, &store);
    coordinator
        .sync_bundle(&per_collection(&snapshot(8), 9).await, &options(), at(10))
        .await
        .unwrap();
    client.transport().clear_requests();

    let later = per_collection(&snapshot(8), 15).await;
    let report = coordinator.sync_bundle(&later, &options(), at(16)).await.unwrap();

    assert!(report.skipped);
    assert!(report.message.is_none());
    assert_eq!(report.unchanged.len(), 2);
    assert!(client.transport().requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_only_changed_documents_are_committed() {
    let client = client();
    let store = MemoryStateStore::default();
    let coordinator = SyncCoordinator::new(&client, &store);
    coordinator
        .sync_bundle(&per_collection(&snapshot(8), 9).await, &options(), at(10))
        .await
        .unwrap();
    client.transport().clear_requests();

    let changed = per_collection(&snapshot(12), 11).await;
    let plan = coordinator.plan(&changed, "tokens").unwrap();
    assert_eq!(plan.changed.len(), 1);
    assert_eq!(plan.changed[0].repo_path, "tokens/spacing.json");

    let report = coordinator.sync_bundle(&changed, &options(), at(12)).await.unwrap();
    assert_eq!(report.written, vec!["tokens/spacing.json"]);
    assert_eq!(report.unchanged, vec!["tokens/colors.json"]);
    assert_eq!(client.transport().count(Method::Put), 1);

    let state = store.snapshot().unwrap();
    assert_eq!(state.hashes.len(), 2);
    assert_eq!(
        state.hash("tokens/spacing.json"),
        Some(changed.documents[1].content_hash.as_str())
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_commit_keeps_previous_state() {
    let client = client();
    let previous = SyncState::new(
        [("tokens/colors.json".to_string(), "stale".to_string())].into(),
        at(1),
    );
    let store = MemoryStateStore::new(previous.clone());
    client
        .transport()
        .script(Method::Put, "/repos/acme/tokens/contents/", status(403));

    let bundle = per_collection(&snapshot(8), 9).await;
    let err = SyncCoordinator::new(&client, &store)
        .sync_bundle(&bundle, &options(), at(10))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert_eq!(store.load().unwrap(), previous);
}

#[tokio::test(start_paused = true)]
async fn test_lost_state_recovers_from_embedded_hashes() {
    let client = client();
    let bundle = per_collection(&snapshot(8), 9).await;
    for document in &bundle.documents {
        client.transport().put_file(
            "main",
            &format!("tokens/{}", document.relative_path),
            &document.to_text().unwrap(),
        );
    }

    let store = MemoryStateStore::default();
    let report = SyncCoordinator::new(&client, &store)
        .sync_bundle(&bundle, &options(), at(10))
        .await
        .unwrap();

    assert!(report.skipped);
    assert!(report.written.is_empty());
    assert_eq!(report.unchanged.len(), 2);
    assert_eq!(client.transport().count(Method::Put), 0);
    assert_eq!(store.snapshot().unwrap().hashes.len(), 2);
}
