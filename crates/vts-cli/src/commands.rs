use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;
use vts_sync::{
    FileStateStore, GitHubClient, ReqwestTransport, SyncCoordinator, SyncOptions, SyncStateStore,
    commit_message, plan_sync,
};

use crate::cli::{ExportArgs, PushArgs, StatusArgs, ValidateArgs};
use crate::summary::{print_export_summary, print_plan, print_sync_report};
use vts_cli::pipeline::{export_snapshot, write_bundle};
use vts_cli::settings::{GitHubSettings, Settings, resolve_token};

pub async fn run_export(args: &ExportArgs, settings: &Settings) -> Result<()> {
    let config = args.selection.config(settings.export.config());
    let bundle = export_snapshot(&args.selection.snapshot, &config).await?;
    let written = write_bundle(&bundle, &args.out_dir)?;
    print_export_summary(&bundle, &written);
    Ok(())
}

fn state_store(github: &GitHubSettings, branch: &str) -> FileStateStore {
    FileStateStore::for_branch(&Settings::data_dir(), &github.owner, &github.repo, branch)
}

pub async fn run_status(args: &StatusArgs, settings: &Settings) -> Result<()> {
    let github = &settings.github;
    github.require_repository()?;
    let branch = args.branch.as_deref().unwrap_or(&github.branch);

    let config = args.selection.config(settings.export.config());
    let bundle = export_snapshot(&args.selection.snapshot, &config).await?;
    let state = state_store(github, branch).load().context("load sync state")?;
    let plan = plan_sync(&bundle, &state, &github.base_path);
    print_plan(&bundle, &plan);
    Ok(())
}

fn client(settings: &Settings, token: Option<&str>) -> Result<GitHubClient<ReqwestTransport>> {
    let github = &settings.github;
    github.require_repository()?;
    let token = resolve_token(token)?;
    let transport = ReqwestTransport::new(&github.api_base, &token)?;
    Ok(GitHubClient::new(transport, &github.owner, &github.repo).with_retry_policy(settings.retry))
}

pub async fn run_push(args: &PushArgs, settings: &Settings) -> Result<()> {
    let github = &settings.github;
    github.require_repository()?;
    let options = SyncOptions {
        branch: args.branch.clone().unwrap_or_else(|| github.branch.clone()),
        base_path: github.base_path.clone(),
        message_prefix: args
            .message_prefix
            .clone()
            .or_else(|| github.commit_prefix.clone()),
    };

    let config = args.selection.config(settings.export.config());
    let bundle = export_snapshot(&args.selection.snapshot, &config).await?;
    let store = state_store(github, &options.branch);

    if args.dry_run {
        let state = store.load().context("load sync state")?;
        let plan = plan_sync(&bundle, &state, &options.base_path);
        print_plan(&bundle, &plan);
        if !plan.is_empty() {
            let message = commit_message(options.message_prefix.as_deref(), &bundle.summary, Utc::now());
            println!("Commit message: {message}");
        }
        info!("dry run: nothing committed");
        return Ok(());
    }

    let client = client(settings, args.token.token.as_deref())?;
    let report = SyncCoordinator::new(&client, &store)
        .sync_bundle(&bundle, &options, Utc::now())
        .await
        .context("push failed")?;
    print_sync_report(&report);
    Ok(())
}

pub async fn run_validate(args: &ValidateArgs, settings: &Settings) -> Result<()> {
    let client = client(settings, args.token.token.as_deref())?;
    let login = client.validate_token().await.context("validation failed")?;
    let repository = client.repository().await.context("validation failed")?;
    let github = &settings.github;
    let name = repository
        .full_name
        .unwrap_or_else(|| format!("{}/{}", github.owner, github.repo));
    println!("Token OK: authenticated as {login}");
    println!(
        "Repository OK: {name} (default branch {})",
        repository.default_branch
    );
    Ok(())
}
