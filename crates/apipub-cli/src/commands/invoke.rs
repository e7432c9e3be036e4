use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use apipub_core::{DOCUMENTATION_KEY, LifecycleReconciler, LifecycleRequest, LifecycleResult};
use apipub_memory::{Call, InMemoryControlPlane, InMemoryObjectStore};
use apipub_server::{AppConfig, AppState};
use colored::Colorize;

use crate::cli::{InvokeArgs, OutputFormat};
use crate::output::{print_success, print_value};

pub async fn run(cfg: &AppConfig, args: &InvokeArgs, format: OutputFormat) -> Result<()> {
    let request = read_event(&args.event).await?;

    let result = if args.dry_run {
        let outcome = dry_run(cfg, &request, args.existing.as_deref()).await?;
        for call in &outcome.calls {
            eprintln!("  {} {call:?}", "→".cyan());
        }
        print_success(&format!(
            "Dry run issued {} control-plane calls",
            outcome.calls.len()
        ));
        outcome.result
    } else {
        let state = AppState::from_config(cfg).context("Failed to set up backends")?;
        state.reconciler.handle(&request).await?
    };

    print_value(&serde_json::to_value(&result)?, format)
}

pub async fn read_event(path: &Path) -> Result<LifecycleRequest> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read event {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to parse lifecycle event {}", path.display()))
}

/// Outcome of running an event against in-memory backends.
pub struct DryRun {
    pub result: LifecycleResult,
    pub calls: Vec<Call>,
    pub documentation: Option<String>,
}

pub async fn dry_run(
    cfg: &AppConfig,
    request: &LifecycleRequest,
    existing: Option<&str>,
) -> Result<DryRun> {
    let props = &request.resource_properties;

    let control_plane = Arc::new(InMemoryControlPlane::new());
    if let Some(api_id) = existing {
        control_plane.seed_api(api_id, &props.api_name).await;
    }
    let store = Arc::new(InMemoryObjectStore::new());

    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
    let settings = cfg.reconciler_settings().with_scratch_dir(scratch.path());
    let reconciler = LifecycleReconciler::new(control_plane.clone(), store.clone(), settings);

    let result = reconciler.handle(request).await?;
    let documentation = store
        .object(&props.documentation_bucket_name, DOCUMENTATION_KEY)
        .await
        .map(|o| o.text());

    Ok(DryRun {
        result,
        calls: control_plane.calls().await,
        documentation,
    })
}
