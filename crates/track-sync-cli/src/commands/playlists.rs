use super::summary::{counters_table, failure_lines, playlists_table};
use super::sync_ui::SyncUI;
use super::{connect, load_config, RunLog};
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use track_sync_core::{MatchScorer, PlaylistRunSummary, PlaylistSync, PlaylistSyncOptions};

pub async fn run_playlists(
    config_path: Option<&Path>,
    dry_run: Option<bool>,
    update_existing: bool,
    names: Vec<String>,
    run_log: Option<&RunLog>,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Playlists command started");

    let config = load_config(config_path)?;
    let services = connect(&config).await?;

    let mut options = PlaylistSyncOptions::from(&config.sync);
    if let Some(dry_run) = dry_run {
        options.dry_run = dry_run;
    }
    if update_existing {
        options.update_existing = true;
    }

    let filter: Option<BTreeSet<String>> = if names.is_empty() {
        None
    } else {
        Some(names.into_iter().collect())
    };

    let sync = PlaylistSync::new(services.source.as_ref(), services.target.as_ref())
        .with_scorer(MatchScorer::new(config.matching.clone()))
        .with_search_with_album(config.sync.search_with_album)
        .with_reporter(Arc::new(SyncUI::new()));

    let started = Instant::now();
    let summary = sync
        .sync_playlists(filter.as_ref(), options)
        .await
        .map_err(|e| eyre!("Playlist sync failed: {}", e))?;

    report_playlist_run("Playlist sync", &summary, options.dry_run, started.elapsed(), run_log, output);
    Ok(())
}

/// Print a playlist run the way the playlists and retry commands share
pub fn report_playlist_run(
    operation: &str,
    summary: &PlaylistRunSummary,
    dry_run: bool,
    duration: Duration,
    run_log: Option<&RunLog>,
    output: &Output,
) {
    match output.format() {
        OutputFormat::Human => {
            if dry_run {
                output.warn("Dry run: no playlists were created or modified (pass --dry-run false to apply)");
            }
            for name in &summary.missing {
                output.warn(format!("No source playlist named '{}'", name));
            }
            if summary.attempted > 0 {
                output.println(playlists_table(summary).to_string());
                output.println(counters_table("All playlists", &summary.stats.counters()).to_string());
                for line in failure_lines(&summary.stats) {
                    output.println(line);
                }
            }
            for result in summary.results.iter().filter(|r| !r.succeeded()) {
                output.error(format!(
                    "{}: {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                ));
            }
            if let Some(log) = run_log {
                output.info(format!("Run log: {}", log.path.display()));
            }
            output.success(format!(
                "{} completed: {} playlists ({} succeeded, {} failed, {} left unchanged) in {:.1}s",
                operation,
                summary.attempted,
                summary.succeeded,
                summary.failed,
                summary.skipped,
                duration.as_secs_f64()
            ));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "success": summary.failed == 0,
                "operation": operation,
                "dry_run": dry_run,
                "attempted": summary.attempted,
                "succeeded": summary.succeeded,
                "failed": summary.failed,
                "skipped": summary.skipped,
                "missing": summary.missing,
                "counters": summary.stats.counters(),
                "playlists": summary.results,
                "log_file": run_log.map(|log| log.path.display().to_string()),
                "duration_seconds": duration.as_secs_f64(),
            }));
        }
    }
}
