use super::summary::{counters_table, failure_lines};
use super::sync_ui::SyncUI;
use super::{connect, load_config, RunLog};
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use track_sync_core::{FavoriteSync, FavoriteSyncOptions, MatchScorer};

pub async fn run_favorites(
    config_path: Option<&Path>,
    dry_run: Option<bool>,
    no_skip_existing: bool,
    run_log: Option<&RunLog>,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Favorites command started");

    let config = load_config(config_path)?;
    let services = connect(&config).await?;

    let mut options = FavoriteSyncOptions::from(&config.sync);
    if let Some(dry_run) = dry_run {
        options.dry_run = dry_run;
    }
    if no_skip_existing {
        options.skip_existing = false;
    }

    let sync = FavoriteSync::new(services.source.as_ref(), services.target.as_ref())
        .with_scorer(MatchScorer::new(config.matching.clone()))
        .with_search_with_album(config.sync.search_with_album)
        .with_reporter(Arc::new(SyncUI::new()));

    let started = Instant::now();
    let stats = sync
        .sync_favorites(options)
        .await
        .map_err(|e| eyre!("Favorite sync failed: {}", e))?;
    let duration = started.elapsed();

    match output.format() {
        OutputFormat::Human => {
            if options.dry_run {
                output.warn("Dry run: nothing was added to the target (pass --dry-run false to apply)");
            }
            output.println(counters_table("Favorites", &stats.favorite_counters()).to_string());
            for line in failure_lines(&stats) {
                output.println(line);
            }
            if let Some(log) = run_log {
                output.info(format!("Run log: {}", log.path.display()));
            }
            output.success(format!(
                "Favorite sync completed: {} of {} tracks matched in {:.1}s",
                stats.matched,
                stats.total,
                duration.as_secs_f64()
            ));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "success": true,
                "operation": "favorites",
                "dry_run": options.dry_run,
                "counters": stats.favorite_counters(),
                "statistics": stats,
                "log_file": run_log.map(|log| log.path.display().to_string()),
                "duration_seconds": duration.as_secs_f64(),
            }));
        }
    }

    Ok(())
}
