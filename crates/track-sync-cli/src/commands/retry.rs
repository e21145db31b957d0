use super::playlists::report_playlist_run;
use super::sync_ui::SyncUI;
use super::{config_file_path, connect, load_config, log_dir, RunLog};
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use track_sync_config::{find_latest_sync_log, Config};
use track_sync_core::{extract_failed_playlist_names, retry_failed_playlists, MatchScorer, PlaylistSync};

/// The log to scan: `explicit` when given, else the newest sync log
pub fn locate_log(explicit: Option<PathBuf>, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(eyre!("Log file not found: {}", path.display()));
        }
        return Ok(path);
    }

    // The log directory may be configured; without a readable config use the default
    let config = Config::load_from_file(&config_file_path(config_path)).ok();
    let dir = log_dir(config.as_ref());
    find_latest_sync_log(&dir).map_err(|e| eyre!("{}", e))
}

fn read_log(log_file: &Path) -> Result<String> {
    std::fs::read_to_string(log_file).map_err(|e| eyre!("Failed to read log file {}: {}", log_file.display(), e))
}

pub async fn run_retry(
    config_path: Option<&Path>,
    log_file: PathBuf,
    dry_run: Option<bool>,
    run_log: Option<&RunLog>,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Retry command started");

    let config = load_config(config_path)?;
    let log_text = read_log(&log_file)?;
    tracing::info!("Analyzing log file: {}", log_file.display());

    let services = connect(&config).await?;
    let dry_run = dry_run.unwrap_or(config.sync.dry_run);

    let sync = PlaylistSync::new(services.source.as_ref(), services.target.as_ref())
        .with_scorer(MatchScorer::new(config.matching.clone()))
        .with_search_with_album(config.sync.search_with_album)
        .with_reporter(Arc::new(SyncUI::new()));

    let started = Instant::now();
    let summary = retry_failed_playlists(&sync, &log_text, dry_run)
        .await
        .map_err(|e| eyre!("Retry failed: {}", e))?;

    if summary.attempted == 0 && summary.missing.is_empty() {
        output.success(format!("No failed playlists found in {}", log_file.display()));
        return Ok(());
    }

    report_playlist_run("Retry", &summary, dry_run, started.elapsed(), run_log, output);
    Ok(())
}

pub fn run_failed_playlists(log_file: PathBuf, output: &Output) -> Result<()> {
    let log_text = read_log(&log_file)?;
    let names = extract_failed_playlist_names(&log_text);

    match output.format() {
        OutputFormat::Human => {
            if names.is_empty() {
                output.success(format!("No failed playlists in {}", log_file.display()));
                return Ok(());
            }
            output.warn(format!("{} playlists failed in {}:", names.len(), log_file.display()));
            for name in &names {
                output.println(format!("  - {}", name));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "log_file": log_file.display().to_string(),
                "playlists": names,
            }));
        }
    }

    Ok(())
}
