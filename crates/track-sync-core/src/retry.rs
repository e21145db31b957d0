use tracing::instrument;

use crate::error::SyncError;
use crate::failure_log::extract_failed_playlist_names;
use crate::playlists::{PlaylistRunSummary, PlaylistSync, PlaylistSyncOptions};

/// Re-sync the playlists an earlier run failed on
///
/// The names are mined from `log_text`; only source playlists with one of
/// those names are synced, always with `update_existing` so playlists created
/// by the failed run are completed rather than skipped.
#[instrument(skip(sync, log_text))]
pub async fn retry_failed_playlists(
    sync: &PlaylistSync<'_>,
    log_text: &str,
    dry_run: bool,
) -> Result<PlaylistRunSummary, SyncError> {
    let reporter = sync.reporter();
    let names = extract_failed_playlist_names(log_text);

    if names.is_empty() {
        reporter.notice("No failed playlists found to retry");
        return Ok(PlaylistRunSummary::default());
    }

    reporter.notice(&format!("Found {} playlists with errors:", names.len()));
    for name in &names {
        reporter.notice(&format!("  - {}", name));
    }

    let options = PlaylistSyncOptions {
        dry_run,
        update_existing: true,
    };
    let summary = sync.sync_playlists(Some(&names), options).await?;

    if summary.attempted == 0 {
        reporter.warning(&format!(
            "Could not find any of the failed playlists in {}",
            sync.source_name()
        ));
        reporter.warning(&format!(
            "Failed playlist names: {}",
            names.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
        return Ok(summary);
    }

    reporter.notice("Retry Summary:");
    reporter.notice(&format!("  Total playlists retried: {}", summary.attempted));
    reporter.notice(&format!("  Successful: {}", summary.succeeded));
    reporter.notice(&format!("  Failed: {}", summary.failed));
    Ok(summary)
}
