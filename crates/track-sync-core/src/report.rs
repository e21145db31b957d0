use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use track_sync_models::SourcePlaylist;
use track_sync_sources::ProgressTracker;

use crate::playlists::{PlaylistStatus, PlaylistSyncResult};
use crate::stats::{Outcome, SyncStatistics, TrackOutcome};

/// Log a progress line every N tracks
const PROGRESS_INTERVAL: usize = 50;

/// Sink for run progress and summaries
///
/// Reconcilers never log their results directly; they notify the reporter
/// they were built with. Every method has an empty default so sinks only
/// implement what they display.
pub trait SyncReporter: Send + Sync {
    fn run_started(&self, _operation: &str, _total: usize) {}

    /// `index` is 0-based within the current run or playlist
    fn track_processed(&self, _index: usize, _outcome: &TrackOutcome) {}

    fn run_finished(&self, _operation: &str, _stats: &SyncStatistics) {}

    fn playlist_started(&self, _playlist: &SourcePlaylist) {}

    fn playlist_failed(&self, _name: &str, _cause: &str) {}

    fn playlist_finished(&self, _result: &PlaylistSyncResult) {}

    fn notice(&self, _message: &str) {}

    fn warning(&self, _message: &str) {}
}

/// Reporter that drops everything
pub struct NullReporter;

impl SyncReporter for NullReporter {}

/// Writes run events through `tracing`
///
/// Playlist announcements and failures use the wording the failure-log miner
/// recognizes, so the run logs it produces can scope a later retry.
#[derive(Default)]
pub struct TracingReporter {
    tracker: Mutex<Option<ProgressTracker>>,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_tracker(&self, total: usize) {
        if let Ok(mut tracker) = self.tracker.lock() {
            *tracker = Some(ProgressTracker::new(total, PROGRESS_INTERVAL));
        }
    }

    fn finish_tracker(&self, operation: &str) {
        if let Ok(mut tracker) = self.tracker.lock() {
            if let Some(tracker) = tracker.take() {
                tracker.log_summary(operation);
            }
        }
    }
}

fn error_category(outcome: &TrackOutcome) -> &str {
    outcome
        .detail
        .as_deref()
        .and_then(|detail| detail.split(':').next())
        .unwrap_or("unknown")
}

impl SyncReporter for TracingReporter {
    fn run_started(&self, operation: &str, total: usize) {
        info!(operation, total, "Starting {}", operation);
        self.start_tracker(total);
    }

    fn track_processed(&self, index: usize, outcome: &TrackOutcome) {
        match outcome.outcome {
            Outcome::Matched => debug!("Matched {} -> {:?}", outcome.track, outcome.target_id),
            Outcome::AlreadyPresent => debug!("Already present: {}", outcome.track),
            Outcome::NotFound => info!("Not found on target: {}", outcome.track),
            Outcome::SkippedNoMatch => info!("No good match for {}, skipping", outcome.track),
            Outcome::Failed => error!(
                "Failed to sync {}: {}",
                outcome.track,
                outcome.detail.as_deref().unwrap_or("unknown error")
            ),
        }

        if let Ok(mut guard) = self.tracker.lock() {
            if let Some(tracker) = guard.as_mut() {
                match outcome.outcome {
                    Outcome::Matched => tracker.record_matched(),
                    Outcome::AlreadyPresent => tracker.record_already_present(),
                    Outcome::NotFound => tracker.record_not_found(),
                    Outcome::SkippedNoMatch => tracker.record_no_match(),
                    Outcome::Failed => tracker.record_failed_with_error(error_category(outcome)),
                }
                tracker.log_progress(index + 1);
            }
        }
    }

    fn run_finished(&self, operation: &str, stats: &SyncStatistics) {
        self.finish_tracker(operation);
        debug!(operation, counters = ?stats.counters(), "Run finished");
    }

    fn playlist_started(&self, playlist: &SourcePlaylist) {
        info!("Syncing playlist: {} ({} tracks)", playlist.name, playlist.tracks.len());
        self.start_tracker(playlist.tracks.len());
    }

    fn playlist_failed(&self, name: &str, cause: &str) {
        error!("Error syncing playlist: {}: {}", name, cause);
    }

    fn playlist_finished(&self, result: &PlaylistSyncResult) {
        match result.status {
            PlaylistStatus::Skipped => {
                if let Ok(mut tracker) = self.tracker.lock() {
                    tracker.take();
                }
                info!("Playlist '{}' already exists on target, left unchanged", result.name);
            }
            _ => self.finish_tracker(&format!("Playlist '{}'", result.name)),
        }
    }

    fn notice(&self, message: &str) {
        info!("{}", message);
    }

    fn warning(&self, message: &str) {
        warn!("{}", message);
    }
}
