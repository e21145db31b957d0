use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Mutex;
use track_sync_core::{PlaylistStatus, PlaylistSyncResult, SyncReporter, SyncStatistics, TrackOutcome, TracingReporter};
use track_sync_models::SourcePlaylist;

/// Reporter for terminal runs
///
/// Everything is forwarded to a [`TracingReporter`] so the run log is
/// complete; on an interactive terminal a progress bar tracks the tracks of
/// the current run or playlist on top of that.
pub struct SyncUI {
    multi: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
    log: TracingReporter,
    interactive: bool,
}

impl SyncUI {
    pub fn new() -> Self {
        let interactive = is_interactive();

        if !interactive {
            tracing::info!(
                operation = "ui_init",
                mode = "non_interactive",
                "Running in non-interactive mode - progress bars disabled, using structured logging"
            );
        }

        Self {
            multi: MultiProgress::new(),
            current: Mutex::new(None),
            log: TracingReporter::new(),
            interactive,
        }
    }

    fn start_bar(&self, total: usize, label: &str) {
        if !self.interactive {
            return;
        }

        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message(label.to_string());

        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn finish_bar(&self, message: String) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(pb) = current.take() {
                pb.finish_with_message(message);
            }
        }
    }
}

impl SyncReporter for SyncUI {
    fn run_started(&self, operation: &str, total: usize) {
        self.log.run_started(operation, total);
        self.start_bar(total, operation);
    }

    fn track_processed(&self, index: usize, outcome: &TrackOutcome) {
        self.log.track_processed(index, outcome);
        if let Ok(current) = self.current.lock() {
            if let Some(pb) = current.as_ref() {
                pb.set_position(index as u64 + 1);
                pb.set_message(format!("{} ({})", outcome.track, outcome.outcome));
            }
        }
    }

    fn run_finished(&self, operation: &str, stats: &SyncStatistics) {
        self.log.run_finished(operation, stats);
        self.finish_bar(format!("{}: {} of {} matched", operation, stats.matched, stats.total));
    }

    fn playlist_started(&self, playlist: &SourcePlaylist) {
        self.log.playlist_started(playlist);
        self.start_bar(playlist.tracks.len(), &playlist.name);
    }

    fn playlist_failed(&self, name: &str, cause: &str) {
        self.log.playlist_failed(name, cause);
    }

    fn playlist_finished(&self, result: &PlaylistSyncResult) {
        self.log.playlist_finished(result);
        let message = match result.status {
            PlaylistStatus::Synced => format!("{}: {} matched", result.name, result.stats.matched),
            PlaylistStatus::Skipped => format!("{}: already on target", result.name),
            PlaylistStatus::Failed => format!("{}: failed", result.name),
        };
        self.finish_bar(message);
    }

    fn notice(&self, message: &str) {
        self.log.notice(message);
    }

    fn warning(&self, message: &str) {
        self.log.warning(message);
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
