use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};

/// Runs shorter than this don't log intermediate progress
const QUIET_RUN_SECS: f64 = 0.5;

#[derive(Debug, Default, Clone, Copy)]
struct TrackCounts {
    matched: usize,
    already_present: usize,
    not_found: usize,
    no_match: usize,
    failed: usize,
}

impl TrackCounts {
    fn processed(&self) -> usize {
        self.matched + self.already_present + self.not_found + self.no_match + self.failed
    }
}

impl fmt::Display for TrackCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Matched: {} | Present: {} | Not found: {} | No match: {}",
            self.matched, self.already_present, self.not_found, self.no_match
        )?;
        if self.failed > 0 {
            write!(f, " | Failed: {}", self.failed)?;
        }
        Ok(())
    }
}

/// Periodic progress lines and a closing summary for a track loop
///
/// Keeps per-track logging down to one line every `progress_interval`
/// tracks; failures are grouped by category in the summary.
pub struct ProgressTracker {
    total: usize,
    counts: TrackCounts,
    started: Instant,
    progress_interval: usize,
    last_logged: usize,
    errors: BTreeMap<String, usize>,
}

impl ProgressTracker {
    pub fn new(total: usize, progress_interval: usize) -> Self {
        if total > 10 || progress_interval < total {
            info!("Starting operation: {} tracks to process", total);
        }
        Self {
            total,
            counts: TrackCounts::default(),
            started: Instant::now(),
            progress_interval: progress_interval.max(1),
            last_logged: 0,
            errors: BTreeMap::new(),
        }
    }

    pub fn record_matched(&mut self) {
        self.counts.matched += 1;
    }

    pub fn record_already_present(&mut self) {
        self.counts.already_present += 1;
    }

    pub fn record_not_found(&mut self) {
        self.counts.not_found += 1;
    }

    pub fn record_no_match(&mut self) {
        self.counts.no_match += 1;
    }

    /// Record a failure under an error category
    pub fn record_failed_with_error(&mut self, error_category: &str) {
        self.counts.failed += 1;
        *self.errors.entry(error_category.to_string()).or_default() += 1;
    }

    pub fn processed(&self) -> usize {
        self.counts.processed()
    }

    /// `current` is 1-based (index + 1)
    pub fn log_progress(&mut self, current: usize) {
        let due = current.saturating_sub(self.last_logged) >= self.progress_interval || current == self.total;
        if !due {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed < QUIET_RUN_SECS && current < self.total {
            return;
        }

        let rate = if elapsed > 0.0 { current as f64 / elapsed } else { 0.0 };
        info!(
            "Progress: {}/{} ({:.1} tracks/sec) | {}",
            current, self.total, rate, self.counts
        );
        self.last_logged = current;
    }

    /// Categories by count descending, then name
    fn error_breakdown(&self) -> String {
        let mut entries: Vec<_> = self.errors.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
            .iter()
            .map(|(category, count)| format!("{}: {}", category, count))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn log_summary(&self, operation_name: &str) {
        let elapsed = self.started.elapsed().as_secs_f64();
        if self.counts.failed == 0 {
            info!(
                "{} completed: {} total in {:.1}s | {}",
                operation_name, self.total, elapsed, self.counts
            );
            return;
        }

        warn!(
            "{} completed: {} total in {:.1}s | {}",
            operation_name, self.total, elapsed, self.counts
        );
        info!("Error breakdown: {}", self.error_breakdown());
    }
}
