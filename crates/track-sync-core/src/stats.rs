use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use track_sync_models::TrackId;

/// Terminal state of one processed source track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Matched,
    NotFound,
    SkippedNoMatch,
    AlreadyPresent,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Matched => "matched",
            Outcome::NotFound => "not_found",
            Outcome::SkippedNoMatch => "skipped_no_match",
            Outcome::AlreadyPresent => "already_present",
            Outcome::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackOutcome {
    /// "Artist - Title" of the source track
    pub track: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<TrackId>,
    /// Failure cause, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TrackOutcome {
    pub fn new(track: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            track: track.into(),
            outcome,
            target_id: None,
            detail: None,
        }
    }

    pub fn with_target(mut self, target_id: TrackId) -> Self {
        self.target_id = Some(target_id);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Counters and per-track outcomes of one run
///
/// `total` is the number of source tracks handed to the run; every processed
/// track goes through [`record`](Self::record), which bumps exactly one
/// outcome counter, so the outcome counters always add up to `total` once the
/// run is done.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncStatistics {
    pub total: usize,
    pub matched: usize,
    pub not_found: usize,
    pub skipped_no_match: usize,
    pub already_present: usize,
    pub failed: usize,
    pub outcomes: Vec<TrackOutcome>,
}

impl SyncStatistics {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: TrackOutcome) {
        match outcome.outcome {
            Outcome::Matched => self.matched += 1,
            Outcome::NotFound => self.not_found += 1,
            Outcome::SkippedNoMatch => self.skipped_no_match += 1,
            Outcome::AlreadyPresent => self.already_present += 1,
            Outcome::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Sum of all outcome counters
    pub fn processed(&self) -> usize {
        self.matched + self.not_found + self.skipped_no_match + self.already_present + self.failed
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Matched => self.matched,
            Outcome::NotFound => self.not_found,
            Outcome::SkippedNoMatch => self.skipped_no_match,
            Outcome::AlreadyPresent => self.already_present,
            Outcome::Failed => self.failed,
        }
    }

    /// Named counters for reports
    pub fn counters(&self) -> BTreeMap<&'static str, usize> {
        let mut counters = BTreeMap::new();
        counters.insert("total", self.total);
        for outcome in [
            Outcome::Matched,
            Outcome::NotFound,
            Outcome::SkippedNoMatch,
            Outcome::AlreadyPresent,
            Outcome::Failed,
        ] {
            counters.insert(outcome.as_str(), self.count(outcome));
        }
        counters
    }

    /// Counters with the favorites naming (`already_favorited`)
    pub fn favorite_counters(&self) -> BTreeMap<&'static str, usize> {
        let mut counters = self.counters();
        if let Some(present) = counters.remove("already_present") {
            counters.insert("already_favorited", present);
        }
        counters
    }

    /// Fold another run's statistics into this one
    pub fn merge(&mut self, other: &SyncStatistics) {
        self.total += other.total;
        self.matched += other.matched;
        self.not_found += other.not_found;
        self.skipped_no_match += other.skipped_no_match;
        self.already_present += other.already_present;
        self.failed += other.failed;
        self.outcomes.extend(other.outcomes.iter().cloned());
    }

    pub fn failures(&self) -> impl Iterator<Item = &TrackOutcome> {
        self.outcomes.iter().filter(|o| o.outcome == Outcome::Failed)
    }
}
