pub mod decision;
pub mod error;
pub mod failure_log;
pub mod favorites;
pub mod matcher;
pub mod playlists;
pub mod report;
pub mod retry;
pub mod stats;

#[cfg(test)]
mod testing;

pub use decision::{decide, MatchDecision};
pub use error::SyncError;
pub use failure_log::extract_failed_playlist_names;
pub use favorites::{FavoriteSync, FavoriteSyncOptions};
pub use matcher::{find_best_match, MatchScore, MatchScorer};
pub use playlists::{PlaylistRunSummary, PlaylistStatus, PlaylistSync, PlaylistSyncOptions, PlaylistSyncResult};
pub use report::{NullReporter, SyncReporter, TracingReporter};
pub use retry::retry_failed_playlists;
pub use stats::{Outcome, SyncStatistics, TrackOutcome};
