use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use track_sync_models::TrackId;
use track_sync_sources::{SourceLibrary, TargetCatalog};

use crate::decision::{Destination, TrackReconciler};
use crate::error::SyncError;
use crate::matcher::MatchScorer;
use crate::report::{SyncReporter, TracingReporter};
use crate::stats::SyncStatistics;

const OPERATION: &str = "Favorite sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteSyncOptions {
    /// Match and report without adding anything to the target
    pub dry_run: bool,
    /// Fetch the target's favorites once and skip tracks already in it
    pub skip_existing: bool,
}

impl Default for FavoriteSyncOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            skip_existing: true,
        }
    }
}

impl From<&track_sync_config::SyncOptions> for FavoriteSyncOptions {
    fn from(options: &track_sync_config::SyncOptions) -> Self {
        Self {
            dry_run: options.dry_run,
            skip_existing: options.skip_existing,
        }
    }
}

/// Copies the source's saved tracks into the target's favorites
pub struct FavoriteSync<'a> {
    source: &'a dyn SourceLibrary,
    target: &'a dyn TargetCatalog,
    scorer: MatchScorer,
    search_with_album: bool,
    reporter: Arc<dyn SyncReporter>,
}

impl<'a> FavoriteSync<'a> {
    pub fn new(source: &'a dyn SourceLibrary, target: &'a dyn TargetCatalog) -> Self {
        Self {
            source,
            target,
            scorer: MatchScorer::default(),
            search_with_album: true,
            reporter: Arc::new(TracingReporter::new()),
        }
    }

    pub fn with_scorer(mut self, scorer: MatchScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn SyncReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_search_with_album(mut self, search_with_album: bool) -> Self {
        self.search_with_album = search_with_album;
        self
    }

    /// Existing target favorites, or an empty set when they can't be fetched
    async fn existing_favorites(&self) -> HashSet<TrackId> {
        match self.target.get_favorite_tracks().await {
            Ok(ids) => {
                info!("Found {} existing favorites on {}", ids.len(), self.target.service_name());
                ids.into_iter().collect()
            }
            Err(e) => {
                warn!("Could not fetch existing favorites, continuing without dedup: {}", e);
                self.reporter.warning(&format!(
                    "Could not fetch existing {} favorites, duplicates are not filtered",
                    self.target.service_name()
                ));
                HashSet::new()
            }
        }
    }

    /// Run the favorite sync
    ///
    /// Only a failure to list the source's saved tracks is an error. Per-track
    /// problems are counted in the returned statistics.
    #[instrument(skip(self), fields(source = self.source.service_name(), target = self.target.service_name()))]
    pub async fn sync_favorites(&self, options: FavoriteSyncOptions) -> Result<SyncStatistics, SyncError> {
        if options.dry_run {
            info!("Dry run: no favorites will be added");
        }

        let tracks = self
            .source
            .get_saved_tracks()
            .await
            .map_err(|e| SyncError::source_fetch(self.source.service_name(), "saved tracks", e))?;

        let mut stats = SyncStatistics::with_total(tracks.len());
        self.reporter.run_started(OPERATION, tracks.len());

        if tracks.is_empty() {
            info!("No saved tracks on {}", self.source.service_name());
            self.reporter.run_finished(OPERATION, &stats);
            return Ok(stats);
        }

        let mut existing = if options.skip_existing {
            self.existing_favorites().await
        } else {
            HashSet::new()
        };

        let reconciler = TrackReconciler {
            catalog: self.target,
            scorer: &self.scorer,
            search_with_album: self.search_with_album,
            skip_existing: options.skip_existing,
            dry_run: options.dry_run,
            destination: Destination::Favorites,
        };

        for (index, track) in tracks.iter().enumerate() {
            let outcome = reconciler.reconcile(track, &mut existing).await;
            self.reporter.track_processed(index, &outcome);
            stats.record(outcome);
        }

        self.reporter.run_finished(OPERATION, &stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Outcome;
    use crate::testing::{candidate, track, CallCounts, FakeCatalog, FakeLibrary, RecordingReporter};
    use track_sync_models::{Candidate, TrackDescriptor};

    fn live() -> FavoriteSyncOptions {
        FavoriteSyncOptions {
            dry_run: false,
            skip_existing: true,
        }
    }

    fn assert_balanced(stats: &SyncStatistics) {
        assert_eq!(
            stats.matched + stats.not_found + stats.skipped_no_match + stats.already_present + stats.failed,
            stats.total
        );
    }

    #[test]
    fn test_default_options() {
        let options = FavoriteSyncOptions::default();
        assert!(options.dry_run);
        assert!(options.skip_existing);
    }

    #[tokio::test]
    async fn test_empty_source_makes_no_calls() {
        let source = FakeLibrary::new(vec![]);
        let target = FakeCatalog::new();
        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(stats, SyncStatistics::default());
        assert_eq!(target.calls(), CallCounts::default());
    }

    #[tokio::test]
    async fn test_isrc_match_and_not_found() {
        let source = FakeLibrary::new(vec![
            TrackDescriptor::new("Track 1", "Artist 1", "Album 1", 200000).with_isrc("ISRC001"),
            TrackDescriptor::new("Obscure Track", "Unknown Artist", "", 180000),
        ]);
        let target = FakeCatalog::new().with_result(
            "Track 1",
            vec![Candidate::new(
                123456u64,
                TrackDescriptor::new("Track 1 - Remastered", "Artist One", "Album 1", 230000).with_isrc("ISRC001"),
            )],
        );

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(FavoriteSyncOptions::default())
            .await
            .unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.not_found, 1);
        assert_balanced(&stats);
        assert_eq!(stats.outcomes[0].target_id, Some(TrackId::from(123456u64)));
    }

    #[tokio::test]
    async fn test_dry_run_never_writes() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1"), track("Track 2", "Artist 2")]);
        let target = FakeCatalog::new()
            .with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")])
            .with_result("Track 2", vec![candidate("t2", "Track 2", "Artist 2")]);

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(FavoriteSyncOptions {
                dry_run: true,
                skip_existing: false,
            })
            .await
            .unwrap();

        assert_eq!(stats.matched, 2);
        assert_eq!(target.calls().writes(), 0);
        assert!(target.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_album_search_falls_back_to_title_and_artist() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new()
            .with_album_blind_search()
            .with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")]);

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(target.calls().search, 2);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.not_found, 0);
    }

    #[tokio::test]
    async fn test_album_free_search_runs_once() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new()
            .with_album_blind_search()
            .with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")]);

        let stats = FavoriteSync::new(&source, &target)
            .with_search_with_album(false)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(target.calls().search, 1);
        assert_eq!(stats.matched, 1);
    }

    #[tokio::test]
    async fn test_dry_run_dedups_like_live_run() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1"), track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new().with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")]);

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(FavoriteSyncOptions {
                dry_run: true,
                skip_existing: true,
            })
            .await
            .unwrap();

        assert_eq!(stats.matched, 1);
        assert_eq!(stats.already_present, 1);
        assert_eq!(target.calls().writes(), 0);
    }

    #[tokio::test]
    async fn test_live_run_writes_once_per_new_match() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new().with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")]);

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(stats.matched, 1);
        assert_eq!(target.calls().add_favorite, 1);
        assert_eq!(target.favorites(), vec![TrackId::new("t1")]);
    }

    #[tokio::test]
    async fn test_skip_existing_controls_favorites_fetch() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1"), track("Track 2", "Artist 2")]);
        let target = FakeCatalog::new();

        let sync = FavoriteSync::new(&source, &target);
        sync.sync_favorites(FavoriteSyncOptions {
            dry_run: true,
            skip_existing: false,
        })
        .await
        .unwrap();
        assert_eq!(target.calls().get_favorites, 0);

        sync.sync_favorites(FavoriteSyncOptions::default()).await.unwrap();
        assert_eq!(target.calls().get_favorites, 1);
    }

    #[tokio::test]
    async fn test_already_favorited_is_not_written() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new()
            .with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")])
            .with_favorites(&["t1"]);

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(stats.already_present, 1);
        assert_eq!(stats.favorite_counters()["already_favorited"], 1);
        assert_eq!(target.calls().add_favorite, 0);
    }

    #[tokio::test]
    async fn test_without_skip_existing_known_favorite_is_written() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new()
            .with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")])
            .with_favorites(&["t1"]);

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(FavoriteSyncOptions {
                dry_run: false,
                skip_existing: false,
            })
            .await
            .unwrap();

        assert_eq!(stats.matched, 1);
        assert_eq!(target.calls().add_favorite, 1);
    }

    #[tokio::test]
    async fn test_search_failure_is_per_track() {
        let source = FakeLibrary::new(vec![
            track("Track 1", "Artist 1"),
            track("Track 2", "Artist 2"),
            track("Track 3", "Artist 3"),
        ]);
        let target = FakeCatalog::new()
            .with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")])
            .with_failing_search("Track 2", "Connection timeout")
            .with_result("Track 3", vec![candidate("t3", "Track 3", "Artist 3")]);

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.outcomes[1].outcome, Outcome::Failed);
        assert!(stats.outcomes[1].detail.as_deref().unwrap().contains("Connection timeout"));
        assert_balanced(&stats);
    }

    #[tokio::test]
    async fn test_no_good_match_is_skipped() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new().with_result(
            "Track 1",
            vec![candidate("x", "Completely Different", "Someone Else")],
        );

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(stats.skipped_no_match, 1);
        assert_eq!(target.calls().add_favorite, 0);
    }

    #[tokio::test]
    async fn test_rejected_write_counts_as_failed() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new()
            .with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")])
            .rejecting_writes();

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(target.calls().add_favorite, 1);
    }

    #[tokio::test]
    async fn test_existing_favorites_failure_degrades() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new()
            .with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")])
            .failing_favorites();
        let reporter = Arc::new(RecordingReporter::default());

        let stats = FavoriteSync::new(&source, &target)
            .with_reporter(reporter.clone())
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(stats.matched, 1);
        assert!(reporter.events().iter().any(|e| e.starts_with("warning ")));
    }

    #[tokio::test]
    async fn test_duplicate_source_tracks_write_once() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1"), track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new().with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")]);

        let stats = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap();

        assert_eq!(stats.matched, 1);
        assert_eq!(stats.already_present, 1);
        assert_eq!(target.calls().add_favorite, 1);
    }

    #[tokio::test]
    async fn test_second_run_converges() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1")]);
        let target = FakeCatalog::new().with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")]);
        let sync = FavoriteSync::new(&source, &target);

        sync.sync_favorites(live()).await.unwrap();
        let second = sync.sync_favorites(live()).await.unwrap();

        assert_eq!(second.already_present, 1);
        assert_eq!(target.favorites().len(), 1);
    }

    #[tokio::test]
    async fn test_source_failure_is_fatal() {
        let source = FakeLibrary::failing();
        let target = FakeCatalog::new();

        let err = FavoriteSync::new(&source, &target)
            .sync_favorites(live())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::SourceFetch { .. }));
        assert_eq!(target.calls(), CallCounts::default());
    }

    #[tokio::test]
    async fn test_reporter_sees_every_track() {
        let source = FakeLibrary::new(vec![track("Track 1", "Artist 1"), track("Track 2", "Artist 2")]);
        let target = FakeCatalog::new().with_result("Track 1", vec![candidate("t1", "Track 1", "Artist 1")]);
        let reporter = Arc::new(RecordingReporter::default());

        FavoriteSync::new(&source, &target)
            .with_reporter(reporter.clone())
            .sync_favorites(FavoriteSyncOptions::default())
            .await
            .unwrap();

        assert_eq!(
            reporter.events(),
            vec![
                "start Favorite sync 2".to_string(),
                "track 0 Artist 1 - Track 1 matched".to_string(),
                "track 1 Artist 2 - Track 2 not_found".to_string(),
                "finish Favorite sync 2/2".to_string(),
            ]
        );
    }
}
