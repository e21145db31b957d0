use std::collections::HashSet;
use tracing::{debug, trace};
use track_sync_models::{Candidate, PlaylistId, SearchQuery, TrackDescriptor, TrackId};
use track_sync_sources::{SourceError, TargetCatalog};

use crate::matcher::MatchScorer;
use crate::stats::{Outcome, TrackOutcome};

/// What the catalog search and the scorer concluded for one source track
#[derive(Debug)]
pub enum MatchDecision {
    Matched(Candidate),
    /// Candidates came back but none cleared the threshold
    NoGoodMatch,
    /// The search returned nothing
    NotFound,
    /// The search itself failed
    Error(SourceError),
}

/// Search the target catalog for `track` and score the results
///
/// With `with_album` set, an empty album-scoped search is retried once on
/// title and artist alone before the track is declared not found.
pub async fn decide(
    catalog: &dyn TargetCatalog,
    scorer: &MatchScorer,
    track: &TrackDescriptor,
    with_album: bool,
) -> MatchDecision {
    let query = SearchQuery::for_track(track, with_album);
    let mut candidates = match catalog.search_track(&query).await {
        Ok(candidates) => candidates,
        Err(e) => return MatchDecision::Error(e),
    };

    if candidates.is_empty() && query.album.is_some() {
        debug!("No results for {} with album, retrying without", track.label());
        candidates = match catalog.search_track(&query.without_album()).await {
            Ok(candidates) => candidates,
            Err(e) => return MatchDecision::Error(e),
        };
    }

    if candidates.is_empty() {
        return MatchDecision::NotFound;
    }

    match scorer.find_best_match(track, &candidates) {
        Some(best) => {
            trace!(
                "Best match for {}: {} ({})",
                track.label(),
                best.id,
                scorer.score(track, best).summary()
            );
            MatchDecision::Matched(best.clone())
        }
        None => MatchDecision::NoGoodMatch,
    }
}

/// Where matched tracks are written
#[derive(Debug, Clone, Copy)]
pub(crate) enum Destination<'a> {
    Favorites,
    Playlist(&'a PlaylistId),
    /// Playlist that does not exist yet (dry runs only)
    PendingPlaylist,
}

impl Destination<'_> {
    async fn add(&self, catalog: &dyn TargetCatalog, track_id: &TrackId) -> Result<bool, SourceError> {
        match self {
            Destination::Favorites => catalog.add_favorite_track(track_id).await,
            Destination::Playlist(playlist_id) => {
                catalog
                    .add_tracks_to_playlist(playlist_id, std::slice::from_ref(track_id))
                    .await
            }
            Destination::PendingPlaylist => Err(SourceError::new("target playlist was not created")),
        }
    }
}

/// Per-track reconciliation shared by the favorite and playlist loops
pub(crate) struct TrackReconciler<'a> {
    pub catalog: &'a dyn TargetCatalog,
    pub scorer: &'a MatchScorer,
    pub search_with_album: bool,
    pub skip_existing: bool,
    pub dry_run: bool,
    pub destination: Destination<'a>,
}

impl TrackReconciler<'_> {
    /// Resolve one track to exactly one outcome
    ///
    /// `existing` is the target's membership set; identifiers written during
    /// the run are added to it, and so are the ones a dry run would write.
    pub async fn reconcile(&self, track: &TrackDescriptor, existing: &mut HashSet<TrackId>) -> TrackOutcome {
        let label = track.label();
        let candidate = match decide(self.catalog, self.scorer, track, self.search_with_album).await {
            MatchDecision::Matched(candidate) => candidate,
            MatchDecision::NoGoodMatch => return TrackOutcome::new(label, Outcome::SkippedNoMatch),
            MatchDecision::NotFound => return TrackOutcome::new(label, Outcome::NotFound),
            MatchDecision::Error(e) => {
                return TrackOutcome::new(label, Outcome::Failed).with_detail(format!("search failed: {}", e))
            }
        };

        if self.skip_existing && existing.contains(&candidate.id) {
            return TrackOutcome::new(label, Outcome::AlreadyPresent).with_target(candidate.id);
        }

        if self.dry_run {
            existing.insert(candidate.id.clone());
            return TrackOutcome::new(label, Outcome::Matched).with_target(candidate.id);
        }

        match self.destination.add(self.catalog, &candidate.id).await {
            Ok(true) => {
                existing.insert(candidate.id.clone());
                TrackOutcome::new(label, Outcome::Matched).with_target(candidate.id)
            }
            Ok(false) => TrackOutcome::new(label, Outcome::Failed)
                .with_target(candidate.id)
                .with_detail("write rejected by target"),
            Err(e) => TrackOutcome::new(label, Outcome::Failed)
                .with_target(candidate.id)
                .with_detail(format!("write failed: {}", e)),
        }
    }
}
