use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use track_sync_models::{PlaylistId, SourcePlaylist, TargetPlaylist, TrackId};
use track_sync_sources::{SourceError, SourceLibrary, TargetCatalog};

use crate::decision::{Destination, TrackReconciler};
use crate::error::SyncError;
use crate::matcher::MatchScorer;
use crate::report::{SyncReporter, TracingReporter};
use crate::stats::SyncStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaylistSyncOptions {
    /// Match and report without creating or modifying target playlists
    pub dry_run: bool,
    /// Reconcile the contents of playlists that already exist on the target
    pub update_existing: bool,
}

impl Default for PlaylistSyncOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            update_existing: false,
        }
    }
}

impl From<&track_sync_config::SyncOptions> for PlaylistSyncOptions {
    fn from(options: &track_sync_config::SyncOptions) -> Self {
        Self {
            dry_run: options.dry_run,
            update_existing: options.update_existing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistStatus {
    /// Tracks were reconciled (individual tracks may still have failed)
    Synced,
    /// Playlist already exists on the target and was left alone
    Skipped,
    /// The target playlist could not be resolved or created
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistSyncResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<PlaylistId>,
    pub created: bool,
    pub status: PlaylistStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub stats: SyncStatistics,
}

impl PlaylistSyncResult {
    fn failed(playlist: &SourcePlaylist, error: String) -> Self {
        Self {
            name: playlist.name.clone(),
            target_id: None,
            created: false,
            status: PlaylistStatus::Failed,
            error: Some(error),
            stats: SyncStatistics::default(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status != PlaylistStatus::Failed
    }
}

/// Totals over every playlist of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaylistRunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Subset of `succeeded` left untouched because they already existed
    pub skipped: usize,
    /// Track statistics merged over all playlists
    pub stats: SyncStatistics,
    pub results: Vec<PlaylistSyncResult>,
    /// Requested names with no source playlist of that name
    pub missing: Vec<String>,
}

impl PlaylistRunSummary {
    pub fn add(&mut self, result: PlaylistSyncResult) {
        self.attempted += 1;
        match result.status {
            PlaylistStatus::Failed => self.failed += 1,
            PlaylistStatus::Skipped => {
                self.skipped += 1;
                self.succeeded += 1;
            }
            PlaylistStatus::Synced => self.succeeded += 1,
        }
        self.stats.merge(&result.stats);
        self.results.push(result);
    }
}

/// Target playlist with the given name, exact match first
fn find_target<'t>(targets: &'t [TargetPlaylist], name: &str) -> Option<&'t TargetPlaylist> {
    targets.iter().find(|t| t.name == name).or_else(|| {
        let lower = name.to_lowercase();
        targets.iter().find(|t| t.name.to_lowercase() == lower)
    })
}

/// Copies source playlists and their contents into the target
pub struct PlaylistSync<'a> {
    source: &'a dyn SourceLibrary,
    target: &'a dyn TargetCatalog,
    scorer: MatchScorer,
    search_with_album: bool,
    reporter: Arc<dyn SyncReporter>,
}

impl<'a> PlaylistSync<'a> {
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

    pub(crate) fn reporter(&self) -> &dyn SyncReporter {
        self.reporter.as_ref()
    }

    pub(crate) fn source_name(&self) -> &str {
        self.source.service_name()
    }

    /// Sync one playlist
    ///
    /// Never returns an error: a playlist that cannot be resolved on the
    /// target comes back with [`PlaylistStatus::Failed`] and the cause.
    pub async fn sync_playlist(
        &self,
        playlist: &SourcePlaylist,
        options: &PlaylistSyncOptions,
    ) -> PlaylistSyncResult {
        self.reporter.playlist_started(playlist);

        let result = match self.reconcile_playlist(playlist, options).await {
            Ok(result) => result,
            Err(e) => {
                let cause = e.to_string();
                self.reporter.playlist_failed(&playlist.name, &cause);
                PlaylistSyncResult::failed(playlist, cause)
            }
        };

        self.reporter.playlist_finished(&result);
        result
    }

    async fn reconcile_playlist(
        &self,
        playlist: &SourcePlaylist,
        options: &PlaylistSyncOptions,
    ) -> Result<PlaylistSyncResult, SourceError> {
        let targets = self.target.list_playlists().await?;

        let (target_id, created) = match find_target(&targets, &playlist.name) {
            Some(existing) if !options.update_existing => {
                return Ok(PlaylistSyncResult {
                    name: playlist.name.clone(),
                    target_id: Some(existing.id.clone()),
                    created: false,
                    status: PlaylistStatus::Skipped,
                    error: None,
                    stats: SyncStatistics::default(),
                });
            }
            Some(existing) => {
                debug!("Updating existing playlist '{}' ({})", existing.name, existing.id);
                (Some(existing.id.clone()), false)
            }
            None if options.dry_run => {
                info!("Dry run: would create playlist '{}'", playlist.name);
                (None, false)
            }
            None => {
                let created = self
                    .target
                    .create_playlist(&playlist.name, playlist.description.as_deref())
                    .await?;
                info!("Created playlist '{}' on {}", created.name, self.target.service_name());
                (Some(created.id), true)
            }
        };

        let mut existing: HashSet<TrackId> = match &target_id {
            Some(id) if !created => match self.target.get_playlist_tracks(id).await {
                Ok(tracks) => tracks.into_iter().collect(),
                Err(e) => {
                    warn!(
                        "Could not fetch tracks of playlist '{}', continuing without dedup: {}",
                        playlist.name, e
                    );
                    HashSet::new()
                }
            },
            _ => HashSet::new(),
        };

        let reconciler = TrackReconciler {
            catalog: self.target,
            scorer: &self.scorer,
            search_with_album: self.search_with_album,
            skip_existing: true,
            dry_run: options.dry_run,
            destination: match &target_id {
                Some(id) => Destination::Playlist(id),
                None => Destination::PendingPlaylist,
            },
        };

        let mut stats = SyncStatistics::with_total(playlist.tracks.len());
        for (index, track) in playlist.tracks.iter().enumerate() {
            let outcome = reconciler.reconcile(track, &mut existing).await;
            self.reporter.track_processed(index, &outcome);
            stats.record(outcome);
        }

        Ok(PlaylistSyncResult {
            name: playlist.name.clone(),
            target_id,
            created,
            status: PlaylistStatus::Synced,
            error: None,
            stats,
        })
    }

    /// Sync every source playlist, or only those named in `filter`
    ///
    /// Failing to list the source playlists aborts the run. Anything after
    /// that is reported per playlist in the summary.
    #[instrument(skip(self, filter), fields(source = self.source.service_name(), target = self.target.service_name()))]
    pub async fn sync_playlists(
        &self,
        filter: Option<&BTreeSet<String>>,
        options: PlaylistSyncOptions,
    ) -> Result<PlaylistRunSummary, SyncError> {
        if options.dry_run {
            info!("Dry run: no playlists will be created or modified");
        }

        let playlists = self
            .source
            .list_playlists()
            .await
            .map_err(|e| SyncError::source_fetch(self.source.service_name(), "playlists", e))?;

        let mut summary = PlaylistRunSummary::default();
        let selected: Vec<&SourcePlaylist> = match filter {
            Some(names) => {
                summary.missing = names
                    .iter()
                    .filter(|name| !playlists.iter().any(|p| &p.name == *name))
                    .cloned()
                    .collect();
                playlists.iter().filter(|p| names.contains(&p.name)).collect()
            }
            None => playlists.iter().collect(),
        };

        info!("Syncing {} playlists from {}", selected.len(), self.source.service_name());
        for (i, playlist) in selected.iter().enumerate() {
            debug!("Playlist {}/{}", i + 1, selected.len());
            let result = self.sync_playlist(playlist, &options).await;
            summary.add(result);
        }

        info!(
            "Playlist sync complete: {} attempted, {} succeeded, {} failed",
            summary.attempted, summary.succeeded, summary.failed
        );
        Ok(summary)
    }
}
