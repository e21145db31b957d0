//! Test doubles for the service traits and the reporter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use track_sync_models::{
    Candidate, PlaylistId, SearchQuery, SourcePlaylist, TargetPlaylist, TrackDescriptor, TrackId,
};
use track_sync_sources::{SourceError, SourceLibrary, TargetCatalog};

use crate::playlists::PlaylistSyncResult;
use crate::report::SyncReporter;
use crate::stats::{SyncStatistics, TrackOutcome};

pub fn track(title: &str, artist: &str) -> TrackDescriptor {
    TrackDescriptor::new(title, artist, "Album", 200000)
}

pub fn candidate(id: &str, title: &str, artist: &str) -> Candidate {
    Candidate::new(id, track(title, artist))
}

pub fn source_playlist(id: &str, name: &str, tracks: Vec<TrackDescriptor>) -> SourcePlaylist {
    SourcePlaylist {
        id: PlaylistId::new(id),
        name: name.to_string(),
        description: None,
        tracks,
    }
}

#[derive(Default)]
pub struct FakeLibrary {
    saved: Vec<TrackDescriptor>,
    playlists: Vec<SourcePlaylist>,
    failing: bool,
}

impl FakeLibrary {
    pub fn new(saved: Vec<TrackDescriptor>) -> Self {
        Self {
            saved,
            ..Self::default()
        }
    }

    pub fn with_playlists(playlists: Vec<SourcePlaylist>) -> Self {
        Self {
            playlists,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SourceLibrary for FakeLibrary {
    fn service_name(&self) -> &str {
        "fake-source"
    }

    async fn get_saved_tracks(&self) -> Result<Vec<TrackDescriptor>, SourceError> {
        if self.failing {
            return Err(SourceError::transport("fake-source", "unauthorized"));
        }
        Ok(self.saved.clone())
    }

    async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, SourceError> {
        if self.failing {
            return Err(SourceError::transport("fake-source", "unauthorized"));
        }
        Ok(self.playlists.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallCounts {
    pub search: usize,
    pub get_favorites: usize,
    pub add_favorite: usize,
    pub list_playlists: usize,
    pub create_playlist: usize,
    pub get_playlist_tracks: usize,
    pub add_to_playlist: usize,
}

impl CallCounts {
    pub fn writes(&self) -> usize {
        self.add_favorite + self.create_playlist + self.add_to_playlist
    }
}

/// In-memory target catalog keyed by search title
#[derive(Default)]
pub struct FakeCatalog {
    results: HashMap<String, Vec<Candidate>>,
    failing_searches: HashMap<String, String>,
    favorites: Mutex<Vec<TrackId>>,
    favorites_error: bool,
    reject_writes: bool,
    fail_create: bool,
    album_blind: bool,
    fail_list_playlists: bool,
    fail_playlist_tracks: bool,
    playlists: Mutex<Vec<(TargetPlaylist, Vec<TrackId>)>>,
    calls: Mutex<CallCounts>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, title: &str, candidates: Vec<Candidate>) -> Self {
        self.results.insert(title.to_string(), candidates);
        self
    }

    pub fn with_failing_search(mut self, title: &str, message: &str) -> Self {
        self.failing_searches.insert(title.to_string(), message.to_string());
        self
    }

    pub fn with_favorites(self, ids: &[&str]) -> Self {
        if let Ok(mut favorites) = self.favorites.lock() {
            favorites.extend(ids.iter().map(|id| TrackId::new(*id)));
        }
        self
    }

    pub fn failing_favorites(mut self) -> Self {
        self.favorites_error = true;
        self
    }

    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Album-scoped searches come back empty
    pub fn with_album_blind_search(mut self) -> Self {
        self.album_blind = true;
        self
    }

    pub fn failing_list_playlists(mut self) -> Self {
        self.fail_list_playlists = true;
        self
    }

    pub fn failing_playlist_tracks(mut self) -> Self {
        self.fail_playlist_tracks = true;
        self
    }

    pub fn with_playlist(self, id: &str, name: &str, tracks: &[&str]) -> Self {
        if let Ok(mut playlists) = self.playlists.lock() {
            playlists.push((
                TargetPlaylist {
                    id: PlaylistId::new(id),
                    name: name.to_string(),
                },
                tracks.iter().map(|t| TrackId::new(*t)).collect(),
            ));
        }
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.calls.lock().unwrap().clone()
    }

    pub fn favorites(&self) -> Vec<TrackId> {
        self.favorites.lock().unwrap().clone()
    }

    pub fn playlist_tracks(&self, name: &str) -> Option<Vec<TrackId>> {
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.name == name)
            .map(|(_, tracks)| tracks.clone())
    }

    pub fn playlist_names(&self) -> Vec<String> {
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.name.clone())
            .collect()
    }

    fn count(&self, f: impl FnOnce(&mut CallCounts)) {
        f(&mut self.calls.lock().unwrap());
    }
}

#[async_trait]
impl TargetCatalog for FakeCatalog {
    fn service_name(&self) -> &str {
        "fake-target"
    }

    async fn search_track(&self, query: &SearchQuery) -> Result<Vec<Candidate>, SourceError> {
        self.count(|c| c.search += 1);
        if let Some(message) = self.failing_searches.get(&query.title) {
            return Err(SourceError::transport("fake-target", message.as_str()));
        }
        if self.album_blind && query.album.is_some() {
            return Ok(Vec::new());
        }
        Ok(self.results.get(&query.title).cloned().unwrap_or_default())
    }

    async fn get_favorite_tracks(&self) -> Result<Vec<TrackId>, SourceError> {
        self.count(|c| c.get_favorites += 1);
        if self.favorites_error {
            return Err(SourceError::transport("fake-target", "Connection reset"));
        }
        Ok(self.favorites())
    }

    async fn add_favorite_track(&self, track_id: &TrackId) -> Result<bool, SourceError> {
        self.count(|c| c.add_favorite += 1);
        if self.reject_writes {
            return Ok(false);
        }
        self.favorites.lock().unwrap().push(track_id.clone());
        Ok(true)
    }

    async fn list_playlists(&self) -> Result<Vec<TargetPlaylist>, SourceError> {
        self.count(|c| c.list_playlists += 1);
        if self.fail_list_playlists {
            return Err(SourceError::transport("fake-target", "Service unavailable"));
        }
        Ok(self.playlists.lock().unwrap().iter().map(|(p, _)| p.clone()).collect())
    }

    async fn create_playlist(
        &self,
        name: &str,
        _description: Option<&str>,
    ) -> Result<TargetPlaylist, SourceError> {
        self.count(|c| c.create_playlist += 1);
        if self.fail_create {
            return Err(SourceError::transport("fake-target", "Request timeout"));
        }
        let mut playlists = self.playlists.lock().unwrap();
        let playlist = TargetPlaylist {
            id: PlaylistId::new(format!("new-{}", playlists.len() + 1)),
            name: name.to_string(),
        };
        playlists.push((playlist.clone(), Vec::new()));
        Ok(playlist)
    }

    async fn get_playlist_tracks(&self, playlist_id: &PlaylistId) -> Result<Vec<TrackId>, SourceError> {
        self.count(|c| c.get_playlist_tracks += 1);
        if self.fail_playlist_tracks {
            return Err(SourceError::transport("fake-target", "Connection reset"));
        }
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| &p.id == playlist_id)
            .map(|(_, tracks)| tracks.clone())
            .ok_or_else(|| SourceError::PlaylistNotFound(playlist_id.clone()))
    }

    async fn add_tracks_to_playlist(
        &self,
        playlist_id: &PlaylistId,
        track_ids: &[TrackId],
    ) -> Result<bool, SourceError> {
        self.count(|c| c.add_to_playlist += 1);
        if self.reject_writes {
            return Ok(false);
        }
        let mut playlists = self.playlists.lock().unwrap();
        let (_, tracks) = playlists
            .iter_mut()
            .find(|(p, _)| &p.id == playlist_id)
            .ok_or_else(|| SourceError::PlaylistNotFound(playlist_id.clone()))?;
        tracks.extend(track_ids.iter().cloned());
        Ok(true)
    }
}

/// Reporter that keeps every event as a line of text
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl SyncReporter for RecordingReporter {
    fn run_started(&self, operation: &str, total: usize) {
        self.push(format!("start {} {}", operation, total));
    }

    fn track_processed(&self, index: usize, outcome: &TrackOutcome) {
        self.push(format!("track {} {} {}", index, outcome.track, outcome.outcome));
    }

    fn run_finished(&self, operation: &str, stats: &SyncStatistics) {
        self.push(format!("finish {} {}/{}", operation, stats.processed(), stats.total));
    }

    fn playlist_started(&self, playlist: &SourcePlaylist) {
        self.push(format!("Syncing playlist: {} ({} tracks)", playlist.name, playlist.tracks.len()));
    }

    fn playlist_failed(&self, name: &str, cause: &str) {
        self.push(format!("Error syncing playlist: {}: {}", name, cause));
    }

    fn playlist_finished(&self, result: &PlaylistSyncResult) {
        self.push(format!("playlist {} {:?}", result.name, result.status));
    }

    fn notice(&self, message: &str) {
        self.push(format!("notice {}", message));
    }

    fn warning(&self, message: &str) {
        self.push(format!("warning {}", message));
    }
}
