use async_trait::async_trait;
use track_sync_models::{Candidate, PlaylistId, SearchQuery, SourcePlaylist, TargetPlaylist, TrackDescriptor, TrackId};

use crate::error::SourceError;

/// Read side of the service tracks are synced from
#[async_trait]
pub trait SourceLibrary: Send + Sync {
    // Service metadata (used in logs and reports)
    fn service_name(&self) -> &str;

    /// All tracks the user saved / liked
    async fn get_saved_tracks(&self) -> Result<Vec<TrackDescriptor>, SourceError>;

    /// All playlists owned by the user, with their tracks
    async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, SourceError>;
}

/// Catalog and library operations on the service tracks are synced into
#[async_trait]
pub trait TargetCatalog: Send + Sync {
    // Service metadata (used in logs and reports)
    fn service_name(&self) -> &str;

    // Catalog
    /// Search the catalog. An empty result is not an error.
    async fn search_track(&self, query: &SearchQuery) -> Result<Vec<Candidate>, SourceError>;

    // Favorites
    async fn get_favorite_tracks(&self) -> Result<Vec<TrackId>, SourceError>;
    /// Returns `Ok(false)` when the service rejected the write
    async fn add_favorite_track(&self, track_id: &TrackId) -> Result<bool, SourceError>;

    // Playlists
    async fn list_playlists(&self) -> Result<Vec<TargetPlaylist>, SourceError>;
    async fn create_playlist(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<TargetPlaylist, SourceError>;
    async fn get_playlist_tracks(&self, playlist_id: &PlaylistId) -> Result<Vec<TrackId>, SourceError>;
    /// Returns `Ok(false)` when the service rejected the write
    async fn add_tracks_to_playlist(
        &self,
        playlist_id: &PlaylistId,
        track_ids: &[TrackId],
    ) -> Result<bool, SourceError>;
}
