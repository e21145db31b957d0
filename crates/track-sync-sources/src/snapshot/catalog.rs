use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use track_sync_models::{Candidate, PlaylistId, SearchQuery, TargetPlaylist, TrackId};

use super::{read_snapshot, search_key};
use crate::error::SourceError;
use crate::traits::TargetCatalog;

const MAX_SEARCH_RESULTS: usize = 25;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub catalog: Vec<Candidate>,
    #[serde(default)]
    pub favorites: Vec<TrackId>,
    #[serde(default)]
    pub playlists: Vec<CatalogPlaylist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPlaylist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackId>,
}

/// Target service backed by a JSON catalog snapshot
///
/// Favorites and playlist changes are written back to the file before the
/// call returns. A change that cannot be written is undone in memory too, so
/// the in-memory state never runs ahead of the file.
pub struct SnapshotCatalog {
    name: String,
    path: PathBuf,
    state: Mutex<CatalogSnapshot>,
}

impl SnapshotCatalog {
    pub async fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let content = read_snapshot(&path).await?;
        let state: CatalogSnapshot =
            serde_json::from_str(&content).map_err(|source| SourceError::Snapshot {
                path: path.clone(),
                source,
            })?;
        debug!(
            catalog = state.catalog.len(),
            favorites = state.favorites.len(),
            playlists = state.playlists.len(),
            "Opened catalog snapshot {}",
            path.display()
        );
        Ok(Self {
            name: name.into(),
            path,
            state: Mutex::new(state),
        })
    }

    /// In-memory catalog, not persisted until the first write
    pub fn in_memory(name: impl Into<String>, path: impl Into<PathBuf>, state: CatalogSnapshot) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            state: Mutex::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.lock().await.clone()
    }

    async fn persist(&self, state: &CatalogSnapshot) -> Result<(), SourceError> {
        let content = serde_json::to_string_pretty(state).map_err(|source| SourceError::Snapshot {
            path: self.path.clone(),
            source,
        })?;

        // Write-then-rename keeps the previous file intact if we are interrupted
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|source| SourceError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

fn base_title(key: &str) -> &str {
    // search_key already dropped brackets, so cut at common version markers
    for marker in [" feat ", " ft ", " remaster", " live", " remix"] {
        if let Some(idx) = key.find(marker) {
            return &key[..idx];
        }
    }
    key
}

fn primary_artist(artist: &str) -> String {
    let cut = artist
        .find([',', '&', ';'])
        .map(|idx| &artist[..idx])
        .unwrap_or(artist);
    search_key(cut)
}

fn contains_either(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

fn matches_query(candidate: &Candidate, query: &SearchQuery) -> bool {
    let query_title = search_key(&query.title);
    let title = search_key(&candidate.track.title);
    let title_ok = contains_either(&title, &query_title)
        || contains_either(base_title(&title), base_title(&query_title));

    let artist_ok = contains_either(&search_key(&candidate.track.artist), &search_key(&query.artist))
        || contains_either(&primary_artist(&candidate.track.artist), &primary_artist(&query.artist));

    title_ok && artist_ok
}

#[async_trait]
impl TargetCatalog for SnapshotCatalog {
    fn service_name(&self) -> &str {
        &self.name
    }

    async fn search_track(&self, query: &SearchQuery) -> Result<Vec<Candidate>, SourceError> {
        let state = self.state.lock().await;
        let mut results: Vec<Candidate> = state
            .catalog
            .iter()
            .filter(|candidate| matches_query(candidate, query))
            .cloned()
            .collect();

        if let Some(album) = &query.album {
            let album_key = search_key(album);
            results.retain(|c| contains_either(&search_key(&c.track.album), &album_key));
        }

        results.truncate(MAX_SEARCH_RESULTS);
        Ok(results)
    }

    async fn get_favorite_tracks(&self) -> Result<Vec<TrackId>, SourceError> {
        Ok(self.state.lock().await.favorites.clone())
    }

    async fn add_favorite_track(&self, track_id: &TrackId) -> Result<bool, SourceError> {
        let mut state = self.state.lock().await;
        if !state.catalog.iter().any(|c| &c.id == track_id) {
            return Ok(false);
        }
        if !state.favorites.contains(track_id) {
            state.favorites.push(track_id.clone());
            if let Err(e) = self.persist(&state).await {
                state.favorites.pop();
                return Err(e);
            }
        }
        Ok(true)
    }

    async fn list_playlists(&self) -> Result<Vec<TargetPlaylist>, SourceError> {
        let state = self.state.lock().await;
        Ok(state
            .playlists
            .iter()
            .map(|p| TargetPlaylist {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect())
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<TargetPlaylist, SourceError> {
        let mut state = self.state.lock().await;
        let mut n = state.playlists.len() + 1;
        while state.playlists.iter().any(|p| p.id.as_str() == format!("pl-{}", n)) {
            n += 1;
        }
        let id = PlaylistId::new(format!("pl-{}", n));
        state.playlists.push(CatalogPlaylist {
            id: id.clone(),
            name: name.to_string(),
            description: description.map(str::to_string),
            tracks: Vec::new(),
        });
        if let Err(e) = self.persist(&state).await {
            state.playlists.pop();
            return Err(e);
        }
        info!(service = %self.name, playlist = name, "Created playlist {}", id);
        Ok(TargetPlaylist {
            id,
            name: name.to_string(),
        })
    }

    async fn get_playlist_tracks(&self, playlist_id: &PlaylistId) -> Result<Vec<TrackId>, SourceError> {
        let state = self.state.lock().await;
        state
            .playlists
            .iter()
            .find(|p| &p.id == playlist_id)
            .map(|p| p.tracks.clone())
            .ok_or_else(|| SourceError::PlaylistNotFound(playlist_id.clone()))
    }

    async fn add_tracks_to_playlist(
        &self,
        playlist_id: &PlaylistId,
        track_ids: &[TrackId],
    ) -> Result<bool, SourceError> {
        let mut state = self.state.lock().await;
        if track_ids
            .iter()
            .any(|id| !state.catalog.iter().any(|c| &c.id == id))
        {
            return Ok(false);
        }

        let index = state
            .playlists
            .iter()
            .position(|p| &p.id == playlist_id)
            .ok_or_else(|| SourceError::PlaylistNotFound(playlist_id.clone()))?;

        let previous_len = state.playlists[index].tracks.len();
        let playlist = &mut state.playlists[index];
        for id in track_ids {
            if !playlist.tracks.contains(id) {
                playlist.tracks.push(id.clone());
            }
        }
        if state.playlists[index].tracks.len() > previous_len {
            if let Err(e) = self.persist(&state).await {
                state.playlists[index].tracks.truncate(previous_len);
                return Err(e);
            }
        }
        Ok(true)
    }
}
