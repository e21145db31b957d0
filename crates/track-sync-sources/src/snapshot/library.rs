use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use track_sync_models::{PlaylistId, SourcePlaylist, TrackDescriptor};

use super::read_snapshot;
use crate::error::SourceError;
use crate::traits::SourceLibrary;

#[derive(Debug, Deserialize)]
struct RawLibrary {
    #[serde(default)]
    saved_tracks: Vec<Value>,
    #[serde(default)]
    playlists: Vec<RawPlaylist>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    id: PlaylistId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tracks: Vec<Value>,
}

/// Source library read from a JSON export
///
/// The file is re-read on every call so each run sees the current export.
/// Track records are validated field by field; one malformed record fails the
/// whole fetch.
pub struct SnapshotLibrary {
    name: String,
    path: PathBuf,
}

impl SnapshotLibrary {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<RawLibrary, SourceError> {
        let content = read_snapshot(&self.path).await?;
        serde_json::from_str(&content).map_err(|source| SourceError::Snapshot {
            path: self.path.clone(),
            source,
        })
    }
}

fn parse_tracks(records: &[Value], context: &str) -> Result<Vec<TrackDescriptor>, SourceError> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            TrackDescriptor::from_record(record).map_err(|source| SourceError::Record {
                context: format!("{} track #{}", context, idx + 1),
                source,
            })
        })
        .collect()
}

#[async_trait]
impl SourceLibrary for SnapshotLibrary {
    fn service_name(&self) -> &str {
        &self.name
    }

    async fn get_saved_tracks(&self) -> Result<Vec<TrackDescriptor>, SourceError> {
        let raw = self.load().await?;
        let tracks = parse_tracks(&raw.saved_tracks, "saved")?;
        debug!(service = %self.name, count = tracks.len(), "Loaded saved tracks from snapshot");
        Ok(tracks)
    }

    async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, SourceError> {
        let raw = self.load().await?;
        let mut playlists = Vec::with_capacity(raw.playlists.len());
        for playlist in raw.playlists {
            let tracks = parse_tracks(&playlist.tracks, &format!("playlist '{}'", playlist.name))?;
            playlists.push(SourcePlaylist {
                id: playlist.id,
                name: playlist.name,
                description: playlist.description,
                tracks,
            });
        }
        debug!(service = %self.name, count = playlists.len(), "Loaded playlists from snapshot");
        Ok(playlists)
    }
}
