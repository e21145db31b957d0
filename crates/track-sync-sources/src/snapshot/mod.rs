//! JSON library snapshots
//!
//! A snapshot is an export of one service's library: saved tracks and
//! playlists for the source side, or the searchable catalog plus the user's
//! favorites and playlists for the target side. Target snapshots are written
//! back after every change so an interrupted run keeps the writes it made.

pub mod catalog;
pub mod library;

pub use catalog::{CatalogPlaylist, CatalogSnapshot, SnapshotCatalog};
pub use library::SnapshotLibrary;

use std::path::Path;

use crate::error::SourceError;

async fn read_snapshot(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path).await.map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Lowercase, alphanumeric-only form used by the snapshot search
fn search_key(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
