use std::path::PathBuf;
use thiserror::Error;
use track_sync_models::{ModelError, PlaylistId};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    Message(String),

    #[error("{service} request failed: {message}")]
    Transport { service: String, message: String },

    #[error("playlist {0} not found")]
    PlaylistNotFound(PlaylistId),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {context}: {source}")]
    Record {
        context: String,
        #[source]
        source: ModelError,
    },
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }
}
