use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::track::{deserialize_id, TrackDescriptor};

/// Opaque, service-specific playlist identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl<'de> Deserialize<'de> for PlaylistId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_id(deserializer).map(Self)
    }
}

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaylistId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A playlist on the source service, with its full track list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePlaylist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackDescriptor>,
}

/// A playlist on the target service (contents are fetched separately)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPlaylist {
    pub id: PlaylistId,
    pub name: String,
}
