use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ModelError;

/// Opaque, service-specific track identifier
///
/// Services hand out numeric ids (Qobuz) as well as string ids (Spotify URIs),
/// so the identifier is kept as a string and compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrackId(String);

/// Accepts an id given either as a JSON string or a JSON number
pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

impl<'de> Deserialize<'de> for TrackId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_id(deserializer).map(Self)
    }
}

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Metadata describing one recording, as fetched from a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Track length in milliseconds (0 when the service does not report it)
    #[serde(alias = "duration", default)]
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
}

impl TrackDescriptor {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration_ms,
            isrc: None,
        }
    }

    pub fn with_isrc(mut self, isrc: impl Into<String>) -> Self {
        self.isrc = Some(isrc.into());
        self
    }

    /// ISRC normalized for comparison (trimmed, uppercase), empty values treated as absent
    pub fn normalized_isrc(&self) -> Option<String> {
        self.isrc
            .as_deref()
            .map(str::trim)
            .filter(|isrc| !isrc.is_empty())
            .map(|isrc| isrc.to_ascii_uppercase())
    }

    /// Build a descriptor from a loosely-typed service record
    ///
    /// `title` and `artist` are required. `album` defaults to empty, `duration`
    /// (or `duration_ms`) to 0, and a null or blank `isrc` is treated as absent.
    /// Field errors surface here rather than during scoring.
    pub fn from_record(record: &Value) -> Result<Self, ModelError> {
        let object = record.as_object().ok_or(ModelError::NotAnObject)?;

        let title = required_string(object, "title")?;
        let artist = required_string(object, "artist")?;
        let album = optional_string(object, "album")?.unwrap_or_default();

        let duration_ms = match object.get("duration_ms").or_else(|| object.get("duration")) {
            None | Some(Value::Null) => 0,
            Some(value) => value.as_u64().ok_or_else(|| ModelError::InvalidField {
                field: "duration",
                reason: format!("expected a non-negative integer, got {}", value),
            })?,
        };

        let isrc = optional_string(object, "isrc")?.filter(|isrc| !isrc.trim().is_empty());

        Ok(Self {
            title,
            artist,
            album,
            duration_ms,
            isrc,
        })
    }

    /// Short human-readable label used in logs and reports
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

fn required_string(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, ModelError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ModelError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ModelError::InvalidField {
            field,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

fn optional_string(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ModelError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ModelError::InvalidField {
            field,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

/// A search hit from the target catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: TrackId,
    #[serde(flatten)]
    pub track: TrackDescriptor,
}

impl Candidate {
    pub fn new(id: impl Into<TrackId>, track: TrackDescriptor) -> Self {
        Self {
            id: id.into(),
            track,
        }
    }
}

/// Catalog search request derived from a source track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
}

impl SearchQuery {
    pub fn for_track(track: &TrackDescriptor, with_album: bool) -> Self {
        let album = if with_album && !track.album.trim().is_empty() {
            Some(track.album.clone())
        } else {
            None
        };
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album,
        }
    }

    pub fn without_album(&self) -> Self {
        Self {
            album: None,
            ..self.clone()
        }
    }
}
