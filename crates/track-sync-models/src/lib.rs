pub mod error;
pub mod playlist;
pub mod track;

pub use error::ModelError;
pub use playlist::{PlaylistId, SourcePlaylist, TargetPlaylist};
pub use track::{Candidate, SearchQuery, TrackDescriptor, TrackId};
