use thiserror::Error;
use track_sync_sources::SourceError;

/// Errors that abort a run before any write is made
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch {what} from {service}: {source}")]
    SourceFetch {
        service: String,
        what: &'static str,
        #[source]
        source: SourceError,
    },
}

impl SyncError {
    pub fn source_fetch(service: &str, what: &'static str, source: SourceError) -> Self {
        Self::SourceFetch {
            service: service.to_string(),
            what,
            source,
        }
    }
}
