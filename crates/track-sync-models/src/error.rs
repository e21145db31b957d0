use thiserror::Error;

/// Errors raised while turning raw service records into typed descriptors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("track record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("track record field '{field}' has an invalid value: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("track record is not an object")]
    NotAnObject,
}
