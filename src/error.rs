use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdviceError {
    #[error("no recommendation available: hero cards unknown")]
    MissingHeroCards,
}

/// Why an external decision source could not be used.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("decision source timed out after {0:?}")]
    Timeout(Duration),
    #[error("decision source unavailable: {0}")]
    Unavailable(String),
    #[error("decision source returned malformed output: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}
