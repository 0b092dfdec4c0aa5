//! Error taxonomy shared by acquisition, analysis, and scoring.
//!
//! Only `AnalysisError` and `ValidationError` ever reach the HTTP boundary; oracle
//! and parse failures are absorbed into fallback values where they happen.

use thiserror::Error;

/// Network or URL failure while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Error fetching website: invalid url '{0}'")]
    InvalidUrl(String),
    #[error("Error fetching website: {0}")]
    Request(String),
    #[error("Error fetching website: HTTP status {0}")]
    Status(u16),
}

/// Failure of a single oracle call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle transport error: {0}")]
    Transport(String),
    #[error("oracle returned HTTP status {0}")]
    Status(u16),
    #[error("oracle returned no text")]
    EmptyResponse,
    #[error("oracle failure: {0}")]
    Scripted(String),
}

/// Oracle text that could not be recovered as a JSON object.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object span in response")]
    NoJsonSpan,
    #[error("malformed JSON: {0}")]
    Malformed(String),
    #[error("JSON top level is not an object")]
    NotAnObject,
}

/// Feature, training, or persistence failure of the scoring model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid user score: {0}")]
    InvalidScore(String),
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("training set has {rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
}

/// Missing or conflicting request fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// What escapes the orchestrator to the request boundary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("image payload is empty")]
    EmptyImage,
    #[error("scoring task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_message_keeps_prefix() {
        let e = FetchError::Status(404);
        assert_eq!(e.to_string(), "Error fetching website: HTTP status 404");
    }

    #[test]
    fn analysis_error_is_transparent_over_sources() {
        let e: AnalysisError = FetchError::Request("timed out".into()).into();
        assert_eq!(e.to_string(), "Error fetching website: timed out");
        let v: AnalysisError = ValidationError::new("Either features or HTML must be provided").into();
        assert_eq!(v.to_string(), "Either features or HTML must be provided");
    }
}
