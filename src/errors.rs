use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the ingestion and retrieval pipeline.
///
/// There is no local recovery anywhere: every error is logged with the phase
/// it occurred in and then propagated up to the binary boundary.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{service} service returned status {status}: {message}")]
    Service {
        service: &'static str,
        status: u16,
        message: String,
    },
    #[error("invalid response from {service} service: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },
    #[error("corpus file not found: {}", .0.display())]
    CorpusNotFound(PathBuf),
    #[error("embedding has {actual} dimensions, collection is configured for {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("collection '{collection}' already exists with {found}, configured {requested}")]
    CollectionMismatch {
        collection: String,
        found: String,
        requested: String,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RagError {
    pub fn invalid_response<R: Into<String>>(service: &'static str, reason: R) -> Self {
        RagError::InvalidResponse {
            service,
            reason: reason.into(),
        }
    }
}
