use std::path::PathBuf;

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, MatchError>;

/// Errors raised by the matching engine.
///
/// The first four variants are the precondition failures callers are expected to
/// branch on; use [`MatchError::kind`] instead of matching on messages.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("corpus error: {0}")]
    Corpus(String),

    #[error("vector space is not fitted")]
    NotFitted,

    #[error("corpus has no candidates")]
    EmptyCorpus,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("description enhancement failed: {0}")]
    Enhancement(String),
}

/// Stable discriminant of a [`MatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Corpus,
    NotFitted,
    EmptyCorpus,
    InvalidInput,
    Config,
    Source,
    Json,
    Snapshot,
    Enhancement,
}

impl MatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatchError::Corpus(_) => ErrorKind::Corpus,
            MatchError::NotFitted => ErrorKind::NotFitted,
            MatchError::EmptyCorpus => ErrorKind::EmptyCorpus,
            MatchError::InvalidInput(_) => ErrorKind::InvalidInput,
            MatchError::Config(_) => ErrorKind::Config,
            MatchError::Source { .. } => ErrorKind::Source,
            MatchError::Json(_) => ErrorKind::Json,
            MatchError::Snapshot(_) => ErrorKind::Snapshot,
            MatchError::Enhancement(_) => ErrorKind::Enhancement,
        }
    }

    pub(crate) fn source_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MatchError::Source { path: path.into(), source }
    }
}

impl From<serde_cbor::Error> for MatchError {
    fn from(e: serde_cbor::Error) -> Self {
        MatchError::Snapshot(e.to_string())
    }
}
