use std::path::PathBuf;

use thiserror::Error;

/// Hard failures: file I/O, unreadable manifests, logger setup.
///
/// Per-entry data problems are not errors; they travel as
/// [`InferenceWarning`](crate::infer::InferenceWarning) values.
#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid source document `{id}`: {reason}")]
    InvalidDocument { id: String, reason: String },
    #[error("logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, DiaryError>;

impl DiaryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiaryError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        DiaryError::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        DiaryError::InvalidDocument {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
