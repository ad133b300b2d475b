//! # Error Types

use std::path::PathBuf;

/// Errors from wordbale operations.
#[derive(Debug, thiserror::Error)]
pub enum WordbaleError {
    /// The tokenizer model artifact is missing or could not be loaded.
    #[error("tokenizer model not found: {path:?}: {reason}")]
    ModelNotFound {
        /// The model path that failed to load.
        path: PathBuf,

        /// Why the load failed.
        reason: String,
    },

    /// A parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The output location cannot be created or written.
    #[error("storage error at {path:?}: {source}")]
    Storage {
        /// The offending path.
        path: PathBuf,

        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Corpus normalization produced no lines.
    #[error("corpus is empty: no non-empty lines under {path:?}")]
    CorpusEmpty {
        /// The input directory that was scanned.
        path: PathBuf,
    },

    /// The corpus input is missing, or has no eligible source files.
    #[error("corpus not found: {path:?}")]
    CorpusNotFound {
        /// The missing corpus path.
        path: PathBuf,
    },

    /// An artifact on disk does not follow its format.
    #[error("malformed artifact {path:?}: {reason}")]
    Format {
        /// The offending artifact.
        path: PathBuf,

        /// What was wrong.
        reason: String,
    },

    /// A shard set breaks one of its invariants.
    #[error("shard set integrity: {0}")]
    Integrity(String),

    /// Token value out of range for the model.
    #[error("token out of range: {0}")]
    TokenOutOfRange(u64),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WordbaleError {
    /// Wrap an I/O failure at `path` as [`WordbaleError::Storage`].
    pub fn storage<P: Into<PathBuf>>(
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Build a [`WordbaleError::Format`] error.
    pub fn format<P: Into<PathBuf>, S: Into<String>>(
        path: P,
        reason: S,
    ) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for wordbale operations.
pub type WBResult<T> = core::result::Result<T, WordbaleError>;
