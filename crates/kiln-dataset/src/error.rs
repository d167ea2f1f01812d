use thiserror::Error;

/// Result type alias for dataset operations.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

/// Errors produced while loading, encoding, or uploading datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Malformed sparse record, with the 1-based line it occurred on.
    #[error("format error at line {line}: {message}")]
    Format {
        /// 1-based line number of the offending record.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Malformed IDX payload.
    #[error("idx error: {0}")]
    Idx(String),

    /// Invalid shard plan.
    #[error("shard error: {0}")]
    Shard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Backend(#[from] kiln_core::BackendError),
}

impl DatasetError {
    /// Create a format error for the given 1-based line.
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format { line, message: message.into() }
    }
}
