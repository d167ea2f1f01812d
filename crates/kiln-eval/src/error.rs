use kiln_backend::ScoringError;
use thiserror::Error;

/// Result type alias for evaluation operations.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Errors produced during evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Records and labels differ in length; nothing can be aligned.
    #[error("records and labels are misaligned: {records} records, {labels} labels")]
    Misaligned {
        /// Number of records supplied.
        records: usize,
        /// Number of labels supplied.
        labels: usize,
    },

    /// Batch size of zero makes no progress.
    #[error("batch size must be >= 1")]
    InvalidBatchSize,

    /// A prediction did not round to a known class.
    #[error("prediction {value} is not a valid class label")]
    InvalidClass {
        /// The offending prediction.
        value: f32,
    },

    /// A batch failed after exhausting its retries.
    #[error("batch {batch_index} failed: {source}")]
    BatchFailed {
        /// 0-based index of the failed batch.
        batch_index: usize,
        #[source]
        source: ScoringError,
    },
}
