use crate::confusion::ConfusionMatrix;
use serde::Serialize;

/// Outcome of a full evaluation pass.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Records submitted for evaluation.
    pub total: usize,
    /// Records actually scored (total minus skipped batches).
    pub evaluated: usize,
    /// Scored records whose prediction differed from the true label.
    pub mismatches: u64,
    /// `mismatches / evaluated`; 0.0 when nothing was evaluated.
    pub error_rate: f64,
    /// 0-based indices of batches excluded after exhausting retries.
    pub skipped_batches: Vec<usize>,
    /// Per-class prediction/label counts.
    pub confusion: ConfusionMatrix,
}

impl EvaluationReport {
    /// `1.0 - error_rate` over the evaluated records.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        1.0 - self.error_rate
    }
}
