//! Batched evaluation against a scoring endpoint.
//!
//! Records are sent in contiguous batches of at most `batch_size`, so a
//! pass over L records makes ceil(L/B) endpoint calls. Per-batch
//! predictions are concatenated in submission order; alignment with the
//! label sequence is preserved across batch boundaries.

use crate::confusion::ConfusionMatrix;
use crate::error::{EvalError, EvalResult};
use crate::report::EvaluationReport;
use kiln_backend::Scorer;
use kiln_core::RetryPolicy;
use kiln_dataset::NUM_CLASSES;
use tracing::{debug, warn};

/// What to do with a batch that exhausts its retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole evaluation. The default: a partial error rate is
    /// easy to misread as a full one.
    #[default]
    Abort,
    /// Record a sentinel for the batch's positions and exclude them from
    /// the error-rate denominator.
    SkipExhausted,
}

/// Runs batched evaluation passes.
#[derive(Debug, Clone)]
pub struct Evaluator {
    batch_size: usize,
    retry_policy: RetryPolicy,
    failure_policy: FailurePolicy,
}

impl Evaluator {
    /// Create an evaluator with the given batch size.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size, retry_policy: RetryPolicy::default(), failure_policy: FailurePolicy::default() }
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Override the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Score every record and compare against the true labels.
    ///
    /// `records` and `labels` must be the same length and order-aligned;
    /// the result covers all of them unless batches were skipped under
    /// `FailurePolicy::SkipExhausted`.
    pub async fn run(
        &self,
        scorer: &dyn Scorer,
        records: &[String],
        labels: &[u8],
    ) -> EvalResult<EvaluationReport> {
        if records.len() != labels.len() {
            return Err(EvalError::Misaligned { records: records.len(), labels: labels.len() });
        }
        if self.batch_size == 0 {
            return Err(EvalError::InvalidBatchSize);
        }

        let mut predictions: Vec<Option<f32>> = Vec::with_capacity(records.len());
        let mut skipped_batches = Vec::new();

        for (batch_index, batch) in records.chunks(self.batch_size).enumerate() {
            match self.score_with_retry(scorer, batch, batch_index).await {
                Ok(batch_predictions) => {
                    predictions.extend(batch_predictions.into_iter().map(Some));
                }
                Err(EvalError::BatchFailed { batch_index, source })
                    if self.failure_policy == FailurePolicy::SkipExhausted
                        && source.is_transient() =>
                {
                    warn!(
                        batch_index,
                        error = %source,
                        "batch exhausted retries; excluding its records from the error rate"
                    );
                    skipped_batches.push(batch_index);
                    predictions.extend(std::iter::repeat(None).take(batch.len()));
                }
                Err(err) => return Err(err),
            }
        }

        // One prediction slot per record, batch boundaries notwithstanding.
        debug_assert_eq!(predictions.len(), records.len());

        let mut confusion = ConfusionMatrix::new();
        let mut evaluated = 0usize;
        let mut mismatches = 0u64;
        for (prediction, &actual) in predictions.iter().zip(labels) {
            let Some(value) = prediction else { continue };
            let predicted = class_of(*value)?;
            confusion.record(predicted, actual);
            evaluated += 1;
            if predicted != actual {
                mismatches += 1;
            }
        }

        let error_rate =
            if evaluated == 0 { 0.0 } else { mismatches as f64 / evaluated as f64 };

        Ok(EvaluationReport {
            total: records.len(),
            evaluated,
            mismatches,
            error_rate,
            skipped_batches,
            confusion,
        })
    }

    async fn score_with_retry(
        &self,
        scorer: &dyn Scorer,
        batch: &[String],
        batch_index: usize,
    ) -> EvalResult<Vec<f32>> {
        let mut attempt = 0;
        loop {
            match scorer.score(batch).await {
                Ok(batch_predictions) => return Ok(batch_predictions),
                Err(source) => {
                    if !source.is_transient() || attempt >= self.retry_policy.max_retries {
                        return Err(EvalError::BatchFailed { batch_index, source });
                    }
                    let delay = self.retry_policy.calculate_delay(attempt);
                    debug!(
                        batch_index,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying batch after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Map a numeric prediction to a class label, tolerating backends that
/// answer `7.0` for class 7.
fn class_of(value: f32) -> EvalResult<u8> {
    if !value.is_finite() {
        return Err(EvalError::InvalidClass { value });
    }
    let rounded = value.round();
    if rounded < 0.0 || rounded >= NUM_CLASSES as f32 {
        return Err(EvalError::InvalidClass { value });
    }
    Ok(rounded as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kiln_backend::ScoringError;
    use kiln_core::BackendError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scores each record as its own label, so every prediction is
    /// correct; counts calls.
    struct EchoScorer {
        calls: AtomicUsize,
    }

    impl EchoScorer {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Scorer for EchoScorer {
        async fn score(&self, records: &[String]) -> Result<Vec<f32>, ScoringError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(records
                .iter()
                .map(|record| {
                    record.split_whitespace().next().unwrap().parse::<f32>().unwrap()
                })
                .collect())
        }
    }

    /// Fails with transient errors until `failures` are consumed.
    struct FlakyScorer {
        failures: Mutex<u32>,
        inner: EchoScorer,
    }

    #[async_trait]
    impl Scorer for FlakyScorer {
        async fn score(&self, records: &[String]) -> Result<Vec<f32>, ScoringError> {
            {
                let mut failures = self.failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(ScoringError::Backend(BackendError::transient("endpoint warming up")));
                }
            }
            self.inner.score(records).await
        }
    }

    fn records_with_labels(labels: &[u8]) -> Vec<String> {
        labels.iter().map(|label| format!("{label} 1:0.5 2:1")).collect()
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1), Duration::from_millis(5), 2.0)
    }

    #[tokio::test]
    async fn test_batch_count_is_ceil_of_len_over_batch_size() {
        let labels: Vec<u8> = (0..25).map(|i| (i % 10) as u8).collect();
        let scorer = EchoScorer::new();

        let report =
            Evaluator::new(10).run(&scorer, &records_with_labels(&labels), &labels).await.unwrap();

        assert_eq!(scorer.calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.total, 25);
        assert_eq!(report.evaluated, 25);
        assert_eq!(report.error_rate, 0.0);
        assert_eq!(report.confusion.total(), 25);
    }

    #[tokio::test]
    async fn test_error_rate_counts_mismatches() {
        struct OffByOneScorer;

        #[async_trait]
        impl Scorer for OffByOneScorer {
            async fn score(&self, records: &[String]) -> Result<Vec<f32>, ScoringError> {
                Ok(records
                    .iter()
                    .map(|record| {
                        let label: u8 =
                            record.split_whitespace().next().unwrap().parse().unwrap();
                        // Misclassify 9s as 0s, everything else correctly.
                        if label == 9 { 0.0 } else { f32::from(label) }
                    })
                    .collect())
            }
        }

        let labels: Vec<u8> = (0..10).map(|i| i as u8).collect();
        let report = Evaluator::new(4)
            .run(&OffByOneScorer, &records_with_labels(&labels), &labels)
            .await
            .unwrap();

        assert_eq!(report.mismatches, 1);
        assert!((report.error_rate - 0.1).abs() < 1e-9);
        assert_eq!(report.confusion.count(0, 9), 1);
        assert_eq!(report.confusion.count(9, 9), 0);
        assert_eq!(report.confusion.correct(), 9);
    }

    #[tokio::test]
    async fn test_misaligned_inputs_are_rejected() {
        let labels = vec![1u8, 2, 3];
        let records = records_with_labels(&[1, 2]);
        let err = Evaluator::new(10).run(&EchoScorer::new(), &records, &labels).await.unwrap_err();
        assert!(matches!(err, EvalError::Misaligned { records: 2, labels: 3 }));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let labels: Vec<u8> = vec![4, 5, 6];
        let scorer = FlakyScorer { failures: Mutex::new(2), inner: EchoScorer::new() };

        let report = Evaluator::new(10)
            .with_retry_policy(fast_policy(3))
            .run(&scorer, &records_with_labels(&labels), &labels)
            .await
            .unwrap();

        assert_eq!(report.evaluated, 3);
        assert_eq!(report.error_rate, 0.0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_abort_by_default() {
        let labels: Vec<u8> = vec![4, 5, 6];
        let scorer = FlakyScorer { failures: Mutex::new(10), inner: EchoScorer::new() };

        let err = Evaluator::new(10)
            .with_retry_policy(fast_policy(1))
            .run(&scorer, &records_with_labels(&labels), &labels)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::BatchFailed { batch_index: 0, .. }));
    }

    #[tokio::test]
    async fn test_skip_policy_excludes_failed_batch_from_denominator() {
        let labels: Vec<u8> = (0..6).map(|i| i as u8).collect();
        // First batch fails all attempts, later batches succeed.
        let scorer = FlakyScorer { failures: Mutex::new(2), inner: EchoScorer::new() };

        let report = Evaluator::new(3)
            .with_retry_policy(fast_policy(1))
            .with_failure_policy(FailurePolicy::SkipExhausted)
            .run(&scorer, &records_with_labels(&labels), &labels)
            .await
            .unwrap();

        assert_eq!(report.total, 6);
        assert_eq!(report.evaluated, 3);
        assert_eq!(report.skipped_batches, vec![0]);
        assert_eq!(report.error_rate, 0.0);
        assert_eq!(report.confusion.total(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failures_abort_even_under_skip_policy() {
        struct BrokenScorer;

        #[async_trait]
        impl Scorer for BrokenScorer {
            async fn score(&self, records: &[String]) -> Result<Vec<f32>, ScoringError> {
                Err(ScoringError::CountMismatch { expected: records.len(), got: 0 })
            }
        }

        let labels = vec![1u8];
        let err = Evaluator::new(1)
            .with_failure_policy(FailurePolicy::SkipExhausted)
            .run(&BrokenScorer, &records_with_labels(&labels), &labels)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::BatchFailed { source: ScoringError::CountMismatch { .. }, .. }
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_prediction_is_rejected() {
        struct WildScorer;

        #[async_trait]
        impl Scorer for WildScorer {
            async fn score(&self, records: &[String]) -> Result<Vec<f32>, ScoringError> {
                Ok(vec![42.0; records.len()])
            }
        }

        let labels = vec![1u8];
        let err = Evaluator::new(1)
            .run(&WildScorer, &records_with_labels(&labels), &labels)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidClass { .. }));
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let labels = vec![1u8];
        let err = Evaluator::new(0)
            .run(&EchoScorer::new(), &records_with_labels(&labels), &labels)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidBatchSize));
    }
}
