//! Kiln Eval
//!
//! Batched evaluation of a deployed classifier:
//! - Contiguous batching with per-batch retry (`Evaluator`)
//! - Error rate and confusion matrix (`EvaluationReport`, `ConfusionMatrix`)

pub mod confusion;
pub mod error;
pub mod evaluator;
pub mod report;

pub use confusion::ConfusionMatrix;
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, FailurePolicy};
pub use report::EvaluationReport;
