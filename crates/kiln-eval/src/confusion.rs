//! Confusion matrix over the digit classes.

use kiln_dataset::NUM_CLASSES;
use serde::{Deserialize, Serialize};

/// A 10x10 count table indexed by `[predicted][actual]`, incremented once
/// per aligned prediction/label pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    cells: [[u64; NUM_CLASSES]; NUM_CLASSES],
}

impl ConfusionMatrix {
    /// Create an empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one prediction/label pair. Both values must be valid class
    /// labels; the evaluator checks ranges before recording.
    pub fn record(&mut self, predicted: u8, actual: u8) {
        debug_assert!(usize::from(predicted) < NUM_CLASSES);
        debug_assert!(usize::from(actual) < NUM_CLASSES);
        self.cells[usize::from(predicted)][usize::from(actual)] += 1;
    }

    /// Count for one (predicted, actual) cell.
    #[must_use]
    pub fn count(&self, predicted: u8, actual: u8) -> u64 {
        self.cells[usize::from(predicted)][usize::from(actual)]
    }

    /// Sum of all cells: the number of evaluated pairs.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Correctly classified pairs (the diagonal).
    #[must_use]
    pub fn correct(&self) -> u64 {
        (0..NUM_CLASSES).map(|class| self.cells[class][class]).sum()
    }

    /// Render the matrix as an aligned text table, rows = predicted,
    /// columns = actual.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("predicted \\ actual");
        for actual in 0..NUM_CLASSES {
            out.push_str(&format!("{actual:>7}"));
        }
        out.push('\n');
        for predicted in 0..NUM_CLASSES {
            out.push_str(&format!("{predicted:<18}"));
            for actual in 0..NUM_CLASSES {
                out.push_str(&format!("{:>7}", self.cells[predicted][actual]));
            }
            out.push('\n');
        }
        out
    }
}
