use crate::error::{DatasetError, DatasetResult};
use serde::{Deserialize, Serialize};

/// Number of features per example (28x28 pixel intensities).
pub const FEATURE_DIM: usize = 784;

/// Number of target classes (digits 0-9).
pub const NUM_CLASSES: usize = 10;

/// A single labeled example: a digit class paired with a fixed-length
/// feature vector. Feature order is positionally significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Class label, 0..=9.
    pub label: u8,
    /// Pixel intensities, exactly `FEATURE_DIM` values.
    pub features: Vec<f32>,
}

impl Example {
    /// Create a new example after checking label and dimension.
    pub fn new(label: u8, features: Vec<f32>) -> DatasetResult<Self> {
        let example = Self { label, features };
        example.validate()?;
        Ok(example)
    }

    /// Check that the label is a known class and the vector has the
    /// expected dimension.
    pub fn validate(&self) -> DatasetResult<()> {
        if usize::from(self.label) >= NUM_CLASSES {
            return Err(DatasetError::Idx(format!(
                "label {} out of range 0..={}",
                self.label,
                NUM_CLASSES - 1
            )));
        }
        if self.features.len() != FEATURE_DIM {
            return Err(DatasetError::Idx(format!(
                "feature vector has {} values, expected {FEATURE_DIM}",
                self.features.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_label() {
        assert!(Example::new(10, vec![0.0; FEATURE_DIM]).is_err());
    }

    #[test]
    fn test_new_rejects_wrong_dimension() {
        assert!(Example::new(3, vec![0.0; 10]).is_err());
    }

    #[test]
    fn test_new_accepts_valid_example() {
        let example = Example::new(9, vec![0.0; FEATURE_DIM]).unwrap();
        assert_eq!(example.label, 9);
        assert_eq!(example.features.len(), FEATURE_DIM);
    }
}
