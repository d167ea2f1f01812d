//! The sparse-line text codec.
//!
//! One example per line: `<label> <index>:<value> <index>:<value> ...`,
//! feature positions 1-indexed, records newline-joined. The writer emits
//! every position 1..=784 including zeros, matching the storage layout the
//! training backend consumes; the reader also accepts records that omit
//! zero-valued positions.

use crate::error::{DatasetError, DatasetResult};
use crate::example::{Example, FEATURE_DIM, NUM_CLASSES};

/// Encode one example as a sparse-line record.
///
/// The encoding is lossless: `{}` formatting of f32 is shortest
/// round-trip, so integers print without a fraction and every value parses
/// back to the identical float.
#[must_use]
pub fn encode_example(example: &Example) -> String {
    // ~6 bytes per "idx:val" pair for typical pixel intensities
    let mut line = String::with_capacity(example.features.len() * 6 + 2);
    line.push_str(&example.label.to_string());
    for (position, value) in example.features.iter().enumerate() {
        line.push(' ');
        line.push_str(&(position + 1).to_string());
        line.push(':');
        line.push_str(&value.to_string());
    }
    line
}

/// Encode a sequence of examples as newline-joined records.
#[must_use]
pub fn encode_records(examples: &[Example]) -> String {
    let mut out = String::new();
    for example in examples {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&encode_example(example));
    }
    out
}

/// Decode one sparse-line record. `line_no` is the 1-based position used
/// in error reports.
pub fn decode_example(line: &str, line_no: usize) -> DatasetResult<Example> {
    let mut fields = line.split_whitespace();

    let label_field =
        fields.next().ok_or_else(|| DatasetError::format(line_no, "empty record"))?;
    let label: u8 = label_field
        .parse()
        .map_err(|_| DatasetError::format(line_no, format!("invalid label '{label_field}'")))?;
    if usize::from(label) >= NUM_CLASSES {
        return Err(DatasetError::format(
            line_no,
            format!("label {label} out of range 0..={}", NUM_CLASSES - 1),
        ));
    }

    let mut features = vec![0.0f32; FEATURE_DIM];
    for field in fields {
        let (index_part, value_part) = field.split_once(':').ok_or_else(|| {
            DatasetError::format(line_no, format!("expected index:value, got '{field}'"))
        })?;
        let index: usize = index_part.parse().map_err(|_| {
            DatasetError::format(line_no, format!("invalid feature index '{index_part}'"))
        })?;
        if index == 0 || index > FEATURE_DIM {
            return Err(DatasetError::format(
                line_no,
                format!("feature index {index} out of range 1..={FEATURE_DIM}"),
            ));
        }
        let value: f32 = value_part.parse().map_err(|_| {
            DatasetError::format(
                line_no,
                format!("invalid feature value '{value_part}' at index {index}"),
            )
        })?;
        features[index - 1] = value;
    }

    Ok(Example { label, features })
}

/// Decode newline-separated records, skipping blank lines. Errors carry
/// the 1-based line number of the offending record.
pub fn decode_records(text: &str) -> DatasetResult<Vec<Example>> {
    let mut examples = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        examples.push(decode_example(line, idx + 1)?);
    }
    Ok(examples)
}
