//! IDX file parsing.
//!
//! The dataset ships as big-endian IDX files: a magic number, a count, and
//! (for images) row/column dimensions, followed by raw unsigned bytes.

use crate::error::{DatasetError, DatasetResult};
use crate::example::{Example, FEATURE_DIM};

const IMAGE_MAGIC: u32 = 0x0000_0803;
const LABEL_MAGIC: u32 = 0x0000_0801;

fn read_be_u32(bytes: &[u8], offset: usize) -> DatasetResult<u32> {
    let slice = bytes
        .get(offset..offset + 4)
        .ok_or_else(|| DatasetError::Idx(format!("truncated header at offset {offset}")))?;
    Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Parse an IDX image file into per-image feature vectors.
///
/// Pixel bytes are kept as raw intensities (0..=255) widened to f32.
pub fn parse_images(bytes: &[u8]) -> DatasetResult<Vec<Vec<f32>>> {
    let magic = read_be_u32(bytes, 0)?;
    if magic != IMAGE_MAGIC {
        return Err(DatasetError::Idx(format!("bad image magic {magic:#010x}")));
    }
    let count = read_be_u32(bytes, 4)? as usize;
    let rows = read_be_u32(bytes, 8)? as usize;
    let cols = read_be_u32(bytes, 12)? as usize;
    if rows * cols != FEATURE_DIM {
        return Err(DatasetError::Idx(format!(
            "unexpected image dimensions {rows}x{cols}, expected {FEATURE_DIM} pixels"
        )));
    }

    let data = &bytes[16.min(bytes.len())..];
    if data.len() != count * FEATURE_DIM {
        return Err(DatasetError::Idx(format!(
            "image payload has {} bytes, expected {}",
            data.len(),
            count * FEATURE_DIM
        )));
    }

    Ok(data.chunks(FEATURE_DIM).map(|chunk| chunk.iter().map(|&b| f32::from(b)).collect()).collect())
}

/// Parse an IDX label file into class labels.
pub fn parse_labels(bytes: &[u8]) -> DatasetResult<Vec<u8>> {
    let magic = read_be_u32(bytes, 0)?;
    if magic != LABEL_MAGIC {
        return Err(DatasetError::Idx(format!("bad label magic {magic:#010x}")));
    }
    let count = read_be_u32(bytes, 4)? as usize;

    let data = &bytes[8.min(bytes.len())..];
    if data.len() != count {
        return Err(DatasetError::Idx(format!(
            "label payload has {} bytes, expected {count}",
            data.len()
        )));
    }

    Ok(data.to_vec())
}

/// Pair image vectors with their labels, preserving file order.
pub fn zip_examples(images: Vec<Vec<f32>>, labels: Vec<u8>) -> DatasetResult<Vec<Example>> {
    if images.len() != labels.len() {
        return Err(DatasetError::Idx(format!(
            "{} images but {} labels",
            images.len(),
            labels.len()
        )));
    }
    images
        .into_iter()
        .zip(labels)
        .map(|(features, label)| Example::new(label, features))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn image_bytes(images: &[[u8; FEATURE_DIM]]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&IMAGE_MAGIC.to_be_bytes());
        bytes.extend_from_slice(&(images.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&28u32.to_be_bytes());
        bytes.extend_from_slice(&28u32.to_be_bytes());
        for image in images {
            bytes.extend_from_slice(image);
        }
        bytes
    }

    pub(crate) fn label_bytes(labels: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    #[test]
    fn test_parse_roundtrip() {
        let mut image = [0u8; FEATURE_DIM];
        image[0] = 255;
        image[783] = 7;

        let images = parse_images(&image_bytes(&[image])).unwrap();
        let labels = parse_labels(&label_bytes(&[4])).unwrap();
        let examples = zip_examples(images, labels).unwrap();

        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].label, 4);
        assert_eq!(examples[0].features[0], 255.0);
        assert_eq!(examples[0].features[783], 7.0);
    }

    #[test]
    fn test_parse_images_rejects_bad_magic() {
        let mut bytes = image_bytes(&[[0u8; FEATURE_DIM]]);
        bytes[3] = 0x99;
        assert!(matches!(parse_images(&bytes).unwrap_err(), DatasetError::Idx(_)));
    }

    #[test]
    fn test_parse_images_rejects_truncated_payload() {
        let mut bytes = image_bytes(&[[0u8; FEATURE_DIM]]);
        bytes.truncate(bytes.len() - 1);
        assert!(parse_images(&bytes).is_err());
    }

    #[test]
    fn test_zip_rejects_count_mismatch() {
        let images = parse_images(&image_bytes(&[[0u8; FEATURE_DIM]])).unwrap();
        let labels = parse_labels(&label_bytes(&[1, 2])).unwrap();
        assert!(zip_examples(images, labels).is_err());
    }
}
