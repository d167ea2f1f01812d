//! Kiln Dataset
//!
//! Dataset primitives for the kiln pipeline:
//! - Labeled feature-vector examples (`Example`)
//! - The sparse-line text codec (`encode_example` / `decode_records`)
//! - Partition sharding and shard upload (`ShardPlan`, `upload_partition`)
//! - Fetching and parsing the handwritten-digit dataset (`DatasetFetcher`)

pub mod error;
pub mod example;
pub mod fetch;
pub mod idx;
pub mod shard;
pub mod sparse;

pub use error::{DatasetError, DatasetResult};
pub use example::{Example, FEATURE_DIM, NUM_CLASSES};
pub use fetch::{DatasetFetcher, Partition};
pub use shard::{shard_key, upload_partition, ShardPlan};
pub use sparse::{decode_example, decode_records, encode_example, encode_records};
