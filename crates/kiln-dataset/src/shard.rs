//! Partition sharding and shard upload.
//!
//! A partition is split into a fixed number of equal-sized shards by
//! integer division; the `N mod K` remainder examples are not uploaded.
//! The truncation is part of the storage layout contract, so it is kept,
//! but it is explicit: the plan reports the dropped count and the uploader
//! warns when it is non-zero.

use crate::error::{DatasetError, DatasetResult};
use crate::example::Example;
use crate::sparse::encode_example;
use kiln_core::ObjectStore;
use tracing::{debug, warn};

/// How a partition of `total` examples maps onto `shard_count` storage
/// objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardPlan {
    /// Examples in the partition.
    pub total: usize,
    /// Number of shards produced.
    pub shard_count: usize,
    /// Examples per shard (`total / shard_count`).
    pub per_shard: usize,
    /// Remainder examples not covered by any shard (`total % shard_count`).
    pub dropped: usize,
}

impl ShardPlan {
    /// Compute the plan for a partition size and shard count.
    pub fn new(total: usize, shard_count: usize) -> DatasetResult<Self> {
        if shard_count == 0 {
            return Err(DatasetError::Shard("shard count must be >= 1".to_string()));
        }
        let per_shard = total / shard_count;
        if per_shard == 0 {
            return Err(DatasetError::Shard(format!(
                "partition of {total} examples cannot fill {shard_count} shards"
            )));
        }
        Ok(Self { total, shard_count, per_shard, dropped: total % shard_count })
    }

    /// Index range of the examples in shard `shard_index`.
    #[must_use]
    pub fn range(&self, shard_index: usize) -> std::ops::Range<usize> {
        let start = shard_index * self.per_shard;
        start..start + self.per_shard
    }

    /// Total examples covered by all shards (`shard_count * per_shard`).
    #[must_use]
    pub fn encoded_total(&self) -> usize {
        self.shard_count * self.per_shard
    }
}

/// Storage key for one shard: `<prefix>/<partition>/examples<shard-index>`.
#[must_use]
pub fn shard_key(prefix: &str, partition: &str, shard_index: usize) -> String {
    format!("{prefix}/{partition}/examples{shard_index}")
}

/// Encode and upload a partition shard by shard.
///
/// Each shard's text blob is built and uploaded before the next shard is
/// materialized, so peak memory is bounded by one shard, not the whole
/// partition.
pub async fn upload_partition(
    store: &ObjectStore,
    prefix: &str,
    partition: &str,
    examples: &[Example],
    shard_count: usize,
) -> DatasetResult<ShardPlan> {
    let plan = ShardPlan::new(examples.len(), shard_count)?;
    if plan.dropped > 0 {
        warn!(partition, dropped = plan.dropped, "sharding drops remainder examples");
    }

    for shard_index in 0..plan.shard_count {
        let mut blob = String::new();
        for example in &examples[plan.range(shard_index)] {
            if !blob.is_empty() {
                blob.push('\n');
            }
            blob.push_str(&encode_example(example));
        }

        let key = shard_key(prefix, partition, shard_index);
        debug!(key, examples = plan.per_shard, "uploading shard");
        store.put(&key, blob.into_bytes()).await?;
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_even_split() {
        let plan = ShardPlan::new(10, 5).unwrap();
        assert_eq!(plan.per_shard, 2);
        assert_eq!(plan.dropped, 0);
        assert_eq!(plan.encoded_total(), 10);
    }

    #[test]
    fn test_plan_drops_remainder() {
        let plan = ShardPlan::new(11, 5).unwrap();
        assert_eq!(plan.per_shard, 2);
        assert_eq!(plan.dropped, 1);
        assert_eq!(plan.encoded_total(), 10);
    }

    #[test]
    fn test_plan_ranges_are_contiguous_and_disjoint() {
        let plan = ShardPlan::new(11, 5).unwrap();
        let mut covered = Vec::new();
        for shard_index in 0..plan.shard_count {
            covered.extend(plan.range(shard_index));
        }
        assert_eq!(covered, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_plan_rejects_zero_shards() {
        assert!(ShardPlan::new(10, 0).is_err());
    }

    #[test]
    fn test_plan_rejects_undersized_partition() {
        assert!(ShardPlan::new(3, 5).is_err());
    }

    #[test]
    fn test_shard_key_layout() {
        assert_eq!(shard_key("digits", "train", 7), "digits/train/examples7");
    }
}
