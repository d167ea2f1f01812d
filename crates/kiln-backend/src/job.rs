//! Training job descriptors.
//!
//! A job pair shares every parameter except instance count and input data
//! distribution: the single-instance job replicates the full dataset to
//! its one node, the distributed job gives each node a disjoint subset of
//! the shards.

use crate::error::{JobError, JobResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Algorithm selection for a training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmSpec {
    /// Container image of the managed algorithm.
    pub image: String,
}

impl Default for AlgorithmSpec {
    fn default() -> Self {
        Self { image: "linear-learner:latest".to_string() }
    }
}

/// Hyperparameters for the multiclass linear classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Input feature dimension.
    pub feature_dim: u32,
    /// Number of target classes.
    pub num_classes: u32,
    /// Kind of predictor trained.
    pub predictor_type: String,
    /// Mini-batch size used by the algorithm.
    pub mini_batch_size: u32,
    /// Passes over the training data.
    pub epochs: u32,
}

impl Default for HyperParams {
    fn default() -> Self {
        Self {
            feature_dim: 784,
            num_classes: 10,
            predictor_type: "multiclass_classifier".to_string(),
            mini_batch_size: 100,
            epochs: 2,
        }
    }
}

impl HyperParams {
    pub fn validate(&self) -> JobResult<()> {
        if self.feature_dim == 0 {
            return Err(JobError::InvalidSpec("feature_dim must be >= 1".to_string()));
        }
        if self.num_classes < 2 {
            return Err(JobError::InvalidSpec("num_classes must be >= 2".to_string()));
        }
        if self.predictor_type.trim().is_empty() {
            return Err(JobError::InvalidSpec("predictor_type is required".to_string()));
        }
        if self.mini_batch_size == 0 {
            return Err(JobError::InvalidSpec("mini_batch_size must be >= 1".to_string()));
        }
        if self.epochs == 0 {
            return Err(JobError::InvalidSpec("epochs must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// How input data is spread across training instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataDistribution {
    /// Every instance reads the full input.
    FullyReplicated,
    /// Each instance reads a disjoint subset of the shards.
    ShardedByKey,
}

/// One input channel of a training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Channel name (the algorithm's input name, e.g. "train").
    pub name: String,
    /// Storage location of the channel data.
    pub location: String,
    /// Distribution mode across instances.
    pub distribution: DataDistribution,
}

/// Compute resources for a training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Instance type the job runs on.
    pub instance_type: String,
    /// Number of instances.
    pub instance_count: u32,
}

/// Stopping condition passed to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppingSpec {
    /// Maximum wall-clock runtime the service allows the job.
    pub max_runtime_secs: u64,
}

impl Default for StoppingSpec {
    fn default() -> Self {
        Self { max_runtime_secs: 60 * 60 }
    }
}

/// Full descriptor of a training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingJobSpec {
    /// Client-generated job name, unique per submission.
    pub job_name: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Algorithm selection.
    pub algorithm: AlgorithmSpec,
    /// Algorithm hyperparameters.
    pub hyperparams: HyperParams,
    /// Compute resources.
    pub resources: ResourceSpec,
    /// Stopping condition.
    pub stopping: StoppingSpec,
    /// Training input channel.
    pub input: ChannelSpec,
    /// Storage location the service writes the model artifact to.
    pub output_location: String,
}

impl TrainingJobSpec {
    fn new_with(
        name_prefix: &str,
        input_location: String,
        output_location: String,
        instance_type: String,
        instance_count: u32,
        distribution: DataDistribution,
    ) -> Self {
        Self {
            job_name: format!("{name_prefix}-{}", Uuid::new_v4()),
            created_at: Utc::now(),
            algorithm: AlgorithmSpec::default(),
            hyperparams: HyperParams::default(),
            resources: ResourceSpec { instance_type, instance_count },
            stopping: StoppingSpec::default(),
            input: ChannelSpec { name: "train".to_string(), location: input_location, distribution },
            output_location,
        }
    }

    /// A single-instance job reading the fully replicated input.
    #[must_use]
    pub fn single_instance(
        name_prefix: &str,
        input_location: String,
        output_location: String,
        instance_type: String,
    ) -> Self {
        Self::new_with(
            name_prefix,
            input_location,
            output_location,
            instance_type,
            1,
            DataDistribution::FullyReplicated,
        )
    }

    /// A multi-instance job with shards spread across instances.
    #[must_use]
    pub fn distributed(
        name_prefix: &str,
        input_location: String,
        output_location: String,
        instance_type: String,
        instance_count: u32,
    ) -> Self {
        Self::new_with(
            name_prefix,
            input_location,
            output_location,
            instance_type,
            instance_count,
            DataDistribution::ShardedByKey,
        )
    }

    pub fn validate(&self) -> JobResult<()> {
        if self.job_name.trim().is_empty() {
            return Err(JobError::InvalidSpec("job_name is required".to_string()));
        }
        if self.algorithm.image.trim().is_empty() {
            return Err(JobError::InvalidSpec("algorithm.image is required".to_string()));
        }
        if self.resources.instance_count == 0 {
            return Err(JobError::InvalidSpec("instance_count must be >= 1".to_string()));
        }
        if self.resources.instance_count > 1
            && self.input.distribution == DataDistribution::FullyReplicated
        {
            return Err(JobError::InvalidSpec(
                "multi-instance jobs must shard their input".to_string(),
            ));
        }
        if self.stopping.max_runtime_secs == 0 {
            return Err(JobError::InvalidSpec("max_runtime_secs must be >= 1".to_string()));
        }
        if self.input.location.trim().is_empty() {
            return Err(JobError::InvalidSpec("input.location is required".to_string()));
        }
        if self.output_location.trim().is_empty() {
            return Err(JobError::InvalidSpec("output_location is required".to_string()));
        }
        self.hyperparams.validate()?;
        Ok(())
    }
}
