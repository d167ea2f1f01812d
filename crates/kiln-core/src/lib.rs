//! Kiln Core
//!
//! Shared building blocks for the kiln pipeline:
//! - Pipeline configuration (`PipelineConfig`)
//! - Backend error taxonomy (`BackendError`)
//! - Retry policies with exponential backoff (`RetryPolicy`)
//! - Object storage client (`ObjectStore`)

pub mod config;
pub mod error;
pub mod http;
pub mod retry;
pub mod store;

pub use config::{
    ConfigError, HostingConfig, PipelineConfig, ScoringConfig, StoreConfig, TrainingConfig,
};
pub use error::{BackendError, BackendResult};
pub use retry::RetryPolicy;
pub use store::ObjectStore;
