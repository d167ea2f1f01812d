//! Kiln CLI - train and serve a digit classifier on a managed ML backend
//!
//! The `kiln` command drives the pipeline end to end: fetch the dataset,
//! upload encoded shards to object storage, run the training job pair,
//! deploy the resulting model behind a serving endpoint, and evaluate it.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{deploy, evaluate, fetch, status, teardown, train, upload};

/// Kiln - managed-ML training and serving pipeline
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    author,
    version,
    about = "Kiln - train and serve a digit classifier on a managed ML backend",
    long_about = "Kiln drives a managed machine-learning backend end to end:\nencode and upload dataset shards, submit training jobs, host the trained\nmodel, and evaluate the served endpoint."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Path to the pipeline config file (defaults to ./kiln.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the dataset and report partition sizes
    ///
    /// Files are cached locally; repeated fetches read the cache.
    Fetch {
        /// Output sizes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode a partition and upload its shards to object storage
    ///
    /// The partition is split into equal-sized shards by integer
    /// division; any remainder examples are reported and not uploaded.
    Upload {
        /// Partition to upload (train, validation, test)
        #[arg(long, default_value = "train")]
        partition: String,

        /// Number of shards to produce
        #[arg(long, default_value_t = 10)]
        shards: usize,
    },

    /// Submit the single-instance and distributed training jobs
    ///
    /// Both jobs run concurrently on the service; one is followed to a
    /// terminal state, the other can be checked later with `kiln status`.
    Train {
        /// Instance count for the distributed job
        #[arg(long, default_value_t = 2)]
        instances: u32,

        /// Which job to follow to completion (single, distributed)
        #[arg(long, default_value = "single")]
        follow: String,

        /// Output the terminal state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the status of a submitted training job
    Status {
        /// Job name returned by `kiln train`
        job: String,

        /// Output the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a completed job's model and provision a serving endpoint
    Deploy {
        /// Job name returned by `kiln train`
        job: String,

        /// Name to register the model under
        #[arg(long, default_value = "digits-classifier")]
        model_name: String,
    },

    /// Score a held-out test shard against an endpoint and report accuracy
    ///
    /// The shard is read back from object storage and re-parsed to
    /// recover the ground-truth labels.
    Evaluate {
        /// Endpoint name returned by `kiln deploy`
        endpoint: String,

        /// Test shard index to evaluate
        #[arg(long, default_value_t = 0)]
        shard: usize,

        /// Records per invocation (defaults to the config value)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Cap on evaluated records (default: the whole shard)
        #[arg(long)]
        limit: Option<usize>,

        /// Keep going when a batch exhausts its retries, excluding its
        /// records from the error rate
        #[arg(long)]
        skip_failed: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a serving endpoint
    Teardown {
        /// Endpoint name to delete
        endpoint: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = config::load_config(args.config.as_deref())?;

    match args.command {
        Command::Fetch { json } => fetch::execute(&config, json).await?,
        Command::Upload { partition, shards } => {
            upload::execute(&config, &partition, shards).await?;
        }
        Command::Train { instances, follow, json } => {
            train::execute(&config, instances, &follow, json).await?;
        }
        Command::Status { job, json } => status::execute(&config, &job, json).await?,
        Command::Deploy { job, model_name } => deploy::execute(&config, &job, &model_name).await?,
        Command::Evaluate { endpoint, shard, batch_size, limit, skip_failed, json } => {
            evaluate::execute(&config, &endpoint, shard, batch_size, limit, skip_failed, json)
                .await?;
        }
        Command::Teardown { endpoint } => teardown::execute(&config, &endpoint).await?,
    }

    Ok(())
}
