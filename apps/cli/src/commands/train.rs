//! Training command: submit the single-instance and distributed job pair.
//!
//! The two descriptors share every parameter except instance count and
//! input distribution. Both submissions are issued up front; each job is
//! then polled by its own task, and the command blocks on the one the
//! user chose to follow.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use kiln_backend::{CompletedJob, TrainingClient, TrainingJobSpec};
use kiln_core::config::StoreConfig;
use kiln_core::PipelineConfig;
use serde_json::json;

pub async fn execute(
    config: &PipelineConfig,
    instances: u32,
    follow: &str,
    json_output: bool,
) -> Result<()> {
    if !matches!(follow, "single" | "distributed") {
        bail!("unknown job to follow: '{follow}' (expected single or distributed)");
    }
    if instances < 2 {
        bail!("the distributed job needs at least 2 instances");
    }

    let input_location = partition_location(&config.store, "train");
    let single = TrainingJobSpec::single_instance(
        "digits",
        input_location.clone(),
        config.training.output_location.clone(),
        config.training.instance_type.clone(),
    );
    let distributed = TrainingJobSpec::distributed(
        "digits-dist",
        input_location,
        config.training.output_location.clone(),
        config.training.instance_type.clone(),
        instances,
    );

    let client = TrainingClient::new(&config.training);
    let single_handle =
        client.submit(&single).await.context("Failed to submit the single-instance job")?;
    let dist_handle =
        client.submit(&distributed).await.context("Failed to submit the distributed job")?;

    // Both jobs run concurrently on the service; poll each from its own
    // task and block on the followed one.
    let single_task = {
        let client = client.clone();
        let handle = single_handle.clone();
        tokio::spawn(async move { client.wait(&handle).await })
    };
    let dist_task = {
        let client = client.clone();
        let handle = dist_handle.clone();
        tokio::spawn(async move { client.wait(&handle).await })
    };

    let (followed_task, other_task, other_name) = if follow == "single" {
        (single_task, dist_task, dist_handle.job_name.clone())
    } else {
        (dist_task, single_task, single_handle.job_name.clone())
    };

    let completed: CompletedJob = followed_task.await.context("status poll task panicked")??;
    other_task.abort();

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "completed_job": completed.job_name,
                "artifact_location": completed.artifact_location,
                "still_running": other_name,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("{}", "Training complete".bold().green());
    println!("  Job: {}", completed.job_name.cyan());
    println!("  Artifact: {}", completed.artifact_location);
    println!(
        "  {}",
        format!("{other_name} may still be running; check it with `kiln status {other_name}`")
            .dimmed()
    );
    println!();
    println!("  Next: {}", format!("kiln deploy {}", completed.job_name).dimmed());
    println!();
    Ok(())
}

/// Storage location of one encoded partition's shards.
fn partition_location(store: &StoreConfig, partition: &str) -> String {
    format!(
        "{}/{}/{}/{partition}",
        store.base_url.trim_end_matches('/'),
        store.bucket,
        store.prefix
    )
}
