//! Training job status command.

use anyhow::{Context, Result};
use colored::Colorize;
use kiln_backend::{JobHandle, JobStatus, TrainingClient};
use kiln_core::PipelineConfig;

pub async fn execute(config: &PipelineConfig, job: &str, json_output: bool) -> Result<()> {
    let client = TrainingClient::new(&config.training);
    let status = client
        .status(&JobHandle { job_name: job.to_string() })
        .await
        .with_context(|| format!("Failed to fetch status for job {job}"))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    match status {
        JobStatus::Submitted => println!("{job}: {}", "submitted".cyan()),
        JobStatus::Running => println!("{job}: {}", "running".cyan()),
        JobStatus::Completed { artifact_location } => {
            println!("{job}: {}", "completed".bold().green());
            println!("  Artifact: {artifact_location}");
            println!("  Next: {}", format!("kiln deploy {job}").dimmed());
        }
        JobStatus::Failed { reason } => {
            println!("{job}: {}", "failed".bold().red());
            println!("  Reason: {reason}");
        }
        JobStatus::Stopped => println!("{job}: {}", "stopped".yellow()),
    }
    Ok(())
}
