//! Deployment command: model registration and endpoint provisioning.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use kiln_backend::{AlgorithmSpec, HostingClient, JobHandle, JobStatus, TrainingClient};
use kiln_core::PipelineConfig;

pub async fn execute(config: &PipelineConfig, job: &str, model_name: &str) -> Result<()> {
    let training = TrainingClient::new(&config.training);
    let status = training
        .status(&JobHandle { job_name: job.to_string() })
        .await
        .with_context(|| format!("Failed to fetch status for job {job}"))?;

    let artifact_location = match status {
        JobStatus::Completed { artifact_location } => artifact_location,
        other => bail!("job {job} has not completed ({other:?}); only completed jobs can be deployed"),
    };

    let hosting = HostingClient::new(&config.hosting);
    let model = hosting
        .register_model(model_name, &artifact_location, &AlgorithmSpec::default().image)
        .await
        .context("Failed to register the model")?;
    let endpoint = hosting.create_endpoint(&model).await.context("Failed to create the endpoint")?;

    println!("  Endpoint {} provisioning...", endpoint.name.cyan());
    hosting
        .wait_in_service(&endpoint)
        .await
        .context("The endpoint did not come into service")?;

    println!();
    println!("{}", "Deployment complete".bold().green());
    println!("  Model: {}", model.name);
    println!("  Endpoint: {}", endpoint.name.cyan());
    println!();
    println!("  Next: {}", format!("kiln evaluate {}", endpoint.name).dimmed());
    println!("  When finished: {}", format!("kiln teardown {}", endpoint.name).dimmed());
    println!();
    Ok(())
}
