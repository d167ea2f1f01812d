//! Endpoint teardown command.

use anyhow::{Context, Result};
use colored::Colorize;
use kiln_backend::{EndpointHandle, HostingClient};
use kiln_core::PipelineConfig;

pub async fn execute(config: &PipelineConfig, endpoint: &str) -> Result<()> {
    let hosting = HostingClient::new(&config.hosting);
    hosting
        .delete_endpoint(&EndpointHandle { name: endpoint.to_string() })
        .await
        .with_context(|| format!("Failed to delete endpoint {endpoint}"))?;

    println!("{}", format!("Endpoint {endpoint} deleted").bold().green());
    Ok(())
}
