//! Dataset fetch command.

use anyhow::{Context, Result};
use colored::Colorize;
use kiln_core::PipelineConfig;
use kiln_dataset::{DatasetFetcher, Partition};
use serde_json::json;

pub async fn execute(_config: &PipelineConfig, json_output: bool) -> Result<()> {
    let fetcher = DatasetFetcher::new().context("Failed to set up the dataset cache")?;

    let mut sizes = Vec::new();
    for partition in [Partition::Train, Partition::Validation, Partition::Test] {
        let examples = fetcher
            .load_partition(partition)
            .await
            .with_context(|| format!("Failed to load the {partition} partition"))?;
        sizes.push((partition, examples.len()));
    }

    if json_output {
        let out: Vec<_> = sizes
            .iter()
            .map(|(partition, len)| json!({"partition": partition.name(), "examples": len}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", "Dataset ready".bold().green());
    for (partition, len) in sizes {
        println!("  {:<12} {len} examples", partition.name());
    }
    println!();
    println!("  Next: {}", "kiln upload --partition train".dimmed());
    println!();
    Ok(())
}
