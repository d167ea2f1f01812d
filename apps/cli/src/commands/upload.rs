//! Shard upload command.

use anyhow::{Context, Result};
use colored::Colorize;
use kiln_core::{ObjectStore, PipelineConfig};
use kiln_dataset::{shard_key, upload_partition, DatasetFetcher, Partition};

pub async fn execute(config: &PipelineConfig, partition: &str, shards: usize) -> Result<()> {
    let partition: Partition = partition.parse().map_err(anyhow::Error::msg)?;

    let fetcher = DatasetFetcher::new().context("Failed to set up the dataset cache")?;
    let examples = fetcher
        .load_partition(partition)
        .await
        .with_context(|| format!("Failed to load the {partition} partition"))?;

    let store = ObjectStore::new(&config.store);
    let plan = upload_partition(&store, &config.store.prefix, partition.name(), &examples, shards)
        .await
        .context("Failed to upload shards")?;

    println!();
    println!(
        "{}",
        format!("Uploaded {} partition as {} shards", partition.name(), plan.shard_count)
            .bold()
            .green()
    );
    println!("  {:<12} {} examples per shard", "size", plan.per_shard);
    println!(
        "  {:<12} {} .. {}",
        "keys",
        shard_key(&config.store.prefix, partition.name(), 0),
        shard_key(&config.store.prefix, partition.name(), plan.shard_count - 1)
    );
    if plan.dropped > 0 {
        println!("  {}", format!("{} remainder example(s) not uploaded", plan.dropped).yellow());
    }
    println!();
    Ok(())
}
