//! Evaluation command: score a held-out shard against an endpoint.
//!
//! The shard is read back from object storage and re-parsed to recover
//! the ground-truth labels; the raw record text is what gets sent to the
//! endpoint, in fixed-size batches.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use kiln_backend::{EndpointHandle, ScoringClient};
use kiln_core::{BackendError, ObjectStore, PipelineConfig};
use kiln_dataset::{decode_records, shard_key};
use kiln_eval::{Evaluator, FailurePolicy};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    config: &PipelineConfig,
    endpoint: &str,
    shard: usize,
    batch_size: Option<usize>,
    limit: Option<usize>,
    skip_failed: bool,
    json_output: bool,
) -> Result<()> {
    let store = ObjectStore::new(&config.store);
    let key = shard_key(&config.store.prefix, "test", shard);
    let blob = match store.get(&key).await {
        Ok(blob) => blob,
        Err(BackendError::NotFound(key)) => {
            bail!("shard {key} not found in storage; upload it first with `kiln upload --partition test`");
        }
        Err(err) => {
            return Err(anyhow::Error::from(err).context("Failed to download the evaluation shard"));
        }
    };

    let text = String::from_utf8(blob).context("The evaluation shard is not valid UTF-8")?;
    let examples = decode_records(&text).context("Failed to parse the evaluation shard")?;
    let mut labels: Vec<u8> = examples.iter().map(|example| example.label).collect();
    let mut records: Vec<String> =
        text.lines().filter(|line| !line.trim().is_empty()).map(str::to_string).collect();

    if let Some(limit) = limit {
        records.truncate(limit);
        labels.truncate(limit);
    }

    let batch_size = batch_size.unwrap_or(config.scoring.batch_size);
    let scorer =
        ScoringClient::new(&config.scoring, &EndpointHandle { name: endpoint.to_string() });

    let mut evaluator = Evaluator::new(batch_size);
    if skip_failed {
        evaluator = evaluator.with_failure_policy(FailurePolicy::SkipExhausted);
    }

    let report = evaluator.run(&scorer, &records, &labels).await.context("Evaluation failed")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("{}", "Evaluation complete".bold().green());
    println!("  Shard:      {key}");
    println!("  Records:    {}", report.total);
    println!("  Evaluated:  {}", report.evaluated);
    println!("  Mismatches: {}", report.mismatches);
    println!("  Error rate: {}", format!("{:.2}%", report.error_rate * 100.0).cyan());
    if !report.skipped_batches.is_empty() {
        println!(
            "  {}",
            format!("Skipped batches (retries exhausted): {:?}", report.skipped_batches).yellow()
        );
    }
    println!();
    println!("{}", report.confusion.render());
    Ok(())
}
