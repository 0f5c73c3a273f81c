//! `gnsupd sync`: one directory pass, then exit.

use anyhow::{Context, Result};
use clap::Args;

use gnsupd_core::{BatchConfig, StoreConfig};
use gnsupd_sync::{
    engine,
    pipeline::{self, PassScope},
    ItemOutcome, PassReport,
};

/// Arguments for `gnsupd sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Print the objects that would be created, without contacting the store.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the pass report as JSON.
    #[arg(long, conflicts_with = "dry_run")]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = BatchConfig::from_env().context("failed to initialize")?;

        if self.dry_run {
            return print_candidates(&config);
        }

        let store = StoreConfig::from_env().context("failed to initialize")?;
        let report = pipeline::run(&PassScope::from(config), &store).context("sync failed")?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render report JSON")?
            );
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_candidates(config: &BatchConfig) -> Result<()> {
    let candidates = engine::candidates(&config.config_dir, config.extra_label.as_deref())
        .context("dry-run scan failed")?;
    if candidates.is_empty() {
        println!(
            "[dry-run] no *.json definitions in {}",
            config.config_dir.display()
        );
        return Ok(());
    }

    let mut objects = Vec::new();
    for (name, candidate) in candidates {
        match candidate {
            Ok(object) => objects.push(object),
            Err(err) => eprintln!("[dry-run] ✗ '{name}' skipped: {err}"),
        }
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&objects).context("failed to render candidates JSON")?
    );
    Ok(())
}

fn print_report(report: &PassReport) {
    if report.items.is_empty() {
        println!("nothing to do: no definitions found");
        return;
    }

    println!(
        "✓ pass finished ({} created, {} updated, {} failed) in {} ms",
        report.created(),
        report.updated(),
        report.failed(),
        report.duration_ms
    );
    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Created => println!("  +  {}", item.name),
            ItemOutcome::Updated => println!("  ~  {}", item.name),
            ItemOutcome::Failed { stage, error } => {
                println!("  ✗  {} ({stage}): {error}", item.name)
            }
        }
    }
}
