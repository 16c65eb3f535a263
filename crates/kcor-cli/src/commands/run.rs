use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use kcor_core::io::discover_timestamps;
use kcor_core::pipeline::run_batch;
use tracing::warn;

use super::SourceArgs;
use crate::progress::BarReporter;
use crate::summary::{print_batch_summary, print_config_summary};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only process these timestamps (YYYYMMDD_HHMMSS)
    pub timestamps: Vec<String>,

    /// Number of observations processed concurrently
    #[arg(short, long)]
    pub cores: Option<usize>,

    /// Reprocess observations whose output already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Do not write removed.log
    #[arg(long)]
    pub no_removed_list: bool,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = args.source.load_config()?;
    if args.cores.is_some() {
        config.cores = args.cores;
    }
    if args.overwrite {
        config.results.overwrite = true;
    }
    if args.no_removed_list {
        config.results.write_removed_list = false;
    }

    let timestamps = if args.timestamps.is_empty() {
        discover_timestamps(&config.stream_root).with_context(|| {
            format!("Failed to list {}", config.stream_root.display())
        })?
    } else {
        args.timestamps.clone()
    };
    if timestamps.is_empty() {
        warn!(root = %config.stream_root.display(), "No stream observations found");
    }

    let luts = args.source.load_luts(&config)?;
    print_config_summary(&config, timestamps.len());

    let start = Instant::now();
    let reporter = BarReporter::new()?;
    let summary = run_batch(&config, &luts, &timestamps, &reporter)?;
    print_batch_summary(&summary);
    println!("Elapsed time: {:.1?}", start.elapsed());

    if !summary.failed.is_empty() {
        anyhow::bail!("{} observation(s) failed", summary.failed.len());
    }
    Ok(())
}
