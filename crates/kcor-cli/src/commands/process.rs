use anyhow::{Context, Result};
use clap::Args;
use kcor_core::io::cube_writer::{cube_path, write_cube};
use kcor_core::output::to_u16;
use kcor_core::pipeline::{process_observation, NoOpReporter};

use super::SourceArgs;
use crate::summary::{print_config_summary, print_observation_summary};

#[derive(Args)]
pub struct ProcessArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Observation timestamp (YYYYMMDD_HHMMSS)
    pub timestamp: String,

    /// Exposure count from the observation metadata; inferred from the files if omitted
    #[arg(long)]
    pub numsum: Option<usize>,

    /// Compute and report only, do not write the output cube
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &ProcessArgs) -> Result<()> {
    let config = args.source.load_config()?;
    let luts = args.source.load_luts(&config)?;
    print_config_summary(&config, 1);

    let output = process_observation(&config, &luts, &args.timestamp, args.numsum, &NoOpReporter)
        .with_context(|| format!("Failed to process {}", args.timestamp))?;
    print_observation_summary(&output);

    if !args.dry_run {
        std::fs::create_dir_all(&config.output_root).with_context(|| {
            format!("Failed to create {}", config.output_root.display())
        })?;
        let path = cube_path(&config.output_root, &args.timestamp);
        let (cube, _) = to_u16(&output.cube);
        write_cube(&path, &cube)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Output saved to {}", path.display());
    }

    Ok(())
}
