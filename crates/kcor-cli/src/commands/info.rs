use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kcor_core::io::{discover_timestamps, RawFrameReader};
use kcor_core::pipeline::config::SensorGeometry;

#[derive(Args)]
pub struct InfoArgs {
    /// Directory holding the raw stream files
    pub stream_root: PathBuf,

    /// Only show this timestamp (YYYYMMDD_HHMMSS)
    #[arg(long)]
    pub timestamp: Option<String>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let geometry = SensorGeometry::default();
    let reader = RawFrameReader::new(geometry);

    let timestamps = match args.timestamp {
        Some(ref ts) => vec![ts.clone()],
        None => discover_timestamps(&args.stream_root)
            .with_context(|| format!("Failed to list {}", args.stream_root.display()))?,
    };

    println!("Stream dir:    {}", args.stream_root.display());
    println!("Observations:  {}", timestamps.len());
    println!();

    let file_mb = geometry.file_byte_len() as f64 / (1024.0 * 1024.0);
    for ts in &timestamps {
        match reader.discover(&args.stream_root, ts, None) {
            Ok(files) => {
                let per_camera = files.by_camera.first().map_or(0, Vec::len);
                let total_mb = file_mb * (per_camera * files.by_camera.len()) as f64;
                println!(
                    "{ts}  numsum={:<4} files/camera={:<4} {:.1} MB",
                    files.numsum, per_camera, total_mb
                );
            }
            Err(e) => println!("{ts}  error: {e}"),
        }
    }

    Ok(())
}
