use std::fs;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::calibration::LutSet;
use crate::error::{KcorError, Result};
use crate::io::cube_writer::{cube_path, write_cube, write_removed_list};
use crate::output::to_u16;

use super::config::StreamConfig;
use super::observation::process_observation;
use super::types::{BatchSummary, PipelineStage, ProgressReporter};

enum Outcome {
    Written(String),
    Skipped,
    Failed(KcorError),
}

/// Process every timestamp on a bounded worker pool and write one corrected
/// cube per observation into `config.output_root`.
///
/// Observations are independent: a failure is recorded in the summary and
/// does not stop the others. Complete existing outputs are skipped unless
/// `results.overwrite` is set; outputs of the wrong size are rebuilt.
pub fn run_batch(
    config: &StreamConfig,
    luts: &LutSet,
    timestamps: &[String],
    reporter: &dyn ProgressReporter,
) -> Result<BatchSummary> {
    config.validate()?;
    fs::create_dir_all(&config.output_root)?;

    let threads = config
        .cores
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| KcorError::Config(format!("worker pool: {e}")))?;

    info!(
        observations = timestamps.len(),
        threads,
        method = %config.stacking.method,
        "Starting batch"
    );
    reporter.begin_batch(timestamps.len());

    let outcomes: Vec<(String, Outcome)> = pool.install(|| {
        timestamps
            .par_iter()
            .map(|timestamp| {
                let outcome = process_and_write(config, luts, timestamp, reporter);
                let ok = !matches!(outcome, Outcome::Failed(_));
                reporter.finish_observation(timestamp, ok);
                (timestamp.clone(), outcome)
            })
            .collect()
    });

    let mut summary = BatchSummary::default();
    for (timestamp, outcome) in outcomes {
        match outcome {
            Outcome::Written(name) => summary.written.push(name),
            Outcome::Skipped => summary.skipped.push(timestamp),
            Outcome::Failed(err) => summary.failed.push((timestamp, err)),
        }
    }

    if config.results.write_removed_list {
        let path = write_removed_list(&config.output_root, &summary.written)?;
        info!(path = %path.display(), entries = summary.written.len(), "Wrote removed list");
    }
    reporter.finish_batch();

    info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "Batch finished"
    );
    Ok(summary)
}

fn process_and_write(
    config: &StreamConfig,
    luts: &LutSet,
    timestamp: &str,
    reporter: &dyn ProgressReporter,
) -> Outcome {
    let path = cube_path(&config.output_root, timestamp);
    if !config.results.overwrite {
        if let Ok(meta) = fs::metadata(&path) {
            let expected = config.geometry.cube_byte_len();
            if meta.len() == expected as u64 {
                info!(timestamp, "Output exists, skipping");
                return Outcome::Skipped;
            }
            warn!(
                timestamp,
                found = meta.len(),
                expected,
                "Existing output is incomplete, rebuilding"
            );
        }
    }

    let result = process_observation(config, luts, timestamp, None, reporter).and_then(|output| {
        reporter.stage(timestamp, PipelineStage::Writing);
        let (cube, _) = to_u16(&output.cube);
        write_cube(&path, &cube)
    });

    match result {
        Ok(()) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Outcome::Written(name)
        }
        Err(err) => {
            warn!(timestamp, error = %err, "Observation failed");
            Outcome::Failed(err)
        }
    }
}
