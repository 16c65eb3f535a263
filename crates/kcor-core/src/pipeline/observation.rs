use std::time::Instant;

use tracing::{debug, info};

use crate::calibration::{linearize, LutSet};
use crate::consts::CORONA_STATE_COUNT;
use crate::error::Result;
use crate::frame::{CorrectedImage, Observation};
use crate::io::RawFrameReader;
use crate::output::assemble;
use crate::polarimetry::corona;
use crate::stack::{compute_mean_and_median, remove_aerosols};

use super::config::{StackMethod, StreamConfig};
use super::types::{ObservationOutput, PipelineStage, ProgressReporter};

/// Discover, read and linearize the stream files of one timestamp.
///
/// `numsum` comes from the observation's metadata when known.
pub fn load_observation(
    config: &StreamConfig,
    luts: &LutSet,
    timestamp: &str,
    numsum: Option<usize>,
    reporter: &dyn ProgressReporter,
) -> Result<Observation> {
    let reader = RawFrameReader::new(config.geometry);

    reporter.stage(timestamp, PipelineStage::Discovering);
    let files = reader.discover(&config.stream_root, timestamp, numsum)?;

    reporter.stage(timestamp, PipelineStage::Reading);
    let raw = reader.load(&files)?;
    info!(timestamp, numsum = raw.numsum(), "Read stream images");

    reporter.stage(timestamp, PipelineStage::Linearizing);
    let frames = linearize(&raw, luts)?;
    if let Some((min, max)) = frames.min_max() {
        debug!(timestamp, min, max, "Linearized frame range");
    }

    Ok(Observation {
        timestamp: timestamp.to_string(),
        camera_ids: config.luts.camera_ids.clone(),
        frames,
    })
}

/// Run the numeric stages on a loaded observation.
pub fn reduce_observation(
    observation: &Observation,
    config: &StreamConfig,
    reporter: &dyn ProgressReporter,
) -> Result<ObservationOutput> {
    let timestamp = observation.timestamp.as_str();
    let frames = &observation.frames;
    let start = Instant::now();

    reporter.stage(timestamp, PipelineStage::Statistics);
    let stats = compute_mean_and_median(frames)?;

    let (corrected, inlier_counts, fallback_pixels) = match config.stacking.method {
        StackMethod::AerosolFilter => {
            reporter.stage(timestamp, PipelineStage::Filtering);
            let filtered = remove_aerosols(frames, &stats, &config.filter)?;
            (
                filtered.corrected,
                filtered.inlier_counts,
                filtered.fallback_pixels,
            )
        }
        StackMethod::Mean => (CorrectedImage::new(stats.mean), None, 0),
        StackMethod::Median => (CorrectedImage::new(stats.median), None, 0),
    };
    let filter_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!(
        timestamp,
        method = %config.stacking.method,
        fallback_pixels,
        filter_ms,
        "Stacked exposures"
    );

    let corona = if corrected.states() == CORONA_STATE_COUNT {
        reporter.stage(timestamp, PipelineStage::Combining);
        Some(corona(&corrected)?)
    } else {
        debug!(timestamp, states = corrected.states(), "Skipping corona");
        None
    };

    reporter.stage(timestamp, PipelineStage::Assembling);
    let cameras = corrected.cameras();
    let cube = assemble(&corrected.into_camera_images(), cameras)?;

    Ok(ObservationOutput {
        timestamp: observation.timestamp.clone(),
        numsum: observation.numsum(),
        corona,
        cube,
        inlier_counts,
        fallback_pixels,
        filter_ms,
    })
}

/// Load and reduce one timestamp.
pub fn process_observation(
    config: &StreamConfig,
    luts: &LutSet,
    timestamp: &str,
    numsum: Option<usize>,
    reporter: &dyn ProgressReporter,
) -> Result<ObservationOutput> {
    let observation = load_observation(config, luts, timestamp, numsum, reporter)?;
    reduce_observation(&observation, config, reporter)
}
