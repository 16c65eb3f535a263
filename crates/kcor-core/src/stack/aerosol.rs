use ndarray::{Array4, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_GAIN, DEFAULT_NOISE_SCALE, DEFAULT_RETENTION, PARALLEL_PIXEL_THRESHOLD,
    THRESHOLD_ROUNDING_TOLERANCE,
};
use crate::error::{KcorError, Result};
use crate::frame::{CorrectedImage, FrameStack, Sample};

use super::temporal::{
    compute_mean_and_median, into_image, rounded_div, saturate_u32, TemporalStatistics,
};

/// Parameters of the Poisson-noise outlier rejection.
///
/// The acceptance half-width around the per-pixel median is
/// `noise_scale * sqrt(median * gain)`. This is the only noise formula used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AerosolFilterParams {
    /// Noise-scale constant K (default: 4/44).
    pub noise_scale: f64,
    /// Detector gain G in counts per unit signal (default: 44).
    pub gain: f64,
    /// Inlier fraction R that must be exceeded to use the filtered mean (default: 0.90).
    pub retention: f64,
    /// Return the per-pixel inlier count image for quality control.
    pub record_inlier_counts: bool,
}

impl Default for AerosolFilterParams {
    fn default() -> Self {
        Self {
            noise_scale: DEFAULT_NOISE_SCALE,
            gain: DEFAULT_GAIN,
            retention: DEFAULT_RETENTION,
            record_inlier_counts: false,
        }
    }
}

impl AerosolFilterParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.gain.is_finite() && self.gain > 0.0) {
            return Err(KcorError::Config(format!("gain must be positive, got {}", self.gain)));
        }
        if !(self.noise_scale.is_finite() && self.noise_scale >= 0.0) {
            return Err(KcorError::Config(format!(
                "noise_scale must be non-negative, got {}",
                self.noise_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.retention) {
            return Err(KcorError::Config(format!(
                "retention must be in [0, 1], got {}",
                self.retention
            )));
        }
        Ok(())
    }

    /// Acceptance half-width around a pixel median.
    #[inline]
    pub fn half_width(&self, median: u32) -> f64 {
        self.noise_scale * (f64::from(median) * self.gain).sqrt()
    }

    /// `ceil(numsum * retention)`. Products within rounding error of an
    /// integer are taken as that integer.
    pub fn threshold_count(&self, numsum: usize) -> usize {
        let raw = numsum as f64 * self.retention;
        let nearest = raw.round();
        if (raw - nearest).abs() < THRESHOLD_ROUNDING_TOLERANCE {
            nearest as usize
        } else {
            raw.ceil() as usize
        }
    }
}

/// Result of aerosol removal for one observation.
#[derive(Clone, Debug)]
pub struct AerosolFilterOutput {
    pub corrected: CorrectedImage,
    /// Inliers per (camera, state, row, col), when requested.
    pub inlier_counts: Option<Array4<u32>>,
    /// Pixels that kept the unfiltered mean.
    pub fallback_pixels: usize,
    /// Inlier count a pixel had to exceed to use its filtered mean.
    pub threshold_count: usize,
}

/// Compute temporal statistics, then remove aerosols.
pub fn aerosol_stack<T: Sample>(
    stack: &FrameStack<T>,
    params: &AerosolFilterParams,
) -> Result<AerosolFilterOutput> {
    let stats = compute_mean_and_median(stack)?;
    remove_aerosols(stack, &stats, params)
}

/// Per-pixel robust average resistant to brief bright contamination.
///
/// For each pixel, samples closer to the median than
/// [`AerosolFilterParams::half_width`] are inliers. If the inlier count
/// exceeds [`AerosolFilterParams::threshold_count`] the pixel is the rounded
/// mean of its inliers; otherwise it keeps the unfiltered mean from `stats`.
/// The fallback is the expected outcome where contamination is pervasive
/// (occulter edge, sustained bright events) and is not an error.
///
/// A single exposure yields the sample itself on either path. Integer
/// accumulation makes the output independent of thread count.
pub fn remove_aerosols<T: Sample>(
    stack: &FrameStack<T>,
    stats: &TemporalStatistics,
    params: &AerosolFilterParams,
) -> Result<AerosolFilterOutput> {
    params.validate()?;
    let numsum = stack.numsum();
    if numsum == 0 {
        return Err(KcorError::DegenerateSample { numsum });
    }
    let shape = stack.image_shape();
    if stats.mean.dim() != shape || stats.median.dim() != shape {
        return Err(KcorError::Shape(format!(
            "statistics shape {:?} does not match frame stack images {:?}",
            stats.median.dim(),
            shape
        )));
    }
    if numsum == 1 {
        debug!("Single exposure, aerosol filter reduces to the sample");
    }

    let (cameras, states, height, width) = shape;
    let rows = cameras * states * height;
    let threshold = params.threshold_count(numsum);
    let mut corrected = vec![0u32; rows * width];
    let mut counts = vec![0u32; rows * width];

    let fallback_pixels = if width == 0 {
        0
    } else {
        let samples = stack.as_slice();
        let mean = standard_slice(&stats.mean)?;
        let median = standard_slice(&stats.median)?;

        corrected
            .par_chunks_mut(width)
            .zip(counts.par_chunks_mut(width))
            .enumerate()
            .with_min_len((PARALLEL_PIXEL_THRESHOLD / width).max(1))
            .map_init(
                || RowScratch::new(width),
                |scratch, (row, (out_row, count_row))| {
                    let span = row * width..(row + 1) * width;
                    filter_row(
                        scratch,
                        samples,
                        RowContext {
                            row,
                            rows,
                            numsum,
                            threshold,
                            mean: &mean[span.clone()],
                            median: &median[span],
                        },
                        params,
                        out_row,
                        count_row,
                    )
                },
            )
            .sum::<usize>()
    };

    debug!(
        numsum,
        threshold,
        fallback_pixels,
        total_pixels = rows * width,
        "Aerosol filter finished"
    );

    Ok(AerosolFilterOutput {
        corrected: CorrectedImage::new(into_image(shape, corrected)?),
        inlier_counts: if params.record_inlier_counts {
            Some(into_image(shape, counts)?)
        } else {
            None
        },
        fallback_pixels,
        threshold_count: threshold,
    })
}

struct RowScratch {
    sums: Vec<u64>,
    half_widths: Vec<f64>,
}

impl RowScratch {
    fn new(width: usize) -> Self {
        Self {
            sums: vec![0; width],
            half_widths: vec![0.0; width],
        }
    }
}

struct RowContext<'a> {
    row: usize,
    rows: usize,
    numsum: usize,
    threshold: usize,
    mean: &'a [u32],
    median: &'a [u32],
}

/// Filter one pixel row of every (camera, state) image. Returns the number of
/// fallback pixels in the row.
fn filter_row<T: Sample>(
    scratch: &mut RowScratch,
    samples: &[T],
    ctx: RowContext<'_>,
    params: &AerosolFilterParams,
    out_row: &mut [u32],
    count_row: &mut [u32],
) -> usize {
    let width = out_row.len();
    for (hw, &m) in scratch.half_widths.iter_mut().zip(ctx.median) {
        *hw = params.half_width(m);
    }
    scratch.sums.fill(0);
    count_row.fill(0);

    // Exposure-major so every pass reads one contiguous row.
    for n in 0..ctx.numsum {
        let start = (n * ctx.rows + ctx.row) * width;
        let src = &samples[start..start + width];
        Zip::from(scratch.sums.as_mut_slice())
            .and(&mut *count_row)
            .and(src)
            .and(ctx.median)
            .and(scratch.half_widths.as_slice())
            .for_each(|sum, count, &x, &m, &hw| {
                let x: u64 = x.into();
                let inlier = (x.abs_diff(u64::from(m)) as f64) < hw;
                *sum += x * u64::from(inlier);
                *count += u32::from(inlier);
            });
    }

    let mut fallback = 0;
    for col in 0..width {
        let count = count_row[col];
        out_row[col] = if count as usize > ctx.threshold {
            saturate_u32(rounded_div(scratch.sums[col], u64::from(count)))
        } else {
            fallback += 1;
            ctx.mean[col]
        };
    }
    fallback
}

fn standard_slice(image: &Array4<u32>) -> Result<&[u32]> {
    image
        .as_slice()
        .ok_or_else(|| KcorError::Shape("statistics image is not contiguous".into()))
}
