use ndarray::Array4;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{KcorError, Result};
use crate::frame::{FrameStack, Sample};

/// Per-pixel mean and median over the exposure axis, (camera, state, row, col).
#[derive(Clone, Debug, PartialEq)]
pub struct TemporalStatistics {
    pub mean: Array4<u32>,
    pub median: Array4<u32>,
}

/// Compute the per-pixel mean and median of every (camera, state) image.
///
/// Both are rounded to the nearest integer (halves round up). For an even
/// exposure count the median is the rounded average of the two central order
/// statistics. Sums are exact, so the result does not depend on scheduling.
pub fn compute_mean_and_median<T: Sample>(stack: &FrameStack<T>) -> Result<TemporalStatistics> {
    let numsum = stack.numsum();
    if numsum == 0 {
        return Err(KcorError::DegenerateSample { numsum });
    }

    let shape = stack.image_shape();
    let (cameras, states, height, width) = shape;
    let rows = cameras * states * height;
    let mut mean = vec![0u32; rows * width];
    let mut median = vec![0u32; rows * width];

    if width > 0 {
        let samples = stack.as_slice();
        mean.par_chunks_mut(width)
            .zip(median.par_chunks_mut(width))
            .enumerate()
            .with_min_len((PARALLEL_PIXEL_THRESHOLD / width).max(1))
            .for_each_init(
                || vec![0u64; width * numsum],
                |columns, (row, (mean_row, median_row))| {
                    gather_columns(samples, row, rows, width, numsum, columns);
                    for (col, values) in columns.chunks_exact_mut(numsum).enumerate() {
                        let sum: u64 = values.iter().sum();
                        mean_row[col] = saturate_u32(rounded_div(sum, numsum as u64));
                        median_row[col] = saturate_u32(median_of(values));
                    }
                },
            );
    }

    Ok(TemporalStatistics {
        mean: into_image(shape, mean)?,
        median: into_image(shape, median)?,
    })
}

/// Copy one pixel row of every exposure into `columns`, laid out so that each
/// pixel's samples are contiguous: `columns[col * numsum + n]`.
fn gather_columns<T: Sample>(
    samples: &[T],
    row: usize,
    rows: usize,
    width: usize,
    numsum: usize,
    columns: &mut [u64],
) {
    for n in 0..numsum {
        let start = (n * rows + row) * width;
        for (col, &x) in samples[start..start + width].iter().enumerate() {
            columns[col * numsum + n] = x.into();
        }
    }
}

/// Median via `select_nth_unstable`, O(n) without a full sort.
fn median_of(values: &mut [u64]) -> u64 {
    let n = values.len();
    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable(mid);
    let upper = *upper;
    if n.is_multiple_of(2) {
        let lower = lower.iter().copied().max().unwrap_or(upper);
        (lower + upper).div_ceil(2)
    } else {
        upper
    }
}

/// Integer division rounded to nearest, halves up.
#[inline]
pub(crate) fn rounded_div(sum: u64, count: u64) -> u64 {
    (sum + count / 2) / count
}

#[inline]
pub(crate) fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

pub(crate) fn into_image(
    shape: (usize, usize, usize, usize),
    data: Vec<u32>,
) -> Result<Array4<u32>> {
    Array4::from_shape_vec(shape, data).map_err(|e| KcorError::Shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_of_odd() {
        let mut v = vec![9, 1, 5];
        assert_eq!(median_of(&mut v), 5);
    }

    #[test]
    fn test_median_of_even_rounds_half_up() {
        // (3 + 4) / 2 = 3.5 -> 4
        let mut v = vec![10, 3, 4, 1];
        assert_eq!(median_of(&mut v), 4);
    }

    #[test]
    fn test_rounded_div() {
        assert_eq!(rounded_div(10, 4), 3); // 2.5 -> 3
        assert_eq!(rounded_div(9, 4), 2); // 2.25 -> 2
        assert_eq!(rounded_div(11, 4), 3); // 2.75 -> 3
    }
}
