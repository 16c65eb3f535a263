use ndarray::Array5;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{KcorError, Result};
use crate::frame::{LinearFrameStack, RawFrameStack};

use super::lut::LutSet;

/// Convert raw ADC codes to linear counts.
///
/// Column `w` is digitized by ADC channel `w % luts.channels()`, and each
/// camera has its own set of channel tables. A code outside a table's domain
/// is a hardware or configuration mismatch and fails the whole stack.
pub fn linearize(stack: &RawFrameStack, luts: &LutSet) -> Result<LinearFrameStack> {
    let (numsum, cameras, states, height, width) = stack.view().dim();
    if luts.cameras() != cameras {
        return Err(KcorError::Config(format!(
            "LUT set covers {} cameras, frame stack has {cameras}",
            luts.cameras()
        )));
    }

    let channels = luts.channels();
    let domain = luts.domain();
    let rows_per_camera = states * height;
    let mut out = vec![0u32; stack.as_slice().len()];
    if out.is_empty() {
        return Ok(LinearFrameStack::new(Array5::zeros(stack.view().dim())));
    }

    out.par_chunks_mut(width)
        .zip(stack.as_slice().par_chunks(width))
        .enumerate()
        .with_min_len((PARALLEL_PIXEL_THRESHOLD / width).max(1))
        .try_for_each(|(row, (dst, src))| {
            let camera = (row / rows_per_camera) % cameras;
            let tables = luts.camera(camera);
            for (col, (d, &code)) in dst.iter_mut().zip(src).enumerate() {
                let channel = col % channels;
                *d = tables[channel].get(code).ok_or_else(|| KcorError::OutOfRange {
                    camera,
                    channel,
                    value: u32::from(code),
                    domain,
                })?;
            }
            Ok::<(), KcorError>(())
        })?;

    let data = Array5::from_shape_vec((numsum, cameras, states, height, width), out)
        .map_err(|e| KcorError::Shape(e.to_string()))?;
    Ok(LinearFrameStack::new(data))
}
