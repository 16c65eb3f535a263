use ndarray::{s, Array3, ArrayView3, ArrayViewMut2, Axis, Zip};

use crate::consts::CORONA_STATE_COUNT;
use crate::error::{KcorError, Result};
use crate::frame::{CorrectedImage, CoronaImage};

/// Polarization brightness of every camera:
/// `sqrt((s0 - s3)^2 + (s1 - s2)^2)`, evaluated in `f64`.
pub fn corona(image: &CorrectedImage) -> Result<CoronaImage> {
    let data = image.data();
    let (cameras, states, height, width) = data.dim();
    if states != CORONA_STATE_COUNT {
        return Err(KcorError::Shape(format!(
            "corona needs {CORONA_STATE_COUNT} polarization states, got {states}"
        )));
    }

    let mut out = Array3::<f32>::zeros((cameras, height, width));
    for (camera, plane) in out.outer_iter_mut().enumerate() {
        corona_plane(data.index_axis(Axis(0), camera), plane);
    }
    Ok(CoronaImage::new(out))
}

/// Corona of one (state, row, col) cube with exactly four states.
fn corona_plane(cube: ArrayView3<'_, u32>, plane: ArrayViewMut2<'_, f32>) {
    Zip::from(plane)
        .and(cube.slice(s![0, .., ..]))
        .and(cube.slice(s![1, .., ..]))
        .and(cube.slice(s![2, .., ..]))
        .and(cube.slice(s![3, .., ..]))
        .par_for_each(|out, &s0, &s1, &s2, &s3| {
            let q = f64::from(s0) - f64::from(s3);
            let u = f64::from(s1) - f64::from(s2);
            *out = (q * q + u * u).sqrt() as f32;
        });
}
