use std::collections::BTreeMap;

use ndarray::{stack, Array3, Array4, ArrayView3, Axis};
use tracing::warn;

use crate::error::{KcorError, Result};

/// Stack per-camera (state, row, col) cubes into one (camera, state, row, col)
/// array in camera-index order for handoff to the persistence layer.
///
/// Cameras must be exactly `0..cameras`, and every cube must share one shape.
pub fn assemble(images: &BTreeMap<usize, Array3<u32>>, cameras: usize) -> Result<Array4<u32>> {
    if images.len() != cameras || images.keys().copied().ne(0..cameras) {
        return Err(KcorError::Shape(format!(
            "expected cameras 0..{cameras}, got {:?}",
            images.keys().collect::<Vec<_>>()
        )));
    }

    let views: Vec<ArrayView3<'_, u32>> = images.values().map(|cube| cube.view()).collect();
    if let Some(first) = views.first() {
        if let Some((camera, cube)) = views
            .iter()
            .enumerate()
            .find(|(_, cube)| cube.dim() != first.dim())
        {
            return Err(KcorError::Shape(format!(
                "camera {camera} image {:?} differs from camera 0 {:?}",
                cube.dim(),
                first.dim()
            )));
        }
    }

    stack(Axis(0), &views).map_err(|e| KcorError::Shape(e.to_string()))
}

/// Convert an assembled cube to the 16-bit output type, saturating values
/// that do not fit. Returns the cube and the number of saturated samples.
pub fn to_u16(cube: &Array4<u32>) -> (Array4<u16>, usize) {
    let mut saturated = 0usize;
    let out = cube.mapv(|v| {
        u16::try_from(v).unwrap_or_else(|_| {
            saturated += 1;
            u16::MAX
        })
    });
    if saturated > 0 {
        warn!(saturated, "Output samples exceed the 16-bit range");
    }
    (out, saturated)
}
