use std::collections::BTreeMap;

use ndarray::{Array3, Array4, Array5, ArrayView5, Axis};
use num_traits::{PrimInt, Unsigned};

/// Integer detector count stored in a frame stack.
///
/// Raw stacks hold `u16` ADC codes, linearized stacks hold `u32` counts.
pub trait Sample: PrimInt + Unsigned + Into<u64> + Send + Sync + 'static {}

impl Sample for u16 {}
impl Sample for u32 {}

/// Exposure stack for one observation.
///
/// Axes are (exposure, camera, state, row, col). The array is always in
/// standard (row-major, contiguous) layout, and is never mutated after
/// construction.
#[derive(Clone, Debug)]
pub struct FrameStack<T: Sample> {
    data: Array5<T>,
}

/// Stack of raw ADC codes as read from the stream files.
pub type RawFrameStack = FrameStack<u16>;

/// Stack of linearized counts produced by the ADC LUTs.
pub type LinearFrameStack = FrameStack<u32>;

impl<T: Sample> FrameStack<T> {
    pub fn new(data: Array5<T>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self { data }
    }

    pub fn view(&self) -> ArrayView5<'_, T> {
        self.data.view()
    }

    /// Contiguous samples in (exposure, camera, state, row, col) order.
    pub(crate) fn as_slice(&self) -> &[T] {
        // Standard layout is enforced in `new`.
        self.data
            .as_slice()
            .expect("frame stack is in standard layout")
    }

    /// Number of exposures accumulated (the exposure-axis length).
    pub fn numsum(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn cameras(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn states(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn height(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    pub fn width(&self) -> usize {
        self.data.len_of(Axis(4))
    }

    /// Per-pixel image shape (camera, state, row, col).
    pub fn image_shape(&self) -> (usize, usize, usize, usize) {
        (self.cameras(), self.states(), self.height(), self.width())
    }

    /// Smallest and largest sample, or `None` for an empty stack.
    pub fn min_max(&self) -> Option<(T, T)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Aerosol-corrected image, one robust estimate per (camera, state, row, col).
#[derive(Clone, Debug, PartialEq)]
pub struct CorrectedImage {
    data: Array4<u32>,
}

impl CorrectedImage {
    pub fn new(data: Array4<u32>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Array4<u32> {
        &self.data
    }

    pub fn cameras(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn states(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Split into per-camera cubes keyed by camera index, consuming the image.
    pub fn into_camera_images(self) -> BTreeMap<usize, Array3<u32>> {
        self.data
            .outer_iter()
            .enumerate()
            .map(|(c, cube)| (c, cube.to_owned()))
            .collect()
    }
}

/// Polarization brightness per (camera, row, col).
#[derive(Clone, Debug, PartialEq)]
pub struct CoronaImage {
    data: Array3<f32>,
}

impl CoronaImage {
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }
}

/// One timestamped set of exposures, ready for the numeric stages.
#[derive(Clone, Debug)]
pub struct Observation {
    pub timestamp: String,
    /// LUT camera identifier per camera index.
    pub camera_ids: Vec<String>,
    pub frames: LinearFrameStack,
}

impl Observation {
    pub fn numsum(&self) -> usize {
        self.frames.numsum()
    }
}
