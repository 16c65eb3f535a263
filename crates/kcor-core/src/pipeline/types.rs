use ndarray::Array4;

use crate::error::KcorError;
use crate::frame::CoronaImage;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Discovering,
    Reading,
    Linearizing,
    Statistics,
    Filtering,
    Combining,
    Assembling,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovering => write!(f, "Discovering files"),
            Self::Reading => write!(f, "Reading frames"),
            Self::Linearizing => write!(f, "Applying LUTs"),
            Self::Statistics => write!(f, "Mean/median"),
            Self::Filtering => write!(f, "Removing aerosols"),
            Self::Combining => write!(f, "Computing corona"),
            Self::Assembling => write!(f, "Assembling output"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Observations run concurrently, so every call names its timestamp. All
/// methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A batch of `total` observations is starting.
    fn begin_batch(&self, _total: usize) {}

    /// An observation entered a new stage.
    fn stage(&self, _timestamp: &str, _stage: PipelineStage) {}

    /// An observation finished, successfully or not.
    fn finish_observation(&self, _timestamp: &str, _ok: bool) {}

    fn finish_batch(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Everything produced for one observation.
#[derive(Clone, Debug)]
pub struct ObservationOutput {
    pub timestamp: String,
    pub numsum: usize,
    /// Present when the geometry has the four polarization states.
    pub corona: Option<CoronaImage>,
    /// Corrected (camera, state, row, col) cube ready for persistence.
    pub cube: Array4<u32>,
    pub inlier_counts: Option<Array4<u32>>,
    /// Pixels that kept the unfiltered mean (aerosol filter only).
    pub fallback_pixels: usize,
    /// Wall time spent in the statistics and filter stages.
    pub filter_ms: f64,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Output file names written, in timestamp order.
    pub written: Vec<String>,
    /// Timestamps skipped because their output already existed.
    pub skipped: Vec<String>,
    /// Timestamps that failed, with the error that stopped them.
    pub failed: Vec<(String, KcorError)>,
}
