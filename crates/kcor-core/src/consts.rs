/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default sensor height in pixels.
pub const DEFAULT_HEIGHT: usize = 1024;

/// Default sensor width in pixels.
pub const DEFAULT_WIDTH: usize = 1024;

/// Default number of cameras (reflected and transmitted beams).
pub const DEFAULT_CAMERA_COUNT: usize = 2;

/// Default number of polarization modulator states.
pub const DEFAULT_STATE_COUNT: usize = 4;

/// Default number of ADC channels multiplexed across sensor columns.
pub const DEFAULT_ADC_CHANNELS: usize = 4;

/// Default number of exposures written to each raw stream file.
pub const DEFAULT_EXPOSURES_PER_FILE: usize = 2;

/// Default size of the raw code domain covered by one LUT (12-bit ADC).
pub const DEFAULT_CODE_DOMAIN: usize = 4096;

/// Default detector gain: counts per unit signal.
pub const DEFAULT_GAIN: f64 = 44.0;

/// Default noise-scale constant K. With the default gain this accepts samples
/// within 4 sigma of the Poisson expectation around the median.
pub const DEFAULT_NOISE_SCALE: f64 = 4.0 / 44.0;

/// Default minimum inlier fraction required to trust the filtered mean.
pub const DEFAULT_RETENTION: f64 = 0.90;

/// Polarization states required by the corona combination.
pub const CORONA_STATE_COUNT: usize = 4;

/// Tolerance used when rounding `numsum * retention` to an integer count.
pub const THRESHOLD_ROUNDING_TOLERANCE: f64 = 1e-9;

/// LUT file model prefix used by the camera vendor.
pub const DEFAULT_LUT_MODEL: &str = "Photonfocus_MV-D1024E";

/// Suffix of the raw output cube written for each observation.
pub const AEROSOL_OUTPUT_SUFFIX: &str = "kcor_aerosol.raw";

/// Name of the log listing observations written by a batch run.
pub const REMOVED_LIST_FILENAME: &str = "removed.log";
