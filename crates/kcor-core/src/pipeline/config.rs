use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_ADC_CHANNELS, DEFAULT_CAMERA_COUNT, DEFAULT_CODE_DOMAIN, DEFAULT_EXPOSURES_PER_FILE,
    DEFAULT_HEIGHT, DEFAULT_LUT_MODEL, DEFAULT_STATE_COUNT, DEFAULT_WIDTH,
};
use crate::error::{KcorError, Result};
use crate::stack::aerosol::AerosolFilterParams;

/// Full configuration for processing a day of stream data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Directory holding the raw stream files for one day.
    pub stream_root: PathBuf,
    /// Directory receiving the corrected cubes.
    pub output_root: PathBuf,
    /// Worker count for observation-level parallelism. `None` uses all cores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<usize>,
    #[serde(default)]
    pub geometry: SensorGeometry,
    #[serde(default)]
    pub filter: AerosolFilterParams,
    #[serde(default)]
    pub stacking: StackingConfig,
    #[serde(default)]
    pub luts: LutConfig,
    #[serde(default)]
    pub results: ResultsConfig,
}

impl StreamConfig {
    pub fn new(stream_root: PathBuf, output_root: PathBuf) -> Self {
        Self {
            stream_root,
            output_root,
            cores: None,
            geometry: SensorGeometry::default(),
            filter: AerosolFilterParams::default(),
            stacking: StackingConfig::default(),
            luts: LutConfig::default(),
            results: ResultsConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.filter.validate()?;
        if self.cores == Some(0) {
            return Err(KcorError::Config("cores must be at least 1".into()));
        }
        Ok(())
    }
}

/// Fixed sensor and stream-file layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorGeometry {
    pub height: usize,
    pub width: usize,
    pub cameras: usize,
    pub states: usize,
    /// ADC channels multiplexed across columns; channel = col % adc_channels.
    pub adc_channels: usize,
    pub exposures_per_file: usize,
    /// Number of raw codes covered by each LUT.
    pub code_domain: usize,
}

impl Default for SensorGeometry {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            cameras: DEFAULT_CAMERA_COUNT,
            states: DEFAULT_STATE_COUNT,
            adc_channels: DEFAULT_ADC_CHANNELS,
            exposures_per_file: DEFAULT_EXPOSURES_PER_FILE,
            code_domain: DEFAULT_CODE_DOMAIN,
        }
    }
}

impl SensorGeometry {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("height", self.height),
            ("width", self.width),
            ("cameras", self.cameras),
            ("states", self.states),
            ("adc_channels", self.adc_channels),
            ("exposures_per_file", self.exposures_per_file),
            ("code_domain", self.code_domain),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(KcorError::Config(format!("geometry.{name} must be non-zero")));
            }
        }
        if self.code_domain > usize::from(u16::MAX) + 1 {
            return Err(KcorError::Config(format!(
                "geometry.code_domain {} exceeds the 16-bit raw range",
                self.code_domain
            )));
        }
        Ok(())
    }

    /// Pixels in one (row, col) plane.
    pub fn plane_len(&self) -> usize {
        self.height * self.width
    }

    /// Samples in one stream file: (exposures, states, rows, cols).
    pub fn file_sample_count(&self) -> usize {
        self.exposures_per_file * self.states * self.plane_len()
    }

    /// Expected byte length of one raw stream file.
    pub fn file_byte_len(&self) -> usize {
        self.file_sample_count() * std::mem::size_of::<u16>()
    }

    /// Byte length of one assembled `u16` output cube.
    pub fn cube_byte_len(&self) -> usize {
        self.cameras * self.states * self.plane_len() * std::mem::size_of::<u16>()
    }
}

/// How the exposure stack is reduced to one image per (camera, state).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackMethod {
    /// Per-pixel outlier rejection with fallback to the plain mean.
    #[default]
    AerosolFilter,
    /// Plain per-pixel mean, no rejection.
    Mean,
    /// Per-pixel median.
    Median,
}

impl std::fmt::Display for StackMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AerosolFilter => write!(f, "Aerosol Filter"),
            Self::Mean => write!(f, "Mean"),
            Self::Median => write!(f, "Median"),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StackingConfig {
    #[serde(default)]
    pub method: StackMethod,
}

/// Location and naming of the ADC calibration tables.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LutConfig {
    pub root: PathBuf,
    /// Calibration identifier, usually the date the LUTs were measured.
    pub identifier: String,
    /// Camera model prefix of the LUT file names.
    pub model: String,
    /// Camera serial per camera index (index 0 is the reflected camera).
    pub camera_ids: Vec<String>,
}

impl Default for LutConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            identifier: String::new(),
            model: DEFAULT_LUT_MODEL.to_string(),
            camera_ids: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Write `removed.log` listing every observation written by a batch.
    pub write_removed_list: bool,
    /// Reprocess observations whose output already exists.
    pub overwrite: bool,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            write_removed_list: true,
            overwrite: false,
        }
    }
}
