use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, NativeEndian};
use tracing::debug;

use crate::error::{KcorError, Result};
use crate::pipeline::config::{LutConfig, SensorGeometry};

/// Maps raw ADC codes to linear counts for one (camera, ADC channel).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTable {
    values: Vec<u32>,
}

impl LookupTable {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }

    /// `lut[i] == i` over `domain` codes.
    pub fn identity(domain: usize) -> Self {
        Self {
            values: (0..domain as u32).collect(),
        }
    }

    /// Read a LUT file of native-endian `u32` values. The file must hold
    /// exactly `domain` entries.
    pub fn read(path: &Path, domain: usize) -> Result<Self> {
        let bytes = fs::read(path)?;
        let expected = domain * std::mem::size_of::<u32>();
        if bytes.len() != expected {
            return Err(KcorError::ShapeMismatch {
                path: path.to_path_buf(),
                expected,
                actual: bytes.len(),
            });
        }
        let mut values = vec![0u32; domain];
        NativeEndian::read_u32_into(&bytes, &mut values);
        Ok(Self { values })
    }

    /// Size of the raw code domain.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, code: u16) -> Option<u32> {
        self.values.get(usize::from(code)).copied()
    }
}

/// LUT file name, e.g. `Photonfocus_MV-D1024E_1234_adc2_20200615.bin`.
pub fn lut_filename(model: &str, camera_id: &str, channel: usize, identifier: &str) -> String {
    format!("{model}_{camera_id}_adc{channel}_{identifier}.bin")
}

/// ADC LUTs for every camera, indexed `[camera][channel]`.
#[derive(Clone, Debug)]
pub struct LutSet {
    tables: Vec<Vec<LookupTable>>,
}

impl LutSet {
    /// Build from explicit tables. Every camera must provide the same number
    /// of channels, and every table the same domain.
    pub fn new(tables: Vec<Vec<LookupTable>>) -> Result<Self> {
        let channels = tables.first().map_or(0, Vec::len);
        if channels == 0 {
            return Err(KcorError::Config("LUT set has no channels".into()));
        }
        let domain = tables[0][0].len();
        for (camera, camera_tables) in tables.iter().enumerate() {
            if camera_tables.len() != channels {
                return Err(KcorError::Config(format!(
                    "camera {camera} has {} LUT channels, expected {channels}",
                    camera_tables.len()
                )));
            }
            if let Some(channel) = camera_tables.iter().position(|t| t.len() != domain) {
                return Err(KcorError::Config(format!(
                    "camera {camera} channel {channel} LUT has {} entries, expected {domain}",
                    camera_tables[channel].len()
                )));
            }
        }
        Ok(Self { tables })
    }

    /// Identity tables for every camera and channel of `geometry`.
    pub fn identity(geometry: &SensorGeometry) -> Self {
        let camera = vec![LookupTable::identity(geometry.code_domain); geometry.adc_channels];
        Self {
            tables: vec![camera; geometry.cameras],
        }
    }

    /// Read `adc_channels` LUT files per configured camera id.
    pub fn load(config: &LutConfig, geometry: &SensorGeometry) -> Result<Self> {
        if config.camera_ids.len() != geometry.cameras {
            return Err(KcorError::Config(format!(
                "{} LUT camera ids configured for {} cameras",
                config.camera_ids.len(),
                geometry.cameras
            )));
        }

        let mut tables = Vec::with_capacity(geometry.cameras);
        for camera_id in &config.camera_ids {
            let camera_tables = (0..geometry.adc_channels)
                .map(|channel| {
                    LookupTable::read(
                        &lut_path(config, camera_id, channel),
                        geometry.code_domain,
                    )
                })
                .collect::<Result<Vec<_>>>()?;
            tables.push(camera_tables);
        }
        debug!(
            identifier = %config.identifier,
            cameras = geometry.cameras,
            channels = geometry.adc_channels,
            "Loaded ADC LUTs"
        );
        Self::new(tables)
    }

    pub fn cameras(&self) -> usize {
        self.tables.len()
    }

    pub fn channels(&self) -> usize {
        self.tables[0].len()
    }

    pub fn domain(&self) -> usize {
        self.tables[0][0].len()
    }

    pub fn camera(&self, camera: usize) -> &[LookupTable] {
        &self.tables[camera]
    }
}

fn lut_path(config: &LutConfig, camera_id: &str, channel: usize) -> PathBuf {
    config
        .root
        .join(lut_filename(&config.model, camera_id, channel, &config.identifier))
}
