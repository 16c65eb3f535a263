pub mod config;
pub mod info;
pub mod process;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use kcor_core::calibration::LutSet;
use kcor_core::pipeline::config::{StackMethod, StreamConfig};
use tracing::debug;

#[derive(Clone, Copy, ValueEnum)]
pub enum StackMethodArg {
    Aerosol,
    Mean,
    Median,
}

impl From<StackMethodArg> for StackMethod {
    fn from(arg: StackMethodArg) -> Self {
        match arg {
            StackMethodArg::Aerosol => StackMethod::AerosolFilter,
            StackMethodArg::Mean => StackMethod::Mean,
            StackMethodArg::Median => StackMethod::Median,
        }
    }
}

/// Options shared by the processing commands. Flags override the config file.
#[derive(Args)]
pub struct SourceArgs {
    /// Stream config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the raw stream files
    #[arg(long)]
    pub stream_root: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output_root: Option<PathBuf>,

    /// Directory holding the ADC LUT files
    #[arg(long)]
    pub lut_root: Option<PathBuf>,

    /// LUT calibration identifier, e.g. 20200615
    #[arg(long)]
    pub lut_id: Option<String>,

    /// Comma-separated LUT camera ids, camera 0 first
    #[arg(long)]
    pub camera_ids: Option<String>,

    /// Skip LUTs and use identity tables
    #[arg(long)]
    pub identity_luts: bool,

    /// Stacking method
    #[arg(long, value_enum)]
    pub method: Option<StackMethodArg>,

    /// Noise-scale constant K
    #[arg(long)]
    pub noise_scale: Option<f64>,

    /// Detector gain G
    #[arg(long)]
    pub gain: Option<f64>,

    /// Retention fraction R (0-1)
    #[arg(long)]
    pub retention: Option<f64>,
}

impl SourceArgs {
    /// Read the config file (if any) and apply command-line overrides.
    pub fn load_config(&self) -> Result<StreamConfig> {
        let mut config = if let Some(ref path) = self.config {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config: StreamConfig = toml::from_str(&contents).context("Invalid stream config")?;
            debug!(path = %path.display(), "Loaded stream config");
            config
        } else {
            StreamConfig::new(PathBuf::from("."), PathBuf::from("."))
        };

        if let Some(ref root) = self.stream_root {
            config.stream_root = root.clone();
        }
        if let Some(ref root) = self.output_root {
            config.output_root = root.clone();
        }
        if let Some(ref root) = self.lut_root {
            config.luts.root = root.clone();
        }
        if let Some(ref id) = self.lut_id {
            config.luts.identifier = id.clone();
        }
        if let Some(ref ids) = self.camera_ids {
            config.luts.camera_ids = ids.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Some(method) = self.method {
            config.stacking.method = method.into();
        }
        if let Some(k) = self.noise_scale {
            config.filter.noise_scale = k;
        }
        if let Some(g) = self.gain {
            config.filter.gain = g;
        }
        if let Some(r) = self.retention {
            config.filter.retention = r;
        }

        config.validate().context("Invalid stream config")?;
        Ok(config)
    }

    pub fn load_luts(&self, config: &StreamConfig) -> Result<LutSet> {
        if self.identity_luts {
            return Ok(LutSet::identity(&config.geometry));
        }
        LutSet::load(&config.luts, &config.geometry).with_context(|| {
            format!("Failed to load LUTs from {}", config.luts.root.display())
        })
    }
}
