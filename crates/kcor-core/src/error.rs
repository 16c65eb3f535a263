use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KcorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing stream file for {timestamp} camera {camera}: {detail}")]
    MissingFile {
        timestamp: String,
        camera: usize,
        detail: String,
    },

    #[error("Shape mismatch in {}: expected {expected} bytes, got {actual}", path.display())]
    ShapeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Raw value {value} out of LUT range (domain {domain}) at camera {camera}, ADC channel {channel}"
    )]
    OutOfRange {
        camera: usize,
        channel: usize,
        value: u32,
        domain: usize,
    },

    #[error("Degenerate sample: cannot reduce {numsum} exposures")]
    DegenerateSample { numsum: usize },

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, KcorError>;
