#![allow(dead_code)]

use std::path::Path;

use ndarray::Array5;

use kcor_core::calibration::lut_filename;
use kcor_core::frame::LinearFrameStack;
use kcor_core::io::stream_filename;
use kcor_core::pipeline::config::SensorGeometry;

/// Small two-camera, four-state geometry for fast tests.
pub fn small_geometry(height: usize, width: usize) -> SensorGeometry {
    SensorGeometry {
        height,
        width,
        ..SensorGeometry::default()
    }
}

/// Write one raw stream file of native-endian `u16` samples.
pub fn write_stream_file(dir: &Path, timestamp: &str, camera: usize, index: usize, samples: &[u16]) {
    let bytes: Vec<u8> = samples.iter().flat_map(|v| v.to_ne_bytes()).collect();
    std::fs::write(dir.join(stream_filename(timestamp, camera, index)), bytes)
        .expect("write stream file");
}

/// Write every stream file of an observation. `value(n, c, s, h, w)` gives
/// the raw code of exposure `n`.
pub fn write_observation<F>(
    dir: &Path,
    timestamp: &str,
    geometry: &SensorGeometry,
    numsum: usize,
    value: F,
) where
    F: Fn(usize, usize, usize, usize, usize) -> u16,
{
    let per_file = geometry.exposures_per_file;
    assert_eq!(numsum % per_file, 0, "numsum must fill whole files");
    for c in 0..geometry.cameras {
        for index in 0..numsum / per_file {
            let mut samples = Vec::with_capacity(geometry.file_sample_count());
            for e in 0..per_file {
                let n = index * per_file + e;
                for s in 0..geometry.states {
                    for h in 0..geometry.height {
                        for w in 0..geometry.width {
                            samples.push(value(n, c, s, h, w));
                        }
                    }
                }
            }
            write_stream_file(dir, timestamp, c, index, &samples);
        }
    }
}

/// Write LUT files for every camera id and channel, `lut[i] = i * scale`.
pub fn write_scaled_luts(
    dir: &Path,
    model: &str,
    camera_ids: &[&str],
    identifier: &str,
    geometry: &SensorGeometry,
    scale: u32,
) {
    for id in camera_ids {
        for channel in 0..geometry.adc_channels {
            let bytes: Vec<u8> = (0..geometry.code_domain as u32)
                .flat_map(|i| (i * scale).to_ne_bytes())
                .collect();
            std::fs::write(dir.join(lut_filename(model, id, channel, identifier)), bytes)
                .expect("write LUT file");
        }
    }
}

/// Linear stack with a single camera and state, built from `value(n, h, w)`.
pub fn mono_stack<F>(numsum: usize, height: usize, width: usize, value: F) -> LinearFrameStack
where
    F: Fn(usize, usize, usize) -> u32,
{
    LinearFrameStack::new(Array5::from_shape_fn(
        (numsum, 1, 1, height, width),
        |(n, _, _, h, w)| value(n, h, w),
    ))
}

/// Linear stack with one sample series repeated at every pixel.
pub fn uniform_series_stack(series: &[u32], height: usize, width: usize) -> LinearFrameStack {
    mono_stack(series.len(), height, width, |n, _, _| series[n])
}
