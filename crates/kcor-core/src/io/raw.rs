use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, NativeEndian};
use memmap2::Mmap;
use ndarray::{s, Array5};
use tracing::{debug, warn};

use crate::error::{KcorError, Result};
use crate::frame::RawFrameStack;
use crate::pipeline::config::SensorGeometry;

const STREAM_MARKER: &str = "_kcor_cam";
const STREAM_EXTENSION: &str = ".raw";
const TIMESTAMP_LEN: usize = 15;

/// Stream file name for a camera and file index, e.g.
/// `20201008_222714_kcor_cam0_0003.raw`.
pub fn stream_filename(timestamp: &str, camera: usize, index: usize) -> String {
    format!("{timestamp}{STREAM_MARKER}{camera}_{index:04}{STREAM_EXTENSION}")
}

/// Split a stream file name into (timestamp, camera, index).
fn parse_stream_filename(name: &str) -> Option<(&str, usize, usize)> {
    let stem = name.strip_suffix(STREAM_EXTENSION)?;
    let (timestamp, rest) = stem.split_once(STREAM_MARKER)?;
    if !is_timestamp(timestamp) {
        return None;
    }
    let (camera, index) = rest.split_once('_')?;
    if index.len() != 4 {
        return None;
    }
    Some((timestamp, camera.parse().ok()?, index.parse().ok()?))
}

/// `YYYYMMDD_HHMMSS`
fn is_timestamp(s: &str) -> bool {
    s.len() == TIMESTAMP_LEN
        && s.char_indices()
            .all(|(i, ch)| if i == 8 { ch == '_' } else { ch.is_ascii_digit() })
}

/// Every observation timestamp with at least one stream file under `root`,
/// in ascending order.
pub fn discover_timestamps(root: &Path) -> Result<Vec<String>> {
    let mut timestamps = BTreeSet::new();
    for entry in fs::read_dir(root)? {
        let name = entry?.file_name();
        if let Some((timestamp, _, _)) = name.to_str().and_then(parse_stream_filename) {
            timestamps.insert(timestamp.to_string());
        }
    }
    Ok(timestamps.into_iter().collect())
}

/// Stream files for one observation, ordered by file index per camera.
#[derive(Clone, Debug)]
pub struct StreamFiles {
    pub timestamp: String,
    pub numsum: usize,
    pub by_camera: Vec<Vec<PathBuf>>,
}

/// Discovers and loads raw stream files for a fixed sensor geometry.
#[derive(Clone, Debug)]
pub struct RawFrameReader {
    geometry: SensorGeometry,
}

impl RawFrameReader {
    pub fn new(geometry: SensorGeometry) -> Self {
        Self { geometry }
    }

    /// Find the stream files for `timestamp` under `root`.
    ///
    /// `numsum` is the exposure count recorded by the metadata carrier. When it
    /// is unknown it is inferred from the number of camera 0 files. Every
    /// camera must provide the same number of files and every index in
    /// `0..numsum / exposures_per_file`.
    pub fn discover(
        &self,
        root: &Path,
        timestamp: &str,
        numsum: Option<usize>,
    ) -> Result<StreamFiles> {
        let cameras = self.geometry.cameras;
        let mut found: Vec<BTreeMap<usize, PathBuf>> = vec![BTreeMap::new(); cameras];

        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((ts, camera, index)) = parse_stream_filename(name) else {
                continue;
            };
            if ts != timestamp {
                continue;
            }
            if camera >= cameras {
                debug!(file = name, "Ignoring stream file for unconfigured camera");
                continue;
            }
            found[camera].insert(index, path);
        }

        let missing = |camera: usize, detail: String| KcorError::MissingFile {
            timestamp: timestamp.to_string(),
            camera,
            detail,
        };

        let first_count = found.first().map_or(0, BTreeMap::len);
        if let Some((camera, files)) = found
            .iter()
            .enumerate()
            .find(|(_, files)| files.len() != first_count)
        {
            return Err(missing(
                camera,
                format!(
                    "{} files, but camera 0 has {first_count}",
                    files.len()
                ),
            ));
        }

        let per_file = self.geometry.exposures_per_file;
        let numsum = numsum.unwrap_or(first_count * per_file);
        if numsum == 0 {
            return Err(missing(0, "no stream files found".into()));
        }
        if !numsum.is_multiple_of(per_file) {
            return Err(KcorError::Config(format!(
                "numsum {numsum} is not a multiple of {per_file} exposures per file"
            )));
        }

        let expected = numsum / per_file;
        let mut by_camera = Vec::with_capacity(cameras);
        for (camera, mut files) in found.into_iter().enumerate() {
            let mut ordered = Vec::with_capacity(expected);
            for index in 0..expected {
                let path = files
                    .remove(&index)
                    .ok_or_else(|| missing(camera, format!("file index {index:04} absent")))?;
                ordered.push(path);
            }
            if !files.is_empty() {
                warn!(
                    timestamp,
                    camera,
                    extra = files.len(),
                    "Ignoring stream files beyond numsum"
                );
            }
            by_camera.push(ordered);
        }

        debug!(timestamp, numsum, files_per_camera = expected, "Discovered stream files");
        Ok(StreamFiles {
            timestamp: timestamp.to_string(),
            numsum,
            by_camera,
        })
    }

    /// Read every file into one (exposure, camera, state, row, col) stack.
    pub fn load(&self, files: &StreamFiles) -> Result<RawFrameStack> {
        let g = &self.geometry;
        if files.by_camera.len() != g.cameras {
            return Err(KcorError::Shape(format!(
                "{} camera file lists for {} configured cameras",
                files.by_camera.len(),
                g.cameras
            )));
        }

        let mut data = Array5::<u16>::zeros((files.numsum, g.cameras, g.states, g.height, g.width));
        let exposure_len = g.states * g.plane_len();
        let exposure_bytes = exposure_len * std::mem::size_of::<u16>();

        for (camera, paths) in files.by_camera.iter().enumerate() {
            if paths.len() * g.exposures_per_file != files.numsum {
                return Err(KcorError::MissingFile {
                    timestamp: files.timestamp.clone(),
                    camera,
                    detail: format!(
                        "{} files cannot hold {} exposures",
                        paths.len(),
                        files.numsum
                    ),
                });
            }
            for (file_index, path) in paths.iter().enumerate() {
                let mmap = map_stream_file(path, g.file_byte_len())?;
                for e in 0..g.exposures_per_file {
                    let n = file_index * g.exposures_per_file + e;
                    let mut view = data.slice_mut(s![n, camera, .., .., ..]);
                    let dest = view.as_slice_mut().ok_or_else(|| {
                        KcorError::Shape("frame stack is not contiguous".into())
                    })?;
                    let src = &mmap[e * exposure_bytes..(e + 1) * exposure_bytes];
                    NativeEndian::read_u16_into(src, dest);
                }
            }
        }

        Ok(RawFrameStack::new(data))
    }
}

/// Memory-map one stream file after checking its length.
fn map_stream_file(path: &Path, expected: usize) -> Result<Mmap> {
    let file = File::open(path)?;
    let actual = file.metadata()?.len() as usize;
    if actual != expected {
        return Err(KcorError::ShapeMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    // SAFETY: stream files are written once by the camera and never modified
    // while being processed.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}
