use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{NativeEndian, WriteBytesExt};
use ndarray::Array4;

use crate::consts::{AEROSOL_OUTPUT_SUFFIX, REMOVED_LIST_FILENAME};
use crate::error::{KcorError, Result};

/// Output path of the corrected cube for one observation.
pub fn cube_path(output_root: &Path, timestamp: &str) -> PathBuf {
    output_root.join(format!("{timestamp}_{AEROSOL_OUTPUT_SUFFIX}"))
}

/// Write a (camera, state, row, col) cube as native-endian `u16` samples in
/// row-major order, the same layout the stream files use.
///
/// Samples go to a sibling `.tmp` file that is renamed over `path` once
/// complete, so `path` never holds a partial cube.
pub fn write_cube(path: &Path, cube: &Array4<u16>) -> Result<()> {
    let partial = partial_path(path);
    let result = write_samples(&partial, cube)
        .and_then(|()| fs::rename(&partial, path).map_err(KcorError::from));
    if result.is_err() {
        // The partial file may never have been created.
        let _ = fs::remove_file(&partial);
    }
    result
}

fn write_samples(path: &Path, cube: &Array4<u16>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for &value in cube.iter() {
        writer.write_u16::<NativeEndian>(value)?;
    }
    writer.flush()?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write one processed file name per line into `removed.log`.
pub fn write_removed_list(output_root: &Path, names: &[String]) -> Result<PathBuf> {
    let path = output_root.join(REMOVED_LIST_FILENAME);
    let mut writer = BufWriter::new(File::create(&path)?);
    for name in names {
        writeln!(writer, "{name}")?;
    }
    writer.flush()?;
    Ok(path)
}
