// Calibration dataset persistence
//
// The on-disk calibration file holds exactly what a fresh engine needs: the
// reference shape tag and the three raw measurement tables (actuator ids,
// command samples, deflection samples), bincode-encoded behind a small
// magic/version header. Resampled curves and clip state are never written;
// they are deterministic functions of the raw data and are rebuilt on load.
//
// Writes go to a temporary file in the target directory followed by a
// rename, so a crash mid-write never leaves a half-written file that could
// pass for a valid calibration.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::dataset::CalibrationDataset;
use crate::error::{log_dataset_error, log_persistence_error, PersistenceError};

/// File identification header
const MAGIC: [u8; 4] = *b"DMLC";
const FORMAT_VERSION: u16 = 1;

/// On-disk layout of a calibration file
///
/// Field order matches the original table order: header tag first, then
/// actuator ids, raw commands, raw deflections.
#[derive(Debug, Serialize, Deserialize)]
struct CalibrationFile {
    magic: [u8; 4],
    version: u16,
    reference_tag: Option<String>,
    actuators: Vec<i32>,
    commands: Vec<Vec<f64>>,
    deflections: Vec<Vec<f64>>,
}

/// Write a calibration dataset to `path`
///
/// # Arguments
/// * `dataset` - Validated dataset to persist
/// * `path` - Target file path
/// * `overwrite` - Replace an existing file at `path`; when false an
///   existing file fails with `PersistenceError::AlreadyExists`
///
/// # Errors
/// `AlreadyExists` on a refused overwrite, `Io` on filesystem failures,
/// `Format` if encoding fails.
pub fn save<P: AsRef<Path>>(
    dataset: &CalibrationDataset,
    path: P,
    overwrite: bool,
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    if !overwrite && path.exists() {
        let err = PersistenceError::AlreadyExists {
            path: path.to_path_buf(),
        };
        log_persistence_error(&err, "save");
        return Err(err);
    }

    let file = CalibrationFile {
        magic: MAGIC,
        version: FORMAT_VERSION,
        reference_tag: dataset.reference_tag().map(str::to_owned),
        actuators: dataset.actuators().to_vec(),
        commands: dataset.commands().to_vec(),
        deflections: dataset.deflections().to_vec(),
    };
    let encoded = bincode::serialize(&file)?;

    // Atomic write: temp file in the same directory, then rename over the
    // target so readers only ever see a complete file
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, &encoded)?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    info!(
        "[Persistence] Saved calibration for {} actuators to {:?}",
        dataset.n_actuators(),
        path
    );
    Ok(())
}

/// Read a calibration dataset back from `path`
///
/// The stored arrays are re-validated through `CalibrationDataset::new`, so
/// a tampered or corrupted file cannot produce an inconsistent engine.
/// Round-trips are byte-exact: f64 bit patterns and the tag string come back
/// unchanged.
///
/// # Errors
/// `Io` if the file cannot be read, `Format` on a bad magic/version or
/// undecodable contents, `InvalidDataset` if the stored arrays fail
/// validation.
pub fn load<P: AsRef<Path>>(path: P) -> Result<CalibrationDataset, PersistenceError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let file: CalibrationFile = bincode::deserialize(&bytes)?;

    if file.magic != MAGIC {
        let err = PersistenceError::Format {
            details: format!("bad magic {:?}, not a calibration file", file.magic),
        };
        log_persistence_error(&err, "load");
        return Err(err);
    }
    if file.version != FORMAT_VERSION {
        let err = PersistenceError::Format {
            details: format!(
                "unsupported format version {} (supported: {})",
                file.version, FORMAT_VERSION
            ),
        };
        log_persistence_error(&err, "load");
        return Err(err);
    }

    let dataset = CalibrationDataset::new(
        file.actuators,
        file.commands,
        file.deflections,
        file.reference_tag,
    )
    .map_err(|err| {
        log_dataset_error(&err, "load");
        err
    })?;

    info!(
        "[Persistence] Loaded calibration for {} actuators from {:?}",
        dataset.n_actuators(),
        path
    );
    Ok(dataset)
}
