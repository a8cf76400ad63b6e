// Error types for the command linearization engine
//
// This module defines custom error types for dataset validation, conversion,
// and persistence operations, providing structured error handling with error
// codes suitable for reporting through the owning controller.

use log::error;
use std::fmt;
use std::path::PathBuf;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling in the
/// controller that owns the engine.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Log a dataset validation error with structured context
pub fn log_dataset_error(err: &DatasetError, context: &str) {
    error!(
        "Dataset error in {}: code={}, component=CalibrationDataset, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Log a persistence error with structured context
pub fn log_persistence_error(err: &PersistenceError, context: &str) {
    error!(
        "Persistence error in {}: code={}, component=Persistence, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration dataset validation errors
///
/// These errors cover construction-time validation of the raw measurement
/// table: actuator ordering, array shape consistency, and command sample
/// ordering. All of them are fatal to the construction attempt.
///
/// Error code ranges: 1001-1004
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// Actuator identifiers are not strictly ascending
    ActuatorsNotAscending { index: usize },

    /// Array shapes are mutually inconsistent
    ShapeMismatch {
        field: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// Command samples for an actuator are not strictly ascending
    CommandsNotAscending { actuator: i32, index: usize },

    /// Too few measurement samples per actuator to fit a curve
    TooFewSamples { actuator: i32, got: usize },
}

impl ErrorCode for DatasetError {
    fn code(&self) -> i32 {
        match self {
            DatasetError::ActuatorsNotAscending { .. } => 1001,
            DatasetError::ShapeMismatch { .. } => 1002,
            DatasetError::CommandsNotAscending { .. } => 1003,
            DatasetError::TooFewSamples { .. } => 1004,
        }
    }

    fn message(&self) -> String {
        match self {
            DatasetError::ActuatorsNotAscending { index } => {
                format!(
                    "Actuator list must be strictly ascending (violation at index {})",
                    index
                )
            }
            DatasetError::ShapeMismatch {
                field,
                expected_rows,
                expected_cols,
                actual_rows,
                actual_cols,
            } => {
                format!(
                    "{} should have shape ({}, {}), got ({}, {})",
                    field, expected_rows, expected_cols, actual_rows, actual_cols
                )
            }
            DatasetError::CommandsNotAscending { actuator, index } => {
                format!(
                    "Command samples for actuator {} must be strictly ascending (violation at sample {})",
                    actuator, index
                )
            }
            DatasetError::TooFewSamples { actuator, got } => {
                format!(
                    "Actuator {} has {} measurement samples, need at least 2 to fit a curve",
                    actuator, got
                )
            }
        }
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for DatasetError {}

/// Conversion call errors
///
/// The only defined call-time failure of `p2c`/`c2p`: a request vector whose
/// length does not match the number of calibrated actuators. Clipping is a
/// policy outcome, never an error.
///
/// Error code ranges: 2001
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Request vector length does not match the number of actuators
    DimensionMismatch { expected: usize, actual: usize },
}

impl ErrorCode for ConversionError {
    fn code(&self) -> i32 {
        match self {
            ConversionError::DimensionMismatch { .. } => 2001,
        }
    }

    fn message(&self) -> String {
        match self {
            ConversionError::DimensionMismatch { expected, actual } => {
                format!(
                    "Request vector should have {} elements, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConversionError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConversionError {}

/// Persistence errors
///
/// These errors cover saving and loading of calibration datasets: refusing to
/// replace an existing file without the overwrite flag, filesystem failures,
/// corrupt or truncated files, and datasets that fail re-validation on load.
///
/// Error code ranges: 3001-3004
#[derive(Debug)]
pub enum PersistenceError {
    /// Target file exists and overwrite was not requested
    AlreadyExists { path: PathBuf },

    /// Filesystem I/O failure
    Io { details: String },

    /// File contents could not be decoded
    Format { details: String },

    /// Stored dataset failed validation on load
    InvalidDataset(DatasetError),
}

impl ErrorCode for PersistenceError {
    fn code(&self) -> i32 {
        match self {
            PersistenceError::AlreadyExists { .. } => 3001,
            PersistenceError::Io { .. } => 3002,
            PersistenceError::Format { .. } => 3003,
            PersistenceError::InvalidDataset(_) => 3004,
        }
    }

    fn message(&self) -> String {
        match self {
            PersistenceError::AlreadyExists { path } => {
                format!("File {:?} already exists and overwrite is disabled", path)
            }
            PersistenceError::Io { details } => format!("I/O error: {}", details),
            PersistenceError::Format { details } => {
                format!("Invalid calibration file: {}", details)
            }
            PersistenceError::InvalidDataset(err) => {
                format!("Stored dataset failed validation: {}", err.message())
            }
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PersistenceError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PersistenceError {}

/// Convert from std::io::Error to PersistenceError
impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io {
            details: err.to_string(),
        }
    }
}

/// Convert from bincode encode/decode failures to PersistenceError
impl From<bincode::Error> for PersistenceError {
    fn from(err: bincode::Error) -> Self {
        PersistenceError::Format {
            details: err.to_string(),
        }
    }
}

impl From<DatasetError> for PersistenceError {
    fn from(err: DatasetError) -> Self {
        PersistenceError::InvalidDataset(err)
    }
}
