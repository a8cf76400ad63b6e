// CalibrationDataset - validated raw measurement table
//
// This module holds the raw per-actuator calibration measurements: for each
// actuator, the sequence of drive commands applied during calibration and the
// deflections measured in response. All validation happens at construction;
// a dataset that exists is well formed and immutable.

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Raw calibration measurements for a set of actuators
///
/// Invariants, enforced at construction:
/// - actuator identifiers are unique and strictly ascending;
/// - `commands` and `deflections` both have one row per actuator and the
///   same number of samples (Nmeas) in every row;
/// - every actuator's command samples are strictly ascending (required for
///   the curve fit and its inversion);
/// - at least 2 samples per actuator.
///
/// The ascending-order check runs on every command row, not just the first
/// one. A dataset is constructed once, either from measurement arrays or by
/// loading a calibration file, and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationDataset {
    actuators: Vec<i32>,
    commands: Vec<Vec<f64>>,
    deflections: Vec<Vec<f64>>,
    reference_tag: Option<String>,
}

impl CalibrationDataset {
    /// Build a validated dataset from raw measurement arrays
    ///
    /// # Arguments
    /// * `actuators` - Actuator identifiers, strictly ascending
    /// * `commands` - Per-actuator command samples, shape (Nact, Nmeas)
    /// * `deflections` - Per-actuator measured deflections, same shape
    /// * `reference_tag` - Optional label of the reference shape the
    ///   calibration was taken against
    ///
    /// # Returns
    /// * `Ok(CalibrationDataset)` - All invariants hold
    /// * `Err(DatasetError)` - First violated invariant, with expected and
    ///   actual dimensions named in the message
    pub fn new(
        actuators: Vec<i32>,
        commands: Vec<Vec<f64>>,
        deflections: Vec<Vec<f64>>,
        reference_tag: Option<String>,
    ) -> Result<Self, DatasetError> {
        let n_act = actuators.len();

        for i in 1..n_act {
            if actuators[i] <= actuators[i - 1] {
                return Err(DatasetError::ActuatorsNotAscending { index: i });
            }
        }

        let n_meas = commands.first().map_or(0, |row| row.len());
        Self::check_shape("commands", &commands, n_act, n_meas)?;
        Self::check_shape("deflections", &deflections, n_act, n_meas)?;

        for (row, &act) in commands.iter().zip(&actuators) {
            if row.len() < 2 {
                return Err(DatasetError::TooFewSamples {
                    actuator: act,
                    got: row.len(),
                });
            }
            for i in 1..row.len() {
                if row[i] <= row[i - 1] {
                    return Err(DatasetError::CommandsNotAscending {
                        actuator: act,
                        index: i,
                    });
                }
            }
        }

        Ok(Self {
            actuators,
            commands,
            deflections,
            reference_tag,
        })
    }

    /// Check that a table has exactly `n_act` rows of `n_meas` samples each
    fn check_shape(
        field: &'static str,
        table: &[Vec<f64>],
        n_act: usize,
        n_meas: usize,
    ) -> Result<(), DatasetError> {
        if table.len() != n_act {
            return Err(DatasetError::ShapeMismatch {
                field,
                expected_rows: n_act,
                expected_cols: n_meas,
                actual_rows: table.len(),
                actual_cols: table.first().map_or(0, |row| row.len()),
            });
        }
        for row in table {
            if row.len() != n_meas {
                return Err(DatasetError::ShapeMismatch {
                    field,
                    expected_rows: n_act,
                    expected_cols: n_meas,
                    actual_rows: table.len(),
                    actual_cols: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Actuator identifiers, strictly ascending
    pub fn actuators(&self) -> &[i32] {
        &self.actuators
    }

    /// Number of calibrated actuators
    pub fn n_actuators(&self) -> usize {
        self.actuators.len()
    }

    /// Number of measurement samples per actuator
    pub fn n_samples(&self) -> usize {
        self.commands.first().map_or(0, |row| row.len())
    }

    /// Command samples for one actuator row
    pub fn command_row(&self, idx: usize) -> &[f64] {
        &self.commands[idx]
    }

    /// Measured deflections for one actuator row
    pub fn deflection_row(&self, idx: usize) -> &[f64] {
        &self.deflections[idx]
    }

    /// Full command table, shape (Nact, Nmeas)
    pub fn commands(&self) -> &[Vec<f64>] {
        &self.commands
    }

    /// Full deflection table, shape (Nact, Nmeas)
    pub fn deflections(&self) -> &[Vec<f64>] {
        &self.deflections
    }

    /// Reference shape tag this calibration was taken against
    pub fn reference_tag(&self) -> Option<&str> {
        self.reference_tag.as_deref()
    }
}
