// Linearizer - bidirectional deflection <-> command conversion
//
// The owning controller calls p2c to turn a desired mirror shape (deflection
// per actuator, in meters) into the drive-command vector for the hardware,
// and c2p to turn a raw command readback into the expected physical shape.
// Both operate on full actuator vectors and share the clipping policy:
// out-of-range requests are substituted with the nearest calibrated boundary
// value and the substitution is recorded in the ClippingTracker.
//
// Note the deliberate asymmetry: p2c inverts the law by bracketing through
// the dense resampled table, while c2p evaluates the fitted spline directly.
// The two directions agree closely but are not bit-identical.

use std::path::Path;

use crate::clipping::{ClipStatus, ClippingTracker};
use crate::config::EngineConfig;
use crate::curve::{ActuatorCurve, CurveSet};
use crate::dataset::CalibrationDataset;
use crate::error::{ConversionError, PersistenceError};
use crate::persistence;

/// Command linearization engine for one calibrated mirror
///
/// Owns the validated dataset, the per-actuator fitted curves, and the clip
/// state. Conversions are synchronous, allocation-light, and perform no I/O;
/// only `save`/`load` touch the filesystem. The engine has no internal
/// locking and expects a single logical owner to issue conversions serially.
#[derive(Debug)]
pub struct Linearizer {
    dataset: CalibrationDataset,
    curves: CurveSet,
    clipping: ClippingTracker,
}

impl Linearizer {
    /// Build the engine from a validated dataset at production resolution
    ///
    /// Fits one natural cubic spline per actuator and resamples it onto the
    /// 10,000-point calibration grid. Identical datasets always produce
    /// identical curves.
    pub fn new(dataset: CalibrationDataset) -> Self {
        Self::with_config(dataset, &EngineConfig::default())
    }

    /// Build the engine with a non-default configuration
    ///
    /// # Arguments
    /// * `dataset` - Validated calibration dataset
    /// * `config` - Engine parameters (calibration resolution)
    pub fn with_config(dataset: CalibrationDataset, config: &EngineConfig) -> Self {
        let curves = CurveSet::build(&dataset, config.calibration_points);
        Self {
            dataset,
            curves,
            clipping: ClippingTracker::new(),
        }
    }

    /// Deflections (meters) to drive commands (au)
    ///
    /// For each actuator the desired deflection is inverted through the
    /// resampled calibration table: out-of-range requests clip to the command
    /// achieving the table's extreme deflection, in-range requests linearly
    /// interpolate between the two bracketing table entries. Every call
    /// overwrites the full clip-state vector. Returned commands always lie
    /// within the actuator's calibrated command range.
    ///
    /// # Arguments
    /// * `desired` - Desired deflection per actuator, length Nact
    ///
    /// # Returns
    /// * `Ok(Vec<f64>)` - Command per actuator
    /// * `Err(ConversionError)` - Wrong vector length; clip state is left
    ///   untouched
    pub fn p2c(&mut self, desired: &[f64]) -> Result<Vec<f64>, ConversionError> {
        self.check_length(desired.len())?;

        let mut commands = Vec::with_capacity(desired.len());
        let mut status = Vec::with_capacity(desired.len());
        for (idx, &pos) in desired.iter().enumerate() {
            let (cmd, clip) = invert_through_table(self.curves.by_row(idx), pos);
            commands.push(cmd);
            status.push(clip);
        }

        self.clipping.record(status);
        Ok(commands)
    }

    /// Drive commands (au) to expected deflections (meters)
    ///
    /// Commands outside an actuator's calibrated range are clamped to the
    /// nearest bound before evaluation; the fitted spline is then evaluated
    /// directly at the (possibly clamped) command. Every call overwrites the
    /// full clip-state vector.
    ///
    /// # Arguments
    /// * `commands` - Drive command per actuator, length Nact
    ///
    /// # Returns
    /// * `Ok(Vec<f64>)` - Expected deflection per actuator
    /// * `Err(ConversionError)` - Wrong vector length; clip state is left
    ///   untouched
    pub fn c2p(&mut self, commands: &[f64]) -> Result<Vec<f64>, ConversionError> {
        self.check_length(commands.len())?;

        let mut positions = Vec::with_capacity(commands.len());
        let mut status = Vec::with_capacity(commands.len());
        for (idx, &cmd) in commands.iter().enumerate() {
            let curve = self.curves.by_row(idx);
            let table = curve.command_table();
            let (lo, hi) = (table[0], table[table.len() - 1]);

            let (clamped, clip) = if cmd < lo {
                (lo, ClipStatus::Low)
            } else if cmd > hi {
                (hi, ClipStatus::High)
            } else {
                (cmd, ClipStatus::InRange)
            };

            positions.push(curve.spline().evaluate(clamped));
            status.push(clip);
        }

        self.clipping.record(status);
        Ok(positions)
    }

    /// Identifiers of the calibrated actuators, strictly ascending
    pub fn actuators_list(&self) -> &[i32] {
        self.dataset.actuators()
    }

    /// Number of calibrated actuators
    pub fn n_actuators(&self) -> usize {
        self.dataset.n_actuators()
    }

    /// Reference shape tag of the underlying calibration
    pub fn reference_tag(&self) -> Option<&str> {
        self.dataset.reference_tag()
    }

    /// Per-actuator clip state of the most recent conversion
    ///
    /// `None` until the first conversion after construction or a reset.
    pub fn clipping_status(&self) -> Option<&[ClipStatus]> {
        self.clipping.status()
    }

    /// Signed integer clip state for diagnostics (-1 / 0 / +1 per actuator)
    pub fn clipping_status_i8(&self) -> Option<Vec<i8>> {
        self.clipping.status_i8()
    }

    /// Clear the clip state back to unset
    pub fn reset_clipping_status(&mut self) {
        self.clipping.reset();
    }

    /// The underlying validated dataset
    pub fn dataset(&self) -> &CalibrationDataset {
        &self.dataset
    }

    /// Save the raw calibration dataset to `path`
    ///
    /// Only the raw tables and the reference tag are written; resampled
    /// curves and clip state are always rebuilt on load. With `overwrite`
    /// false an existing file fails the call. The write is atomic
    /// (temp-then-rename), so no half-written file is ever observable.
    pub fn save<P: AsRef<Path>>(&self, path: P, overwrite: bool) -> Result<(), PersistenceError> {
        persistence::save(&self.dataset, path, overwrite)
    }

    /// Rebuild an engine from a calibration file written by [`Linearizer::save`]
    ///
    /// The stored dataset is re-validated, curves are refitted at production
    /// resolution, and the clip state starts unset.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let dataset = persistence::load(path)?;
        Ok(Self::new(dataset))
    }

    fn check_length(&self, actual: usize) -> Result<(), ConversionError> {
        let expected = self.dataset.n_actuators();
        if actual != expected {
            return Err(ConversionError::DimensionMismatch { expected, actual });
        }
        Ok(())
    }
}

/// Invert one actuator's calibration table at the desired deflection
///
/// Out-of-range deflections clip to the command at the first table index
/// achieving the extreme deflection. In-range deflections are bracketed by
/// the largest table entry <= desired and the smallest entry >= desired
/// (first matching index on ties; which index wins among equal values is
/// implementation-defined and stable only within this implementation), then
/// linearly interpolated in (position, command) space.
fn invert_through_table(curve: &ActuatorCurve, desired: f64) -> (f64, ClipStatus) {
    let cmd = curve.command_table();
    let pos = curve.position_table();

    let mut max_idx = 0;
    let mut min_idx = 0;
    for (i, &p) in pos.iter().enumerate() {
        if p > pos[max_idx] {
            max_idx = i;
        }
        if p < pos[min_idx] {
            min_idx = i;
        }
    }

    if desired > pos[max_idx] {
        return (cmd[max_idx], ClipStatus::High);
    }
    if desired < pos[min_idx] {
        return (cmd[min_idx], ClipStatus::Low);
    }

    // Bracket: a = largest entry <= desired, b = smallest entry >= desired
    let mut idx_a: Option<usize> = None;
    let mut idx_b: Option<usize> = None;
    for (i, &p) in pos.iter().enumerate() {
        if p <= desired && idx_a.map_or(true, |a| p > pos[a]) {
            idx_a = Some(i);
        }
        if p >= desired && idx_b.map_or(true, |b| p < pos[b]) {
            idx_b = Some(i);
        }
    }
    // Both brackets exist: desired is within [min, max] of the table
    let (idx_a, idx_b) = (
        idx_a.unwrap_or(min_idx),
        idx_b.unwrap_or(max_idx),
    );

    let (pos_a, pos_b) = (pos[idx_a], pos[idx_b]);
    if pos_a == pos_b {
        // Desired hits a table entry exactly; no interpolation span
        return (cmd[idx_a], ClipStatus::InRange);
    }

    let t = (desired - pos_a) / (pos_b - pos_a);
    (cmd[idx_a] + t * (cmd[idx_b] - cmd[idx_a]), ClipStatus::InRange)
}
