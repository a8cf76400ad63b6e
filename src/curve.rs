// Per-actuator calibration curves
//
// For each actuator the raw (command, deflection) samples are fitted with a
// natural cubic spline and resampled onto a dense, equally spaced command
// grid spanning the actuator's measured range. All lookups after this step go
// through the fitted spline or the resampled table; the raw scattered samples
// are not consulted again.

use std::collections::HashMap;

use log::debug;

use crate::dataset::CalibrationDataset;
use crate::spline::NaturalCubicSpline;

/// Fitted and resampled calibration curve for one actuator
///
/// `command` holds the dense, equally spaced command grid between the first
/// and last raw command sample; `position` holds the spline evaluated at each
/// grid entry. Both are built once and never mutated. The fitted spline is
/// kept alongside the tables: the forward conversion (`c2p`) evaluates it
/// directly, while the inverse (`p2c`) brackets through the tables.
#[derive(Debug, Clone)]
pub struct ActuatorCurve {
    spline: NaturalCubicSpline,
    command: Vec<f64>,
    position: Vec<f64>,
}

impl ActuatorCurve {
    /// Fit and resample the curve for one actuator
    ///
    /// # Arguments
    /// * `commands` - Raw command samples, strictly ascending
    /// * `deflections` - Measured deflections, index-aligned with `commands`
    /// * `resolution` - Number of resampled grid points (the calibration
    ///   resolution, 10,000 in production)
    pub fn build(commands: &[f64], deflections: &[f64], resolution: usize) -> Self {
        assert!(resolution >= 2, "calibration resolution must be at least 2");
        let spline = NaturalCubicSpline::fit(commands.to_vec(), deflections.to_vec());

        let cmd_min = spline.x_min();
        let cmd_max = spline.x_max();
        let step = (cmd_max - cmd_min) / (resolution - 1) as f64;

        let mut command = Vec::with_capacity(resolution);
        let mut position = Vec::with_capacity(resolution);
        for i in 0..resolution {
            let c = cmd_min + i as f64 * step;
            command.push(c);
            position.push(spline.evaluate(c));
        }

        Self {
            spline,
            command,
            position,
        }
    }

    /// The fitted command -> deflection spline
    pub fn spline(&self) -> &NaturalCubicSpline {
        &self.spline
    }

    /// Resampled command grid, ascending
    pub fn command_table(&self) -> &[f64] {
        &self.command
    }

    /// Spline deflections at each command grid entry
    pub fn position_table(&self) -> &[f64] {
        &self.position
    }
}

/// Arena of actuator curves with a precomputed id -> index map
///
/// Curves are stored in dataset row order; the map resolves an actuator
/// identifier to its row index once, replacing repeated searches through the
/// id array on every conversion.
#[derive(Debug, Clone)]
pub struct CurveSet {
    curves: Vec<ActuatorCurve>,
    index_of: HashMap<i32, usize>,
}

impl CurveSet {
    /// Fit and resample every actuator curve in the dataset
    pub fn build(dataset: &CalibrationDataset, resolution: usize) -> Self {
        let curves: Vec<ActuatorCurve> = (0..dataset.n_actuators())
            .map(|i| {
                ActuatorCurve::build(
                    dataset.command_row(i),
                    dataset.deflection_row(i),
                    resolution,
                )
            })
            .collect();

        let index_of = dataset
            .actuators()
            .iter()
            .enumerate()
            .map(|(i, &act)| (act, i))
            .collect();

        debug!(
            "[CurveSet] Fitted {} actuator curves at resolution {}",
            curves.len(),
            resolution
        );

        Self { curves, index_of }
    }

    /// Curve for the actuator at dataset row `idx`
    pub fn by_row(&self, idx: usize) -> &ActuatorCurve {
        &self.curves[idx]
    }

    /// Curve for a given actuator identifier, if calibrated
    pub fn by_actuator(&self, act: i32) -> Option<&ActuatorCurve> {
        self.index_of.get(&act).map(|&i| &self.curves[i])
    }

    /// Number of curves in the arena
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// True when no actuators are calibrated
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
