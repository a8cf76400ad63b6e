// ClippingTracker - per-actuator clip state accumulated by conversions
//
// Requests outside an actuator's calibrated range are never an error: the
// engine substitutes the nearest in-range boundary value and records the fact
// here. Diagnostics read and reset this state between mirror steps to tell
// which actuators are being driven against their calibrated limits.

use serde::{Deserialize, Serialize};

/// Clip outcome for one actuator in the most recent conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipStatus {
    /// Request was below the calibrated range, clipped to the lower bound
    Low,
    /// Request was inside the calibrated range
    InRange,
    /// Request was above the calibrated range, clipped to the upper bound
    High,
}

impl ClipStatus {
    /// Signed integer encoding used by diagnostics: -1, 0, +1
    pub fn as_i8(self) -> i8 {
        match self {
            ClipStatus::Low => -1,
            ClipStatus::InRange => 0,
            ClipStatus::High => 1,
        }
    }
}

/// Per-actuator clip state owned by the Linearizer
///
/// `None` means unset: no conversion has run since construction or the last
/// reset. Every conversion overwrites the full vector (each call receives the
/// full actuator vector, so every actuator's state is refreshed together).
/// This is the one piece of mutable state in the engine; it carries no
/// validation of its own.
#[derive(Debug, Clone, Default)]
pub struct ClippingTracker {
    status: Option<Vec<ClipStatus>>,
}

impl ClippingTracker {
    /// Create a tracker in the unset state
    pub fn new() -> Self {
        Self { status: None }
    }

    /// Replace the full per-actuator status vector
    pub fn record(&mut self, status: Vec<ClipStatus>) {
        self.status = Some(status);
    }

    /// Current per-actuator status, or `None` if no conversion has run
    /// since the last reset
    pub fn status(&self) -> Option<&[ClipStatus]> {
        self.status.as_deref()
    }

    /// Signed integer view of the status for diagnostics (-1 / 0 / +1)
    pub fn status_i8(&self) -> Option<Vec<i8>> {
        self.status
            .as_ref()
            .map(|s| s.iter().map(|c| c.as_i8()).collect())
    }

    /// Clear all actuators back to unset
    pub fn reset(&mut self) {
        self.status = None;
    }
}
