//! Configuration management for engine parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling adjustment of the calibration resolution without recompilation.
//! The defaults match the resolution the calibration curves were designed
//! around and are what production deployments should normally use.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of resampled points per actuator calibration curve
pub const DEFAULT_CALIBRATION_POINTS: usize = 10_000;

/// Linearization engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of equally spaced samples in each actuator's resampled
    /// command/deflection lookup table
    pub calibration_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calibration_points: DEFAULT_CALIBRATION_POINTS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// cannot be parsed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
