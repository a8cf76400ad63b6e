// DM Linearizer - actuator command linearization engine
// Converts between physical deflections and drive commands for deformable
// mirror / SLM actuators, using per-actuator calibration curves.

// Module declarations
pub mod clipping;
pub mod config;
pub mod curve;
pub mod dataset;
pub mod error;
pub mod linearizer;
pub mod persistence;
pub mod spline;

// Re-exports for convenience
pub use clipping::{ClipStatus, ClippingTracker};
pub use config::EngineConfig;
pub use dataset::CalibrationDataset;
pub use error::{ConversionError, DatasetError, ErrorCode, PersistenceError};
pub use linearizer::Linearizer;
