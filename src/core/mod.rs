//! Foundation types and math.
//!
//! - [`math`]: Unit conversions, angle normalization, kinematic formulas
//! - [`types`]: Pose, wheel command, encoder delta/totals, telemetry snapshot

pub mod math;
pub mod types;

pub use types::{EncoderDelta, EncoderTotals, Pose2D, Telemetry, WheelCommand};
