//! Open-loop motion for the differential drivetrain
//!
//! - [`limits`]: Bounds every motion parameter is checked against
//! - [`commands`]: Motion request and direction types
//! - [`drive`]: Blocking and unbounded drive primitives

pub mod commands;
pub mod drive;
pub mod limits;

pub use commands::{MotionRequest, TurnDirection, TurnMode, Travel};
pub use drive::DifferentialDrive;
pub use limits::MotionLimits;
