//! Gati - Differential drive motion control and odometry
//!
//! Open-loop motion primitives and dead-reckoning pose estimation for a
//! small two-wheeled robot (Pololu 3pi+ class).
//!
//! ## Components
//!
//! - [`motion::DifferentialDrive`]: Validated, blocking and unbounded drive primitives
//! - [`odometry::Odometry`]: Pose integration from encoder deltas (optionally gyro heading)
//! - [`navigator::Navigator`]: Encoder/gyro sampling into a persistent pose
//! - [`pilot::Pilot`]: Segmented and closed-loop routines on top of both
//!
//! Hardware is reached only through the traits in [`drivers`].
//!
//! ## Features
//!
//! - `mock`: Simulated robot in [`devices::mock`] (enabled by default)

pub mod config;
pub mod core;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod motion;
pub mod navigator;
pub mod odometry;
pub mod pilot;

// Re-export commonly used types
pub use config::RobotConfig;
pub use core::{EncoderTotals, Pose2D, WheelCommand};
pub use error::{Error, Result};
pub use motion::{DifferentialDrive, MotionRequest, TurnDirection, TurnMode};
pub use navigator::Navigator;
pub use odometry::Odometry;
pub use pilot::Pilot;
