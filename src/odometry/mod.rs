//! Odometry estimation.
//!
//! - [`Odometry`]: Integrate encoder deltas (and optionally a gyro rate) into a pose
//! - [`GyroBiasEstimator`]: Zero-rate bias from stationary gyro samples

mod calibration;
mod wheel;

pub use calibration::GyroBiasEstimator;
pub use wheel::Odometry;
