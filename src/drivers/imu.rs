//! Gyroscope driver trait

/// Yaw-rate gyroscope.
///
/// Only the IMU-assisted navigator path consumes this.
pub trait GyroDriver: Send {
    /// Instantaneous z-axis angular rate in raw LSB.
    ///
    /// Scale to deg/s with the configured sensitivity
    /// (`NavigatorConfig::gyro_sensitivity_dps_per_lsb`).
    fn read_rate_z(&mut self) -> i16;
}
