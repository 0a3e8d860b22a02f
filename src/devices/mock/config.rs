//! Simulated robot parameters
//!
//! Defaults match the Pololu 3pi+ 75:1 build:
//!
//! | Parameter | Default |
//! |-----------|---------|
//! | wheel diameter | 0.032 m |
//! | track width | 0.098 m |
//! | counts per wheel rev | 900 |
//! | gyro sensitivity | 0.07 dps/LSB |
//! | gyro noise, wheel slip | none |
//! | noise seed | 42 |

use crate::config::RobotConfig;

/// Physical parameters of the simulated robot
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Left wheel diameter (m)
    pub wheel_diameter_left_m: f32,
    /// Right wheel diameter (m)
    pub wheel_diameter_right_m: f32,
    /// Wheel center-to-center distance (m)
    pub track_width_m: f32,
    /// Left encoder counts per wheel revolution
    pub left_counts_per_wheel_rev: f32,
    /// Right encoder counts per wheel revolution
    pub right_counts_per_wheel_rev: f32,
    /// Left motor wired backwards (positive command spins the wheel backward)
    pub invert_left_motor: bool,
    /// Right motor wired backwards
    pub invert_right_motor: bool,
    /// Gyro scale (deg/s per LSB)
    pub gyro_sensitivity_dps_per_lsb: f32,
    /// Constant zero-rate offset added to every gyro reading (LSB)
    pub gyro_bias_lsb: f32,
    /// Gaussian noise standard deviation on every gyro reading (LSB)
    pub gyro_noise_lsb: f32,
    /// Constant multiplicative error on right wheel travel (0.0 = none, 0.01 = 1% long)
    pub right_wheel_slip: f32,
    /// Gaussian slip per wheel per time step, as a fraction of travel
    pub wheel_slip_stddev: f32,
    /// Noise seed (0 = different noise each run)
    pub noise_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            wheel_diameter_left_m: 0.032,
            wheel_diameter_right_m: 0.032,
            track_width_m: 0.098,
            left_counts_per_wheel_rev: 900.0,
            right_counts_per_wheel_rev: 900.0,
            invert_left_motor: false,
            invert_right_motor: false,
            gyro_sensitivity_dps_per_lsb: 0.07,
            gyro_bias_lsb: 0.0,
            gyro_noise_lsb: 0.0,
            right_wheel_slip: 0.0,
            wheel_slip_stddev: 0.0,
            noise_seed: 42,
        }
    }
}

impl SimConfig {
    /// Robot whose physics match the configured geometry exactly.
    ///
    /// Motors are wired the way the drive's flip flags expect, so a
    /// correctly configured drive moves the robot in the commanded direction.
    pub fn from_robot_config(config: &RobotConfig) -> Self {
        Self {
            wheel_diameter_left_m: config.odometry.wheel_diameter_left_m,
            wheel_diameter_right_m: config.odometry.wheel_diameter_right_m,
            track_width_m: config.odometry.track_width_m,
            left_counts_per_wheel_rev: config.odometry.left_counts_per_wheel_rev(),
            right_counts_per_wheel_rev: config.odometry.right_counts_per_wheel_rev(),
            invert_left_motor: config.drive.flip_left_motor,
            invert_right_motor: config.drive.flip_right_motor,
            gyro_sensitivity_dps_per_lsb: config.navigator.gyro_sensitivity_dps_per_lsb,
            ..Self::default()
        }
    }

    /// Encoder ticks per meter of left wheel travel
    pub fn left_ticks_per_meter(&self) -> f32 {
        self.left_counts_per_wheel_rev / (std::f32::consts::PI * self.wheel_diameter_left_m)
    }

    /// Encoder ticks per meter of right wheel travel
    pub fn right_ticks_per_meter(&self) -> f32 {
        self.right_counts_per_wheel_rev / (std::f32::consts::PI * self.wheel_diameter_right_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_robot_config() {
        let mut config = RobotConfig::default();
        config.drive.flip_right_motor = true;
        config.odometry.track_width_m = 0.1;

        let sim = SimConfig::from_robot_config(&config);
        assert!(sim.invert_right_motor);
        assert!(!sim.invert_left_motor);
        assert_eq!(sim.track_width_m, 0.1);
        assert_eq!(sim.left_counts_per_wheel_rev, 900.0);
    }

    #[test]
    fn test_ticks_per_meter() {
        let sim = SimConfig::default();
        assert_relative_eq!(sim.left_ticks_per_meter(), 8952.465, epsilon = 0.01);
    }
}
