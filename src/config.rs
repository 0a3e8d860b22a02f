//! Configuration for Gati
//!
//! All tunables live in one TOML file with a section per component.
//! Every field has a default matching the Pololu 3pi+ robot, so an empty
//! file is a valid configuration.
//!
//! ```toml
//! revision = "current"       # or "lab1"
//!
//! [drive]
//! turn_speed_ratio = 0.5
//! wheelbase_mm = 98.0
//!
//! [odometry]
//! wheel_diameter_left_m = 0.032
//! track_width_m = 0.098
//!
//! [navigator]
//! use_imu = false
//!
//! [pilot]
//! segment_m = 0.1
//! segment_deg = 15.0
//! ```
//!
//! `revision` picks the baseline defaults; keys present in the file
//! override them.

use crate::core::math::{counts_per_wheel_rev, in_range};
use crate::error::{Error, Result};
use crate::motion::MotionLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Hardware revision whose documented defaults seed the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigRevision {
    /// First lab build: 96 mm wheelbase
    Lab1,
    /// Current build: 98 mm wheelbase
    #[default]
    Current,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RobotConfig {
    /// Revision the defaults were taken from
    #[serde(default)]
    pub revision: ConfigRevision,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub limits: MotionLimits,
    #[serde(default)]
    pub odometry: OdometryConfig,
    #[serde(default)]
    pub navigator: NavigatorConfig,
    #[serde(default)]
    pub pilot: PilotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Drivetrain configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DriveConfig {
    /// Inner wheel speed as a fraction of outer wheel speed during curved motion [0, 1]
    #[serde(default = "default_turn_speed_ratio")]
    pub turn_speed_ratio: f32,

    /// Distance between wheel centers in millimeters (0, 1000]
    #[serde(default = "default_wheelbase_mm")]
    pub wheelbase_mm: f32,

    /// Left motor is wired backwards
    #[serde(default)]
    pub flip_left_motor: bool,

    /// Right motor is wired backwards
    #[serde(default)]
    pub flip_right_motor: bool,

    /// Largest device speed the motor driver accepts (commands are clamped to ±this)
    #[serde(default = "default_max_device_speed")]
    pub max_device_speed: i16,
}

/// Wheel odometry geometry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OdometryConfig {
    /// Left wheel diameter in meters
    #[serde(default = "default_wheel_diameter_m")]
    pub wheel_diameter_left_m: f32,

    /// Right wheel diameter in meters
    #[serde(default = "default_wheel_diameter_m")]
    pub wheel_diameter_right_m: f32,

    /// Wheel center-to-center distance in meters
    #[serde(default = "default_track_width_m")]
    pub track_width_m: f32,

    /// Left encoder counts per motor shaft revolution
    #[serde(default = "default_counts_per_motor_rev")]
    pub encoder_left_counts_per_motor_rev: u32,

    /// Right encoder counts per motor shaft revolution
    #[serde(default = "default_counts_per_motor_rev")]
    pub encoder_right_counts_per_motor_rev: u32,

    /// Gear ratio: motor revolutions per wheel revolution
    #[serde(default = "default_motor_revs_per_wheel_rev")]
    pub motor_revs_per_wheel_rev: f32,

    /// Additive heading correction per encoder-only update (radians).
    ///
    /// Measured as the average IMU-minus-wheel heading error; 0 disables it.
    /// Never applied on the IMU-assisted path.
    #[serde(default)]
    pub heading_correction_rad: f32,
}

/// Navigator sampling configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NavigatorConfig {
    /// Use the gyro for the heading term
    #[serde(default)]
    pub use_imu: bool,

    /// Gyro sensitivity in deg/s per raw LSB (0.07 at ±2000 dps full scale)
    #[serde(default = "default_gyro_sensitivity")]
    pub gyro_sensitivity_dps_per_lsb: f32,

    /// Stationary samples averaged for the gyro bias
    #[serde(default = "default_imu_cal_samples")]
    pub imu_cal_samples: usize,

    /// Delay between calibration samples in milliseconds
    #[serde(default = "default_imu_cal_delay_ms")]
    pub imu_cal_delay_ms: u32,
}

/// Routine-level motion settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PilotConfig {
    /// Straight segment length between navigator updates (m)
    #[serde(default = "default_segment_m")]
    pub segment_m: f32,

    /// Rotation segment between navigator updates (degrees)
    #[serde(default = "default_segment_deg")]
    pub segment_deg: f32,

    /// Navigator polling period for closed-loop moves (ms)
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u32,

    /// Closed-loop timeout as a multiple of the open-loop duration
    #[serde(default = "default_timeout_factor")]
    pub timeout_factor: f32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_turn_speed_ratio() -> f32 {
    0.5
}
fn default_wheelbase_mm() -> f32 {
    98.0
}
fn default_max_device_speed() -> i16 {
    400
}
fn default_wheel_diameter_m() -> f32 {
    0.032
}
fn default_track_width_m() -> f32 {
    0.098
}
fn default_counts_per_motor_rev() -> u32 {
    12
}
fn default_motor_revs_per_wheel_rev() -> f32 {
    75.0
}
fn default_gyro_sensitivity() -> f32 {
    0.07
}
fn default_imu_cal_samples() -> usize {
    200
}
fn default_imu_cal_delay_ms() -> u32 {
    2
}
fn default_segment_m() -> f32 {
    0.1
}
fn default_segment_deg() -> f32 {
    15.0
}
fn default_poll_ms() -> u32 {
    10
}
fn default_timeout_factor() -> f32 {
    2.0
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            turn_speed_ratio: default_turn_speed_ratio(),
            wheelbase_mm: default_wheelbase_mm(),
            flip_left_motor: false,
            flip_right_motor: false,
            max_device_speed: default_max_device_speed(),
        }
    }
}

impl DriveConfig {
    /// Valid range of the turn speed ratio
    pub const TURN_SPEED_RATIO_RANGE: (f32, f32) = (0.0, 1.0);
    /// Upper bound of the wheelbase in millimeters (lower bound is exclusive 0)
    pub const MAX_WHEELBASE_MM: f32 = 1000.0;

    /// Check every field
    pub fn validate(&self) -> Result<()> {
        let (min, max) = Self::TURN_SPEED_RATIO_RANGE;
        if !in_range(self.turn_speed_ratio, min, max) {
            return Err(Error::InvalidConfig(format!(
                "drive.turn_speed_ratio={} outside [{}, {}]",
                self.turn_speed_ratio, min, max
            )));
        }
        if !(self.wheelbase_mm > 0.0 && self.wheelbase_mm <= Self::MAX_WHEELBASE_MM) {
            return Err(Error::InvalidConfig(format!(
                "drive.wheelbase_mm={} outside (0, {}]",
                self.wheelbase_mm,
                Self::MAX_WHEELBASE_MM
            )));
        }
        if self.max_device_speed <= 0 {
            return Err(Error::InvalidConfig(format!(
                "drive.max_device_speed={} must be positive",
                self.max_device_speed
            )));
        }
        Ok(())
    }
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            wheel_diameter_left_m: default_wheel_diameter_m(),
            wheel_diameter_right_m: default_wheel_diameter_m(),
            track_width_m: default_track_width_m(),
            encoder_left_counts_per_motor_rev: default_counts_per_motor_rev(),
            encoder_right_counts_per_motor_rev: default_counts_per_motor_rev(),
            motor_revs_per_wheel_rev: default_motor_revs_per_wheel_rev(),
            heading_correction_rad: 0.0,
        }
    }
}

impl OdometryConfig {
    /// Left encoder counts per wheel revolution
    pub fn left_counts_per_wheel_rev(&self) -> f32 {
        counts_per_wheel_rev(
            self.encoder_left_counts_per_motor_rev,
            self.motor_revs_per_wheel_rev,
        )
    }

    /// Right encoder counts per wheel revolution
    pub fn right_counts_per_wheel_rev(&self) -> f32 {
        counts_per_wheel_rev(
            self.encoder_right_counts_per_motor_rev,
            self.motor_revs_per_wheel_rev,
        )
    }

    /// Reject geometry that would later divide by zero or flip signs.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("odometry.wheel_diameter_left_m", self.wheel_diameter_left_m),
            ("odometry.wheel_diameter_right_m", self.wheel_diameter_right_m),
            ("odometry.track_width_m", self.track_width_m),
            (
                "odometry.motor_revs_per_wheel_rev",
                self.motor_revs_per_wheel_rev,
            ),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{}={} must be positive",
                    name, value
                )));
            }
        }
        if self.encoder_left_counts_per_motor_rev == 0
            || self.encoder_right_counts_per_motor_rev == 0
        {
            return Err(Error::InvalidConfig(
                "odometry encoder counts per motor revolution must be non-zero".to_string(),
            ));
        }
        if !self.heading_correction_rad.is_finite() {
            return Err(Error::InvalidConfig(
                "odometry.heading_correction_rad must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            use_imu: false,
            gyro_sensitivity_dps_per_lsb: default_gyro_sensitivity(),
            imu_cal_samples: default_imu_cal_samples(),
            imu_cal_delay_ms: default_imu_cal_delay_ms(),
        }
    }
}

impl NavigatorConfig {
    /// Check every field
    pub fn validate(&self) -> Result<()> {
        if !(self.gyro_sensitivity_dps_per_lsb.is_finite()
            && self.gyro_sensitivity_dps_per_lsb > 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "navigator.gyro_sensitivity_dps_per_lsb={} must be positive",
                self.gyro_sensitivity_dps_per_lsb
            )));
        }
        if self.imu_cal_samples == 0 {
            return Err(Error::InvalidConfig(
                "navigator.imu_cal_samples must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            segment_m: default_segment_m(),
            segment_deg: default_segment_deg(),
            poll_ms: default_poll_ms(),
            timeout_factor: default_timeout_factor(),
        }
    }
}

impl PilotConfig {
    /// Check every field
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pilot.segment_m", self.segment_m),
            ("pilot.segment_deg", self.segment_deg),
            ("pilot.timeout_factor", self.timeout_factor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{}={} must be positive",
                    name, value
                )));
            }
        }
        if self.timeout_factor < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "pilot.timeout_factor={} must be at least 1",
                self.timeout_factor
            )));
        }
        if self.poll_ms == 0 {
            return Err(Error::InvalidConfig(
                "pilot.poll_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl RobotConfig {
    /// Documented defaults for a hardware revision
    pub fn for_revision(revision: ConfigRevision) -> Self {
        let mut config = Self {
            revision,
            drive: DriveConfig::default(),
            limits: MotionLimits::default(),
            odometry: OdometryConfig::default(),
            navigator: NavigatorConfig::default(),
            pilot: PilotConfig::default(),
            logging: LoggingConfig::default(),
        };
        if revision == ConfigRevision::Lab1 {
            config.drive.wheelbase_mm = 96.0;
        }
        config
    }

    /// Parse TOML, layering the file's keys over its revision's defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let overrides: toml::Table = toml::from_str(contents)?;
        let revision = match overrides.get("revision") {
            Some(value) => value.clone().try_into::<ConfigRevision>()?,
            None => ConfigRevision::default(),
        };

        let mut merged = toml::Table::try_from(Self::for_revision(revision))?;
        merge_tables(&mut merged, overrides);
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Load configuration from TOML file (no validation)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load and validate configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.drive.validate()?;
        self.limits.validate()?;
        self.odometry.validate()?;
        self.navigator.validate()?;
        self.pilot.validate()?;
        Ok(())
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::for_revision(ConfigRevision::default())
    }
}

/// Recursively overlay `overrides` onto `base`.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match value {
            toml::Value::Table(over) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, over);
                } else {
                    base.insert(key, toml::Value::Table(over));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}
