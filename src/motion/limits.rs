//! Motion parameter bounds
//!
//! Every distance, speed, angle and duration handed to the drivetrain is
//! checked against these inclusive ranges before any wheel moves.

use crate::core::math::in_range;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Inclusive upper bounds for motion parameters (lower bound is always 0)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MotionLimits {
    /// Maximum travel distance per primitive (m)
    #[serde(default = "default_max_distance_m")]
    pub max_distance_m: f32,

    /// Maximum wheel speed (m/s)
    #[serde(default = "default_max_speed_m_per_s")]
    pub max_speed_m_per_s: f32,

    /// Maximum in-place rotation per primitive (rad)
    #[serde(default = "default_max_angle_rad")]
    pub max_angle_rad: f32,

    /// Maximum duration of a timed rotation (s)
    #[serde(default = "default_max_duration_s")]
    pub max_duration_s: f32,
}

fn default_max_distance_m() -> f32 {
    100.0
}
fn default_max_speed_m_per_s() -> f32 {
    0.4
}
fn default_max_angle_rad() -> f32 {
    TAU
}
fn default_max_duration_s() -> f32 {
    60.0
}

impl Default for MotionLimits {
    fn default() -> Self {
        Self {
            max_distance_m: default_max_distance_m(),
            max_speed_m_per_s: default_max_speed_m_per_s(),
            max_angle_rad: default_max_angle_rad(),
            max_duration_s: default_max_duration_s(),
        }
    }
}

impl MotionLimits {
    /// Check that every bound is a positive finite number
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("limits.max_distance_m", self.max_distance_m),
            ("limits.max_speed_m_per_s", self.max_speed_m_per_s),
            ("limits.max_angle_rad", self.max_angle_rad),
            ("limits.max_duration_s", self.max_duration_s),
        ];
        for (name, value) in bounds {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{}={} must be positive",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn check_distance(&self, distance_m: f32) -> Result<()> {
        check("distance_m", distance_m, self.max_distance_m)
    }

    pub fn check_speed(&self, speed_m_per_s: f32) -> Result<()> {
        check("speed_m_per_s", speed_m_per_s, self.max_speed_m_per_s)
    }

    pub fn check_angle(&self, angle_rad: f32) -> Result<()> {
        check("angle_rad", angle_rad, self.max_angle_rad)
    }

    pub fn check_duration(&self, duration_s: f32) -> Result<()> {
        check("duration_s", duration_s, self.max_duration_s)
    }
}

fn check(name: &'static str, value: f32, max: f32) -> Result<()> {
    if in_range(value, 0.0, max) {
        Ok(())
    } else {
        Err(Error::OutOfRange {
            name,
            value,
            min: 0.0,
            max,
        })
    }
}
