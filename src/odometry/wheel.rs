//! Dead-reckoning pose integration from wheel encoder deltas.
//!
//! # Differential Drive Kinematics
//!
//! ```text
//! Δl, Δr = π · D · Δcounts / counts_per_wheel_rev     (per wheel)
//! Δθ     = (Δr − Δl) / track_width                     (encoder path)
//! Δθ     = rate_dps · π/180 · dt                       (gyro path)
//! θ     ← normalize(θ + Δθ)
//! x     += (Δl + Δr)/2 · cos θ
//! y     += (Δl + Δr)/2 · sin θ
//! ```
//!
//! Translation is evaluated at the already updated heading.

use crate::config::OdometryConfig;
use crate::core::math::{
    gyro_heading_delta, heading_delta, normalize_angle, planar_displacement, wheel_arc_length,
};
use crate::core::{EncoderDelta, Pose2D};
use crate::error::Result;

/// Stateless odometry engine.
///
/// Holds only the immutable geometry. The pose it updates is owned by the
/// caller, so two calls with the same inputs always do the same thing.
#[derive(Debug, Clone)]
pub struct Odometry {
    config: OdometryConfig,
    left_counts_per_rev: f32,
    right_counts_per_rev: f32,
}

impl Odometry {
    /// Create an engine, rejecting geometry that would divide by zero.
    pub fn new(config: OdometryConfig) -> Result<Self> {
        config.validate()?;

        let left_counts_per_rev = config.left_counts_per_wheel_rev();
        let right_counts_per_rev = config.right_counts_per_wheel_rev();

        log::debug!(
            "Odometry: Initialized counts/rev=({:.0}, {:.0}), wheel_d=({:.4}, {:.4})m, track={:.4}m",
            left_counts_per_rev,
            right_counts_per_rev,
            config.wheel_diameter_left_m,
            config.wheel_diameter_right_m,
            config.track_width_m
        );

        Ok(Self {
            config,
            left_counts_per_rev,
            right_counts_per_rev,
        })
    }

    pub fn config(&self) -> &OdometryConfig {
        &self.config
    }

    /// Linear travel of each wheel in meters for an encoder delta.
    pub fn wheel_travel(&self, delta: EncoderDelta) -> (f32, f32) {
        (
            wheel_arc_length(
                delta.left,
                self.config.wheel_diameter_left_m,
                self.left_counts_per_rev,
            ),
            wheel_arc_length(
                delta.right,
                self.config.wheel_diameter_right_m,
                self.right_counts_per_rev,
            ),
        )
    }

    /// Encoder-only update.
    ///
    /// Heading comes from the wheel difference plus the configured
    /// per-update correction. A zero delta only normalizes the heading, so
    /// a pose already in (-π, π] is left bit-for-bit untouched.
    pub fn update_odom(&self, delta_left: i32, delta_right: i32, pose: &mut Pose2D) {
        let delta = EncoderDelta::new(delta_left, delta_right);
        if delta.is_zero() {
            pose.theta = normalize_angle(pose.theta);
            return;
        }

        let (d_left, d_right) = self.wheel_travel(delta);
        let d_theta = heading_delta(d_right, d_left, self.config.track_width_m)
            + self.config.heading_correction_rad;
        integrate(d_left, d_right, d_theta, pose);

        log::trace!(
            "Odometry: delta=({}, {}) -> pose=({:.4}, {:.4}, {:.4})",
            delta_left,
            delta_right,
            pose.x,
            pose.y,
            pose.theta
        );
    }

    /// Gyro-assisted update.
    ///
    /// Heading comes from the bias-corrected gyro rate integrated over
    /// `dt_s`; translation still comes from the wheels.
    pub fn update_odom_imu(
        &self,
        delta_left: i32,
        delta_right: i32,
        gyro_rate_deg_per_s: f32,
        dt_s: f32,
        pose: &mut Pose2D,
    ) {
        let (d_left, d_right) = self.wheel_travel(EncoderDelta::new(delta_left, delta_right));
        let d_theta = gyro_heading_delta(gyro_rate_deg_per_s, dt_s);
        integrate(d_left, d_right, d_theta, pose);

        log::trace!(
            "Odometry: delta=({}, {}), gyro={:.3}dps over {:.4}s -> pose=({:.4}, {:.4}, {:.4})",
            delta_left,
            delta_right,
            gyro_rate_deg_per_s,
            dt_s,
            pose.x,
            pose.y,
            pose.theta
        );
    }
}

fn integrate(d_left: f32, d_right: f32, d_theta: f32, pose: &mut Pose2D) {
    pose.theta = normalize_angle(pose.theta + d_theta);
    let (dx, dy) = planar_displacement(d_left, d_right, pose.theta);
    pose.x += dx;
    pose.y += dy;
}
