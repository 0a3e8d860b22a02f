//! Ground-truth kinematics for the simulated robot

use crate::core::Pose2D;
use crate::core::math::normalize_angle;

/// True pose of the simulated robot
pub struct PhysicsState {
    x: f32,
    y: f32,
    theta: f32,
    track_width: f32,
}

impl PhysicsState {
    pub fn new(track_width: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
            track_width,
        }
    }

    pub fn pose(&self) -> Pose2D {
        Pose2D {
            x: self.x,
            y: self.y,
            theta: self.theta,
        }
    }

    /// Yaw rate (rad/s, CCW positive) for the given wheel velocities
    pub fn angular_rate(&self, left_vel: f32, right_vel: f32) -> f32 {
        (right_vel - left_vel) / self.track_width
    }

    /// Advance the pose by `dt` seconds of constant wheel velocities (m/s).
    ///
    /// Constant velocities trace an exact arc, so one step covers any `dt`.
    pub fn update(&mut self, left_vel: f32, right_vel: f32, dt: f32) {
        let linear = (left_vel + right_vel) / 2.0;
        let angular = self.angular_rate(left_vel, right_vel);

        if angular.abs() < 1e-6 {
            self.x += linear * self.theta.cos() * dt;
            self.y += linear * self.theta.sin() * dt;
        } else {
            let r = linear / angular;
            let new_theta = self.theta + angular * dt;
            self.x += r * (new_theta.sin() - self.theta.sin());
            self.y += r * (self.theta.cos() - new_theta.cos());
            self.theta = normalize_angle(new_theta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_straight() {
        let mut physics = PhysicsState::new(0.1);
        physics.update(0.2, 0.2, 5.0);
        assert_relative_eq!(physics.pose().x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(physics.pose().y, 0.0);
    }

    #[test]
    fn test_spin_in_place() {
        let mut physics = PhysicsState::new(0.1);
        // ω = 0.2 / 0.1 = 2 rad/s
        physics.update(-0.1, 0.1, PI / 4.0);
        assert_relative_eq!(physics.pose().theta, PI / 2.0, epsilon = 1e-5);
        assert_relative_eq!(physics.pose().x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(physics.pose().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_half_circle() {
        let mut physics = PhysicsState::new(0.1);
        // Left wheel still, right at 0.1 m/s: radius 0.05 m, ω = 1 rad/s
        physics.update(0.0, 0.1, PI);
        let pose = physics.pose();
        assert_relative_eq!(pose.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(pose.y, 0.1, epsilon = 1e-5);
        assert_relative_eq!(pose.theta.abs(), PI, epsilon = 1e-5);
    }
}
