//! Pose, wheel command and encoder types shared across the crate.

use crate::core::math::normalize_angle;
use serde::{Deserialize, Serialize};

/// Robot pose in the world frame.
///
/// Position (x, y) in meters and heading (theta) in radians.
/// Theta is kept in (-π, π].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, normalized to (-π, π]
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose with theta normalized to (-π, π].
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Straight-line distance to another pose.
    #[inline]
    pub fn distance_to(&self, other: &Pose2D) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Signed wheel speeds in motor device units (1 unit ≈ 1 mm/s).
///
/// Produced per drive call and never persisted. Sign is direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WheelCommand {
    /// Left wheel speed
    pub left: i16,
    /// Right wheel speed
    pub right: i16,
}

impl WheelCommand {
    /// Create a new wheel command
    #[inline]
    pub fn new(left: i16, right: i16) -> Self {
        Self { left, right }
    }

    /// Both wheels stopped
    #[inline]
    pub fn halt() -> Self {
        Self::default()
    }

    /// Both wheels at the same signed speed
    #[inline]
    pub fn straight(speed: i16) -> Self {
        Self::new(speed, speed)
    }

    /// Wheels at equal and opposite speeds (positive = counter-clockwise)
    #[inline]
    pub fn spin(speed: i16) -> Self {
        Self::new(-speed, speed)
    }

    /// True when both wheels are stopped
    #[inline]
    pub fn is_halt(&self) -> bool {
        self.left == 0 && self.right == 0
    }

    /// Clamp both speeds to `[-max, max]`.
    #[inline]
    pub fn clamped(self, max: i16) -> Self {
        let max = max.abs();
        Self::new(self.left.clamp(-max, max), self.right.clamp(-max, max))
    }
}

/// Encoder ticks counted since the previous sample, one per wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderDelta {
    /// Left wheel ticks
    pub left: i32,
    /// Right wheel ticks
    pub right: i32,
}

impl EncoderDelta {
    /// Create a new encoder delta
    #[inline]
    pub fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// True when neither wheel moved
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

/// Cumulative encoder ticks since the last navigator reset.
///
/// 64-bit so long runs never wrap, unlike the 16-bit hardware counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncoderTotals {
    /// Left wheel total
    pub left: i64,
    /// Right wheel total
    pub right: i64,
}

impl EncoderTotals {
    /// Add a per-update delta.
    #[inline]
    pub fn accumulate(&mut self, delta: EncoderDelta) {
        self.left += delta.left as i64;
        self.right += delta.right as i64;
    }
}

/// Snapshot pushed to the display/telemetry boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    /// Current pose estimate
    pub pose: Pose2D,
    /// Cumulative encoder totals
    pub encoders: EncoderTotals,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_pose_new_normalizes() {
        let pose = Pose2D::new(1.0, 2.0, 3.0 * PI / 2.0);
        assert!((pose.theta + PI / 2.0).abs() < 1e-5);
        assert_eq!(Pose2D::new(0.0, 0.0, -PI).theta, PI);
    }

    #[test]
    fn test_pose_distance() {
        let a = Pose2D::identity();
        let b = Pose2D::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_wheel_command_shapes() {
        assert_eq!(WheelCommand::straight(200), WheelCommand::new(200, 200));
        assert_eq!(WheelCommand::spin(100), WheelCommand::new(-100, 100));
        assert!(WheelCommand::halt().is_halt());
        assert!(!WheelCommand::spin(1).is_halt());
    }

    #[test]
    fn test_wheel_command_clamp() {
        let cmd = WheelCommand::new(500, -900).clamped(400);
        assert_eq!(cmd, WheelCommand::new(400, -400));
    }

    #[test]
    fn test_encoder_totals_accumulate() {
        let mut totals = EncoderTotals::default();
        totals.accumulate(EncoderDelta::new(i16::MAX as i32, -5));
        totals.accumulate(EncoderDelta::new(i16::MAX as i32, -5));
        assert_eq!(totals.left, 2 * i16::MAX as i64);
        assert_eq!(totals.right, -10);
    }
}
