//! Motion request definitions

/// How the first argument of an in-place turn is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnMode {
    /// Value is a rotation angle in radians; duration comes from the wheelbase formula
    Angle,
    /// Value is a duration in seconds, used as-is
    #[default]
    Duration,
}

/// Side the robot turns toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    /// Counter-clockwise (right wheel is the outer wheel)
    Left,
    /// Clockwise (left wheel is the outer wheel)
    Right,
}

/// Direction of travel along the robot's heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    Forward,
    Backward,
}

impl Travel {
    /// +1 for forward, -1 for backward
    #[inline]
    pub fn sign(self) -> i16 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// One blocking motion primitive.
///
/// All magnitudes are non-negative; direction is carried by the variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionRequest {
    /// Straight line forward
    Forward {
        /// Distance in meters
        distance_m: f32,
        /// Wheel speed in m/s
        speed_m_per_s: f32,
    },

    /// Straight line backward
    Backward {
        /// Distance in meters
        distance_m: f32,
        /// Wheel speed in m/s
        speed_m_per_s: f32,
    },

    /// In-place counter-clockwise rotation
    TurnLeft {
        /// Angle (rad) or duration (s), per `mode`
        value: f32,
        /// Wheel speed in m/s
        speed_m_per_s: f32,
        mode: TurnMode,
    },

    /// In-place clockwise rotation
    TurnRight {
        /// Angle (rad) or duration (s), per `mode`
        value: f32,
        /// Wheel speed in m/s
        speed_m_per_s: f32,
        mode: TurnMode,
    },

    /// Curved motion forward
    ArcForward {
        /// Distance along the outer wheel in meters
        distance_m: f32,
        /// Outer wheel speed in m/s
        speed_m_per_s: f32,
        direction: TurnDirection,
    },

    /// Curved motion backward
    ArcBackward {
        /// Distance along the outer wheel in meters
        distance_m: f32,
        /// Outer wheel speed in m/s
        speed_m_per_s: f32,
        direction: TurnDirection,
    },
}

impl MotionRequest {
    /// Short name for logging
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::Forward { .. } => "forward",
            Self::Backward { .. } => "backward",
            Self::TurnLeft { .. } => "turn_left",
            Self::TurnRight { .. } => "turn_right",
            Self::ArcForward { .. } => "arc_forward",
            Self::ArcBackward { .. } => "arc_backward",
        }
    }

    /// True for in-place rotations
    pub fn is_rotation(&self) -> bool {
        matches!(self, Self::TurnLeft { .. } | Self::TurnRight { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_type() {
        let req = MotionRequest::ArcBackward {
            distance_m: 0.5,
            speed_m_per_s: 0.2,
            direction: TurnDirection::Left,
        };
        assert_eq!(req.command_type(), "arc_backward");
        assert!(!req.is_rotation());

        let req = MotionRequest::TurnRight {
            value: 1.0,
            speed_m_per_s: 0.1,
            mode: TurnMode::Angle,
        };
        assert_eq!(req.command_type(), "turn_right");
        assert!(req.is_rotation());
    }

    #[test]
    fn test_defaults_and_signs() {
        assert_eq!(TurnMode::default(), TurnMode::Duration);
        assert_eq!(Travel::Forward.sign(), 1);
        assert_eq!(Travel::Backward.sign(), -1);
    }
}
