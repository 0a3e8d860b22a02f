//! Motion routines built on the drivetrain and the navigator
//!
//! Two styles:
//! - **Segmented**: split a long move into short blocking primitives and
//!   update/publish the pose after each one. Keeps the 16-bit encoder
//!   counters drained and gives a pose trace along the way.
//! - **Closed-loop**: start an unbounded primitive, poll the navigator, and
//!   halt once the measured travel reaches the target (or a timeout expires).
//!
//! The gyro is sampled only on `Navigator::update`, so with the gyro enabled
//! the closed-loop routines are the ones that see the rotation; a blocking
//! primitive halts before the next update.

use crate::config::PilotConfig;
use crate::core::Pose2D;
use crate::core::math::{
    meters_per_s_to_device_speed, mm_per_s_to_meters_per_s, motion_duration_ms, normalize_angle,
    seconds_to_ms, turn_duration_s,
};
use crate::drivers::{Clock, TelemetrySink};
use crate::error::{Error, Result};
use crate::motion::{DifferentialDrive, TurnDirection, TurnMode};
use crate::navigator::Navigator;
use std::f32::consts::FRAC_PI_2;

/// Remaining travel below which a segmented move is complete (m or rad)
const SEGMENT_EPSILON: f32 = 1e-4;

/// Why a closed-loop move stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Measured travel reached the target
    Reached,
    /// Timeout expired first
    TimedOut,
}

/// Result of a closed-loop move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    pub termination: Termination,
    /// Pose after the final halt
    pub pose: Pose2D,
    /// Measured travel (m for drives, rad for rotations)
    pub traveled: f32,
    /// Time from start to halt
    pub elapsed_ms: u32,
}

/// Drivetrain plus navigator, driven as one robot.
pub struct Pilot {
    drive: DifferentialDrive,
    navigator: Navigator,
    clock: Box<dyn Clock>,
    config: PilotConfig,
}

impl Pilot {
    pub fn new(
        drive: DifferentialDrive,
        navigator: Navigator,
        clock: Box<dyn Clock>,
        config: PilotConfig,
    ) -> Self {
        Self {
            drive,
            navigator,
            clock,
            config,
        }
    }

    pub fn drive(&self) -> &DifferentialDrive {
        &self.drive
    }

    pub fn drive_mut(&mut self) -> &mut DifferentialDrive {
        &mut self.drive
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn pose(&self) -> Pose2D {
        self.navigator.pose()
    }

    pub fn halt(&mut self) {
        self.drive.halt();
    }

    /// Halt, then zero the pose and encoder totals.
    pub fn reset(&mut self) {
        self.drive.halt();
        self.navigator.reset();
    }

    // ========================================================================
    // Segmented routines
    // ========================================================================

    /// Drive `distance_m` (negative = backward) in `segment_m` pieces,
    /// updating and publishing the pose after each piece.
    pub fn drive_segmented(
        &mut self,
        distance_m: f32,
        speed_m_per_s: f32,
        sink: &mut dyn TelemetrySink,
    ) -> Result<Pose2D> {
        let backward = distance_m < 0.0;
        let target = distance_m.abs();
        self.checked(self.drive.limits().check_distance(target))?;

        log::info!(
            "Pilot: Segmented {} {:.3}m at {:.3}m/s",
            if backward { "backward" } else { "forward" },
            target,
            speed_m_per_s
        );

        let mut remaining = target;
        while remaining > SEGMENT_EPSILON {
            let step = remaining.min(self.config.segment_m);
            if backward {
                self.drive.move_backward(step, speed_m_per_s)?;
            } else {
                self.drive.move_forward(step, speed_m_per_s)?;
            }
            self.navigator.update();
            self.navigator.publish(sink);
            remaining -= step;
        }
        Ok(self.navigator.pose())
    }

    /// Rotate `angle_rad` in place (positive = counter-clockwise) in
    /// `segment_deg` pieces, updating and publishing after each piece.
    pub fn rotate_segmented(
        &mut self,
        angle_rad: f32,
        speed_m_per_s: f32,
        sink: &mut dyn TelemetrySink,
    ) -> Result<Pose2D> {
        let left = angle_rad >= 0.0;
        let target = angle_rad.abs();
        self.checked(self.drive.limits().check_angle(target))?;

        log::info!(
            "Pilot: Segmented rotate {:.2}deg at {:.3}m/s",
            angle_rad.to_degrees(),
            speed_m_per_s
        );

        let segment = self.config.segment_deg.to_radians();
        let mut remaining = target;
        while remaining > SEGMENT_EPSILON {
            let step = remaining.min(segment);
            if left {
                self.drive.turn_left(step, speed_m_per_s, TurnMode::Angle)?;
            } else {
                self.drive.turn_right(step, speed_m_per_s, TurnMode::Angle)?;
            }
            self.navigator.update();
            self.navigator.publish(sink);
            remaining -= step;
        }
        Ok(self.navigator.pose())
    }

    /// Drive a square: four sides, each followed by a 90° turn toward `direction`.
    pub fn square(
        &mut self,
        side_m: f32,
        speed_m_per_s: f32,
        direction: TurnDirection,
        sink: &mut dyn TelemetrySink,
    ) -> Result<Pose2D> {
        let corner = match direction {
            TurnDirection::Left => FRAC_PI_2,
            TurnDirection::Right => -FRAC_PI_2,
        };
        log::info!("Pilot: Square {:.3}m, turning {:?}", side_m, direction);

        for _ in 0..4 {
            self.drive_segmented(side_m, speed_m_per_s, sink)?;
            self.rotate_segmented(corner, speed_m_per_s, sink)?;
        }
        Ok(self.navigator.pose())
    }

    // ========================================================================
    // Closed-loop routines
    // ========================================================================

    /// Drive until the navigator measures `distance_m` of straight-line
    /// travel (negative = backward), then halt.
    pub fn drive_distance(&mut self, distance_m: f32, speed_m_per_s: f32) -> Result<MoveOutcome> {
        let backward = distance_m < 0.0;
        let target = distance_m.abs();
        self.checked(self.drive.limits().check_distance(target))?;
        self.checked(self.drive.limits().check_speed(speed_m_per_s))?;

        let start = self.navigator.update();
        if target == 0.0 {
            return Ok(self.outcome(Termination::Reached, 0.0, 0));
        }

        let speed = meters_per_s_to_device_speed(speed_m_per_s);
        let expected_ms = motion_duration_ms(target, mm_per_s_to_meters_per_s(speed as f32));
        let timeout_ms = self.checked(self.timeout(expected_ms, "drive_distance"))?;

        log::info!(
            "Pilot: Drive {:.3}m {} at {:.3}m/s (timeout {}ms)",
            target,
            if backward { "backward" } else { "forward" },
            speed_m_per_s,
            timeout_ms
        );

        if backward {
            self.drive.drive_backward_unbounded(speed_m_per_s)?;
        } else {
            self.drive.drive_forward_unbounded(speed_m_per_s)?;
        }

        let start_us = self.clock.now_micros();
        let (termination, traveled, elapsed_ms) = loop {
            self.clock.delay_ms(self.config.poll_ms);
            let pose = self.navigator.update();
            let traveled = start.distance_to(&pose);
            let elapsed_ms = self.elapsed_ms(start_us);

            if traveled >= target {
                break (Termination::Reached, traveled, elapsed_ms);
            }
            if elapsed_ms >= timeout_ms {
                log::warn!(
                    "Pilot: drive_distance timed out after {}ms at {:.3}/{:.3}m",
                    elapsed_ms,
                    traveled,
                    target
                );
                break (Termination::TimedOut, traveled, elapsed_ms);
            }
        };

        self.drive.halt();
        Ok(self.outcome(termination, traveled, elapsed_ms))
    }

    /// Spin in place until the navigator measures `angle_rad` of rotation
    /// (positive = counter-clockwise), then halt.
    pub fn rotate_angle(&mut self, angle_rad: f32, speed_m_per_s: f32) -> Result<MoveOutcome> {
        let left = angle_rad >= 0.0;
        let target = angle_rad.abs();
        self.checked(self.drive.limits().check_angle(target))?;
        self.checked(self.drive.limits().check_speed(speed_m_per_s))?;

        let mut previous = self.navigator.update().theta;
        if target == 0.0 {
            return Ok(self.outcome(Termination::Reached, 0.0, 0));
        }

        let speed = meters_per_s_to_device_speed(speed_m_per_s);
        let expected_ms = turn_duration_s(target, self.drive.wheelbase_mm(), speed as f32)
            .and_then(seconds_to_ms);
        let timeout_ms = self.checked(self.timeout(expected_ms, "rotate_angle"))?;

        log::info!(
            "Pilot: Rotate {:.2}deg at {:.3}m/s (timeout {}ms)",
            angle_rad.to_degrees(),
            speed_m_per_s,
            timeout_ms
        );

        if left {
            self.drive.turn_left_unbounded(speed_m_per_s)?;
        } else {
            self.drive.turn_right_unbounded(speed_m_per_s)?;
        }

        let sign = if left { 1.0 } else { -1.0 };
        let start_us = self.clock.now_micros();
        let mut turned = 0.0;
        let (termination, elapsed_ms) = loop {
            self.clock.delay_ms(self.config.poll_ms);
            let theta = self.navigator.update().theta;
            turned += sign * normalize_angle(theta - previous);
            previous = theta;
            let elapsed_ms = self.elapsed_ms(start_us);

            if turned >= target {
                break (Termination::Reached, elapsed_ms);
            }
            if elapsed_ms >= timeout_ms {
                log::warn!(
                    "Pilot: rotate_angle timed out after {}ms at {:.3}/{:.3}rad",
                    elapsed_ms,
                    turned,
                    target
                );
                break (Termination::TimedOut, elapsed_ms);
            }
        };

        self.drive.halt();
        Ok(self.outcome(termination, turned, elapsed_ms))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// `ceil(expected × timeout_factor) + poll_ms`, or `DegenerateMotion`
    /// when the motion never completes or the timeout overflows `u32`.
    fn timeout(&self, expected_ms: Option<u32>, op: &str) -> Result<u32> {
        let Some(expected_ms) = expected_ms else {
            return Err(Error::DegenerateMotion(format!(
                "{} never completes at the commanded speed",
                op
            )));
        };
        let scaled = (expected_ms as f32 * self.config.timeout_factor).ceil();
        (scaled < u32::MAX as f32)
            .then(|| scaled as u32)
            .and_then(|ms| ms.checked_add(self.config.poll_ms))
            .ok_or_else(|| {
                Error::DegenerateMotion(format!(
                    "{} timeout for {}ms exceeds the timer range",
                    op, expected_ms
                ))
            })
    }

    fn elapsed_ms(&self, start_us: u64) -> u32 {
        (self.clock.now_micros().saturating_sub(start_us) / 1000) as u32
    }

    fn outcome(&mut self, termination: Termination, traveled: f32, elapsed_ms: u32) -> MoveOutcome {
        MoveOutcome {
            termination,
            pose: self.navigator.update(),
            traveled,
            elapsed_ms,
        }
    }

    /// Log and halt on a rejected routine parameter.
    fn checked<T>(&mut self, result: Result<T>) -> Result<T> {
        result.map_err(|err| {
            log::error!("Pilot: {}", err);
            self.drive.halt();
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RobotConfig;
    use crate::devices::mock::{SimConfig, SimEvent, SimRobot};
    use crate::drivers::RecordingTelemetry;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn setup(config: &RobotConfig) -> (SimRobot, Pilot) {
        let sim = SimRobot::from_robot_config(config);
        let pilot = sim.build_pilot(config).unwrap();
        (sim, pilot)
    }

    #[test]
    fn test_drive_segmented_publishes_each_segment() {
        let (sim, mut pilot) = setup(&RobotConfig::default());
        let mut sink = RecordingTelemetry::new();

        let pose = pilot.drive_segmented(1.0, 0.2, &mut sink).unwrap();

        assert_eq!(sink.history.len(), 10);
        assert_relative_eq!(pose.x, 1.0, epsilon = 2e-3);
        assert_relative_eq!(pose.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(sim.true_pose().x, 1.0, epsilon = 1e-3);

        let xs: Vec<f32> = sink.history.iter().map(|t| t.pose.x).collect();
        assert!(xs.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_drive_segmented_backward() {
        let (_sim, mut pilot) = setup(&RobotConfig::default());
        let mut sink = RecordingTelemetry::new();

        let pose = pilot.drive_segmented(-0.25, 0.2, &mut sink).unwrap();

        assert_eq!(sink.history.len(), 3);
        assert_relative_eq!(pose.x, -0.25, epsilon = 2e-3);
        assert!(pilot.navigator().encoder_totals().left < 0);
    }

    #[test]
    fn test_rotate_segmented() {
        let (sim, mut pilot) = setup(&RobotConfig::default());
        let mut sink = RecordingTelemetry::new();

        let pose = pilot.rotate_segmented(-FRAC_PI_2, 0.1, &mut sink).unwrap();

        assert_eq!(sink.history.len(), 6);
        assert_relative_eq!(pose.theta, -FRAC_PI_2, epsilon = 0.02);
        assert_relative_eq!(sim.true_pose().theta, -FRAC_PI_2, epsilon = 0.02);
        assert_relative_eq!(pose.x, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_square_returns_to_start() {
        let (sim, mut pilot) = setup(&RobotConfig::default());
        let mut sink = RecordingTelemetry::new();

        let pose = pilot
            .square(0.5, 0.2, TurnDirection::Left, &mut sink)
            .unwrap();

        assert_relative_eq!(pose.x, 0.0, epsilon = 0.02);
        assert_relative_eq!(pose.y, 0.0, epsilon = 0.02);
        assert!(normalize_angle(pose.theta).abs() < 0.05);

        let truth = sim.true_pose();
        assert_relative_eq!(truth.x, 0.0, epsilon = 0.02);
        assert_relative_eq!(truth.y, 0.0, epsilon = 0.02);
    }

    #[test]
    fn test_square_direction() {
        let (_sim, mut pilot) = setup(&RobotConfig::default());
        let mut sink = RecordingTelemetry::new();
        pilot
            .square(0.3, 0.2, TurnDirection::Right, &mut sink)
            .unwrap();

        // First corner turns clockwise: second side heads toward -y
        let after_second_side = sink
            .history
            .iter()
            .filter(|t| t.pose.y < -0.25)
            .count();
        assert!(after_second_side > 0);
    }

    #[test]
    fn test_segmented_rejects_bad_distance() {
        let (sim, mut pilot) = setup(&RobotConfig::default());
        let mut sink = RecordingTelemetry::new();

        assert!(pilot.drive_segmented(f32::NAN, 0.2, &mut sink).is_err());
        assert!(pilot.rotate_segmented(10.0, 0.1, &mut sink).is_err());
        assert!(sink.history.is_empty());
        assert!(
            sim.journal()
                .iter()
                .all(|e| *e == SimEvent::Speeds { left: 0, right: 0 })
        );
    }

    #[test]
    fn test_drive_distance_reaches_target() {
        let (sim, mut pilot) = setup(&RobotConfig::default());

        let outcome = pilot.drive_distance(0.5, 0.2).unwrap();

        assert_eq!(outcome.termination, Termination::Reached);
        assert!(outcome.traveled >= 0.5);
        assert_relative_eq!(outcome.pose.x, 0.5, epsilon = 5e-3);
        assert_relative_eq!(sim.true_pose().x, 0.5, epsilon = 5e-3);
        assert!((2500..=2520).contains(&outcome.elapsed_ms));
        assert_eq!(sim.wheel_speeds(), (0, 0));
        assert!(!pilot.drive().is_moving());
    }

    #[test]
    fn test_drive_distance_backward() {
        let (_sim, mut pilot) = setup(&RobotConfig::default());
        let outcome = pilot.drive_distance(-0.2, 0.1).unwrap();
        assert_eq!(outcome.termination, Termination::Reached);
        assert_relative_eq!(outcome.pose.x, -0.2, epsilon = 5e-3);
    }

    #[test]
    fn test_drive_distance_times_out() {
        let config = RobotConfig::default();
        // Left motor wired backwards but not flipped in the drive: the robot spins
        let sim = SimRobot::new(SimConfig {
            invert_left_motor: true,
            ..SimConfig::from_robot_config(&config)
        });
        let mut pilot = sim.build_pilot(&config).unwrap();

        let outcome = pilot.drive_distance(0.3, 0.2).unwrap();

        assert_eq!(outcome.termination, Termination::TimedOut);
        // 1500ms expected × 2 + one poll period
        assert!(outcome.elapsed_ms >= 3010);
        assert!(outcome.traveled < 0.3);
        assert_eq!(sim.wheel_speeds(), (0, 0));
    }

    #[test]
    fn test_drive_distance_zero_speed_is_degenerate() {
        let (sim, mut pilot) = setup(&RobotConfig::default());
        let err = pilot.drive_distance(0.5, 0.0).unwrap_err();
        assert!(matches!(err, Error::DegenerateMotion(_)));
        assert_eq!(sim.wheel_speeds(), (0, 0));
    }

    #[test]
    fn test_sub_unit_speed_is_degenerate() {
        let (sim, mut pilot) = setup(&RobotConfig::default());

        // 0.01 mm/s rounds to a stopped wheel
        let err = pilot.drive_distance(100.0, 0.00001).unwrap_err();
        assert!(matches!(err, Error::DegenerateMotion(_)));
        let err = pilot.rotate_angle(PI, 0.0004).unwrap_err();
        assert!(matches!(err, Error::DegenerateMotion(_)));

        assert!(
            sim.journal()
                .iter()
                .all(|e| *e == SimEvent::Speeds { left: 0, right: 0 })
        );
        assert_eq!(sim.now_micros(), 0);
    }

    #[test]
    fn test_timeout_beyond_timer_range_is_rejected() {
        let mut config = RobotConfig::default();
        config.pilot.timeout_factor = 1000.0;
        let (sim, mut pilot) = setup(&config);

        // 100 m at 1 mm/s is 10^8 ms; the scaled timeout is 10^11 ms
        let err = pilot.drive_distance(100.0, 0.001).unwrap_err();
        assert!(matches!(err, Error::DegenerateMotion(_)));

        assert_eq!(
            sim.journal(),
            vec![SimEvent::Speeds { left: 0, right: 0 }]
        );
        assert_eq!(sim.wheel_speeds(), (0, 0));
    }

    #[test]
    fn test_zero_distance_does_not_move() {
        let (sim, mut pilot) = setup(&RobotConfig::default());
        let outcome = pilot.drive_distance(0.0, 0.2).unwrap();
        assert_eq!(outcome.termination, Termination::Reached);
        assert!(sim.journal().is_empty());
    }

    #[test]
    fn test_rotate_angle_encoder_only() {
        let (sim, mut pilot) = setup(&RobotConfig::default());

        let outcome = pilot.rotate_angle(FRAC_PI_2, 0.1).unwrap();

        assert_eq!(outcome.termination, Termination::Reached);
        assert_relative_eq!(outcome.pose.theta, FRAC_PI_2, epsilon = 0.04);
        assert_relative_eq!(sim.true_pose().theta, FRAC_PI_2, epsilon = 0.04);
    }

    #[test]
    fn test_rotate_angle_across_pi() {
        let (sim, mut pilot) = setup(&RobotConfig::default());

        let outcome = pilot.rotate_angle(-1.5 * PI, 0.2).unwrap();

        assert_eq!(outcome.termination, Termination::Reached);
        assert!(outcome.traveled >= 1.5 * PI);
        // -270° lands at +90°
        assert_relative_eq!(outcome.pose.theta, FRAC_PI_2, epsilon = 0.07);
        assert_relative_eq!(sim.true_pose().theta, FRAC_PI_2, epsilon = 0.07);
    }

    #[test]
    fn test_rotate_angle_with_imu() {
        let mut config = RobotConfig::default();
        config.navigator.use_imu = true;
        let sim = SimRobot::new(SimConfig {
            gyro_bias_lsb: -15.0,
            ..SimConfig::from_robot_config(&config)
        });
        let mut pilot = sim.build_pilot(&config).unwrap();
        assert!(pilot.navigator().imu_enabled());

        let outcome = pilot.rotate_angle(PI / 3.0, 0.1).unwrap();

        assert_eq!(outcome.termination, Termination::Reached);
        assert_relative_eq!(outcome.pose.theta, PI / 3.0, epsilon = 0.04);
        assert_relative_eq!(sim.true_pose().theta, PI / 3.0, epsilon = 0.04);
    }

    #[test]
    fn test_reset() {
        let (_sim, mut pilot) = setup(&RobotConfig::default());
        pilot.drive_distance(0.1, 0.2).unwrap();
        pilot.reset();
        assert_eq!(pilot.pose(), Pose2D::identity());
    }
}
