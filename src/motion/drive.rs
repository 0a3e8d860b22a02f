//! Differential drive motion primitives
//!
//! Every bounded primitive follows the same shape: validate the inputs,
//! convert them to device units, send one wheel command, block for the
//! computed duration, then halt. Rejected inputs halt the drivetrain and
//! return the error without moving.
//!
//! Wheel assignment for curved motion (`outer` is the commanded speed,
//! `inner = outer × turn_speed_ratio`):
//!
//! | Motion                | Left     | Right    |
//! |-----------------------|----------|----------|
//! | forward, turn left    | inner    | outer    |
//! | forward, turn right   | outer    | inner    |
//! | backward, turn left   | -inner   | -outer   |
//! | backward, turn right  | -outer   | -inner   |

use super::commands::{MotionRequest, TurnDirection, TurnMode, Travel};
use super::limits::MotionLimits;
use crate::config::{DriveConfig, RobotConfig};
use crate::core::WheelCommand;
use crate::core::math::{
    in_range, inner_wheel_speed, meters_per_s_to_device_speed, mm_per_s_to_meters_per_s,
    motion_duration_ms, seconds_to_ms, turn_duration_s,
};
use crate::drivers::{Clock, MotorDriver};
use crate::error::{Error, Result};

/// Open-loop differential drivetrain.
///
/// Owns the motor pair and a clock. All blocking primitives suspend the
/// caller through [`Clock::delay_ms`] and always end with both wheels at 0.
pub struct DifferentialDrive {
    motors: Box<dyn MotorDriver>,
    clock: Box<dyn Clock>,
    config: DriveConfig,
    limits: MotionLimits,
    /// Last logical command (before polarity flip)
    last_command: WheelCommand,
}

impl DifferentialDrive {
    /// Create a drivetrain, validating the configuration first.
    pub fn new(
        config: DriveConfig,
        limits: MotionLimits,
        motors: Box<dyn MotorDriver>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        limits.validate()?;

        log::debug!(
            "DifferentialDrive: Initialized wheelbase={:.1}mm, turn_speed_ratio={:.2}, flip=({}, {})",
            config.wheelbase_mm,
            config.turn_speed_ratio,
            config.flip_left_motor,
            config.flip_right_motor
        );

        Ok(Self {
            motors,
            clock,
            config,
            limits,
            last_command: WheelCommand::halt(),
        })
    }

    /// Create a drivetrain from the `[drive]` and `[limits]` sections.
    pub fn from_config(
        config: &RobotConfig,
        motors: Box<dyn MotorDriver>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        Self::new(config.drive.clone(), config.limits.clone(), motors, clock)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Set the inner/outer wheel speed ratio for curved motion.
    ///
    /// Values outside [0, 1] are rejected and the previous ratio is kept.
    pub fn set_turn_speed_ratio(&mut self, ratio: f32) -> Result<()> {
        let (min, max) = DriveConfig::TURN_SPEED_RATIO_RANGE;
        if !in_range(ratio, min, max) {
            let err = Error::OutOfRange {
                name: "turn_speed_ratio",
                value: ratio,
                min,
                max,
            };
            log::error!("DifferentialDrive: {}", err);
            return Err(err);
        }
        self.config.turn_speed_ratio = ratio;
        log::debug!("DifferentialDrive: turn_speed_ratio={:.2}", ratio);
        Ok(())
    }

    pub fn turn_speed_ratio(&self) -> f32 {
        self.config.turn_speed_ratio
    }

    /// Set the wheelbase used for angle-mode rotations.
    ///
    /// Values outside (0, 1000] mm are rejected and the previous value is kept.
    pub fn set_wheelbase(&mut self, wheelbase_mm: f32) -> Result<()> {
        if !(wheelbase_mm > 0.0 && wheelbase_mm <= DriveConfig::MAX_WHEELBASE_MM) {
            let err = Error::OutOfRange {
                name: "wheelbase_mm",
                value: wheelbase_mm,
                min: 0.0,
                max: DriveConfig::MAX_WHEELBASE_MM,
            };
            log::error!("DifferentialDrive: {}", err);
            return Err(err);
        }
        self.config.wheelbase_mm = wheelbase_mm;
        log::debug!("DifferentialDrive: wheelbase={:.1}mm", wheelbase_mm);
        Ok(())
    }

    pub fn wheelbase_mm(&self) -> f32 {
        self.config.wheelbase_mm
    }

    /// Invert the left motor at the hardware boundary.
    pub fn flip_left_motor(&mut self, flip: bool) {
        self.config.flip_left_motor = flip;
    }

    /// Invert the right motor at the hardware boundary.
    pub fn flip_right_motor(&mut self, flip: bool) {
        self.config.flip_right_motor = flip;
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn limits(&self) -> &MotionLimits {
        &self.limits
    }

    /// Last command sent, in logical (unflipped) device units.
    pub fn last_command(&self) -> WheelCommand {
        self.last_command
    }

    /// True unless the last command was a halt
    pub fn is_moving(&self) -> bool {
        !self.last_command.is_halt()
    }

    // ========================================================================
    // Blocking primitives
    // ========================================================================

    /// Drive straight forward `distance_m` at `speed_m_per_s`, then halt.
    pub fn move_forward(&mut self, distance_m: f32, speed_m_per_s: f32) -> Result<()> {
        self.straight("move_forward", Travel::Forward, distance_m, speed_m_per_s)
    }

    /// Drive straight backward `distance_m` at `speed_m_per_s`, then halt.
    pub fn move_backward(&mut self, distance_m: f32, speed_m_per_s: f32) -> Result<()> {
        self.straight("move_backward", Travel::Backward, distance_m, speed_m_per_s)
    }

    /// Rotate counter-clockwise in place, then halt.
    ///
    /// `value` is an angle in radians or a duration in seconds, per `mode`.
    pub fn turn_left(&mut self, value: f32, speed_m_per_s: f32, mode: TurnMode) -> Result<()> {
        self.rotate("turn_left", TurnDirection::Left, value, speed_m_per_s, mode)
    }

    /// Rotate clockwise in place, then halt.
    ///
    /// `value` is an angle in radians or a duration in seconds, per `mode`.
    pub fn turn_right(&mut self, value: f32, speed_m_per_s: f32, mode: TurnMode) -> Result<()> {
        self.rotate("turn_right", TurnDirection::Right, value, speed_m_per_s, mode)
    }

    /// Curve forward and to the left for `distance_m` of outer-wheel travel.
    pub fn move_forward_turning_left(&mut self, distance_m: f32, speed_m_per_s: f32) -> Result<()> {
        self.arc(
            "move_forward_turning_left",
            Travel::Forward,
            TurnDirection::Left,
            distance_m,
            speed_m_per_s,
        )
    }

    /// Curve forward and to the right for `distance_m` of outer-wheel travel.
    pub fn move_forward_turning_right(&mut self, distance_m: f32, speed_m_per_s: f32) -> Result<()> {
        self.arc(
            "move_forward_turning_right",
            Travel::Forward,
            TurnDirection::Right,
            distance_m,
            speed_m_per_s,
        )
    }

    /// Curve backward toward the left for `distance_m` of outer-wheel travel.
    pub fn move_backward_turning_left(&mut self, distance_m: f32, speed_m_per_s: f32) -> Result<()> {
        self.arc(
            "move_backward_turning_left",
            Travel::Backward,
            TurnDirection::Left,
            distance_m,
            speed_m_per_s,
        )
    }

    /// Curve backward toward the right for `distance_m` of outer-wheel travel.
    pub fn move_backward_turning_right(
        &mut self,
        distance_m: f32,
        speed_m_per_s: f32,
    ) -> Result<()> {
        self.arc(
            "move_backward_turning_right",
            Travel::Backward,
            TurnDirection::Right,
            distance_m,
            speed_m_per_s,
        )
    }

    /// Run one [`MotionRequest`] to completion.
    pub fn execute(&mut self, request: MotionRequest) -> Result<()> {
        log::debug!("DifferentialDrive: Executing {}", request.command_type());
        match request {
            MotionRequest::Forward {
                distance_m,
                speed_m_per_s,
            } => self.move_forward(distance_m, speed_m_per_s),
            MotionRequest::Backward {
                distance_m,
                speed_m_per_s,
            } => self.move_backward(distance_m, speed_m_per_s),
            MotionRequest::TurnLeft {
                value,
                speed_m_per_s,
                mode,
            } => self.turn_left(value, speed_m_per_s, mode),
            MotionRequest::TurnRight {
                value,
                speed_m_per_s,
                mode,
            } => self.turn_right(value, speed_m_per_s, mode),
            MotionRequest::ArcForward {
                distance_m,
                speed_m_per_s,
                direction,
            } => self.arc(
                "arc_forward",
                Travel::Forward,
                direction,
                distance_m,
                speed_m_per_s,
            ),
            MotionRequest::ArcBackward {
                distance_m,
                speed_m_per_s,
                direction,
            } => self.arc(
                "arc_backward",
                Travel::Backward,
                direction,
                distance_m,
                speed_m_per_s,
            ),
        }
    }

    /// Set both wheel speeds to zero.
    pub fn halt(&mut self) {
        self.send(WheelCommand::halt());
        log::debug!("DifferentialDrive: Halted");
    }

    // ========================================================================
    // Unbounded primitives
    // ========================================================================
    //
    // These send a command and return immediately. The wheels keep turning
    // until the next command or `halt()`; the caller decides when to stop.

    /// Drive straight forward until told otherwise.
    pub fn drive_forward_unbounded(&mut self, speed_m_per_s: f32) -> Result<()> {
        let speed = self.device_speed("drive_forward_unbounded", speed_m_per_s)?;
        self.send(WheelCommand::straight(speed));
        Ok(())
    }

    /// Drive straight backward until told otherwise.
    pub fn drive_backward_unbounded(&mut self, speed_m_per_s: f32) -> Result<()> {
        let speed = self.device_speed("drive_backward_unbounded", speed_m_per_s)?;
        self.send(WheelCommand::straight(-speed));
        Ok(())
    }

    /// Spin counter-clockwise until told otherwise.
    pub fn turn_left_unbounded(&mut self, speed_m_per_s: f32) -> Result<()> {
        let speed = self.device_speed("turn_left_unbounded", speed_m_per_s)?;
        self.send(WheelCommand::spin(speed));
        Ok(())
    }

    /// Spin clockwise until told otherwise.
    pub fn turn_right_unbounded(&mut self, speed_m_per_s: f32) -> Result<()> {
        let speed = self.device_speed("turn_right_unbounded", speed_m_per_s)?;
        self.send(WheelCommand::spin(-speed));
        Ok(())
    }

    /// Follow a curve until told otherwise.
    pub fn arc_unbounded(
        &mut self,
        travel: Travel,
        direction: TurnDirection,
        speed_m_per_s: f32,
    ) -> Result<()> {
        let outer = self.device_speed("arc_unbounded", speed_m_per_s)?;
        let command = self.arc_command(travel, direction, outer);
        self.send(command);
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn straight(
        &mut self,
        op: &'static str,
        travel: Travel,
        distance_m: f32,
        speed_m_per_s: f32,
    ) -> Result<()> {
        self.validated(op, |limits| {
            limits.check_distance(distance_m)?;
            limits.check_speed(speed_m_per_s)
        })?;
        let speed = meters_per_s_to_device_speed(speed_m_per_s);
        let duration_ms = self.travel_duration(op, distance_m, speed)?;

        log::debug!(
            "DifferentialDrive: {} {:.3}m at {:.3}m/s ({}ms)",
            op,
            distance_m,
            speed_m_per_s,
            duration_ms
        );
        self.run_for(WheelCommand::straight(travel.sign() * speed), duration_ms);
        Ok(())
    }

    fn rotate(
        &mut self,
        op: &'static str,
        direction: TurnDirection,
        value: f32,
        speed_m_per_s: f32,
        mode: TurnMode,
    ) -> Result<()> {
        self.validated(op, |limits| {
            match mode {
                TurnMode::Angle => limits.check_angle(value)?,
                TurnMode::Duration => limits.check_duration(value)?,
            }
            limits.check_speed(speed_m_per_s)
        })?;
        let speed = meters_per_s_to_device_speed(speed_m_per_s);

        let duration_ms = match mode {
            // A timed spin with stopped wheels would block without moving
            TurnMode::Duration if speed == 0 && value > 0.0 => None,
            TurnMode::Duration => seconds_to_ms(value),
            TurnMode::Angle => turn_duration_s(value, self.config.wheelbase_mm, speed as f32)
                .and_then(seconds_to_ms),
        };
        let Some(duration_ms) = duration_ms else {
            return Err(self.abort(
                op,
                Error::DegenerateMotion(format!(
                    "rotate {:.3}{} at {:.4}m/s ({} device units) never completes",
                    value,
                    if mode == TurnMode::Angle { "rad" } else { "s" },
                    speed_m_per_s,
                    speed
                )),
            ));
        };

        log::debug!(
            "DifferentialDrive: {} {:.3}{} at {:.3}m/s ({}ms)",
            op,
            value,
            if mode == TurnMode::Angle { "rad" } else { "s" },
            speed_m_per_s,
            duration_ms
        );
        let command = match direction {
            TurnDirection::Left => WheelCommand::spin(speed),
            TurnDirection::Right => WheelCommand::spin(-speed),
        };
        self.run_for(command, duration_ms);
        Ok(())
    }

    fn arc(
        &mut self,
        op: &'static str,
        travel: Travel,
        direction: TurnDirection,
        distance_m: f32,
        speed_m_per_s: f32,
    ) -> Result<()> {
        self.validated(op, |limits| {
            limits.check_distance(distance_m)?;
            limits.check_speed(speed_m_per_s)
        })?;
        let outer = meters_per_s_to_device_speed(speed_m_per_s);
        let duration_ms = self.travel_duration(op, distance_m, outer)?;
        let command = self.arc_command(travel, direction, outer);

        log::debug!(
            "DifferentialDrive: {} {:.3}m at {:.3}m/s ({}ms), wheels=({}, {})",
            op,
            distance_m,
            speed_m_per_s,
            duration_ms,
            command.left,
            command.right
        );
        self.run_for(command, duration_ms);
        Ok(())
    }

    fn arc_command(&self, travel: Travel, direction: TurnDirection, outer: i16) -> WheelCommand {
        let inner = inner_wheel_speed(outer, self.config.turn_speed_ratio);
        let sign = travel.sign();
        match direction {
            TurnDirection::Left => WheelCommand::new(sign * inner, sign * outer),
            TurnDirection::Right => WheelCommand::new(sign * outer, sign * inner),
        }
    }

    /// Blocking time for `distance_m` at the device speed actually commanded.
    fn travel_duration(&mut self, op: &'static str, distance_m: f32, speed: i16) -> Result<u32> {
        match motion_duration_ms(distance_m, mm_per_s_to_meters_per_s(speed as f32)) {
            Some(ms) => Ok(ms),
            None => Err(self.abort(
                op,
                Error::DegenerateMotion(format!(
                    "{:.3}m at {} device units never completes",
                    distance_m, speed
                )),
            )),
        }
    }

    fn device_speed(&mut self, op: &'static str, speed_m_per_s: f32) -> Result<i16> {
        self.validated(op, |limits| limits.check_speed(speed_m_per_s))?;
        Ok(meters_per_s_to_device_speed(speed_m_per_s))
    }

    /// Run the bounds check; on failure log, halt and hand the error back.
    fn validated<F>(&mut self, op: &'static str, check: F) -> Result<()>
    where
        F: FnOnce(&MotionLimits) -> Result<()>,
    {
        check(&self.limits).map_err(|err| self.abort(op, err))
    }

    fn abort(&mut self, op: &'static str, err: Error) -> Error {
        log::error!("DifferentialDrive: {} rejected: {}", op, err);
        self.halt();
        err
    }

    /// Command, block, halt.
    fn run_for(&mut self, command: WheelCommand, duration_ms: u32) {
        self.send(command);
        self.clock.delay_ms(duration_ms);
        self.halt();
    }

    /// Clamp, apply wiring polarity, and hand the command to the motors.
    fn send(&mut self, command: WheelCommand) {
        let command = command.clamped(self.config.max_device_speed);
        self.last_command = command;

        let left = if self.config.flip_left_motor {
            -command.left
        } else {
            command.left
        };
        let right = if self.config.flip_right_motor {
            -command.right
        } else {
            command.right
        };

        log::trace!("DifferentialDrive: set_speeds({}, {})", left, right);
        self.motors.set_speeds(left, right);
    }
}
