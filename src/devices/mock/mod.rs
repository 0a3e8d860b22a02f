//! Simulated robot for hardware-free development and tests
//!
//! One shared state backs every handle, so the motors, encoders, gyro and
//! clock handed to the drive and the navigator all see the same robot.
//!
//! | Component | Simulation Method |
//! |-----------|-------------------|
//! | Motors | Latest speeds held until the next command (1 unit = 1 mm/s) |
//! | Wheel encoders | Wheel travel (with optional seeded slip) to ticks, 16-bit wrapping counters |
//! | Gyro | True yaw rate scaled to LSB, plus bias and seeded Gaussian noise |
//! | Clock | Virtual; `delay_ms` advances time and integrates motion |
//!
//! Time only moves inside [`Clock::delay_ms`], so a blocking primitive
//! covers exactly its computed duration and tests run instantly.
//!
//! Every motor command and delay is appended to a journal
//! ([`SimRobot::journal`]) in the order it happened.
//!
//! # Module Structure
//!
//! - [`config`]: Physical parameters of the simulated robot
//! - `physics`: Ground-truth differential drive kinematics
//! - `encoder_sim`: Tick generation and counter wraparound
//! - `imu_sim`: Raw yaw-rate generation
//! - `noise`: Seeded Gaussian noise shared by the sensor simulators

pub mod config;
mod encoder_sim;
mod imu_sim;
mod noise;
mod physics;

pub use config::SimConfig;

use crate::config::RobotConfig;
use crate::core::Pose2D;
use crate::drivers::{Clock, EncoderDriver, GyroDriver, MotorDriver};
use crate::error::Result;
use crate::motion::DifferentialDrive;
use crate::navigator::Navigator;
use crate::pilot::Pilot;

use encoder_sim::EncoderSimulator;
use imu_sim::GyroSimulator;
use noise::NoiseGenerator;
use parking_lot::Mutex;
use physics::PhysicsState;
use std::sync::Arc;

/// Meters per second for one motor device unit
const METERS_PER_S_PER_UNIT: f32 = 0.001;

/// One observable hardware interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// Speeds as received by the motor driver (after any polarity flip)
    Speeds { left: i16, right: i16 },
    /// Blocking delay
    Delay { ms: u32 },
}

struct SimState {
    config: SimConfig,
    now_us: u64,
    speeds: (i16, i16),
    physics: PhysicsState,
    encoders: EncoderSimulator,
    gyro: GyroSimulator,
    journal: Vec<SimEvent>,
}

impl SimState {
    fn new(config: SimConfig) -> Self {
        let noise = NoiseGenerator::new(config.noise_seed);
        Self {
            now_us: 0,
            speeds: (0, 0),
            physics: PhysicsState::new(config.track_width_m),
            encoders: EncoderSimulator::new(
                config.left_ticks_per_meter(),
                config.right_ticks_per_meter(),
                config.right_wheel_slip,
                config.wheel_slip_stddev,
                noise.clone(),
            ),
            gyro: GyroSimulator::new(
                config.gyro_sensitivity_dps_per_lsb,
                config.gyro_bias_lsb,
                config.gyro_noise_lsb,
                noise,
            ),
            journal: Vec::new(),
            config,
        }
    }

    /// Physical wheel velocities (m/s) after motor wiring
    fn wheel_velocities(&self) -> (f32, f32) {
        let (left, right) = self.speeds;
        let left = if self.config.invert_left_motor {
            -(left as f32)
        } else {
            left as f32
        };
        let right = if self.config.invert_right_motor {
            -(right as f32)
        } else {
            right as f32
        };
        (left * METERS_PER_S_PER_UNIT, right * METERS_PER_S_PER_UNIT)
    }

    fn advance(&mut self, ms: u32) {
        let dt = ms as f32 / 1000.0;
        let (left_vel, right_vel) = self.wheel_velocities();
        self.physics.update(left_vel, right_vel, dt);
        self.encoders.update(left_vel, right_vel, dt);
        self.now_us += ms as u64 * 1000;
    }
}

/// Handle to a simulated robot.
///
/// Cloning shares the same robot.
#[derive(Clone)]
pub struct SimRobot {
    state: Arc<Mutex<SimState>>,
}

impl SimRobot {
    /// Stationary robot at the origin
    pub fn new(config: SimConfig) -> Self {
        log::debug!(
            "SimRobot: Created track={:.3}m, ticks/m=({:.1}, {:.1})",
            config.track_width_m,
            config.left_ticks_per_meter(),
            config.right_ticks_per_meter()
        );
        Self {
            state: Arc::new(Mutex::new(SimState::new(config))),
        }
    }

    /// Robot matching the configured geometry
    pub fn from_robot_config(config: &RobotConfig) -> Self {
        Self::new(SimConfig::from_robot_config(config))
    }

    pub fn motors(&self) -> SimMotors {
        SimMotors {
            state: Arc::clone(&self.state),
        }
    }

    pub fn encoders(&self) -> SimEncoders {
        SimEncoders {
            state: Arc::clone(&self.state),
        }
    }

    pub fn gyro(&self) -> SimGyro {
        SimGyro {
            state: Arc::clone(&self.state),
        }
    }

    pub fn clock(&self) -> SimClock {
        SimClock {
            state: Arc::clone(&self.state),
        }
    }

    /// Drivetrain wired to this robot
    pub fn build_drive(&self, config: &RobotConfig) -> Result<DifferentialDrive> {
        DifferentialDrive::from_config(config, Box::new(self.motors()), Box::new(self.clock()))
    }

    /// Navigator wired to this robot, with the gyro attached when `use_imu` is set
    pub fn build_navigator(&self, config: &RobotConfig) -> Result<Navigator> {
        let gyro: Option<Box<dyn GyroDriver>> = if config.navigator.use_imu {
            Some(Box::new(self.gyro()))
        } else {
            None
        };
        Navigator::from_config(config, Box::new(self.encoders()), gyro, Box::new(self.clock()))
    }

    /// Drive and navigator together
    pub fn build_pilot(&self, config: &RobotConfig) -> Result<Pilot> {
        let drive = self.build_drive(config)?;
        let navigator = self.build_navigator(config)?;
        Ok(Pilot::new(
            drive,
            navigator,
            Box::new(self.clock()),
            config.pilot.clone(),
        ))
    }

    /// Everything the motors and clock saw, oldest first
    pub fn journal(&self) -> Vec<SimEvent> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    /// Ground-truth pose
    pub fn true_pose(&self) -> Pose2D {
        self.state.lock().physics.pose()
    }

    /// Speeds currently applied to the motors
    pub fn wheel_speeds(&self) -> (i16, i16) {
        self.state.lock().speeds
    }

    pub fn now_micros(&self) -> u64 {
        self.state.lock().now_us
    }
}

/// Motor handle
pub struct SimMotors {
    state: Arc<Mutex<SimState>>,
}

impl MotorDriver for SimMotors {
    fn set_speeds(&mut self, left: i16, right: i16) {
        let mut state = self.state.lock();
        state.speeds = (left, right);
        state.journal.push(SimEvent::Speeds { left, right });
    }
}

/// Encoder handle
pub struct SimEncoders {
    state: Arc<Mutex<SimState>>,
}

impl EncoderDriver for SimEncoders {
    fn counts_left(&self) -> i16 {
        self.state.lock().encoders.counts().0
    }

    fn counts_right(&self) -> i16 {
        self.state.lock().encoders.counts().1
    }

    fn counts_and_reset_left(&mut self) -> i16 {
        self.state.lock().encoders.take_left()
    }

    fn counts_and_reset_right(&mut self) -> i16 {
        self.state.lock().encoders.take_right()
    }
}

/// Gyro handle
pub struct SimGyro {
    state: Arc<Mutex<SimState>>,
}

impl GyroDriver for SimGyro {
    fn read_rate_z(&mut self) -> i16 {
        let mut state = self.state.lock();
        let (left_vel, right_vel) = state.wheel_velocities();
        let rate = state.physics.angular_rate(left_vel, right_vel);
        state.gyro.read(rate)
    }
}

/// Virtual clock handle
pub struct SimClock {
    state: Arc<Mutex<SimState>>,
}

impl Clock for SimClock {
    fn now_micros(&self) -> u64 {
        self.state.lock().now_us
    }

    fn delay_ms(&mut self, ms: u32) {
        let mut state = self.state.lock();
        state.advance(ms);
        state.journal.push(SimEvent::Delay { ms });
    }
}
