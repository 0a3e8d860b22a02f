//! Navigator: encoder (and optional gyro) sampling into a persistent pose
//!
//! Each [`Navigator::update`] call:
//! 1. Reads and resets both hardware encoder counters
//! 2. Adds the deltas to the 64-bit cumulative totals
//! 3. With the gyro enabled, samples the yaw rate and the time since the
//!    previous sample
//! 4. Calls the odometry engine exactly once
//!
//! The hardware counters are 16-bit and wrap after ±32767 ticks, so
//! `update()` must run often enough to drain them (about 3.6 m of wheel
//! travel with the default geometry).

use crate::config::{NavigatorConfig, RobotConfig};
use crate::core::{EncoderDelta, EncoderTotals, Pose2D, Telemetry};
use crate::drivers::{Clock, EncoderDriver, GyroDriver, TelemetrySink};
use crate::error::{Error, Result};
use crate::odometry::{GyroBiasEstimator, Odometry};

/// Gyro attached to the navigator after bias calibration
struct ImuState {
    gyro: Box<dyn GyroDriver>,
    /// Zero-rate offset in deg/s
    bias_dps: f32,
    /// Clock reading at the previous gyro sample
    last_sample_us: u64,
}

/// Owner of the pose estimate and cumulative encoder totals.
pub struct Navigator {
    config: NavigatorConfig,
    odometry: Odometry,
    encoders: Box<dyn EncoderDriver>,
    clock: Box<dyn Clock>,
    imu: Option<ImuState>,
    pose: Pose2D,
    totals: EncoderTotals,
}

impl Navigator {
    /// Create a navigator at the origin.
    ///
    /// Drains any counts already sitting in the hardware counters.
    pub fn new(
        config: NavigatorConfig,
        odometry: Odometry,
        encoders: Box<dyn EncoderDriver>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let mut navigator = Self {
            config,
            odometry,
            encoders,
            clock,
            imu: None,
            pose: Pose2D::identity(),
            totals: EncoderTotals::default(),
        };
        navigator.drain();

        log::debug!("Navigator: Initialized (encoder-only)");
        Ok(navigator)
    }

    /// Build the odometry engine and navigator from configuration.
    ///
    /// With `navigator.use_imu` set, `gyro` is required and is calibrated
    /// before this returns.
    pub fn from_config(
        config: &RobotConfig,
        encoders: Box<dyn EncoderDriver>,
        gyro: Option<Box<dyn GyroDriver>>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let odometry = Odometry::new(config.odometry.clone())?;
        let mut navigator = Self::new(config.navigator.clone(), odometry, encoders, clock)?;

        if config.navigator.use_imu {
            let gyro = gyro.ok_or_else(|| {
                Error::InvalidConfig("navigator.use_imu is set but no gyro was provided".to_string())
            })?;
            navigator.enable_imu(gyro)?;
        }
        Ok(navigator)
    }

    /// Calibrate the gyro bias and switch to gyro-assisted heading.
    ///
    /// Averages `imu_cal_samples` raw readings `imu_cal_delay_ms` apart.
    /// The robot must be stationary. Returns the bias in deg/s.
    pub fn enable_imu(&mut self, mut gyro: Box<dyn GyroDriver>) -> Result<f32> {
        log::info!(
            "Navigator: Calibrating gyro bias over {} samples, keep the robot still",
            self.config.imu_cal_samples
        );

        let mut estimator = GyroBiasEstimator::new(self.config.imu_cal_samples);
        while !estimator.add_sample(gyro.read_rate_z()) {
            self.clock.delay_ms(self.config.imu_cal_delay_ms);
        }

        if estimator.saturated() {
            return Err(Error::Calibration(
                "gyro saturated while sampling bias, robot is not stationary".to_string(),
            ));
        }

        let sensitivity = self.config.gyro_sensitivity_dps_per_lsb;
        let bias_dps = estimator.compute_bias() * sensitivity;
        log::info!(
            "Navigator: Gyro bias {:.4} deg/s (stddev {:.4} deg/s)",
            bias_dps,
            estimator.compute_std_dev() * sensitivity
        );

        self.imu = Some(ImuState {
            gyro,
            bias_dps,
            last_sample_us: self.clock.now_micros(),
        });
        Ok(bias_dps)
    }

    /// Detach the gyro and return to encoder-only heading.
    pub fn disable_imu(&mut self) -> Option<Box<dyn GyroDriver>> {
        let imu = self.imu.take()?;
        log::info!("Navigator: Gyro disabled, heading from encoders");
        Some(imu.gyro)
    }

    pub fn imu_enabled(&self) -> bool {
        self.imu.is_some()
    }

    /// Calibrated gyro bias in deg/s, when the gyro is enabled
    pub fn gyro_bias_dps(&self) -> Option<f32> {
        self.imu.as_ref().map(|imu| imu.bias_dps)
    }

    /// Sample the hardware and integrate one odometry step.
    pub fn update(&mut self) -> Pose2D {
        let delta = EncoderDelta::new(
            self.encoders.counts_and_reset_left() as i32,
            self.encoders.counts_and_reset_right() as i32,
        );
        self.totals.accumulate(delta);

        match self.imu.as_mut() {
            Some(imu) => {
                let raw = imu.gyro.read_rate_z();
                let rate_dps = raw as f32 * self.config.gyro_sensitivity_dps_per_lsb - imu.bias_dps;

                let now = self.clock.now_micros();
                let dt_s = now.saturating_sub(imu.last_sample_us) as f32 / 1e6;
                imu.last_sample_us = now;

                self.odometry
                    .update_odom_imu(delta.left, delta.right, rate_dps, dt_s, &mut self.pose);
            }
            None => {
                self.odometry
                    .update_odom(delta.left, delta.right, &mut self.pose);
            }
        }

        self.pose
    }

    /// Zero the pose and totals, and drain the hardware counters.
    pub fn reset(&mut self) {
        self.drain();
        self.pose = Pose2D::identity();
        self.totals = EncoderTotals::default();
        let now = self.clock.now_micros();
        if let Some(imu) = self.imu.as_mut() {
            imu.last_sample_us = now;
        }
        log::debug!("Navigator: Reset");
    }

    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    pub fn x(&self) -> f32 {
        self.pose.x
    }

    pub fn y(&self) -> f32 {
        self.pose.y
    }

    /// Heading in radians, in (-π, π]
    pub fn theta(&self) -> f32 {
        self.pose.theta
    }

    pub fn encoder_totals(&self) -> EncoderTotals {
        self.totals
    }

    /// Left hardware counter without draining it
    pub fn read_left_raw(&self) -> i16 {
        self.encoders.counts_left()
    }

    /// Right hardware counter without draining it
    pub fn read_right_raw(&self) -> i16 {
        self.encoders.counts_right()
    }

    pub fn odometry(&self) -> &Odometry {
        &self.odometry
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            pose: self.pose,
            encoders: self.totals,
        }
    }

    /// Push the current pose and totals to a display or recorder.
    pub fn publish(&self, sink: &mut dyn TelemetrySink) {
        sink.publish(&self.telemetry());
    }

    fn drain(&mut self) {
        let left = self.encoders.counts_and_reset_left();
        let right = self.encoders.counts_and_reset_right();
        if left != 0 || right != 0 {
            log::debug!("Navigator: Discarded pending counts ({}, {})", left, right);
        }
    }
}
