//! Wheel encoder simulator
//!
//! Converts wheel travel to quadrature ticks held in 16-bit signed
//! counters that wrap exactly like the hardware ones.

use super::noise::NoiseGenerator;

/// Encoder pair for the simulated drivetrain
pub struct EncoderSimulator {
    left_ticks_per_meter: f32,
    right_ticks_per_meter: f32,
    /// Constant extra travel fraction on the right wheel
    right_slip: f32,
    /// Per-update Gaussian slip on each wheel (fraction of travel)
    slip_stddev: f32,
    noise: NoiseGenerator,
    /// Fractional ticks carried to the next update
    left_accumulator: f32,
    right_accumulator: f32,
    left_count: i16,
    right_count: i16,
}

impl EncoderSimulator {
    pub fn new(
        left_ticks_per_meter: f32,
        right_ticks_per_meter: f32,
        right_slip: f32,
        slip_stddev: f32,
        noise: NoiseGenerator,
    ) -> Self {
        Self {
            left_ticks_per_meter,
            right_ticks_per_meter,
            right_slip,
            slip_stddev,
            noise,
            left_accumulator: 0.0,
            right_accumulator: 0.0,
            left_count: 0,
            right_count: 0,
        }
    }

    /// Accumulate ticks for `dt` seconds at the given wheel velocities (m/s).
    pub fn update(&mut self, left_vel: f32, right_vel: f32, dt: f32) {
        let left_slip = 1.0 + self.noise.gaussian(self.slip_stddev);
        let right_slip = 1.0 + self.noise.biased_gaussian(self.right_slip, self.slip_stddev);

        self.left_accumulator += left_vel * dt * self.left_ticks_per_meter * left_slip;
        self.right_accumulator += right_vel * dt * self.right_ticks_per_meter * right_slip;

        let left_whole = self.left_accumulator.trunc() as i64;
        let right_whole = self.right_accumulator.trunc() as i64;
        self.left_accumulator = self.left_accumulator.fract();
        self.right_accumulator = self.right_accumulator.fract();

        // Truncating to i16 keeps the low 16 bits, matching hardware wraparound
        self.left_count = self.left_count.wrapping_add(left_whole as i16);
        self.right_count = self.right_count.wrapping_add(right_whole as i16);
    }

    pub fn counts(&self) -> (i16, i16) {
        (self.left_count, self.right_count)
    }

    pub fn take_left(&mut self) -> i16 {
        std::mem::take(&mut self.left_count)
    }

    pub fn take_right(&mut self) -> i16 {
        std::mem::take(&mut self.right_count)
    }
}
