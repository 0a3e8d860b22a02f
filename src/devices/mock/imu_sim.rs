//! Yaw-rate gyro simulator

use super::noise::NoiseGenerator;

/// Gyro producing raw LSB readings from the true yaw rate
pub struct GyroSimulator {
    sensitivity_dps_per_lsb: f32,
    bias_lsb: f32,
    noise_lsb: f32,
    noise: NoiseGenerator,
}

impl GyroSimulator {
    pub fn new(
        sensitivity_dps_per_lsb: f32,
        bias_lsb: f32,
        noise_lsb: f32,
        noise: NoiseGenerator,
    ) -> Self {
        Self {
            sensitivity_dps_per_lsb,
            bias_lsb,
            noise_lsb,
            noise,
        }
    }

    /// Raw reading for a yaw rate in rad/s (CCW positive), saturating at the i16 rails.
    pub fn read(&mut self, rate_rad_per_s: f32) -> i16 {
        let offset = self.noise.biased_gaussian(self.bias_lsb, self.noise_lsb);
        let raw = rate_rad_per_s.to_degrees() / self.sensitivity_dps_per_lsb + offset;
        raw.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
    }
}
