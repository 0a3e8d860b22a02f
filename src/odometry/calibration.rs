//! Gyro zero-rate bias estimation.
//!
//! The navigator feeds this with raw yaw-rate samples taken while the
//! robot sits still, then subtracts the mean from every later reading.
//!
//! # Example
//!
//! ```
//! use gati::odometry::GyroBiasEstimator;
//!
//! let mut estimator = GyroBiasEstimator::new(4);
//! for raw in [10, 12, 11, 9] {
//!     if estimator.add_sample(raw) {
//!         break;
//!     }
//! }
//! assert_eq!(estimator.compute_bias(), 10.5);
//! ```

/// Mean of stationary raw gyro samples.
#[derive(Debug, Clone)]
pub struct GyroBiasEstimator {
    samples: Vec<i16>,
    required_samples: usize,
}

impl GyroBiasEstimator {
    /// Create an estimator that is ready after `required_samples` samples.
    pub fn new(required_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(required_samples),
            required_samples,
        }
    }

    /// Add a raw sample. Returns `true` once enough samples are in.
    ///
    /// Samples past the required count are ignored.
    pub fn add_sample(&mut self, raw: i16) -> bool {
        if self.samples.len() < self.required_samples {
            self.samples.push(raw);
        }
        self.is_ready()
    }

    pub fn is_ready(&self) -> bool {
        self.samples.len() >= self.required_samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn required_samples(&self) -> usize {
        self.required_samples
    }

    /// True if any sample sits at the rail of the 16-bit range.
    pub fn saturated(&self) -> bool {
        self.samples
            .iter()
            .any(|&s| s == i16::MAX || s == i16::MIN)
    }

    /// Mean of the collected samples in raw LSB (0.0 when empty).
    pub fn compute_bias(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|&s| s as f32).sum::<f32>() / self.samples.len() as f32
    }

    /// Sample standard deviation in raw LSB (0.0 with fewer than 2 samples).
    pub fn compute_std_dev(&self) -> f32 {
        if self.samples.len() < 2 {
            return 0.0;
        }

        let mean = self.compute_bias();
        let variance = self
            .samples
            .iter()
            .map(|&s| {
                let diff = s as f32 - mean;
                diff * diff
            })
            .sum::<f32>()
            / (self.samples.len() - 1) as f32;

        variance.sqrt()
    }

    /// Drop all samples and start over.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_estimator() {
        let estimator = GyroBiasEstimator::new(200);
        assert_eq!(estimator.required_samples(), 200);
        assert_eq!(estimator.sample_count(), 0);
        assert!(!estimator.is_ready());
    }

    #[test]
    fn test_ready_after_required_samples() {
        let mut estimator = GyroBiasEstimator::new(3);
        assert!(!estimator.add_sample(5));
        assert!(!estimator.add_sample(6));
        assert!(estimator.add_sample(7));
        assert!(estimator.add_sample(100));
        assert_eq!(estimator.sample_count(), 3);
        assert_relative_eq!(estimator.compute_bias(), 6.0);
    }

    #[test]
    fn test_negative_bias() {
        let mut estimator = GyroBiasEstimator::new(4);
        for raw in [-20, -22, -18, -20] {
            estimator.add_sample(raw);
        }
        assert_relative_eq!(estimator.compute_bias(), -20.0);
    }

    #[test]
    fn test_std_dev() {
        let mut estimator = GyroBiasEstimator::new(5);
        for raw in [10, 10, 10, 10, 10] {
            estimator.add_sample(raw);
        }
        assert_relative_eq!(estimator.compute_std_dev(), 0.0);

        estimator.reset();
        for raw in [8, 12, 8, 12, 10] {
            estimator.add_sample(raw);
        }
        // variance = (4 + 4 + 4 + 4 + 0) / 4 = 4
        assert_relative_eq!(estimator.compute_std_dev(), 2.0);
    }

    #[test]
    fn test_empty_estimator() {
        let estimator = GyroBiasEstimator::new(10);
        assert_eq!(estimator.compute_bias(), 0.0);
        assert_eq!(estimator.compute_std_dev(), 0.0);
        assert!(!estimator.saturated());
    }

    #[test]
    fn test_saturation() {
        let mut estimator = GyroBiasEstimator::new(2);
        estimator.add_sample(3);
        estimator.add_sample(i16::MAX);
        assert!(estimator.saturated());
    }
}
