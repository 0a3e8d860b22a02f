//! Seeded Gaussian noise for the simulated sensors

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

/// Gaussian noise source, reproducible for a non-zero seed
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Seed 0 draws from OS entropy; any other seed replays the same sequence.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Zero-mean sample. A zero `stddev` returns exactly 0 without drawing.
    #[inline]
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }

    #[inline]
    pub fn biased_gaussian(&mut self, bias: f32, stddev: f32) -> f32 {
        bias + self.gaussian(stddev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = NoiseGenerator::new(7);
        let mut b = NoiseGenerator::new(7);
        for _ in 0..100 {
            assert_eq!(a.gaussian(2.0), b.gaussian(2.0));
        }
    }

    #[test]
    fn test_zero_stddev_is_silent() {
        let mut noise = NoiseGenerator::new(7);
        assert_eq!(noise.gaussian(0.0), 0.0);
        assert_eq!(noise.biased_gaussian(0.25, 0.0), 0.25);
    }

    #[test]
    fn test_sample_statistics() {
        let mut noise = NoiseGenerator::new(42);
        let n = 5000;
        let samples: Vec<f32> = (0..n).map(|_| noise.biased_gaussian(1.0, 0.5)).collect();

        let mean = samples.iter().sum::<f32>() / n as f32;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n as f32;
        assert!((mean - 1.0).abs() < 0.05, "mean={}", mean);
        assert!((var.sqrt() - 0.5).abs() < 0.05, "stddev={}", var.sqrt());
    }
}
