//! Deterministic continuous 2D noise over real coordinates.

use fastnoise_lite::{FastNoiseLite, NoiseType};

pub struct NoiseField {
    noise: FastNoiseLite,
}

impl NoiseField {
    pub fn new(seed: i32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        // Callers scale coordinates themselves.
        noise.set_frequency(Some(1.0));
        Self { noise }
    }

    /// Single-band sample in [-1, 1].
    #[inline]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        f64::from(self.noise.get_noise_2d(x as f32, y as f32)).clamp(-1.0, 1.0)
    }

    /// Fractal sum of `octaves` bands. Each band doubles frequency and scales
    /// amplitude by `persistence`; the sum is normalized by total amplitude.
    pub fn octave(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        let mut freq = 1.0;
        let mut norm = 0.0;
        for _ in 0..octaves {
            sum += self.sample(x * freq, y * freq) * amp;
            norm += amp;
            amp *= persistence;
            freq *= 2.0;
        }
        if norm <= 0.0 {
            return 0.0;
        }
        (sum / norm).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        let a = NoiseField::new(1234);
        let b = NoiseField::new(1234);
        for i in 0..64 {
            let x = i as f64 * 0.37 - 11.0;
            let y = i as f64 * -0.21 + 3.5;
            assert_eq!(a.sample(x, y), b.sample(x, y));
            assert_eq!(a.octave(x, y, 4, 0.5), b.octave(x, y, 4, 0.5));
        }
    }

    #[test]
    fn no_jump_across_integer_boundary() {
        let n = NoiseField::new(7);
        for i in -8..8 {
            let x = i as f64;
            let left = n.sample(x - 1e-4, 0.3);
            let right = n.sample(x + 1e-4, 0.3);
            assert!((left - right).abs() < 0.01, "discontinuity at x={x}");
        }
    }

    #[test]
    fn zero_octaves_is_flat() {
        let n = NoiseField::new(3);
        assert_eq!(n.octave(1.5, 2.5, 0, 0.5), 0.0);
    }
}
