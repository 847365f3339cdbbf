use crate::tensor::{Dim1, Dim2, Tensor, Tensor1, Tensor2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

/// Seed used when no other seed or initializer is given.
pub const DEFAULT_SEED: u64 = 0;

pub trait NetInitializer {
    /// Weights for layer `layer_idx`, shaped `(input_size, output_size)`.
    fn get_weights(&mut self, layer_idx: usize, input_size: usize, output_size: usize) -> Tensor2<f64>;
    fn get_biases(&mut self, layer_idx: usize, size: usize) -> Tensor1<f64>;
}

/// Draws weights from `N(0, 1) / sqrt(fan_in)` and starts biases at zero.
///
/// The generator belongs to the initializer, so two initializers with the same
/// seed always produce the same network.
pub struct RandomNetInitializer {
    rng: StdRng,
}

impl RandomNetInitializer {
    pub fn seed_from_u64(seed: u64) -> Self {
        RandomNetInitializer {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomNetInitializer {
    fn default() -> Self {
        Self::seed_from_u64(DEFAULT_SEED)
    }
}

impl NetInitializer for RandomNetInitializer {
    fn get_weights(&mut self, _layer_idx: usize, input_size: usize, output_size: usize) -> Tensor2<f64> {
        let scale = (input_size as f64).sqrt().recip();
        let mut weights = Tensor::from_distribution(&mut self.rng, StandardNormal, Dim2(input_size, output_size));
        weights.iter_mut().for_each(|w| *w *= scale);
        weights
    }

    fn get_biases(&mut self, _layer_idx: usize, size: usize) -> Tensor1<f64> {
        Tensor::zeroed(Dim1(size))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_same_seed_same_weights() {
        let mut a = RandomNetInitializer::default();
        let mut b = RandomNetInitializer::seed_from_u64(DEFAULT_SEED);
        let wa = a.get_weights(0, 4, 3);
        let wb = b.get_weights(0, 4, 3);
        assert_eq!(wa.dims(), &Dim2(4, 3));
        assert_eq!(wa.as_ref(), wb.as_ref());

        let mut c = RandomNetInitializer::seed_from_u64(DEFAULT_SEED + 1);
        assert_ne!(c.get_weights(0, 4, 3).as_ref(), wa.as_ref());
    }

    #[test]
    fn test_biases_start_at_zero() {
        let biases = RandomNetInitializer::default().get_biases(1, 5);
        assert_eq!(biases.as_ref(), &[0.0; 5]);
    }

    #[test]
    fn test_weights_are_scaled_by_fan_in() {
        let weights = RandomNetInitializer::seed_from_u64(7).get_weights(0, 400, 50);
        let n = weights.len() as f64;
        let variance = weights.iter().map(|w| w * w).sum::<f64>() / n;
        // expected variance 1/400
        assert!((variance * 400.0 - 1.0).abs() < 0.1, "variance {variance}");
    }
}
