//! Deterministic inputs shared by the benchmarks and tests.

use crate::tensor::{Dim2, Tensor, Tensor2};
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

pub const SIZE_LG: usize = 1024;
pub const SIZE_MD: usize = 256;
pub const SIZE_SM: usize = 64;
const SEED: u64 = 0x8371943;

pub fn get_square_matrices<T>(size: usize) -> [Tensor2<T>; 3]
where
    StandardNormal: Distribution<T>,
{
    let mut rng = StdRng::seed_from_u64(SEED);
    [
        Tensor2::from_distribution(&mut rng, StandardNormal, Dim2(size, size)),
        Tensor2::from_distribution(&mut rng, StandardNormal, Dim2(size, size)),
        Tensor2::from_distribution(&mut rng, StandardNormal, Dim2(size, size)),
    ]
}

/// Two linearly separable 2-d clusters around `(-2, -2)` (label 0) and
/// `(2, 2)` (label 1), each point jittered by at most 1 per axis.
///
/// Rows alternate between the classes.
pub fn two_class_blobs(samples_per_class: usize, seed: u64) -> (Tensor2<f64>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let jitter = Uniform::new_inclusive(-1.0, 1.0);
    let mut data = Vec::with_capacity(samples_per_class * 4);
    let mut labels = Vec::with_capacity(samples_per_class * 2);
    for _ in 0..samples_per_class {
        for (label, center) in [(0, -2.0), (1, 2.0)] {
            data.push(center + jitter.sample(&mut rng));
            data.push(center + jitter.sample(&mut rng));
            labels.push(label);
        }
    }
    (Tensor::from_vec(data, Dim2(samples_per_class * 2, 2)), labels)
}
