#[macro_use]
extern crate bencher;

use bencher::Bencher;
use motifnet::math::matmul;
use motifnet::util::bench::*;
use motifnet::{ActivationFn, FitConfig, Mlp};

macro_rules! impl_matmul_bench {
    ($name:ident, $size:expr, $ta:literal, $tb:literal) => {
        fn $name(bench: &mut Bencher) {
            let [a, b, mut c] = get_square_matrices::<f64>($size);
            bench.iter(|| matmul(1.0, &a, $ta, &b, $tb, 0.0, &mut c))
        }
    };
}

impl_matmul_bench!(matmul_lg, SIZE_LG, false, false);
impl_matmul_bench!(matmul_md, SIZE_MD, false, false);
impl_matmul_bench!(matmul_sm, SIZE_SM, false, false);
impl_matmul_bench!(matmul_md_ta, SIZE_MD, true, false);
impl_matmul_bench!(matmul_md_tb, SIZE_MD, false, true);
benchmark_group!(cpu_matmul, matmul_lg, matmul_md, matmul_sm, matmul_md_ta, matmul_md_tb);

macro_rules! impl_fit_bench {
    ($name:ident, $samples:expr, $hidden:expr) => {
        fn $name(bench: &mut Bencher) {
            let (samples, labels) = two_class_blobs($samples, 0);
            let mut net = Mlp::new(&[2, $hidden, 2], ActivationFn::Tanh).unwrap();
            let config = FitConfig {
                epochs: 1,
                ..FitConfig::default()
            };
            bench.iter(|| net.fit(&samples, &labels, &config).unwrap())
        }
    };
}

impl_fit_bench!(fit_epoch_lg, 4096, 64);
impl_fit_bench!(fit_epoch_md, 1024, 32);
impl_fit_bench!(fit_epoch_sm, 128, 10);
benchmark_group!(cpu_fit, fit_epoch_lg, fit_epoch_md, fit_epoch_sm);

benchmark_main!(cpu_matmul, cpu_fit);
