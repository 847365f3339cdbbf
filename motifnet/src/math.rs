use crate::tensor::{Dim2, Dims, Tensor, Tensor1, Tensor2};
use std::iter::zip;

/// Generic matrix multiplication (gemm): `c = alpha * op(a) * op(b) + beta * c`,
/// where `op` optionally transposes its argument.
pub fn matmul(
    alpha: f64,
    a: &Tensor2<f64>,
    ta: bool,
    b: &Tensor2<f64>,
    tb: bool,
    beta: f64,
    c: &mut Tensor2<f64>,
) {
    let &Dim2(a_rows, a_cols) = a.dims();
    let &Dim2(b_rows, b_cols) = b.dims();
    let (m, k, rsa, csa) = if ta {
        (a_cols, a_rows, 1, a_cols as isize)
    } else {
        (a_rows, a_cols, a_cols as isize, 1)
    };
    let (n, rsb, csb) = if tb {
        assert_eq!(b_cols, k);
        (b_rows, 1, b_cols as isize)
    } else {
        assert_eq!(b_rows, k);
        (b_cols, b_cols as isize, 1)
    };
    assert_eq!(c.dims(), &Dim2(m, n));
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        c.iter_mut().for_each(|x| *x *= beta);
        return;
    }
    unsafe {
        matrixmultiply::dgemm(
            m,
            k,
            n,
            alpha,
            a.as_ref().as_ptr(),
            rsa,
            csa,
            b.as_ref().as_ptr(),
            rsb,
            csb,
            beta,
            c.as_mut().as_mut_ptr(),
            n as isize,
            1,
        );
    }
}

/// `b = alpha * column_sum(a) + beta * b`
pub fn column_sum(alpha: f64, a: &Tensor2<f64>, beta: f64, b: &mut Tensor1<f64>) {
    assert_eq!(b.len(), a.cols());
    b.iter_mut().for_each(|x| *x *= beta);
    for row in a.iter_major_axis() {
        for (t, &s) in zip(b.iter_mut(), row) {
            *t += alpha * s;
        }
    }
}

/// `b = alpha * a + beta * b`
pub fn add_assign<D: Dims>(alpha: f64, a: &Tensor<f64, D>, beta: f64, b: &mut Tensor<f64, D>) {
    assert_eq!(a.dims(), b.dims());
    for (&ai, bi) in zip(a, b) {
        *bi = alpha * ai + beta * *bi;
    }
}

/// Adds the bias vector to every row of `a`.
pub fn add_row_vector(a: &mut Tensor2<f64>, bias: &Tensor1<f64>) {
    assert_eq!(a.cols(), bias.len());
    for row in a.iter_major_axis_mut() {
        for (x, &b) in zip(row, bias) {
            *x += b;
        }
    }
}

/// Row-wise softmax.
pub fn softmax(activation: &Tensor2<f64>, output: &mut Tensor2<f64>) {
    assert_eq!(activation.dims(), output.dims());
    for (output_row, activation_row) in zip(output.iter_major_axis_mut(), activation.iter_major_axis()) {
        // shift the values by -max(inputs) to prevent overflow (does not affect the result)
        let max = activation_row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut sum = 0.0;
        for (t, &a) in zip(output_row.iter_mut(), activation_row) {
            let x = (a - max).exp();
            sum += x;
            *t = x;
        }
        for t in output_row.iter_mut() {
            *t /= sum
        }
    }
}

/// Index of the largest element, first one wins on ties.
pub fn argmax(a: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in a.iter().enumerate().skip(1) {
        if x > a[best] {
            best = i;
        }
    }
    best
}

pub fn sum_of_squares(a: &[f64]) -> f64 {
    a.iter().fold(0.0, |acc, &x| acc + x * x)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tensor;
    use crate::tensor::Dim1;
    use approx::assert_abs_diff_eq;

    macro_rules! assert_slice_equal {
        ($a:ident, $b:expr) => {{
            let b = $b;
            if $a.len() != b.len()
                || !std::iter::zip($a.as_ref(), &b).all(|(&i, &j)| (i - j).abs() <= f64::EPSILON)
            {
                let mismatch: Vec<usize> = std::iter::zip($a.as_ref(), &b)
                    .enumerate()
                    .filter(|&(_, (&i, &j))| (i - j).abs() > f64::EPSILON)
                    .map(|(idx, _)| idx)
                    .collect();
                panic!(
                    "slices not equal: left={:?}, right={:?}, mismatched indexes={:?}",
                    &$a, &b, &mismatch
                );
            }
        }};
    }

    #[test]
    fn test_mat_mul() {
        let a = tensor![[1., 2., 3.], [4., 5., 6.]];
        let b = tensor![[7., 8.], [9., 10.], [11., 12.]];
        let c = tensor![[0.5, 1.], [1., 0.25]];

        let mut r2x2 = Tensor::filled(0., Dim2(2, 2));
        let mut r2x3 = Tensor::filled(0., Dim2(2, 3));
        let mut r3x2 = Tensor::filled(0., Dim2(3, 2));
        let mut r3x3 = Tensor::filled(0., Dim2(3, 3));

        // various combinations of A X B

        r2x2.fill(100.); // existing values should be ignored
        matmul(1.0, &a, false, &b, false, 0.0, &mut r2x2);
        assert_slice_equal!(r2x2, [58., 64., 139., 154.]);

        r2x2.fill(0.);
        matmul(0.5, &a, false, &b, false, 0.0, &mut r2x2);
        assert_slice_equal!(r2x2, [29., 32., 69.5, 77.]);

        r2x2.fill(1.);
        matmul(1.0, &a, false, &b, false, 5.0, &mut r2x2);
        assert_slice_equal!(r2x2, [63., 69., 144., 159.]);

        // B X A

        r3x3.fill(100.);
        matmul(1.0, &b, false, &a, false, 0.0, &mut r3x3);
        assert_slice_equal!(r3x3, [39., 54., 69., 49., 68., 87., 59., 82., 105.]);

        // C X Bt

        r2x3.fill(100.);
        matmul(1.0, &c, false, &b, true, 0.0, &mut r2x3);
        assert_slice_equal!(r2x3, [11.5, 14.5, 17.5, 9., 11.5, 14.]);

        // At X C

        r3x2.fill(100.);
        matmul(1.0, &a, true, &c, false, 0.0, &mut r3x2);
        assert_slice_equal!(r3x2, [4.5, 2., 6., 3.25, 7.5, 4.5]);
    }

    #[test]
    fn test_mat_mul_empty_inner() {
        let a: Tensor2<f64> = Tensor::zeroed(Dim2(2, 0));
        let b: Tensor2<f64> = Tensor::zeroed(Dim2(0, 2));
        let mut c = Tensor::filled(3.0, Dim2(2, 2));
        matmul(1.0, &a, false, &b, false, 0.5, &mut c);
        assert_slice_equal!(c, [1.5, 1.5, 1.5, 1.5]);
    }

    #[test]
    fn test_column_sum_and_add_assign() {
        let a = tensor![[1., 2.], [3., 4.], [5., 6.]];
        let mut sums = Tensor1::filled(1.0, Dim1(2));
        column_sum(1.0, &a, 0.0, &mut sums);
        assert_slice_equal!(sums, [9., 12.]);

        let mut b = tensor![[1., 1.], [1., 1.], [1., 1.]];
        add_assign(-0.5, &a, 1.0, &mut b);
        assert_slice_equal!(b, [0.5, 0., -0.5, -1., -1.5, -2.]);

        add_row_vector(&mut b, &tensor![1., 2.]);
        assert_slice_equal!(b, [1.5, 2., 0.5, 1., -0.5, 0.]);
    }

    #[test]
    fn test_softmax_is_stable() {
        let z = tensor![[1000., 1000.], [-1000., 0.], [1., 2.]];
        let mut p = Tensor::zeroed(Dim2(3, 2));
        softmax(&z, &mut p);
        assert!(p.iter().all(|x| x.is_finite()));
        assert_abs_diff_eq!(p[[0, 0]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p[[1, 1]], 1.0, epsilon = 1e-12);
        let e = 1f64.exp();
        assert_abs_diff_eq!(p[[2, 0]], 1.0 / (1.0 + e), epsilon = 1e-12);
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[3.0]), 0);
    }

}
