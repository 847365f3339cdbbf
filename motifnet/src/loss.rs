use crate::tensor::Tensor2;
use std::iter::zip;

/// Lower bound applied to probabilities before taking the logarithm.
pub const MIN_PROBABILITY: f64 = 1e-300;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LossFn {
    /// Softmax cross-entropy against integer class labels.
    #[default]
    CrossEntropy,
}

impl LossFn {
    /// Mean negative log-likelihood of the labelled class.
    pub fn compute(&self, probs: &Tensor2<f64>, labels: &[usize]) -> f64 {
        match self {
            LossFn::CrossEntropy => {
                debug_assert_eq!(probs.rows(), labels.len());
                let total: f64 = zip(probs.iter_major_axis(), labels)
                    .map(|(row, &label)| -row[label].max(MIN_PROBABILITY).ln())
                    .sum();
                total / labels.len() as f64
            }
        }
    }

    /// Turns the softmax output into the gradient of the summed loss with
    /// respect to the logits, in place.
    pub fn derivative(&self, probs: &mut Tensor2<f64>, labels: &[usize]) {
        match self {
            LossFn::CrossEntropy => {
                debug_assert_eq!(probs.rows(), labels.len());
                for (row, &label) in zip(probs.iter_major_axis_mut(), labels) {
                    row[label] -= 1.0;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tensor;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cross_entropy() {
        let probs = tensor![[0.25, 0.75], [0.5, 0.5]];
        let loss = LossFn::CrossEntropy.compute(&probs, &[1, 0]);
        assert_abs_diff_eq!(loss, -(0.75f64.ln() + 0.5f64.ln()) / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_zero_probability_is_clamped() {
        let probs = tensor![[1.0, 0.0]];
        let loss = LossFn::CrossEntropy.compute(&probs, &[1]);
        assert!(loss.is_finite());
        assert_abs_diff_eq!(loss, -MIN_PROBABILITY.ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_derivative() {
        let mut probs = tensor![[0.25, 0.75], [0.5, 0.5]];
        LossFn::CrossEntropy.derivative(&mut probs, &[1, 0]);
        assert_eq!(probs.as_ref(), &[0.25, -0.25, -0.5, 0.5]);
    }
}
