use crate::tensor::{Dims, Tensor};
use std::fmt::Debug;
use std::iter::zip;

/// Element-wise hidden-layer activation.
///
/// `derivative` takes the *output* of `apply`, which is what the backward pass
/// has at hand (the cached layer activation).
pub trait Activation: Debug {
    fn apply(&self, z: f64) -> f64;
    fn derivative(&self, activation: f64) -> f64;

    fn compute<D: Dims>(&self, z: &Tensor<f64, D>, output: &mut Tensor<f64, D>)
    where
        Self: Sized,
    {
        assert_eq!(z.dims(), output.dims());
        for (o, &x) in zip(output, z) {
            *o = self.apply(x);
        }
    }

    /// Multiplies `error` in place by the derivative at each activation.
    fn compute_error<D: Dims>(&self, activation: &Tensor<f64, D>, error: &mut Tensor<f64, D>)
    where
        Self: Sized,
    {
        assert_eq!(activation.dims(), error.dims());
        for (e, &a) in zip(error, activation) {
            *e *= self.derivative(a);
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationFn {
    Sigmoid,
    #[default]
    Tanh,
    ReLU {
        leak: f64,
    },
}

impl Activation for ActivationFn {
    #[inline]
    fn apply(&self, z: f64) -> f64 {
        match self {
            ActivationFn::Sigmoid => sigmoid(z),
            ActivationFn::Tanh => z.tanh(),
            &ActivationFn::ReLU { leak } => {
                if z < 0.0 {
                    z * leak
                } else {
                    z
                }
            }
        }
    }

    #[inline]
    fn derivative(&self, activation: f64) -> f64 {
        match self {
            ActivationFn::Sigmoid => activation * (1.0 - activation),
            ActivationFn::Tanh => 1.0 - activation * activation,
            &ActivationFn::ReLU { leak } => {
                if activation > 0.0 {
                    1.0
                } else {
                    leak
                }
            }
        }
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
