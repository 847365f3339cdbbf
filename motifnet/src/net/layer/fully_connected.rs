use crate::math::{add_assign, add_row_vector, matmul};
use crate::net::initializer::NetInitializer;
use crate::tensor::{Dim1, Dim2, Tensor1, Tensor2};
use std::fmt::{Debug, Formatter};

#[derive(Clone, PartialEq)]
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    weights: Tensor2<f64>,
    biases: Tensor1<f64>,
}

/// Parameter gradients of one [`DenseLayer`], shaped like its parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerGradients {
    pub weights: Tensor2<f64>,
    pub biases: Tensor1<f64>,
}

impl LayerGradients {
    pub fn is_finite(&self) -> bool {
        self.weights.iter().chain(self.biases.iter()).all(|x| x.is_finite())
    }
}

impl DenseLayer {
    pub(crate) fn create(
        layer_idx: usize,
        input_size: usize,
        output_size: usize,
        initializer: &mut dyn NetInitializer,
    ) -> Self {
        let weights = initializer.get_weights(layer_idx, input_size, output_size);
        let biases = initializer.get_biases(layer_idx, output_size);
        assert_eq!(weights.dims(), &Dim2(input_size, output_size), "Invalid dimensions for weights");
        assert_eq!(biases.dims(), &Dim1(output_size), "Invalid dimensions for biases");
        DenseLayer {
            input_size,
            output_size,
            weights,
            biases,
        }
    }

    /// Computes the pre-activation `z = input · weights + biases`.
    pub fn forward(&self, input: &Tensor2<f64>, z: &mut Tensor2<f64>) {
        let num_rows = input.rows();
        assert_eq!(input.dims(), &Dim2(num_rows, self.input_size), "Invalid dimensions for input tensor");
        assert_eq!(z.dims(), &Dim2(num_rows, self.output_size), "Invalid dimensions for output tensor");
        matmul(1.0, input, false, &self.weights, false, 0.0, z);
        add_row_vector(z, &self.biases);
    }

    /// Gradient-descent step: `params -= learn_rate * gradients`.
    pub fn update(&mut self, gradients: &LayerGradients, learn_rate: f64) {
        add_assign(-learn_rate, &gradients.weights, 1.0, &mut self.weights);
        add_assign(-learn_rate, &gradients.biases, 1.0, &mut self.biases);
    }

    pub fn is_finite(&self) -> bool {
        self.weights.iter().chain(self.biases.iter()).all(|x| x.is_finite())
    }

    pub(crate) fn accepts(&self, gradients: &LayerGradients) -> bool {
        gradients.weights.dims() == self.weights.dims() && gradients.biases.dims() == self.biases.dims()
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    #[inline]
    pub fn weights(&self) -> &Tensor2<f64> {
        &self.weights
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut Tensor2<f64> {
        &mut self.weights
    }

    #[inline]
    pub fn biases(&self) -> &Tensor1<f64> {
        &self.biases
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut Tensor1<f64> {
        &mut self.biases
    }
}

impl Debug for DenseLayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseLayer")
            .field("size", &self.output_size)
            .field("weights", &self.weights)
            .field("biases", &self.biases)
            .finish()
    }
}
