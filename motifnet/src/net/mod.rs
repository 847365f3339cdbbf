use crate::activation::{Activation, ActivationFn};
use crate::error::{Error, Result};
use crate::loss::LossFn;
use crate::math::{add_assign, column_sum, matmul, softmax, sum_of_squares};
use crate::net::initializer::{NetInitializer, RandomNetInitializer};
use crate::net::layer::{DenseLayer, LayerGradients};
use crate::scoring::MulticlassScorer;
use crate::tensor::{Dim1, Dim2, Tensor, Tensor2};
use crate::train::{FitConfig, FitReport};
use std::fmt::{Debug, Formatter};
use tracing::{debug, info, warn};

pub mod initializer;
pub mod layer;

/// Multi-layer perceptron with a softmax output layer.
///
/// Hidden layers share one activation; the last layer always feeds a softmax
/// and is trained against integer class labels with cross-entropy loss.
#[derive(Clone)]
pub struct Mlp<A: Activation = ActivationFn> {
    layers: Box<[DenseLayer]>,
    activation_fn: A,
    loss: LossFn,
}

/// Gradients for every layer of a network, first layer first.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    layers: Vec<LayerGradients>,
}

impl Gradients {
    #[inline]
    pub fn layers(&self) -> &[LayerGradients] {
        &self.layers
    }

    pub fn is_finite(&self) -> bool {
        self.layers.iter().all(LayerGradients::is_finite)
    }
}

impl<A: Activation> Mlp<A> {
    /// Builds a network from layer sizes, e.g. `[18, 10, 3]` for 18 inputs,
    /// one hidden layer of 10 units and 3 classes.
    ///
    /// Weights always come from [`RandomNetInitializer::default`], so two
    /// networks built from the same arguments are identical.
    pub fn new(dimensions: &[usize], activation_fn: A) -> Result<Self> {
        let (&input_size, sizes) = dimensions.split_first().ok_or_else(|| Error::InvalidDimensions {
            dims: dimensions.to_vec(),
        })?;
        sizes
            .iter()
            .fold(NetBuilder::new(input_size), |builder, &size| builder.with_layer(size))
            .build(activation_fn)
    }

    pub fn predict(&self, input: &Tensor2<f64>) -> Result<Tensor2<f64>> {
        self.check_input(input)?;
        let (_, probs) = self.forward(input);
        Ok(probs)
    }

    /// Trains the network in place with full-batch gradient descent.
    ///
    /// Every epoch computes the gradients of all layers against the current
    /// parameters and only then applies them. An epoch whose gradients or
    /// updated parameters are not finite ends training with an error and
    /// leaves the parameters of the previous epoch in place.
    pub fn fit(&mut self, samples: &Tensor2<f64>, labels: &[usize], config: &FitConfig) -> Result<FitReport> {
        self.check_batch(samples, labels)?;
        debug!(rows = samples.rows(), epochs = config.epochs, "starting training");

        for epoch in 0..config.epochs {
            let gradients = self.backprop(samples, labels, config.lambda);
            if !gradients.is_finite() {
                warn!(epoch, "non-finite gradient, stopping before the update");
                return Err(Error::NonFiniteGradient { epoch });
            }
            let mut layers = self.layers.clone();
            for (layer, layer_gradients) in layers.iter_mut().zip(&gradients.layers) {
                layer.update(layer_gradients, config.epsilon);
            }
            if !layers.iter().all(DenseLayer::is_finite) {
                warn!(epoch, "update overflows the parameters, stopping before it");
                return Err(Error::NonFiniteParameters { epoch });
            }
            self.layers = layers;

            if config.should_report(epoch) {
                let loss = self.loss_unchecked(samples, labels, config.lambda);
                let accuracy = self.score_unchecked(samples, labels).accuracy();
                info!(epoch, loss, accuracy, "training progress");
            }
        }

        let loss = self.loss_unchecked(samples, labels, config.lambda);
        let accuracy = self.score_unchecked(samples, labels).accuracy();
        info!("training accuracy: {accuracy:.2}");
        Ok(FitReport {
            epochs: config.epochs,
            loss,
            accuracy,
        })
    }

    /// Computes the parameter gradients for one full-batch step without
    /// applying them.
    ///
    /// These are gradients of the summed (not averaged) cross-entropy plus
    /// `0.5 * lambda * weight_sum_of_squares()`.
    pub fn gradients(&self, samples: &Tensor2<f64>, labels: &[usize], lambda: f64) -> Result<Gradients> {
        self.check_batch(samples, labels)?;
        Ok(self.backprop(samples, labels, lambda))
    }

    /// Applies `params -= epsilon * gradients` to every layer.
    pub fn apply_gradients(&mut self, gradients: &Gradients, epsilon: f64) -> Result<()> {
        if gradients.layers.len() != self.layers.len() {
            return Err(Error::DimensionMismatch {
                what: "gradient layers",
                expected: self.layers.len(),
                got: gradients.layers.len(),
            });
        }
        if let Some((layer, g)) = self.layers.iter().zip(&gradients.layers).find(|&(l, g)| !l.accepts(g)) {
            return Err(Error::DimensionMismatch {
                what: "gradient parameter count",
                expected: layer.weights().len() + layer.biases().len(),
                got: g.weights.len() + g.biases.len(),
            });
        }
        self.update(gradients, epsilon);
        Ok(())
    }

    /// Mean negative log-likelihood of the true labels plus
    /// `0.5 * lambda * weight_sum_of_squares()`.
    pub fn loss(&self, samples: &Tensor2<f64>, labels: &[usize], lambda: f64) -> Result<f64> {
        self.check_batch(samples, labels)?;
        Ok(self.loss_unchecked(samples, labels, lambda))
    }

    /// Fraction of rows whose most probable class matches the label.
    pub fn evaluate(&self, samples: &Tensor2<f64>, labels: &[usize]) -> Result<f64> {
        Ok(self.score(samples, labels)?.accuracy())
    }

    /// Confusion matrix of the predictions against the labels.
    pub fn score(&self, samples: &Tensor2<f64>, labels: &[usize]) -> Result<MulticlassScorer> {
        self.check_batch(samples, labels)?;
        Ok(self.score_unchecked(samples, labels))
    }

    /// Sum of squares over all weight matrices (biases excluded).
    pub fn weight_sum_of_squares(&self) -> f64 {
        self.layers.iter().map(|l| sum_of_squares(l.weights().as_ref())).sum()
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    pub fn dimensions(&self) -> Vec<usize> {
        std::iter::once(self.input_size())
            .chain(self.layers.iter().map(DenseLayer::output_size))
            .collect()
    }

    #[inline]
    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    #[inline]
    pub fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    #[inline]
    pub fn activation_fn(&self) -> &A {
        &self.activation_fn
    }

    /// Returns the hidden-layer activations in order and the softmax output.
    fn forward(&self, input: &Tensor2<f64>) -> (Vec<Tensor2<f64>>, Tensor2<f64>) {
        let num_rows = input.rows();
        let (last, hidden_layers) = self.layers.split_last().expect("network has at least one layer");

        let mut activations: Vec<Tensor2<f64>> = Vec::with_capacity(hidden_layers.len());
        for layer in hidden_layers {
            let prev = activations.last().unwrap_or(input);
            let mut z = Tensor::zeroed(Dim2(num_rows, layer.output_size()));
            layer.forward(prev, &mut z);
            let mut activation = Tensor::zeroed(*z.dims());
            self.activation_fn.compute(&z, &mut activation);
            activations.push(activation);
        }

        let prev = activations.last().unwrap_or(input);
        let mut z = Tensor::zeroed(Dim2(num_rows, last.output_size()));
        last.forward(prev, &mut z);
        let mut probs = Tensor::zeroed(*z.dims());
        softmax(&z, &mut probs);
        (activations, probs)
    }

    fn backprop(&self, samples: &Tensor2<f64>, labels: &[usize], lambda: f64) -> Gradients {
        let num_rows = samples.rows();
        let (activations, mut delta) = self.forward(samples);
        self.loss.derivative(&mut delta, labels);

        let mut layers = Vec::with_capacity(self.layers.len());
        for (idx, layer) in self.layers.iter().enumerate().rev() {
            let input = if idx == 0 { samples } else { &activations[idx - 1] };

            let mut weights = Tensor::zeroed(*layer.weights().dims());
            matmul(1.0, input, true, &delta, false, 0.0, &mut weights);
            add_assign(lambda, layer.weights(), 1.0, &mut weights);

            let mut biases = Tensor::zeroed(Dim1(layer.output_size()));
            column_sum(1.0, &delta, 0.0, &mut biases);

            if idx > 0 {
                let mut input_error = Tensor::zeroed(Dim2(num_rows, layer.input_size()));
                matmul(1.0, &delta, false, layer.weights(), true, 0.0, &mut input_error);
                self.activation_fn.compute_error(&activations[idx - 1], &mut input_error);
                delta = input_error;
            }

            layers.push(LayerGradients { weights, biases });
        }
        layers.reverse();
        Gradients { layers }
    }

    fn update(&mut self, gradients: &Gradients, epsilon: f64) {
        for (layer, layer_gradients) in self.layers.iter_mut().zip(&gradients.layers) {
            layer.update(layer_gradients, epsilon);
        }
    }

    fn loss_unchecked(&self, samples: &Tensor2<f64>, labels: &[usize], lambda: f64) -> f64 {
        let (_, probs) = self.forward(samples);
        self.loss.compute(&probs, labels) + 0.5 * lambda * self.weight_sum_of_squares()
    }

    fn score_unchecked(&self, samples: &Tensor2<f64>, labels: &[usize]) -> MulticlassScorer {
        let (_, probs) = self.forward(samples);
        let mut scorer = MulticlassScorer::new(self.output_size());
        scorer.process_batch(&probs, labels);
        scorer
    }

    fn check_input(&self, input: &Tensor2<f64>) -> Result<()> {
        if input.cols() != self.input_size() {
            return Err(Error::DimensionMismatch {
                what: "input columns",
                expected: self.input_size(),
                got: input.cols(),
            });
        }
        Ok(())
    }

    fn check_batch(&self, samples: &Tensor2<f64>, labels: &[usize]) -> Result<()> {
        self.check_input(samples)?;
        if samples.rows() != labels.len() {
            return Err(Error::DimensionMismatch {
                what: "labels",
                expected: samples.rows(),
                got: labels.len(),
            });
        }
        if labels.is_empty() {
            return Err(Error::EmptyBatch);
        }
        let classes = self.output_size();
        if let Some((row, &label)) = labels.iter().enumerate().find(|&(_, &l)| l >= classes) {
            return Err(Error::LabelOutOfRange { row, label, classes });
        }
        Ok(())
    }
}

pub struct NetBuilder {
    input_size: usize,
    initializer: Box<dyn NetInitializer>,
    layers: Vec<usize>,
}

impl NetBuilder {
    pub fn new(input_size: usize) -> Self {
        NetBuilder {
            input_size,
            initializer: Box::new(RandomNetInitializer::default()),
            layers: Vec::new(),
        }
    }

    pub fn with_initializer<I>(mut self, initializer: I) -> Self
    where
        I: 'static + NetInitializer,
    {
        self.initializer = Box::new(initializer);
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_initializer(RandomNetInitializer::seed_from_u64(seed))
    }

    /// Appends a layer; the last one added is the softmax output layer.
    pub fn with_layer(mut self, size: usize) -> Self {
        self.layers.push(size);
        self
    }

    pub fn build<A: Activation>(mut self, activation_fn: A) -> Result<Mlp<A>> {
        if self.layers.is_empty() || self.input_size == 0 || self.layers.contains(&0) {
            let mut dims = vec![self.input_size];
            dims.extend_from_slice(&self.layers);
            return Err(Error::InvalidDimensions { dims });
        }
        let mut prev_size = self.input_size;
        let mut layers = Vec::with_capacity(self.layers.len());
        for (layer_idx, &size) in self.layers.iter().enumerate() {
            layers.push(DenseLayer::create(layer_idx, prev_size, size, self.initializer.as_mut()));
            prev_size = size;
        }
        debug!(input_size = self.input_size, layers = ?self.layers, ?activation_fn, "built network");
        Ok(Mlp {
            layers: layers.into_boxed_slice(),
            activation_fn,
            loss: LossFn::default(),
        })
    }
}

impl<A: Activation> Debug for Mlp<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mlp")
            .field("activation_fn", &self.activation_fn)
            .field("loss", &self.loss)
            .field("layers", &self.layers)
            .finish()
    }
}
