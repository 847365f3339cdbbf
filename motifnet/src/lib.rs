//! Feed-forward classifier trained from scratch with full-batch gradient
//! descent: dense layers, a shared hidden activation, a softmax output and
//! L2-regularized cross-entropy loss.

pub mod activation;
pub mod error;
pub mod loss;
pub mod math;
pub mod net;
pub mod scoring;
pub mod tensor;
pub mod train;
pub mod util;

pub use activation::{Activation, ActivationFn};
pub use error::{Error, Result};
pub use net::{Gradients, Mlp, NetBuilder};
pub use scoring::MulticlassScorer;
pub use train::{FitConfig, FitReport};
