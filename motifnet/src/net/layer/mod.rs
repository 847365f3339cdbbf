mod fully_connected;

pub use fully_connected::{DenseLayer, LayerGradients};
