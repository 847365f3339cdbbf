/// Errors raised by the network.
///
/// Every check runs before parameters are touched, so a failed call leaves
/// the network exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Network topology needs at least an input and an output size, all non-zero.
    #[error("invalid dimensions {dims:?}: need at least 2 sizes, all greater than 0")]
    InvalidDimensions { dims: Vec<usize> },

    /// Matrix/vector shapes do not line up.
    #[error("dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("label {label} at row {row} out of range for {classes} classes")]
    LabelOutOfRange {
        row: usize,
        label: usize,
        classes: usize,
    },

    #[error("operation needs at least one sample")]
    EmptyBatch,

    /// Training diverged; the offending update was not applied.
    #[error("non-finite gradient in epoch {epoch}")]
    NonFiniteGradient { epoch: usize },

    /// The step of this epoch would overflow a weight or bias; it was not applied.
    #[error("non-finite parameters after the update of epoch {epoch}")]
    NonFiniteParameters { epoch: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
