//! Methylation-motif classification from nanopore signal alignments.
//!
//! [`alignment`] pulls per-read features out of alignment tables,
//! [`dataset`] turns class directories into train/test matrices and
//! [`experiment`] trains and scores [`motifnet::Mlp`] classifiers on them.

pub mod alignment;
pub mod dataset;
pub mod error;
pub mod experiment;

pub use alignment::{Direction, NUM_FEATURES};
pub use dataset::{Dataset, DatasetAssembler};
pub use error::{Error, Result};
pub use experiment::{ExperimentConfig, ExperimentReport};
