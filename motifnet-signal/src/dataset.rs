//! Turns directories of alignment files into labeled train and test matrices.
//!
//! Every directory is one class, labeled by its position in the class list.

use crate::alignment::{Direction, FeatureVector, NUM_FEATURES, cull_motif_features};
use crate::error::{Error, Result};
use motifnet::math::add_row_vector;
use motifnet::tensor::{Dim2, Tensor, Tensor1, Tensor2};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct Dataset {
    pub train_features: Tensor2<f64>,
    pub train_labels: Vec<usize>,
    pub test_features: Tensor2<f64>,
    pub test_labels: Vec<usize>,
    /// NaN-ignoring training column means removed from both sets, if centered.
    pub feature_mean: Option<Vec<f64>>,
}

impl Dataset {
    pub fn num_classes(&self) -> usize {
        self.train_labels
            .iter()
            .chain(&self.test_labels)
            .max()
            .map_or(0, |&max| max + 1)
    }
}

/// Feature vectors of one class, split into training and test reads.
#[derive(Clone, Debug, Default)]
pub struct ClassSplit {
    pub train: Vec<FeatureVector>,
    pub test: Vec<FeatureVector>,
}

#[derive(Clone, Debug)]
pub struct DatasetAssembler {
    classes: Vec<PathBuf>,
    direction: Direction,
    motif_start: usize,
    train_test_split: f64,
    max_samples: usize,
    center_data: bool,
    shuffle_train: bool,
}

impl DatasetAssembler {
    pub fn new(classes: Vec<PathBuf>, direction: Direction, motif_start: usize) -> Self {
        DatasetAssembler {
            classes,
            direction,
            motif_start,
            train_test_split: 0.9,
            max_samples: usize::MAX,
            center_data: true,
            shuffle_train: true,
        }
    }

    /// Fraction of each class's reads used for training.
    pub fn with_train_test_split(mut self, portion: f64) -> Self {
        self.train_test_split = portion;
        self
    }

    /// Upper bound on the reads used per class.
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn with_centering(mut self, center_data: bool) -> Self {
        self.center_data = center_data;
        self
    }

    pub fn with_shuffled_training(mut self, shuffle_train: bool) -> Self {
        self.shuffle_train = shuffle_train;
        self
    }

    /// Draws a fresh split of every class and builds the matrices.
    pub fn assemble<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Dataset> {
        let mut splits = Vec::with_capacity(self.classes.len());
        for dir in &self.classes {
            let split = collect_class(
                rng,
                dir,
                self.direction,
                self.motif_start,
                self.train_test_split,
                self.max_samples,
            )?;
            debug!(class = %dir.display(), train = split.train.len(), test = split.test.len(), "collected class");
            splits.push(split);
        }

        let (mut train_features, train_labels) = stack_classes(splits.iter().map(|s| s.train.as_slice()));
        let (mut test_features, test_labels) = stack_classes(splits.iter().map(|s| s.test.as_slice()));
        if train_labels.is_empty() {
            return Err(Error::EmptySplit { set: "training" });
        }
        if test_labels.is_empty() {
            return Err(Error::EmptySplit { set: "test" });
        }

        let feature_mean = if self.center_data {
            let mean = nan_column_mean(&train_features);
            subtract_row_vector(&mut train_features, &mean);
            subtract_row_vector(&mut test_features, &mean);
            Some(mean)
        } else {
            None
        };
        replace_nan(&mut train_features, 0.0);
        replace_nan(&mut test_features, 0.0);

        let (train_features, train_labels) = if self.shuffle_train {
            shuffle_rows_with_labels(rng, &train_features, &train_labels)
        } else {
            (train_features, train_labels)
        };

        Ok(Dataset {
            train_features,
            train_labels,
            test_features,
            test_labels,
            feature_mean,
        })
    }
}

/// Non-empty alignment files of `direction` in `dir`, sorted by name.
pub fn list_alignments(dir: &Path, direction: Direction) -> Result<Vec<PathBuf>> {
    let suffix = direction.file_suffix();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix));
        if !matches {
            continue;
        }
        let metadata = entry.metadata().map_err(|e| Error::io(&path, e))?;
        if metadata.is_file() && metadata.len() > 0 {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Number of leading items that go to training: `floor(portion * len)`.
pub fn split_index(portion: f64, len: usize) -> usize {
    ((portion * len as f64).floor().max(0.0) as usize).min(len)
}

/// Shuffles the class's files, keeps at most `max_samples` and splits them.
pub fn collect_class<R: Rng + ?Sized>(
    rng: &mut R,
    dir: &Path,
    direction: Direction,
    motif_start: usize,
    portion: f64,
    max_samples: usize,
) -> Result<ClassSplit> {
    let mut files = list_alignments(dir, direction)?;
    if files.is_empty() {
        return Err(Error::EmptyClass {
            path: dir.to_path_buf(),
            direction: direction.as_str(),
        });
    }
    files.shuffle(rng);
    files.truncate(max_samples);

    let (train, test) = files.split_at(split_index(portion, files.len()));
    let extract = |paths: &[PathBuf]| -> Result<Vec<FeatureVector>> {
        paths
            .iter()
            .map(|path| cull_motif_features(motif_start, path, direction))
            .collect()
    };
    Ok(ClassSplit {
        train: extract(train)?,
        test: extract(test)?,
    })
}

/// Stacks per-class rows in class order; the label of a row is its class index.
pub fn stack_classes<'a, I>(classes: I) -> (Tensor2<f64>, Vec<usize>)
where
    I: IntoIterator<Item = &'a [FeatureVector]>,
{
    let mut data = Vec::new();
    let mut labels = Vec::new();
    for (label, rows) in classes.into_iter().enumerate() {
        for row in rows {
            data.extend_from_slice(row);
            labels.push(label);
        }
    }
    (Tensor::from_vec(data, Dim2(labels.len(), NUM_FEATURES)), labels)
}

/// Column means ignoring NaN; NaN for a column that is all NaN.
pub fn nan_column_mean(data: &Tensor2<f64>) -> Vec<f64> {
    let mut sums = vec![0.0; data.cols()];
    let mut counts = vec![0usize; data.cols()];
    for row in data.iter_major_axis() {
        for ((sum, count), &x) in sums.iter_mut().zip(&mut counts).zip(row) {
            if !x.is_nan() {
                *sum += x;
                *count += 1;
            }
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| if count == 0 { f64::NAN } else { sum / count as f64 })
        .collect()
}

pub fn subtract_row_vector(data: &mut Tensor2<f64>, row: &[f64]) {
    let negated = Tensor1::from_vec_1d(row.iter().map(|x| -x).collect());
    add_row_vector(data, &negated);
}

pub fn replace_nan(data: &mut Tensor2<f64>, value: f64) {
    data.iter_mut().filter(|x| x.is_nan()).for_each(|x| *x = value);
}

/// Permutes the rows of `data` and `labels` with the same permutation.
pub fn shuffle_rows_with_labels<R: Rng + ?Sized>(
    rng: &mut R,
    data: &Tensor2<f64>,
    labels: &[usize],
) -> (Tensor2<f64>, Vec<usize>) {
    assert_eq!(data.rows(), labels.len());
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.shuffle(rng);
    let labels = order.iter().map(|&i| labels[i]).collect();
    (data.select_rows(&order), labels)
}
