//! Repeated train/evaluate runs of one motif classifier.

use crate::alignment::{Direction, NUM_FEATURES};
use crate::dataset::{Dataset, DatasetAssembler};
use crate::error::{Error, Result};
use motifnet::{ActivationFn, FitConfig, Mlp};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything one experiment needs, loadable from JSON. Missing keys take
/// their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// One directory of alignment files per class, in label order.
    pub classes: Vec<PathBuf>,
    pub direction: Direction,
    /// Reference position of the first base of the motif.
    pub motif_start: usize,
    /// Fraction of each class's reads used for training.
    pub train_test_split: f64,
    pub iterations: usize,
    pub epochs: usize,
    /// Reads used per class at most.
    pub max_samples: usize,
    pub activation: ActivationFn,
    /// Learning rate.
    pub epsilon: f64,
    /// L2 coefficient.
    pub lambda: f64,
    pub hidden_shape: Vec<usize>,
    pub report_every: Option<usize>,
    pub center_data: bool,
    pub seed: u64,
    pub out_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let fit = FitConfig::default();
        ExperimentConfig {
            classes: Vec::new(),
            direction: Direction::Forward,
            motif_start: 0,
            train_test_split: 0.9,
            iterations: 10,
            epochs: fit.epochs,
            max_samples: 1000,
            activation: ActivationFn::Tanh,
            epsilon: fit.epsilon,
            lambda: fit.lambda,
            hidden_shape: vec![10],
            report_every: fit.report_every,
            center_data: true,
            seed: 0,
            out_dir: PathBuf::from("."),
        }
    }
}

impl ExperimentConfig {
    pub fn from_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| Error::io(path, e))
    }

    pub fn validate(&self) -> Result<()> {
        if self.classes.len() < 2 {
            return Err(Error::Config(format!(
                "need at least 2 class directories, got {}",
                self.classes.len()
            )));
        }
        if !(self.train_test_split > 0.0 && self.train_test_split < 1.0) {
            return Err(Error::Config(format!(
                "train_test_split must be strictly between 0 and 1, got {}",
                self.train_test_split
            )));
        }
        if self.iterations == 0 {
            return Err(Error::Config("iterations must be at least 1".into()));
        }
        Ok(())
    }

    /// Layer sizes: the motif features, the hidden layers, one output per class.
    pub fn dimensions(&self) -> Vec<usize> {
        let mut dims = Vec::with_capacity(self.hidden_shape.len() + 2);
        dims.push(NUM_FEATURES);
        dims.extend_from_slice(&self.hidden_shape);
        dims.push(self.classes.len());
        dims
    }

    pub fn fit_config(&self) -> FitConfig {
        FitConfig {
            epochs: self.epochs,
            epsilon: self.epsilon,
            lambda: self.lambda,
            report_every: self.report_every,
        }
    }

    pub fn assembler(&self) -> DatasetAssembler {
        DatasetAssembler::new(self.classes.clone(), self.direction, self.motif_start)
            .with_train_test_split(self.train_test_split)
            .with_max_samples(self.max_samples)
            .with_centering(self.center_data)
    }

    /// `<out_dir>/<motif_start>.forward.tsv` or `.backward.tsv`.
    pub fn output_path(&self) -> PathBuf {
        self.out_dir
            .join(format!("{}{}", self.motif_start, self.direction.file_suffix()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    /// Test accuracy of every iteration.
    pub accuracies: Vec<f64>,
    pub mean_accuracy: f64,
    pub output: PathBuf,
}

/// Trains a fresh network on the training part of `dataset` and returns its
/// test accuracy.
pub fn train_and_evaluate(config: &ExperimentConfig, dataset: &Dataset) -> Result<f64> {
    let mut net = Mlp::new(&config.dimensions(), config.activation)?;
    let report = net.fit(&dataset.train_features, &dataset.train_labels, &config.fit_config())?;
    debug!(loss = report.loss, accuracy = report.accuracy, "trained network");
    let scorer = net.score(&dataset.test_features, &dataset.test_labels)?;
    scorer.log_report();
    Ok(scorer.accuracy())
}

fn run_iteration<R: Rng + ?Sized>(config: &ExperimentConfig, assembler: &DatasetAssembler, rng: &mut R) -> Result<f64> {
    let dataset = assembler.assemble(rng)?;
    debug!(
        train = dataset.train_labels.len(),
        test = dataset.test_labels.len(),
        "assembled dataset"
    );
    train_and_evaluate(config, &dataset)
}

/// Runs every iteration and appends the accuracies and their mean to
/// [`ExperimentConfig::output_path`].
///
/// Each accuracy is written as soon as its iteration finishes, followed at
/// the end by a `>{motif_start}\t{mean}` line.
pub fn run(config: &ExperimentConfig) -> Result<ExperimentReport> {
    config.validate()?;
    fs::create_dir_all(&config.out_dir).map_err(|e| Error::io(&config.out_dir, e))?;
    let output = config.output_path();
    let mut out_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&output)
        .map_err(|e| Error::io(&output, e))?;

    let assembler = config.assembler();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut accuracies = Vec::with_capacity(config.iterations);
    for iteration in 0..config.iterations {
        let accuracy = run_iteration(config, &assembler, &mut rng)?;
        writeln!(out_file, "{accuracy}").map_err(|e| Error::io(&output, e))?;
        info!(iteration, accuracy, "finished iteration");
        accuracies.push(accuracy);
    }

    let mean_accuracy = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
    writeln!(out_file, ">{}\t{mean_accuracy}", config.motif_start).map_err(|e| Error::io(&output, e))?;
    info!(
        motif = config.motif_start,
        direction = %config.direction,
        mean_accuracy,
        "experiment done"
    );
    Ok(ExperimentReport {
        accuracies,
        mean_accuracy,
        output,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn class_dir(root: &Path, name: &str, deltas: impl Iterator<Item = f64>) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        for (i, delta) in deltas.enumerate() {
            let mut file = File::create(dir.join(format!("read{i}.forward.tsv"))).unwrap();
            writeln!(file, "747\tref\tACGTAC\t1\tt\t{}\t1.5\tACGTAC\t0.5\t50\t1", 50.0 + delta).unwrap();
            writeln!(file, "748\tref\tCGTACG\t1\tc\t70\t1.5\tCGTACG\t0.5\t50\t1").unwrap();
        }
        dir
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: ExperimentConfig =
            serde_json::from_str(r#"{"classes": ["c", "mc", "hmc"], "motif_start": 747, "direction": "backward"}"#)
                .unwrap();
        assert_eq!(config.classes.len(), 3);
        assert_eq!(config.direction, Direction::Backward);
        assert_eq!(config.epochs, 10_000);
        assert_eq!(config.activation, ActivationFn::Tanh);
        assert_eq!(config.dimensions(), vec![18, 10, 3]);
        assert_eq!(config.fit_config(), FitConfig::default());
        assert_eq!(config.output_path(), Path::new("./747.backward.tsv"));
        config.validate().unwrap();
    }

    #[test]
    fn test_config_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("experiment.json");
        let config = ExperimentConfig {
            classes: vec!["a".into(), "b".into()],
            activation: ActivationFn::ReLU { leak: 0.01 },
            hidden_shape: vec![12, 6],
            report_every: Some(100),
            ..ExperimentConfig::default()
        };
        config.save_json(&path).unwrap();
        assert_eq!(ExperimentConfig::from_json(&path).unwrap(), config);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ExperimentConfig::from_json(&path), Err(Error::Json(_))));
        assert!(matches!(
            ExperimentConfig::from_json(&dir.path().join("missing.json")),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_validate() {
        let mut config = ExperimentConfig {
            classes: vec!["only".into()],
            ..ExperimentConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        config.classes.push("other".into());
        for split in [1.5, 1.0, 0.0, f64::NAN] {
            config.train_test_split = split;
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{split}");
        }
        config.train_test_split = 0.5;
        config.iterations = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_run_appends_results() {
        let root = TempDir::new().unwrap();
        let c = class_dir(root.path(), "c", (0..10).map(|i| -1.0 - 0.2 * i as f64));
        let mc = class_dir(root.path(), "mc", (0..10).map(|i| 1.0 + 0.2 * i as f64));
        let config = ExperimentConfig {
            classes: vec![c, mc],
            motif_start: 747,
            train_test_split: 0.8,
            iterations: 2,
            epochs: 500,
            hidden_shape: vec![4],
            out_dir: root.path().join("out"),
            ..ExperimentConfig::default()
        };

        let report = run(&config).unwrap();
        assert_eq!(report.accuracies, vec![1.0, 1.0]);
        assert_eq!(report.mean_accuracy, 1.0);
        assert_eq!(report.output, root.path().join("out").join("747.forward.tsv"));

        run(&config).unwrap();
        let content = fs::read_to_string(&report.output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["1", "1", ">747\t1", "1", "1", ">747\t1"]);
    }

    #[test]
    fn test_run_rejects_empty_class() {
        let root = TempDir::new().unwrap();
        let c = class_dir(root.path(), "c", [1.0, 2.0].into_iter());
        let empty = root.path().join("empty");
        fs::create_dir(&empty).unwrap();
        let config = ExperimentConfig {
            classes: vec![c, empty],
            motif_start: 747,
            iterations: 1,
            epochs: 1,
            out_dir: root.path().to_path_buf(),
            ..ExperimentConfig::default()
        };
        assert!(matches!(run(&config), Err(Error::EmptyClass { .. })));
    }

    #[test]
    fn test_run_rejects_empty_training_set_before_training() {
        let root = TempDir::new().unwrap();
        let c = class_dir(root.path(), "c", [-1.0].into_iter());
        let mc = class_dir(root.path(), "mc", [1.0].into_iter());
        let config = ExperimentConfig {
            classes: vec![c, mc],
            motif_start: 747,
            iterations: 1,
            out_dir: root.path().join("out"),
            ..ExperimentConfig::default()
        };
        config.validate().unwrap();

        // floor(0.9 * 1) leaves every read of both classes for testing
        assert!(matches!(run(&config), Err(Error::EmptySplit { set: "training" })));
        assert_eq!(fs::read_to_string(config.output_path()).unwrap(), "");
    }
}
