use anyhow::{Context, Result};
use clap::Parser;
use motifnet_signal::experiment::{self, ExperimentConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Train and score motif classifiers on signal alignments.
#[derive(Parser)]
#[command(name = "motif-classify", version)]
struct Cli {
    /// Experiment config (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Override the number of train/evaluate iterations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Override the number of training epochs
    #[arg(short, long)]
    epochs: Option<usize>,

    /// Override the directory the results are appended to
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Log loss and training accuracy every this many epochs
    #[arg(long)]
    report_every: Option<usize>,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let mut config = ExperimentConfig::from_json(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(epochs) = cli.epochs {
        config.epochs = epochs;
    }
    if let Some(out_dir) = cli.out_dir {
        config.out_dir = out_dir;
    }
    if cli.report_every.is_some() {
        config.report_every = cli.report_every;
    }

    let report = experiment::run(&config)?;
    println!(
        "motif {} ({}): mean accuracy {:.4} over {} iterations, written to {}",
        config.motif_start,
        config.direction,
        report.mean_accuracy,
        report.accuracies.len(),
        report.output.display()
    );
    Ok(())
}
