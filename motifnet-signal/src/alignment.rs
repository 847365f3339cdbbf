//! Per-read features around a motif, taken from signal-alignment tables.
//!
//! Each alignment file has one whitespace-separated line per aligned event:
//!
//! | column | content                       |
//! |--------|-------------------------------|
//! | 0      | reference position            |
//! | 4      | strand, `t` or `c`            |
//! | 5      | observed event mean           |
//! | 6      | observed event noise          |
//! | 8      | posterior of the alignment    |
//! | 9      | expected mean for the k-mer   |
//! | 10     | expected noise for the k-mer  |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

pub const KMER_LENGTH: usize = 6;
pub const FEATURES_PER_POSITION: usize = 3;
pub const NUM_FEATURES: usize = KMER_LENGTH * FEATURES_PER_POSITION;

const POSITION: usize = 0;
const STRAND: usize = 4;
const EVENT_MEAN: usize = 5;
const EVENT_NOISE: usize = 6;
const POSTERIOR: usize = 8;
const EXPECTED_MEAN: usize = 9;
const EXPECTED_NOISE: usize = 10;
const MIN_COLUMNS: usize = EXPECTED_NOISE + 1;

pub type FeatureVector = [f64; NUM_FEATURES];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Template strand reads, `*.forward.tsv`.
    Forward,
    /// Complement strand reads, `*.backward.tsv`.
    Backward,
}

impl Direction {
    /// Strand marker of the lines this direction reads.
    pub fn strand(self) -> &'static str {
        match self {
            Direction::Forward => "t",
            Direction::Backward => "c",
        }
    }

    pub fn file_suffix(self) -> &'static str {
        match self {
            Direction::Forward => ".forward.tsv",
            Direction::Backward => ".backward.tsv",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference positions covered by the k-mer starting at `start`.
pub fn motif_range(start: usize) -> Range<usize> {
    start..start + KMER_LENGTH
}

/// Reads the motif features of one alignment file.
///
/// See [`read_motif_features`].
pub fn cull_motif_features(start: usize, path: &Path, direction: Direction) -> Result<FeatureVector> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    read_motif_features(BufReader::new(file), path, start, direction)
}

/// Builds the feature vector of the motif at `start` from alignment lines.
///
/// For every motif position the vector holds `mean - expected_mean`,
/// `noise - expected_noise` and the posterior of the best observation on the
/// strand of `direction`, or NaN if there is none. An observation only
/// replaces another with a strictly higher posterior, and a posterior must be
/// above 0 to count. `path` is used for error messages only.
pub fn read_motif_features<R: BufRead>(
    reader: R,
    path: &Path,
    start: usize,
    direction: Direction,
) -> Result<FeatureVector> {
    let motif = motif_range(start);
    let mut features = [f64::NAN; NUM_FEATURES];
    let mut best_posterior = [0.0; KMER_LENGTH];

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < MIN_COLUMNS {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("expected at least {MIN_COLUMNS} columns, found {}", columns.len()),
            });
        }
        if columns[STRAND] != direction.strand() {
            continue;
        }
        let position: i64 = parse_column(&columns, POSITION, path, line_no)?;
        let Some(offset) = usize::try_from(position)
            .ok()
            .filter(|p| motif.contains(p))
            .map(|p| p - motif.start)
        else {
            continue;
        };

        let mean: f64 = parse_column(&columns, EVENT_MEAN, path, line_no)?;
        let noise: f64 = parse_column(&columns, EVENT_NOISE, path, line_no)?;
        let posterior: f64 = parse_column(&columns, POSTERIOR, path, line_no)?;
        let expected_mean: f64 = parse_column(&columns, EXPECTED_MEAN, path, line_no)?;
        let expected_noise: f64 = parse_column(&columns, EXPECTED_NOISE, path, line_no)?;

        if posterior > best_posterior[offset] {
            let base = offset * FEATURES_PER_POSITION;
            features[base..base + FEATURES_PER_POSITION].copy_from_slice(&[
                mean - expected_mean,
                noise - expected_noise,
                posterior,
            ]);
            best_posterior[offset] = posterior;
        }
    }
    Ok(features)
}

fn parse_column<T>(columns: &[&str], idx: usize, path: &Path, line: usize) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    columns[idx].parse().map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        line,
        reason: format!("column {idx} ({:?}): {e}", columns[idx]),
    })
}
