use crate::math::argmax;
use crate::tensor::{Dim2, Tensor, Tensor2};
use std::iter::zip;

/// Accumulates a confusion matrix over batches of softmax outputs.
///
/// Rows are expected classes, columns are predicted classes.
#[derive(Clone, Debug)]
pub struct MulticlassScorer {
    matrix: Tensor2<usize>,
    count: usize,
}

impl MulticlassScorer {
    pub fn new(num_classes: usize) -> Self {
        MulticlassScorer {
            matrix: Tensor::zeroed(Dim2(num_classes, num_classes)),
            count: 0,
        }
    }

    pub fn process_batch(&mut self, output: &Tensor2<f64>, expected: &[usize]) {
        assert_eq!(output.rows(), expected.len());
        assert_eq!(output.cols(), self.matrix.cols());
        for (output_row, &expected_idx) in zip(output.iter_major_axis(), expected) {
            let out_idx = argmax(output_row);
            self.matrix[[expected_idx, out_idx]] += 1;
        }
        self.count += expected.len();
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn correct(&self) -> usize {
        (0..self.matrix.rows()).map(|i| self.matrix[[i, i]]).sum()
    }

    /// Fraction of exact matches; 0 when nothing has been scored.
    pub fn accuracy(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.correct() as f64 / self.count as f64
        }
    }

    pub fn error_rate(&self) -> f64 {
        1.0 - self.accuracy()
    }

    #[inline]
    pub fn confusion_matrix(&self) -> &Tensor2<usize> {
        &self.matrix
    }

    /// Confusion matrix with every row scaled to sum to one.
    pub fn normalized(&self) -> Tensor2<f64> {
        let mut out = Tensor::zeroed(*self.matrix.dims());
        for (out_row, row) in zip(out.iter_major_axis_mut(), self.matrix.iter_major_axis()) {
            let total: usize = row.iter().sum();
            if total > 0 {
                for (o, &c) in zip(out_row, row) {
                    *o = c as f64 / total as f64;
                }
            }
        }
        out
    }

    pub fn log_report(&self) {
        let count = self.count;
        let total_incorrect = count - self.correct();
        let percent_incorrect = self.error_rate() * 100.0;
        tracing::info!("Confusion Matrix: {:.3?}", self.normalized());
        tracing::info!("Error rate: {percent_incorrect:.2}% ({total_incorrect}/{count})");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tensor;

    #[test]
    fn test_confusion_matrix() {
        let mut scorer = MulticlassScorer::new(3);
        let output = tensor![[0.8, 0.1, 0.1], [0.2, 0.7, 0.1], [0.6, 0.3, 0.1], [0.1, 0.1, 0.8]];
        scorer.process_batch(&output, &[0, 1, 2, 2]);
        assert_eq!(scorer.count(), 4);
        assert_eq!(scorer.correct(), 3);
        assert_eq!(scorer.accuracy(), 0.75);
        assert_eq!(scorer.confusion_matrix()[[2, 0]], 1);
        let norm = scorer.normalized();
        assert_eq!(norm.row(2), &[0.5, 0.0, 0.5]);
        assert_eq!(norm.row(1), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_empty_scorer() {
        let scorer = MulticlassScorer::new(2);
        assert_eq!(scorer.accuracy(), 0.0);
        assert_eq!(scorer.normalized().as_ref(), &[0.0; 4]);
    }
}
