/// Hyper-parameters for full-batch gradient descent.
///
/// There is no gradient clipping: a large `epsilon` can make training
/// diverge, which [`crate::net::Mlp::fit`] reports as
/// [`crate::Error::NonFiniteGradient`] or [`crate::Error::NonFiniteParameters`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FitConfig {
    pub epochs: usize,
    /// Learning rate.
    pub epsilon: f64,
    /// L2 coefficient applied to weights (not biases).
    pub lambda: f64,
    /// Log loss and training accuracy every this many epochs.
    pub report_every: Option<usize>,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            epochs: 10_000,
            epsilon: 0.01,
            lambda: 0.01,
            report_every: None,
        }
    }
}

impl FitConfig {
    pub(crate) fn should_report(&self, epoch: usize) -> bool {
        match self.report_every {
            Some(every) if every > 0 => epoch % every == 0,
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FitReport {
    pub epochs: usize,
    /// Regularized loss on the training set after the last epoch.
    pub loss: f64,
    /// Training accuracy after the last epoch.
    pub accuracy: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_should_report() {
        let mut config = FitConfig::default();
        assert!(!config.should_report(0));
        config.report_every = Some(0);
        assert!(!config.should_report(0));
        config.report_every = Some(1000);
        assert!(config.should_report(0));
        assert!(!config.should_report(999));
        assert!(config.should_report(2000));
    }
}
