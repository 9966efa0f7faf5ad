//! Learned components: state classifier and transition estimator.

pub mod artifact;
pub mod classifier;
pub mod features;
pub mod mlp;
pub mod transition;

use std::fmt;

use rand::seq::SliceRandom;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub use artifact::ArtifactError;
pub use classifier::{FitParams, StateClassifier};
pub use features::{FEATURE_DIM, FeatureExtractor};
pub use mlp::Mlp;
pub use transition::TransitionModel;

/// Training metrics reported after fitting a model.
///
/// A model that failed to converge simply carries a poor loss/accuracy here;
/// this is a reported metric, not a program error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    /// Number of training epochs run.
    pub epochs: usize,
    /// Mean training loss of the final epoch.
    pub train_loss: f32,
    /// Mean cross-entropy loss on the held-out split.
    pub validation_loss: f32,
    /// Fraction of held-out samples predicted correctly.
    pub validation_accuracy: f32,
}

impl fmt::Display for TrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epochs={}  train_loss={:.4}  val_loss={:.4}  val_acc={:.1}%",
            self.epochs,
            self.train_loss,
            self.validation_loss,
            self.validation_accuracy * 100.0
        )
    }
}

/// Deterministic train/validation index split.
///
/// Shuffles `0..n` with `rng` and holds out `validation_split` of the samples
/// (at least one when `n > 1` and the split is nonzero).
pub(crate) fn split_indices(
    n: usize,
    validation_split: f32,
    rng: &mut StdRng,
) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut n_val = (n as f32 * validation_split) as usize;
    if validation_split > 0.0 && n_val == 0 && n > 1 {
        n_val = 1;
    }
    let val = order.split_off(n - n_val);
    (order, val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn split_is_disjoint_and_complete() {
        let mut rng = StdRng::seed_from_u64(3);
        let (train, val) = split_indices(10, 0.2, &mut rng);
        assert_eq!(train.len(), 8);
        assert_eq!(val.len(), 2);
        let mut all: Vec<usize> = train.iter().chain(val.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn small_sets_keep_one_validation_sample() {
        let mut rng = StdRng::seed_from_u64(3);
        let (train, val) = split_indices(3, 0.1, &mut rng);
        assert_eq!(val.len(), 1);
        assert_eq!(train.len(), 2);
    }

    #[test]
    fn zero_split_keeps_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        let (train, val) = split_indices(5, 0.0, &mut rng);
        assert_eq!(train.len(), 5);
        assert!(val.is_empty());
    }

    #[test]
    fn report_display() {
        let r = TrainReport {
            epochs: 10,
            train_loss: 0.5,
            validation_loss: 0.6,
            validation_accuracy: 0.87,
        };
        let s = format!("{r}");
        assert!(s.contains("87.0%"));
    }
}
