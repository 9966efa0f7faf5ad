//! Transition estimator predicting next-state distributions.

use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::artifact::{self, ArtifactError};
use super::classifier::FitParams;
use super::features::{FEATURE_DIM, FeatureExtractor};
use super::mlp::{Mlp, argmax};
use super::{TrainReport, split_indices};

/// A trained estimator of `(current state, exogenous inputs) -> next state`.
///
/// The network input is the one-hot encoded current state concatenated with
/// the feature vector of the upcoming step; the output is a distribution over
/// next states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionModel {
    mlp: Mlp,
    extractor: FeatureExtractor,
    n_states: usize,
    state_names: Vec<String>,
    /// Metrics of the training run that produced this model.
    pub report: TrainReport,
}

/// One training sample: the state at `t`, the features of `t + 1`, and the
/// observed state at `t + 1`.
#[derive(Debug, Clone)]
pub struct TransitionSample {
    /// State index at the current step.
    pub state: usize,
    /// Feature vector of the next step.
    pub next_features: Vec<f32>,
    /// Observed state index at the next step.
    pub next_state: usize,
}

impl TransitionModel {
    /// Fits the estimator on observed transitions.
    ///
    /// # Panics
    ///
    /// Panics if the sample set is empty or a state index is out of range.
    pub fn fit(
        extractor: FeatureExtractor,
        samples: &[TransitionSample],
        n_states: usize,
        state_names: Vec<String>,
        params: &FitParams,
        seed: u64,
    ) -> Self {
        assert!(!samples.is_empty(), "cannot fit on an empty dataset");
        assert!(
            samples
                .iter()
                .all(|s| s.state < n_states && s.next_state < n_states)
        );
        assert_eq!(state_names.len(), n_states);

        let inputs: Vec<Vec<f32>> = samples
            .iter()
            .map(|s| encode(s.state, &s.next_features, n_states))
            .collect();
        let targets: Vec<usize> = samples.iter().map(|s| s.next_state).collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let (train_idx, val_idx) = split_indices(inputs.len(), params.validation_split, &mut rng);

        let train_x: Vec<Vec<f32>> = train_idx.iter().map(|&i| inputs[i].clone()).collect();
        let train_y: Vec<usize> = train_idx.iter().map(|&i| targets[i]).collect();
        let val_x: Vec<Vec<f32>> = val_idx.iter().map(|&i| inputs[i].clone()).collect();
        let val_y: Vec<usize> = val_idx.iter().map(|&i| targets[i]).collect();

        let mut mlp = Mlp::new(
            &[n_states + FEATURE_DIM, params.hidden_size, n_states],
            &mut rng,
        );
        let losses = mlp.train(
            &train_x,
            &train_y,
            params.epochs,
            params.learning_rate,
            &mut rng,
        );

        let validation_loss = mlp.mean_loss(&val_x, &val_y);
        let correct = val_x
            .iter()
            .zip(&val_y)
            .filter(|&(x, &y)| mlp.predict(x) == y)
            .count();
        let validation_accuracy = if val_y.is_empty() {
            0.0
        } else {
            correct as f32 / val_y.len() as f32
        };

        Self {
            mlp,
            extractor,
            n_states,
            state_names,
            report: TrainReport {
                epochs: params.epochs,
                train_loss: losses.last().copied().unwrap_or(0.0),
                validation_loss,
                validation_accuracy,
            },
        }
    }

    /// Number of states in the model's state space.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Name of state `idx`.
    pub fn state_name(&self, idx: usize) -> &str {
        &self.state_names[idx]
    }

    /// The fitted feature extractor.
    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Next-state probability distribution given the current state and the
    /// upcoming step's features.
    pub fn distribution(&self, state: usize, next_features: &[f32]) -> Vec<f32> {
        self.mlp
            .probabilities(&encode(state, next_features, self.n_states))
    }

    /// Samples the next state from the full distribution.
    pub fn sample(&self, state: usize, next_features: &[f32], rng: &mut StdRng) -> usize {
        let probs = self.distribution(state, next_features);
        sample_cdf(&probs, rng)
    }

    /// Samples the next state restricted to `feasible` states.
    ///
    /// Infeasible states get zero mass; the remainder is renormalized. When
    /// the model places no mass on any feasible state the choice falls back
    /// to a uniform draw over `feasible`.
    ///
    /// # Panics
    ///
    /// Panics if `feasible` is empty.
    pub fn sample_masked(
        &self,
        state: usize,
        next_features: &[f32],
        feasible: &[usize],
        rng: &mut StdRng,
    ) -> usize {
        assert!(!feasible.is_empty(), "feasible set must not be empty");

        let probs = self.distribution(state, next_features);
        let masses: Vec<f32> = feasible.iter().map(|&i| probs[i]).collect();
        let total: f32 = masses.iter().sum();
        if total <= 1e-12 {
            return feasible[rng.random_range(0..feasible.len())];
        }

        let normalized: Vec<f32> = masses.iter().map(|m| m / total).collect();
        feasible[sample_cdf(&normalized, rng)]
    }

    /// Most likely next state.
    pub fn argmax_next(&self, state: usize, next_features: &[f32]) -> usize {
        argmax(&self.distribution(state, next_features))
    }

    /// Persists the model under `<out_dir>/transition/model.json`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] on I/O or serialization failure.
    pub fn save(&self, out_dir: &Path) -> Result<(), ArtifactError> {
        artifact::save_json(self, &artifact::transition_path(out_dir))
    }

    /// Loads a previously persisted model from `<out_dir>/transition/model.json`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] if the file is missing or malformed.
    pub fn load(out_dir: &Path) -> Result<Self, ArtifactError> {
        artifact::load_json(&artifact::transition_path(out_dir))
    }
}

/// One-hot state encoding concatenated with the feature vector.
fn encode(state: usize, features: &[f32], n_states: usize) -> Vec<f32> {
    let mut x = vec![0.0; n_states + features.len()];
    x[state] = 1.0;
    x[n_states..].copy_from_slice(features);
    x
}

/// Inverse-CDF draw from a probability vector.
fn sample_cdf(probs: &[f32], rng: &mut StdRng) -> usize {
    let u: f32 = rng.random();
    let mut acc = 0.0;
    for (i, p) in probs.iter().enumerate() {
        acc += p;
        if u < acc {
            return i;
        }
    }
    probs.len() - 1 // float round-off
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> TransitionModel {
        // Deterministic 3-cycle: 0 -> 1 -> 2 -> 0.
        let extractor = FeatureExtractor::fit(24, &[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]);
        let samples: Vec<TransitionSample> = (0..90)
            .map(|t| TransitionSample {
                state: t % 3,
                next_features: extractor.features(t + 1, 1.0, 0.0),
                next_state: (t + 1) % 3,
            })
            .collect();
        let params = FitParams {
            hidden_size: 12,
            epochs: 120,
            learning_rate: 0.1,
            validation_split: 0.1,
        };
        TransitionModel::fit(
            extractor,
            &samples,
            3,
            vec!["a".into(), "b".into(), "c".into()],
            &params,
            7,
        )
    }

    #[test]
    fn distribution_sums_to_one() {
        let model = fixture();
        let features = model.extractor().features(5, 1.0, 0.0);
        let probs = model.distribution(0, &features);
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn learns_the_cycle() {
        let model = fixture();
        let features = model.extractor().features(10, 1.0, 0.0);
        assert_eq!(model.argmax_next(0, &features), 1);
        assert_eq!(model.argmax_next(1, &features), 2);
        assert_eq!(model.argmax_next(2, &features), 0);
    }

    #[test]
    fn sampling_is_deterministic_given_seed() {
        let model = fixture();
        let features = model.extractor().features(3, 1.0, 0.0);

        let draw = || {
            let mut rng = StdRng::seed_from_u64(99);
            (0..20)
                .map(|_| model.sample(1, &features, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn masked_sampling_respects_feasible_set() {
        let model = fixture();
        let features = model.extractor().features(3, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let next = model.sample_masked(0, &features, &[0, 2], &mut rng);
            assert!(next == 0 || next == 2);
        }
    }

    #[test]
    fn masked_sampling_falls_back_to_uniform() {
        let model = fixture();
        let features = model.extractor().features(3, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(5);
        // From state 0 the model puts essentially all mass on state 1;
        // restricting to {2} must still return 2.
        let next = model.sample_masked(0, &features, &[2], &mut rng);
        assert_eq!(next, 2);
    }
}
