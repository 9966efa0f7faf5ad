//! Classifier mapping observed conditions to discrete operating states.

use std::path::Path;

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::artifact::{self, ArtifactError};
use super::features::{FEATURE_DIM, FeatureExtractor};
use super::mlp::Mlp;
use super::{TrainReport, split_indices};

/// Hyperparameters for fitting the learned models.
#[derive(Debug, Clone, Copy)]
pub struct FitParams {
    /// Width of the single hidden layer.
    pub hidden_size: usize,
    /// Number of training epochs.
    pub epochs: usize,
    /// SGD learning rate.
    pub learning_rate: f32,
    /// Fraction of samples held out for validation.
    pub validation_split: f32,
}

/// A trained classifier from feature vectors to operating states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateClassifier {
    mlp: Mlp,
    extractor: FeatureExtractor,
    n_states: usize,
    state_names: Vec<String>,
    /// Metrics of the training run that produced this model.
    pub report: TrainReport,
}

impl StateClassifier {
    /// Fits a classifier on per-step features and state labels.
    ///
    /// Holds out a validation split (deterministically, from `seed`), trains
    /// on the remainder, and evaluates the held-out loss and accuracy.
    ///
    /// # Panics
    ///
    /// Panics if inputs and labels differ in length, the set is empty, or a
    /// label is out of range.
    pub fn fit(
        extractor: FeatureExtractor,
        inputs: &[Vec<f32>],
        labels: &[usize],
        n_states: usize,
        state_names: Vec<String>,
        params: &FitParams,
        seed: u64,
    ) -> Self {
        assert_eq!(inputs.len(), labels.len());
        assert!(!inputs.is_empty(), "cannot fit on an empty dataset");
        assert!(labels.iter().all(|&l| l < n_states));
        assert_eq!(state_names.len(), n_states);

        let mut rng = StdRng::seed_from_u64(seed);
        let (train_idx, val_idx) = split_indices(inputs.len(), params.validation_split, &mut rng);

        let train_x: Vec<Vec<f32>> = train_idx.iter().map(|&i| inputs[i].clone()).collect();
        let train_y: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();
        let val_x: Vec<Vec<f32>> = val_idx.iter().map(|&i| inputs[i].clone()).collect();
        let val_y: Vec<usize> = val_idx.iter().map(|&i| labels[i]).collect();

        let mut mlp = Mlp::new(&[FEATURE_DIM, params.hidden_size, n_states], &mut rng);
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

    /// Number of states the classifier distinguishes.
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

    /// Predicts the state for a prepared feature vector.
    pub fn predict(&self, features: &[f32]) -> usize {
        self.mlp.predict(features)
    }

    /// Predicts the state for raw observations at step `t`.
    pub fn predict_at(&self, t: usize, demand_kw: f32, heat_demand_kw: f32) -> usize {
        let features = self.extractor.features(t, demand_kw, heat_demand_kw);
        self.mlp.predict(&features)
    }

    /// Persists the model under `<out_dir>/classifier/model.json`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] on I/O or serialization failure.
    pub fn save(&self, out_dir: &Path) -> Result<(), ArtifactError> {
        artifact::save_json(self, &artifact::classifier_path(out_dir))
    }

    /// Loads a previously persisted model from `<out_dir>/classifier/model.json`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] if the file is missing or malformed.
    pub fn load(out_dir: &Path) -> Result<Self, ArtifactError> {
        artifact::load_json(&artifact::classifier_path(out_dir))
    }
}
