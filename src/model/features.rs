//! Feature extraction for the learned state models.

use serde::{Deserialize, Serialize};

/// Number of features produced by [`FeatureExtractor::features`].
pub const FEATURE_DIM: usize = 4;

/// Z-normalization statistics for one input channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Normalizer {
    mean: f32,
    std: f32,
}

impl Normalizer {
    /// Fits mean and standard deviation on `values`; a near-zero spread
    /// falls back to a unit scale.
    pub fn fit(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std: 1.0,
            };
        }
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
        let std = var.sqrt();
        Self {
            mean,
            std: if std < 1e-6 { 1.0 } else { std },
        }
    }

    /// Applies the normalization.
    pub fn apply(&self, value: f32) -> f32 {
        (value - self.mean) / self.std
    }
}

/// Maps a timestep and its exogenous demands to the model input vector:
/// time-of-day sine/cosine plus z-normalized electric and thermal demand.
///
/// Fitted on the training series and persisted with each model artifact so
/// training-time and inference-time scaling always agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureExtractor {
    steps_per_day: usize,
    demand_norm: Normalizer,
    heat_norm: Normalizer,
}

impl FeatureExtractor {
    /// Fits normalization statistics on the training demand series.
    ///
    /// # Panics
    ///
    /// Panics if `steps_per_day` is zero.
    pub fn fit(steps_per_day: usize, demand_kw: &[f32], heat_demand_kw: &[f32]) -> Self {
        assert!(steps_per_day > 0);
        Self {
            steps_per_day,
            demand_norm: Normalizer::fit(demand_kw),
            heat_norm: Normalizer::fit(heat_demand_kw),
        }
    }

    /// Builds the feature vector for step `t`.
    pub fn features(&self, t: usize, demand_kw: f32, heat_demand_kw: f32) -> Vec<f32> {
        let day_pos = (t % self.steps_per_day) as f32 / self.steps_per_day as f32;
        let angle = 2.0 * std::f32::consts::PI * day_pos;
        vec![
            angle.sin(),
            angle.cos(),
            self.demand_norm.apply(demand_kw),
            self.heat_norm.apply(heat_demand_kw),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizer_centers_and_scales() {
        let norm = Normalizer::fit(&[1.0, 2.0, 3.0]);
        assert!((norm.apply(2.0)).abs() < 1e-6);
        assert!(norm.apply(3.0) > 0.0);
        assert!(norm.apply(1.0) < 0.0);
    }

    #[test]
    fn constant_series_does_not_blow_up() {
        let norm = Normalizer::fit(&[2.0; 10]);
        assert_eq!(norm.apply(2.0), 0.0);
        assert_eq!(norm.apply(3.0), 1.0);
    }

    #[test]
    fn feature_vector_shape_and_period() {
        let fx = FeatureExtractor::fit(24, &[1.0, 2.0], &[0.5, 1.5]);
        let f0 = fx.features(0, 1.0, 0.5);
        assert_eq!(f0.len(), FEATURE_DIM);
        // Same time of day one day later gives the same temporal encoding.
        let f24 = fx.features(24, 1.0, 0.5);
        assert!((f0[0] - f24[0]).abs() < 1e-6);
        assert!((f0[1] - f24[1]).abs() < 1e-6);
    }
}
