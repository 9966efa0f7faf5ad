//! Shared fixtures for integration tests.

use der_statesim::config::ScenarioConfig;
use der_statesim::data::Drivers;
use der_statesim::model::{FeatureExtractor, StateClassifier, TransitionModel};
use der_statesim::model::transition::TransitionSample;
use der_statesim::sim::ReferenceDispatch;

/// Loads a preset trimmed down for fast test training runs.
pub fn small_scenario(preset: &str) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::from_preset(preset).unwrap();
    cfg.simulation.days = 3;
    cfg.training.epochs = 30;
    cfg.training.hidden_size = 8;
    cfg
}

/// Synthesizes drivers for the scenario's full training horizon.
pub fn drivers_for(cfg: &ScenarioConfig) -> Drivers {
    cfg.build_drivers()
}

/// Runs the full training pipeline: reference dispatch, feature fitting, and
/// both model fits.
pub fn train_models(
    cfg: &ScenarioConfig,
    drivers: &Drivers,
) -> (StateClassifier, TransitionModel) {
    let sim_config = cfg.sim_config();
    let mut system = cfg.build_system().unwrap();

    let dispatch = ReferenceDispatch::new(drivers);
    let labels = dispatch.label_states(&mut system, drivers, &sim_config);

    let total = sim_config.total_steps();
    let demand: Vec<f32> = (0..total).map(|t| drivers.demand_at(t)).collect();
    let heat: Vec<f32> = (0..total).map(|t| drivers.heat_at(t)).collect();
    let extractor = FeatureExtractor::fit(sim_config.steps_per_day, &demand, &heat);

    let state_names: Vec<String> = system
        .state_space()
        .iter()
        .map(|s| s.name.clone())
        .collect();
    let params = cfg.fit_params();

    let inputs: Vec<Vec<f32>> = (0..total)
        .map(|t| extractor.features(t, demand[t], heat[t]))
        .collect();
    let classifier = StateClassifier::fit(
        extractor.clone(),
        &inputs,
        &labels,
        system.n_states(),
        state_names.clone(),
        &params,
        sim_config.seed,
    );

    let samples: Vec<TransitionSample> = (0..total - 1)
        .map(|t| TransitionSample {
            state: labels[t],
            next_features: extractor.features(t + 1, demand[t + 1], heat[t + 1]),
            next_state: labels[t + 1],
        })
        .collect();
    let transition = TransitionModel::fit(
        extractor,
        &samples,
        system.n_states(),
        state_names,
        &params,
        sim_config.seed,
    );

    (classifier, transition)
}
