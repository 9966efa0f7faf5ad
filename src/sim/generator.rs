//! Synthetic profile generation by rolling the transition model forward.

use rand::{SeedableRng, rngs::StdRng};

use crate::data::Drivers;
use crate::model::TransitionModel;
use crate::systems::DerSystem;

use super::types::{SimConfig, StepRecord};

/// Rolls a trained [`TransitionModel`] forward through a [`DerSystem`].
///
/// Each step: build the features of the upcoming step, restrict the model's
/// next-state distribution to the physically feasible states, sample, then
/// apply the chosen state to the physical system and record the resulting
/// energy values. The run is deterministic given the seed in its `SimConfig`,
/// and the physical components guarantee that no recorded state violates
/// storage bounds.
#[derive(Debug, Clone)]
pub struct ProfileGenerator {
    config: SimConfig,
}

impl ProfileGenerator {
    /// Creates a generator for the given timing configuration.
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// The generator's timing configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Synthesizes a load profile of exactly `horizon` steps.
    ///
    /// `initial_state` seeds the first transition; it is not itself emitted.
    /// A horizon of zero yields an empty profile.
    ///
    /// # Panics
    ///
    /// Panics if `initial_state` is out of range or the model's state count
    /// does not match the system's.
    pub fn generate(
        &self,
        system: &mut DerSystem,
        model: &TransitionModel,
        drivers: &Drivers,
        initial_state: usize,
        horizon: usize,
    ) -> Vec<StepRecord> {
        assert!(initial_state < system.n_states());
        assert_eq!(model.n_states(), system.n_states());

        let dt = self.config.dt_hours;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut state = initial_state;
        let mut records = Vec::with_capacity(horizon);

        for t in 0..horizon {
            let demand_kw = drivers.demand_at(t);
            let heat_kw = drivers.heat_at(t);
            let features = model.extractor().features(t, demand_kw, heat_kw);

            let feasible = system.feasible_states(dt, heat_kw);
            let next = model.sample_masked(state, &features, &feasible, &mut rng);
            let outcome = system.apply(dt, next, heat_kw);

            records.push(StepRecord {
                timestep: t,
                time_hr: t as f32 * dt,
                state_idx: next,
                state_name: system.state_space().get(next).name.clone(),
                el_power_kw: outcome.el_power_kw,
                th_gen_kw: outcome.th_gen_kw,
                unmet_heat_kw: outcome.unmet_heat_kw,
                demand_kw,
                heat_demand_kw: heat_kw,
                battery_soc: outcome.battery_soc,
                tank_soc: outcome.tank_soc,
            });
            state = next;
        }

        records
    }
}
