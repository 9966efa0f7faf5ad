//! Physical simulation models for DER components.
//!
//! Each system exposes its discrete operating points as [`action::Action`]s,
//! reports which of them are feasible in its current state, and advances its
//! state one step at a time. Sign convention throughout: positive power is
//! consumption, negative power is generation/release.

pub mod action;
pub mod battery;
pub mod chp;
pub mod der;
pub mod heat_storage;

pub use action::{Action, ActionSet};
pub use battery::Battery;
pub use chp::ChpPlant;
pub use der::{DerConfiguration, DerSystem, StateInfo, StateSpace, StepOutcome};
pub use heat_storage::{HeatStorage, tank_capacity_kwh};

/// Conversion factor between kilojoules and kilowatt-hours.
pub const KWH_PER_KJ: f32 = 0.000_277_778;

/// Density of water in kg/m^3.
pub const WATER_DENSITY: f32 = 1000.0;

/// Heat capacity of water in kWh/(kg·K).
pub const WATER_HEAT_CAPACITY: f32 = 4.190 * KWH_PER_KJ;

/// Electric and thermal power exchanged with the environment during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvironmentInteraction {
    /// Average electric power in kilowatts (positive = consuming).
    pub el_power_kw: f32,
    /// Average thermal power in kilowatts (positive = consuming).
    pub th_power_kw: f32,
}

impl EnvironmentInteraction {
    /// Creates an interaction from electric and thermal power.
    pub fn new(el_power_kw: f32, th_power_kw: f32) -> Self {
        Self {
            el_power_kw,
            th_power_kw,
        }
    }
}

/// A simulated energy system with a discrete action space.
///
/// The simulation loop is: read the feasible actions for the current state,
/// pick one, then call [`System::state_transition`] to advance. Passive
/// systems (e.g. a hot water tank) expose no actions of their own and instead
/// react to the aggregate interaction of the active systems.
pub trait System {
    /// Indices of the actions feasible in the current state for a step of
    /// `dt_hours` hours.
    fn feasible_action_idxs(&self, dt_hours: f32) -> Vec<usize>;

    /// Executes one simulation step.
    ///
    /// `interaction` carries the summed interaction of the other systems;
    /// passive systems consume it and return the remainder they could not
    /// absorb or cover.
    fn state_transition(
        &mut self,
        dt_hours: f32,
        action_idx: usize,
        interaction: &EnvironmentInteraction,
    ) -> EnvironmentInteraction;
}
