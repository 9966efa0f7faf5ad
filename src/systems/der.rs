//! Composite DER system: joint state space over battery and CHP components.

use super::battery::Battery;
use super::chp::ChpPlant;
use super::heat_storage::HeatStorage;
use super::{EnvironmentInteraction, System};

/// The DER configurations supported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerConfiguration {
    /// Battery storage only.
    Battery,
    /// Battery storage plus CHP plant with hot water tank.
    BatteryChpHwt,
    /// CHP plant with hot water tank.
    ChpHwt,
}

impl DerConfiguration {
    /// Configuration name as used in scenario files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::BatteryChpHwt => "battery_chp_hwt",
            Self::ChpHwt => "chp_hwt",
        }
    }

    /// Parses a configuration name; returns `None` for unknown names.
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "battery" => Some(Self::Battery),
            "battery_chp_hwt" => Some(Self::BatteryChpHwt),
            "chp_hwt" => Some(Self::ChpHwt),
            _ => None,
        }
    }

    /// Whether this configuration includes a battery.
    pub fn has_battery(&self) -> bool {
        matches!(self, Self::Battery | Self::BatteryChpHwt)
    }

    /// Whether this configuration includes a CHP plant and tank.
    pub fn has_chp(&self) -> bool {
        matches!(self, Self::BatteryChpHwt | Self::ChpHwt)
    }

    /// All valid configuration names.
    pub const NAMES: &[&str] = &["battery", "battery_chp_hwt", "chp_hwt"];
}

/// One discrete operating state of the joint DER system.
#[derive(Debug, Clone)]
pub struct StateInfo {
    /// Joint state index.
    pub idx: usize,
    /// Human-readable name, e.g. `bat+2.50kW|chp100`.
    pub name: String,
    /// Target electric power of the state in kW (positive = consuming).
    pub el_power_kw: f32,
    /// Target thermal power of the state in kW (negative = generating heat).
    pub th_power_kw: f32,
}

/// The full discrete state space of a [`DerSystem`].
#[derive(Debug, Clone)]
pub struct StateSpace {
    states: Vec<StateInfo>,
}

impl StateSpace {
    /// Returns the state at `idx`.
    pub fn get(&self, idx: usize) -> &StateInfo {
        &self.states[idx]
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` when the space is empty.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterates over all states in index order.
    pub fn iter(&self) -> impl Iterator<Item = &StateInfo> {
        self.states.iter()
    }
}

/// Result of applying one joint state for one step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Net electric power of the DER system in kW (positive = consuming).
    pub el_power_kw: f32,
    /// Thermal power generated by the CHP in kW (positive magnitude).
    pub th_gen_kw: f32,
    /// Heat demand the tank could not cover in kW (>= 0).
    pub unmet_heat_kw: f32,
    /// Thermal surplus the tank could not absorb in kW (>= 0).
    pub dumped_heat_kw: f32,
    /// Battery SOC after the step, when a battery is present.
    pub battery_soc: Option<f32>,
    /// Tank SOC after the step, when a tank is present.
    pub tank_soc: Option<f32>,
}

/// A DER system assembled from physical components per configuration.
///
/// The joint state space is the cartesian product of the battery action grid
/// and the CHP mode set (a single pseudo-entry when a component is absent),
/// indexed as `battery_idx * n_chp_modes + chp_mode`. Feasibility combines
/// the battery's charge bounds, the CHP's staying-time rules, and the tank's
/// SOC window against the exogenous heat demand.
#[derive(Debug, Clone)]
pub struct DerSystem {
    configuration: DerConfiguration,
    battery: Option<Battery>,
    chp: Option<ChpPlant>,
    tank: Option<HeatStorage>,
    state_space: StateSpace,
    n_chp_modes: usize,
}

impl DerSystem {
    /// Assembles a system from its components.
    ///
    /// # Panics
    ///
    /// Panics if the supplied components do not match the configuration
    /// (battery and CHP/tank presence).
    pub fn new(
        configuration: DerConfiguration,
        battery: Option<Battery>,
        chp: Option<ChpPlant>,
        tank: Option<HeatStorage>,
    ) -> Self {
        assert_eq!(configuration.has_battery(), battery.is_some());
        assert_eq!(configuration.has_chp(), chp.is_some());
        assert_eq!(configuration.has_chp(), tank.is_some());

        let n_chp_modes = chp.as_ref().map_or(1, |c| c.actions().len());
        let n_battery = battery.as_ref().map_or(1, |b| b.actions().len());

        let mut states = Vec::with_capacity(n_battery * n_chp_modes);
        for b in 0..n_battery {
            for m in 0..n_chp_modes {
                let idx = b * n_chp_modes + m;
                let (bat_name, bat_el) = battery.as_ref().map_or(("", 0.0), |bat| {
                    let a = bat.actions().get(b);
                    (a.name.as_str(), a.el_power_kw)
                });
                let (chp_name, chp_el, chp_th) = chp.as_ref().map_or(("", 0.0, 0.0), |plant| {
                    let a = plant.actions().get(m);
                    (a.name.as_str(), a.el_power_kw, a.th_power_kw)
                });
                let name = match (bat_name.is_empty(), chp_name.is_empty()) {
                    (false, false) => format!("{bat_name}|{chp_name}"),
                    (false, true) => bat_name.to_string(),
                    (true, false) => chp_name.to_string(),
                    (true, true) => "idle".to_string(),
                };
                states.push(StateInfo {
                    idx,
                    name,
                    el_power_kw: bat_el + chp_el,
                    th_power_kw: chp_th,
                });
            }
        }

        Self {
            configuration,
            battery,
            chp,
            tank,
            state_space: StateSpace { states },
            n_chp_modes,
        }
    }

    /// The system's configuration.
    pub fn configuration(&self) -> DerConfiguration {
        self.configuration
    }

    /// The joint discrete state space.
    pub fn state_space(&self) -> &StateSpace {
        &self.state_space
    }

    /// Number of joint states.
    pub fn n_states(&self) -> usize {
        self.state_space.len()
    }

    /// The all-idle joint state (battery idle, CHP off).
    pub fn idle_state(&self) -> usize {
        self.battery.as_ref().map_or(0, |b| b.idle_idx()) * self.n_chp_modes
    }

    /// Battery SOC when a battery is present.
    pub fn battery_soc(&self) -> Option<f32> {
        self.battery.as_ref().map(Battery::soc)
    }

    /// Tank SOC when a tank is present.
    pub fn tank_soc(&self) -> Option<f32> {
        self.tank.as_ref().map(HeatStorage::soc)
    }

    /// Joint states feasible for the next step of `dt_hours` hours under the
    /// given exogenous heat demand.
    ///
    /// Always returns at least one state: if the tank's SOC window rules out
    /// every CHP mode the window is ignored for this step and the CHP's own
    /// feasibility applies (the tank then clamps flows physically).
    pub fn feasible_states(&self, dt_hours: f32, heat_demand_kw: f32) -> Vec<usize> {
        let battery_feasible = self
            .battery
            .as_ref()
            .map_or_else(|| vec![0], |b| b.feasible_action_idxs(dt_hours));

        let chp_feasible = self
            .chp
            .as_ref()
            .map_or_else(|| vec![0], |c| c.feasible_action_idxs(dt_hours));

        let chp_feasible = match (&self.chp, &self.tank) {
            (Some(plant), Some(tank)) => {
                let candidates: Vec<(usize, f32)> = chp_feasible
                    .iter()
                    .map(|&m| {
                        // Net thermal flow into the tank: generation minus demand.
                        let gen_kw = -plant.actions().get(m).th_power_kw;
                        (m, gen_kw - heat_demand_kw)
                    })
                    .collect();
                let filtered = tank.filter_feasible(&candidates, dt_hours);
                if filtered.is_empty() {
                    chp_feasible
                } else {
                    filtered
                }
            }
            _ => chp_feasible,
        };

        let mut joint = Vec::with_capacity(battery_feasible.len() * chp_feasible.len());
        for &b in &battery_feasible {
            for &m in &chp_feasible {
                joint.push(b * self.n_chp_modes + m);
            }
        }
        joint
    }

    /// Applies one joint state for one step and returns the resulting
    /// electric/thermal outcome.
    ///
    /// # Panics
    ///
    /// Panics if `state_idx` is out of range.
    pub fn apply(&mut self, dt_hours: f32, state_idx: usize, heat_demand_kw: f32) -> StepOutcome {
        assert!(state_idx < self.n_states());
        let battery_idx = state_idx / self.n_chp_modes;
        let chp_mode = state_idx % self.n_chp_modes;

        let mut el_kw = 0.0;
        let mut th_kw = heat_demand_kw; // household heat demand consumes
        let mut th_gen_kw = 0.0;

        if let Some(plant) = self.chp.as_mut() {
            let out = plant.state_transition(dt_hours, chp_mode, &EnvironmentInteraction::default());
            el_kw += out.el_power_kw;
            th_kw += out.th_power_kw;
            th_gen_kw = -out.th_power_kw;
        }

        if let Some(bat) = self.battery.as_mut() {
            let out = bat.state_transition(dt_hours, battery_idx, &EnvironmentInteraction::default());
            el_kw += out.el_power_kw;
        }

        let residual_th_kw = match self.tank.as_mut() {
            Some(tank) => {
                tank.state_transition(dt_hours, 0, &EnvironmentInteraction::new(el_kw, th_kw))
                    .th_power_kw
            }
            None => th_kw,
        };

        StepOutcome {
            el_power_kw: el_kw,
            th_gen_kw,
            unmet_heat_kw: residual_th_kw.max(0.0),
            dumped_heat_kw: (-residual_th_kw).max(0.0),
            battery_soc: self.battery_soc(),
            tank_soc: self.tank_soc(),
        }
    }
}
