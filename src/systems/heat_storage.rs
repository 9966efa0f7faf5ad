//! Hot water tank model: a passive thermal store.

use super::{EnvironmentInteraction, System};

/// Computes a tank's thermal capacity in kWh from physical quantities.
///
/// # Arguments
///
/// * `max_temp` / `min_temp` - Temperature band of the store in K or °C
/// * `volume_m3` - Tank volume in m^3
/// * `density` - Density of the storage medium in kg/m^3
/// * `heat_capacity` - Heat capacity of the medium in kWh/(kg·K), see
///   [`super::WATER_HEAT_CAPACITY`]
pub fn tank_capacity_kwh(
    max_temp: f32,
    min_temp: f32,
    volume_m3: f32,
    density: f32,
    heat_capacity: f32,
) -> f32 {
    (max_temp - min_temp) * volume_m3 * density * heat_capacity
}

/// A hot water tank absorbing thermal surplus and covering thermal deficit.
///
/// The tank is passive: it has no actions of its own. During a step it
/// receives the summed interaction of the active systems plus the household
/// heat demand, absorbs or covers as much of the thermal flow as its charge
/// and capacity allow, and returns the remainder. Losses use the same
/// "no losses on losses" update as the battery.
#[derive(Debug, Clone)]
pub struct HeatStorage {
    /// Storage capacity in kilowatt-hours.
    pub capacity_kwh: f32,
    /// Charging efficiency (0..1.0].
    pub eta_charge: f32,
    /// Discharging efficiency (0..1.0].
    pub eta_discharge: f32,
    /// Relative charge loss per step.
    pub relative_loss: f32,
    /// Absolute charge loss per step in kilowatt-hours.
    pub absolute_loss_kwh: f32,
    /// Lower bound of the operating SOC window used by [`HeatStorage::filter_feasible`].
    pub min_soc: f32,
    /// Upper bound of the operating SOC window.
    pub max_soc: f32,
    charge_kwh: f32,
}

impl HeatStorage {
    /// Creates a new tank.
    ///
    /// # Panics
    ///
    /// Panics if capacity is not positive, the initial SOC is outside
    /// `[0, 1]`, an efficiency is outside `(0, 1]`, or the SOC window is not
    /// `0 <= min_soc < max_soc <= 1`.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        capacity_kwh: f32,
        initial_soc: f32,
        eta_charge: f32,
        eta_discharge: f32,
        relative_loss: f32,
        absolute_loss_kwh: f32,
        min_soc: f32,
        max_soc: f32,
    ) -> Self {
        assert!(capacity_kwh > 0.0);
        assert!((0.0..=1.0).contains(&initial_soc));
        assert!(eta_charge > 0.0 && eta_charge <= 1.0);
        assert!(eta_discharge > 0.0 && eta_discharge <= 1.0);
        assert!((0.0..1.0).contains(&relative_loss));
        assert!(absolute_loss_kwh >= 0.0);
        assert!(min_soc >= 0.0 && min_soc < max_soc && max_soc <= 1.0);

        Self {
            capacity_kwh,
            eta_charge,
            eta_discharge,
            relative_loss,
            absolute_loss_kwh,
            min_soc,
            max_soc,
            charge_kwh: initial_soc * capacity_kwh,
        }
    }

    /// Current state of charge as a fraction of capacity.
    pub fn soc(&self) -> f32 {
        self.charge_kwh / self.capacity_kwh
    }

    /// Sets the current charge in kilowatt-hours.
    pub fn set_charge_kwh(&mut self, charge_kwh: f32) {
        self.charge_kwh = charge_kwh.clamp(0.0, self.capacity_kwh);
    }

    /// Maximum thermal energy in kWh the tank can absorb this step.
    fn max_intake_kwh(&self) -> f32 {
        let headroom = self.capacity_kwh * (1.0 + self.relative_loss / 2.0)
            - self.charge_kwh * (1.0 - self.relative_loss / 2.0)
            + self.absolute_loss_kwh;
        headroom / self.eta_charge
    }

    /// Minimum (most negative) thermal energy in kWh the tank can release
    /// this step.
    fn min_intake_kwh(&self) -> f32 {
        let available = -self.charge_kwh * (1.0 - self.relative_loss / 2.0) + self.absolute_loss_kwh;
        available * self.eta_discharge
    }

    /// Filters candidate actions by their net thermal flow into the tank.
    ///
    /// `candidates` pairs each action index with the net thermal power into
    /// the tank in kW (generation minus demand; positive charges the tank).
    /// An action is kept when the flow respects the tank's power bounds and
    /// does not push the SOC outside the configured operating window.
    pub fn filter_feasible(&self, candidates: &[(usize, f32)], dt_hours: f32) -> Vec<usize> {
        let min_charge = self.capacity_kwh * self.min_soc;
        let max_charge = self.capacity_kwh * self.max_soc;

        let max_kw = self.max_intake_kwh() / dt_hours;
        let min_kw = self.min_intake_kwh() / dt_hours;

        let mut feasible = Vec::new();
        for &(idx, net_kw) in candidates {
            if self.charge_kwh < min_charge && net_kw <= 0.0 {
                continue; // below the window, must recharge
            }
            if self.charge_kwh <= min_charge && net_kw < 0.0 {
                continue; // at the floor, no further discharge
            }
            if self.charge_kwh >= max_charge && net_kw > 0.0 {
                continue; // above the window, no further charging
            }
            if net_kw <= max_kw && net_kw >= min_kw {
                feasible.push(idx);
            }
        }
        feasible
    }
}

impl System for HeatStorage {
    /// The tank is passive and exposes no actions.
    fn feasible_action_idxs(&self, _dt_hours: f32) -> Vec<usize> {
        Vec::new()
    }

    /// Absorbs the thermal component of `interaction` and returns what could
    /// not be absorbed or covered (positive = unmet demand, negative = dumped
    /// surplus). The electric component passes through untouched.
    fn state_transition(
        &mut self,
        dt_hours: f32,
        _action_idx: usize,
        interaction: &EnvironmentInteraction,
    ) -> EnvironmentInteraction {
        // Released power carries a negative sign; flip it to energy into the tank.
        let energy_kwh = -interaction.th_power_kw * dt_hours;

        let (flow_kwh, diff_kwh) = if energy_kwh > 0.0 {
            let diff = (energy_kwh - self.max_intake_kwh()).max(0.0);
            (energy_kwh - diff, diff)
        } else if energy_kwh < 0.0 {
            let diff = (energy_kwh - self.min_intake_kwh()).min(0.0);
            (energy_kwh - diff, diff)
        } else {
            (0.0, 0.0)
        };

        let delta_c_kwh = if flow_kwh > 0.0 {
            flow_kwh * self.eta_charge
        } else if flow_kwh < 0.0 {
            flow_kwh / self.eta_discharge
        } else {
            0.0
        };

        self.charge_kwh = (delta_c_kwh + self.charge_kwh * (1.0 - self.relative_loss / 2.0)
            - self.absolute_loss_kwh)
            / (1.0 + self.relative_loss / 2.0);
        self.charge_kwh = self.charge_kwh.clamp(0.0, self.capacity_kwh);

        // Restore the sign convention of the unhandled remainder.
        EnvironmentInteraction::new(interaction.el_power_kw, -diff_kwh / dt_hours)
    }
}
