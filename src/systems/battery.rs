//! Battery storage model with a granular discrete action grid.

use super::action::{Action, ActionSet};
use super::{EnvironmentInteraction, System};

/// A battery energy storage system with discrete charge/discharge setpoints.
///
/// The action grid spans `2 * granularity + 1` operating points between
/// `-max_power_kw` and `+max_power_kw`; index `granularity` is idle. Standing
/// losses follow the "no losses on losses" update
///
/// ```text
/// c(t+1) = [c(t) * (1 - l_r/2) + delta_c - l_a] / (1 + l_r/2)
/// ```
///
/// where `l_r` is the relative loss per step and `l_a` the absolute loss per
/// step in kWh. Feasible actions are derived by inverting that update, so a
/// feasible transition can never push the charge outside `[0, capacity]`.
#[derive(Debug, Clone)]
pub struct Battery {
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
    actions: ActionSet,
    granularity: usize,
    charge_kwh: f32,
}

impl Battery {
    /// Creates a new battery and builds its action grid.
    ///
    /// # Panics
    ///
    /// Panics if capacity, power, or granularity is not positive, the initial
    /// SOC is outside `[0, 1]`, an efficiency is outside `(0, 1]`, or the
    /// relative loss is outside `[0, 1)`.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        capacity_kwh: f32,
        max_power_kw: f32,
        granularity: usize,
        initial_soc: f32,
        eta_charge: f32,
        eta_discharge: f32,
        relative_loss: f32,
        absolute_loss_kwh: f32,
    ) -> Self {
        assert!(capacity_kwh > 0.0);
        assert!(max_power_kw > 0.0);
        assert!(granularity > 0);
        assert!((0.0..=1.0).contains(&initial_soc));
        assert!(eta_charge > 0.0 && eta_charge <= 1.0);
        assert!(eta_discharge > 0.0 && eta_discharge <= 1.0);
        assert!((0.0..1.0).contains(&relative_loss));
        assert!(absolute_loss_kwh >= 0.0);

        let mut actions = ActionSet::new();
        let g = granularity as f32;
        for i in 0..granularity {
            // Discharge setpoints, most negative first.
            let kw = max_power_kw * (i as f32 / g - 1.0);
            actions.add(Action::new(i, kw, 0.0, format!("bat{kw:+.2}kW")));
        }
        actions.add(Action::new(granularity, 0.0, 0.0, "bat_idle"));
        for i in 0..granularity {
            let kw = max_power_kw * ((i + 1) as f32 / g);
            actions.add(Action::new(
                granularity + 1 + i,
                kw,
                0.0,
                format!("bat{kw:+.2}kW"),
            ));
        }

        Self {
            capacity_kwh,
            eta_charge,
            eta_discharge,
            relative_loss,
            absolute_loss_kwh,
            actions,
            granularity,
            charge_kwh: initial_soc * capacity_kwh,
        }
    }

    /// The battery's discrete action grid.
    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    /// Index of the idle action.
    pub fn idle_idx(&self) -> usize {
        self.granularity
    }

    /// Current state of charge as a fraction of capacity.
    pub fn soc(&self) -> f32 {
        self.charge_kwh / self.capacity_kwh
    }

    /// Sets the current charge in kilowatt-hours.
    pub fn set_charge_kwh(&mut self, charge_kwh: f32) {
        self.charge_kwh = charge_kwh.clamp(0.0, self.capacity_kwh);
    }

    /// Maximum electric power in kW that charging may draw this step without
    /// exceeding capacity.
    fn max_charge_power_kw(&self, dt_hours: f32) -> f32 {
        let headroom_kwh = self.capacity_kwh * (1.0 + self.relative_loss / 2.0)
            - self.charge_kwh * (1.0 - self.relative_loss / 2.0)
            + self.absolute_loss_kwh;
        headroom_kwh / self.eta_charge / dt_hours
    }

    /// Minimum (most negative) electric power in kW that discharging may
    /// release this step without emptying the store.
    fn min_discharge_power_kw(&self, dt_hours: f32) -> f32 {
        let available_kwh =
            -self.charge_kwh * (1.0 - self.relative_loss / 2.0) + self.absolute_loss_kwh;
        available_kwh * self.eta_discharge / dt_hours
    }
}

impl System for Battery {
    fn feasible_action_idxs(&self, dt_hours: f32) -> Vec<usize> {
        let max_kw = self.max_charge_power_kw(dt_hours);
        let min_kw = self.min_discharge_power_kw(dt_hours);

        self.actions
            .iter()
            .filter(|a| a.el_power_kw <= max_kw && a.el_power_kw >= min_kw)
            .map(|a| a.idx)
            .collect()
    }

    fn state_transition(
        &mut self,
        dt_hours: f32,
        action_idx: usize,
        _interaction: &EnvironmentInteraction,
    ) -> EnvironmentInteraction {
        let action = self.actions.get(action_idx);
        let power_kw = action.el_power_kw;

        let delta_c_kwh = if power_kw > 0.0 {
            power_kw * dt_hours * self.eta_charge
        } else if power_kw < 0.0 {
            power_kw * dt_hours / self.eta_discharge
        } else {
            0.0
        };

        self.charge_kwh = (delta_c_kwh + self.charge_kwh * (1.0 - self.relative_loss / 2.0)
            - self.absolute_loss_kwh)
            / (1.0 + self.relative_loss / 2.0);
        self.charge_kwh = self.charge_kwh.clamp(0.0, self.capacity_kwh);

        EnvironmentInteraction::new(action.el_power_kw, action.th_power_kw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lossless(capacity_kwh: f32, soc: f32) -> Battery {
        Battery::new(capacity_kwh, 5.0, 2, soc, 1.0, 1.0, 0.0, 0.0)
    }

    #[test]
    fn action_grid_shape() {
        let bat = lossless(10.0, 0.5);
        assert_eq!(bat.actions().len(), 5);
        assert_eq!(bat.actions().get(bat.idle_idx()).el_power_kw, 0.0);
        assert_eq!(bat.actions().get(0).el_power_kw, -5.0);
        assert_eq!(bat.actions().get(4).el_power_kw, 5.0);
    }

    #[test]
    fn grid_setpoints_are_exact_fractions_of_max_power() {
        let bat = Battery::new(10.0, 5.0, 2, 0.5, 1.0, 1.0, 0.0, 0.0);
        let setpoints: Vec<f32> = bat.actions().iter().map(|a| a.el_power_kw).collect();
        assert_eq!(setpoints, vec![-5.0, -2.5, 0.0, 2.5, 5.0]);

        let fine = Battery::new(10.0, 5.0, 4, 0.5, 1.0, 1.0, 0.0, 0.0);
        let setpoints: Vec<f32> = fine.actions().iter().map(|a| a.el_power_kw).collect();
        assert_eq!(
            setpoints,
            vec![-5.0, -3.75, -2.5, -1.25, 0.0, 1.25, 2.5, 3.75, 5.0]
        );
    }

    #[test]
    fn full_battery_cannot_charge() {
        let bat = lossless(10.0, 1.0);
        let feasible = bat.feasible_action_idxs(1.0);
        assert!(feasible.contains(&bat.idle_idx()));
        for idx in &feasible {
            assert!(bat.actions().get(*idx).el_power_kw <= 1e-6);
        }
    }

    #[test]
    fn empty_battery_cannot_discharge() {
        let bat = lossless(10.0, 0.0);
        let feasible = bat.feasible_action_idxs(1.0);
        for idx in &feasible {
            assert!(bat.actions().get(*idx).el_power_kw >= -1e-6);
        }
    }

    #[test]
    fn charge_updates_soc() {
        let mut bat = lossless(10.0, 0.5);
        // +2.5 kW for one hour into a lossless 10 kWh store
        let out = bat.state_transition(1.0, 3, &EnvironmentInteraction::default());
        assert_eq!(out.el_power_kw, 2.5);
        assert!((bat.soc() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn charging_efficiency_applies() {
        let mut bat = Battery::new(10.0, 5.0, 2, 0.0, 0.9, 1.0, 0.0, 0.0);
        bat.state_transition(1.0, 4, &EnvironmentInteraction::default()); // +5 kW
        assert!((bat.soc() - 0.45).abs() < 1e-5);
    }

    #[test]
    fn discharging_efficiency_applies() {
        let mut bat = Battery::new(10.0, 5.0, 2, 0.5, 1.0, 0.8, 0.0, 0.0);
        bat.state_transition(1.0, 1, &EnvironmentInteraction::default()); // -2.5 kW delivered
        // 2.5 kWh delivered requires 3.125 kWh from the store
        assert!((bat.soc() - (0.5 - 0.3125)).abs() < 1e-5);
    }

    #[test]
    fn relative_loss_decays_idle_charge() {
        let mut bat = Battery::new(10.0, 5.0, 2, 0.5, 1.0, 1.0, 0.01, 0.0);
        let idle = bat.idle_idx();
        bat.state_transition(1.0, idle, &EnvironmentInteraction::default());
        assert!(bat.soc() < 0.5);
        assert!(bat.soc() > 0.49);
    }

    #[test]
    fn feasible_transitions_stay_in_bounds() {
        let mut bat = Battery::new(10.0, 5.0, 4, 0.95, 0.95, 0.95, 0.001, 0.0);
        let dt = 1.0;
        for _ in 0..50 {
            let feasible = bat.feasible_action_idxs(dt);
            assert!(!feasible.is_empty());
            // Most aggressive charge action each step
            let idx = *feasible.last().unwrap();
            bat.state_transition(dt, idx, &EnvironmentInteraction::default());
            assert!((0.0..=1.0 + 1e-6).contains(&bat.soc()));
        }
    }
}
