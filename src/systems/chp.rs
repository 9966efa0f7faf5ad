//! Combined-heat-and-power plant model with discrete modes and ramping.

use super::action::ActionSet;
use super::{EnvironmentInteraction, System};

/// A CHP plant operating in discrete modes (e.g. off / part load / full load).
///
/// Each mode is an [`super::Action`] with electric and thermal output (both
/// negative, generation) and a staying-time window in steps. Between modes the
/// output ramps at a finite rate; the power reported for a step is the average
/// over the step, integrating the ramp trapezoidally on both the electric and
/// the thermal path.
#[derive(Debug, Clone)]
pub struct ChpPlant {
    actions: ActionSet,
    mode: usize,
    staying_steps: usize,
    el_power_kw: f32,
    th_power_kw: f32,
    /// Electric ramp rate in kW per hour (positive magnitude).
    pub el_ramp_kw_per_hr: f32,
    /// Thermal ramp rate in kW per hour (positive magnitude).
    pub th_ramp_kw_per_hr: f32,
}

impl ChpPlant {
    /// Creates a CHP plant in `initial_mode` with `initial_staying_steps`
    /// already elapsed.
    ///
    /// # Panics
    ///
    /// Panics if the action set is empty, `initial_mode` is out of range, or
    /// a ramp rate is not positive.
    pub fn new(
        actions: ActionSet,
        initial_mode: usize,
        initial_staying_steps: usize,
        el_ramp_kw_per_hr: f32,
        th_ramp_kw_per_hr: f32,
    ) -> Self {
        assert!(!actions.is_empty(), "CHP needs at least one mode");
        assert!(initial_mode < actions.len());
        assert!(el_ramp_kw_per_hr > 0.0);
        assert!(th_ramp_kw_per_hr > 0.0);

        let el_power_kw = actions.get(initial_mode).el_power_kw;
        let th_power_kw = actions.get(initial_mode).th_power_kw;
        Self {
            actions,
            mode: initial_mode,
            staying_steps: initial_staying_steps,
            el_power_kw,
            th_power_kw,
            el_ramp_kw_per_hr,
            th_ramp_kw_per_hr,
        }
    }

    /// The plant's mode set.
    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    /// Currently active mode index.
    pub fn mode(&self) -> usize {
        self.mode
    }

    /// Steps elapsed in the current mode.
    pub fn staying_steps(&self) -> usize {
        self.staying_steps
    }

    /// Forces the plant into `mode` with `staying_steps` elapsed, snapping
    /// output to the mode's setpoints.
    pub fn set_state(&mut self, mode: usize, staying_steps: usize) {
        assert!(mode < self.actions.len());
        self.mode = mode;
        self.staying_steps = staying_steps;
        self.el_power_kw = self.actions.get(mode).el_power_kw;
        self.th_power_kw = self.actions.get(mode).th_power_kw;
    }

    /// Ramp `current` toward `target` at `rate_kw_per_hr`, returning the new
    /// power and the trapezoidal average power over the step.
    fn ramp(current: f32, target: f32, rate_kw_per_hr: f32, dt_hours: f32) -> (f32, f32) {
        let remaining = target - current;
        if remaining == 0.0 {
            return (current, current);
        }
        let step_kw = rate_kw_per_hr * dt_hours;
        let new = if remaining < 0.0 {
            (current - step_kw).max(target)
        } else {
            (current + step_kw).min(target)
        };
        let ramp_hours = (remaining.abs() / rate_kw_per_hr).min(dt_hours);
        let avg = (ramp_hours * (current + new) / 2.0 + (dt_hours - ramp_hours) * new) / dt_hours;
        (new, avg)
    }
}

impl System for ChpPlant {
    fn feasible_action_idxs(&self, _dt_hours: f32) -> Vec<usize> {
        let current = self.actions.get(self.mode);

        if self.staying_steps < current.min_staying_steps {
            // Must stay in the current mode.
            return vec![self.mode];
        }

        self.actions
            .iter()
            .filter(|a| a.idx != self.mode || self.staying_steps + 1 <= a.max_staying_steps)
            .map(|a| a.idx)
            .collect()
    }

    fn state_transition(
        &mut self,
        dt_hours: f32,
        action_idx: usize,
        _interaction: &EnvironmentInteraction,
    ) -> EnvironmentInteraction {
        if action_idx != self.mode {
            self.mode = action_idx;
            self.staying_steps = 0;
        }

        let target = self.actions.get(self.mode);

        let (el_new, el_avg) = Self::ramp(
            self.el_power_kw,
            target.el_power_kw,
            self.el_ramp_kw_per_hr,
            dt_hours,
        );
        self.el_power_kw = el_new;

        let (th_new, th_avg) = Self::ramp(
            self.th_power_kw,
            target.th_power_kw,
            self.th_ramp_kw_per_hr,
            dt_hours,
        );
        self.th_power_kw = th_new;

        self.staying_steps += 1;

        EnvironmentInteraction::new(el_avg, th_avg)
    }
}
