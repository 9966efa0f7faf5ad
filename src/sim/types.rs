//! Core simulation types: timing configuration and step records.

use std::fmt;

/// Centralized simulation timing configuration.
///
/// All components reference this struct for timing, so `dt_hours` is derived
/// in exactly one place.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of simulation steps per day.
    pub steps_per_day: usize,
    /// Number of days to simulate.
    pub days: usize,
    /// Duration of one timestep in hours, derived as `24.0 / steps_per_day`.
    pub dt_hours: f32,
    /// Master random seed for reproducibility.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a new simulation configuration.
    ///
    /// # Panics
    ///
    /// Panics if `steps_per_day` or `days` is zero.
    pub fn new(steps_per_day: usize, days: usize, seed: u64) -> Self {
        assert!(steps_per_day > 0, "steps_per_day must be > 0");
        assert!(days > 0, "days must be > 0");
        Self {
            steps_per_day,
            days,
            dt_hours: 24.0 / steps_per_day as f32,
            seed,
        }
    }

    /// Total number of simulation steps across all days.
    pub fn total_steps(&self) -> usize {
        self.steps_per_day * self.days
    }
}

/// Complete record of one synthesized profile step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Timestep index.
    pub timestep: usize,
    /// Simulation time in hours.
    pub time_hr: f32,
    /// Joint operating state index.
    pub state_idx: usize,
    /// Joint operating state name.
    pub state_name: String,
    /// Net electric power of the DER system (kW; positive = consuming).
    pub el_power_kw: f32,
    /// Thermal power generated by the CHP (kW, >= 0).
    pub th_gen_kw: f32,
    /// Heat demand left uncovered by CHP and tank (kW, >= 0).
    pub unmet_heat_kw: f32,
    /// Exogenous electric demand context (kW).
    pub demand_kw: f32,
    /// Exogenous heat demand context (kW).
    pub heat_demand_kw: f32,
    /// Battery SOC after the step, when a battery is present.
    pub battery_soc: Option<f32>,
    /// Tank SOC after the step, when a tank is present.
    pub tank_soc: Option<f32>,
}

fn fmt_soc(soc: Option<f32>) -> String {
    soc.map_or_else(|| "  -  ".to_string(), |s| format!("{:5.1}", s * 100.0))
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} ({:>5.1}h) | {:<18} | el={:>6.2} kW  th={:>5.2} kW  unmet={:>5.2} kW \
             | demand={:.2}  heat={:.2} | SoC(bat={}%, tank={}%)",
            self.timestep,
            self.time_hr,
            self.state_name,
            self.el_power_kw,
            self.th_gen_kw,
            self.unmet_heat_kw,
            self.demand_kw,
            self.heat_demand_kw,
            fmt_soc(self.battery_soc),
            fmt_soc(self.tank_soc),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_config_basic() {
        let cfg = SimConfig::new(24, 1, 42);
        assert_eq!(cfg.dt_hours, 1.0);
        assert_eq!(cfg.total_steps(), 24);
    }

    #[test]
    fn sim_config_multi_day() {
        let cfg = SimConfig::new(96, 3, 0);
        assert_eq!(cfg.total_steps(), 288);
        assert_eq!(cfg.dt_hours, 0.25);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_steps_panics() {
        SimConfig::new(0, 1, 0);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_days_panics() {
        SimConfig::new(24, 0, 0);
    }

    #[test]
    fn step_record_display_does_not_panic() {
        let r = StepRecord {
            timestep: 3,
            time_hr: 3.0,
            state_idx: 4,
            state_name: "bat_idle|off".into(),
            el_power_kw: -1.2,
            th_gen_kw: 0.0,
            unmet_heat_kw: 0.5,
            demand_kw: 0.9,
            heat_demand_kw: 1.4,
            battery_soc: Some(0.42),
            tank_soc: None,
        };
        let s = format!("{r}");
        assert!(s.contains("bat_idle|off"));
        assert!(s.contains("42.0"));
    }
}
