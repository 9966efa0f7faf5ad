//! Summary metrics computed over a synthesized profile.

use std::collections::BTreeMap;
use std::fmt;

use super::types::StepRecord;

/// Aggregate metrics of one generated profile.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of profile steps.
    pub steps: usize,
    /// Net electric energy of the DER system (kWh; positive = consumed).
    pub net_el_energy_kwh: f32,
    /// Electric energy generated (kWh, >= 0).
    pub el_generated_kwh: f32,
    /// Electric energy consumed (kWh, >= 0).
    pub el_consumed_kwh: f32,
    /// Thermal energy generated by the CHP (kWh).
    pub th_generated_kwh: f32,
    /// Heat demand left uncovered (kWh).
    pub unmet_heat_kwh: f32,
    /// Largest electric generation magnitude observed (kW).
    pub peak_generation_kw: f32,
    /// Largest electric consumption observed (kW).
    pub peak_consumption_kw: f32,
    /// Battery SOC range over the run, when a battery is present.
    pub battery_soc_range: Option<(f32, f32)>,
    /// Tank SOC range over the run, when a tank is present.
    pub tank_soc_range: Option<(f32, f32)>,
    /// Steps spent in each state, keyed by state name.
    pub state_occupancy: BTreeMap<String, usize>,
}

impl RunReport {
    /// Computes a report from the records of one run.
    pub fn from_records(records: &[StepRecord], dt_hours: f32) -> Self {
        let mut net_el = 0.0;
        let mut el_gen = 0.0;
        let mut el_con = 0.0;
        let mut th_gen = 0.0;
        let mut unmet = 0.0;
        let mut peak_gen = 0.0f32;
        let mut peak_con = 0.0f32;
        let mut bat_range: Option<(f32, f32)> = None;
        let mut tank_range: Option<(f32, f32)> = None;
        let mut occupancy: BTreeMap<String, usize> = BTreeMap::new();

        for r in records {
            net_el += r.el_power_kw * dt_hours;
            if r.el_power_kw < 0.0 {
                el_gen += -r.el_power_kw * dt_hours;
                peak_gen = peak_gen.max(-r.el_power_kw);
            } else {
                el_con += r.el_power_kw * dt_hours;
                peak_con = peak_con.max(r.el_power_kw);
            }
            th_gen += r.th_gen_kw * dt_hours;
            unmet += r.unmet_heat_kw * dt_hours;

            if let Some(soc) = r.battery_soc {
                bat_range = Some(match bat_range {
                    Some((lo, hi)) => (lo.min(soc), hi.max(soc)),
                    None => (soc, soc),
                });
            }
            if let Some(soc) = r.tank_soc {
                tank_range = Some(match tank_range {
                    Some((lo, hi)) => (lo.min(soc), hi.max(soc)),
                    None => (soc, soc),
                });
            }
            *occupancy.entry(r.state_name.clone()).or_insert(0) += 1;
        }

        Self {
            steps: records.len(),
            net_el_energy_kwh: net_el,
            el_generated_kwh: el_gen,
            el_consumed_kwh: el_con,
            th_generated_kwh: th_gen,
            unmet_heat_kwh: unmet,
            peak_generation_kw: peak_gen,
            peak_consumption_kw: peak_con,
            battery_soc_range: bat_range,
            tank_soc_range: tank_range,
            state_occupancy: occupancy,
        }
    }
}

fn fmt_range(range: Option<(f32, f32)>) -> String {
    range.map_or_else(
        || "n/a".to_string(),
        |(lo, hi)| format!("{:.1}% .. {:.1}%", lo * 100.0, hi * 100.0),
    )
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Profile Report ===")?;
        writeln!(f, "Steps:               {}", self.steps)?;
        writeln!(f, "Net electric energy: {:8.2} kWh", self.net_el_energy_kwh)?;
        writeln!(f, "Electric generated:  {:8.2} kWh", self.el_generated_kwh)?;
        writeln!(f, "Electric consumed:   {:8.2} kWh", self.el_consumed_kwh)?;
        writeln!(f, "Thermal generated:   {:8.2} kWh", self.th_generated_kwh)?;
        writeln!(f, "Unmet heat:          {:8.2} kWh", self.unmet_heat_kwh)?;
        writeln!(f, "Peak generation:     {:8.2} kW", self.peak_generation_kw)?;
        writeln!(f, "Peak consumption:    {:8.2} kW", self.peak_consumption_kw)?;
        writeln!(f, "Battery SOC range:   {}", fmt_range(self.battery_soc_range))?;
        writeln!(f, "Tank SOC range:      {}", fmt_range(self.tank_soc_range))?;
        writeln!(f, "State occupancy:")?;
        for (name, count) in &self.state_occupancy {
            writeln!(f, "  {name:<20} {count:>5} steps")?;
        }
        Ok(())
    }
}
