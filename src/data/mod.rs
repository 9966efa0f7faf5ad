//! Data ingestion and exogenous driver handling.

pub mod synthetic;
pub mod timeseries;

use std::fmt;

pub use synthetic::SyntheticDemand;
pub use timeseries::TimeSeries;

/// Error raised while loading or preparing input data.
#[derive(Debug)]
pub struct DataError {
    /// Source description, e.g. a file path or `"<reader>"`.
    pub source: String,
    /// Human-readable problem description.
    pub message: String,
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data error: {} — {}", self.source, self.message)
    }
}

impl std::error::Error for DataError {}

/// Exogenous per-step drivers consumed by dispatch, training, and generation.
///
/// Holds one electric demand value and one heat demand value per step of a
/// template day (or a full measured series); lookups wrap modulo length so a
/// one-day template drives multi-day runs.
#[derive(Debug, Clone)]
pub struct Drivers {
    demand_kw: Vec<f32>,
    heat_demand_kw: Vec<f32>,
}

impl Drivers {
    /// Creates drivers from explicit demand vectors.
    ///
    /// # Panics
    ///
    /// Panics if `demand_kw` is empty or the vectors differ in length.
    pub fn new(demand_kw: Vec<f32>, heat_demand_kw: Vec<f32>) -> Self {
        assert!(!demand_kw.is_empty(), "drivers need at least one step");
        assert_eq!(demand_kw.len(), heat_demand_kw.len());
        Self {
            demand_kw,
            heat_demand_kw,
        }
    }

    /// Creates drivers from a measured consumption series plus a synthetic
    /// heat demand generator evaluated over the same number of steps.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if the series holds no rows.
    pub fn from_series(series: &TimeSeries, heat: &mut SyntheticDemand) -> Result<Self, DataError> {
        if series.is_empty() {
            return Err(DataError {
                source: "<series>".to_string(),
                message: "series holds no rows, need at least one step".to_string(),
            });
        }
        let demand = series.values_kw().to_vec();
        let heat_demand = heat.generate(demand.len());
        Ok(Self::new(demand, heat_demand))
    }

    /// Number of template steps.
    pub fn len(&self) -> usize {
        self.demand_kw.len()
    }

    /// Returns `true` when no steps are present (never, by construction).
    pub fn is_empty(&self) -> bool {
        self.demand_kw.is_empty()
    }

    /// Electric demand at step `t`, wrapping modulo length.
    pub fn demand_at(&self, t: usize) -> f32 {
        self.demand_kw[t % self.demand_kw.len()]
    }

    /// Heat demand at step `t`, wrapping modulo length.
    pub fn heat_at(&self, t: usize) -> f32 {
        self.heat_demand_kw[t % self.heat_demand_kw.len()]
    }

    /// Mean electric demand over the template.
    pub fn mean_demand_kw(&self) -> f32 {
        self.demand_kw.iter().sum::<f32>() / self.demand_kw.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_wrap() {
        let d = Drivers::new(vec![1.0, 2.0, 3.0], vec![0.0, 0.5, 1.0]);
        assert_eq!(d.demand_at(0), 1.0);
        assert_eq!(d.demand_at(4), 2.0);
        assert_eq!(d.heat_at(5), 1.0);
    }

    #[test]
    fn mean_demand() {
        let d = Drivers::new(vec![1.0, 3.0], vec![0.0, 0.0]);
        assert_eq!(d.mean_demand_kw(), 2.0);
    }

    #[test]
    #[should_panic]
    fn empty_drivers_panic() {
        Drivers::new(Vec::new(), Vec::new());
    }

    #[test]
    fn empty_series_is_a_data_error() {
        let series = TimeSeries::new(Vec::new(), Vec::new());
        let mut heat = SyntheticDemand::new(0.0, 0.0, 0.0, 0.0, 24, 0);
        let result = Drivers::from_series(&series, &mut heat);
        assert!(result.is_err());
        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("no rows"), "unexpected error: {message}");
    }

    #[test]
    fn from_series_pairs_heat_per_step() {
        let series = TimeSeries::new(vec![0, 1, 2], vec![1.0, 2.0, 3.0]);
        let mut heat = SyntheticDemand::new(4.0, 0.0, 0.0, 0.0, 24, 0);
        let drivers = Drivers::from_series(&series, &mut heat).unwrap();
        assert_eq!(drivers.len(), 3);
        assert_eq!(drivers.demand_at(1), 2.0);
        assert_eq!(drivers.heat_at(1), 4.0);
    }
}
