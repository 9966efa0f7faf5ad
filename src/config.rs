//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::data::SyntheticDemand;
use crate::model::FitParams;
use crate::sim::SimConfig;
use crate::systems::{
    Action, ActionSet, Battery, ChpPlant, DerConfiguration, DerSystem, HeatStorage,
    WATER_DENSITY, WATER_HEAT_CAPACITY, tank_capacity_kwh,
};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the battery-only scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::battery`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Synthetic electric demand parameters.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Synthetic heat demand parameters.
    #[serde(default)]
    pub heat_demand: DemandConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// CHP plant parameters.
    #[serde(default)]
    pub chp: ChpConfig,
    /// Hot water tank parameters.
    #[serde(default)]
    pub heat_storage: HeatStorageConfig,
    /// Model training hyperparameters.
    #[serde(default)]
    pub training: TrainingConfig,
    /// Profile generation parameters.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of timesteps per simulated day (must be > 0).
    pub steps_per_day: usize,
    /// Number of days covered by training data (must be > 0).
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
    /// DER configuration: `"battery"`, `"battery_chp_hwt"`, or `"chp_hwt"`.
    pub configuration: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_day: 24,
            days: 7,
            seed: 42,
            configuration: "battery".to_string(),
        }
    }
}

/// Sinusoid-plus-noise demand parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Baseline demand (kW).
    pub base_kw: f32,
    /// Sinusoidal amplitude (kW).
    pub amp_kw: f32,
    /// Phase offset (radians).
    pub phase_rad: f32,
    /// Gaussian noise standard deviation (kW).
    pub noise_std: f32,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            base_kw: 0.8,
            amp_kw: 0.5,
            phase_rad: 1.2,
            noise_std: 0.05,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total energy capacity (kWh).
    pub capacity_kwh: f32,
    /// Maximum charge/discharge power (kW).
    pub max_power_kw: f32,
    /// Setpoints per direction; the action grid has `2 * granularity + 1` entries.
    pub granularity: usize,
    /// Initial state of charge (0.0–1.0).
    pub initial_soc: f32,
    /// Charge efficiency (0.0–1.0).
    pub eta_charge: f32,
    /// Discharge efficiency (0.0–1.0).
    pub eta_discharge: f32,
    /// Relative standing loss per step.
    pub relative_loss: f32,
    /// Absolute standing loss per step (kWh).
    pub absolute_loss_kwh: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            max_power_kw: 5.0,
            granularity: 2,
            initial_soc: 0.5,
            eta_charge: 0.95,
            eta_discharge: 0.95,
            relative_loss: 0.0,
            absolute_loss_kwh: 0.0,
        }
    }
}

/// CHP plant parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChpConfig {
    /// Electric output at full load (kW, negative = generating).
    pub el_power_kw: f32,
    /// Thermal output at full load (kW, negative = generating).
    pub th_power_kw: f32,
    /// Load levels defining the mode set as fractions of full load.
    /// Level 0.0 is the off mode.
    pub mode_levels: Vec<f32>,
    /// Minimum steps the plant must stay in a mode.
    pub min_staying_steps: usize,
    /// Maximum steps the plant may stay in a mode.
    pub max_staying_steps: usize,
    /// Electric ramp rate (kW per hour).
    pub el_ramp_kw_per_hr: f32,
    /// Thermal ramp rate (kW per hour).
    pub th_ramp_kw_per_hr: f32,
    /// Initial mode index.
    pub initial_mode: usize,
}

impl Default for ChpConfig {
    fn default() -> Self {
        Self {
            el_power_kw: -5.5,
            th_power_kw: -12.5,
            mode_levels: vec![0.0, 0.5, 1.0],
            min_staying_steps: 2,
            max_staying_steps: usize::MAX,
            el_ramp_kw_per_hr: 30.0,
            th_ramp_kw_per_hr: 60.0,
            initial_mode: 0,
        }
    }
}

/// Hot water tank parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatStorageConfig {
    /// Tank volume (m^3).
    pub volume_m3: f32,
    /// Lower temperature of the storage band (°C).
    pub min_temp_c: f32,
    /// Upper temperature of the storage band (°C).
    pub max_temp_c: f32,
    /// Initial state of charge (0.0–1.0).
    pub initial_soc: f32,
    /// Charge efficiency (0.0–1.0).
    pub eta_charge: f32,
    /// Discharge efficiency (0.0–1.0).
    pub eta_discharge: f32,
    /// Relative standing loss per step.
    pub relative_loss: f32,
    /// Absolute standing loss per step (kWh).
    pub absolute_loss_kwh: f32,
    /// Lower bound of the operating SOC window.
    pub min_soc: f32,
    /// Upper bound of the operating SOC window.
    pub max_soc: f32,
}

impl Default for HeatStorageConfig {
    fn default() -> Self {
        Self {
            volume_m3: 0.8,
            min_temp_c: 60.0,
            max_temp_c: 90.0,
            initial_soc: 0.5,
            eta_charge: 0.98,
            eta_discharge: 0.98,
            relative_loss: 0.01,
            absolute_loss_kwh: 0.0,
            min_soc: 0.1,
            max_soc: 0.9,
        }
    }
}

/// Model training hyperparameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Width of the hidden layer.
    pub hidden_size: usize,
    /// Number of training epochs.
    pub epochs: usize,
    /// SGD learning rate.
    pub learning_rate: f32,
    /// Fraction of samples held out for validation (0.0–0.5).
    pub validation_split: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_size: 16,
            epochs: 60,
            learning_rate: 0.05,
            validation_split: 0.1,
        }
    }
}

/// Profile generation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Number of steps to synthesize.
    pub horizon_steps: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { horizon_steps: 168 }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.steps_per_day"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ScenarioConfig {
    /// Returns the battery-only scenario (all defaults).
    pub fn battery() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            demand: DemandConfig::default(),
            heat_demand: DemandConfig {
                base_kw: 0.0,
                amp_kw: 0.0,
                noise_std: 0.0,
                ..DemandConfig::default()
            },
            battery: BatteryConfig::default(),
            chp: ChpConfig::default(),
            heat_storage: HeatStorageConfig::default(),
            training: TrainingConfig::default(),
            generation: GenerationConfig::default(),
        }
    }

    /// Returns the combined preset: battery plus CHP with hot water tank.
    pub fn battery_chp_hwt() -> Self {
        Self {
            simulation: SimulationConfig {
                configuration: "battery_chp_hwt".to_string(),
                ..SimulationConfig::default()
            },
            heat_demand: DemandConfig {
                base_kw: 4.0,
                amp_kw: 2.0,
                phase_rad: 0.0,
                noise_std: 0.2,
            },
            ..Self::battery()
        }
    }

    /// Returns the heat-led preset: CHP with hot water tank, no battery.
    pub fn chp_hwt() -> Self {
        Self {
            simulation: SimulationConfig {
                configuration: "chp_hwt".to_string(),
                ..SimulationConfig::default()
            },
            heat_demand: DemandConfig {
                base_kw: 5.0,
                amp_kw: 3.0,
                phase_rad: 0.0,
                noise_std: 0.2,
            },
            ..Self::battery()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["battery", "battery_chp_hwt", "chp_hwt"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "battery" => Ok(Self::battery()),
            "battery_chp_hwt" => Ok(Self::battery_chp_hwt()),
            "chp_hwt" => Ok(Self::chp_hwt()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// The DER configuration selected by this scenario.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration name is unknown.
    pub fn der_configuration(&self) -> Result<DerConfiguration, ConfigError> {
        DerConfiguration::from_str(&self.simulation.configuration).ok_or_else(|| ConfigError {
            field: "simulation.configuration".to_string(),
            message: format!(
                "unknown configuration \"{}\", available: {}",
                self.simulation.configuration,
                DerConfiguration::NAMES.join(", ")
            ),
        })
    }

    /// Builds the simulation timing configuration.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(
            self.simulation.steps_per_day,
            self.simulation.days,
            self.simulation.seed,
        )
    }

    /// Builds the training hyperparameters.
    pub fn fit_params(&self) -> FitParams {
        FitParams {
            hidden_size: self.training.hidden_size,
            epochs: self.training.epochs,
            learning_rate: self.training.learning_rate,
            validation_split: self.training.validation_split,
        }
    }

    /// Builds the synthetic electric demand generator.
    pub fn demand_generator(&self) -> SyntheticDemand {
        SyntheticDemand::new(
            self.demand.base_kw,
            self.demand.amp_kw,
            self.demand.phase_rad,
            self.demand.noise_std,
            self.simulation.steps_per_day,
            self.simulation.seed,
        )
    }

    /// Builds the synthetic heat demand generator.
    ///
    /// Seeded differently from the electric generator so the two series are
    /// not correlated sample by sample.
    pub fn heat_demand_generator(&self) -> SyntheticDemand {
        SyntheticDemand::new(
            self.heat_demand.base_kw,
            self.heat_demand.amp_kw,
            self.heat_demand.phase_rad,
            self.heat_demand.noise_std,
            self.simulation.steps_per_day,
            self.simulation.seed.wrapping_add(1),
        )
    }

    /// Synthesizes drivers for the scenario's full training horizon.
    pub fn build_drivers(&self) -> crate::data::Drivers {
        let total = self.sim_config().total_steps();
        let demand = self.demand_generator().generate(total);
        let heat = self.heat_demand_generator().generate(total);
        crate::data::Drivers::new(demand, heat)
    }

    /// Assembles a fresh physical DER system from this scenario.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration name is unknown.
    pub fn build_system(&self) -> Result<DerSystem, ConfigError> {
        let configuration = self.der_configuration()?;

        let battery = configuration.has_battery().then(|| {
            let b = &self.battery;
            Battery::new(
                b.capacity_kwh,
                b.max_power_kw,
                b.granularity,
                b.initial_soc,
                b.eta_charge,
                b.eta_discharge,
                b.relative_loss,
                b.absolute_loss_kwh,
            )
        });

        let (chp, tank) = if configuration.has_chp() {
            let c = &self.chp;
            let mut actions = ActionSet::new();
            for (i, &level) in c.mode_levels.iter().enumerate() {
                let name = if level == 0.0 {
                    "off".to_string()
                } else {
                    format!("chp{:.0}", level * 100.0)
                };
                actions.add(
                    Action::new(i, level * c.el_power_kw, level * c.th_power_kw, name)
                        .with_staying(c.min_staying_steps, c.max_staying_steps),
                );
            }
            let chp = ChpPlant::new(
                actions,
                c.initial_mode,
                c.min_staying_steps,
                c.el_ramp_kw_per_hr,
                c.th_ramp_kw_per_hr,
            );

            let h = &self.heat_storage;
            let capacity = tank_capacity_kwh(
                h.max_temp_c,
                h.min_temp_c,
                h.volume_m3,
                WATER_DENSITY,
                WATER_HEAT_CAPACITY,
            );
            let tank = HeatStorage::new(
                capacity,
                h.initial_soc,
                h.eta_charge,
                h.eta_discharge,
                h.relative_loss,
                h.absolute_loss_kwh,
                h.min_soc,
                h.max_soc,
            );
            (Some(chp), Some(tank))
        } else {
            (None, None)
        };

        Ok(DerSystem::new(configuration, battery, chp, tank))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.steps_per_day == 0 {
            errors.push(ConfigError {
                field: "simulation.steps_per_day".into(),
                message: "must be > 0".into(),
            });
        }
        if s.days == 0 {
            errors.push(ConfigError {
                field: "simulation.days".into(),
                message: "must be > 0".into(),
            });
        }
        // Transition training needs at least one consecutive step pair.
        if s.steps_per_day > 0 && s.days > 0 && s.steps_per_day * s.days < 2 {
            errors.push(ConfigError {
                field: "simulation.days".into(),
                message: "horizon must span at least 2 steps".into(),
            });
        }
        if DerConfiguration::from_str(&s.configuration).is_none() {
            errors.push(ConfigError {
                field: "simulation.configuration".into(),
                message: format!(
                    "must be one of {}, got \"{}\"",
                    DerConfiguration::NAMES.join(", "),
                    s.configuration
                ),
            });
        }

        for (section, d) in [("demand", &self.demand), ("heat_demand", &self.heat_demand)] {
            if d.base_kw < 0.0 {
                errors.push(ConfigError {
                    field: format!("{section}.base_kw"),
                    message: "must be >= 0".into(),
                });
            }
            if d.noise_std < 0.0 {
                errors.push(ConfigError {
                    field: format!("{section}.noise_std"),
                    message: "must be >= 0".into(),
                });
            }
        }

        let bat = &self.battery;
        if bat.capacity_kwh <= 0.0 {
            errors.push(ConfigError {
                field: "battery.capacity_kwh".into(),
                message: "must be > 0".into(),
            });
        }
        if bat.max_power_kw <= 0.0 {
            errors.push(ConfigError {
                field: "battery.max_power_kw".into(),
                message: "must be > 0".into(),
            });
        }
        if bat.granularity == 0 {
            errors.push(ConfigError {
                field: "battery.granularity".into(),
                message: "must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&bat.initial_soc) {
            errors.push(ConfigError {
                field: "battery.initial_soc".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        for (field, eta) in [
            ("battery.eta_charge", bat.eta_charge),
            ("battery.eta_discharge", bat.eta_discharge),
        ] {
            if !(eta > 0.0 && eta <= 1.0) {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must be in (0.0, 1.0]".into(),
                });
            }
        }

        let c = &self.chp;
        if c.mode_levels.is_empty() {
            errors.push(ConfigError {
                field: "chp.mode_levels".into(),
                message: "needs at least one mode".into(),
            });
        }
        if c.el_power_kw > 0.0 || c.th_power_kw > 0.0 {
            errors.push(ConfigError {
                field: "chp.el_power_kw".into(),
                message: "full-load output must be <= 0 (negative = generating)".into(),
            });
        }
        if !c.mode_levels.is_empty() && c.initial_mode >= c.mode_levels.len() {
            errors.push(ConfigError {
                field: "chp.initial_mode".into(),
                message: "must index into chp.mode_levels".into(),
            });
        }
        if c.el_ramp_kw_per_hr <= 0.0 || c.th_ramp_kw_per_hr <= 0.0 {
            errors.push(ConfigError {
                field: "chp.el_ramp_kw_per_hr".into(),
                message: "ramp rates must be > 0".into(),
            });
        }
        if c.min_staying_steps > c.max_staying_steps {
            errors.push(ConfigError {
                field: "chp.min_staying_steps".into(),
                message: "must be <= chp.max_staying_steps".into(),
            });
        }

        let h = &self.heat_storage;
        if h.volume_m3 <= 0.0 {
            errors.push(ConfigError {
                field: "heat_storage.volume_m3".into(),
                message: "must be > 0".into(),
            });
        }
        if h.min_temp_c >= h.max_temp_c {
            errors.push(ConfigError {
                field: "heat_storage.min_temp_c".into(),
                message: "must be < heat_storage.max_temp_c".into(),
            });
        }
        if !(h.min_soc >= 0.0 && h.min_soc < h.max_soc && h.max_soc <= 1.0) {
            errors.push(ConfigError {
                field: "heat_storage.min_soc".into(),
                message: "window must satisfy 0 <= min_soc < max_soc <= 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&h.initial_soc) {
            errors.push(ConfigError {
                field: "heat_storage.initial_soc".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let t = &self.training;
        if t.hidden_size == 0 {
            errors.push(ConfigError {
                field: "training.hidden_size".into(),
                message: "must be > 0".into(),
            });
        }
        if t.epochs == 0 {
            errors.push(ConfigError {
                field: "training.epochs".into(),
                message: "must be > 0".into(),
            });
        }
        if t.learning_rate <= 0.0 {
            errors.push(ConfigError {
                field: "training.learning_rate".into(),
                message: "must be > 0".into(),
            });
        }
        if !(0.0..=0.5).contains(&t.validation_split) {
            errors.push(ConfigError {
                field: "training.validation_split".into(),
                message: "must be in [0.0, 0.5]".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_preset_valid() {
        let cfg = ScenarioConfig::battery();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "battery preset should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
steps_per_day = 96
days = 3
seed = 99
configuration = "battery_chp_hwt"

[demand]
base_kw = 1.0
amp_kw = 0.5
phase_rad = 0.0
noise_std = 0.1

[heat_demand]
base_kw = 4.0
amp_kw = 2.0
phase_rad = 0.0
noise_std = 0.2

[battery]
capacity_kwh = 15.0
max_power_kw = 7.0
granularity = 3
initial_soc = 0.3
eta_charge = 0.92
eta_discharge = 0.92
relative_loss = 0.001
absolute_loss_kwh = 0.0

[chp]
el_power_kw = -5.5
th_power_kw = -12.5
mode_levels = [0.0, 0.5, 1.0]
min_staying_steps = 4
el_ramp_kw_per_hr = 30.0
th_ramp_kw_per_hr = 60.0
initial_mode = 0

[heat_storage]
volume_m3 = 0.8
min_temp_c = 60.0
max_temp_c = 90.0
initial_soc = 0.5

[training]
hidden_size = 24
epochs = 100
learning_rate = 0.03
validation_split = 0.15

[generation]
horizon_steps = 672
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.steps_per_day), Some(96));
        assert_eq!(cfg.as_ref().map(|c| c.generation.horizon_steps), Some(672));
        assert_eq!(
            cfg.as_ref().map(|c| &*c.simulation.configuration),
            Some("battery_chp_hwt")
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
steps_per_day = 24
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.steps_per_day), Some(24));
        assert_eq!(cfg.as_ref().map(|c| c.battery.capacity_kwh), Some(10.0));
    }

    #[test]
    fn validation_catches_zero_steps() {
        let mut cfg = ScenarioConfig::battery();
        cfg.simulation.steps_per_day = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.steps_per_day"));
    }

    #[test]
    fn validation_catches_single_step_horizon() {
        let mut cfg = ScenarioConfig::battery();
        cfg.simulation.steps_per_day = 1;
        cfg.simulation.days = 1;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.days"));
    }

    #[test]
    fn validation_catches_invalid_soc() {
        let mut cfg = ScenarioConfig::battery();
        cfg.battery.initial_soc = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.initial_soc"));
    }

    #[test]
    fn validation_catches_bad_configuration() {
        let mut cfg = ScenarioConfig::battery();
        cfg.simulation.configuration = "wind_farm".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.configuration"));
    }

    #[test]
    fn validation_catches_positive_chp_output() {
        let mut cfg = ScenarioConfig::chp_hwt();
        cfg.chp.el_power_kw = 5.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "chp.el_power_kw"));
    }

    #[test]
    fn validation_catches_bad_tank_window() {
        let mut cfg = ScenarioConfig::chp_hwt();
        cfg.heat_storage.min_soc = 0.95;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "heat_storage.min_soc"));
    }

    #[test]
    fn build_system_matches_configuration() {
        let cfg = ScenarioConfig::battery_chp_hwt();
        let sys = cfg.build_system();
        assert!(sys.is_ok());
        let sys = sys.ok();
        // 5 battery setpoints x 3 CHP modes
        assert_eq!(sys.as_ref().map(DerSystem::n_states), Some(15));
        assert_eq!(
            sys.as_ref().and_then(DerSystem::battery_soc),
            Some(0.5)
        );
        assert!(sys.as_ref().and_then(DerSystem::tank_soc).is_some());
    }

    #[test]
    fn build_system_battery_only() {
        let cfg = ScenarioConfig::battery();
        let sys = cfg.build_system();
        let sys = sys.ok();
        assert_eq!(sys.as_ref().map(DerSystem::n_states), Some(5));
        assert!(sys.as_ref().and_then(DerSystem::tank_soc).is_none());
    }

    #[test]
    fn chp_mode_names_follow_levels() {
        let cfg = ScenarioConfig::chp_hwt();
        let sys = cfg.build_system().ok();
        let names: Vec<String> = sys
            .as_ref()
            .map(|s| s.state_space().iter().map(|st| st.name.clone()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["off", "chp50", "chp100"]);
    }
}
