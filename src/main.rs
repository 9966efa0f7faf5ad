//! Profile generator entry point — CLI wiring for training and generation.

use std::path::{Path, PathBuf};
use std::process;

use der_statesim::config::ScenarioConfig;
use der_statesim::data::{Drivers, TimeSeries};
use der_statesim::io::export::export_csv;
use der_statesim::model::{FeatureExtractor, StateClassifier, TransitionModel};
use der_statesim::model::transition::TransitionSample;
use der_statesim::sim::{ProfileGenerator, ReferenceDispatch, RunReport};
use der_statesim::systems::DerSystem;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    data_path: Option<String>,
    artifacts_dir: PathBuf,
    profile_out: Option<String>,
    horizon_override: Option<usize>,
    train_only: bool,
    generate_only: bool,
}

fn print_help() {
    eprintln!("der-statesim — Synthetic DER load profile generator");
    eprintln!();
    eprintln!("Usage: der-statesim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>       Load scenario from TOML config file");
    eprintln!("  --preset <name>         Use a built-in preset (battery, battery_chp_hwt, chp_hwt)");
    eprintln!("  --seed <u64>            Override random seed");
    eprintln!("  --data <path>           Train on a measured timestamp,kw CSV series");
    eprintln!("  --artifacts-dir <path>  Model artifact directory (default: artifacts)");
    eprintln!("  --profile-out <path>    Export the generated profile to CSV");
    eprintln!("  --horizon <steps>       Override the generation horizon");
    eprintln!("  --train                 Only train and save models");
    eprintln!("  --generate              Only generate from saved models");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("Without --train or --generate, both phases run in sequence.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        data_path: None,
        artifacts_dir: PathBuf::from("artifacts"),
        profile_out: None,
        horizon_override: None,
        train_only: false,
        generate_only: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--data" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --data requires a path argument");
                    process::exit(1);
                }
                cli.data_path = Some(args[i].clone());
            }
            "--artifacts-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --artifacts-dir requires a path argument");
                    process::exit(1);
                }
                cli.artifacts_dir = PathBuf::from(&args[i]);
            }
            "--profile-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --profile-out requires a path argument");
                    process::exit(1);
                }
                cli.profile_out = Some(args[i].clone());
            }
            "--horizon" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --horizon requires a step count argument");
                    process::exit(1);
                }
                if let Ok(n) = args[i].parse::<usize>() {
                    cli.horizon_override = Some(n);
                } else {
                    eprintln!("error: --horizon value \"{}\" is not a valid count", args[i]);
                    process::exit(1);
                }
            }
            "--train" => {
                cli.train_only = true;
            }
            "--generate" => {
                cli.generate_only = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.train_only && cli.generate_only {
        eprintln!("error: --train and --generate are mutually exclusive");
        process::exit(1);
    }

    cli
}

/// Builds the exogenous drivers, preferring a measured series over synthesis.
fn load_drivers(cfg: &ScenarioConfig, data_path: Option<&str>) -> Drivers {
    match data_path {
        Some(path) => {
            let series = match TimeSeries::from_csv_path(Path::new(path)) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{e}");
                    process::exit(1);
                }
            };
            let mut heat = cfg.heat_demand_generator();
            match Drivers::from_series(&series, &mut heat) {
                Ok(drivers) => drivers,
                Err(e) => {
                    eprintln!("{e}");
                    process::exit(1);
                }
            }
        }
        None => cfg.build_drivers(),
    }
}

/// Trains both models on reference-dispatch labels and saves the artifacts.
fn train(
    cfg: &ScenarioConfig,
    drivers: &Drivers,
    artifacts_dir: &Path,
) -> (StateClassifier, TransitionModel) {
    let sim_config = cfg.sim_config();
    let mut system = match cfg.build_system() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let dispatch = ReferenceDispatch::new(drivers);
    let labels = dispatch.label_states(&mut system, drivers, &sim_config);

    let total = sim_config.total_steps();
    let demand: Vec<f32> = (0..total).map(|t| drivers.demand_at(t)).collect();
    let heat: Vec<f32> = (0..total).map(|t| drivers.heat_at(t)).collect();
    let extractor = FeatureExtractor::fit(sim_config.steps_per_day, &demand, &heat);

    let state_names: Vec<String> = system
        .state_space()
        .iter()
        .map(|s| s.name.clone())
        .collect();
    let params = cfg.fit_params();

    let inputs: Vec<Vec<f32>> = (0..total)
        .map(|t| extractor.features(t, demand[t], heat[t]))
        .collect();
    let classifier = StateClassifier::fit(
        extractor.clone(),
        &inputs,
        &labels,
        system.n_states(),
        state_names.clone(),
        &params,
        sim_config.seed,
    );
    println!("classifier: {}", classifier.report);

    let samples: Vec<TransitionSample> = (0..total - 1)
        .map(|t| TransitionSample {
            state: labels[t],
            next_features: extractor.features(t + 1, demand[t + 1], heat[t + 1]),
            next_state: labels[t + 1],
        })
        .collect();
    let transition = TransitionModel::fit(
        extractor,
        &samples,
        system.n_states(),
        state_names,
        &params,
        sim_config.seed,
    );
    println!("transition: {}", transition.report);

    for (model, result) in [
        ("classifier", classifier.save(artifacts_dir)),
        ("transition", transition.save(artifacts_dir)),
    ] {
        if let Err(e) = result {
            eprintln!("error: failed to save {model} model: {e}");
            process::exit(1);
        }
    }
    eprintln!("Models saved under {}", artifacts_dir.display());

    (classifier, transition)
}

/// Loads previously trained models from the artifact directory.
fn load_models(artifacts_dir: &Path) -> (StateClassifier, TransitionModel) {
    let classifier = match StateClassifier::load(artifacts_dir) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let transition = match TransitionModel::load(artifacts_dir) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    (classifier, transition)
}

/// Generates a profile from the trained models and a fresh physical system.
fn generate(
    cfg: &ScenarioConfig,
    drivers: &Drivers,
    classifier: &StateClassifier,
    transition: &TransitionModel,
    horizon: usize,
) -> (Vec<der_statesim::sim::StepRecord>, RunReport) {
    let sim_config = cfg.sim_config();
    let mut system: DerSystem = match cfg.build_system() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if transition.n_states() != system.n_states() {
        eprintln!(
            "error: saved models cover {} states but configuration \"{}\" has {}; \
             retrain with --train or point --artifacts-dir at matching models",
            transition.n_states(),
            cfg.simulation.configuration,
            system.n_states()
        );
        process::exit(1);
    }

    // Seed the first transition with the classifier's view of step 0,
    // falling back to idle on a state-space mismatch.
    let predicted = classifier.predict_at(0, drivers.demand_at(0), drivers.heat_at(0));
    let initial_state = if classifier.n_states() == system.n_states() {
        predicted
    } else {
        system.idle_state()
    };

    let generator = ProfileGenerator::new(sim_config.clone());
    let records = generator.generate(&mut system, transition, drivers, initial_state, horizon);
    let report = RunReport::from_records(&records, sim_config.dt_hours);
    (records, report)
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then the default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::battery()
    };

    // Apply seed override
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let drivers = load_drivers(&scenario, cli.data_path.as_deref());

    let (classifier, transition) = if cli.generate_only {
        load_models(&cli.artifacts_dir)
    } else {
        train(&scenario, &drivers, &cli.artifacts_dir)
    };

    if cli.train_only {
        return;
    }

    let horizon = cli
        .horizon_override
        .unwrap_or(scenario.generation.horizon_steps);
    let (records, report) = generate(&scenario, &drivers, &classifier, &transition, horizon);

    for r in &records {
        println!("{r}");
    }
    println!("\n{report}");

    if let Some(ref path) = cli.profile_out {
        if let Err(e) = export_csv(&records, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Profile written to {path}");
    }
}
