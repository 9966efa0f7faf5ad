//! End-to-end pipeline tests for the CHP configurations.

mod common;

use der_statesim::sim::ProfileGenerator;

#[test]
fn chp_hwt_profile_respects_minimum_staying_time() {
    let cfg = common::small_scenario("chp_hwt");
    let drivers = common::drivers_for(&cfg);
    let (_, transition) = common::train_models(&cfg, &drivers);

    let mut system = cfg.build_system().unwrap();
    let idle = system.idle_state();
    let n_modes = cfg.chp.mode_levels.len();
    let generator = ProfileGenerator::new(cfg.sim_config());
    let records = generator.generate(&mut system, &transition, &drivers, idle, 96);

    // After every mode change the plant must hold the new mode for at least
    // min_staying_steps steps before switching again.
    let mut prev_mode = cfg.chp.initial_mode;
    for (i, r) in records.iter().enumerate() {
        let mode = r.state_idx % n_modes;
        if mode != prev_mode {
            for follow in records.iter().skip(i + 1).take(cfg.chp.min_staying_steps - 1) {
                assert_eq!(
                    follow.state_idx % n_modes,
                    mode,
                    "mode switched again before its staying time at t={}",
                    follow.timestep
                );
            }
        }
        prev_mode = mode;
    }
}

#[test]
fn chp_hwt_heat_balance_is_physical() {
    let cfg = common::small_scenario("chp_hwt");
    let drivers = common::drivers_for(&cfg);
    let (_, transition) = common::train_models(&cfg, &drivers);

    let mut system = cfg.build_system().unwrap();
    let idle = system.idle_state();
    let generator = ProfileGenerator::new(cfg.sim_config());
    let records = generator.generate(&mut system, &transition, &drivers, idle, 96);

    for r in &records {
        assert!(r.th_gen_kw >= -1e-5, "CHP thermal generation is a magnitude");
        assert!(r.unmet_heat_kw >= -1e-5);
        let soc = r.tank_soc.unwrap_or(-1.0);
        assert!(
            (-1e-5..=1.0 + 1e-5).contains(&soc),
            "tank SOC out of bounds at t={}: {soc}",
            r.timestep
        );
        assert!(r.battery_soc.is_none());
    }
}

#[test]
fn combined_configuration_runs_both_components() {
    let cfg = common::small_scenario("battery_chp_hwt");
    let drivers = common::drivers_for(&cfg);
    let (_, transition) = common::train_models(&cfg, &drivers);

    let mut system = cfg.build_system().unwrap();
    // 5 battery setpoints x 3 CHP modes
    assert_eq!(system.n_states(), 15);

    let idle = system.idle_state();
    let generator = ProfileGenerator::new(cfg.sim_config());
    let records = generator.generate(&mut system, &transition, &drivers, idle, 72);

    assert_eq!(records.len(), 72);
    for r in &records {
        assert!(r.battery_soc.is_some());
        assert!(r.tank_soc.is_some());
        let bat = r.battery_soc.unwrap_or(-1.0);
        let tank = r.tank_soc.unwrap_or(-1.0);
        assert!((-1e-5..=1.0 + 1e-5).contains(&bat));
        assert!((-1e-5..=1.0 + 1e-5).contains(&tank));
    }
}

#[test]
fn reference_dispatch_covers_heat_demand_eventually() {
    // With sustained heat demand the labeled dispatch must run the CHP at
    // some point; an always-off plant would drain the tank below its window.
    let cfg = common::small_scenario("chp_hwt");
    let drivers = common::drivers_for(&cfg);
    let mut system = cfg.build_system().unwrap();

    let dispatch = der_statesim::sim::ReferenceDispatch::new(&drivers);
    let labels = dispatch.label_states(&mut system, &drivers, &cfg.sim_config());

    let n_modes = cfg.chp.mode_levels.len();
    assert!(
        labels.iter().any(|&l| l % n_modes != 0),
        "dispatch never ran the CHP despite heat demand"
    );
}
