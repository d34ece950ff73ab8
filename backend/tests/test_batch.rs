//! Tests for sequential batch runs
//!
//! Every run gets a fresh engine, so a batch entry must produce exactly the
//! summary the same config produces on its own.

use er_simulator_core::config::{BatchConfig, ErConfig};
use er_simulator_core::orchestrator::{run_batch, run_single, SimulationConfig, SimulationError};

fn create_config(seed: u64, doctors: u32) -> SimulationConfig {
    SimulationConfig {
        num_doctors: doctors,
        horizon_minutes: 180.0,
        random_seed: seed,
        output_dir: format!("runs/seed_{}", seed),
        ..SimulationConfig::default()
    }
}

#[test]
fn test_empty_batch() {
    assert!(run_batch(&[]).unwrap().is_empty());
}

#[test]
fn test_batch_entries_match_single_runs() {
    let configs = vec![create_config(1, 2), create_config(2, 3), create_config(3, 1)];
    let results = run_batch(&configs).unwrap();

    assert_eq!(results.len(), 3);
    for (config, result) in configs.iter().zip(&results) {
        let single = run_single(config.clone()).unwrap();
        assert_eq!(result.summary, single.summary);
        assert_eq!(result.config_hash, single.config_hash);
        assert_eq!(result.run_id, config.output_dir);
    }
}

#[test]
fn test_batch_order_does_not_leak_state() {
    let a = create_config(10, 2);
    let b = create_config(20, 2);

    let forward = run_batch(&[a.clone(), b.clone()]).unwrap();
    let backward = run_batch(&[b, a]).unwrap();
    assert_eq!(forward[0].summary, backward[1].summary);
    assert_eq!(forward[1].summary, backward[0].summary);
}

#[test]
fn test_invalid_entry_fails_whole_batch() {
    let mut bad = create_config(2, 2);
    bad.arrival_rate_per_hour = 0.0;

    assert!(matches!(
        run_batch(&[create_config(1, 2), bad]),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_demo_sweep_runs() {
    // Shorten the shift to keep the test quick
    let base = ErConfig {
        sim_hours: 1.0,
        output_dir: "out".to_string(),
        ..ErConfig::default()
    };
    let sweep = BatchConfig::demo_sweep(base);
    let configs = sweep.simulation_configs().unwrap();
    let results = run_batch(&configs).unwrap();

    assert_eq!(results.len(), 10);
    assert_eq!(results[0].run_id, "out/run_01");
    assert_eq!(results[9].run_id, "out/run_10");
    assert!(configs.iter().all(|c| c.horizon_minutes == 60.0));
    for result in &results {
        assert!(result.summary.contains_key("avg_wait"));
        assert!(result.wall_seconds >= 0.0);
    }
    // The busiest scenario has six doctors
    assert!(results[9].summary.contains_key("doctor_6_busy_minutes"));
    assert!(!results[8].summary.contains_key("doctor_2_busy_minutes"));
}
