// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end: grow a culture, simulate, write the recording, read it back.

use culture_config::CultureConfig;
use culture_engine::{Recording, SimulationEngine};
use culture_topology::TopologyBuilder;

fn short_config() -> CultureConfig {
    let mut config = CultureConfig::default();
    config.simulation.duration_s = 1.0;
    config.simulation.equilibration_s = 0.2;
    config.simulation.seed = 25_000;
    config
}

#[test]
fn test_simulate_save_load() {
    let config = short_config();
    let topology = TopologyBuilder::new()
        .modules(4)
        .neurons_per_module(10)
        .k_in(4)
        .k_inter(2)
        .seed(config.simulation.seed)
        .build();

    let mut engine = SimulationEngine::new(&topology, &config).unwrap();
    engine.equilibrate();
    engine.run();
    let recording = engine.into_recording();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dyn/run.json");
    recording.save(&path).unwrap();

    let loaded = Recording::load(&path).unwrap();
    assert_eq!(recording, loaded);
    assert_eq!(loaded.meta.num_neurons, 40);
    assert_eq!(loaded.meta.num_modules, 4);
    assert_eq!(loaded.meta.seed, 25_000);

    // both spike formats describe the same data
    let from_matrix: usize = loaded
        .spiketimes
        .iter()
        .map(|row| row.iter().filter(|&&t| t > 0.0).count())
        .sum();
    let listed_nonzero = loaded
        .spiketimes_as_list
        .iter()
        .filter(|r| r.time_s > 0.0)
        .count();
    assert_eq!(from_matrix, listed_nonzero);
}

#[test]
fn test_two_runs_same_seed_are_identical() {
    let config = short_config();
    let topology = TopologyBuilder::new().seed(1).build();

    let run = |config: &CultureConfig| {
        let mut engine = SimulationEngine::new(&topology, config).unwrap();
        engine.equilibrate();
        engine.run();
        engine.into_recording()
    };

    let a = run(&config);
    let b = run(&config);
    assert!(a.payload_eq(&b));
}
