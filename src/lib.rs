// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Modular Cultures
//!
//! Simulation and burst analysis of modular neuronal cultures: quadratic
//! integrate-and-fire dynamics with synaptic depression and homeostatic
//! plasticity on clustered topologies, a four-module mesoscopic rate model
//! with stochastic gates, and logISI burst detection down to the network
//! level.
//!
//! This crate re-exports the workspace members under one roof; each member
//! is also usable on its own.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use modular_cultures::config::CultureConfig;
//! use modular_cultures::engine::SimulationEngine;
//! use modular_cultures::topology::TopologyBuilder;
//!
//! let config = CultureConfig::default();
//! let topology = TopologyBuilder::new().seed(config.simulation.seed).build();
//! let mut engine = SimulationEngine::new(&topology, &config)?;
//! engine.equilibrate();
//! engine.run();
//! let recording = engine.into_recording();
//! # Ok::<(), modular_cultures::engine::EngineError>(())
//! ```
//!
//! Burst analysis runs on the recording's zero-padded spike matrix:
//!
//! ```rust,no_run
//! use modular_cultures::analysis::{network_bursts, BurstSort};
//! # let spiketimes: Vec<Vec<f64>> = Vec::new();
//! let report = network_bursts(&spiketimes, 0.8, BurstSort::Begin)?;
//! # Ok::<(), modular_cultures::analysis::AnalysisError>(())
//! ```

pub use culture_analysis as analysis;
pub use culture_config as config;
pub use culture_engine as engine;
pub use culture_mesoscopic as mesoscopic;
pub use culture_neural as neural;
pub use culture_topology as topology;
pub use culture_types as types;

/// The most common entry points in one import.
pub mod prelude {
    pub use culture_analysis::{detect_bursts, network_bursts, Burst, BurstSort};
    pub use culture_config::{load_config, CultureConfig};
    pub use culture_engine::{Recording, SimulationEngine};
    pub use culture_mesoscopic::{MesoscopicModel, MesoscopicParams};
    pub use culture_topology::{Topology, TopologyBuilder};
    pub use culture_types::{ModuleId, NeuronId, SpikeRecord};
}
