// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Simulation engine
//!
//! Step-driven integration of a modular culture: quadratic
//! integrate-and-fire neurons on a fixed topology, Poisson shot noise
//! (minis), membrane white noise, optional stimulation, and monitors that
//! attach after an equilibration phase.
//!
//! A run is `equilibrate` followed by `run`; recorded times are relative to
//! the end of equilibration. Everything downstream of the seed is
//! deterministic: two engines built from the same topology and config
//! produce byte-identical recordings.
//!
//! ```rust,no_run
//! use culture_config::CultureConfig;
//! use culture_engine::SimulationEngine;
//! use culture_topology::TopologyBuilder;
//!
//! let config = CultureConfig::default();
//! let topology = TopologyBuilder::new().seed(config.simulation.seed).build();
//! let mut engine = SimulationEngine::new(&topology, &config).unwrap();
//! engine.equilibrate();
//! engine.run();
//! let recording = engine.into_recording();
//! recording.save(std::path::Path::new("run.json")).unwrap();
//! ```

mod engine;
mod monitors;
mod recording;
mod stimulation;

pub use engine::SimulationEngine;
pub use monitors::{gaussian_smooth, RateMonitor, SpikeMonitor, StateMonitor, STATE_VAR_NAMES};
pub use recording::{Recording, RecordingMeta, StateTraces};
pub use stimulation::StimulationPattern;

use thiserror::Error;

/// Engine construction and recording I/O errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("topology error: {0}")]
    Topology(#[from] culture_topology::TopologyError),

    #[error("config error: {0}")]
    Config(#[from] culture_config::ConfigError),

    #[error("recording i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("recording format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("state monitor references neuron {0} outside the culture")]
    StateNeuronOutOfRange(u32),
}

pub type Result<T> = std::result::Result<T, EngineError>;
