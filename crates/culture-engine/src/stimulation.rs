// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! External stimulation of selected modules
//!
//! Two modes besides `Off`:
//!
//! * `Pulse` - periodic forced spikes: every `interval_ms` the targeted
//!   neurons are driven to twice the peak potential, so they fire on the
//!   following step (approximately one-timestep delay between stimulation
//!   and spike).
//! * `Poisson` - targeted modules receive an additional mini rate on top of
//!   the background noise.

use culture_config::{CultureConfig, StimulationConfig};
use culture_types::ModuleId;
use culture_topology::Topology;

/// Stimulation protocol of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum StimulationPattern {
    Off,
    Pulse {
        interval_ms: f64,
        modules: Vec<ModuleId>,
    },
    Poisson {
        extra_rate_hz: f64,
        modules: Vec<ModuleId>,
    },
}

impl StimulationPattern {
    /// Build the pattern from the `[stimulation]` config section.
    ///
    /// The mode string has been validated by `culture_config::validate_config`.
    pub fn from_config(config: &StimulationConfig) -> Self {
        let modules: Vec<ModuleId> = config.target_modules.iter().map(|&m| ModuleId(m)).collect();
        match config.mode.as_str() {
            "pulse" => Self::Pulse {
                interval_ms: config.pulse_interval_ms,
                modules,
            },
            "poisson" => Self::Poisson {
                extra_rate_hz: config.extra_rate_hz,
                modules,
            },
            _ => Self::Off,
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }

    /// Per-neuron mask of stimulation targets.
    pub fn target_mask(&self, topology: &Topology) -> Vec<bool> {
        let modules = match self {
            Self::Off => return vec![false; topology.num_neurons],
            Self::Pulse { modules, .. } | Self::Poisson { modules, .. } => modules,
        };
        topology
            .module_ids
            .iter()
            .map(|m| modules.contains(m))
            .collect()
    }
}

impl From<&CultureConfig> for StimulationPattern {
    fn from(config: &CultureConfig) -> Self {
        Self::from_config(&config.stimulation)
    }
}
