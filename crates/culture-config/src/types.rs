// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `culture_configuration.toml`. Defaults are the published parameter set
//! for the modular-culture dynamics (Orlandi et al. 2013 with synaptic
//! depression and homeostatic plasticity).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CultureConfig {
    pub simulation: SimulationConfig,
    pub neuron: NeuronConfig,
    pub synapse: SynapseConfig,
    pub noise: NoiseConfig,
    pub plasticity: PlasticityConfig,
    pub stimulation: StimulationConfig,
    pub recording: RecordingConfig,
    pub logging: LoggingConfig,
}

/// Integration and run-length settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Integration step in ms. Steps above 0.05 ms are known to promote
    /// spurious synchronization (spike times lose precision).
    pub dt_ms: f64,
    /// Recorded duration, in seconds.
    pub duration_s: f64,
    /// Warm-up duration before monitors attach, in seconds.
    pub equilibration_s: f64,
    /// RNG seed for the run.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_ms: 0.05,
            duration_s: 1200.0,
            equilibration_s: 120.0,
            seed: 117,
        }
    }
}

/// Membrane and soma parameters (quadratic integrate-and-fire)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuronConfig {
    /// Resting potential, mV. The neuron relaxes here without stimulation.
    pub v_rest: f64,
    /// Threshold potential, mV.
    pub v_thresh: f64,
    /// Peak potential, mV. Once past threshold, rapid growth towards this.
    pub v_peak: f64,
    /// Reset potential after a spike, mV.
    pub v_reset: f64,
    /// Membrane time constant, ms.
    pub tau_mem_ms: f64,
    /// Adaptation-current time constant, ms.
    pub tau_adapt_ms: f64,
    /// Quadratic coefficient, 1/mV (resistance over capacitance, rescaled).
    pub k: f64,
    /// Sensitivity of the adaptation current to sub-threshold fluctuations.
    pub b: f64,
    /// After-spike increment of the adaptation current, mV.
    pub delta_u: f64,
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self {
            v_rest: -60.0,
            v_thresh: -45.0,
            v_peak: 35.0,
            v_reset: -50.0,
            tau_mem_ms: 50.0,
            tau_adapt_ms: 50.0,
            k: 0.5,
            b: 0.5,
            delta_u: 50.0,
        }
    }
}

/// Synaptic transmission and short-term depression
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SynapseConfig {
    /// AMPA current strength, mV. Sensible range 10 - 50 mV.
    pub j_ampa: f64,
    /// Decay time of the post-synaptic current, ms.
    pub tau_ampa_ms: f64,
    /// Characteristic recovery time of the depression resource, seconds.
    /// Sensible range 0.5 - 20 s.
    pub tau_depression_s: f64,
    /// Resource reduction per spike, D -> beta * D, beta < 1.
    pub beta: f64,
}

impl Default for SynapseConfig {
    fn default() -> Self {
        Self {
            j_ampa: 35.0,
            tau_ampa_ms: 10.0,
            tau_depression_s: 2.0,
            beta: 0.8,
        }
    }
}

/// Background input: shot noise (minis) and membrane white noise
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Rate of the Poisson mini input per neuron, Hz. Range 10 - 50 Hz.
    pub mini_rate_hz: f64,
    /// Strength of one mini event, mV.
    pub j_mini: f64,
    /// White-noise strength on the membrane, mV^2 ms^2.
    pub white_noise_strength: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            mini_rate_hz: 37.0,
            j_mini: 25.0,
            white_noise_strength: 300.0,
        }
    }
}

/// Homeostatic plasticity on the post-synaptic gain
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlasticityConfig {
    pub enabled: bool,
    /// Amplitude, seconds. Unit is the inverse of the target rate.
    pub gain_s: f64,
    /// Target firing rate, Hz.
    pub target_rate_hz: f64,
    /// Time scale of the homeostatic drift, seconds.
    pub tau_s: f64,
}

impl Default for PlasticityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gain_s: 10.0,
            target_rate_hz: 0.2,
            tau_s: 60.0,
        }
    }
}

/// External stimulation of selected modules
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StimulationConfig {
    /// One of "off", "pulse", "poisson".
    pub mode: String,
    /// Modules that receive stimulation.
    pub target_modules: Vec<u32>,
    /// Pulse mode: interval between forced spikes, ms.
    pub pulse_interval_ms: f64,
    /// Poisson mode: extra mini rate on targeted modules, Hz.
    pub extra_rate_hz: f64,
}

impl Default for StimulationConfig {
    fn default() -> Self {
        Self {
            mode: "off".to_string(),
            target_modules: vec![0],
            pulse_interval_ms: 400.0,
            extra_rate_hz: 20.0,
        }
    }
}

/// What the monitors record and how the output is written
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Whether to record state variables at all.
    pub record_state: bool,
    /// Neurons whose state variables are recorded.
    pub state_neurons: Vec<u32>,
    /// Stride (in integration steps) between state samples.
    pub state_stride: usize,
    /// Whether to record the population rate.
    pub record_rates: bool,
    /// Time resolution for the written population rate, ms. The rate is
    /// smoothed with a Gaussian kernel of this width to not miss sudden
    /// changes between written samples.
    pub rate_bin_ms: f64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            record_state: true,
            state_neurons: vec![0, 1, 2, 3],
            state_stride: 20,
            record_rates: true,
            rate_bin_ms: 50.0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter ("trace" .. "error").
    pub level: String,
    /// Directory for log files; None disables file logging.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_parameters() {
        let config = CultureConfig::default();
        assert_eq!(config.neuron.v_rest, -60.0);
        assert_eq!(config.neuron.v_peak, 35.0);
        assert_eq!(config.synapse.j_ampa, 35.0);
        assert_eq!(config.synapse.beta, 0.8);
        assert_eq!(config.noise.mini_rate_hz, 37.0);
        assert_eq!(config.plasticity.target_rate_hz, 0.2);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: CultureConfig = toml::from_str("").unwrap();
        assert_eq!(config, CultureConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: CultureConfig = toml::from_str(
            r#"
            [synapse]
            j_ampa = 45.0
            "#,
        )
        .unwrap();
        assert_eq!(config.synapse.j_ampa, 45.0);
        assert_eq!(config.synapse.beta, 0.8);
        assert_eq!(config.neuron.v_rest, -60.0);
    }
}
