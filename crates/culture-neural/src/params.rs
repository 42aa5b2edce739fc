// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model parameters, engine-internal units (mV, ms).

use culture_config::CultureConfig;
use serde::{Deserialize, Serialize};

/// Full parameter set of the quadratic integrate-and-fire model.
///
/// Times are milliseconds here, including the depression and homeostasis
/// constants that are configured in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QifParameters {
    // membrane potentials, mV
    pub v_rest: f64,
    pub v_thresh: f64,
    pub v_peak: f64,
    pub v_reset: f64,

    // soma
    pub tau_mem_ms: f64,
    pub tau_adapt_ms: f64,
    pub k: f64,
    pub b: f64,
    pub delta_u: f64,

    // synapse
    pub j_ampa: f64,
    pub tau_ampa_ms: f64,
    pub tau_depression_ms: f64,
    pub beta: f64,

    // membrane white noise, mV^2 ms^2
    pub white_noise_strength: f64,

    // homeostatic plasticity
    pub plasticity_enabled: bool,
    pub gain_ms: f64,
    pub target_rate_per_ms: f64,
    pub tau_homeostasis_ms: f64,
}

impl QifParameters {
    /// Assemble the model parameters from the run configuration.
    pub fn from_config(config: &CultureConfig) -> Self {
        Self {
            v_rest: config.neuron.v_rest,
            v_thresh: config.neuron.v_thresh,
            v_peak: config.neuron.v_peak,
            v_reset: config.neuron.v_reset,
            tau_mem_ms: config.neuron.tau_mem_ms,
            tau_adapt_ms: config.neuron.tau_adapt_ms,
            k: config.neuron.k,
            b: config.neuron.b,
            delta_u: config.neuron.delta_u,
            j_ampa: config.synapse.j_ampa,
            tau_ampa_ms: config.synapse.tau_ampa_ms,
            tau_depression_ms: config.synapse.tau_depression_s * 1e3,
            beta: config.synapse.beta,
            white_noise_strength: config.noise.white_noise_strength,
            plasticity_enabled: config.plasticity.enabled,
            gain_ms: config.plasticity.gain_s * 1e3,
            target_rate_per_ms: config.plasticity.target_rate_hz * 1e-3,
            tau_homeostasis_ms: config.plasticity.tau_s * 1e3,
        }
    }

    /// Amplitude of the white-noise increment for one step of `dt_ms`.
    ///
    /// Euler-Maruyama form of the Brian-style term `xi * sqrt(gs/tc) / tc`:
    /// `sqrt(dt * gs / tc) / tc`.
    pub fn noise_amplitude(&self, dt_ms: f64) -> f64 {
        (dt_ms * self.white_noise_strength / self.tau_mem_ms).sqrt() / self.tau_mem_ms
    }

    /// Per-spike decrement of the homeostatic gain, `gH / tH`.
    pub fn homeostatic_decrement(&self) -> f64 {
        self.gain_ms / self.tau_homeostasis_ms
    }
}

impl Default for QifParameters {
    fn default() -> Self {
        Self::from_config(&CultureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_config() {
        let p = QifParameters::default();
        assert_eq!(p.v_rest, -60.0);
        assert_eq!(p.tau_depression_ms, 2000.0);
        assert_eq!(p.gain_ms, 10_000.0);
        assert!((p.target_rate_per_ms - 0.0002).abs() < 1e-12);
    }

    #[test]
    fn test_noise_amplitude_scale() {
        let p = QifParameters::default();
        // sqrt(0.05 * 300 / 50) / 50
        let expected = (0.05_f64 * 300.0 / 50.0).sqrt() / 50.0;
        assert!((p.noise_amplitude(0.05) - expected).abs() < 1e-12);
    }
}
