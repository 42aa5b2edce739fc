// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures parameter values are physically meaningful before a run starts:
//! ordered membrane potentials, positive time constants, sane rates.

use crate::{ConfigError, ConfigResult, CultureConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` naming every offending field.
pub fn validate_config(config: &CultureConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_time_constants(config, &mut errors);
    validate_potentials(config, &mut errors);
    validate_rates(config, &mut errors);
    validate_stimulation(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(ConfigError::ValidationError(format!(
            "configuration validation failed:\n{}",
            error_messages
        )));
    }
    Ok(())
}

fn invalid(errors: &mut Vec<ConfigValidationError>, field: &str, reason: impl Into<String>) {
    errors.push(ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    });
}

fn validate_time_constants(config: &CultureConfig, errors: &mut Vec<ConfigValidationError>) {
    let positive = [
        ("simulation.dt_ms", config.simulation.dt_ms),
        ("neuron.tau_mem_ms", config.neuron.tau_mem_ms),
        ("neuron.tau_adapt_ms", config.neuron.tau_adapt_ms),
        ("synapse.tau_ampa_ms", config.synapse.tau_ampa_ms),
        ("synapse.tau_depression_s", config.synapse.tau_depression_s),
        ("plasticity.tau_s", config.plasticity.tau_s),
        ("recording.rate_bin_ms", config.recording.rate_bin_ms),
    ];
    for (field, value) in positive {
        if value <= 0.0 || !value.is_finite() {
            invalid(errors, field, "must be a positive, finite time constant");
        }
    }
    if config.simulation.dt_ms > 0.1 {
        invalid(
            errors,
            "simulation.dt_ms",
            "steps above 0.1 ms lose spike-time precision and promote artificial synchronization",
        );
    }
    if config.simulation.duration_s < 0.0 || config.simulation.equilibration_s < 0.0 {
        invalid(errors, "simulation.duration_s", "durations must not be negative");
    }
}

fn validate_potentials(config: &CultureConfig, errors: &mut Vec<ConfigValidationError>) {
    let n = &config.neuron;
    if !(n.v_reset < n.v_thresh && n.v_thresh < n.v_peak) {
        invalid(
            errors,
            "neuron",
            format!(
                "potentials must satisfy v_reset < v_thresh < v_peak (got {} / {} / {})",
                n.v_reset, n.v_thresh, n.v_peak
            ),
        );
    }
    if n.v_rest >= n.v_thresh {
        invalid(errors, "neuron.v_rest", "resting potential must lie below threshold");
    }
    if n.k <= 0.0 {
        invalid(errors, "neuron.k", "quadratic coefficient must be positive");
    }
}

fn validate_rates(config: &CultureConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.synapse.beta <= 0.0 || config.synapse.beta > 1.0 {
        invalid(errors, "synapse.beta", "must lie in (0, 1]");
    }
    let noise = [
        ("noise.mini_rate_hz", config.noise.mini_rate_hz),
        ("noise.j_mini", config.noise.j_mini),
        ("noise.white_noise_strength", config.noise.white_noise_strength),
    ];
    for (field, value) in noise {
        if value < 0.0 || !value.is_finite() {
            invalid(errors, field, "must be finite and not negative");
        }
    }
    if config.plasticity.enabled && config.plasticity.target_rate_hz <= 0.0 {
        invalid(
            errors,
            "plasticity.target_rate_hz",
            "enabled plasticity needs a positive target rate",
        );
    }
}

fn validate_stimulation(config: &CultureConfig, errors: &mut Vec<ConfigValidationError>) {
    match config.stimulation.mode.as_str() {
        "off" | "pulse" | "poisson" => {}
        other => invalid(
            errors,
            "stimulation.mode",
            format!("unknown mode '{}' (expected off, pulse, or poisson)", other),
        ),
    }
    if config.stimulation.mode != "off" && config.stimulation.target_modules.is_empty() {
        invalid(errors, "stimulation.target_modules", "stimulation needs target modules");
    }
    if config.stimulation.pulse_interval_ms <= 0.0 {
        invalid(errors, "stimulation.pulse_interval_ms", "interval must be positive");
    }
    if config.stimulation.extra_rate_hz < 0.0 || !config.stimulation.extra_rate_hz.is_finite() {
        invalid(errors, "stimulation.extra_rate_hz", "must be finite and not negative");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CultureConfig::default()).is_ok());
    }

    #[test]
    fn test_unordered_potentials_rejected() {
        let mut config = CultureConfig::default();
        config.neuron.v_reset = 40.0; // above peak
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("v_reset < v_thresh < v_peak"));
    }

    #[test]
    fn test_coarse_dt_rejected() {
        let mut config = CultureConfig::default();
        config.simulation.dt_ms = 0.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_beta_bounds() {
        let mut config = CultureConfig::default();
        config.synapse.beta = 1.2;
        assert!(validate_config(&config).is_err());
        config.synapse.beta = 1.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_non_finite_noise_rejected() {
        // NaN compares false against every bound, so a plain sign check
        // would let it through and silently disable the minis
        let mut config = CultureConfig::default();
        config.noise.mini_rate_hz = f64::NAN;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("noise.mini_rate_hz"));

        let mut config = CultureConfig::default();
        config.noise.j_mini = f64::INFINITY;
        assert!(validate_config(&config).is_err());

        let mut config = CultureConfig::default();
        config.noise.white_noise_strength = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_stimulation_mode_rejected() {
        let mut config = CultureConfig::default();
        config.stimulation.mode = "ramp".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("stimulation.mode"));
    }
}
