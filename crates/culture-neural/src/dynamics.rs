// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-neuron state update
//!
//! Euler / Euler-Maruyama integration of
//!
//! ```text
//! dv/dt = ( k (v - vr)(v - vt) - u + I + xi sqrt(gs/tc) ) / tc
//! dI/dt = -I / tA
//! du/dt = ( b (v - vr) - u ) / ta
//! dD/dt = ( 1 - D ) / tD
//! dH/dt = gH rH / tH
//! ```
//!
//! with the spike rule `v > vp`:
//!
//! ```text
//! v = vc,   u += d,   D *= beta,   H = max(H - gH/tH, 0)
//! ```
//!
//! Synaptic transmission on a presynaptic spike adds `D_pre jA H_post` to
//! the postsynaptic current.

use crate::QifParameters;

/// Dynamic state of one neuron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuronState {
    /// Membrane potential, mV.
    pub v: f64,
    /// Post-synaptic (AMPA) current, expressed in mV.
    pub i_syn: f64,
    /// Adaptation current, mV.
    pub u: f64,
    /// Synaptic depression resource, recovers to 1.
    pub d: f64,
    /// Homeostatic gain on incoming transmission.
    pub h: f64,
}

impl NeuronState {
    /// Rest state with full resources and unit gain.
    pub fn resting(params: &QifParameters) -> Self {
        Self {
            v: params.v_rest,
            i_syn: 0.0,
            u: 0.0,
            d: 1.0,
            h: 1.0,
        }
    }
}

/// Advance one neuron by one step of `dt_ms`.
///
/// `noise` is a standard-normal draw; it is scaled internally by
/// [`QifParameters::noise_amplitude`]. Returns `true` when the membrane
/// passed the peak potential; the caller must then apply
/// [`reset_after_spike`] and propagate the spike.
#[inline]
pub fn step_neuron(state: &mut NeuronState, params: &QifParameters, dt_ms: f64, noise: f64) -> bool {
    // every derivative is evaluated at the start-of-step state
    let v = state.v;
    let drift = (params.k * (v - params.v_rest) * (v - params.v_thresh) - state.u + state.i_syn)
        / params.tau_mem_ms;
    state.v += dt_ms * drift + params.noise_amplitude(dt_ms) * noise;

    state.i_syn += dt_ms * (-state.i_syn / params.tau_ampa_ms);
    state.u += dt_ms * ((params.b * (v - params.v_rest) - state.u) / params.tau_adapt_ms);
    state.d += dt_ms * ((1.0 - state.d) / params.tau_depression_ms);
    if params.plasticity_enabled {
        state.h += dt_ms * (params.gain_ms * params.target_rate_per_ms / params.tau_homeostasis_ms);
    }

    state.v > params.v_peak
}

/// Apply the after-spike reset rule.
#[inline]
pub fn reset_after_spike(state: &mut NeuronState, params: &QifParameters) {
    state.v = params.v_reset;
    state.u += params.delta_u;
    state.d *= params.beta;
    if params.plasticity_enabled {
        state.h = (state.h - params.homeostatic_decrement()).max(0.0);
    }
}

/// Current delivered to a postsynaptic neuron by one presynaptic spike.
///
/// Scaled by the presynaptic depression resource and the postsynaptic
/// homeostatic gain: `D_pre * jA * H_post`.
#[inline]
pub fn synaptic_transmission(d_pre: f64, h_post: f64, params: &QifParameters) -> f64 {
    d_pre * params.j_ampa * h_post
}

/// Net homeostatic drift per second at a given firing rate, in gain units.
///
/// Zero exactly at the target rate: the steady inter-spike increase
/// `gH rH / tH` balances the per-spike decrement `gH / tH`.
pub fn homeostatic_balance(params: &QifParameters, rate_hz: f64) -> f64 {
    let gain_per_ms = params.gain_ms * params.target_rate_per_ms / params.tau_homeostasis_ms;
    let loss_per_ms = params.homeostatic_decrement() * rate_hz * 1e-3;
    (gain_per_ms - loss_per_ms) * 1e3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> QifParameters {
        QifParameters::default()
    }

    #[test]
    fn test_resting_state_is_stable_without_input() {
        let p = params();
        let mut state = NeuronState::resting(&p);
        for _ in 0..10_000 {
            let fired = step_neuron(&mut state, &p, 0.05, 0.0);
            assert!(!fired);
        }
        // quadratic drift vanishes at v_rest; u and I stay at zero
        assert!((state.v - p.v_rest).abs() < 1e-6);
        assert!(state.u.abs() < 1e-6);
    }

    #[test]
    fn test_strong_input_drives_spike() {
        let p = params();
        let mut state = NeuronState::resting(&p);
        state.i_syn = 500.0;
        let mut fired = false;
        for _ in 0..100_000 {
            if step_neuron(&mut state, &p, 0.05, 0.0) {
                fired = true;
                break;
            }
        }
        assert!(fired, "500 mV of sustained current must drive a spike");
    }

    #[test]
    fn test_adaptation_drift_uses_start_of_step_potential() {
        let p = params();
        let mut state = NeuronState::resting(&p);
        // depolarized below threshold, so v moves within the step
        state.v = -50.0;
        let v0 = state.v;
        step_neuron(&mut state, &p, 0.05, 0.0);
        assert_ne!(state.v, v0);
        let expected = 0.05 * (p.b * (v0 - p.v_rest) / p.tau_adapt_ms);
        assert_eq!(state.u, expected);
    }

    #[test]
    fn test_reset_rule() {
        let p = params();
        let mut state = NeuronState::resting(&p);
        state.v = p.v_peak + 10.0;
        state.u = 1.0;
        reset_after_spike(&mut state, &p);
        assert_eq!(state.v, p.v_reset);
        assert_eq!(state.u, 1.0 + p.delta_u);
        assert!((state.d - p.beta).abs() < 1e-12);
    }

    #[test]
    fn test_depression_recovers_towards_one() {
        let p = params();
        let mut state = NeuronState::resting(&p);
        state.d = 0.2;
        for _ in 0..200_000 {
            step_neuron(&mut state, &p, 0.05, 0.0);
        }
        // 10 s of recovery at tau_D = 2 s
        assert!(state.d > 0.95 && state.d <= 1.0 + 1e-9);
    }

    #[test]
    fn test_homeostatic_gain_floor() {
        let p = params();
        let mut state = NeuronState::resting(&p);
        state.h = 0.05;
        for _ in 0..10 {
            reset_after_spike(&mut state, &p);
        }
        assert_eq!(state.h, 0.0);
    }

    #[test]
    fn test_homeostatic_balance_at_target_rate() {
        let p = params();
        assert!(homeostatic_balance(&p, 0.2).abs() < 1e-12);
        assert!(homeostatic_balance(&p, 0.1) > 0.0); // too quiet: gain grows
        assert!(homeostatic_balance(&p, 0.4) < 0.0); // too active: gain shrinks
    }

    #[test]
    fn test_transmission_scaling() {
        let p = params();
        let full = synaptic_transmission(1.0, 1.0, &p);
        assert_eq!(full, p.j_ampa);
        assert_eq!(synaptic_transmission(0.5, 1.0, &p), full * 0.5);
        assert_eq!(synaptic_transmission(1.0, 0.0, &p), 0.0);
    }

    #[test]
    fn test_disabled_plasticity_keeps_gain_fixed() {
        let mut p = params();
        p.plasticity_enabled = false;
        let mut state = NeuronState::resting(&p);
        for _ in 0..1000 {
            step_neuron(&mut state, &p, 0.05, 0.0);
        }
        reset_after_spike(&mut state, &p);
        assert_eq!(state.h, 1.0);
    }
}
