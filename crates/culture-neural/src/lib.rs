// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quadratic integrate-and-fire dynamics for modular cultures
//!
//! Pure functions for the per-neuron state update. The model follows
//! Orlandi et al. 2013 (DOI: 10.1038/nphys2686), extended with short-term
//! synaptic depression and a homeostatic gain on the post-synaptic side.
//!
//! All functions are deterministic given their inputs; the stochastic terms
//! (white noise, minis) are sampled by the caller and passed in.

mod dynamics;
mod params;

pub use dynamics::{
    homeostatic_balance, reset_after_spike, step_neuron, synaptic_transmission, NeuronState,
};
pub use params::QifParameters;
