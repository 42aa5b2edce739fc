// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types shared across the modular-cultures workspace.
//!
//! Unit conventions: membrane potentials are millivolts, engine-internal
//! times are milliseconds, times at the I/O boundary (spike lists, rate
//! traces, burst results) are seconds.

use serde::{Deserialize, Serialize};

mod error;

pub use error::{CultureError, Result};

/// Index of a neuron within a culture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeuronId(pub u32);

impl NeuronId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NeuronId {
    fn from(id: u32) -> Self {
        NeuronId(id)
    }
}

impl core::fmt::Display for NeuronId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Index of a module (sub-culture) within a culture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u32);

impl ModuleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ModuleId {
    fn from(id: u32) -> Self {
        ModuleId(id)
    }
}

impl core::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mod{}", self.0)
    }
}

/// One entry of the two-column spike list: which neuron fired, and when.
///
/// Times are relative to the end of the equilibration phase, in seconds,
/// matching the on-disk recording layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeRecord {
    pub neuron: NeuronId,
    pub time_s: f64,
}

impl SpikeRecord {
    pub fn new(neuron: NeuronId, time_s: f64) -> Self {
        Self { neuron, time_s }
    }
}

/// Milliseconds to seconds, for crossing the engine/I-O boundary.
#[inline]
pub fn ms_to_s(t_ms: f64) -> f64 {
    t_ms * 1e-3
}

/// Seconds to milliseconds.
#[inline]
pub fn s_to_ms(t_s: f64) -> f64 {
    t_s * 1e3
}
