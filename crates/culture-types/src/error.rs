// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Workspace-level error type.
//!
//! Library crates define their own error enums; this is the top-level
//! aggregation used by the umbrella crate and the engine.

use crate::NeuronId;
use thiserror::Error;

/// Errors shared across the modular-cultures workspace.
#[derive(Debug, Error)]
pub enum CultureError {
    #[error("neuron {0} out of range (culture has {1} neurons)")]
    NeuronOutOfRange(NeuronId, usize),

    #[error("array size mismatch: expected {expected}, got {actual}")]
    ArraySizeMismatch { expected: usize, actual: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CultureError>;
