// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Burst analysis
//!
//! logISI burst detection after Pasquale et al. (J Comput Neurosci 2010,
//! DOI 10.1007/s10827-009-0175-1), as ported from the sjemea R package.
//!
//! The inter-spike-interval histogram of a bursting neuron is bimodal on a
//! log axis: a fast intra-burst peak and a slow inter-burst peak. The
//! threshold separating the two is placed at the histogram minimum between
//! them, accepted when the void parameter (depth of the minimum relative to
//! the geometric mean of the peaks) is large enough. Bursts are then cut out
//! of the train with the three-phase sjemea pass: threshold, merge, reject.
//!
//! [`network_bursts`] applies the same trick twice: once per neuron, then a
//! second logISI pass over the pooled neuron-level burst times, requiring a
//! fraction of unique neurons per network burst.

mod bursts;
mod histogram;
mod network;
mod threshold;

pub use bursts::{detect_bursts, detect_bursts_with_threshold, find_bursts, Burst};
pub use histogram::{find_peaks, isi_histogram, lowess_smooth, IsiHistogram};
pub use network::{ibi_statistics, network_bursts, BurstSort, IbiStats, NetworkBurstReport};
pub use threshold::{logisi_threshold, IsiThreshold};

use thiserror::Error;

/// Analysis parameter errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("network fraction must lie in (0, 1], got {0}")]
    InvalidFraction(f64),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
