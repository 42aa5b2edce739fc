// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Network burst detection over pooled neuron-level bursts.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::bursts::{detect_bursts, find_bursts, Burst};
use crate::threshold::{logisi_threshold, IsiThreshold};
use crate::{AnalysisError, Result};

/// Which neuron-level burst time orders the pooled sequence. The choice only
/// affects the order of contributing neurons inside a network burst, not the
/// bursts themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstSort {
    #[default]
    Begin,
    Median,
    End,
}

/// Network bursts plus the pooled neuron-level bursts behind them.
///
/// The four detail vectors run in parallel, one entry per neuron-level
/// burst, sorted by the chosen time. [`Burst::begin`]/[`Burst::end`] of the
/// network bursts index into them.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkBurstReport {
    pub bursts: Vec<Burst>,
    pub neuron_ids: Vec<u32>,
    pub begin_times_s: Vec<f64>,
    pub median_times_s: Vec<f64>,
    pub end_times_s: Vec<f64>,
}

/// ISI cutoff for the per-neuron detection pass.
const NEURON_CUTOFF_S: f64 = 0.1;
/// Histogram cutoff for the pooled pass over burst times.
const POOLED_CUTOFF_S: f64 = 0.2;
/// Minimum gap between distinct network bursts.
const POOLED_MIN_IBI_S: f64 = 0.25;

/// Detects network bursts: per-neuron logISI bursts first, then a second
/// logISI pass over the pooled burst times. A network burst must recruit at
/// least `fraction` of all neurons (counted uniquely).
///
/// Non-finite and zero entries in the trains are ignored, so zero-padded
/// spike matrices can be passed row by row.
pub fn network_bursts(
    spiketimes: &[Vec<f64>],
    fraction: f64,
    sort_by: BurstSort,
) -> Result<NetworkBurstReport> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(AnalysisError::InvalidFraction(fraction));
    }
    let num_neurons = spiketimes.len();

    let per_neuron: Vec<(u32, Vec<Burst>, Vec<f64>)> = spiketimes
        .par_iter()
        .enumerate()
        .map(|(n, raw)| {
            let train: Vec<f64> = raw
                .iter()
                .copied()
                .filter(|t| t.is_finite() && *t != 0.0)
                .collect();
            let bursts = detect_bursts(&train, NEURON_CUTOFF_S);
            (n as u32, bursts, train)
        })
        .collect();

    // pool all neuron-level bursts into one flat, time-sorted sequence
    let mut pooled: Vec<(f64, u32, f64, f64, f64)> = Vec::new();
    for (n, bursts, train) in &per_neuron {
        for b in bursts {
            let beg = train[b.begin];
            let end = train[b.end];
            let key = match sort_by {
                BurstSort::Begin => beg,
                BurstSort::Median => b.median_time_s,
                BurstSort::End => end,
            };
            pooled.push((key, *n, beg, b.median_time_s, end));
        }
    }
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));
    debug!(pooled = pooled.len(), "neuron-level bursts");

    let report = |bursts: Vec<Burst>| NetworkBurstReport {
        bursts,
        neuron_ids: pooled.iter().map(|p| p.1).collect(),
        begin_times_s: pooled.iter().map(|p| p.2).collect(),
        median_times_s: pooled.iter().map(|p| p.3).collect(),
        end_times_s: pooled.iter().map(|p| p.4).collect(),
    };

    if pooled.is_empty() {
        return Ok(report(Vec::new()));
    }

    let burst_times: Vec<f64> = pooled.iter().map(|p| p.0).collect();
    let thr = match logisi_threshold(&burst_times, POOLED_CUTOFF_S, 0.0) {
        IsiThreshold::Seconds(thr) => thr,
        outcome => {
            debug!(?outcome, "no pooled threshold, no network bursts");
            return Ok(report(Vec::new()));
        }
    };

    let ids: Vec<u32> = pooled.iter().map(|p| p.1).collect();
    let min_unique = (fraction * num_neurons as f64) as usize;
    let bursts = find_bursts(
        &burst_times,
        POOLED_MIN_IBI_S,
        0.0,
        min_unique,
        thr,
        Some(&ids),
    );
    info!(
        network_bursts = bursts.len(),
        threshold_s = thr,
        "network burst detection done"
    );
    Ok(report(bursts))
}

/// Summary of inter-burst-interval statistics.
#[derive(Debug, Clone, Serialize)]
pub struct IbiStats {
    pub count: usize,
    pub mean_s: f64,
    pub median_s: f64,
    pub cv: f64,
}

/// Mean, median, and coefficient of variation of the IBIs in a burst list.
/// `None` when fewer than two bursts exist.
pub fn ibi_statistics(bursts: &[Burst]) -> Option<IbiStats> {
    let mut ibis: Vec<f64> = bursts.iter().filter_map(|b| b.ibi_s).collect();
    if ibis.is_empty() {
        return None;
    }
    ibis.sort_by(|a, b| a.total_cmp(b));
    let n = ibis.len();
    let mean = ibis.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (ibis[n / 2 - 1] + ibis[n / 2]) / 2.0
    } else {
        ibis[n / 2]
    };
    let var = ibis.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    Some(IbiStats {
        count: n,
        mean_s: mean,
        median_s: median,
        cv: var.sqrt() / mean,
    })
}
