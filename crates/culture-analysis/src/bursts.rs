// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Three-phase burst extraction (sjemea) and the Pasquale dispatch.

use serde::Serialize;
use tracing::debug;

use crate::threshold::{logisi_threshold, IsiThreshold};

/// One detected burst. `begin` and `end` index into the spike train that
/// was analyzed; both are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Burst {
    pub begin: usize,
    pub end: usize,
    /// Number of spikes in the burst.
    pub len: usize,
    /// Interval from the previous burst's last spike to this burst's first
    /// spike. `None` for the first burst of a train.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ibi_s: Option<f64>,
    /// First spike to last spike.
    pub duration_s: f64,
    pub mean_isi_s: f64,
    /// Median spike time within the burst.
    pub median_time_s: f64,
    /// Distinct contributing neurons, for network-level bursts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_neurons: Option<usize>,
}

struct RawBurst {
    beg: usize,
    end: usize,
}

/// Slack when comparing an ISI against the threshold.
const EPS: f64 = 1e-10;

/// Finds bursts in a sorted spike train (times in seconds).
///
/// Three phases: (1) runs of ISIs at or below `isi_low_s` become candidate
/// bursts; (2) candidates closer than `min_ibi_s` merge; (3) candidates
/// shorter than `min_durn_s` or with fewer than `min_spikes` spikes are
/// dropped. With `neuron_ids` (network-level detection over pooled burst
/// times) phase 3 counts distinct contributing neurons instead of spikes.
pub fn find_bursts(
    spikes: &[f64],
    min_ibi_s: f64,
    min_durn_s: f64,
    min_spikes: usize,
    isi_low_s: f64,
    neuron_ids: Option<&[u32]>,
) -> Vec<Burst> {
    let nspikes = spikes.len();
    if nspikes < 2 {
        return Vec::new();
    }

    // Phase 1: threshold pass over the ISIs.
    let mut raw: Vec<RawBurst> = Vec::new();
    let mut in_burst = false;
    let mut beg = 0usize;
    for n in 1..nspikes.saturating_sub(1) {
        let next_isi = spikes[n] - spikes[n - 1];
        if in_burst {
            if next_isi - isi_low_s > EPS {
                raw.push(RawBurst { beg, end: n - 1 });
                in_burst = false;
            }
        } else if next_isi - isi_low_s <= EPS {
            beg = n - 1;
            in_burst = true;
        }
    }
    if in_burst {
        raw.push(RawBurst { beg, end: nspikes - 1 });
    }
    if raw.is_empty() {
        return Vec::new();
    }
    debug!(candidates = raw.len(), "burst candidates before merge");

    // Phase 2: merge bursts separated by less than min_ibi_s. Work backwards
    // so chains of three or more merge into the earliest one.
    let ibis: Vec<Option<f64>> = raw
        .iter()
        .enumerate()
        .map(|(i, b)| (i > 0).then(|| spikes[b.beg] - spikes[raw[i - 1].end]))
        .collect();
    let mut rejected = vec![false; raw.len()];
    let merge: Vec<usize> = ibis
        .iter()
        .enumerate()
        .filter_map(|(i, ibi)| matches!(ibi, Some(v) if *v < min_ibi_s).then_some(i))
        .collect();
    for &i in merge.iter().rev() {
        raw[i - 1].end = raw[i].end;
        rejected[i] = true;
    }

    // Phase 3: reject short or sparse bursts.
    for (i, b) in raw.iter().enumerate() {
        let durn = spikes[b.end] - spikes[b.beg];
        if durn < min_durn_s {
            rejected[i] = true;
        }
        let population = match neuron_ids {
            None => b.end - b.beg + 1,
            Some(ids) => {
                let mut seen: Vec<u32> = ids[b.beg..b.end].to_vec();
                seen.sort_unstable();
                seen.dedup();
                seen.len()
            }
        };
        if population < min_spikes {
            rejected[i] = true;
        }
    }
    let survivors: Vec<RawBurst> = raw
        .into_iter()
        .zip(&rejected)
        .filter_map(|(b, &r)| (!r).then_some(b))
        .collect();
    debug!(bursts = survivors.len(), "bursts after rejection");

    finalize(spikes, &survivors, neuron_ids)
}

/// Recomputes IBIs, durations, and median times for the surviving bursts.
fn finalize(spikes: &[f64], raw: &[RawBurst], neuron_ids: Option<&[u32]>) -> Vec<Burst> {
    raw.iter()
        .enumerate()
        .map(|(i, b)| {
            let len = b.end - b.beg + 1;
            let duration_s = spikes[b.end] - spikes[b.beg];
            let body = &spikes[b.beg..b.end];
            let median_time_s = if body.is_empty() {
                spikes[b.beg]
            } else {
                median(body)
            };
            Burst {
                begin: b.beg,
                end: b.end,
                len,
                ibi_s: (i > 0).then(|| spikes[b.beg] - spikes[raw[i - 1].end]),
                duration_s,
                mean_isi_s: duration_s / (len - 1) as f64,
                median_time_s,
                unique_neurons: neuron_ids.map(|ids| {
                    let mut seen: Vec<u32> = ids[b.beg..b.end].to_vec();
                    seen.sort_unstable();
                    seen.dedup();
                    seen.len()
                }),
            }
        })
        .collect()
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Extends each burst with burst-related spikes: when a burst boundary falls
/// inside a detection made with the looser threshold, the burst stretches to
/// that detection's limits. Bursts that end up sharing a boundary collapse
/// into one.
fn extend_with_related(
    bursts: &[Burst],
    related: &[Burst],
    spikes: &[f64],
) -> Vec<Burst> {
    let mut adjusted: Vec<RawBurst> = Vec::with_capacity(bursts.len());
    for b in bursts {
        let mut res = RawBurst { beg: b.begin, end: b.end };
        for r in related {
            let covers_beg = b.begin >= r.begin && b.begin <= r.end;
            let covers_end = b.end >= r.begin && b.end <= r.end;
            if covers_beg || covers_end {
                res.beg = b.begin.min(r.begin);
                res.end = b.end.max(r.end);
                break;
            }
            if r.end > b.end {
                break;
            }
        }
        adjusted.push(res);
    }

    // merged neighbors share a begin or an end; keep one of each pair
    let mut keep = vec![true; adjusted.len()];
    for i in 1..adjusted.len() {
        if adjusted[i].beg == adjusted[i - 1].beg {
            keep[i - 1] = false;
        }
        if adjusted[i].end == adjusted[i - 1].end {
            keep[i] = false;
        }
    }
    let kept: Vec<RawBurst> = adjusted
        .into_iter()
        .zip(&keep)
        .filter_map(|(b, &k)| k.then_some(b))
        .collect();

    finalize(spikes, &kept, None)
}

/// Minimum spikes per burst for single-neuron detection.
const MIN_SPIKES: usize = 3;

/// Detects bursts in one neuron's spike train with the Pasquale method and
/// also reports the threshold the histogram produced.
///
/// The histogram threshold drives one of four regimes:
/// * threshold missing or at 1 s and above: plain detection at `cutoff_s`;
/// * no fast peak: no bursts;
/// * threshold between `cutoff_s` and 1 s: cores detected at `cutoff_s`
///   (merging closer than the threshold), then extended with burst-related
///   spikes found at the looser threshold;
/// * threshold at or below `cutoff_s`: plain detection at the threshold.
///
/// Trains of three spikes or fewer yield no bursts.
pub fn detect_bursts_with_threshold(
    train_s: &[f64],
    cutoff_s: f64,
) -> (Vec<Burst>, IsiThreshold) {
    if train_s.len() <= MIN_SPIKES {
        return (Vec::new(), IsiThreshold::NotFound);
    }
    let threshold = logisi_threshold(train_s, cutoff_s, 0.7);
    debug!(?threshold, "logISI threshold");

    let bursts = match threshold {
        IsiThreshold::NotFound => {
            find_bursts(train_s, 0.0, 0.0, MIN_SPIKES, cutoff_s, None)
        }
        IsiThreshold::NoFastPeak => Vec::new(),
        IsiThreshold::Seconds(isi_low) if isi_low >= 1.0 => {
            find_bursts(train_s, 0.0, 0.0, MIN_SPIKES, cutoff_s, None)
        }
        IsiThreshold::Seconds(isi_low) if isi_low > cutoff_s => {
            let cores = find_bursts(train_s, isi_low, 0.0, MIN_SPIKES, cutoff_s, None);
            if cores.is_empty() {
                cores
            } else {
                let related = find_bursts(train_s, 0.0, 0.0, MIN_SPIKES, isi_low, None);
                extend_with_related(&cores, &related, train_s)
            }
        }
        IsiThreshold::Seconds(isi_low) => {
            find_bursts(train_s, 0.0, 0.0, MIN_SPIKES, isi_low, None)
        }
    };
    (bursts, threshold)
}

/// [`detect_bursts_with_threshold`] without the threshold report.
pub fn detect_bursts(train_s: &[f64], cutoff_s: f64) -> Vec<Burst> {
    detect_bursts_with_threshold(train_s, cutoff_s).0
}
