// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Void-parameter threshold between intra- and inter-burst ISI peaks.

use crate::histogram::{find_peaks, isi_histogram, lowess_smooth};

/// Outcome of the logISI threshold search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IsiThreshold {
    /// No histogram minimum had a void parameter above the acceptance level.
    NotFound,
    /// No histogram peak sits below the fast/slow cutoff, so the train has
    /// no resolvable intra-burst timescale.
    NoFastPeak,
    /// Accepted separation threshold, in seconds.
    Seconds(f64),
}

/// Fraction of samples per lowess window when smoothing the ISI histogram.
const SMOOTH_FRAC: f64 = 0.05;

/// Finds the ISI threshold separating intra- from inter-burst intervals.
///
/// Builds the log-spaced ISI histogram of `train_s`, smooths it, and scans
/// the minima between the tallest peak below `cutoff_s` and each later peak.
/// A minimum is accepted when its void parameter
/// `1 - h_min / sqrt(h_peak1 * h_peak2)` reaches `void_threshold`.
pub fn logisi_threshold(train_s: &[f64], cutoff_s: f64, void_threshold: f64) -> IsiThreshold {
    let hist = match isi_histogram(train_s) {
        Some(h) => h,
        None => return IsiThreshold::NotFound,
    };
    let smoothed = lowess_smooth(&hist.density, SMOOTH_FRAC);
    match threshold_from_histogram(&smoothed, &hist.edges_ms, cutoff_s * 1000.0, void_threshold) {
        IsiThreshold::Seconds(ms) => IsiThreshold::Seconds(ms / 1000.0),
        other => other,
    }
}

/// Threshold search on an already smoothed histogram; positions in ms.
/// `Seconds` here carries milliseconds, converted by [`logisi_threshold`].
fn threshold_from_histogram(
    smoothed: &[f64],
    edges_ms: &[f64],
    cutoff_ms: f64,
    void_threshold: f64,
) -> IsiThreshold {
    let peaks = find_peaks(smoothed);
    let heights: Vec<f64> = peaks.iter().map(|&p| smoothed[p]).collect();

    // tallest peak positioned below the cutoff is the intra-burst peak
    let last_fast = match peaks.iter().rposition(|&p| edges_ms[p] < cutoff_ms) {
        Some(idx) => idx,
        None => return IsiThreshold::NoFastPeak,
    };
    let intra_idx = if last_fast > 0 {
        heights[..last_fast]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    } else {
        0
    };
    let x1 = peaks[intra_idx];
    let y1 = heights[intra_idx];

    if intra_idx + 1 >= peaks.len() {
        return IsiThreshold::NotFound;
    }

    for (&x2, &y2) in peaks[intra_idx + 1..].iter().zip(&heights[intra_idx + 1..]) {
        let (min_off, min_val) = smoothed[x1..x2]
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, &v)| (i, v))
            .unwrap_or((0, y1));
        let void = 1.0 - min_val / (y1 * y2).sqrt();
        if void >= void_threshold {
            return IsiThreshold::Seconds(edges_ms[x1 + min_off]);
        }
    }
    IsiThreshold::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Regular bursty train: bursts of 10 spikes at 5 ms ISI every 2 s.
    fn bursty_train(num_bursts: usize) -> Vec<f64> {
        let mut t = Vec::new();
        for b in 0..num_bursts {
            let start = b as f64 * 2.0;
            for k in 0..10 {
                t.push(start + k as f64 * 0.005);
            }
        }
        t
    }

    #[test]
    fn bimodal_train_yields_threshold_between_modes() {
        let train = bursty_train(200);
        match logisi_threshold(&train, 0.1, 0.7) {
            IsiThreshold::Seconds(thr) => {
                assert!(thr > 0.004, "threshold {thr} not above intra ISI");
                assert!(thr < 1.955, "threshold {thr} not below inter IBI");
            }
            other => panic!("expected a threshold, got {other:?}"),
        }
    }

    #[test]
    fn tonic_train_has_no_fast_peak() {
        // a single slow timescale: 500 ms everywhere
        let train: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();
        assert_eq!(logisi_threshold(&train, 0.1, 0.7), IsiThreshold::NoFastPeak);
    }

    #[test]
    fn sub_millisecond_train_finds_nothing() {
        let train: Vec<f64> = (0..50).map(|i| i as f64 * 0.0005).collect();
        assert_eq!(logisi_threshold(&train, 0.1, 0.7), IsiThreshold::NotFound);
    }

    #[test]
    fn direct_histogram_threshold_lands_in_the_void() {
        // hand-built bimodal histogram: peaks at bins 2 and 8, valley at 5
        let smoothed = [0.0, 0.5, 1.0, 0.5, 0.1, 0.02, 0.1, 0.5, 1.0, 0.5, 0.0];
        let edges: Vec<f64> = (0..12).map(|i| 10f64.powf(i as f64 * 0.25)).collect();
        match threshold_from_histogram(&smoothed, &edges, edges[4], 0.7) {
            IsiThreshold::Seconds(ms) => assert!((ms - edges[5]).abs() < 1e-9),
            other => panic!("expected threshold, got {other:?}"),
        }
    }
}
