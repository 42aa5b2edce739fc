// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run monitors
//!
//! Monitors collect while the engine steps and are converted into the
//! recording document afterwards. They attach after equilibration; all
//! recorded times are relative to that moment, in seconds.

use culture_types::{ms_to_s, NeuronId, SpikeRecord};
use ndarray::Array2;

/// Names of the recorded state variables, in trace order.
pub const STATE_VAR_NAMES: [&str; 5] = ["v", "I", "u", "D", "H"];

/// Collects every spike of the culture.
#[derive(Debug, Default)]
pub struct SpikeMonitor {
    records: Vec<SpikeRecord>,
}

impl SpikeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, neuron: NeuronId, time_ms: f64) {
        self.records.push(SpikeRecord::new(neuron, ms_to_s(time_ms)));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<SpikeRecord> {
        self.records
    }

    /// Zero-padded per-neuron spike-time matrix, the second on-disk format.
    ///
    /// Row `n` holds the spike times of neuron `n` in seconds, padded with
    /// zeros to the longest train.
    pub fn to_padded_matrix(&self, num_neurons: usize) -> Array2<f64> {
        let mut trains: Vec<Vec<f64>> = vec![Vec::new(); num_neurons];
        for record in &self.records {
            trains[record.neuron.index()].push(record.time_s);
        }
        let longest = trains.iter().map(Vec::len).max().unwrap_or(0);
        let mut matrix = Array2::zeros((num_neurons, longest));
        for (n, train) in trains.iter().enumerate() {
            for (s, &t) in train.iter().enumerate() {
                matrix[[n, s]] = t;
            }
        }
        matrix
    }
}

/// Records the five state variables for a subset of neurons.
#[derive(Debug)]
pub struct StateMonitor {
    neurons: Vec<NeuronId>,
    stride: usize,
    steps_seen: usize,
    time_axis_s: Vec<f64>,
    /// One row per recorded neuron; indexed per variable.
    traces: [Vec<Vec<f64>>; 5],
}

impl StateMonitor {
    pub fn new(neurons: Vec<NeuronId>, stride: usize) -> Self {
        let rows = neurons.len();
        Self {
            neurons,
            stride: stride.max(1),
            steps_seen: 0,
            time_axis_s: Vec::new(),
            traces: std::array::from_fn(|_| vec![Vec::new(); rows]),
        }
    }

    pub fn neurons(&self) -> &[NeuronId] {
        &self.neurons
    }

    /// Whether this step falls on the sampling stride.
    #[inline]
    pub fn due(&mut self) -> bool {
        let due = self.steps_seen % self.stride == 0;
        self.steps_seen += 1;
        due
    }

    /// Record one sample. `values[i]` are the five state variables of the
    /// i-th monitored neuron, in [`STATE_VAR_NAMES`] order.
    pub fn record(&mut self, time_ms: f64, values: impl Iterator<Item = [f64; 5]>) {
        self.time_axis_s.push(ms_to_s(time_ms));
        for (row, sample) in values.enumerate() {
            for (var, &value) in sample.iter().enumerate() {
                self.traces[var][row].push(value);
            }
        }
    }

    pub fn time_axis_s(&self) -> &[f64] {
        &self.time_axis_s
    }

    /// Trace matrix of one variable, neurons x samples.
    pub fn trace_matrix(&self, var: usize) -> Array2<f64> {
        let rows = self.neurons.len();
        let cols = self.time_axis_s.len();
        let mut matrix = Array2::zeros((rows, cols));
        for (row, trace) in self.traces[var].iter().enumerate() {
            for (col, &value) in trace.iter().enumerate() {
                matrix[[row, col]] = value;
            }
        }
        matrix
    }
}

/// Population rate, binned at the output resolution.
///
/// Spike counts are accumulated into bins of `bin_ms`; at conversion time
/// the binned rate is smoothed with a Gaussian kernel of one bin width so
/// sudden changes between written samples are not missed.
#[derive(Debug)]
pub struct RateMonitor {
    bin_ms: f64,
    num_neurons: usize,
    counts: Vec<u64>,
}

impl RateMonitor {
    pub fn new(bin_ms: f64, num_neurons: usize) -> Self {
        Self {
            bin_ms,
            num_neurons,
            counts: Vec::new(),
        }
    }

    #[inline]
    pub fn record(&mut self, time_ms: f64, fired: usize) {
        let bin = (time_ms / self.bin_ms) as usize;
        if bin >= self.counts.len() {
            self.counts.resize(bin + 1, 0);
        }
        self.counts[bin] += fired as u64;
    }

    /// Smoothed population rate in Hz: `(time_s, rate_hz)` pairs.
    pub fn smoothed_rate(&self) -> Vec<(f64, f64)> {
        let bin_s = ms_to_s(self.bin_ms);
        let per_neuron_hz: Vec<f64> = self
            .counts
            .iter()
            .map(|&c| c as f64 / (self.num_neurons as f64 * bin_s))
            .collect();
        let smoothed = gaussian_smooth(&per_neuron_hz, 1.0);
        smoothed
            .into_iter()
            .enumerate()
            .map(|(bin, rate)| (bin as f64 * bin_s, rate))
            .collect()
    }
}

/// Gaussian smoothing with standard deviation `sigma` samples.
///
/// Kernel is truncated at four sigma and renormalized at the edges.
pub fn gaussian_smooth(values: &[f64], sigma: f64) -> Vec<f64> {
    if values.is_empty() || sigma <= 0.0 {
        return values.to_vec();
    }
    let half = (4.0 * sigma).ceil() as isize;
    let kernel: Vec<f64> = (-half..=half)
        .map(|k| (-0.5 * (k as f64 / sigma).powi(2)).exp())
        .collect();

    let n = values.len() as isize;
    (0..n)
        .map(|i| {
            let mut acc = 0.0;
            let mut norm = 0.0;
            for (kdx, weight) in kernel.iter().enumerate() {
                let j = i + kdx as isize - half;
                if j >= 0 && j < n {
                    acc += weight * values[j as usize];
                    norm += weight;
                }
            }
            acc / norm
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_monitor_padded_matrix() {
        let mut monitor = SpikeMonitor::new();
        monitor.record(NeuronId(0), 1000.0);
        monitor.record(NeuronId(0), 2000.0);
        monitor.record(NeuronId(2), 1500.0);
        let matrix = monitor.to_padded_matrix(3);
        assert_eq!(matrix.shape(), &[3, 2]);
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[0, 1]], 2.0);
        assert_eq!(matrix[[1, 0]], 0.0); // padded
        assert_eq!(matrix[[2, 0]], 1.5);
    }

    #[test]
    fn test_state_monitor_stride() {
        let mut monitor = StateMonitor::new(vec![NeuronId(0)], 3);
        let due: Vec<bool> = (0..7).map(|_| monitor.due()).collect();
        assert_eq!(due, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_state_monitor_traces() {
        let mut monitor = StateMonitor::new(vec![NeuronId(0), NeuronId(1)], 1);
        monitor.record(0.0, [[1.0, 2.0, 3.0, 4.0, 5.0], [6.0, 7.0, 8.0, 9.0, 10.0]].into_iter());
        monitor.record(50.0, [[1.5, 2.0, 3.0, 4.0, 5.0], [6.5, 7.0, 8.0, 9.0, 10.0]].into_iter());
        let v = monitor.trace_matrix(0);
        assert_eq!(v.shape(), &[2, 2]);
        assert_eq!(v[[0, 1]], 1.5);
        assert_eq!(v[[1, 0]], 6.0);
        assert_eq!(monitor.time_axis_s(), &[0.0, 0.05]);
    }

    #[test]
    fn test_rate_monitor_bins() {
        let mut monitor = RateMonitor::new(50.0, 10);
        // 5 spikes in the first 50 ms bin: 5 / (10 neurons * 0.05 s) = 10 Hz
        for step in 0..5 {
            monitor.record(step as f64 * 10.0, 1);
        }
        let rate = monitor.smoothed_rate();
        assert_eq!(rate[0].0, 0.0);
        assert!((rate[0].1 - 10.0).abs() < 1e-9); // single bin, smoothing is identity
    }

    #[test]
    fn test_gaussian_smooth_preserves_constant() {
        let values = vec![2.0; 50];
        let smoothed = gaussian_smooth(&values, 2.0);
        for v in smoothed {
            assert!((v - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gaussian_smooth_spreads_peak() {
        let mut values = vec![0.0; 21];
        values[10] = 1.0;
        let smoothed = gaussian_smooth(&values, 1.0);
        assert!(smoothed[10] < 1.0);
        assert!(smoothed[9] > 0.0 && smoothed[11] > 0.0);
        assert!((smoothed[9] - smoothed[11]).abs() < 1e-12);
    }
}
