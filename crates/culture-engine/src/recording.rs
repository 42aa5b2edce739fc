// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Recording output
//!
//! One JSON document per run, mirroring the historical dataset layout:
//! the spike list in two formats, state-variable traces with a shared time
//! axis, the smoothed population rate, stimulation times when enabled, and
//! the run metadata. Each dataset carries a human-readable description.

use crate::Result;
use chrono::Utc;
use culture_types::SpikeRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMeta {
    /// Creation timestamp, UTC. Not part of the deterministic payload.
    pub created_utc: String,
    pub seed: u64,
    pub j_ampa: f64,
    pub j_mini: f64,
    pub tau_depression_s: f64,
    pub mini_rate_hz: f64,
    pub simulation_duration_s: f64,
    pub equilibration_duration_s: f64,
    pub num_neurons: usize,
    pub num_modules: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_name: Option<String>,
}

/// State-variable traces for the monitored neuron subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTraces {
    /// Which neurons were recorded.
    pub neurons: Vec<u32>,
    /// Shared time axis, seconds.
    pub time_s: Vec<f64>,
    /// Per variable name: neurons x samples.
    pub variables: BTreeMap<String, Vec<Vec<f64>>>,
}

/// The on-disk result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub meta: RecordingMeta,

    /// Two-column spike list: neuron id and spike time in seconds.
    pub spiketimes_as_list: Vec<SpikeRecord>,

    /// Per-neuron spike times in seconds, zero-padded to the longest train.
    /// Effectively the same data as `spiketimes_as_list`.
    pub spiketimes: Vec<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateTraces>,

    /// Smoothed population rate: `(time_s, rate_hz)` samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_rate_smoothed: Option<Vec<(f64, f64)>>,

    /// Stimulation timestamps, same two-column layout as the spikes.
    /// Approximately one timestep of delay between stimulation and spike.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stimulation_times_as_list: Option<Vec<SpikeRecord>>,

    /// Human-readable description per dataset.
    pub descriptions: BTreeMap<String, String>,
}

impl Recording {
    pub(crate) fn dataset_descriptions(
        has_state: bool,
        has_rates: bool,
        has_stimulation: bool,
    ) -> BTreeMap<String, String> {
        let mut d = BTreeMap::new();
        d.insert(
            "spiketimes".to_string(),
            "2d array of spiketimes, neuron x spiketime in seconds, zero-padded".to_string(),
        );
        d.insert(
            "spiketimes_as_list".to_string(),
            "two-column list of spiketimes. first col is neuron id, second col the spiketime. \
             effectively same data as in 'spiketimes'."
                .to_string(),
        );
        if has_state {
            d.insert(
                "state".to_string(),
                "state variables v, I, u, D, H for the monitored neurons, with a shared \
                 time axis in seconds"
                    .to_string(),
            );
        }
        if has_rates {
            d.insert(
                "population_rate_smoothed".to_string(),
                "population rate in Hz, smoothed with a gaussian kernel, first dim is time \
                 in seconds"
                    .to_string(),
            );
        }
        if has_stimulation {
            d.insert(
                "stimulation_times_as_list".to_string(),
                "two-column list of stimulation times. first col is target-neuron id, second \
                 col the stimulation time. beware: approximately one timestep delay between \
                 stimulation and spike."
                    .to_string(),
            );
        }
        d
    }

    pub(crate) fn timestamp_now() -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Write the recording as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string(self)?;
        std::fs::write(path, contents)?;
        tracing::info!(
            spikes = self.spiketimes_as_list.len(),
            "saved recording to {}",
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Equality of the simulation payload, ignoring the creation timestamp.
    pub fn payload_eq(&self, other: &Self) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.meta.created_utc.clear();
        b.meta.created_utc.clear();
        a == b
    }
}
