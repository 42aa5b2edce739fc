// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! The `analyze` subcommand: network burst detection on a recording.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use culture_analysis::{ibi_statistics, network_bursts, Burst, BurstSort, IbiStats};
use culture_engine::Recording;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Recording JSON to analyze
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output report JSON
    #[arg(short = 'o', long = "output", default_value = "analysis.json")]
    pub output: PathBuf,

    /// Fraction of unique neurons a network burst must recruit
    #[arg(long = "fraction", default_value_t = 0.8)]
    pub fraction: f64,

    /// Which neuron-level burst time orders the pooled sequence
    #[arg(long = "sort-by", value_enum, default_value_t = SortKey::Begin)]
    pub sort_by: SortKey,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortKey {
    Begin,
    Median,
    End,
}

impl From<SortKey> for BurstSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Begin => BurstSort::Begin,
            SortKey::Median => BurstSort::Median,
            SortKey::End => BurstSort::End,
        }
    }
}

/// What `analyze` writes to disk.
#[derive(Debug, Serialize)]
struct AnalysisReport {
    source: String,
    num_neurons: usize,
    fraction: f64,
    network_bursts: Vec<Burst>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ibi_stats: Option<IbiStats>,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let recording = Recording::load(&args.input)
        .with_context(|| format!("loading recording {}", args.input.display()))?;
    info!(
        neurons = recording.meta.num_neurons,
        spikes = recording.spiketimes_as_list.len(),
        "analyzing recording"
    );

    let report = network_bursts(&recording.spiketimes, args.fraction, args.sort_by.into())?;
    let stats = ibi_statistics(&report.bursts);
    info!(network_bursts = report.bursts.len(), "detection done");

    let out = AnalysisReport {
        source: args.input.display().to_string(),
        num_neurons: recording.spiketimes.len(),
        fraction: args.fraction,
        network_bursts: report.bursts,
        ibi_stats: stats,
    };
    let json = serde_json::to_string_pretty(&out)?;
    fs::write(&args.output, json)
        .with_context(|| format!("writing report {}", args.output.display()))?;
    info!(path = %args.output.display(), "report written");
    Ok(())
}
