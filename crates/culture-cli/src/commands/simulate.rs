// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! The `simulate` subcommand: spiking dynamics on a modular topology.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use culture_config::load_config;
use culture_engine::SimulationEngine;
use culture_topology::{Topology, TopologyBuilder};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Topology JSON to simulate; generated on the fly when omitted
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output recording JSON
    #[arg(short = 'o', long = "output", default_value = "recording.json")]
    pub output: PathBuf,

    /// Configuration TOML; searched for upward from the working directory
    /// when omitted
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// RNG seed
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Synaptic coupling strength in mV
    #[arg(long = "j-ampa")]
    pub j_ampa: Option<f64>,

    /// Amplitude of spontaneous synaptic noise events in mV
    #[arg(long = "j-mini")]
    pub j_mini: Option<f64>,

    /// Rate of spontaneous synaptic noise per neuron in Hz
    #[arg(short = 'r', long = "rate")]
    pub rate: Option<f64>,

    /// Recovery timescale of synaptic depression in seconds
    #[arg(long = "tau-depression")]
    pub tau_depression: Option<f64>,

    /// Simulated duration in seconds
    #[arg(short = 'd', long = "duration")]
    pub duration: Option<f64>,

    /// Equilibration phase in seconds, discarded from the recording
    #[arg(long = "equilibrate")]
    pub equilibrate: Option<f64>,

    /// Stimulation mode: off, pulse, or poisson
    #[arg(long = "stimulate")]
    pub stimulate: Option<String>,

    /// Module ids receiving stimulation
    #[arg(long = "modules", value_delimiter = ',')]
    pub modules: Vec<u32>,
}

impl SimulateArgs {
    /// Maps the command line onto `section.field` config overrides.
    fn overrides(&self) -> HashMap<String, String> {
        let mut o = HashMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                o.insert(key.to_string(), v);
            }
        };
        put("simulation.seed", self.seed.map(|v| v.to_string()));
        put("synapse.j_ampa", self.j_ampa.map(|v| v.to_string()));
        put("noise.j_mini", self.j_mini.map(|v| v.to_string()));
        put("noise.mini_rate_hz", self.rate.map(|v| v.to_string()));
        put(
            "synapse.tau_depression_s",
            self.tau_depression.map(|v| v.to_string()),
        );
        put("simulation.duration_s", self.duration.map(|v| v.to_string()));
        put(
            "simulation.equilibration_s",
            self.equilibrate.map(|v| v.to_string()),
        );
        put("stimulation.mode", self.stimulate.clone());
        o
    }
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let overrides = args.overrides();
    let mut config = load_config(args.config.as_deref(), Some(&overrides))
        .context("loading configuration")?;
    if !args.modules.is_empty() {
        config.stimulation.target_modules = args.modules.clone();
    }

    let topology = match &args.input {
        Some(path) => Topology::load(path)
            .with_context(|| format!("loading topology {}", path.display()))?,
        None => {
            info!(seed = config.simulation.seed, "no topology given, generating one");
            TopologyBuilder::new().seed(config.simulation.seed).build()
        }
    };
    info!(
        neurons = topology.num_neurons,
        modules = topology.num_modules(),
        edges = topology.edges.len(),
        "topology ready"
    );

    let mut engine = SimulationEngine::new(&topology, &config).context("building engine")?;
    engine.equilibrate();
    engine.run();

    let recording = engine.into_recording();
    recording
        .save(&args.output)
        .with_context(|| format!("writing recording {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        spikes = recording.spiketimes_as_list.len(),
        "recording written"
    );
    Ok(())
}
