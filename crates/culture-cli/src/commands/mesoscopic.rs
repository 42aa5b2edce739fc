// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! The `mesoscopic` subcommand: four coupled modules with stochastic gates.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use culture_mesoscopic::{MesoscopicModel, MesoscopicParams};

#[derive(Args, Debug)]
pub struct MesoscopicArgs {
    /// Output trace JSON
    #[arg(short = 'o', long = "output", default_value = "mesoscopic.json")]
    pub output: PathBuf,

    /// Simulated duration in model time units
    #[arg(short = 'd', long = "duration", default_value_t = 1000.0)]
    pub duration: f64,

    /// RNG seed
    #[arg(short = 's', long = "seed", default_value_t = 117)]
    pub seed: u64,

    /// Disable the synaptic gates (control condition: all activity passes)
    #[arg(long = "no-gates")]
    pub no_gates: bool,

    /// Inter-module coupling strength
    #[arg(long = "coupling")]
    pub coupling: Option<f64>,

    /// Background noise strength
    #[arg(long = "sigma")]
    pub sigma: Option<f64>,

    /// External stimulation strength
    #[arg(long = "ext")]
    pub ext: Option<f64>,
}

pub fn run(args: MesoscopicArgs) -> Result<()> {
    let mut params = MesoscopicParams {
        no_gates: args.no_gates,
        ..MesoscopicParams::default()
    };
    if let Some(w0) = args.coupling {
        params.w0 = w0;
    }
    if let Some(sigma) = args.sigma {
        params.sigma = sigma;
    }
    if let Some(ext) = args.ext {
        params.ext_str = ext;
    }

    info!(
        seed = args.seed,
        duration = args.duration,
        no_gates = params.no_gates,
        "running mesoscopic model"
    );
    let mut model = MesoscopicModel::new(params, args.seed);
    let trace = model.simulate(args.duration);
    trace
        .save(&args.output)
        .with_context(|| format!("writing trace {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        samples = trace.time.len(),
        "trace written"
    );
    Ok(())
}
