// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! `culture`: simulate and analyze modular neuronal cultures.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use culture_observability::init_logging;

mod commands;

use commands::{analyze, mesoscopic, simulate, sweep};

#[derive(Parser, Debug)]
#[command(name = "culture", version, about = "Modular neuronal cultures: simulation and burst analysis", long_about = None)]
struct Cli {
    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Also write logs to a run directory under this path
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a spiking simulation and write a recording
    Simulate(simulate::SimulateArgs),
    /// Run the four-module mesoscopic rate model
    Mesoscopic(mesoscopic::MesoscopicArgs),
    /// Detect network bursts in a recording
    Analyze(analyze::AnalyzeArgs),
    /// Write a parameter-sweep command file
    Sweep(sweep::SweepArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_level, cli.log_dir.as_deref())?;

    match cli.command {
        Command::Simulate(args) => simulate::run(args),
        Command::Mesoscopic(args) => mesoscopic::run(args),
        Command::Analyze(args) => analyze::run(args),
        Command::Sweep(args) => sweep::run(args),
    }
}
