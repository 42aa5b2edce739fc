// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! The `sweep` subcommand: write one `culture simulate` command line per
//! point of a parameter product, for batch schedulers that consume a tsv of
//! commands.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Output command file
    #[arg(short = 'o', long = "output", default_value = "parameters.tsv")]
    pub output: PathBuf,

    /// Mini rates to scan, in Hz
    #[arg(
        long = "rates",
        value_delimiter = ',',
        default_values_t = [20.0, 25.0, 30.0, 35.0, 37.0, 38.0, 39.0, 40.0]
    )]
    pub rates: Vec<f64>,

    /// Coupling strengths to scan, in mV
    #[arg(
        long = "j-ampa",
        value_delimiter = ',',
        default_values_t = [15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0]
    )]
    pub j_ampa: Vec<f64>,

    /// Repetitions per parameter point
    #[arg(long = "repetitions", default_value_t = 3)]
    pub repetitions: usize,

    /// Seed of the first run; increments per line
    #[arg(short = 's', long = "seed", default_value_t = 25_000)]
    pub seed: u64,

    /// Simulated duration per run, in seconds
    #[arg(short = 'd', long = "duration", default_value_t = 3600.0)]
    pub duration: f64,

    /// Equilibration per run, in seconds
    #[arg(long = "equilibrate", default_value_t = 300.0)]
    pub equilibrate: f64,

    /// Directory the generated commands write their recordings to
    #[arg(long = "data-dir", default_value = "dat")]
    pub data_dir: PathBuf,
}

pub fn run(args: SweepArgs) -> Result<()> {
    let mut out = String::from("# commands to run culture dynamics\n");
    let mut seed = args.seed;
    let mut count = 0usize;

    for &rate in &args.rates {
        for &j_ampa in &args.j_ampa {
            for rep in 0..args.repetitions {
                let path = args.data_dir.join(format!(
                    "j_ampa={j_ampa:05.2}_rate={rate:05.2}_rep={rep:02}.json"
                ));
                writeln!(
                    out,
                    "culture simulate -o {} --seed {} --j-ampa {:.2} --rate {:.2} \
                     --duration {} --equilibrate {}",
                    path.display(),
                    seed,
                    j_ampa,
                    rate,
                    args.duration,
                    args.equilibrate,
                )?;
                seed += 1;
                count += 1;
            }
        }
    }

    fs::write(&args.output, out)
        .with_context(|| format!("writing command file {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        commands = count,
        "sweep file written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(output: PathBuf) -> SweepArgs {
        SweepArgs {
            output,
            rates: vec![35.0, 37.0],
            j_ampa: vec![30.0, 35.0, 40.0],
            repetitions: 2,
            seed: 100,
            duration: 600.0,
            equilibrate: 60.0,
            data_dir: PathBuf::from("dat"),
        }
    }

    #[test]
    fn sweep_writes_the_full_product() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parameters.tsv");
        run(args(path.clone())).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].starts_with('#'));
        // 2 rates x 3 couplings x 2 repetitions
        assert_eq!(lines.len() - 1, 12);
        assert!(lines[1].contains("--seed 100"));
        assert!(lines[12].contains("--seed 111"));
        assert!(lines[1].contains("j_ampa=30.00_rate=35.00_rep=00.json"));
    }

    #[test]
    fn seeds_are_unique_across_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parameters.tsv");
        run(args(path.clone())).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut seeds: Vec<&str> = contents
            .lines()
            .skip(1)
            .map(|l| l.split("--seed ").nth(1).unwrap().split(' ').next().unwrap())
            .collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 12);
    }
}
