#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Harbor Defence scenarios headlessly.

mod scenario;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use harbor_defence_rendering::AssetRegistry;

use crate::{scenario::Scenario, simulation::Simulation};

/// Runs a scenario without a window and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "harbor-defence", about = "Headless Harbor Defence simulation")]
struct CliArgs {
    /// Scenario file describing the playfield, waves and turret.
    #[arg(long, default_value = "scenarios/default.toml")]
    scenario: PathBuf,
    /// Overrides the number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u32>,
    /// Overrides the tick length in milliseconds.
    #[arg(long)]
    dt_ms: Option<u64>,
    /// Overrides the spawner seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Asset manifest every rendered frame must resolve against.
    #[arg(long)]
    manifest: Option<PathBuf>,
}

/// Entry point for the Harbor Defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();

    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(ticks) = args.ticks {
        scenario.ticks = ticks;
    }
    if let Some(dt_ms) = args.dt_ms {
        scenario.dt = Duration::from_millis(dt_ms);
    }
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }

    let assets = args
        .manifest
        .map(AssetRegistry::from_manifest_path)
        .transpose()
        .context("failed to load asset manifest")?;

    let report = Simulation::new(&scenario).run(scenario.ticks, assets.as_ref())?;
    println!("{report}");
    Ok(())
}
