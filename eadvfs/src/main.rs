/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use eadvfs::config::SimulatorConfig;
use eadvfs::policy::Governor;
use eadvfs::report::Report;
use eadvfs::workload::{load_workload, sample_workload};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Energy-aware DVFS scheduling simulator.
///
/// Example:
///   eadvfs traces/jobs.txt -c sim.yaml -g powersave
#[derive(Debug, Parser)]
#[command(
    name = "eadvfs",
    about = "Energy-aware DVFS scheduling simulator",
    long_about = None,
)]
struct Cli {
    /// Workload file: one "arrival_ms burst_ms" pair per line.
    /// The built-in sample jobset is used when omitted.
    workload: Option<PathBuf>,

    /// Path to the YAML simulator configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Frequency governor (eadvfs, performance, powersave).
    /// Overrides the configuration file.
    #[arg(short = 'g', long = "governor")]
    governor: Option<Governor>,

    /// Stop the simulation once the clock passes this many ms.
    #[arg(long = "horizon-ms", conflicts_with = "no_horizon")]
    horizon_ms: Option<f64>,

    /// Disable the horizon safety valve.
    #[arg(long = "no-horizon", default_value_t = false)]
    no_horizon: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    // Logs go to stderr so the report on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        workload = ?cli.workload,
        config   = ?cli.config,
        governor = ?cli.governor,
        horizon_ms = ?cli.horizon_ms,
        no_horizon = cli.no_horizon,
        "Configuration"
    );

    // ── Load simulator configuration ──────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => match SimulatorConfig::load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Failed to load simulator configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => SimulatorConfig::default(),
    };

    if let Some(governor) = cli.governor {
        config.governor = governor;
    }
    if let Some(h) = cli.horizon_ms {
        config.engine.horizon_ms = Some(h);
    }
    if cli.no_horizon {
        config.engine.horizon_ms = None;
    }

    // ── Load workload ─────────────────────────────────────────────────────────
    let jobs = match &cli.workload {
        Some(path) => match load_workload(path) {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Failed to load workload: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No workload file given, using the sample jobset");
            sample_workload()
        }
    };

    // ── Run ───────────────────────────────────────────────────────────────────
    let engine = match config.build_engine() {
        Ok(engine) => engine,
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    };

    let sim = match engine.run(&jobs) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Simulation rejected the workload: {:#}", e);
            process::exit(1);
        }
    };

    print!("{}", Report::from_run(&engine, &sim));
}
