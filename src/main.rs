// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the multipath signal synthesizer
use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use rust_multipath_synth::batch::BatchRunner;
use rust_multipath_synth::config::{output_config_schema, Config};
use std::path::PathBuf;

/// Multipath acoustic signal synthesizer
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (YAML), created with defaults if missing
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Channel response table (JSON), may be repeated
    #[arg(short, long = "env", value_name = "FILE")]
    environments: Vec<PathBuf>,

    /// Signal library (JSON), may be repeated
    #[arg(short, long = "signal", value_name = "FILE")]
    signals: Vec<PathBuf>,

    /// Directory of the generated WAV files
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Gain applied to every source component
    #[arg(long)]
    source_amplitude: Option<f64>,

    /// Seed of the segment selection generator
    #[arg(long)]
    seed: Option<u64>,

    /// Size of a dedicated worker pool
    #[arg(long)]
    threads: Option<usize>,

    /// Write a JSON report of the batch to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    show_config_schema: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    if args.show_config_schema {
        return output_config_schema();
    }

    // Must precede Config::from_file, which creates a missing config file
    if args.environments.is_empty() || args.signals.is_empty() {
        anyhow::bail!("At least one --env and one --signal document are required");
    }

    let mut config = Config::from_file(&args.config)?;
    config.apply_args(args.output_dir, args.source_amplitude, args.seed, args.threads);

    let mut runner = BatchRunner::new(config)?;
    let report = runner.run(&args.environments, &args.signals);

    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        info!("Batch report written to {:?}", path);
    }

    for failure in &report.failures {
        warn!("{}: {}", failure.document.display(), failure.error);
    }

    if report.outputs.is_empty() && !report.failures.is_empty() {
        anyhow::bail!(
            "No file was generated, {} documents failed",
            report.failures.len()
        );
    }
    Ok(())
}
