// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Print the effective configuration after validation
use anyhow::Result;
use rust_multipath_synth::config::Config;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));

    println!("Testing file: {:?}", path);
    println!("File exists: {}", path.exists());

    match Config::from_file(&path) {
        Ok(config) => {
            println!("Validation succeeded");
            print!("{}", serde_yml::to_string(&config)?);
            println!("Synthesis parameters: {:?}", config.synthesis.params());
        }
        Err(e) => println!("Validation failed: {:#}", e),
    }

    Ok(())
}
