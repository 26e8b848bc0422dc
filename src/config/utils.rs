// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::Config;

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./rust_multipath_synth --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema_str = include_str!("../../resources/config.schema.json");

    let schema: serde_json::Value =
        serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **Source amplitude**: must be a finite, strictly positive number
/// - **Matching tolerance / tail padding**: must be finite and non-negative
/// - **Segment run**: `max_segments` must be at least 1
/// - **Workers**: `threads`, when set, must be at least 1
/// - **Receiver depths**: every label must be finite
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");
    let synthesis = &config.synthesis;

    if !(synthesis.source_amplitude.is_finite() && synthesis.source_amplitude > 0.0) {
        anyhow::bail!(
            "Invalid source amplitude: {}",
            synthesis.source_amplitude
        );
    }

    synthesis
        .params()
        .validate()
        .context("Invalid synthesis parameters")?;

    if synthesis.threads == Some(0) {
        anyhow::bail!("Invalid worker count: 0");
    }

    if let Some(depths) = &config.output.receiver_depths {
        if let Some(depth) = depths.iter().find(|d| !d.is_finite()) {
            anyhow::bail!("Invalid receiver depth: {}", depth);
        }
    }

    Ok(())
}
