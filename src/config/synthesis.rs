// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Synthesis configuration
//!
//! This module defines the parameters controlling how received signals are
//! rendered from a signal library and a channel response table.

use serde::{Deserialize, Serialize};

use crate::synthesis::SynthesisParams;

/// Configuration of the multipath synthesis engine.
///
/// # Parameters
///
/// * `source_amplitude` - Gain applied to every source component
/// * `max_segments` - Number of consecutive segments rendered per output file
/// * `frequency_tolerance` - Absolute tolerance (Hz) when pairing a source
///   component with a channel response
/// * `tail_padding` - Seconds of extra output after the last nominal arrival
/// * `anchor_to_window` - Measure segment placement from the first rendered
///   segment rather than from segment 0 of the library
/// * `seed` - Seed of the segment selection generator; when absent each run
///   draws from operating system entropy
/// * `threads` - Size of a dedicated worker pool; when absent the global
///   rayon pool is used
///
/// # Example
///
/// ```
/// use rust_multipath_synth::config::SynthesisConfig;
///
/// let config = SynthesisConfig {
///     seed: Some(42),
///     threads: Some(4),
///     ..SynthesisConfig::default()
/// };
/// assert_eq!(config.params().max_segments, 16);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_source_amplitude")]
    pub source_amplitude: f64,

    #[serde(default = "default_max_segments")]
    pub max_segments: usize,

    #[serde(default = "default_frequency_tolerance")]
    pub frequency_tolerance: f64,

    #[serde(default = "default_tail_padding")]
    pub tail_padding: f64,

    #[serde(default)]
    pub anchor_to_window: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

fn default_source_amplitude() -> f64 {
    1e5
}

fn default_max_segments() -> usize {
    16
}

fn default_frequency_tolerance() -> f64 {
    1e-6 // Hz
}

fn default_tail_padding() -> f64 {
    0.01 // seconds
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            source_amplitude: default_source_amplitude(),
            max_segments: default_max_segments(),
            frequency_tolerance: default_frequency_tolerance(),
            tail_padding: default_tail_padding(),
            anchor_to_window: false,
            seed: None,
            threads: None,
        }
    }
}

impl SynthesisConfig {
    /// Numeric parameters handed to the compositor
    pub fn params(&self) -> SynthesisParams {
        SynthesisParams {
            max_segments: self.max_segments,
            frequency_tolerance: self.frequency_tolerance,
            tail_padding: self.tail_padding,
            anchor_to_window: self.anchor_to_window,
        }
    }
}
