// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Output configuration

use serde::{Deserialize, Serialize};

/// Where synthesized WAV files go and how they are labelled.
///
/// * `directory` - Destination of every file. When absent, files are written
///   to a `NewSig` directory next to the environment document they come from.
/// * `receiver_depths` - Depth label of each channel table column, used in
///   file names. When absent the labels are inferred from the column count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_depths: Option<Vec<f64>>,
}
