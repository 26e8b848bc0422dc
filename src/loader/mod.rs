// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Input loading module
//!
//! This module parses the two documents the synthesizer consumes: the
//! channel response table produced by the propagation model and the
//! analytic signal library of a source recording. Both are returned as
//! read-only structures shared by every synthesis run.

pub mod channel;
mod fields;
pub mod signal;

pub use channel::{ChannelResponse, ChannelResponseTable, PathArrival};
pub use signal::{Segment, SignalLibrary, SourceComponent};

use std::path::Path;

use crate::error::Result;

/// Load an environment's channel response table
pub fn load_channel_table<P: AsRef<Path>>(path: P) -> Result<ChannelResponseTable> {
    ChannelResponseTable::from_file(path)
}

/// Load a source signal library
pub fn load_signal_library<P: AsRef<Path>>(path: P) -> Result<SignalLibrary> {
    SignalLibrary::from_file(path)
}
