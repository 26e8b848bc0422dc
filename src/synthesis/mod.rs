// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//!
//! Multipath synthesis module
//!
//! This module turns a signal library and a column of channel responses
//! into a received time-domain signal. It is purely numeric: inputs come
//! from [`crate::loader`] and the result goes to [`crate::encoder`].

pub mod compositor;
pub mod kernel;
pub mod pool;
pub mod selection;
#[cfg(test)]
mod kernel_test;

pub use compositor::{
    delay_spread, generate, match_response, SynthesisParams, SynthesizedSignal, Synthesizer,
};
pub use kernel::synthesize_paths;
pub use pool::AccumulatorPool;
pub use selection::SegmentWindow;
