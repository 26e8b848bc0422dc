// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust multipath acoustic signal synthesizer
//!
//! This library renders what a receiver hears when a multi-tone source is
//! propagated through a multipath channel. Each source component is replayed
//! once per propagation path, delayed, scaled and phase shifted, and the
//! contributions of a run of consecutive segments are summed into a single
//! normalized 16-bit WAV file.
//!
//! - [`loader`]: channel response tables and signal libraries (JSON)
//! - [`synthesis`]: path superposition kernel and segment compositor
//! - [`encoder`]: peak normalization and WAV encoding
//! - [`batch`]: environment x signal batch processing
//! - [`config`]: YAML configuration validated against a JSON schema

pub mod batch;
pub mod config;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod synthesis;

pub use error::{Result, SynthError};
