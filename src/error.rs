// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types shared by the loader, the synthesis engine and the PCM encoder

use std::path::PathBuf;

/// Errors raised while loading inputs, synthesizing or encoding a signal.
///
/// Every variant is scoped to a single document or output file so that a
/// batch driver can report it and carry on with the rest of its work.
#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    /// A required field is absent, has the wrong shape or is not numeric
    #[error("Malformed input in {document}: {reason}")]
    MalformedInput { document: String, reason: String },

    /// The channel response table has no rows or no columns
    #[error("Channel response table in {document} is empty")]
    EmptyTable { document: String },

    /// The encoder was handed a zero-length buffer
    #[error("Cannot encode an empty signal")]
    EmptySignal,

    /// A synthesis parameter is outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),
}

impl SynthError {
    /// Shorthand for building a [`SynthError::MalformedInput`]
    pub fn malformed(document: impl Into<String>, reason: impl Into<String>) -> Self {
        SynthError::MalformedInput {
            document: document.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SynthError>;
