// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Analytic source signal library
//!
//! A source recording is cut into fixed-duration segments, each described
//! as a sum of sinusoids. The JSON document looks like:
//!
//! ```json
//! {
//!   "fs": 1000,
//!   "Ndelay": [0, 1],
//!   "Analy_freq": [100],
//!   "Analyrecord": [{"Amp": [1.0], "freq": [100.0], "phase": [0.0]}]
//! }
//! ```

use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use super::fields;
use crate::error::{Result, SynthError};

/// One sinusoid of a segment's analytic decomposition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceComponent {
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
}

/// One fixed-duration slice of the source signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    components: Vec<SourceComponent>,
}

impl Segment {
    pub fn new(components: Vec<SourceComponent>) -> Self {
        Self { components }
    }

    /// Build a segment from index-aligned amplitude, frequency and phase sequences
    pub fn from_parallel(amplitudes: &[f64], frequencies: &[f64], phases: &[f64]) -> Result<Self> {
        if amplitudes.len() != frequencies.len() || amplitudes.len() != phases.len() {
            return Err(SynthError::InvalidParameter(format!(
                "component sequences differ in length (Amp={}, freq={}, phase={})",
                amplitudes.len(),
                frequencies.len(),
                phases.len()
            )));
        }
        let components = amplitudes
            .iter()
            .zip(frequencies)
            .zip(phases)
            .map(|((&amplitude, &frequency), &phase)| SourceComponent {
                frequency,
                amplitude,
                phase,
            })
            .collect();
        Ok(Self { components })
    }

    pub fn components(&self) -> &[SourceComponent] {
        &self.components
    }
}

/// Segments of one source recording together with their timing
#[derive(Debug, Clone)]
pub struct SignalLibrary {
    sample_rate: f64,
    segment_spacing: Vec<f64>,
    segments: Vec<Segment>,
    analysis_frequencies: Vec<f64>,
}

impl SignalLibrary {
    /// Build a library, validating the timing invariants
    ///
    /// `segment_spacing[k]` is the nominal arrival of segment `k` relative to
    /// segment 0; it must be non-decreasing and cover every segment.
    pub fn new(
        sample_rate: f64,
        segment_spacing: Vec<f64>,
        segments: Vec<Segment>,
        analysis_frequencies: Vec<f64>,
    ) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SynthError::InvalidParameter(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if let Some(k) = segment_spacing.windows(2).position(|w| w[1] < w[0]) {
            return Err(SynthError::InvalidParameter(format!(
                "segment spacing decreases between entries {k} and {}",
                k + 1
            )));
        }
        if segment_spacing.len() < segments.len() {
            return Err(SynthError::InvalidParameter(format!(
                "{} segments but only {} spacing entries",
                segments.len(),
                segment_spacing.len()
            )));
        }
        Ok(Self {
            sample_rate,
            segment_spacing,
            segments,
            analysis_frequencies,
        })
    }

    /// Load a library from a signal JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading signal library from {:?}", path);
        let contents = std::fs::read_to_string(path).map_err(|source| SynthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&path.display().to_string(), &contents)
    }

    /// Parse a library from JSON text; `document` names it in error messages
    pub fn from_json_str(document: &str, contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| SynthError::malformed(document, format!("invalid JSON: {e}")))?;
        Self::from_value(document, &value)
    }

    pub fn from_value(document: &str, value: &Value) -> Result<Self> {
        let root = "signal";
        let sample_rate = fields::scalar(document, fields::required(document, value, "fs", root)?, "fs")?;
        let segment_spacing = fields::numeric_sequence(
            document,
            Some(fields::required(document, value, "Ndelay", root)?),
            "Ndelay",
        )?;
        let analysis_frequencies = fields::numeric_sequence(
            document,
            Some(fields::required(document, value, "Analy_freq", root)?),
            "Analy_freq",
        )?;

        let records = fields::required(document, value, "Analyrecord", root)?;
        let records: Vec<&Value> = match records {
            Value::Array(items) => items.iter().collect(),
            // A single segment may be serialized as a bare object
            Value::Object(_) => vec![records],
            _ => {
                return Err(SynthError::malformed(
                    document,
                    "Analyrecord: expected an array of segment objects",
                ))
            }
        };

        let mut segments = Vec::with_capacity(records.len());
        for (k, record) in records.into_iter().enumerate() {
            let context = format!("Analyrecord[{k}]");
            let sequence = |key: &str| -> Result<Vec<f64>> {
                fields::numeric_sequence(
                    document,
                    Some(fields::required(document, record, key, &context)?),
                    &format!("{context}.{key}"),
                )
            };
            let amplitudes = sequence("Amp")?;
            let frequencies = sequence("freq")?;
            let phases = sequence("phase")?;
            let segment = Segment::from_parallel(&amplitudes, &frequencies, &phases)
                .map_err(|e| SynthError::malformed(document, format!("{context}: {e}")))?;
            segments.push(segment);
        }

        let library = Self::new(sample_rate, segment_spacing, segments, analysis_frequencies)
            .map_err(|e| SynthError::malformed(document, e.to_string()))?;

        if library.segments.is_empty() {
            warn!("Signal library {} contains no segments", document);
        }
        debug!(
            "Loaded {} segments at {} Hz from {}",
            library.segments.len(),
            library.sample_rate,
            document
        );
        Ok(library)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Sample rate as written to the PCM container, fractional part dropped
    pub fn pcm_sample_rate(&self) -> u32 {
        self.sample_rate.trunc().clamp(1.0, u32::MAX as f64) as u32
    }

    pub fn segment_spacing(&self) -> &[f64] {
        &self.segment_spacing
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn analysis_frequencies(&self) -> &[f64] {
        &self.analysis_frequencies
    }

    /// Duration of one segment window, `Ndelay[1] - Ndelay[0]`, or zero
    pub fn window_duration(&self) -> f64 {
        match self.segment_spacing.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// Number of samples in one segment window
    pub fn window_len(&self) -> usize {
        (self.window_duration() * self.sample_rate).round().max(0.0) as usize
    }
}
