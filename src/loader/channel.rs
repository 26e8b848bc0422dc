// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Channel responses computed by the propagation model
//!
//! The environment document is a JSON array of rows (one per source segment
//! slot); each row is an array of response objects (one per receiver depth):
//!
//! ```json
//! [[{"Amp": [1.0, 0.5], "Delay": [0.0, 0.001], "phase": [0.0, 3.14], "freq": 100.0}]]
//! ```

use std::path::Path;

use log::debug;
use serde_json::Value;

use super::fields;
use crate::error::{Result, SynthError};

/// One propagation arrival of a channel response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathArrival {
    pub amplitude: f64,
    /// Arrival time in seconds
    pub delay: f64,
    /// Phase shift in radians
    pub phase: f64,
}

/// Multipath response of the channel at a single frequency.
///
/// Amplitudes, delays and phases are index-aligned, one entry per path.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelResponse {
    frequency: f64,
    amplitudes: Vec<f64>,
    delays: Vec<f64>,
    phases: Vec<f64>,
}

impl ChannelResponse {
    /// Build a response, checking that the three path sequences line up
    pub fn new(frequency: f64, amplitudes: Vec<f64>, delays: Vec<f64>, phases: Vec<f64>) -> Result<Self> {
        if amplitudes.len() != delays.len() || amplitudes.len() != phases.len() {
            return Err(SynthError::InvalidParameter(format!(
                "path sequences differ in length (Amp={}, Delay={}, phase={})",
                amplitudes.len(),
                delays.len(),
                phases.len()
            )));
        }
        Ok(Self {
            frequency,
            amplitudes,
            delays,
            phases,
        })
    }

    /// A response with no arrivals
    pub fn empty(frequency: f64) -> Self {
        Self {
            frequency,
            amplitudes: Vec::new(),
            delays: Vec::new(),
            phases: Vec::new(),
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    pub fn phases(&self) -> &[f64] {
        &self.phases
    }

    pub fn path_count(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Iterate over the arrivals
    pub fn paths(&self) -> impl Iterator<Item = PathArrival> + '_ {
        self.amplitudes
            .iter()
            .zip(&self.delays)
            .zip(&self.phases)
            .map(|((&amplitude, &delay), &phase)| PathArrival {
                amplitude,
                delay,
                phase,
            })
    }

    /// Earliest arrival, `None` when there are no paths
    pub fn min_delay(&self) -> Option<f64> {
        self.delays.iter().copied().reduce(f64::min)
    }

    /// Latest arrival, `None` when there are no paths
    pub fn max_delay(&self) -> Option<f64> {
        self.delays.iter().copied().reduce(f64::max)
    }

    fn from_value(document: &str, value: &Value, context: &str) -> Result<Self> {
        let amplitudes = fields::numeric_sequence(
            document,
            fields::optional(document, value, "Amp", context)?,
            &format!("{context}.Amp"),
        )?;
        let delays = fields::numeric_sequence(
            document,
            fields::optional(document, value, "Delay", context)?,
            &format!("{context}.Delay"),
        )?;
        let phases = fields::numeric_sequence(
            document,
            fields::optional(document, value, "phase", context)?,
            &format!("{context}.phase"),
        )?;
        let frequency = fields::scalar(
            document,
            fields::required(document, value, "freq", context)?,
            &format!("{context}.freq"),
        )?;

        Self::new(frequency, amplitudes, delays, phases)
            .map_err(|e| SynthError::malformed(document, format!("{context}: {e}")))
    }
}

/// Rectangular table of channel responses indexed by `[segment slot][depth slot]`
#[derive(Debug, Clone)]
pub struct ChannelResponseTable {
    rows: Vec<Vec<ChannelResponse>>,
}

impl ChannelResponseTable {
    /// Build a table from rows, rejecting empty or ragged input
    pub fn new(document: &str, rows: Vec<Vec<ChannelResponse>>) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if columns == 0 {
            return Err(SynthError::EmptyTable {
                document: document.to_string(),
            });
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != columns) {
            return Err(SynthError::malformed(
                document,
                format!("row {index} has {} columns, expected {columns}", row.len()),
            ));
        }
        Ok(Self { rows })
    }

    /// Load the table from an environment JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading channel responses from {:?}", path);
        let contents = std::fs::read_to_string(path).map_err(|source| SynthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&path.display().to_string(), &contents)
    }

    /// Parse the table from JSON text; `document` names it in error messages
    pub fn from_json_str(document: &str, contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| SynthError::malformed(document, format!("invalid JSON: {e}")))?;
        Self::from_value(document, &value)
    }

    pub fn from_value(document: &str, value: &Value) -> Result<Self> {
        let rows = value
            .as_array()
            .ok_or_else(|| SynthError::malformed(document, "expected an array of rows"))?;

        let mut table = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            let cells = row
                .as_array()
                .ok_or_else(|| SynthError::malformed(document, format!("row {r} is not an array")))?;
            let responses = cells
                .iter()
                .enumerate()
                .map(|(c, cell)| ChannelResponse::from_value(document, cell, &format!("[{r}][{c}]")))
                .collect::<Result<Vec<_>>>()?;
            table.push(responses);
        }

        let table = Self::new(document, table)?;
        debug!(
            "Loaded {} x {} channel responses from {}",
            table.row_count(),
            table.column_count(),
            document
        );
        Ok(table)
    }

    pub fn rows(&self) -> &[Vec<ChannelResponse>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Responses of one receiver depth slot, one per row
    pub fn column(&self, index: usize) -> Option<Vec<&ChannelResponse>> {
        if index >= self.column_count() {
            return None;
        }
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}
