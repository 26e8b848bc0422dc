// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # PCM encoder
//!
//! Normalizes a synthesized buffer to the 16-bit signed range and writes it
//! as an uncompressed mono WAV container (44-byte header followed by
//! little-endian samples).
//!
//! The peak magnitude of the buffer is mapped to 32767; peaks below `1e-6`
//! are treated as `1e-6` so that near-silent buffers do not blow up.
//!
//! ## Examples
//!
//! ```rust
//! use rust_multipath_synth::encoder;
//!
//! let samples = vec![0.0, 0.5, -1.0, 0.25];
//! let bytes = encoder::encode(&samples, 8000).unwrap();
//! assert_eq!(bytes.len(), 44 + 2 * samples.len());
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use log::debug;

use crate::error::{Result, SynthError};

/// Smallest peak used for normalization
pub const MIN_PEAK: f64 = 1e-6;

/// Quantized samples together with the gain that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Quantized {
    pub pcm: Vec<i16>,
    /// Multiplier applied before rounding, `32767 / peak`
    pub scale: f64,
}

impl Quantized {
    /// Map the integer samples back to the original amplitude range
    pub fn dequantize(&self) -> Vec<f64> {
        self.pcm.iter().map(|&s| s as f64 / self.scale).collect()
    }
}

/// Scale a buffer so its peak maps to full scale and round to `i16`
pub fn quantize(samples: &[f64]) -> Result<Quantized> {
    if samples.is_empty() {
        return Err(SynthError::EmptySignal);
    }
    let peak = samples.iter().fold(0.0f64, |mx, &s| mx.max(s.abs()));
    let scale = i16::MAX as f64 / peak.max(MIN_PEAK);
    let pcm = samples
        .iter()
        .map(|&s| (s * scale).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16)
        .collect();
    Ok(Quantized { pcm, scale })
}

/// Container specification for 16-bit mono PCM
pub fn wav_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Encode a buffer as an in-memory WAV file
pub fn encode(samples: &[f64], sample_rate: u32) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(44 + 2 * samples.len()));
    write_to(&mut cursor, samples, sample_rate)?;
    Ok(cursor.into_inner())
}

/// Encode a buffer and write it to `path`, creating parent directories
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f64], sample_rate: u32) -> Result<()> {
    let path = path.as_ref();
    if samples.is_empty() {
        return Err(SynthError::EmptySignal);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| SynthError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let file = File::create(path).map_err(|source| SynthError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_to(BufWriter::new(file), samples, sample_rate)?;
    debug!("Wrote {} samples at {} Hz to {:?}", samples.len(), sample_rate, path);
    Ok(())
}

fn write_to<W: Write + Seek>(sink: W, samples: &[f64], sample_rate: u32) -> Result<()> {
    let quantized = quantize(samples)?;
    let mut writer = WavWriter::new(sink, wav_spec(sample_rate))?;
    for &sample in &quantized.pcm {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
