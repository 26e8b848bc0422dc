// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Path superposition kernel
//!
//! Renders one source sinusoid through every arrival of a channel response.
//! Path `p` contributes a copy of the tone scaled by its amplitude, shifted
//! by its phase, and delayed by `floor((delay[p] - min_delay) * fs)` samples
//! relative to the earliest arrival. Samples pushed past the end of the
//! window are dropped.
//!
//! The output is split into disjoint index ranges processed in parallel;
//! each range sums the overlap of every path with it, so no two workers
//! ever write the same sample.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::loader::ChannelResponse;

/// Samples per parallel work item
const CHUNK_LEN: usize = 4096;

/// Render `amplitude * a[p] * cos(2π f t + phase + φ[p])` for every path
/// of `response`, each path offset by its relative delay.
///
/// # Arguments
///
/// * `frequency` - Tone frequency in Hz
/// * `sample_rate` - Sampling rate in Hz
/// * `time_base` - Sample instants of the window, `N` entries
/// * `amplitude` - Source amplitude of the tone
/// * `phase` - Source phase of the tone in radians
/// * `response` - Channel response at `frequency`
///
/// # Returns
///
/// A buffer of `N` samples; all zeros when the response has no paths
pub fn synthesize_paths(
    frequency: f64,
    sample_rate: f64,
    time_base: &[f64],
    amplitude: f64,
    phase: f64,
    response: &ChannelResponse,
) -> Vec<f64> {
    let n = time_base.len();
    let mut y = vec![0.0; n];
    if response.is_empty() || n == 0 {
        return y;
    }

    let min_delay = response.min_delay().unwrap_or(0.0);
    let omega = 2.0 * PI * frequency;
    let paths: Vec<(usize, f64, f64)> = response
        .paths()
        .map(|path| {
            let offset = ((path.delay - min_delay) * sample_rate).floor();
            // Offsets beyond the window never land in it
            let offset = if offset.is_finite() && offset < n as f64 {
                offset.max(0.0) as usize
            } else {
                n
            };
            (offset, amplitude * path.amplitude, phase + path.phase)
        })
        .filter(|&(offset, _, _)| offset < n)
        .collect();

    y.par_chunks_mut(CHUNK_LEN)
        .enumerate()
        .for_each(|(chunk_index, chunk)| {
            let lo = chunk_index * CHUNK_LEN;
            let hi = lo + chunk.len();
            for &(offset, gain, path_phase) in &paths {
                // Output index j = offset + i must fall in [lo, hi)
                let start = lo.max(offset);
                if start >= hi {
                    continue;
                }
                for j in start..hi {
                    let t = time_base[j - offset];
                    chunk[j - lo] += gain * (omega * t + path_phase).cos();
                }
            }
        });

    y
}
