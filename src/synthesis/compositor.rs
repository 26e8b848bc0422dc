// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Segment compositor
//!
//! Assembles the received signal for one receiver depth: a random run of
//! source segments is rendered through the matching channel responses and
//! every contribution is placed at its arrival time in a shared buffer.
//!
//! Segments are rendered in parallel. Each worker fills a private buffer
//! drawn from an [`AccumulatorPool`] and merges it into the output under a
//! lock, one segment at a time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use log::{debug, trace, warn};
use rand::Rng;
use rayon::prelude::*;

use super::kernel::synthesize_paths;
use super::pool::AccumulatorPool;
use super::selection::SegmentWindow;
use crate::error::{Result, SynthError};
use crate::loader::{ChannelResponse, SignalLibrary};

/// Numeric knobs of the compositor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    /// Upper bound on the number of consecutive segments rendered per run
    pub max_segments: usize,
    /// Absolute tolerance in Hz when pairing source and channel frequencies
    pub frequency_tolerance: f64,
    /// Extra output duration in seconds after the last nominal arrival
    pub tail_padding: f64,
    /// Place segments relative to the first rendered segment instead of
    /// segment 0 of the library
    pub anchor_to_window: bool,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            max_segments: 16,
            frequency_tolerance: 1e-6,
            tail_padding: 0.01,
            anchor_to_window: false,
        }
    }
}

impl SynthesisParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_segments == 0 {
            return Err(SynthError::InvalidParameter(
                "max_segments must be at least 1".to_string(),
            ));
        }
        if !(self.frequency_tolerance.is_finite() && self.frequency_tolerance >= 0.0) {
            return Err(SynthError::InvalidParameter(format!(
                "frequency_tolerance must be a non-negative number, got {}",
                self.frequency_tolerance
            )));
        }
        if !(self.tail_padding.is_finite() && self.tail_padding >= 0.0) {
            return Err(SynthError::InvalidParameter(format!(
                "tail_padding must be a non-negative number, got {}",
                self.tail_padding
            )));
        }
        Ok(())
    }
}

/// Output of one synthesis run
#[derive(Debug, Clone)]
pub struct SynthesizedSignal {
    pub samples: Vec<f64>,
    /// `time_axis[i] = i / fs`
    pub time_axis: Vec<f64>,
    /// Segments that were rendered
    pub window: SegmentWindow,
    /// Components paired with a channel response
    pub matched: usize,
    /// Matched contributions whose placement fell outside the buffer
    pub dropped: usize,
}

impl SynthesizedSignal {
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.samples, self.time_axis)
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0, |mx: f64, &s| mx.max(s.abs()))
    }
}

/// First response whose frequency lies within `tolerance` of `frequency`
pub fn match_response<'a>(
    column: &[&'a ChannelResponse],
    frequency: f64,
    tolerance: f64,
) -> Option<&'a ChannelResponse> {
    column
        .iter()
        .copied()
        .find(|response| (response.frequency() - frequency).abs() <= tolerance)
}

/// Earliest and latest arrival over every path of every response,
/// `(0, 0)` when no response has a path
pub fn delay_spread(column: &[&ChannelResponse]) -> (f64, f64) {
    column
        .iter()
        .filter_map(|response| Some((response.min_delay()?, response.max_delay()?)))
        .reduce(|(lo, hi), (min, max)| (lo.min(min), hi.max(max)))
        .unwrap_or((0.0, 0.0))
}

/// Geometry shared by every segment of a run
struct RunLayout<'a> {
    library: &'a SignalLibrary,
    column: &'a [&'a ChannelResponse],
    source_amplitude: f64,
    min_delay: f64,
    /// Nominal arrival subtracted from every segment's spacing
    origin: f64,
    output_len: usize,
    time_base: Vec<f64>,
}

/// Renders segment runs through a channel column
pub struct Synthesizer {
    params: SynthesisParams,
    pool: AccumulatorPool,
    workers: Option<rayon::ThreadPool>,
}

impl Synthesizer {
    /// Create a synthesizer running on rayon's global worker pool
    pub fn new(params: SynthesisParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            pool: AccumulatorPool::new(rayon::current_num_threads()),
            workers: None,
        })
    }

    /// Create a synthesizer with a dedicated pool of `threads` workers
    pub fn with_threads(params: SynthesisParams, threads: usize) -> Result<Self> {
        params.validate()?;
        if threads == 0 {
            return Err(SynthError::InvalidParameter(
                "worker count must be at least 1".to_string(),
            ));
        }
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("synth-worker-{i}"))
            .build()
            .map_err(|e| SynthError::InvalidParameter(format!("cannot start worker pool: {e}")))?;
        Ok(Self {
            params,
            pool: AccumulatorPool::new(threads),
            workers: Some(workers),
        })
    }

    pub fn params(&self) -> &SynthesisParams {
        &self.params
    }

    /// Synthesize the received signal for a random run of segments.
    ///
    /// The run start is the only value drawn from `rng`.
    pub fn generate<R: Rng>(
        &self,
        library: &SignalLibrary,
        column: &[&ChannelResponse],
        source_amplitude: f64,
        rng: &mut R,
    ) -> Result<SynthesizedSignal> {
        let window = SegmentWindow::choose(library.segment_count(), self.params.max_segments, rng);
        self.generate_window(library, column, source_amplitude, window)
    }

    /// Synthesize the received signal for an explicit run of segments
    pub fn generate_window(
        &self,
        library: &SignalLibrary,
        column: &[&ChannelResponse],
        source_amplitude: f64,
        window: SegmentWindow,
    ) -> Result<SynthesizedSignal> {
        if window.start + window.len > library.segment_count() {
            return Err(SynthError::InvalidParameter(format!(
                "segments {:?} out of range for a library of {}",
                window.indices(),
                library.segment_count()
            )));
        }
        if !source_amplitude.is_finite() {
            return Err(SynthError::InvalidParameter(format!(
                "source amplitude must be finite, got {source_amplitude}"
            )));
        }

        let fs = library.sample_rate();
        let (min_delay, max_delay) = delay_spread(column);
        let span = max_delay - min_delay + window.len as f64 + self.params.tail_padding;
        let output_len = (span * fs).ceil().max(0.0) as usize;
        let window_len = library.window_len();
        if window_len == 0 && window.len > 0 {
            warn!("Segment window of the signal library is empty, output will be silent");
        }
        debug!(
            "Rendering segments {:?}: delay spread [{min_delay}, {max_delay}] s, {output_len} output samples, {window_len} samples per segment",
            window.indices()
        );

        let layout = RunLayout {
            library,
            column,
            source_amplitude,
            min_delay,
            origin: match library.segment_spacing().get(window.start) {
                Some(&first) if self.params.anchor_to_window => first,
                _ => 0.0,
            },
            output_len,
            time_base: (0..window_len).map(|i| i as f64 / fs).collect(),
        };

        let output = Mutex::new(vec![0.0; output_len]);
        let matched = AtomicUsize::new(0);
        let dropped = AtomicUsize::new(0);

        let render = || {
            window.indices().into_par_iter().for_each(|segment| {
                let mut local = self.pool.acquire(output_len);
                let (m, d) = self.render_segment(&layout, segment, &mut local);
                matched.fetch_add(m, Ordering::Relaxed);
                dropped.fetch_add(d, Ordering::Relaxed);

                {
                    let mut shared = output.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    for (out, sample) in shared.iter_mut().zip(&local) {
                        *out += sample;
                    }
                }
                self.pool.release(local);
            });
        };
        match &self.workers {
            Some(workers) => workers.install(render),
            None => render(),
        }

        let samples = output.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        let dropped = dropped.into_inner();
        if dropped > 0 {
            debug!("{dropped} contributions fell outside the output buffer and were skipped");
        }

        Ok(SynthesizedSignal {
            samples,
            time_axis: (0..output_len).map(|i| i as f64 / fs).collect(),
            window,
            matched: matched.into_inner(),
            dropped,
        })
    }

    /// Accumulate every component of one segment into `local`.
    /// Returns the number of matched and dropped contributions.
    fn render_segment(&self, layout: &RunLayout<'_>, segment: usize, local: &mut [f64]) -> (usize, usize) {
        let library = layout.library;
        let fs = library.sample_rate();
        let window_len = layout.time_base.len();
        let spacing = library.segment_spacing()[segment] - layout.origin;
        let mut matched = 0;
        let mut dropped = 0;

        for component in library.segments()[segment].components() {
            let Some(response) = match_response(
                layout.column,
                component.frequency,
                self.params.frequency_tolerance,
            ) else {
                continue;
            };
            matched += 1;

            // A response without arrivals carries no energy
            let Some(first_arrival) = response.min_delay() else {
                continue;
            };

            let begin = ((first_arrival - layout.min_delay + spacing) * fs).floor();
            if begin < 0.0 || begin + window_len as f64 > layout.output_len as f64 {
                trace!(
                    "Segment {segment} at {} Hz placed at sample {begin}, outside [0, {})",
                    component.frequency,
                    layout.output_len
                );
                dropped += 1;
                continue;
            }
            let begin = begin as usize;

            let contribution = synthesize_paths(
                component.frequency,
                fs,
                &layout.time_base,
                layout.source_amplitude * component.amplitude,
                component.phase,
                response,
            );
            for (out, sample) in local[begin..begin + window_len].iter_mut().zip(&contribution) {
                *out += sample;
            }
        }

        (matched, dropped)
    }
}

/// Synthesize with default parameters on the global worker pool.
///
/// Returns the received signal and its time axis.
pub fn generate<R: Rng>(
    library: &SignalLibrary,
    column: &[&ChannelResponse],
    source_amplitude: f64,
    rng: &mut R,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let synthesizer = Synthesizer::new(SynthesisParams::default())?;
    Ok(synthesizer
        .generate(library, column, source_amplitude, rng)?
        .into_parts())
}
