// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Batch synthesis
//!
//! Drives the synthesizer over a set of environment documents and signal
//! libraries: every receiver depth column of every environment is combined
//! with every signal library, and each combination produces one WAV file
//! named `<signal>_Rd_<depth>.wav`.
//!
//! A failing document or output file never stops the batch. The failure is
//! logged, recorded in the [`BatchReport`] and the remaining work goes on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::encoder;
use crate::loader::{ChannelResponseTable, SignalLibrary};
use crate::synthesis::Synthesizer;

/// Directory created next to an environment document when no output
/// directory is configured
pub const DEFAULT_OUTPUT_SUBDIR: &str = "NewSig";

/// One WAV file written by the batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    pub path: PathBuf,
    pub environment: PathBuf,
    pub signal: PathBuf,
    pub receiver_depth: f64,
    pub samples: usize,
    pub start_segment: usize,
    pub segment_count: usize,
    /// Peak magnitude before normalization
    pub peak: f64,
    /// Contributions skipped because they fell outside the buffer
    pub dropped: usize,
}

/// A document or output file that could not be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub document: PathBuf,
    pub error: String,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub seed: Option<u64>,
    pub outputs: Vec<OutputRecord>,
    pub failures: Vec<FailureRecord>,
}

impl BatchReport {
    fn new(seed: Option<u64>) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            seed,
            outputs: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, document: &Path, err: &anyhow::Error) {
        error!("Failed to process {}: {:#}", document.display(), err);
        self.failures.push(FailureRecord {
            document: document.to_path_buf(),
            error: format!("{:#}", err),
        });
    }

    /// Save the report as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize batch report")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write batch report to {:?}", path.as_ref()))
    }
}

/// Depth label of each channel table column.
///
/// An explicit list must have exactly one entry per column. Without one,
/// three columns are labelled `10, 20, 30` m, four columns `25, 50, 100, 300` m
/// and any other layout falls back to the column index.
pub fn depth_labels(columns: usize, configured: Option<&[f64]>) -> Result<Vec<f64>> {
    match configured {
        Some(depths) if depths.len() == columns => Ok(depths.to_vec()),
        Some(depths) => anyhow::bail!(
            "{} receiver depths configured but the table has {} columns",
            depths.len(),
            columns
        ),
        None => Ok(match columns {
            3 => vec![10.0, 20.0, 30.0],
            4 => vec![25.0, 50.0, 100.0, 300.0],
            n => (0..n).map(|m| m as f64).collect(),
        }),
    }
}

/// Name of the WAV file for a signal library at a receiver depth
pub fn output_file_name(signal_stem: &str, depth: f64) -> String {
    if depth.fract() == 0.0 {
        format!("{}_Rd_{}.wav", signal_stem, depth as i64)
    } else {
        format!("{}_Rd_{}.wav", signal_stem, depth)
    }
}

fn signal_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "signal".to_string())
}

struct LoadedSignal {
    path: PathBuf,
    stem: String,
    library: SignalLibrary,
}

/// Runs the synthesizer over environments and signal libraries
pub struct BatchRunner {
    config: Config,
    synthesizer: Synthesizer,
    rng: StdRng,
}

impl BatchRunner {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let params = config.synthesis.params();
        let synthesizer = match config.synthesis.threads {
            Some(threads) => Synthesizer::with_threads(params, threads),
            None => Synthesizer::new(params),
        }
        .context("Failed to set up the synthesizer")?;
        let rng = match config.synthesis.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            synthesizer,
            rng,
        })
    }

    /// Synthesize every (environment column, signal library) pair
    pub fn run<E, S>(&mut self, environments: &[E], signals: &[S]) -> BatchReport
    where
        E: AsRef<Path>,
        S: AsRef<Path>,
    {
        let mut report = BatchReport::new(self.config.synthesis.seed);

        let mut libraries: Vec<LoadedSignal> = Vec::with_capacity(signals.len());
        for path in signals {
            let path = path.as_ref();
            let stem = signal_stem(path);
            // Output names only carry the stem, a second library would overwrite the first
            if let Some(first) = libraries.iter().find(|l| l.stem == stem) {
                let err = anyhow::anyhow!(
                    "signal name {:?} is already used by {}",
                    stem,
                    first.path.display()
                );
                report.fail(path, &err);
                continue;
            }
            match SignalLibrary::from_file(path) {
                Ok(library) => libraries.push(LoadedSignal {
                    path: path.to_path_buf(),
                    stem,
                    library,
                }),
                Err(err) => report.fail(path, &err.into()),
            }
        }
        if libraries.is_empty() {
            warn!("No usable signal library, nothing to synthesize");
        }

        for environment in environments {
            let environment = environment.as_ref();
            if let Err(err) = self.run_environment(environment, &libraries, &mut report) {
                report.fail(environment, &err);
            }
        }

        report.finished_at = Some(Utc::now());
        info!(
            "Batch finished: {} files written, {} failures",
            report.outputs.len(),
            report.failures.len()
        );
        report
    }

    fn output_dir(&self, environment: &Path) -> PathBuf {
        match &self.config.output.directory {
            Some(dir) => PathBuf::from(dir),
            None => environment
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_OUTPUT_SUBDIR),
        }
    }

    fn run_environment(
        &mut self,
        environment: &Path,
        libraries: &[LoadedSignal],
        report: &mut BatchReport,
    ) -> Result<()> {
        let table = ChannelResponseTable::from_file(environment)?;
        let depths = depth_labels(
            table.column_count(),
            self.config.output.receiver_depths.as_deref(),
        )?;
        let out_dir = self.output_dir(environment);
        debug!(
            "Environment {}: {} rows, depths {:?}, writing to {:?}",
            environment.display(),
            table.row_count(),
            depths,
            out_dir
        );

        for (m, &depth) in depths.iter().enumerate() {
            let column = table
                .column(m)
                .with_context(|| format!("Missing column {m}"))?;
            for signal in libraries {
                let path = out_dir.join(output_file_name(&signal.stem, depth));

                match self.synthesize_one(&signal.library, &column, &path) {
                    Ok((samples, window_start, window_len, peak, dropped)) => {
                        info!("Wrote {:?} ({} samples)", path, samples);
                        report.outputs.push(OutputRecord {
                            path,
                            environment: environment.to_path_buf(),
                            signal: signal.path.clone(),
                            receiver_depth: depth,
                            samples,
                            start_segment: window_start,
                            segment_count: window_len,
                            peak,
                            dropped,
                        });
                    }
                    Err(err) => report.fail(&path, &err),
                }
            }
        }
        Ok(())
    }

    fn synthesize_one(
        &mut self,
        library: &SignalLibrary,
        column: &[&crate::loader::ChannelResponse],
        path: &Path,
    ) -> Result<(usize, usize, usize, f64, usize)> {
        let signal = self.synthesizer.generate(
            library,
            column,
            self.config.synthesis.source_amplitude,
            &mut self.rng,
        )?;
        encoder::write_wav(path, &signal.samples, library.pcm_sample_rate())?;
        Ok((
            signal.samples.len(),
            signal.window.start,
            signal.window.len,
            signal.peak(),
            signal.dropped,
        ))
    }
}
