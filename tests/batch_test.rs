// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_multipath_synth::batch::{BatchReport, BatchRunner, DEFAULT_OUTPUT_SUBDIR};
use rust_multipath_synth::config::Config;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::tempdir;

static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// Two rows (100 Hz, 200 Hz) by `columns` receiver depths
fn write_environment(dir: &Path, columns: usize) -> Result<PathBuf> {
    let row = |freq: f64| -> Vec<serde_json::Value> {
        (0..columns)
            .map(|c| {
                json!({
                    "freq": freq,
                    "Amp": [1.0, 0.5],
                    "Delay": [0.01 * c as f64, 0.01 * c as f64 + 0.003],
                    "phase": [0.0, 1.0]
                })
            })
            .collect()
    };
    let path = dir.join("env.json");
    fs::write(&path, serde_json::to_string(&json!([row(100.0), row(200.0)]))?)?;
    Ok(path)
}

/// Three 0.1 s segments sampled at 1 kHz
fn write_signal(dir: &Path, name: &str) -> Result<PathBuf> {
    let segment = json!({"Amp": [1.0, 0.25], "freq": [100.0, 200.0], "phase": [0.0, 0.5]});
    let signal = json!({
        "fs": 1000,
        "Ndelay": [0.0, 0.1, 0.2],
        "Analy_freq": [100.0, 200.0],
        "Analyrecord": [segment, segment, segment]
    });
    let path = dir.join(format!("{name}.json"));
    fs::write(&path, serde_json::to_string(&signal)?)?;
    Ok(path)
}

fn seeded_config(output: Option<&Path>) -> Config {
    let mut config = Config::default();
    config.synthesis.seed = Some(1);
    config.output.directory = output.map(|p| p.display().to_string());
    config
}

#[test]
fn test_batch_writes_one_file_per_depth() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let env = write_environment(temp_dir.path(), 3)?;
    let signal = write_signal(temp_dir.path(), "sig")?;
    let out_dir = temp_dir.path().join("out");

    let mut runner = BatchRunner::new(seeded_config(Some(&out_dir)))?;
    let report = runner.run(&[env], &[signal]);

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.outputs.len(), 3);
    let depths: Vec<f64> = report.outputs.iter().map(|o| o.receiver_depth).collect();
    assert_eq!(depths, vec![10.0, 20.0, 30.0]);

    for (name, record) in ["sig_Rd_10.wav", "sig_Rd_20.wav", "sig_Rd_30.wav"]
        .iter()
        .zip(&report.outputs)
    {
        let path = out_dir.join(name);
        assert_eq!(record.path, path);
        assert_eq!(record.start_segment, 0);
        assert_eq!(record.segment_count, 3);
        assert_eq!(record.dropped, 0);
        assert!(record.peak > 0.0);

        let mut reader = hound::WavReader::open(&path)?;
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 1000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let samples: Vec<i16> = reader.samples::<i16>().collect::<Result<_, _>>()?;
        assert_eq!(samples.len(), record.samples);
        let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        assert_eq!(peak, 32767);
    }

    Ok(())
}

#[test]
fn test_default_output_directory_is_next_to_environment() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let env = write_environment(temp_dir.path(), 4)?;
    let signal = write_signal(temp_dir.path(), "burst")?;

    let mut runner = BatchRunner::new(seeded_config(None))?;
    let report = runner.run(&[env], &[signal]);

    assert_eq!(report.outputs.len(), 4);
    let out_dir = temp_dir.path().join(DEFAULT_OUTPUT_SUBDIR);
    for depth in [25, 50, 100, 300] {
        assert!(out_dir.join(format!("burst_Rd_{depth}.wav")).exists());
    }

    Ok(())
}

#[test]
fn test_failures_do_not_stop_the_batch() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let env = write_environment(temp_dir.path(), 3)?;
    let missing_env = temp_dir.path().join("missing.json");
    let good = write_signal(temp_dir.path(), "good")?;
    let bad = temp_dir.path().join("bad.json");
    fs::write(&bad, r#"{"fs": 1000, "Ndelay": [0, 0.1]}"#)?;
    let out_dir = temp_dir.path().join("out");

    let mut runner = BatchRunner::new(seeded_config(Some(&out_dir)))?;
    let report = runner.run(&[missing_env.clone(), env], &[bad.clone(), good]);

    assert_eq!(report.outputs.len(), 3);
    assert_eq!(report.failures.len(), 2);
    let failed: Vec<&PathBuf> = report.failures.iter().map(|f| &f.document).collect();
    assert!(failed.contains(&&bad));
    assert!(failed.contains(&&missing_env));
    assert!(out_dir.join("good_Rd_10.wav").exists());
    assert!(!out_dir.join("bad_Rd_10.wav").exists());

    Ok(())
}

#[test]
fn test_mismatched_depth_labels_fail_the_environment() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let env = write_environment(temp_dir.path(), 3)?;
    let signal = write_signal(temp_dir.path(), "sig")?;

    let mut config = seeded_config(Some(&temp_dir.path().join("out")));
    config.output.receiver_depths = Some(vec![1.0, 2.0]);
    let mut runner = BatchRunner::new(config)?;
    let report = runner.run(&[env.clone()], &[signal]);

    assert!(report.outputs.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].document, env);

    Ok(())
}

#[test]
fn test_seed_reproduces_segment_selection() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let env = write_environment(temp_dir.path(), 3)?;
    let signal = write_signal(temp_dir.path(), "sig")?;

    let run = |dir: &str| -> Result<Vec<usize>> {
        let mut config = seeded_config(Some(&temp_dir.path().join(dir)));
        config.synthesis.max_segments = 1;
        config.synthesis.seed = Some(1234);
        let mut runner = BatchRunner::new(config)?;
        let report = runner.run(&[env.clone()], &[signal.clone()]);
        Ok(report.outputs.iter().map(|o| o.start_segment).collect())
    };

    let first = run("a")?;
    let second = run("b")?;
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert!(first.iter().all(|&s| s < 3));

    Ok(())
}

#[test]
fn test_report_round_trips_through_json() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let env = write_environment(temp_dir.path(), 3)?;
    let signal = write_signal(temp_dir.path(), "sig")?;

    let mut runner = BatchRunner::new(seeded_config(Some(&temp_dir.path().join("out"))))?;
    let report = runner.run(&[env], &[signal]);
    let report_path = temp_dir.path().join("report.json");
    report.save_to_file(&report_path)?;

    let loaded: BatchReport = serde_json::from_str(&fs::read_to_string(&report_path)?)?;
    assert_eq!(loaded.outputs.len(), report.outputs.len());
    assert_eq!(loaded.seed, Some(1));
    assert!(loaded.finished_at.is_some());

    Ok(())
}

#[test]
fn test_signals_sharing_a_name_are_not_overwritten() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let env = write_environment(temp_dir.path(), 3)?;
    let first_dir = temp_dir.path().join("first");
    let second_dir = temp_dir.path().join("second");
    fs::create_dir_all(&first_dir)?;
    fs::create_dir_all(&second_dir)?;
    let first = write_signal(&first_dir, "sig")?;
    let second = write_signal(&second_dir, "sig")?;
    let out_dir = temp_dir.path().join("out");

    let mut runner = BatchRunner::new(seeded_config(Some(&out_dir)))?;
    let report = runner.run(&[env], &[first.clone(), second.clone()]);

    // Only the first library is rendered, the second is reported
    assert_eq!(report.outputs.len(), 3);
    assert!(report.outputs.iter().all(|o| o.signal == first));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].document, second);

    let mut paths: Vec<&PathBuf> = report.outputs.iter().map(|o| &o.path).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 3);

    Ok(())
}
