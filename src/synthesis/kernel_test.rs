// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use super::kernel::synthesize_paths;
use crate::loader::ChannelResponse;
use std::f64::consts::PI;

#[cfg(test)]
mod tests {
    use super::*;

    fn time_base(n: usize, fs: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 / fs).collect()
    }

    fn assert_close(a: &[f64], b: &[f64], rel: f64) {
        assert_eq!(a.len(), b.len());
        let scale = a.iter().chain(b).fold(1.0f64, |m, x| m.max(x.abs()));
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!(
                (x - y).abs() <= rel * scale,
                "sample {i} differs: {x} vs {y}"
            );
        }
    }

    #[test]
    fn test_empty_response_yields_silence() {
        let t = time_base(500, 1000.0);
        let y = synthesize_paths(100.0, 1000.0, &t, 3.0, 0.5, &ChannelResponse::empty(100.0));
        assert_eq!(y.len(), 500);
        assert!(y.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_single_path_is_scaled_cosine() {
        let fs = 1000.0;
        let t = time_base(1000, fs);
        let response = ChannelResponse::new(100.0, vec![0.5], vec![2.0], vec![0.25]).unwrap();
        let y = synthesize_paths(100.0, fs, &t, 2.0, 0.5, &response);
        for (i, &sample) in y.iter().enumerate() {
            let expected = 1.0 * (2.0 * PI * 100.0 * t[i] + 0.75).cos();
            assert!((sample - expected).abs() < 1e-12, "sample {i}");
        }
    }

    #[test]
    fn test_second_path_offset_by_one_sample() {
        let fs = 1000.0;
        let t = time_base(200, fs);
        let both = ChannelResponse::new(100.0, vec![1.0, 0.5], vec![0.0, 0.001], vec![0.0, 0.0]).unwrap();
        let direct = ChannelResponse::new(100.0, vec![1.0], vec![0.0], vec![0.0]).unwrap();

        let y = synthesize_paths(100.0, fs, &t, 1.0, 0.0, &both);
        let first = synthesize_paths(100.0, fs, &t, 1.0, 0.0, &direct);

        // The echo starts one sample late
        assert!((y[0] - first[0]).abs() < 1e-12);
        for i in 1..t.len() {
            let echo = 0.5 * (2.0 * PI * 100.0 * t[i - 1]).cos();
            assert!((y[i] - first[i] - echo).abs() < 1e-12, "sample {i}");
        }
    }

    #[test]
    fn test_path_order_does_not_matter() {
        let fs = 48000.0;
        let t = time_base(10_000, fs);
        let amplitudes = vec![1.0, 0.3, 0.7, 0.05, 0.2];
        let delays = vec![0.010, 0.0102, 0.0135, 0.0101, 0.0499];
        let phases = vec![0.0, PI, 0.3, -1.2, 2.0];
        let forward =
            ChannelResponse::new(1250.0, amplitudes.clone(), delays.clone(), phases.clone()).unwrap();

        let order = [3, 0, 4, 2, 1];
        let permute = |v: &[f64]| order.iter().map(|&k| v[k]).collect::<Vec<_>>();
        let shuffled =
            ChannelResponse::new(1250.0, permute(&amplitudes), permute(&delays), permute(&phases)).unwrap();

        let a = synthesize_paths(1250.0, fs, &t, 1.0, 0.1, &forward);
        let b = synthesize_paths(1250.0, fs, &t, 1.0, 0.1, &shuffled);
        assert_close(&a, &b, 1e-9);
    }

    #[test]
    fn test_paths_past_window_are_dropped() {
        let fs = 1000.0;
        let t = time_base(100, fs);
        // The second arrival lands 200 samples late, past the 100-sample window
        let response = ChannelResponse::new(50.0, vec![1.0, 1.0], vec![0.0, 0.2], vec![0.0, 0.0]).unwrap();
        let direct = ChannelResponse::new(50.0, vec![1.0], vec![0.0], vec![0.0]).unwrap();
        assert_close(
            &synthesize_paths(50.0, fs, &t, 1.0, 0.0, &response),
            &synthesize_paths(50.0, fs, &t, 1.0, 0.0, &direct),
            1e-12,
        );
    }

    #[test]
    fn test_chunk_boundaries_match_sequential_sum() {
        // Long enough to span several parallel chunks
        let fs = 8000.0;
        let n = 20_000;
        let t = time_base(n, fs);
        let amplitudes = vec![1.0, 0.6, 0.25];
        let delays = vec![0.0, 0.37, 1.1];
        let phases = vec![0.0, 0.4, -0.9];
        let response =
            ChannelResponse::new(440.0, amplitudes.clone(), delays.clone(), phases.clone()).unwrap();
        let y = synthesize_paths(440.0, fs, &t, 2.0, 0.2, &response);

        let mut expected = vec![0.0; n];
        for p in 0..amplitudes.len() {
            let offset = (delays[p] * fs).floor() as usize;
            for i in 0..n {
                if offset + i < n {
                    expected[offset + i] +=
                        2.0 * amplitudes[p] * (2.0 * PI * 440.0 * t[i] + 0.2 + phases[p]).cos();
                }
            }
        }
        assert_close(&y, &expected, 1e-9);
    }
}
