// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Random choice of the contiguous run of segments to synthesize

use std::ops::Range;

use rand::Rng;

/// A contiguous run of segment indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentWindow {
    pub start: usize,
    pub len: usize,
}

impl SegmentWindow {
    /// Draw a window of `min(max_len, segment_count)` segments whose start is
    /// uniform over every position where the whole run fits.
    pub fn choose<R: Rng>(segment_count: usize, max_len: usize, rng: &mut R) -> Self {
        let len = max_len.min(segment_count);
        let start = rng.random_range(0..=segment_count - len);
        Self { start, len }
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}
