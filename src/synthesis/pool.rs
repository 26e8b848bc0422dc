// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Reusable per-segment accumulation buffers

use std::sync::Mutex;

/// Bounded free list of `f64` buffers.
///
/// Each worker borrows one buffer per segment it renders and hands it back
/// after merging, so a batch of runs keeps at most `capacity` buffers alive
/// between runs instead of allocating one per segment.
#[derive(Debug)]
pub struct AccumulatorPool {
    free: Mutex<Vec<Vec<f64>>>,
    capacity: usize,
}

impl AccumulatorPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Borrow a zero-filled buffer of `len` samples
    pub fn acquire(&self, len: usize) -> Vec<f64> {
        let recycled = self.lock().pop();
        match recycled {
            Some(mut buffer) => {
                buffer.clear();
                buffer.resize(len, 0.0);
                buffer
            }
            None => vec![0.0; len],
        }
    }

    /// Return a buffer; it is dropped when the pool is already full
    pub fn release(&self, buffer: Vec<f64>) {
        let mut free = self.lock();
        if free.len() < self.capacity {
            free.push(buffer);
        }
    }

    /// Number of idle buffers currently held
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<f64>>> {
        // The buffers are scratch space, a panic elsewhere cannot corrupt them
        self.free.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
