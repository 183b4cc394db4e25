// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Fixed-size shared memory segments for bulk data exchange.
//!
//! A segment is a word-addressable region shared between the
//! coordinator and the worker. Capacity is fixed at allocation and
//! never resized. Index validity is the caller's responsibility: no
//! bounds metadata travels with a request, so an out-of-range access
//! is a fatal contract breach, not a recoverable error.
//!
//! Data accesses are `Relaxed`. Cross-context visibility comes from
//! the publication points around them: the release store on a flag
//! cell, or the channel send carrying the start instruction. A reader
//! that observed the corresponding signal sees every word written
//! before it.

use std::sync::atomic::{AtomicU32, Ordering};

/// Size of one segment word in bytes.
pub const WORD_BYTES: usize = 4;

/// Fixed-size word-addressable shared storage.
///
/// One party writes a segment per phase: the coordinator populates the
/// input segment entirely before raising the sender flag, the worker
/// populates the output segment entirely before the receiver flag goes
/// up. Shared between contexts via `Arc`.
#[derive(Debug)]
pub struct Segment {
    words: Box<[AtomicU32]>,
}

impl Segment {
    /// Create a zeroed segment holding `capacity` words.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "Segment must hold at least 1 word");

        Self {
            words: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Number of words this segment holds. Fixed for its lifetime.
    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Total size in bytes.
    pub fn byte_len(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Read the word at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    pub fn read(&self, index: usize) -> u32 {
        assert!(
            index < self.words.len(),
            "segment index {} out of range (capacity {})",
            index,
            self.words.len()
        );
        self.words[index].load(Ordering::Relaxed)
    }

    /// Write `word` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    pub fn write(&self, index: usize, word: u32) {
        assert!(
            index < self.words.len(),
            "segment index {} out of range (capacity {})",
            index,
            self.words.len()
        );
        self.words[index].store(word, Ordering::Relaxed);
    }

    /// Copy `words` into the segment starting at word 0.
    ///
    /// # Panics
    ///
    /// Panics if `words.len() > capacity()`.
    pub fn fill_from(&self, words: &[u32]) {
        assert!(
            words.len() <= self.words.len(),
            "source length {} exceeds segment capacity {}",
            words.len(),
            self.words.len()
        );
        for (index, word) in words.iter().enumerate() {
            self.words[index].store(*word, Ordering::Relaxed);
        }
    }

    /// Copy the whole segment out.
    pub fn snapshot(&self) -> Vec<u32> {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Relaxed))
            .collect()
    }
}
