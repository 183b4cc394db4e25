// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Single-word flag cells for phase-transition signaling.
//!
//! Two flag cells exist per request: the sender-side flag, written by
//! the coordinator to announce "input ready, start work", and the
//! receiver-side flag, written by the worker to announce "output
//! ready". A party must not read the segment a flag guards until it
//! has observed the flag transition.
//!
//! `set` is a release store and `get` an acquire load. No weaker
//! ordering is permitted: the flag publication is what makes the
//! preceding segment writes visible to the other context when no
//! message channel is in play.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Flag value meaning idle / unset.
pub const FLAG_IDLE: u32 = 0;
/// Flag value meaning set / ready.
pub const FLAG_SET: u32 = 1;

/// Spins before each scheduler yield while waiting on a flag.
const SPIN_LIMIT: u32 = 64;

/// A single-word atomic signal cell shared by exactly two parties.
#[derive(Debug, Default)]
pub struct FlagCell {
    cell: AtomicU32,
}

impl FlagCell {
    /// Create a flag cell in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` with release ordering.
    #[inline]
    pub fn set(&self, value: u32) {
        self.cell.store(value, Ordering::Release);
    }

    /// Load the current value with acquire ordering.
    #[inline]
    pub fn get(&self) -> u32 {
        self.cell.load(Ordering::Acquire)
    }

    /// Set the flag to [`FLAG_SET`].
    #[inline]
    pub fn raise(&self) {
        self.set(FLAG_SET);
    }

    /// Return the flag to [`FLAG_IDLE`].
    #[inline]
    pub fn reset(&self) {
        self.set(FLAG_IDLE);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.get() == FLAG_SET
    }

    /// Busy-poll until the flag is set.
    ///
    /// Spins briefly, then yields to the scheduler between polls. For
    /// participants that communicate purely through shared memory and
    /// have no message channel to block on. Does not return until the
    /// flag is observed set.
    pub fn wait_set(&self) {
        let mut spins = 0u32;
        while !self.is_set() {
            if spins < SPIN_LIMIT {
                std::hint::spin_loop();
                spins += 1;
            } else {
                std::thread::yield_now();
            }
        }
    }

    /// Busy-poll until the flag is set or `timeout` elapses.
    ///
    /// Returns `true` if the flag was observed set.
    pub fn wait_set_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut spins = 0u32;
        while !self.is_set() {
            if Instant::now() >= deadline {
                return false;
            }
            if spins < SPIN_LIMIT {
                std::hint::spin_loop();
                spins += 1;
            } else {
                std::thread::yield_now();
            }
        }
        true
    }
}
