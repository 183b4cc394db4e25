// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Shared cell bundles and request lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::config::HandoffConfig;
use crate::core::error::{HandoffError, Result};
use crate::core::flags::FlagCell;
use crate::core::segment::Segment;

/// The four shared cells of one request: input and output segments
/// plus the sender and receiver flags.
///
/// Allocated and disposed of by the coordinator; the worker holds a
/// borrowed clone for the duration of a single invocation. Cloning
/// shares the underlying cells. At most one request may be in flight
/// on a given bundle; the protocol provides no multiplexing.
#[derive(Debug, Clone)]
pub struct SharedCells {
    pub input: Arc<Segment>,
    pub output: Arc<Segment>,
    pub sender: Arc<FlagCell>,
    pub receiver: Arc<FlagCell>,
    in_flight: Arc<AtomicBool>,
}

impl SharedCells {
    /// Allocate fresh cells with the given segment capacities.
    pub fn allocate(input_words: usize, output_words: usize) -> Self {
        Self {
            input: Arc::new(Segment::new(input_words)),
            output: Arc::new(Segment::new(output_words)),
            sender: Arc::new(FlagCell::new()),
            receiver: Arc::new(FlagCell::new()),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Allocate fresh cells sized by `config`.
    pub fn allocate_with(config: &HandoffConfig) -> Self {
        Self::allocate(config.input_words, config.output_words)
    }

    /// Return both flags to idle.
    ///
    /// The coordinator calls this at the start of every dispatch,
    /// before any input write. Stale flag values from a prior request
    /// are a correctness hazard otherwise.
    pub fn reset_flags(&self) {
        self.sender.reset();
        self.receiver.reset();
    }

    /// Whether a request is currently in flight on these cells.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the cells for a new request.
    pub(crate) fn begin_request(&self) -> Result<()> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| {
                HandoffError::ContractViolation(
                    "a request is already in flight on these cells".into(),
                )
            })?;
        Ok(())
    }

    /// Release the cells after a request completed with a definite
    /// outcome (result or kernel fault). Not called on indeterminate
    /// outcomes: the worker may still hold a borrowed view then.
    pub(crate) fn finish_request(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
