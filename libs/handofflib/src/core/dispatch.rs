// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The dispatch coordinator.
//!
//! Owns the worker handle and the request lifecycle: populate the
//! input segment, reset and raise the flags, post the start
//! instruction, then wait for the terminal reply on the control
//! channel. The coordinator never polls the receiver flag itself; the
//! flag is the cross-context signal for flag-only participants, while
//! the reply message is what this thread actually sleeps on.

use crate::core::commands::{KernelParams, Request, WorkerCommand};
use crate::core::error::{HandoffError, Result};
use crate::core::executor::WorkerHandle;
use crate::core::kernel::BoxedKernel;
use crate::core::observability::{DispatchStats, StatsSnapshot};
use crate::core::request::SharedCells;

/// A completed request: the reported value (output word 0) plus the
/// full output segment contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub value: u32,
    pub output: Vec<u32>,
}

/// Hands requests to one worker and reports a definite outcome for
/// every one of them.
pub struct Dispatcher {
    worker: WorkerHandle,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(worker: WorkerHandle) -> Self {
        Self {
            worker,
            stats: DispatchStats::new(),
        }
    }

    /// Spawn a worker for `kernel` and wrap it in a dispatcher.
    pub fn spawn(id: impl Into<String>, kernel: BoxedKernel) -> Result<Self> {
        Ok(Self::new(WorkerHandle::spawn(id, kernel)?))
    }

    pub fn worker(&self) -> &WorkerHandle {
        &self.worker
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Initialize the worker.
    ///
    /// No ack is expected; the mailbox is ordered, so a `dispatch`
    /// issued afterwards is observed after the state transition.
    pub fn init(&self) -> Result<()> {
        self.worker.send(WorkerCommand::Init)
    }

    /// Run one request on `cells` and wait for its outcome.
    ///
    /// At most one request may be in flight per cell bundle; a second
    /// dispatch while one is outstanding is rejected with a contract
    /// violation. The input segment must hold at least two words (the
    /// scalar parameters land in words 0 and 1).
    ///
    /// Sequence: claim the cells, reset both flags to idle, write the
    /// input segment, raise the sender flag, post the start
    /// instruction, block on the reply. On a result the output segment
    /// is read and returned; on an error the output is left unread
    /// (its contents are undefined). If the reply channel disconnects
    /// before a terminal message arrives the outcome is indeterminate
    /// and the cells stay claimed: the worker may still be mid-write,
    /// so reusing them is never safe.
    pub fn dispatch(&self, params: KernelParams, cells: &SharedCells) -> Result<DispatchOutcome> {
        cells.begin_request()?;
        self.stats.record_dispatched();

        cells.reset_flags();
        cells.input.write(0, params.input1);
        cells.input.write(1, params.input2);
        cells.sender.raise();

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let start = WorkerCommand::Start {
            request: Request {
                params,
                cells: cells.clone(),
            },
            reply: reply_tx,
        };

        if let Err(fault) = self.worker.send(start) {
            // The instruction never entered the mailbox; the worker
            // cannot be holding a view of these cells.
            cells.finish_request();
            self.stats.record_faulted();
            return Err(fault);
        }

        match reply_rx.recv() {
            Ok(Ok(value)) => {
                let output = cells.output.snapshot();
                cells.finish_request();
                self.stats.record_completed();
                tracing::debug!("[{}] Request complete (value={})", self.worker.id(), value);
                Ok(DispatchOutcome { value, output })
            }
            Ok(Err(fault)) => {
                cells.finish_request();
                self.stats.record_faulted();
                Err(fault)
            }
            Err(_) => {
                self.stats.record_faulted();
                Err(HandoffError::ChannelFault(format!(
                    "worker '{}' dropped the reply channel before a terminal message",
                    self.worker.id()
                )))
            }
        }
    }

    /// Shut the worker down. Valid only with no request in flight.
    pub fn shutdown(&mut self) -> Result<()> {
        self.worker.shutdown()
    }
}
