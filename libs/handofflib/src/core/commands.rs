// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Control channel message shapes.
//!
//! The control channel is the ordered, out-of-band path between the
//! coordinator and a worker. It carries start instructions in and
//! terminal status out; the bulk data always goes through the shared
//! segments. Message delivery is itself a synchronization point, so a
//! worker that observes a `Start` also sees every input word written
//! before it was sent. Transports without that guarantee must fall
//! back on the flag cells for fencing.

use crossbeam_channel::Sender;

use crate::core::request::SharedCells;
use crate::core::Result;

/// Reply half of a request: `Ok(value)` is the result message,
/// `Err(..)` the error message.
pub type Reply<T> = Sender<Result<T>>;

/// Scalar inputs accompanying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KernelParams {
    pub input1: u32,
    pub input2: u32,
}

impl KernelParams {
    pub fn new(input1: u32, input2: u32) -> Self {
        Self { input1, input2 }
    }
}

/// One unit of work: the scalar parameters plus a borrowed view of
/// the shared cells. Created by the coordinator immediately before
/// dispatch, consumed exactly once by one worker.
#[derive(Debug, Clone)]
pub struct Request {
    pub params: KernelParams,
    pub cells: SharedCells,
}

/// Coordinator-to-worker instructions.
pub enum WorkerCommand {
    /// Move the executor from `Uninitialized` to `Ready`. Touches no
    /// shared memory. No ack; the mailbox is ordered, so a later
    /// `Start` observes the transition.
    Init,
    /// Run one request. The reply sender carries the terminal status:
    /// output word 0 on success, the fault otherwise.
    Start { request: Request, reply: Reply<u32> },
}
