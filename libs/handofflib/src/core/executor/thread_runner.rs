// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::commands::{Reply, Request, WorkerCommand};
use crate::core::error::{HandoffError, Result};
use crate::core::kernel::BoxedKernel;

use super::state::ExecutorState;

/// Run the worker thread main loop.
///
/// Blocks on the command mailbox and the shutdown channel; each
/// request is handled to a terminal reply before the next command is
/// taken, so at most one request is ever executing.
pub(super) fn run_worker_loop(
    id: String,
    mut kernel: BoxedKernel,
    command_rx: crossbeam_channel::Receiver<WorkerCommand>,
    shutdown_rx: crossbeam_channel::Receiver<()>,
    state: Arc<Mutex<ExecutorState>>,
) {
    tracing::info!("[{}] Worker thread started", id);

    loop {
        crossbeam_channel::select! {
            recv(shutdown_rx) -> _ => break,
            recv(command_rx) -> msg => match msg {
                Ok(WorkerCommand::Init) => handle_init(&id, &state),
                Ok(WorkerCommand::Start { request, reply }) => {
                    handle_start(&id, &mut kernel, request, reply, &state);
                }
                // All command senders dropped; nothing left to serve.
                Err(_) => break,
            }
        }
    }

    tracing::debug!("[{}] Worker thread stopped", id);
}

fn handle_init(id: &str, state: &Arc<Mutex<ExecutorState>>) {
    let mut guard = state.lock();
    match *guard {
        ExecutorState::Uninitialized | ExecutorState::Faulted => {
            *guard = ExecutorState::Ready;
            tracing::info!("[{}] Initialized, ready for requests", id);
        }
        current => {
            tracing::debug!("[{}] Init ignored in state {}", id, current);
        }
    }
}

fn handle_start(
    id: &str,
    kernel: &mut BoxedKernel,
    request: Request,
    reply: Reply<u32>,
    state: &Arc<Mutex<ExecutorState>>,
) {
    {
        let mut guard = state.lock();
        match *guard {
            ExecutorState::Ready | ExecutorState::Faulted => {
                *guard = ExecutorState::Busy;
            }
            current => {
                let refusal = HandoffError::ContractViolation(format!(
                    "start instruction received in state {}",
                    current
                ));
                tracing::warn!("[{}] {}", id, refusal);
                if reply.send(Err(refusal)).is_err() {
                    tracing::warn!("[{}] Refusal reply dropped by coordinator", id);
                }
                return;
            }
        }
    }

    match execute_request(id, kernel, &request) {
        Ok(value) => {
            *state.lock() = ExecutorState::Ready;
            if reply.send(Ok(value)).is_err() {
                tracing::warn!("[{}] Result reply dropped by coordinator", id);
            }
        }
        Err(fault) => {
            // Partial or garbage output must never be signaled as
            // ready, even if the kernel raised the flag before failing.
            request.cells.receiver.reset();
            *state.lock() = ExecutorState::Faulted;
            tracing::warn!("[{}] Request failed: {}", id, fault);
            if reply.send(Err(fault)).is_err() {
                tracing::warn!("[{}] Error reply dropped by coordinator", id);
            }
        }
    }
}

/// Run one request's kernel and, on success, publish the output.
///
/// The receiver flag is raised only after the kernel has returned with
/// the output segment fully written. Kernel panics are absorbed and
/// reported as kernel faults; a fault never takes the worker thread
/// down.
fn execute_request(id: &str, kernel: &mut BoxedKernel, request: &Request) -> Result<u32> {
    let Request { params, cells } = request;

    if !cells.sender.is_set() {
        return Err(HandoffError::ContractViolation(
            "sender flag not raised before start instruction".into(),
        ));
    }

    tracing::debug!(
        "[{}] Executing request (input1={}, input2={})",
        id,
        params.input1,
        params.input2
    );

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        kernel.compute(*params, cells)
    }));

    match outcome {
        Ok(Ok(())) => {
            cells.receiver.raise();
            Ok(cells.output.read(0))
        }
        Ok(Err(error)) => Err(match error {
            fault @ HandoffError::KernelFault(_) => fault,
            other => HandoffError::KernelFault(other.to_string()),
        }),
        Err(panic) => Err(HandoffError::KernelFault(format!(
            "kernel panicked: {}",
            panic_message(panic.as_ref())
        ))),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
