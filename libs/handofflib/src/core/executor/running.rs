// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::core::commands::WorkerCommand;
use crate::core::error::{HandoffError, Result};
use crate::core::kernel::BoxedKernel;

use super::state::ExecutorState;
use super::thread_runner::run_worker_loop;

/// A compute executor running on its own thread
///
/// Holds the runtime artifacts of one worker:
/// - Thread handle (None once joined)
/// - Command mailbox sender
/// - Shutdown channel sender
/// - Shared executor state
///
/// The worker is stateless across requests; everything request-scoped
/// travels inside the `Start` command.
pub struct WorkerHandle {
    id: String,
    thread: Option<JoinHandle<()>>,
    command_tx: crossbeam_channel::Sender<WorkerCommand>,
    shutdown_tx: crossbeam_channel::Sender<()>,
    state: Arc<Mutex<ExecutorState>>,
}

impl WorkerHandle {
    /// Spawn a worker thread running `kernel`.
    ///
    /// The executor starts `Uninitialized`; send
    /// [`WorkerCommand::Init`] (or use `Dispatcher::init`) before the
    /// first request.
    pub fn spawn(id: impl Into<String>, kernel: BoxedKernel) -> Result<Self> {
        let id = id.into();
        let (command_tx, command_rx) = crossbeam_channel::unbounded::<WorkerCommand>();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let state = Arc::new(Mutex::new(ExecutorState::Uninitialized));

        let thread_id = id.clone();
        let thread_state = Arc::clone(&state);
        let thread = std::thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || {
                run_worker_loop(thread_id, kernel, command_rx, shutdown_rx, thread_state);
            })
            .map_err(|e| HandoffError::Runtime(format!("Failed to spawn worker thread: {}", e)))?;

        Ok(Self {
            id,
            thread: Some(thread),
            command_tx,
            shutdown_tx,
            state,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the current state (locks the mutex briefly)
    pub fn current_state(&self) -> ExecutorState {
        *self.state.lock()
    }

    /// Post an instruction to the worker's mailbox.
    pub(crate) fn send(&self, command: WorkerCommand) -> Result<()> {
        self.command_tx.send(command).map_err(|_| {
            HandoffError::ChannelFault(format!("worker '{}' mailbox disconnected", self.id))
        })
    }

    /// Shut the worker down and join its thread.
    ///
    /// Termination is an external lifecycle concern; call this only
    /// when no request is in flight. Idempotent.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.thread.is_none() {
            return Ok(());
        }

        tracing::info!("[{}] Shutting down worker...", self.id);
        // A full shutdown channel means a signal is already pending.
        let _ = self.shutdown_tx.try_send(());

        if let Some(handle) = self.thread.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::info!("[{}] Worker thread joined", self.id);
                }
                Err(panic_err) => {
                    tracing::error!("[{}] Worker thread panicked: {:?}", self.id, panic_err);
                    return Err(HandoffError::Runtime(format!(
                        "worker '{}' thread panicked",
                        self.id
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::AddKernel;

    #[test]
    fn test_spawn_starts_uninitialized() {
        let mut worker = WorkerHandle::spawn("spawn-test", Box::new(AddKernel)).unwrap();
        assert_eq!(worker.id(), "spawn-test");
        assert_eq!(worker.current_state(), ExecutorState::Uninitialized);
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut worker = WorkerHandle::spawn("shutdown-test", Box::new(AddKernel)).unwrap();
        worker.shutdown().unwrap();
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_send_after_shutdown_is_channel_fault() {
        let mut worker = WorkerHandle::spawn("dead-mailbox", Box::new(AddKernel)).unwrap();
        worker.shutdown().unwrap();

        let result = worker.send(WorkerCommand::Init);
        assert!(matches!(result, Err(HandoffError::ChannelFault(_))));
    }
}
