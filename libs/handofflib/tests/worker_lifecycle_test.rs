//! Worker Lifecycle Integration Test
//!
//! Covers the executor state machine around the happy path:
//! init gating, init idempotence, fault recovery, panic absorption,
//! shutdown, and the dispatcher's counters.

use handofflib::{
    AddKernel, ComputeKernel, Dispatcher, ExecutorState, HandoffError, KernelParams, Result,
    SharedCells,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

/// Fails the first request, then behaves like an add kernel.
struct FlakyKernel {
    failed_once: bool,
}

impl ComputeKernel for FlakyKernel {
    fn compute(&mut self, _params: KernelParams, cells: &SharedCells) -> Result<()> {
        if !self.failed_once {
            self.failed_once = true;
            return Err(HandoffError::KernelFault("first request fails".into()));
        }
        let sum = cells.input.read(0).wrapping_add(cells.input.read(1));
        cells.output.write(0, sum);
        Ok(())
    }
}

/// Panics on the first request, then behaves like an add kernel.
struct PanickyKernel {
    panicked_once: bool,
}

impl ComputeKernel for PanickyKernel {
    fn compute(&mut self, _params: KernelParams, cells: &SharedCells) -> Result<()> {
        if !self.panicked_once {
            self.panicked_once = true;
            panic!("kernel blew up");
        }
        let sum = cells.input.read(0).wrapping_add(cells.input.read(1));
        cells.output.write(0, sum);
        Ok(())
    }
}

#[test]
fn test_start_before_init_is_rejected() {
    init_tracing();

    let dispatcher = Dispatcher::spawn("uninit", Box::new(AddKernel)).unwrap();
    let cells = SharedCells::allocate(2, 1);

    let result = dispatcher.dispatch(KernelParams::new(1, 2), &cells);
    assert!(matches!(result, Err(HandoffError::ContractViolation(_))));
    assert_eq!(
        dispatcher.worker().current_state(),
        ExecutorState::Uninitialized
    );

    dispatcher.init().unwrap();
    let outcome = dispatcher
        .dispatch(KernelParams::new(1, 2), &cells)
        .unwrap();
    assert_eq!(outcome.value, 3);
}

#[test]
fn test_init_is_idempotent() {
    init_tracing();

    let dispatcher = Dispatcher::spawn("double-init", Box::new(AddKernel)).unwrap();
    dispatcher.init().unwrap();
    dispatcher.init().unwrap();

    let cells = SharedCells::allocate(2, 1);
    let outcome = dispatcher
        .dispatch(KernelParams::new(2, 2), &cells)
        .unwrap();
    assert_eq!(outcome.value, 4);
    assert_eq!(dispatcher.worker().current_state(), ExecutorState::Ready);
}

#[test]
fn test_fault_is_not_fatal_to_the_worker() {
    init_tracing();

    let dispatcher =
        Dispatcher::spawn("flaky", Box::new(FlakyKernel { failed_once: false })).unwrap();
    dispatcher.init().unwrap();

    let cells = SharedCells::allocate(2, 1);

    let first = dispatcher.dispatch(KernelParams::new(5, 6), &cells);
    assert!(matches!(first, Err(HandoffError::KernelFault(_))));
    assert_eq!(dispatcher.worker().current_state(), ExecutorState::Faulted);

    let second = dispatcher
        .dispatch(KernelParams::new(5, 6), &cells)
        .unwrap();
    assert_eq!(second.value, 11);
    assert_eq!(dispatcher.worker().current_state(), ExecutorState::Ready);
}

#[test]
fn test_kernel_panic_becomes_error_message() {
    init_tracing();

    let dispatcher = Dispatcher::spawn(
        "panicky",
        Box::new(PanickyKernel {
            panicked_once: false,
        }),
    )
    .unwrap();
    dispatcher.init().unwrap();

    let cells = SharedCells::allocate(2, 1);

    let first = dispatcher.dispatch(KernelParams::new(1, 1), &cells);
    match first {
        Err(HandoffError::KernelFault(message)) => {
            assert!(message.contains("panicked"), "got: {}", message);
        }
        other => panic!("expected a kernel fault, got {:?}", other),
    }
    assert!(!cells.receiver.is_set());

    // The worker thread survived the panic.
    let second = dispatcher
        .dispatch(KernelParams::new(8, 9), &cells)
        .unwrap();
    assert_eq!(second.value, 17);
}

#[test]
fn test_dispatch_after_shutdown_is_channel_fault() {
    init_tracing();

    let mut dispatcher = Dispatcher::spawn("short-lived", Box::new(AddKernel)).unwrap();
    dispatcher.init().unwrap();

    let cells = SharedCells::allocate(2, 1);
    dispatcher
        .dispatch(KernelParams::new(1, 1), &cells)
        .unwrap();

    dispatcher.shutdown().unwrap();

    let result = dispatcher.dispatch(KernelParams::new(1, 1), &cells);
    assert!(matches!(result, Err(HandoffError::ChannelFault(_))));
    // The instruction never reached a worker, so the cells were
    // released and stay reusable.
    assert!(!cells.is_in_flight());
}

#[test]
fn test_stats_track_outcomes() {
    init_tracing();

    let dispatcher =
        Dispatcher::spawn("counted", Box::new(FlakyKernel { failed_once: false })).unwrap();
    dispatcher.init().unwrap();

    let cells = SharedCells::allocate(2, 1);
    let _ = dispatcher.dispatch(KernelParams::new(1, 1), &cells);
    dispatcher
        .dispatch(KernelParams::new(1, 1), &cells)
        .unwrap();
    dispatcher
        .dispatch(KernelParams::new(2, 2), &cells)
        .unwrap();

    let snapshot = dispatcher.stats();
    assert_eq!(snapshot.dispatched, 3);
    assert_eq!(snapshot.completed, 2);
    assert_eq!(snapshot.faulted, 1);

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"completed\":2"));
}
