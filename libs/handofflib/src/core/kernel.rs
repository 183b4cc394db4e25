// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The compute kernel contract.

use crate::core::commands::KernelParams;
use crate::core::request::SharedCells;
use crate::core::Result;

/// The opaque compute collaborator invoked by the executor.
///
/// A kernel consumes the input segment and must leave the output
/// segment fully written before returning `Ok`. It must not raise the
/// receiver flag except on success; the executor forces the flag back
/// to idle after any failure regardless. Errors (and panics, which
/// the executor absorbs) are reported to the coordinator as kernel
/// faults.
pub trait ComputeKernel: Send + 'static {
    fn compute(&mut self, params: KernelParams, cells: &SharedCells) -> Result<()>;
}

/// Boxed kernel for dynamic dispatch across the worker boundary.
pub type BoxedKernel = Box<dyn ComputeKernel>;

/// Reference kernel: `output[0] = input[0] + input[1]` (wrapping).
#[derive(Debug, Default)]
pub struct AddKernel;

impl ComputeKernel for AddKernel {
    fn compute(&mut self, _params: KernelParams, cells: &SharedCells) -> Result<()> {
        let a = cells.input.read(0);
        let b = cells.input.read(1);
        cells.output.write(0, a.wrapping_add(b));
        Ok(())
    }
}
