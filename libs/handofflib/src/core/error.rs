use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandoffError {
    /// A caller broke a protocol precondition: reusing cells with a
    /// request still in flight, starting an uninitialized worker, or
    /// starting work before the sender flag was raised. Not
    /// recoverable within the protocol; it indicates a bug at the
    /// call site.
    #[error("protocol contract violated: {0}")]
    ContractViolation(String),

    /// The compute kernel failed. Recoverable at request granularity;
    /// the output segment contents are undefined and must not be read.
    #[error("compute kernel failed: {0}")]
    KernelFault(String),

    /// The control channel failed to deliver. The outcome of the
    /// request is unknown; the worker is not necessarily dead.
    #[error("control channel failed: {0}")]
    ChannelFault(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, HandoffError>;
