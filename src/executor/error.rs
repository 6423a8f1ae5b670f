use std::time::Duration;

use thiserror::Error;

use super::ExecutorState;

/// Errors crossing the executor's public boundary.
///
/// Task faults are not part of this: they are reported through the fault sink.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The setup hook failed; no task was spawned.
    #[error("setup failed: {0:#}")]
    Setup(#[source] anyhow::Error),
    /// Tasks were still running when the shutdown deadline passed.
    ///
    /// They are not killed. They keep running detached from the executor,
    /// so their resources leak until they exit on their own.
    #[error("timed out after {timeout:?} waiting for shutdown; {in_flight} task(s) still in flight")]
    ShutdownTimeout { timeout: Duration, in_flight: usize },
    /// The call is not allowed in the executor's current state.
    #[error("cannot {action} executor while {state}")]
    InvalidState {
        action: &'static str,
        state: ExecutorState,
    },
    /// `start` was called outside a Tokio runtime.
    #[error("no Tokio runtime available to spawn tasks")]
    NoRuntime,
}

impl ExecutorError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Setup(_) => "executor_setup_failed",
            Self::ShutdownTimeout { .. } => "executor_shutdown_timeout",
            Self::InvalidState { .. } => "executor_invalid_state",
            Self::NoRuntime => "executor_no_runtime",
        }
    }
}
