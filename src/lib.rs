//! # task-executor
//!
//! `task-executor` runs a fixed set of long-lived Tokio tasks and shuts them
//! down within a bounded amount of time.
//! Panics and errors inside tasks are caught at the task boundary and reported
//! on a channel instead of taking the process down.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use std::{collections::HashMap, time::Duration};
//! use task_executor::{ExecutorBuilder, TaskContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut executor = ExecutorBuilder::new()
//!         .with_primary_task("agent", |ctx: TaskContext| async move {
//!             while ctx.signal().sleep(Duration::from_secs(1)).await {
//!                 println!("working");
//!             }
//!             Ok(())
//!         })
//!         .build();
//!
//!     let (faults, mut fault_rx) = tokio::sync::mpsc::channel(128);
//!     executor.start(HashMap::new(), faults)?;
//!     tokio::spawn(async move {
//!         while let Some(fault) = fault_rx.recv().await {
//!             eprintln!("{fault}");
//!         }
//!     });
//!
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     executor.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## What you get
//!
//! * **Fault isolation**: a panicking or failing task produces a [`FaultRecord`] on
//!   the fault channel. Delivery never blocks, and a record is dropped when the channel is full.
//! * **Tracked shutdown**: every task, nested ones included, is counted by a
//!   [`CompletionTracker`]. `stop` waits for the count to reach zero.
//! * **Bounded stop**: if tasks do not return within the shutdown timeout (2 minutes
//!   by default), `stop` fails with [`ExecutorError::ShutdownTimeout`]. The remaining
//!   tasks are left running detached, so treat that error as a resource leak.
//! * **Restartable**: each `start` uses a fresh signal and tracker.
//!
//! Cancellation is cooperative. Tasks must check their [`ShutdownSignal`] at loop
//! boundaries. Tasks do not restart after a fault.

pub use executor::{
    builder::ExecutorBuilder, error::ExecutorError, ExecutorState, SupervisedExecutor,
};
pub use fault::{FaultKind, FaultRecord, FaultSink};
pub use signal::ShutdownSignal;
pub use spawner::Spawner;
pub use task::{TaskContext, TaskError, TaskResult};
pub use tracker::{CompletionGuard, CompletionTracker};

mod executor;
mod fault;
mod log;
mod signal;
mod spawner;
mod task;
mod tracker;

pub type TaskName = String;

/// Options handed to `start`, passed through to the setup hook and task bodies.
pub type Settings = std::collections::HashMap<String, String>;
