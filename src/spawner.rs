use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{runtime::Handle, sync::mpsc::error::TrySendError, task::JoinHandle};

use crate::{
    fault::{self, FaultRecord, FaultSink},
    log,
    signal::ShutdownSignal,
    task::{TaskContext, TaskResult},
    tracker::CompletionTracker,
    Settings, TaskName,
};

/// Spawns task bodies onto the runtime with fault isolation.
///
/// Every spawn is registered with the run's [`CompletionTracker`] before the
/// body is scheduled and released when the body finishes, whether it returned
/// normally, returned an error or panicked. Failures are turned into a
/// [`FaultRecord`] and offered to the fault sink without blocking.
#[derive(Debug, Clone)]
pub struct Spawner {
    runtime: Handle,
    tracker: CompletionTracker,
    signal: ShutdownSignal,
    faults: FaultSink,
    settings: Arc<Settings>,
}

impl Spawner {
    pub(crate) fn new(
        runtime: Handle,
        tracker: CompletionTracker,
        signal: ShutdownSignal,
        faults: FaultSink,
        settings: Arc<Settings>,
    ) -> Self {
        fault::install_backtrace_hook();
        Self {
            runtime,
            tracker,
            signal,
            faults,
            settings,
        }
    }

    pub fn signal(&self) -> &ShutdownSignal {
        &self.signal
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    /// Spawns `body` as its own task and returns without waiting for it.
    ///
    /// A panic or error inside `body` never escapes this task.
    pub fn spawn<F, Fut>(&self, name: impl Into<TaskName>, body: F) -> JoinHandle<()>
    where
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        let name = name.into();
        // Registered here, on the spawning side, so a concurrent wait can
        // never observe the task as missing.
        let guard = self.tracker.register();
        let ctx = TaskContext::new(name.clone(), self.clone());
        let faults = self.faults.clone();

        log::debug!(task = %name, "spawning task");
        self.runtime.spawn(async move {
            let outcome = AssertUnwindSafe(async move { body(ctx).await })
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(())) => {
                    log::debug!(task = %name, "task returned");
                }
                Ok(Err(error)) => deliver(&faults, FaultRecord::from_error(name, error)),
                Err(payload) => deliver(&faults, FaultRecord::from_panic(name, payload)),
            }
            guard.mark_done();
        })
    }
}

/// Best-effort, non-blocking hand-off to the fault sink.
fn deliver(faults: &FaultSink, record: FaultRecord) {
    log::error!(
        task = %record.task_name(),
        kind = %record.kind(),
        "task faulted: {}",
        record.message()
    );
    match faults.try_send(record) {
        Ok(()) => {}
        Err(TrySendError::Full(_dropped)) => {
            log::warning!(
                task = %_dropped.task_name(),
                "fault channel full, dropping fault record"
            );
        }
        Err(TrySendError::Closed(_dropped)) => {
            log::warning!(
                task = %_dropped.task_name(),
                "fault channel closed, dropping fault record"
            );
        }
    }
}
