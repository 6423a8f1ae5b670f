pub(crate) mod builder;
pub(crate) mod error;

use std::{sync::Arc, time::Duration};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::{
    fault::FaultSink,
    log,
    signal::ShutdownSignal,
    spawner::Spawner,
    task::DynTaskFn,
    tracker::CompletionTracker,
    ExecutorError, Settings, TaskName,
};

pub(crate) type SetupFn = Arc<dyn Fn(&Settings) -> anyhow::Result<()> + Send + Sync + 'static>;

pub(crate) struct NamedTask {
    pub(crate) name: TaskName,
    pub(crate) body: DynTaskFn,
}

/// Lifecycle state of a [`SupervisedExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Running,
    Stopping,
}

impl std::fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}

/// Per-run state, allocated fresh on every `start`.
struct Run {
    token: CancellationToken,
    tracker: CompletionTracker,
}

/// Starts a fixed set of tasks, reports their faults and shuts them down within a deadline.
///
/// Each `start` gets a fresh shutdown signal and completion tracker, so a
/// stopped executor can be started again without leftovers from the previous run.
/// `stop` trips the signal and waits for every task of the run, nested ones
/// included, to return.
///
/// Dropping a running executor trips its signal but does not wait.
///
/// Run it on a multi-thread runtime. A task body that blocks its worker thread
/// (a busy loop, `std::thread::sleep`) starves a `current_thread` runtime, and
/// `stop` can then never observe its own deadline.
pub struct SupervisedExecutor {
    setup: SetupFn,
    tasks: Vec<NamedTask>,
    shutdown_timeout: Duration,
    state: ExecutorState,
    run: Option<Run>,
}

impl SupervisedExecutor {
    pub(crate) fn new(setup: SetupFn, tasks: Vec<NamedTask>, shutdown_timeout: Duration) -> Self {
        Self {
            setup,
            tasks,
            shutdown_timeout,
            state: ExecutorState::Idle,
            run: None,
        }
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Tasks of the current (or most recent) run that have not returned yet.
    ///
    /// After a timed-out `stop` this still counts the stragglers until the next `start`.
    pub fn in_flight(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.tracker.in_flight())
    }

    /// Runs setup, then spawns every task. Must be called from within a Tokio runtime.
    ///
    /// Tasks run on the caller's runtime. The shutdown deadline only holds against
    /// bodies that block their thread when that runtime is multi-threaded.
    ///
    /// Task faults never surface here; they go to `faults` on a best-effort basis.
    pub fn start(&mut self, settings: Settings, faults: FaultSink) -> Result<(), ExecutorError> {
        if self.state != ExecutorState::Idle {
            return Err(ExecutorError::InvalidState {
                action: "start",
                state: self.state,
            });
        }
        let runtime = Handle::try_current().map_err(|_| ExecutorError::NoRuntime)?;

        let token = CancellationToken::new();
        let tracker = CompletionTracker::new();
        self.run = Some(Run {
            token: token.clone(),
            tracker: tracker.clone(),
        });

        let settings = Arc::new(settings);
        if let Err(error) = (self.setup)(&settings) {
            log::error!("executor setup failed: {error:#}");
            return Err(ExecutorError::Setup(error));
        }

        let spawner = Spawner::new(
            runtime,
            tracker,
            ShutdownSignal::new(token),
            faults,
            settings,
        );
        for task in &self.tasks {
            let body = task.body.clone();
            spawner.spawn(task.name.clone(), move |ctx| body(ctx));
        }

        self.state = ExecutorState::Running;
        log::info!(tasks = self.tasks.len(), "executor started");
        Ok(())
    }

    /// Trips the shutdown signal and waits for all tasks of the run to return.
    ///
    /// Returns [`ExecutorError::ShutdownTimeout`] if they have not all returned
    /// within the shutdown timeout. Stragglers are not killed; the executor goes
    /// back to idle and stops tracking them. Stopping an idle executor is a no-op.
    pub async fn stop(&mut self) -> Result<(), ExecutorError> {
        let Some(run) = &self.run else {
            self.state = ExecutorState::Idle;
            return Ok(());
        };
        match self.state {
            ExecutorState::Idle => return Ok(()),
            ExecutorState::Running => {
                log::info!(in_flight = run.tracker.in_flight(), "stopping executor");
                run.token.cancel();
                self.state = ExecutorState::Stopping;
            }
            // A previous stop was dropped mid-wait; the signal is already tripped.
            ExecutorState::Stopping => {}
        }

        let waited = tokio::time::timeout(self.shutdown_timeout, run.tracker.wait_all()).await;
        self.state = ExecutorState::Idle;
        match waited {
            Ok(()) => {
                log::info!("executor stopped");
                Ok(())
            }
            Err(_) => {
                let in_flight = run.tracker.in_flight();
                log::warning!(
                    in_flight,
                    timeout = ?self.shutdown_timeout,
                    "timed out waiting for shutdown, abandoning remaining tasks"
                );
                Err(ExecutorError::ShutdownTimeout {
                    timeout: self.shutdown_timeout,
                    in_flight,
                })
            }
        }
    }
}

impl Drop for SupervisedExecutor {
    fn drop(&mut self) {
        if self.state == ExecutorState::Idle {
            return;
        }
        if let Some(run) = &self.run {
            log::debug!("dropping executor while {}, tripping shutdown signal", self.state);
            run.token.cancel();
        }
    }
}

impl std::fmt::Debug for SupervisedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupervisedExecutor")
            .field("state", &self.state)
            .field("tasks", &self.tasks.iter().map(|t| &t.name).collect::<Vec<_>>())
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
