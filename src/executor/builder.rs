use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    task::{boxed_task_fn, TaskContext, TaskResult},
    Settings, SupervisedExecutor,
};

use super::{NamedTask, SetupFn};

pub(crate) const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(120);

/// Builds a [`SupervisedExecutor`].
///
/// Task bodies are registered once here and spawned again on every `start`.
pub struct ExecutorBuilder {
    setup: SetupFn,
    auxiliary: Vec<NamedTask>,
    primary: Option<NamedTask>,
    shutdown_timeout: Duration,
}

impl ExecutorBuilder {
    /// Creates a builder with no tasks, a no-op setup and a 2 minute shutdown timeout.
    pub fn new() -> Self {
        Self {
            setup: Arc::new(|_| Ok(())),
            auxiliary: Vec::new(),
            primary: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Sets the hook run synchronously at the beginning of every `start`.
    ///
    /// If it fails, `start` returns the error and spawns nothing.
    pub fn with_setup<S>(mut self, setup: S) -> Self
    where
        S: Fn(&Settings) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.setup = Arc::new(setup);
        self
    }

    /// Adds an auxiliary background task. Auxiliary tasks are spawned before the primary one.
    pub fn with_task<F, Fut>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        self.auxiliary.push(NamedTask {
            name: name.into(),
            body: boxed_task_fn(body),
        });
        self
    }

    /// Sets the primary long-running task, replacing any previous one.
    pub fn with_primary_task<F, Fut>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        self.primary = Some(NamedTask {
            name: name.into(),
            body: boxed_task_fn(body),
        });
        self
    }

    /// Sets how long `stop` waits for tasks before giving up.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn build(self) -> SupervisedExecutor {
        let mut tasks = self.auxiliary;
        tasks.extend(self.primary);
        SupervisedExecutor::new(self.setup, tasks, self.shutdown_timeout)
    }
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
