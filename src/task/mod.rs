use std::{future::Future, pin::Pin, sync::Arc};

use tokio::task::JoinHandle;

use crate::{signal::ShutdownSignal, spawner::Spawner, Settings, TaskName};

pub type TaskError = anyhow::Error;

pub type TaskResult = Result<(), TaskError>;

/// Everything a task body gets from the executor run that spawned it.
///
/// Bodies should check [`signal`](Self::signal) at every loop boundary and
/// return once it trips. Nested tasks go through [`spawn`](Self::spawn) so
/// they share the same signal and count towards the same shutdown wait.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use task_executor::{TaskContext, TaskResult};
///
/// async fn poller(ctx: TaskContext) -> TaskResult {
///     while ctx.signal().sleep(Duration::from_secs(1)).await {
///         println!("still running");
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TaskContext {
    name: TaskName,
    spawner: Spawner,
}

impl TaskContext {
    pub(crate) fn new(name: TaskName, spawner: Spawner) -> Self {
        Self { name, spawner }
    }

    /// Name this task was spawned under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Settings passed to `start`, untouched by the executor.
    pub fn settings(&self) -> &Settings {
        self.spawner.settings()
    }

    pub fn signal(&self) -> &ShutdownSignal {
        self.spawner.signal()
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    /// Spawns a nested task named `<this task>/<name>` within the same run.
    pub fn spawn<F, Fut>(&self, name: &str, body: F) -> JoinHandle<()>
    where
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        self.spawner.spawn(format!("{}/{}", self.name, name), body)
    }
}

pub(crate) type BoxTaskFuture = Pin<Box<dyn Future<Output = TaskResult> + Send + 'static>>;

/// Reusable task body; called once per executor run.
pub(crate) type DynTaskFn = Arc<dyn Fn(TaskContext) -> BoxTaskFuture + Send + Sync + 'static>;

pub(crate) fn boxed_task_fn<F, Fut>(body: F) -> DynTaskFn
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TaskResult> + Send + 'static,
{
    Arc::new(move |ctx: TaskContext| Box::pin(body(ctx)) as BoxTaskFuture)
}
