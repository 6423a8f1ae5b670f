use std::{
    any::Any,
    backtrace::{Backtrace, BacktraceStatus},
    cell::RefCell,
    sync::Once,
};

use tokio::sync::mpsc;

use crate::{task::TaskError, TaskName};

/// Bounded channel receiving intercepted task faults.
///
/// The executor only ever calls `try_send` on it: when the channel is full the
/// record is dropped instead of blocking the faulting task.
pub type FaultSink = mpsc::Sender<FaultRecord>;

/// How a spawned task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The task body panicked.
    Panic,
    /// The task body returned an error.
    Error,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Panic => write!(f, "panic"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One fault intercepted at a spawned task's boundary.
#[derive(Debug, Clone)]
pub struct FaultRecord {
    task_name: TaskName,
    kind: FaultKind,
    message: String,
    backtrace: Option<String>,
}

impl FaultRecord {
    pub(crate) fn from_panic(task_name: TaskName, payload: Box<dyn Any + Send>) -> Self {
        Self {
            task_name,
            kind: FaultKind::Panic,
            message: panic_message(payload.as_ref()),
            backtrace: take_panic_backtrace(),
        }
    }

    pub(crate) fn from_error(task_name: TaskName, error: TaskError) -> Self {
        let backtrace = match error.backtrace().status() {
            BacktraceStatus::Captured => Some(error.backtrace().to_string()),
            _ => None,
        };
        Self {
            task_name,
            kind: FaultKind::Error,
            message: format!("{error:#}"),
            backtrace,
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Backtrace taken where the fault was raised.
    ///
    /// Only present when backtraces are enabled (`RUST_BACKTRACE`) and, for
    /// panics, when the crate's panic hook has not been replaced.
    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }
}

impl std::fmt::Display for FaultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task '{}' {}: {}", self.task_name, self.kind, self.message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

thread_local! {
    static PANIC_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Chains a panic hook that stashes the panicking thread's backtrace.
///
/// The catch boundary polls the task on the thread that panicked, so the
/// thread-local is still there when the record is built.
pub(crate) fn install_backtrace_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::capture();
            if backtrace.status() == BacktraceStatus::Captured {
                let _ = PANIC_BACKTRACE
                    .try_with(|slot| *slot.borrow_mut() = Some(backtrace.to_string()));
            }
            previous(info);
        }));
    });
}

fn take_panic_backtrace() -> Option<String> {
    PANIC_BACKTRACE
        .try_with(|slot| slot.borrow_mut().take())
        .ok()
        .flatten()
}
