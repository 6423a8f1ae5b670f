use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use task_executor::{FaultRecord, FaultSink, TaskContext, TaskResult};
use tokio::sync::mpsc;

/// Shared counter the tests use to observe task bodies from the outside.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[allow(unused)]
pub fn fault_channel(capacity: usize) -> (FaultSink, mpsc::Receiver<FaultRecord>) {
    mpsc::channel(capacity)
}

/// Checks the shutdown signal every `period` and returns once it trips.
#[allow(unused)]
pub async fn poll_until_tripped(ctx: TaskContext, period: Duration, exits: Counter) -> TaskResult {
    while !ctx.signal().is_tripped() {
        tokio::time::sleep(period).await;
    }
    exits.incr();
    Ok(())
}

/// Sleeps for `duration` regardless of the shutdown signal, then returns.
#[allow(unused)]
pub async fn finish_after(duration: Duration, exits: Counter) -> TaskResult {
    tokio::time::sleep(duration).await;
    exits.incr();
    Ok(())
}

/// Panics as soon as it is polled.
#[allow(unused)]
pub async fn panic_with(message: &'static str) -> TaskResult {
    panic!("{message}");
}

/// Never returns and never looks at the shutdown signal.
#[allow(unused)]
pub async fn ignore_shutdown(_ctx: TaskContext) -> TaskResult {
    std::future::pending::<()>().await;
    Ok(())
}

#[allow(unused)]
pub fn drain(rx: &mut mpsc::Receiver<FaultRecord>) -> Vec<FaultRecord> {
    let mut records = Vec::new();
    while let Ok(record) = rx.try_recv() {
        records.push(record);
    }
    records
}

/// Blocks its worker thread without ever yielding until `release` is set.
#[allow(unused)]
pub async fn block_thread_until(release: Arc<AtomicBool>) -> TaskResult {
    while !release.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}
