use std::{collections::HashMap, time::Duration};

use task_executor::{ExecutorBuilder, TaskContext, TaskResult};

async fn periodic(ctx: TaskContext) -> TaskResult {
    while ctx.signal().sleep(Duration::from_secs(5)).await {
        println!("⏱️  {} tick", ctx.name());
    }
    Ok(())
}

async fn run_agent(ctx: TaskContext) -> TaskResult {
    ctx.spawn("periodic", periodic);

    let mut i = 0;
    while !ctx.signal().is_tripped() {
        println!("Running iteration {i}...");
        i += 1;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let mut executor = ExecutorBuilder::new()
        .with_setup(|_settings| Ok(()))
        .with_task("periodic", periodic)
        .with_primary_task("agent", run_agent)
        .build();

    let (faults, mut fault_rx) = tokio::sync::mpsc::channel(128);
    tokio::spawn(async move {
        while let Some(fault) = fault_rx.recv().await {
            eprintln!("💥 {fault}");
        }
    });

    for cycle in 1..=2 {
        if let Err(e) = executor.start(HashMap::new(), faults.clone()) {
            panic!("Error starting: {e}");
        }
        println!("Cycle {cycle} started");
        tokio::time::sleep(Duration::from_secs(3)).await;

        if let Err(e) = executor.stop().await {
            panic!("Error stopping: {e}");
        }
        println!("Cycle {cycle} stopped 🫡");
    }
}
