//! Independent workers sharing a runtime by yielding after every step.

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::trace;

use crate::errors::NoteError;

/// One progress line emitted by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLine {
    pub worker: usize,
    pub iteration: usize,
    pub line: String,
}

/// Renders a progress line: the worker's column marker, its number, the
/// iteration and a bar as long as the iteration count.
pub fn format_work(worker: usize, iteration: usize, workers: usize) -> String {
    format!(
        "{} █ {} th {} iter {} {}",
        "  ".repeat(worker),
        "  ".repeat(workers.saturating_sub(worker)),
        worker,
        iteration,
        "■".repeat(iteration)
    )
}

/// Spawns `workers` tasks, each emitting `iterations` lines and yielding
/// after every one. Returns all lines in the order they were emitted;
/// interleaving between workers is up to the scheduler.
pub async fn run_workers(
    workers: usize,
    iterations: usize,
) -> Result<Vec<WorkLine>, NoteError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut tasks = JoinSet::new();

    for worker in 0..workers {
        let tx = tx.clone();
        tasks.spawn(async move {
            for iteration in 0..iterations {
                let line = WorkLine {
                    worker,
                    iteration,
                    line: format_work(worker, iteration, workers),
                };
                trace!("{}", line.line);
                if tx.send(line).is_err() {
                    return;
                }
                tokio::task::yield_now().await;
            }
        });
    }
    drop(tx);

    let mut lines = Vec::with_capacity(workers * iterations);
    while let Some(line) = rx.recv().await {
        lines.push(line);
    }
    while let Some(result) = tasks.join_next().await {
        result?;
    }

    Ok(lines)
}
