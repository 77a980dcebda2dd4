//! Task queue and reporting channels for batch workers.

use crate::search::cancel::CancellationToken;
use crate::search::result::SearchResult;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

/// Message sent from workers to the coordinator.
#[derive(Debug)]
pub enum WorkerMessage {
    /// A task ran to an outcome.
    Completed {
        worker_id: usize,
        task_id: usize,
        result: SearchResult,
    },
    /// A task hit a fatal search error.
    Failed {
        worker_id: usize,
        task_id: usize,
        message: String,
    },
    /// The task queue is drained and the worker is exiting.
    Idle { worker_id: usize },
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    /// Task indices to process.
    pub tasks: Receiver<usize>,
    /// Send messages to coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
    /// Shared stop flag.
    pub cancel: CancellationToken,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from workers.
    pub from_workers: Receiver<WorkerMessage>,
    /// Shared stop flag.
    pub cancel: CancellationToken,
}

/// Create channels for `num_workers` workers over `num_tasks` queued tasks.
///
/// The queue is filled up front and closed, so workers stop once it drains.
pub fn create_channels(
    num_workers: usize,
    num_tasks: usize,
    cancel: CancellationToken,
) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    let (task_tx, task_rx) = bounded(num_tasks.max(1));
    for task_id in 0..num_tasks {
        // Capacity covers every task, so this never blocks.
        let _ = task_tx.send(task_id);
    }
    drop(task_tx);

    // Unbounded channel from workers to coordinator (workers shouldn't block)
    let (worker_tx, coordinator_rx) = unbounded();

    let workers = (0..num_workers)
        .map(|_| WorkerChannels {
            tasks: task_rx.clone(),
            to_coordinator: worker_tx.clone(),
            cancel: cancel.clone(),
        })
        .collect();

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        cancel,
    };

    (coordinator, workers)
}
