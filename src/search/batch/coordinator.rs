//! Batch coordinator that manages worker threads.

use crate::dsl::Grammar;
use crate::search::SearchAlgorithm;
use crate::search::batch::channel::{
    CoordinatorChannels, WorkerChannels, WorkerMessage, create_channels,
};
use crate::search::batch::config::BatchConfig;
use crate::search::beam::BeamSearch;
use crate::search::cancel::CancellationToken;
use crate::search::config::SearchConfig;
use crate::search::result::{SearchOutcome, SearchResult, SearchStatistics};
use crate::task::Task;
use crossbeam_channel::RecvTimeoutError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// What happened to one task of a batch
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Completed(SearchResult),
    Failed(String),
}

impl TaskOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Completed(result) => result.outcome.label(),
            TaskOutcome::Failed(_) => "failed",
        }
    }
}

/// Counts over a finished batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub solved: usize,
    pub exhausted: usize,
    pub cancelled: usize,
    pub failed: usize,
    /// Number of solutions found at each search depth
    pub depth_histogram: BTreeMap<usize, usize>,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &TaskOutcome) {
        self.total += 1;
        match outcome {
            TaskOutcome::Completed(result) => match &result.outcome {
                SearchOutcome::Solved(solution) => {
                    self.solved += 1;
                    *self.depth_histogram.entry(solution.depth).or_insert(0) += 1;
                }
                SearchOutcome::Exhausted => self.exhausted += 1,
                SearchOutcome::Cancelled => self.cancelled += 1,
            },
            TaskOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Fraction of tasks solved (0.0 to 1.0)
    pub fn solve_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.solved as f64 / self.total as f64
        }
    }

    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "Tasks: {} (solved {}, exhausted {}, cancelled {}, failed {})\n",
            self.total, self.solved, self.exhausted, self.cancelled, self.failed
        ));
        s.push_str(&format!("Solve rate: {:.2}%\n", self.solve_rate() * 100.0));
        if !self.depth_histogram.is_empty() {
            s.push_str("Solutions by depth:\n");
            for (depth, count) in &self.depth_histogram {
                s.push_str(&format!("  {}: {}\n", depth, count));
            }
        }
        s
    }
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchResult {
    /// Outcome per task, in input order.
    pub outcomes: Vec<TaskOutcome>,
    pub summary: BatchSummary,
    /// Statistics aggregated over every task.
    pub total_statistics: SearchStatistics,
    pub elapsed_time: Duration,
}

/// Run every task on a pool of worker threads.
pub fn run_batch(
    tasks: &[Task],
    grammar: &Grammar,
    search_config: &SearchConfig,
    batch_config: &BatchConfig,
) -> BatchResult {
    run_batch_with_token(
        tasks,
        grammar,
        search_config,
        batch_config,
        CancellationToken::new(),
    )
}

/// Run a batch that can also be stopped through `cancel`.
pub fn run_batch_with_token(
    tasks: &[Task],
    grammar: &Grammar,
    search_config: &SearchConfig,
    batch_config: &BatchConfig,
    cancel: CancellationToken,
) -> BatchResult {
    let start_time = Instant::now();
    let num_workers = batch_config.effective_workers(tasks.len());

    let (coordinator_channels, worker_channels) =
        create_channels(num_workers, tasks.len(), cancel);

    // Clone data for workers
    let tasks_arc = Arc::new(tasks.to_vec());
    let grammar = Arc::new(grammar.clone());
    let search_config = Arc::new(search_config.clone());
    let batch_config_arc = Arc::new(batch_config.clone());

    let worker_handles: Vec<_> = worker_channels
        .into_iter()
        .enumerate()
        .map(|(worker_id, channels)| {
            let tasks = Arc::clone(&tasks_arc);
            let grammar = Arc::clone(&grammar);
            let search_config = Arc::clone(&search_config);
            let batch_config = Arc::clone(&batch_config_arc);

            std::thread::spawn(move || {
                run_worker(
                    worker_id,
                    &tasks,
                    &grammar,
                    &search_config,
                    &batch_config,
                    channels,
                )
            })
        })
        .collect();

    let outcomes = run_coordinator(
        tasks.len(),
        num_workers,
        coordinator_channels,
        batch_config,
        start_time,
    );

    for handle in worker_handles {
        if handle.join().is_err() {
            warn!("batch worker panicked");
        }
    }

    let mut summary = BatchSummary::default();
    let mut total_statistics = SearchStatistics::default();
    for outcome in &outcomes {
        summary.record(outcome);
        if let TaskOutcome::Completed(result) = outcome {
            total_statistics.merge(&result.statistics);
        }
    }

    BatchResult {
        outcomes,
        summary,
        total_statistics,
        elapsed_time: start_time.elapsed(),
    }
}

/// Coordinator loop that collects per-task results from workers.
fn run_coordinator(
    num_tasks: usize,
    num_workers: usize,
    channels: CoordinatorChannels,
    config: &BatchConfig,
    start_time: Instant,
) -> Vec<TaskOutcome> {
    let mut outcomes: Vec<Option<TaskOutcome>> = vec![None; num_tasks];
    let mut idle_workers = 0;
    let deadline = config.timeout.map(|t| start_time + t);

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) && !channels.cancel.is_cancelled() {
            debug!("batch timeout reached, cancelling remaining tasks");
            channels.cancel.cancel();
        }

        // Receive with timeout to allow periodic deadline checks
        match channels.from_workers.recv_timeout(Duration::from_millis(50)) {
            Ok(WorkerMessage::Completed {
                worker_id,
                task_id,
                result,
            }) => {
                debug!(worker_id, task_id, outcome = result.outcome.label(), "task finished");
                outcomes[task_id] = Some(TaskOutcome::Completed(result));
            }
            Ok(WorkerMessage::Failed {
                worker_id,
                task_id,
                message,
            }) => {
                warn!(worker_id, task_id, %message, "task failed");
                outcomes[task_id] = Some(TaskOutcome::Failed(message));
            }
            Ok(WorkerMessage::Idle { worker_id }) => {
                debug!(worker_id, "worker idle");
                idle_workers += 1;
                if idle_workers >= num_workers {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    outcomes
        .into_iter()
        .map(|o| o.unwrap_or_else(|| TaskOutcome::Failed("worker exited before reporting".into())))
        .collect()
}

/// Worker function that pulls tasks until the queue is drained.
fn run_worker(
    worker_id: usize,
    tasks: &[Task],
    grammar: &Grammar,
    search_config: &SearchConfig,
    batch_config: &BatchConfig,
    channels: WorkerChannels,
) {
    for task_id in channels.tasks.iter() {
        let message = if channels.cancel.is_cancelled() {
            WorkerMessage::Completed {
                worker_id,
                task_id,
                result: SearchResult::new(SearchOutcome::Cancelled, SearchStatistics::default()),
            }
        } else {
            let seed = batch_config.task_seed(task_id).or(search_config.seed);
            let scorer = search_config.scorer.build(seed);
            let mut search = BeamSearch::new(grammar.clone(), search_config.clone(), scorer);
            match search.search(&tasks[task_id], &channels.cancel) {
                Ok(result) => WorkerMessage::Completed {
                    worker_id,
                    task_id,
                    result,
                },
                Err(err) => WorkerMessage::Failed {
                    worker_id,
                    task_id,
                    message: err.to_string(),
                },
            }
        };
        let _ = channels.to_coordinator.send(message);
    }

    let _ = channels.to_coordinator.send(WorkerMessage::Idle { worker_id });
}
