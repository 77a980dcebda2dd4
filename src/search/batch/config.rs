//! Configuration for batch execution

use std::time::Duration;

/// Configuration for running many tasks concurrently.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// Overall timeout; unfinished tasks are cancelled when it elapses.
    pub timeout: Option<Duration>,
    /// Base random seed (each task gets seed + task index).
    pub base_seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            timeout: None,
            base_seed: None,
        }
    }
}

impl BatchConfig {
    /// Set the number of workers (at least one).
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.base_seed = seed;
        self
    }

    /// Seed for the scorer of task `task_id`
    pub fn task_seed(&self, task_id: usize) -> Option<u64> {
        self.base_seed.map(|s| s.wrapping_add(task_id as u64))
    }

    /// Workers actually spawned for `num_tasks` tasks
    pub fn effective_workers(&self, num_tasks: usize) -> usize {
        self.num_workers.min(num_tasks).max(1)
    }
}
