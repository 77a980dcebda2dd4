//! Batch execution: many independent searches on worker threads.
//!
//! # Architecture
//!
//! - A **coordinator** spawns workers, enforces the batch timeout and
//!   collects one outcome per task
//! - **Workers** pull task indices from a shared queue and run a fresh
//!   beam search per task
//! - A shared **cancellation token** stops every running search at once
//!
//! # Example
//!
//! ```ignore
//! let config = BatchConfig::default()
//!     .with_workers(4)
//!     .with_timeout_option(Some(Duration::from_secs(60)));
//!
//! let result = run_batch(&tasks, &grammar, &search_config, &config);
//! println!("{}", result.summary.format_summary());
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;

pub use config::BatchConfig;
pub use coordinator::{TaskOutcome, run_batch};
