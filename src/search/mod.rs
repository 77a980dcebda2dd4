//! Neural-guided beam search over list-processing combinators
//!
//! - `node`: search tree nodes with shared parent links
//! - `rank`: per-candidate weight extraction and aggregation
//! - `children`: legal child enumeration for a node
//! - `beam`: the widening beam search driver
//! - `reconstruct`: composition rebuilding from a solution path
//! - `batch`: many tasks on worker threads

pub mod batch;
pub mod beam;
pub mod cancel;
pub mod children;
pub mod config;
pub mod node;
pub mod rank;
pub mod reconstruct;
pub mod result;

pub use beam::BeamSearch;
pub use cancel::{CancellationToken, Watchdog};
pub use config::SearchConfig;
pub use result::{SearchResult, SearchStatistics};

use crate::error::SearchError;
use crate::task::Task;

/// Trait for search algorithms that synthesize programs for a task
pub trait SearchAlgorithm {
    /// Search for a program mapping the task inputs onto its target
    ///
    /// # Arguments
    /// * `task` - Input values and target output
    /// * `cancel` - Checked cooperatively; once set the search returns `Cancelled`
    ///
    /// # Returns
    /// The outcome and statistics, or a fatal grammar/scorer mismatch
    fn search(
        &mut self,
        task: &Task,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, SearchError>;

    /// Get statistics from the most recent search
    fn statistics(&self) -> SearchStatistics;

    /// Reset the search state for a new search
    fn reset(&mut self);
}
