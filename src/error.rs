//! Error types for search and task loading

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort a search.
///
/// Inapplicable combinators, exhaustion and cancellation are normal outcomes
/// and never show up here.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("combinator {0} is not registered in the grammar alphabets")]
    UnknownCombinator(String),

    #[error("scorer returned {len} weights for {slot}, index {index} requested")]
    WeightOutOfRange {
        slot: &'static str,
        index: usize,
        len: usize,
    },

    #[error("invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("failed to rebuild solution: {0}")]
    Reconstruction(String),
}

/// Problems loading tasks or grammar files
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },
}
