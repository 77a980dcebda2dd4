//! Configuration for the beam search driver

use crate::error::SearchError;
use crate::scorer::ScorerKind;
use std::time::Duration;

/// Beam search parameters
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Frontier capacity of the first iteration
    pub beam_size: usize,
    /// Maximum number of combinator applications in a program
    pub max_length: usize,
    /// Number of restarts from the root, each with a wider beam
    pub iterations: u32,
    /// Multiplier applied to the beam width between iterations
    pub widening_factor: usize,
    /// Scorer used to rank candidates
    pub scorer: ScorerKind,
    /// Seed for the random scorer (None = OS entropy)
    pub seed: Option<u64>,
    /// Wall-clock limit after which the search is cancelled
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            beam_size: 100,
            max_length: 6,
            iterations: 3,
            widening_factor: 2,
            scorer: ScorerKind::default(),
            seed: None,
            timeout: None,
        }
    }
}

impl SearchConfig {
    pub fn with_beam_size(mut self, beam_size: usize) -> Self {
        self.beam_size = beam_size;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_widening_factor(mut self, factor: usize) -> Self {
        self.widening_factor = factor;
        self
    }

    pub fn with_scorer(mut self, scorer: ScorerKind) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Beam width of iteration `k`: `beam_size * widening_factor^k`
    pub fn beam_width(&self, iteration: u32) -> usize {
        self.widening_factor
            .saturating_pow(iteration)
            .saturating_mul(self.beam_size)
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.beam_size == 0 {
            return Err(SearchError::InvalidConfig(
                "beam size must be at least 1".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(SearchError::InvalidConfig(
                "at least one iteration is required".to_string(),
            ));
        }
        // Each restart must explore a strictly wider frontier.
        if self.widening_factor < 2 {
            return Err(SearchError::InvalidConfig(
                "widening factor must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
