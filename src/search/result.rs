//! Search result types and statistics

use crate::dsl::Composition;
use crate::search::node::ProgramStep;
use serde::{Serialize, Serializer};
use std::time::Duration;

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

/// A program that maps the inputs onto the target
#[derive(Debug, Clone)]
pub struct Solution {
    /// Decision trace from the root
    pub program: Vec<ProgramStep>,
    /// Zero-based search level at which the solution was found
    pub depth: usize,
    /// Executable form of the program
    pub composition: Composition,
    /// Accumulated log-rank of the solution node
    pub rank: f64,
}

/// Terminal state of a search
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Solved(Solution),
    /// Every iteration finished without a solution
    Exhausted,
    /// The cancellation token was set
    Cancelled,
}

impl SearchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SearchOutcome::Solved(_) => "solved",
            SearchOutcome::Exhausted => "exhausted",
            SearchOutcome::Cancelled => "cancelled",
        }
    }
}

/// Result of a search operation
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub statistics: SearchStatistics,
}

impl SearchResult {
    pub fn new(outcome: SearchOutcome, statistics: SearchStatistics) -> Self {
        Self {
            outcome,
            statistics,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match &self.outcome {
            SearchOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn program(&self) -> Option<&[ProgramStep]> {
        self.solution().map(|s| s.program.as_slice())
    }

    pub fn depth(&self) -> Option<usize> {
        self.solution().map(|s| s.depth)
    }

    pub fn composition(&self) -> Option<&Composition> {
        self.solution().map(|s| &s.composition)
    }

    /// Serializable view for `--json` output
    pub fn report(&self) -> SearchReport<'_> {
        let composition = self.composition();
        SearchReport {
            outcome: self.outcome.label(),
            program: self.program(),
            depth: self.depth(),
            composition: composition.map(Composition::to_string),
            output: composition
                .and_then(|c| c.evaluate().ok())
                .map(|slot| slot.to_string()),
            rank: self.solution().map(|s| s.rank),
            statistics: &self.statistics,
        }
    }
}

/// JSON shape of a search result
#[derive(Debug, Serialize)]
pub struct SearchReport<'a> {
    pub outcome: &'static str,
    pub program: Option<&'a [ProgramStep]>,
    pub depth: Option<usize>,
    pub composition: Option<String>,
    /// What the composition evaluates to on the inputs
    pub output: Option<String>,
    pub rank: Option<f64>,
    pub statistics: &'a SearchStatistics,
}

/// Statistics from a search operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStatistics {
    /// Total time spent searching
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed_time: Duration,
    /// Number of widening iterations started
    pub iterations_run: u32,
    /// Beam width used by each iteration started
    pub beam_widths: Vec<usize>,
    /// Number of levels expanded across all iterations
    pub levels_expanded: u64,
    /// Number of frontier nodes handed to the child generator
    pub nodes_expanded: u64,
    /// Expansions where the scorer returned the zero sentinel
    pub unscoreable_states: u64,
    /// Children produced by successful evaluation
    pub children_generated: u64,
    /// Candidates dropped because the combinator did not apply
    pub candidates_rejected: u64,
    /// Children discarded as leaves
    pub leaves_pruned: u64,
    /// Leaves whose lists are already shorter than the target
    pub length_pruned: u64,
    /// Children admitted into a frontier
    pub nodes_admitted: u64,
    /// Largest frontier observed
    pub peak_frontier: usize,
}

impl SearchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get children generated per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.children_generated as f64 / secs
        }
    }

    /// Fraction of candidates that failed to evaluate (0.0 to 1.0)
    pub fn rejection_rate(&self) -> f64 {
        let attempted = self.children_generated + self.candidates_rejected;
        if attempted == 0 {
            0.0
        } else {
            self.candidates_rejected as f64 / attempted as f64
        }
    }

    /// Fold another run's counters into this one
    pub fn merge(&mut self, other: &SearchStatistics) {
        self.elapsed_time += other.elapsed_time;
        self.iterations_run += other.iterations_run;
        self.levels_expanded += other.levels_expanded;
        self.nodes_expanded += other.nodes_expanded;
        self.unscoreable_states += other.unscoreable_states;
        self.children_generated += other.children_generated;
        self.candidates_rejected += other.candidates_rejected;
        self.leaves_pruned += other.leaves_pruned;
        self.length_pruned += other.length_pruned;
        self.nodes_admitted += other.nodes_admitted;
        self.peak_frontier = self.peak_frontier.max(other.peak_frontier);
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!(
            "Iterations: {} (beam widths {:?})\n",
            self.iterations_run, self.beam_widths
        ));
        s.push_str(&format!("Levels expanded: {}\n", self.levels_expanded));
        s.push_str(&format!("Nodes expanded: {}\n", self.nodes_expanded));
        s.push_str(&format!(
            "Children generated: {}\n",
            self.children_generated
        ));
        s.push_str(&format!(
            "Throughput: {:.0} children/sec\n",
            self.throughput()
        ));

        if self.candidates_rejected > 0 {
            s.push_str(&format!(
                "Rejected candidates: {} ({:.2}%)\n",
                self.candidates_rejected,
                self.rejection_rate() * 100.0
            ));
        }

        s.push_str(&format!(
            "Leaves pruned: {} ({} by length)\n",
            self.leaves_pruned, self.length_pruned
        ));

        if self.unscoreable_states > 0 {
            s.push_str(&format!(
                "Unscoreable states: {}\n",
                self.unscoreable_states
            ));
        }

        s.push_str(&format!("Peak frontier: {}\n", self.peak_frontier));
        s
    }
}

impl std::fmt::Display for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            SearchOutcome::Solved(solution) => {
                writeln!(f, "Solution found at depth {}:", solution.depth)?;
                for (i, step) in solution.program.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, step)?;
                }
                writeln!(f, "Composition: {}", solution.composition)?;
                if let Ok(output) = solution.composition.evaluate() {
                    writeln!(f, "Output: {}", output)?;
                }
            }
            SearchOutcome::Exhausted => {
                writeln!(f, "No solution found.")?;
            }
            SearchOutcome::Cancelled => {
                writeln!(f, "Search cancelled.")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{Combinator, Operand, Slot, Value};

    fn sample_solution() -> Solution {
        let input = Operand::Input(Slot::single(Value::ints(&[1, 2, 3])));
        Solution {
            program: vec![ProgramStep::new(Combinator::Sum, vec![0])],
            depth: 0,
            composition: Composition::new(Combinator::Sum, vec![input]),
            rank: -3.0,
        }
    }

    #[test]
    fn test_exhausted_result_is_empty() {
        let result = SearchResult::new(SearchOutcome::Exhausted, SearchStatistics::default());

        assert!(result.solution().is_none());
        assert!(result.program().is_none());
        assert!(result.depth().is_none());
        assert!(result.composition().is_none());
        assert_eq!(result.to_string(), "No solution found.\n");
    }

    #[test]
    fn test_solved_result_accessors() {
        let result = SearchResult::new(
            SearchOutcome::Solved(sample_solution()),
            SearchStatistics::default(),
        );

        assert!(result.solution().is_some());
        assert_eq!(result.depth(), Some(0));
        assert_eq!(result.program().map(<[ProgramStep]>::len), Some(1));
        assert_eq!(result.composition().unwrap().to_string(), "sum([1, 2, 3])");
        let text = result.to_string();
        assert!(text.contains("1. sum @ [0]"));
        assert!(text.contains("Output: 6\n"));
    }

    #[test]
    fn test_report_json() {
        let result = SearchResult::new(
            SearchOutcome::Solved(sample_solution()),
            SearchStatistics::default(),
        );
        let json: serde_json::Value = serde_json::to_value(result.report()).unwrap();

        assert_eq!(json["outcome"], "solved");
        assert_eq!(json["depth"], 0);
        assert_eq!(json["program"][0]["combinator"], "sum");
        assert_eq!(json["composition"], "sum([1, 2, 3])");
        assert_eq!(json["output"], "6");
        assert_eq!(json["statistics"]["elapsed_ms"], 0.0);

        let cancelled = SearchResult::new(SearchOutcome::Cancelled, SearchStatistics::default());
        let json = serde_json::to_value(cancelled.report()).unwrap();
        assert_eq!(json["outcome"], "cancelled");
        assert!(json["program"].is_null());
        assert!(json["output"].is_null());
    }

    #[test]
    fn test_statistics_rates() {
        let mut stats = SearchStatistics::default();
        stats.children_generated = 30;
        stats.candidates_rejected = 10;
        stats.elapsed_time = Duration::from_secs(10);

        assert!((stats.rejection_rate() - 0.25).abs() < 1e-10);
        assert!((stats.throughput() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_statistics_zero_division() {
        let stats = SearchStatistics::default();
        assert_eq!(stats.rejection_rate(), 0.0);
        assert_eq!(stats.throughput(), 0.0);
    }

    #[test]
    fn test_statistics_merge() {
        let mut total = SearchStatistics::default();
        let mut run = SearchStatistics::default();
        run.children_generated = 5;
        run.length_pruned = 2;
        run.peak_frontier = 7;
        total.merge(&run);
        total.merge(&run);

        assert_eq!(total.children_generated, 10);
        assert_eq!(total.length_pruned, 4);
        assert_eq!(total.peak_frontier, 7);
        assert!(total.format_summary().contains("Leaves pruned: 0 (4 by length)"));
    }
}
