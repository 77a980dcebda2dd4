//! Beam search driver
//!
//! The driver expands the frontier one level at a time, ranks every child by
//! its accumulated log-weight and keeps the best non-leaf children up to the
//! beam width. A failed iteration restarts from the root with a wider beam.

use crate::dsl::{Grammar, Slot, Target, Value};
use crate::error::SearchError;
use crate::scorer::Scorer;
use crate::search::SearchAlgorithm;
use crate::search::cancel::CancellationToken;
use crate::search::children::ChildGenerator;
use crate::search::config::SearchConfig;
use crate::search::node::SearchNode;
use crate::search::reconstruct::reconstruct;
use crate::search::result::{SearchOutcome, SearchResult, SearchStatistics, Solution};
use crate::task::Task;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Why a node was discarded instead of entering the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf {
    /// Some slot already holds a scalar
    Scalar,
    /// Some list is shorter than the target list it must become
    Overshoot,
}

/// Classify a state as a leaf, if it is one.
///
/// `min_lengths` comes from [`Target::min_lengths`].
pub fn leaf_kind(state: &[Slot], min_lengths: Option<&[usize]>) -> Option<Leaf> {
    if state.iter().any(Slot::has_scalar) {
        return Some(Leaf::Scalar);
    }
    let min_lengths = min_lengths?;
    let overshoot = state.iter().any(|slot| {
        slot.components()
            .iter()
            .zip(min_lengths)
            .any(|(value, &min)| matches!(value, Value::List(items) if items.len() < min))
    });
    overshoot.then_some(Leaf::Overshoot)
}

/// A single-slot state that matches the target.
///
/// Besides an exact match, a state whose first component equals the first
/// element of the target's first component also counts.
pub fn is_solution(state: &[Slot], target: &Target) -> bool {
    let [slot] = state else {
        return false;
    };
    if slot.components() == target.components() {
        return true;
    }
    match (
        slot.components().first(),
        target.components().first().and_then(Value::first),
    ) {
        (Some(found), Some(wanted)) => found == wanted,
        _ => false,
    }
}

/// Neural-guided beam search over the combinator grammar
pub struct BeamSearch<S: Scorer> {
    grammar: Grammar,
    config: SearchConfig,
    scorer: S,
    statistics: SearchStatistics,
}

impl<S: Scorer> BeamSearch<S> {
    pub fn new(grammar: Grammar, config: SearchConfig, scorer: S) -> Self {
        Self {
            grammar,
            config,
            scorer,
            statistics: SearchStatistics::new(),
        }
    }
}

impl<S: Scorer> SearchAlgorithm for BeamSearch<S> {
    fn search(
        &mut self,
        task: &Task,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, SearchError> {
        self.reset();
        self.config.validate()?;
        task.validate()?;
        let start_time = Instant::now();

        let outcome = run(
            &self.grammar,
            &self.config,
            &mut self.scorer,
            task,
            cancel,
            &mut self.statistics,
        );

        self.statistics.elapsed_time = start_time.elapsed();
        Ok(SearchResult::new(outcome?, self.statistics.clone()))
    }

    fn statistics(&self) -> SearchStatistics {
        self.statistics.clone()
    }

    fn reset(&mut self) {
        self.statistics = SearchStatistics::new();
    }
}

fn run<S: Scorer + ?Sized>(
    grammar: &Grammar,
    config: &SearchConfig,
    scorer: &mut S,
    task: &Task,
    cancel: &CancellationToken,
    stats: &mut SearchStatistics,
) -> Result<SearchOutcome, SearchError> {
    let inputs = task.state_tuple();
    let target = task.target();
    let min_lengths = target.min_lengths();
    let generator = ChildGenerator::new(grammar);
    let root = Rc::new(SearchNode::root(inputs.clone()));
    info!(
        scorer = scorer.name(),
        combinators = grammar.combinators().len(),
        "starting search"
    );

    for iteration in 0..config.iterations {
        let width = config.beam_width(iteration);
        stats.iterations_run += 1;
        stats.beam_widths.push(width);
        info!(iteration, width, "starting beam iteration");

        let mut frontier = vec![Rc::clone(&root)];
        for level in 0..config.max_length {
            if frontier.is_empty() {
                debug!(iteration, level, "frontier empty, ending iteration");
                break;
            }

            let mut pool = Vec::new();
            for node in &frontier {
                pool.extend(generator.expand(node, &target, scorer, stats)?);
            }
            stats.levels_expanded += 1;
            // Stable: equal ranks keep generation order.
            pool.sort_by(|a, b| b.rank.total_cmp(&a.rank));
            let pool_size = pool.len();

            let mut next = Vec::with_capacity(width.min(pool_size));
            for node in pool {
                if is_solution(&node.state, &target) {
                    let (program, composition) = reconstruct(&node, &inputs)?;
                    info!(
                        iteration,
                        level,
                        size = composition.size(),
                        nesting = composition.depth(),
                        %composition,
                        "solution found"
                    );
                    return Ok(SearchOutcome::Solved(Solution {
                        program,
                        depth: level,
                        composition,
                        rank: node.rank,
                    }));
                }

                match leaf_kind(&node.state, min_lengths.as_deref()) {
                    Some(kind) => {
                        stats.leaves_pruned += 1;
                        if kind == Leaf::Overshoot {
                            stats.length_pruned += 1;
                        }
                        trace!(?kind, rank = node.rank, "leaf discarded");
                    }
                    None => {
                        next.push(Rc::new(node));
                        stats.nodes_admitted += 1;
                    }
                }

                if cancel.is_cancelled() {
                    info!(iteration, level, "search cancelled");
                    return Ok(SearchOutcome::Cancelled);
                }
                if next.len() == width {
                    break;
                }
            }

            stats.peak_frontier = stats.peak_frontier.max(next.len());
            debug!(
                iteration,
                level,
                pool = pool_size,
                admitted = next.len(),
                "level expanded"
            );
            frontier = next;
        }
    }

    info!(iterations = config.iterations, "search exhausted");
    Ok(SearchOutcome::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{Combinator, Definition, GrammarConfig, NumOp};
    use crate::scorer::{FixedScorer, ScorerOutput, UniformScorer};

    fn ints(values: &[i64]) -> Value {
        Value::ints(values)
    }

    fn uniform_search(config: SearchConfig) -> BeamSearch<UniformScorer> {
        BeamSearch::new(Grammar::default(), config, UniformScorer)
    }

    #[test]
    fn test_leaf_on_scalar() {
        let state = vec![Slot::single(ints(&[1])), Slot::single(Value::Int(3))];
        assert_eq!(leaf_kind(&state, None), Some(Leaf::Scalar));
        assert_eq!(leaf_kind(&[Slot::single(ints(&[1]))], None), None);
    }

    #[test]
    fn test_leaf_on_overshoot() {
        let target = Target::normalize(ints(&[1, 2, 3]));
        let min = target.min_lengths();
        let take_one = vec![Slot::single(ints(&[1]))];
        let long_enough = vec![Slot::single(ints(&[7, 8, 9]))];

        assert_eq!(leaf_kind(&take_one, min.as_deref()), Some(Leaf::Overshoot));
        assert_eq!(leaf_kind(&long_enough, min.as_deref()), None);
    }

    #[test]
    fn test_solution_predicate() {
        let target = Target::normalize(ints(&[2, 4, 6]));
        assert!(is_solution(&[Slot::single(ints(&[2, 4, 6]))], &target));
        assert!(!is_solution(
            &[Slot::single(ints(&[2, 4, 6])), Slot::single(ints(&[1]))],
            &target
        ));
        // Loose match against the first target element
        assert!(is_solution(&[Slot::single(Value::Int(2))], &target));
        assert!(!is_solution(&[Slot::single(ints(&[2]))], &target));

        let scalar = Target::normalize(Value::Int(3));
        assert!(is_solution(&[Slot::single(Value::Int(3))], &scalar));
        assert!(!is_solution(&[Slot::single(ints(&[3]))], &scalar));
    }

    #[test]
    fn test_scenario_map_doubles() {
        let mut search = uniform_search(SearchConfig::default());
        let task = Task::new(vec![ints(&[1, 2, 3])], ints(&[2, 4, 6]));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert_eq!(result.depth(), Some(0));
        let program = result.program().unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(
            program[0].combinator,
            Combinator::Map {
                op: NumOp::Mul,
                number: 2
            }
        );
        assert_eq!(program[0].indices, vec![0]);
        assert_eq!(
            result.composition().unwrap().evaluate().unwrap(),
            Slot::single(ints(&[2, 4, 6]))
        );
    }

    #[test]
    fn test_scenario_zip_add() {
        let mut search = uniform_search(SearchConfig::default());
        let task = Task::new(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])], ints(&[5, 7, 9]));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert_eq!(result.depth(), Some(0));
        let step = &result.program().unwrap()[0];
        assert_eq!(step.combinator, Combinator::ZipWith { op: NumOp::Add });
        assert_eq!(step.indices, vec![0, 1]);
        assert_eq!(
            result.composition().unwrap().to_string(),
            "zip_with(+)([1, 2, 3], [4, 5, 6])"
        );
    }

    #[test]
    fn test_scenario_guided_aggregate() {
        let grammar = Grammar::default();
        let scorer = FixedScorer::uniform(&grammar).with_definition_weights(
            &grammar,
            0.01,
            &[(Definition::Length, 0.9), (Definition::Drop, 0.5)],
        );
        let mut search = BeamSearch::new(grammar, SearchConfig::default(), scorer);
        let task = Task::new(vec![ints(&[1, 2, 3, 4])], Value::Int(3));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert_eq!(result.depth(), Some(1));
        let composition = result.composition().unwrap();
        assert_eq!(composition.to_string(), "length(drop(1)([1, 2, 3, 4]))");
        assert_eq!(composition.evaluate().unwrap(), Slot::single(Value::Int(3)));
    }

    #[test]
    fn test_scenario_uniform_aggregate() {
        let mut search = uniform_search(SearchConfig::default());
        let task = Task::new(vec![ints(&[1, 2, 3, 4])], Value::Int(3));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert_eq!(result.depth(), Some(1));
        assert_eq!(
            result.composition().unwrap().to_string(),
            "sum(take(2)([1, 2, 3, 4]))"
        );
    }

    #[test]
    fn test_scenario_overshoot_is_pruned() {
        let grammar = Grammar::new(GrammarConfig {
            definitions: vec![Definition::Take, Definition::Drop],
            ..GrammarConfig::default()
        })
        .unwrap();
        let config = SearchConfig::default().with_beam_size(4).with_max_length(2);
        let mut search = BeamSearch::new(grammar, config, UniformScorer);
        let task = Task::new(vec![ints(&[1, 2])], ints(&[1, 2, 3]));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert!(matches!(result.outcome, SearchOutcome::Exhausted));
        let stats = &result.statistics;
        // Every child, copies included, holds a list shorter than three.
        assert_eq!(stats.length_pruned, 3 * 11);
        assert_eq!(stats.leaves_pruned, stats.length_pruned);
    }

    #[test]
    fn test_scenario_exhausted_after_widening() {
        let config = SearchConfig::default().with_beam_size(2).with_max_length(2);
        let mut search = uniform_search(config);
        let task = Task::new(vec![ints(&[1, 2, 3])], ints(&[100, 200, 300]));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert!(matches!(result.outcome, SearchOutcome::Exhausted));
        assert!(result.program().is_none());
        assert!(result.depth().is_none());
        assert_eq!(result.statistics.iterations_run, 3);
        assert_eq!(result.statistics.beam_widths, vec![2, 4, 8]);
        assert!(result.statistics.peak_frontier <= 8);
    }

    #[test]
    fn test_frontier_never_exceeds_width() {
        let config = SearchConfig::default()
            .with_beam_size(3)
            .with_max_length(3)
            .with_iterations(1);
        let mut search = uniform_search(config);
        let task = Task::new(vec![ints(&[1, 2, 3])], ints(&[100, 200, 300]));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert!(result.statistics.peak_frontier <= 3);
        assert!(result.statistics.nodes_admitted <= 3 * 3);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let mut search = uniform_search(SearchConfig::default());
        let task = Task::new(vec![ints(&[1, 2, 3])], ints(&[100, 200, 300]));
        let result = search.search(&task, &token).unwrap();

        assert!(matches!(result.outcome, SearchOutcome::Cancelled));
        assert_eq!(result.statistics.levels_expanded, 1);
    }

    #[test]
    fn test_loose_match_is_accepted() {
        // min([1, 2]) = 1 matches the first element of [1, 2, 3]
        let mut search = uniform_search(SearchConfig::default());
        let task = Task::new(vec![ints(&[1, 2])], ints(&[1, 2, 3]));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert_eq!(result.depth(), Some(0));
        assert_eq!(result.program().unwrap()[0].combinator, Combinator::Min);
    }

    #[test]
    fn test_invalid_inputs_are_errors() {
        let mut search = uniform_search(SearchConfig::default().with_beam_size(0));
        let task = Task::new(vec![ints(&[1])], Value::Int(1));
        assert!(matches!(
            search.search(&task, &CancellationToken::new()),
            Err(SearchError::InvalidConfig(_))
        ));

        let mut search = uniform_search(SearchConfig::default());
        let empty = Task::new(vec![], Value::Int(1));
        assert!(matches!(
            search.search(&empty, &CancellationToken::new()),
            Err(SearchError::InvalidTask(_))
        ));
    }

    #[test]
    fn test_statistics_reset_between_searches() {
        let mut search = uniform_search(SearchConfig::default());
        let task = Task::new(vec![ints(&[1, 2, 3])], ints(&[2, 4, 6]));
        search.search(&task, &CancellationToken::new()).unwrap();
        let first = search.statistics().nodes_expanded;
        search.search(&task, &CancellationToken::new()).unwrap();

        assert_eq!(search.statistics().nodes_expanded, first);
        assert_eq!(first, 1);
    }

    #[test]
    fn test_scorer_skipped_for_empty_list_frontier_nodes() {
        struct Counting(usize);

        impl Scorer for Counting {
            fn predict(&mut self, state: &[Slot], target: &Target, grammar: &Grammar) -> ScorerOutput {
                self.0 += 1;
                UniformScorer.predict(state, target, grammar)
            }

            fn name(&self) -> &'static str {
                "counting"
            }
        }

        // filter(> 3) empties the list, and a scalar target keeps such
        // nodes out of the overshoot check, so they reach the next level.
        let config = SearchConfig::default().with_max_length(2).with_iterations(1);
        let mut search = BeamSearch::new(Grammar::default(), config, Counting(0));
        let task = Task::new(vec![ints(&[1, 2, 3])], Value::Int(1000));
        let result = search.search(&task, &CancellationToken::new()).unwrap();

        assert!(matches!(result.outcome, SearchOutcome::Exhausted));
        let stats = &result.statistics;
        assert!(stats.unscoreable_states > 0);
        assert_eq!(
            search.scorer.0 as u64,
            stats.nodes_expanded - stats.unscoreable_states
        );
    }
}
