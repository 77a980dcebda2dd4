//! Child generation over the combinator grammar

use crate::dsl::{Category, Combinator, Grammar, Target, apply_to_state};
use crate::error::SearchError;
use crate::scorer::{self, Scorer};
use crate::search::node::{ProgramStep, SearchNode};
use crate::search::rank::RankAssigner;
use crate::search::result::SearchStatistics;
use std::rc::Rc;
use tracing::trace;

/// Index tuples for a pairwise combinator over `len` slots.
///
/// Commutative operators use unordered pairs; otherwise both orders are tried.
pub fn index_pairs(len: usize, commutative: bool) -> Vec<Vec<usize>> {
    let mut pairs = Vec::new();
    for a in 0..len {
        for b in 0..len {
            if a == b || (commutative && b < a) {
                continue;
            }
            pairs.push(vec![a, b]);
        }
    }
    pairs
}

/// Operand index sets to try for `combinator` on a tuple of `len` slots
fn operand_sets(combinator: &Combinator, len: usize) -> Vec<Vec<usize>> {
    match combinator.category() {
        Category::Pairwise => {
            let commutative = combinator.num_op().is_none_or(|op| op.is_commutative());
            index_pairs(len, commutative)
        }
        // Aggregates only finish a computation.
        Category::Aggregate if len != 1 => Vec::new(),
        _ => (0..len).map(|i| vec![i]).collect(),
    }
}

/// Enumerates the legal, ranked children of a search node
#[derive(Debug, Clone, Copy)]
pub struct ChildGenerator<'g> {
    grammar: &'g Grammar,
    ranker: RankAssigner<'g>,
}

impl<'g> ChildGenerator<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            ranker: RankAssigner::new(grammar),
        }
    }

    /// Expand `parent` into every child whose combinator applies.
    ///
    /// The scorer is queried once for the parent state. Candidates that fail
    /// to evaluate are dropped and counted in `stats`.
    pub fn expand<S: Scorer + ?Sized>(
        &self,
        parent: &Rc<SearchNode>,
        target: &Target,
        scorer: &mut S,
        stats: &mut SearchStatistics,
    ) -> Result<Vec<SearchNode>, SearchError> {
        stats.nodes_expanded += 1;
        let weights = scorer::score(scorer, &parent.state, target, self.grammar);
        if weights.is_unscoreable() {
            stats.unscoreable_states += 1;
            trace!(depth = parent.depth, "scorer returned the zero sentinel");
        }

        let mut children = Vec::new();
        for combinator in self.grammar.combinators() {
            for indices in operand_sets(combinator, parent.state.len()) {
                let state = match apply_to_state(&parent.state, combinator, &indices) {
                    Ok(state) => state,
                    Err(err) => {
                        stats.candidates_rejected += 1;
                        trace!(%combinator, ?indices, %err, "candidate rejected");
                        continue;
                    }
                };

                let step = ProgramStep::new(*combinator, indices);
                let weight = self.ranker.calculate_rank(&step, &weights)?;
                let rank = parent.rank + weight.ln();
                children.push(SearchNode::child(parent, step, state, rank));
            }
        }

        stats.children_generated += children.len() as u64;
        Ok(children)
    }
}
