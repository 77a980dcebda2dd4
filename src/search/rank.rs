//! Rank assignment from per-slot scorer weights
//!
//! Each candidate step draws one weight from every scorer category that
//! applies to it. The combined weight is the product of those draws,
//! computed in log space.

use crate::dsl::{Combinator, Grammar};
use crate::error::SearchError;
use crate::scorer::{ScorerOutput, WeightSlot};
use crate::search::node::ProgramStep;

type Extractor = fn(&ProgramStep, &ScorerOutput, &Grammar) -> Result<Option<f64>, SearchError>;

/// Extractors in the order their weights are gathered
const EXTRACTORS: [Extractor; 8] = [
    definition_weight,
    first_index_weight,
    second_index_weight,
    num_operator_weight,
    map_number_weight,
    bool_operator_weight,
    filter_number_weight,
    take_drop_number_weight,
];

fn lookup(
    step: &ProgramStep,
    weights: &ScorerOutput,
    slot: WeightSlot,
    position: Option<usize>,
) -> Result<Option<f64>, SearchError> {
    let index =
        position.ok_or_else(|| SearchError::UnknownCombinator(step.combinator.to_string()))?;
    weights
        .weight(slot, index)
        .map(Some)
        .ok_or(SearchError::WeightOutOfRange {
            slot: slot.name(),
            index,
            len: weights.vector(slot).len(),
        })
}

fn index_weight(step: &ProgramStep, weights: &ScorerOutput, nth: usize) -> Option<f64> {
    // Slots past the scorer's index vector were never offered to the model.
    step.indices
        .get(nth)
        .map(|&i| weights.weight(WeightSlot::Index, i).unwrap_or(0.0))
}

fn definition_weight(
    step: &ProgramStep,
    weights: &ScorerOutput,
    grammar: &Grammar,
) -> Result<Option<f64>, SearchError> {
    let position = grammar.definition_index(step.combinator.definition());
    lookup(step, weights, WeightSlot::Definition, position)
}

fn first_index_weight(
    step: &ProgramStep,
    weights: &ScorerOutput,
    _grammar: &Grammar,
) -> Result<Option<f64>, SearchError> {
    Ok(index_weight(step, weights, 0))
}

fn second_index_weight(
    step: &ProgramStep,
    weights: &ScorerOutput,
    _grammar: &Grammar,
) -> Result<Option<f64>, SearchError> {
    Ok(index_weight(step, weights, 1))
}

fn num_operator_weight(
    step: &ProgramStep,
    weights: &ScorerOutput,
    grammar: &Grammar,
) -> Result<Option<f64>, SearchError> {
    match step.combinator.num_op() {
        Some(op) => lookup(
            step,
            weights,
            WeightSlot::NumOperator,
            grammar.num_operator_index(op),
        ),
        None => Ok(None),
    }
}

fn map_number_weight(
    step: &ProgramStep,
    weights: &ScorerOutput,
    grammar: &Grammar,
) -> Result<Option<f64>, SearchError> {
    match step.combinator {
        Combinator::Map { number, .. } => lookup(
            step,
            weights,
            WeightSlot::NumNumber,
            grammar.map_number_index(number),
        ),
        _ => Ok(None),
    }
}

fn bool_operator_weight(
    step: &ProgramStep,
    weights: &ScorerOutput,
    grammar: &Grammar,
) -> Result<Option<f64>, SearchError> {
    match step.combinator.bool_op() {
        Some(op) => lookup(
            step,
            weights,
            WeightSlot::BoolOperator,
            grammar.bool_operator_index(op),
        ),
        None => Ok(None),
    }
}

fn filter_number_weight(
    step: &ProgramStep,
    weights: &ScorerOutput,
    grammar: &Grammar,
) -> Result<Option<f64>, SearchError> {
    match step.combinator {
        Combinator::Filter { number, .. } => lookup(
            step,
            weights,
            WeightSlot::BoolNumber,
            grammar.filter_number_index(number),
        ),
        _ => Ok(None),
    }
}

fn take_drop_number_weight(
    step: &ProgramStep,
    weights: &ScorerOutput,
    grammar: &Grammar,
) -> Result<Option<f64>, SearchError> {
    match step.combinator {
        Combinator::Take(n) | Combinator::Drop(n) => lookup(
            step,
            weights,
            WeightSlot::TakeDropNumber,
            grammar.take_drop_number_index(n),
        ),
        _ => Ok(None),
    }
}

/// Combine weights as `exp(sum(ln w))`. A zero weight yields 0.
pub fn aggregate(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w.ln()).sum::<f64>().exp()
}

/// Maps a candidate step to its combined scorer weight
#[derive(Debug, Clone, Copy)]
pub struct RankAssigner<'g> {
    grammar: &'g Grammar,
}

impl<'g> RankAssigner<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Weights that apply to `step`, in extractor order
    pub fn extract(
        &self,
        step: &ProgramStep,
        weights: &ScorerOutput,
    ) -> Result<Vec<f64>, SearchError> {
        let mut present = Vec::with_capacity(EXTRACTORS.len());
        for extractor in EXTRACTORS {
            if let Some(weight) = extractor(step, weights, self.grammar)? {
                present.push(weight);
            }
        }
        Ok(present)
    }

    /// Combined weight in `[0, 1]` for a candidate step
    pub fn calculate_rank(
        &self,
        step: &ProgramStep,
        weights: &ScorerOutput,
    ) -> Result<f64, SearchError> {
        Ok(aggregate(&self.extract(step, weights)?))
    }
}
