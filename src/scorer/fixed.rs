//! Scorer that always returns the same prepared weights

use crate::dsl::{Definition, Grammar, Slot, Target, Value};
use crate::scorer::{Scorer, ScorerOutput, UniformScorer, WeightSlot};

/// Returns a fixed weight table regardless of state, so tests can steer the
/// search deterministically.
#[derive(Debug, Clone)]
pub struct FixedScorer {
    output: ScorerOutput,
}

impl FixedScorer {
    pub fn new(output: ScorerOutput) -> Self {
        Self { output }
    }

    /// Start from uniform weights sized to the grammar
    pub fn uniform(grammar: &Grammar) -> Self {
        let target = Target::normalize(Value::Int(0));
        Self::new(UniformScorer.predict(&[], &target, grammar))
    }

    /// Override a single weight; out-of-range positions are ignored
    pub fn with_weight(mut self, slot: WeightSlot, index: usize, weight: f64) -> Self {
        if let Some(w) = self.output.vector_mut(slot).get_mut(index) {
            *w = weight;
        }
        self
    }

    /// Set the same weight for every definition, then override individual ones
    pub fn with_definition_weights(
        mut self,
        grammar: &Grammar,
        default: f64,
        overrides: &[(Definition, f64)],
    ) -> Self {
        for w in self.output.vector_mut(WeightSlot::Definition) {
            *w = default;
        }
        for &(definition, weight) in overrides {
            if let Some(index) = grammar.definition_index(definition) {
                self = self.with_weight(WeightSlot::Definition, index, weight);
            }
        }
        self
    }

    pub fn output(&self) -> &ScorerOutput {
        &self.output
    }
}

impl Scorer for FixedScorer {
    fn predict(&mut self, _state: &[Slot], _target: &Target, _grammar: &Grammar) -> ScorerOutput {
        self.output.clone()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_overrides() {
        let grammar = Grammar::default();
        let scorer = FixedScorer::uniform(&grammar).with_definition_weights(
            &grammar,
            0.01,
            &[(Definition::Length, 0.9)],
        );
        let length = grammar.definition_index(Definition::Length).unwrap();
        let map = grammar.definition_index(Definition::Map).unwrap();

        let weights = scorer.output().vector(WeightSlot::Definition);
        assert_eq!(weights[length], 0.9);
        assert_eq!(weights[map], 0.01);
    }

    #[test]
    fn test_out_of_range_override_ignored() {
        let grammar = Grammar::default();
        let scorer = FixedScorer::uniform(&grammar).with_weight(WeightSlot::Index, 99, 1.0);
        assert_eq!(scorer.output().vector(WeightSlot::Index).len(), 5);
    }
}
