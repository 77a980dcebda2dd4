//! Scorer that expresses no preference

use crate::dsl::{Grammar, Slot, Target};
use crate::scorer::{Scorer, ScorerOutput, WeightSlot};

/// Every choice within a category gets the same weight.
///
/// Built from all-zero logits, so it goes through the same normalization a
/// model-backed scorer would: `1/n` per softmax category and `0.5` per index.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformScorer;

impl Scorer for UniformScorer {
    fn predict(&mut self, _state: &[Slot], _target: &Target, grammar: &Grammar) -> ScorerOutput {
        ScorerOutput::from_logits(WeightSlot::ALL.map(|slot| vec![0.0; slot.alphabet_len(grammar)]))
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}
