//! Scorers: per-slot weight predictions that guide the search
//!
//! A scorer looks at the current state tuple and the target and returns one
//! weight vector per grammar slot category. The trained network itself lives
//! outside this crate; any model plugs in through the [`Scorer`] trait.

#[cfg(test)]
pub mod fixed;
pub mod random;
pub mod uniform;

#[cfg(test)]
pub use fixed::FixedScorer;
pub use random::RandomScorer;
pub use uniform::UniformScorer;

use crate::dsl::{Grammar, Slot, Target};
use std::fmt;

/// Weight vector categories, in the order a model emits them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightSlot {
    Definition,
    Index,
    BoolOperator,
    BoolNumber,
    NumOperator,
    NumNumber,
    TakeDropNumber,
}

impl WeightSlot {
    pub const ALL: [WeightSlot; 7] = [
        WeightSlot::Definition,
        WeightSlot::Index,
        WeightSlot::BoolOperator,
        WeightSlot::BoolNumber,
        WeightSlot::NumOperator,
        WeightSlot::NumNumber,
        WeightSlot::TakeDropNumber,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WeightSlot::Definition => "definition",
            WeightSlot::Index => "index",
            WeightSlot::BoolOperator => "bool_operator",
            WeightSlot::BoolNumber => "bool_number",
            WeightSlot::NumOperator => "num_operator",
            WeightSlot::NumNumber => "num_number",
            WeightSlot::TakeDropNumber => "take_drop_number",
        }
    }

    /// Alphabet size for this category under the given grammar
    pub fn alphabet_len(self, grammar: &Grammar) -> usize {
        let config = grammar.config();
        match self {
            WeightSlot::Definition => grammar.definitions().len(),
            WeightSlot::Index => grammar.index_slots(),
            WeightSlot::BoolOperator => config.bool_operators.len(),
            WeightSlot::BoolNumber => config.filter_numbers.len(),
            WeightSlot::NumOperator => config.num_operators.len(),
            WeightSlot::NumNumber => config.map_numbers.len(),
            WeightSlot::TakeDropNumber => config.take_drop_numbers.len(),
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for WeightSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Probability-like weights for every slot category
#[derive(Debug, Clone, PartialEq)]
pub struct ScorerOutput {
    vectors: [Vec<f64>; 7],
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sigmoid(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

impl ScorerOutput {
    /// Turn raw model logits into weights: softmax per category, except the
    /// index category which is scored independently per slot with a sigmoid.
    pub fn from_logits(logits: [Vec<f64>; 7]) -> Self {
        let mut position = 0;
        let vectors = logits.map(|l| {
            let slot = WeightSlot::ALL[position];
            position += 1;
            if slot == WeightSlot::Index {
                l.into_iter().map(sigmoid).collect()
            } else {
                softmax(&l)
            }
        });
        Self { vectors }
    }

    /// All-zero sentinel sized to the grammar's alphabets
    pub fn zeros(grammar: &Grammar) -> Self {
        Self {
            vectors: WeightSlot::ALL.map(|slot| vec![0.0; slot.alphabet_len(grammar)]),
        }
    }

    pub fn vector(&self, slot: WeightSlot) -> &[f64] {
        &self.vectors[slot.position()]
    }

    #[cfg(test)]
    pub fn vector_mut(&mut self, slot: WeightSlot) -> &mut [f64] {
        &mut self.vectors[slot.position()]
    }

    pub fn weight(&self, slot: WeightSlot, index: usize) -> Option<f64> {
        self.vector(slot).get(index).copied()
    }

    /// True for the sentinel returned on degenerate input
    pub fn is_unscoreable(&self) -> bool {
        self.vectors.iter().flatten().all(|&w| w == 0.0)
    }
}

/// A model that predicts per-slot weights for the next operation
pub trait Scorer {
    /// Predict weights for extending `state` towards `target`
    fn predict(&mut self, state: &[Slot], target: &Target, grammar: &Grammar) -> ScorerOutput;

    /// Short name used in logs and reports
    fn name(&self) -> &'static str;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn predict(&mut self, state: &[Slot], target: &Target, grammar: &Grammar) -> ScorerOutput {
        (**self).predict(state, target, grammar)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Query a scorer, short-circuiting to the zero sentinel when any slot holds
/// an empty sequence (such states cannot be encoded for the model).
pub fn score<S: Scorer + ?Sized>(
    scorer: &mut S,
    state: &[Slot],
    target: &Target,
    grammar: &Grammar,
) -> ScorerOutput {
    if state.iter().any(Slot::has_empty_list) {
        return ScorerOutput::zeros(grammar);
    }
    scorer.predict(state, target, grammar)
}

/// Scorer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerKind {
    /// Every choice within a category is equally likely
    #[default]
    Uniform,
    /// Seeded pseudo-random logits
    Random,
}

impl ScorerKind {
    /// Build a scorer; `seed` is only used by the random scorer
    pub fn build(self, seed: Option<u64>) -> Box<dyn Scorer + Send> {
        match self {
            ScorerKind::Uniform => Box::new(UniformScorer),
            ScorerKind::Random => Box::new(RandomScorer::new(seed)),
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerKind::Uniform => write!(f, "uniform"),
            ScorerKind::Random => write!(f, "random"),
        }
    }
}

impl std::str::FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uniform" => Ok(ScorerKind::Uniform),
            "random" | "rand" => Ok(ScorerKind::Random),
            _ => Err(format!(
                "Unknown scorer: '{}'. Valid options: uniform, random",
                s
            )),
        }
    }
}
