//! Seeded pseudo-random scorer

use crate::dsl::{Grammar, Slot, Target};
use crate::scorer::{Scorer, ScorerOutput, WeightSlot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws logits uniformly from `[-1, 1]` and normalizes them like model output.
///
/// Stands in for an untrained network. With a seed the search is reproducible.
#[derive(Debug, Clone)]
pub struct RandomScorer {
    rng: ChaCha8Rng,
}

impl RandomScorer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self { rng }
    }
}

impl Scorer for RandomScorer {
    fn predict(&mut self, _state: &[Slot], _target: &Target, grammar: &Grammar) -> ScorerOutput {
        let logits = WeightSlot::ALL.map(|slot| {
            (0..slot.alphabet_len(grammar))
                .map(|_| self.rng.random_range(-1.0..=1.0))
                .collect()
        });
        ScorerOutput::from_logits(logits)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
