//! Rebuild an executable composition from a solution node

use crate::dsl::eval::collapse;
use crate::dsl::{Combinator, Composition, Operand, Slot};
use crate::error::SearchError;
use crate::search::node::{ProgramStep, SearchNode};

/// A state-tuple position during replay
#[derive(Debug, Clone)]
enum Entry {
    /// Untouched input slot
    Raw(Slot),
    /// Output of the program built so far at this position
    Built(Composition),
}

impl Entry {
    fn into_operand(self) -> Operand {
        match self {
            Entry::Raw(slot) => Operand::Input(slot),
            Entry::Built(composition) => Operand::Branch(Box::new(composition)),
        }
    }
}

fn entry_at(entries: &[Entry], index: usize, step: &ProgramStep) -> Result<Entry, SearchError> {
    entries.get(index).cloned().ok_or_else(|| {
        SearchError::Reconstruction(format!(
            "step {} addresses slot {} of {}",
            step,
            index,
            entries.len()
        ))
    })
}

/// Replay `steps` over the original input slots
pub fn replay(steps: &[ProgramStep], inputs: &[Slot]) -> Result<Composition, SearchError> {
    let mut entries: Vec<Entry> = inputs.iter().cloned().map(Entry::Raw).collect();

    for step in steps {
        if let Combinator::CopyStateTuple = step.combinator {
            let [index] = step.indices.as_slice() else {
                return Err(SearchError::Reconstruction(format!(
                    "copy step {} must name exactly one slot",
                    step
                )));
            };
            let copy = entry_at(&entries, *index, step)?;
            entries.push(copy);
            continue;
        }

        let operands = step
            .indices
            .iter()
            .map(|&i| entry_at(&entries, i, step).map(Entry::into_operand))
            .collect::<Result<Vec<_>, _>>()?;
        let built = Entry::Built(Composition::new(step.combinator, operands));
        collapse(&mut entries, &step.indices, built);
    }

    match entries.into_iter().next() {
        Some(Entry::Built(composition)) => Ok(composition),
        Some(Entry::Raw(_)) | None => Err(SearchError::Reconstruction(
            "no combinator produced the first slot".to_string(),
        )),
    }
}

/// Decision trace and composition for a solution node
pub fn reconstruct(
    node: &SearchNode,
    inputs: &[Slot],
) -> Result<(Vec<ProgramStep>, Composition), SearchError> {
    let steps = node.path();
    let composition = replay(&steps, inputs)?;
    Ok((steps, composition))
}
