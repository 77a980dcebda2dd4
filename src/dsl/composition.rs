//! Composition trees: the executable form of a synthesized program

use crate::dsl::eval::apply;
use crate::dsl::{Combinator, EvalError, Slot};
use std::fmt;

/// One operand of a composition node
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A raw input value bound directly to the combinator
    Input(Slot),
    /// A previously built sub-program whose output feeds the combinator
    Branch(Box<Composition>),
}

/// A combinator applied to operands in slot-index order
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub combinator: Combinator,
    pub operands: Vec<Operand>,
}

impl Composition {
    pub fn new(combinator: Combinator, operands: Vec<Operand>) -> Self {
        Self {
            combinator,
            operands,
        }
    }

    /// Evaluate the program bottom-up
    pub fn evaluate(&self) -> Result<Slot, EvalError> {
        if let Combinator::CopyStateTuple = self.combinator {
            return Err(EvalError::NotEvaluable(self.combinator.to_string()));
        }

        let values = self
            .operands
            .iter()
            .map(|operand| match operand {
                Operand::Input(slot) => Ok(slot.clone()),
                Operand::Branch(branch) => branch.evaluate(),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&Slot> = values.iter().collect();
        apply(&self.combinator, &refs)
    }

    /// Number of combinator applications in the tree
    pub fn size(&self) -> usize {
        1 + self
            .operands
            .iter()
            .map(|operand| match operand {
                Operand::Input(_) => 0,
                Operand::Branch(branch) => branch.size(),
            })
            .sum::<usize>()
    }

    /// Longest chain of nested applications
    pub fn depth(&self) -> usize {
        1 + self
            .operands
            .iter()
            .map(|operand| match operand {
                Operand::Input(_) => 0,
                Operand::Branch(branch) => branch.depth(),
            })
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Input(slot) => write!(f, "{}", slot),
            Operand::Branch(branch) => write!(f, "{}", branch),
        }
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.combinator)?;
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", operand)?;
        }
        write!(f, ")")
    }
}
