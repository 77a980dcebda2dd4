//! Search tree nodes and program steps

use crate::dsl::{Combinator, StateTuple};
use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;
use std::fmt;
use std::rc::Rc;

/// One decision: a combinator applied to the listed state-tuple indices
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramStep {
    pub combinator: Combinator,
    pub indices: Vec<usize>,
}

impl ProgramStep {
    pub fn new(combinator: Combinator, indices: Vec<usize>) -> Self {
        Self {
            combinator,
            indices,
        }
    }
}

impl fmt::Display for ProgramStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:?}", self.combinator, self.indices)
    }
}

impl Serialize for ProgramStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut step = serializer.serialize_struct("ProgramStep", 2)?;
        step.serialize_field("combinator", &self.combinator.to_string())?;
        step.serialize_field("indices", &self.indices)?;
        step.end()
    }
}

/// A node in the beam search tree.
///
/// Parents are shared and immutable, so a level's children keep only the
/// ancestry they need alive.
#[derive(Debug)]
pub struct SearchNode {
    pub step: Option<ProgramStep>,
    pub state: StateTuple,
    pub rank: f64,
    pub depth: usize,
    pub parent: Option<Rc<SearchNode>>,
}

impl SearchNode {
    pub fn root(state: StateTuple) -> Self {
        Self {
            step: None,
            state,
            rank: 0.0,
            depth: 0,
            parent: None,
        }
    }

    pub fn child(parent: &Rc<SearchNode>, step: ProgramStep, state: StateTuple, rank: f64) -> Self {
        Self {
            step: Some(step),
            state,
            rank,
            depth: parent.depth + 1,
            parent: Some(Rc::clone(parent)),
        }
    }

    /// Steps from the root down to this node
    pub fn path(&self) -> Vec<ProgramStep> {
        let mut steps = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(node) = current {
            if let Some(step) = &node.step {
                steps.push(step.clone());
            }
            current = node.parent.as_deref();
        }
        steps.reverse();
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{NumOp, Slot, Value};

    #[test]
    fn test_path_is_root_first() {
        let root = Rc::new(SearchNode::root(vec![Slot::single(Value::ints(&[1, 2]))]));
        let first = Rc::new(SearchNode::child(
            &root,
            ProgramStep::new(Combinator::Map { op: NumOp::Add, number: 1 }, vec![0]),
            vec![Slot::single(Value::ints(&[2, 3]))],
            -1.0,
        ));
        let second = SearchNode::child(
            &first,
            ProgramStep::new(Combinator::Sum, vec![0]),
            vec![Slot::single(Value::Int(5))],
            -2.0,
        );

        assert!(root.parent.is_none());
        assert_eq!(second.depth, 2);
        let path = second.path();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].combinator.to_string(), "map(+ 1)");
        assert_eq!(path[1].combinator, Combinator::Sum);
    }

    #[test]
    fn test_step_serializes_label() {
        let step = ProgramStep::new(Combinator::ZipWith { op: NumOp::Sub }, vec![1, 0]);
        let json = serde_json::to_string(&step).unwrap();
        assert_eq!(json, r#"{"combinator":"zip_with(-)","indices":[1,0]}"#);
    }
}
