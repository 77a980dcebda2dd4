//! Combinator definitions for the list-processing DSL

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary numeric operator used by `map` and `zip_with`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
}

impl NumOp {
    pub const ALL: [NumOp; 3] = [NumOp::Add, NumOp::Sub, NumOp::Mul];

    /// Checked application; None on overflow
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            NumOp::Add => lhs.checked_add(rhs),
            NumOp::Sub => lhs.checked_sub(rhs),
            NumOp::Mul => lhs.checked_mul(rhs),
        }
    }

    pub fn is_commutative(self) -> bool {
        !matches!(self, NumOp::Sub)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            NumOp::Add => "+",
            NumOp::Sub => "-",
            NumOp::Mul => "*",
        }
    }
}

/// Comparison operator used by `filter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "==")]
    Eq,
}

impl BoolOp {
    pub const ALL: [BoolOp; 3] = [BoolOp::Gt, BoolOp::Lt, BoolOp::Eq];

    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            BoolOp::Gt => lhs > rhs,
            BoolOp::Lt => lhs < rhs,
            BoolOp::Eq => lhs == rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BoolOp::Gt => ">",
            BoolOp::Lt => "<",
            BoolOp::Eq => "==",
        }
    }
}

/// Identity of a combinator, independent of its operator/literal parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Definition {
    Map,
    Filter,
    ZipWith,
    Take,
    Drop,
    Sum,
    Max,
    Min,
    Length,
    CopyStateTuple,
}

impl Definition {
    /// Library definitions in registry order (the duplication operator is
    /// appended separately by the grammar)
    pub const LIBRARY: [Definition; 9] = [
        Definition::Map,
        Definition::Filter,
        Definition::ZipWith,
        Definition::Take,
        Definition::Drop,
        Definition::Sum,
        Definition::Max,
        Definition::Min,
        Definition::Length,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Definition::Map => "map",
            Definition::Filter => "filter",
            Definition::ZipWith => "zip_with",
            Definition::Take => "take",
            Definition::Drop => "drop",
            Definition::Sum => "sum",
            Definition::Max => "max",
            Definition::Min => "min",
            Definition::Length => "length",
            Definition::CopyStateTuple => "copy_state_tuple",
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Number of state-tuple slots a combinator consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
}

impl Arity {
    pub fn operand_count(self) -> usize {
        match self {
            Arity::Unary => 1,
            Arity::Binary => 2,
        }
    }
}

/// How a combinator participates in child generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Operates on one slot, keeps it a sequence
    WholeTuple,
    /// Merges two slots into one
    Pairwise,
    /// Reduces the last remaining slot to a scalar
    Aggregate,
    /// Appends a copy of a slot
    Duplication,
}

/// One fully parameterized grammar element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    Map { op: NumOp, number: i64 },
    Filter { op: BoolOp, number: i64 },
    ZipWith { op: NumOp },
    Take(i64),
    Drop(i64),
    Sum,
    Max,
    Min,
    Length,
    CopyStateTuple,
}

impl Combinator {
    pub fn definition(&self) -> Definition {
        match self {
            Combinator::Map { .. } => Definition::Map,
            Combinator::Filter { .. } => Definition::Filter,
            Combinator::ZipWith { .. } => Definition::ZipWith,
            Combinator::Take(_) => Definition::Take,
            Combinator::Drop(_) => Definition::Drop,
            Combinator::Sum => Definition::Sum,
            Combinator::Max => Definition::Max,
            Combinator::Min => Definition::Min,
            Combinator::Length => Definition::Length,
            Combinator::CopyStateTuple => Definition::CopyStateTuple,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Combinator::Map { .. }
            | Combinator::Filter { .. }
            | Combinator::Take(_)
            | Combinator::Drop(_) => Category::WholeTuple,
            Combinator::ZipWith { .. } => Category::Pairwise,
            Combinator::Sum | Combinator::Max | Combinator::Min | Combinator::Length => {
                Category::Aggregate
            }
            Combinator::CopyStateTuple => Category::Duplication,
        }
    }

    pub fn arity(&self) -> Arity {
        match self.category() {
            Category::Pairwise => Arity::Binary,
            _ => Arity::Unary,
        }
    }

    /// Numeric operator, if this combinator carries one
    pub fn num_op(&self) -> Option<NumOp> {
        match self {
            Combinator::Map { op, .. } | Combinator::ZipWith { op } => Some(*op),
            _ => None,
        }
    }

    /// Boolean operator, if this combinator carries one
    pub fn bool_op(&self) -> Option<BoolOp> {
        match self {
            Combinator::Filter { op, .. } => Some(*op),
            _ => None,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::Map { op, number } => write!(f, "map({} {})", op.symbol(), number),
            Combinator::Filter { op, number } => {
                write!(f, "filter({} {})", op.symbol(), number)
            }
            Combinator::ZipWith { op } => write!(f, "zip_with({})", op.symbol()),
            Combinator::Take(n) => write!(f, "take({})", n),
            Combinator::Drop(n) => write!(f, "drop({})", n),
            other => write!(f, "{}", other.definition()),
        }
    }
}
