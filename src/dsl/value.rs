//! Core value types manipulated by the synthesizer

use serde::{Deserialize, Serialize};
use std::fmt;

/// A DSL value: a scalar or a (possibly nested) list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    List(Vec<Value>),
}

impl Value {
    /// Build a list of integers
    pub fn ints(values: &[i64]) -> Self {
        Value::List(values.iter().copied().map(Value::Int).collect())
    }

    /// Returns true for `Int` and `Bool`
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Bool(_))
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// First element of a list value (None for scalars and empty lists)
    pub fn first(&self) -> Option<&Value> {
        self.as_list().and_then(|items| items.first())
    }

    /// True when this value is a list containing no elements
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Value::List(items) if items.is_empty())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// One state-tuple slot: a value per I/O example
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(pub Vec<Value>);

impl Slot {
    /// Slot for a single I/O example
    pub fn single(value: Value) -> Self {
        Slot(vec![value])
    }

    pub fn components(&self) -> &[Value] {
        &self.0
    }

    pub fn has_scalar(&self) -> bool {
        self.0.iter().any(Value::is_scalar)
    }

    pub fn has_empty_list(&self) -> bool {
        self.0.iter().any(Value::is_empty_list)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{}", single),
            components => {
                write!(f, "(")?;
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Ordered working set of slots; the slot index is an operand address
pub type StateTuple = Vec<Slot>;

/// Target output normalized into a sequence of output components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    components: Vec<Value>,
}

impl Target {
    /// Normalize a user-facing target.
    ///
    /// Scalars, lists starting with a scalar and the empty list become a single
    /// component. A list of lists is already a family of components.
    pub fn normalize(raw: Value) -> Self {
        let components = match raw {
            Value::List(items) if matches!(items.first(), Some(Value::List(_))) => items,
            other => vec![other],
        };
        Self { components }
    }

    pub fn components(&self) -> &[Value] {
        &self.components
    }

    /// Per-position minimum list lengths, present only when the target's
    /// first component is itself a list.
    pub fn min_lengths(&self) -> Option<Vec<usize>> {
        match self.components.first() {
            Some(Value::List(_)) => Some(
                self.components
                    .iter()
                    .map(|c| c.as_list().map_or(0, <[Value]>::len))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Slot(self.components.clone()))
    }
}
