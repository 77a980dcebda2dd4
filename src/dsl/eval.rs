//! Evaluation semantics for combinators over slots and state tuples

use crate::dsl::combinator::Combinator;
use crate::dsl::value::{Slot, Value};
use thiserror::Error;

/// Reasons a combinator cannot be applied to a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("{combinator} expects a list of integers, got {found}")]
    TypeMismatch { combinator: String, found: String },

    #[error("{0} of an empty sequence")]
    EmptySequence(String),

    #[error("integer overflow in {0}")]
    Overflow(String),

    #[error("{combinator} takes {expected} operand(s), got {found}")]
    Arity {
        combinator: String,
        expected: usize,
        found: usize,
    },

    #[error("slot index {index} out of range for state tuple of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("operand slots carry {0} and {1} components")]
    ComponentMismatch(usize, usize),

    #[error("{0} cannot be evaluated as an expression")]
    NotEvaluable(String),
}

fn int_list(combinator: &Combinator, value: &Value) -> Result<Vec<i64>, EvalError> {
    let mismatch = || EvalError::TypeMismatch {
        combinator: combinator.to_string(),
        found: value.to_string(),
    };
    value
        .as_list()
        .ok_or_else(mismatch)?
        .iter()
        .map(|v| v.as_int().ok_or_else(mismatch))
        .collect()
}

fn clamp_count(n: i64, len: usize) -> usize {
    usize::try_from(n.max(0)).map_or(len, |n| n.min(len))
}

fn apply_unary(combinator: &Combinator, value: &Value) -> Result<Value, EvalError> {
    let overflow = || EvalError::Overflow(combinator.to_string());
    match *combinator {
        Combinator::Map { op, number } => int_list(combinator, value)?
            .into_iter()
            .map(|x| op.apply(x, number).map(Value::Int).ok_or_else(overflow))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Combinator::Filter { op, number } => Ok(Value::ints(
            &int_list(combinator, value)?
                .into_iter()
                .filter(|&x| op.holds(x, number))
                .collect::<Vec<_>>(),
        )),
        Combinator::Take(n) | Combinator::Drop(n) => {
            let items = value.as_list().ok_or_else(|| EvalError::TypeMismatch {
                combinator: combinator.to_string(),
                found: value.to_string(),
            })?;
            let count = clamp_count(n, items.len());
            let kept = if matches!(combinator, Combinator::Take(_)) {
                &items[..count]
            } else {
                &items[count..]
            };
            Ok(Value::List(kept.to_vec()))
        }
        Combinator::Sum => int_list(combinator, value)?
            .into_iter()
            .try_fold(0i64, |acc, x| acc.checked_add(x))
            .map(Value::Int)
            .ok_or_else(overflow),
        Combinator::Max | Combinator::Min => {
            let items = int_list(combinator, value)?;
            let picked = if matches!(combinator, Combinator::Max) {
                items.into_iter().max()
            } else {
                items.into_iter().min()
            };
            picked
                .map(Value::Int)
                .ok_or_else(|| EvalError::EmptySequence(combinator.to_string()))
        }
        Combinator::Length => match value {
            Value::List(items) => Ok(Value::Int(items.len() as i64)),
            other => Err(EvalError::TypeMismatch {
                combinator: combinator.to_string(),
                found: other.to_string(),
            }),
        },
        Combinator::ZipWith { .. } | Combinator::CopyStateTuple => Err(EvalError::Arity {
            combinator: combinator.to_string(),
            expected: combinator.arity().operand_count(),
            found: 1,
        }),
    }
}

fn apply_binary(combinator: &Combinator, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let Combinator::ZipWith { op } = *combinator else {
        return Err(EvalError::Arity {
            combinator: combinator.to_string(),
            expected: combinator.arity().operand_count(),
            found: 2,
        });
    };
    let lhs = int_list(combinator, lhs)?;
    let rhs = int_list(combinator, rhs)?;
    lhs.into_iter()
        .zip(rhs)
        .map(|(a, b)| {
            op.apply(a, b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::Overflow(combinator.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Apply a combinator to its operand slots, component by component
pub fn apply(combinator: &Combinator, operands: &[&Slot]) -> Result<Slot, EvalError> {
    let expected = combinator.arity().operand_count();
    if operands.len() != expected {
        return Err(EvalError::Arity {
            combinator: combinator.to_string(),
            expected,
            found: operands.len(),
        });
    }

    match operands {
        [slot] => slot
            .components()
            .iter()
            .map(|value| apply_unary(combinator, value))
            .collect::<Result<Vec<_>, _>>()
            .map(Slot),
        [lhs, rhs] => {
            if lhs.components().len() != rhs.components().len() {
                return Err(EvalError::ComponentMismatch(
                    lhs.components().len(),
                    rhs.components().len(),
                ));
            }
            lhs.components()
                .iter()
                .zip(rhs.components())
                .map(|(a, b)| apply_binary(combinator, a, b))
                .collect::<Result<Vec<_>, _>>()
                .map(Slot)
        }
        _ => unreachable!("operand count checked against arity"),
    }
}

/// Write `result` at the lowest of `indices` and delete the others,
/// highest index first so earlier positions stay valid.
pub fn collapse<T>(items: &mut Vec<T>, indices: &[usize], result: T) {
    let Some(&target) = indices.iter().min() else {
        return;
    };
    items[target] = result;

    let mut rest: Vec<usize> = indices.iter().copied().filter(|&i| i != target).collect();
    rest.sort_unstable_by(|a, b| b.cmp(a));
    rest.dedup();
    for index in rest {
        items.remove(index);
    }
}

fn check_indices(state: &[Slot], indices: &[usize]) -> Result<(), EvalError> {
    for (pos, &index) in indices.iter().enumerate() {
        if index >= state.len() || indices[..pos].contains(&index) {
            return Err(EvalError::IndexOutOfRange {
                index,
                len: state.len(),
            });
        }
    }
    Ok(())
}

/// Apply one decision to a state tuple, producing the next state tuple
pub fn apply_to_state(
    state: &[Slot],
    combinator: &Combinator,
    indices: &[usize],
) -> Result<Vec<Slot>, EvalError> {
    check_indices(state, indices)?;

    if let Combinator::CopyStateTuple = combinator {
        let [index] = indices else {
            return Err(EvalError::Arity {
                combinator: combinator.to_string(),
                expected: 1,
                found: indices.len(),
            });
        };
        let mut next = state.to_vec();
        next.push(state[*index].clone());
        return Ok(next);
    }

    let operands: Vec<&Slot> = indices.iter().map(|&i| &state[i]).collect();
    let result = apply(combinator, &operands)?;

    let mut next = state.to_vec();
    collapse(&mut next, indices, result);
    Ok(next)
}
