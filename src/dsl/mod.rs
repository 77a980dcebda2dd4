//! List-processing DSL: values, combinators, grammar and evaluation

pub mod combinator;
pub mod composition;
pub mod eval;
pub mod grammar;
pub mod value;

// Re-export commonly used types
pub use combinator::{BoolOp, Category, Combinator, Definition, NumOp};
pub use composition::{Composition, Operand};
pub use eval::{EvalError, apply_to_state};
pub use grammar::{Grammar, GrammarConfig};
pub use value::{Slot, StateTuple, Target, Value};
