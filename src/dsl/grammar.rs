//! Combinator grammar registry and its scoring alphabets
//!
//! The grammar enumerates every combinator the search may apply, in a stable
//! order, and maps each combinator parameter to its position in the scorer's
//! weight vectors.

use crate::dsl::{BoolOp, Combinator, Definition, NumOp};
use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Alphabets that parameterize the grammar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Library definitions to enumerate (the duplication operator is always appended)
    pub definitions: Vec<Definition>,
    /// Operators for `map` and `zip_with`
    pub num_operators: Vec<NumOp>,
    /// Literals for `map`
    pub map_numbers: Vec<i64>,
    /// Operators for `filter`
    pub bool_operators: Vec<BoolOp>,
    /// Literals for `filter`
    pub filter_numbers: Vec<i64>,
    /// Literals for `take` and `drop`
    pub take_drop_numbers: Vec<i64>,
    /// Number of slot addresses the scorer distinguishes
    pub index_slots: usize,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            definitions: Definition::LIBRARY.to_vec(),
            num_operators: NumOp::ALL.to_vec(),
            map_numbers: vec![1, 2, 3, 4, 5],
            bool_operators: BoolOp::ALL.to_vec(),
            filter_numbers: vec![0, 1, 2, 3, 4, 5],
            take_drop_numbers: vec![1, 2, 3, 4, 5],
            index_slots: 5,
        }
    }
}

fn check_unique<T: PartialEq + std::fmt::Debug>(name: &str, items: &[T]) -> Result<(), SearchError> {
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            return Err(SearchError::InvalidGrammar(format!(
                "duplicate entry {:?} in {}",
                item, name
            )));
        }
    }
    Ok(())
}

fn require(name: &str, len: usize, needed: bool) -> Result<(), SearchError> {
    if needed && len == 0 {
        return Err(SearchError::InvalidGrammar(format!("{} must not be empty", name)));
    }
    Ok(())
}

/// Order-stable registry of all combinators available to the search
#[derive(Debug, Clone)]
pub struct Grammar {
    config: GrammarConfig,
    definitions: Vec<Definition>,
    combinators: Vec<Combinator>,
}

impl Default for Grammar {
    fn default() -> Self {
        // The default alphabets are non-empty and duplicate-free.
        Self::build(GrammarConfig::default())
    }
}

impl Grammar {
    /// Validate the alphabets and register every combinator
    pub fn new(config: GrammarConfig) -> Result<Self, SearchError> {
        if config.definitions.contains(&Definition::CopyStateTuple) {
            return Err(SearchError::InvalidGrammar(
                "copy_state_tuple is appended automatically and must not be listed".to_string(),
            ));
        }
        check_unique("definitions", &config.definitions)?;
        check_unique("num_operators", &config.num_operators)?;
        check_unique("map_numbers", &config.map_numbers)?;
        check_unique("bool_operators", &config.bool_operators)?;
        check_unique("filter_numbers", &config.filter_numbers)?;
        check_unique("take_drop_numbers", &config.take_drop_numbers)?;

        let uses = |d: Definition| config.definitions.contains(&d);
        require(
            "num_operators",
            config.num_operators.len(),
            uses(Definition::Map) || uses(Definition::ZipWith),
        )?;
        require("map_numbers", config.map_numbers.len(), uses(Definition::Map))?;
        require(
            "bool_operators",
            config.bool_operators.len(),
            uses(Definition::Filter),
        )?;
        require(
            "filter_numbers",
            config.filter_numbers.len(),
            uses(Definition::Filter),
        )?;
        require(
            "take_drop_numbers",
            config.take_drop_numbers.len(),
            uses(Definition::Take) || uses(Definition::Drop),
        )?;
        require("index_slots", config.index_slots, true)?;

        Ok(Self::build(config))
    }

    fn build(config: GrammarConfig) -> Self {
        let mut combinators = Vec::new();

        // Registry order follows the library order, not the config order.
        for definition in Definition::LIBRARY {
            if !config.definitions.contains(&definition) {
                continue;
            }
            match definition {
                Definition::Map => {
                    for &op in &config.num_operators {
                        for &number in &config.map_numbers {
                            combinators.push(Combinator::Map { op, number });
                        }
                    }
                }
                Definition::Filter => {
                    for &op in &config.bool_operators {
                        for &number in &config.filter_numbers {
                            combinators.push(Combinator::Filter { op, number });
                        }
                    }
                }
                Definition::ZipWith => {
                    for &op in &config.num_operators {
                        combinators.push(Combinator::ZipWith { op });
                    }
                }
                Definition::Take => combinators
                    .extend(config.take_drop_numbers.iter().map(|&n| Combinator::Take(n))),
                Definition::Drop => combinators
                    .extend(config.take_drop_numbers.iter().map(|&n| Combinator::Drop(n))),
                Definition::Sum => combinators.push(Combinator::Sum),
                Definition::Max => combinators.push(Combinator::Max),
                Definition::Min => combinators.push(Combinator::Min),
                Definition::Length => combinators.push(Combinator::Length),
                Definition::CopyStateTuple => {}
            }
        }
        combinators.push(Combinator::CopyStateTuple);

        let mut definitions: Vec<Definition> = Definition::LIBRARY
            .into_iter()
            .filter(|d| config.definitions.contains(d))
            .collect();
        definitions.push(Definition::CopyStateTuple);

        Self {
            config,
            definitions,
            combinators,
        }
    }

    /// All combinators in enumeration order, duplication operator last
    pub fn combinators(&self) -> &[Combinator] {
        &self.combinators
    }

    pub fn config(&self) -> &GrammarConfig {
        &self.config
    }

    /// Identity alphabet: enabled library definitions followed by the duplication operator
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn index_slots(&self) -> usize {
        self.config.index_slots
    }

    pub fn definition_index(&self, definition: Definition) -> Option<usize> {
        self.definitions.iter().position(|&d| d == definition)
    }

    pub fn num_operator_index(&self, op: NumOp) -> Option<usize> {
        self.config.num_operators.iter().position(|&o| o == op)
    }

    pub fn bool_operator_index(&self, op: BoolOp) -> Option<usize> {
        self.config.bool_operators.iter().position(|&o| o == op)
    }

    pub fn map_number_index(&self, number: i64) -> Option<usize> {
        self.config.map_numbers.iter().position(|&n| n == number)
    }

    pub fn filter_number_index(&self, number: i64) -> Option<usize> {
        self.config.filter_numbers.iter().position(|&n| n == number)
    }

    pub fn take_drop_number_index(&self, number: i64) -> Option<usize> {
        self.config.take_drop_numbers.iter().position(|&n| n == number)
    }
}
