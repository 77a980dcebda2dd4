//! Synthesis tasks: input values plus the output to reach

use crate::dsl::{Slot, StateTuple, Target, Value};
use crate::error::{SearchError, TaskError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One synthesis problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Input values, one state-tuple slot each
    pub input: Vec<Value>,
    /// Raw target output
    pub target: Value,
}

impl Task {
    pub fn new(input: Vec<Value>, target: Value) -> Self {
        Self { input, target }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.input.is_empty() {
            return Err(SearchError::InvalidTask(
                "at least one input value is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Initial state tuple: every input in its own slot
    pub fn state_tuple(&self) -> StateTuple {
        self.input.iter().cloned().map(Slot::single).collect()
    }

    pub fn target(&self) -> Target {
        Target::normalize(self.target.clone())
    }

    /// Load a JSON array of tasks
    pub fn load_all(path: &Path) -> Result<Vec<Task>, TaskError> {
        let text = fs::read_to_string(path).map_err(|source| TaskError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| TaskError::Json {
            context: path.display().to_string(),
            source,
        })
    }
}

/// Parse one value from its JSON form, e.g. `[1, 2, 3]` or `7`
pub fn parse_value(text: &str) -> Result<Value, TaskError> {
    serde_json::from_str(text).map_err(|source| TaskError::Json {
        context: format!("'{}'", text),
        source,
    })
}
