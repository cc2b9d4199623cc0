//! Execution context for agents
//!
//! The `Context` struct is a key-value store handed to an agent for the
//! duration of one run. Callers use it to pass run options in, and agents use
//! it to hand back anything besides their text answer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Identifier of the current run, for log correlation
    pub const RUN_ID: &str = "run_id";
    /// Whether reasoning output should be surfaced to the user
    pub const SHOW_FULL_REASONING: &str = "show_full_reasoning";
    /// Reasoning steps produced by a reasoning-enabled agent
    pub const REASONING_STEPS: &str = "reasoning_steps";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use advisor_core::Context;
///
/// let ctx = Context::new()
///     .with_run_id("run-123")
///     .with_show_full_reasoning(true);
///
/// assert_eq!(ctx.run_id(), Some("run-123"));
/// assert!(ctx.show_full_reasoning());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run ID
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.insert(keys::RUN_ID, serde_json::json!(run_id.into()));
        self
    }

    /// Set whether reasoning should be surfaced
    pub fn with_show_full_reasoning(mut self, show: bool) -> Self {
        self.insert(keys::SHOW_FULL_REASONING, serde_json::json!(show));
        self
    }

    /// Get the run ID
    pub fn run_id(&self) -> Option<&str> {
        self.get(keys::RUN_ID).and_then(|v| v.as_str())
    }

    /// Whether reasoning should be surfaced (defaults to false)
    pub fn show_full_reasoning(&self) -> bool {
        self.get(keys::SHOW_FULL_REASONING)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    ///
    /// Serializes the value to JSON before storing.
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Derive a context for a sub-agent
    ///
    /// Run options carry over; outputs a previous agent stored do not.
    pub fn child(&self) -> Self {
        let mut child = Self::new();
        for key in [keys::RUN_ID, keys::SHOW_FULL_REASONING] {
            if let Some(value) = self.get(key) {
                child.insert(key, value.clone());
            }
        }
        child
    }
}
