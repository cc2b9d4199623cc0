//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Core trait that all agents implement
///
/// Agents take a plain-text task and return a plain-text answer. Anything an
/// agent wants to expose besides its answer (reasoning steps, run metadata)
/// goes into the [`Context`] it is handed.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;

    /// One-line description of what this agent is responsible for
    ///
    /// Team leaders use this to decide which member gets a task.
    fn role(&self) -> Option<&str> {
        None
    }

    /// Names of the tools this agent can call
    fn tool_names(&self) -> Vec<String> {
        Vec::new()
    }
}
