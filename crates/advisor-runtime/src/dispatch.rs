//! Tool dispatch seam between the executor and whatever answers tool calls
//!
//! Plain agents answer tool calls from a [`ToolRegistry`]; a team leader
//! answers them by handing the task to a member agent. Both sit behind
//! [`ToolDispatcher`] so the executor loop does not care which it has.

use crate::reasoning::ReasoningStep;
use advisor_core::{Context, Error, Result};
use advisor_llm::ToolDefinition;
use advisor_tools::ToolRegistry;
use async_trait::async_trait;
use serde_json::Value;

/// Result of one tool call, as reported back to the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    /// Text handed back to the model
    pub content: String,
    /// Reasoning steps produced while answering the call
    pub reasoning: Vec<ReasoningStep>,
    /// Whether the call failed
    pub is_error: bool,
}

impl ToolOutput {
    /// Successful output
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Failed output; the model sees the error text
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            reasoning: Vec::new(),
            is_error: true,
        }
    }
}

/// Something that can answer tool calls
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Tool definitions to advertise to the model
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Answer one tool call
    ///
    /// Errors are turned into error results by the executor, so a failing
    /// tool never ends the run.
    async fn dispatch(&self, name: &str, input: Value, context: &Context) -> Result<ToolOutput>;
}

#[async_trait]
impl ToolDispatcher for ToolRegistry {
    fn definitions(&self) -> Vec<ToolDefinition> {
        ToolRegistry::definitions(self)
    }

    async fn dispatch(&self, name: &str, input: Value, _context: &Context) -> Result<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        let value = tool.execute(input).await?;
        let content = match value {
            Value::String(text) => text,
            other => serde_json::to_string(&other)
                .map_err(|e| Error::ProcessingFailed(format!("Failed to encode tool result: {e}")))?,
        };
        Ok(ToolOutput::success(content))
    }
}
