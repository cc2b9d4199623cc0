//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use advisor_core::{Agent, Context, Result};
use async_trait::async_trait;

/// An agent that uses the LLM loop with tool execution
///
/// ToolAgent wraps the AgentExecutor to provide the Agent trait interface.
/// Team members are ToolAgents: the leader hands them a task as plain text
/// and gets their final answer back.
///
/// # Example
///
/// ```no_run
/// use advisor_core::{Agent, Context};
/// use advisor_llm::providers::OpenAIProvider;
/// use advisor_runtime::{AgentExecutorBuilder, ToolAgent};
/// use std::sync::Arc;
///
/// # async fn example() -> advisor_core::Result<()> {
/// let provider = OpenAIProvider::new("sk-...")?;
/// let executor = AgentExecutorBuilder::new()
///     .provider(Arc::new(provider))
///     .model("gpt-4o")
///     .build()?;
///
/// let agent = ToolAgent::new(executor, "Web Agent").with_role("Search the web");
///
/// let mut context = Context::new();
/// let response = agent.process("Latest NVDA news".to_string(), &mut context).await?;
/// # Ok(())
/// # }
/// ```
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
    role: Option<String>,
}

impl ToolAgent {
    /// Create a new tool agent
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
            role: None,
        }
    }

    /// Set the agent's role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        self.executor.run(input, context).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    fn tool_names(&self) -> Vec<String> {
        self.executor
            .tool_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect()
    }
}
