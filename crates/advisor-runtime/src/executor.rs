//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the core agent loop pattern:
//! 1. Optionally run a reasoning pass and fold its steps into the system prompt
//! 2. Call the LLM with conversation history and available tools
//! 3. If tool use requested, execute the calls concurrently and loop back
//! 4. If completed, return (or stream) the final response

use crate::dispatch::{ToolDispatcher, ToolOutput};
use crate::reasoning::{self, ReasoningSettings, ReasoningStep};
use advisor_core::context::keys;
use advisor_core::{Context, Result};
use advisor_llm::{
    CompletionRequest, ContentBlock, LLMError, LLMProvider, Message, StopReason,
    StreamAccumulator, StreamEvent, TokenUsage, ToolDefinition,
};
use advisor_tools::ToolRegistry;
use async_stream::try_stream;
use futures::future::join_all;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const MAX_ITERATIONS_MESSAGE: &str = "Max iterations reached without completion";

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of iterations (prevents infinite loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,

    /// Run a step-by-step reasoning pass before answering
    pub reasoning: bool,

    /// Upper bound on reasoning steps
    pub max_reasoning_steps: usize,

    /// Ask for JSON mode during the reasoning pass
    pub structured_outputs: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "gpt-4o".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.7),
            reasoning: false,
            max_reasoning_steps: 10,
            structured_outputs: false,
        }
    }
}

/// Something that happened during a streamed run
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Answer text, in arrival order
    Content(String),
    /// Reasoning text (model reasoning deltas or rendered reasoning steps)
    Reasoning(String),
    /// The model asked for a tool
    ToolCall {
        /// Call ID
        id: String,
        /// Tool name
        name: String,
        /// Tool arguments
        input: Value,
    },
    /// A tool call finished
    ToolResult {
        /// Call ID
        id: String,
        /// Tool name
        name: String,
        /// What the tool returned
        output: ToolOutput,
    },
    /// Provider output with no typed counterpart
    Unrecognized(Value),
    /// The run finished
    Completed {
        /// Full answer text
        content: String,
        /// Token usage over the whole run
        usage: TokenUsage,
    },
}

/// Boxed stream of run events borrowing the executor
pub type RunStream<'a> = Pin<Box<dyn Stream<Item = Result<RunEvent>> + Send + 'a>>;

/// A tool call pulled out of an assistant message
#[derive(Debug, Clone)]
struct PendingCall {
    id: String,
    name: String,
    input: Value,
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
///
/// The AgentExecutor orchestrates the interaction between an LLM provider
/// and a tool dispatcher, implementing the agent loop pattern.
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tools: Arc<dyn ToolDispatcher>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tools: Arc<dyn ToolDispatcher>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Tool definitions this executor advertises to the model
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    /// Execute the agent loop and return the final answer
    ///
    /// Reasoning steps, when enabled, are stored in `context` under
    /// [`keys::REASONING_STEPS`].
    pub async fn run(&self, input: String, context: &mut Context) -> Result<String> {
        let steps = self.reasoning_steps(&input, context).await?;
        let system = self.system_prompt(&steps);
        let tools = self.tool_definitions();
        let mut conversation = vec![Message::user(input)];

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration = iteration,
                max_iterations = self.config.max_iterations,
                model = %self.config.model,
                tool_count = tools.len(),
                "Agent iteration started"
            );

            let request = self.build_request(system.as_deref(), &conversation, &tools);
            let response = self.provider.complete(request).await?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let calls = pending_calls(&response.message);
            conversation.push(response.message.clone());

            if response.stop_reason != StopReason::ToolUse || calls.is_empty() {
                if response.stop_reason == StopReason::MaxTokens {
                    warn!("Hit max tokens in LLM response");
                }
                let text = response.message.text().unwrap_or_default();
                info!(
                    iteration = iteration,
                    response_length = text.len(),
                    "Agent completed"
                );
                return Ok(text);
            }

            let outputs = self.execute_calls(&calls, context).await;
            conversation.push(tool_results_message(&calls, &outputs));
        }

        warn!(
            "Max iterations ({}) reached, stopping",
            self.config.max_iterations
        );
        Ok(MAX_ITERATIONS_MESSAGE.to_string())
    }

    /// Execute the agent loop, streaming events as they happen
    ///
    /// Text deltas are forwarded in arrival order. Tool calls of one turn are
    /// announced before they run, and their results are reported in call
    /// order once all of them have finished.
    pub fn run_stream(&self, input: String, context: Context) -> RunStream<'_> {
        Box::pin(self.event_stream(input, context))
    }

    fn event_stream(
        &self,
        input: String,
        mut context: Context,
    ) -> impl Stream<Item = Result<RunEvent>> + Send + '_ {
        try_stream! {
            let steps = self.reasoning_steps(&input, &mut context).await?;
            for (i, step) in steps.iter().enumerate() {
                yield RunEvent::Reasoning(step.to_markdown(i + 1));
            }

            let system = self.system_prompt(&steps);
            let tools = self.tool_definitions();
            let mut conversation = vec![Message::user(input)];
            let mut content = String::new();
            let mut usage = TokenUsage::default();
            let mut finished = false;

            for iteration in 1..=self.config.max_iterations {
                info!(
                    iteration = iteration,
                    model = %self.config.model,
                    tool_count = tools.len(),
                    "Streaming agent iteration started"
                );

                let request = self.build_request(system.as_deref(), &conversation, &tools);
                let mut events = self.provider.stream(request).await?;
                let mut accumulator = StreamAccumulator::new();

                while let Some(event) = events.next().await {
                    let event = event?;
                    if let Some(message) = event.error_message() {
                        warn!(error = %message, "Provider failed mid-stream");
                        Err::<(), _>(LLMError::RequestFailed(message))?;
                    }
                    accumulator.push(&event);
                    match event {
                        StreamEvent::TextDelta(text) => {
                            content.push_str(&text);
                            yield RunEvent::Content(text);
                        }
                        StreamEvent::ReasoningDelta(text) => yield RunEvent::Reasoning(text),
                        StreamEvent::Unrecognized(value) => yield RunEvent::Unrecognized(value),
                        StreamEvent::ToolCallDelta { .. }
                        | StreamEvent::Usage(_)
                        | StreamEvent::Finished { .. } => {}
                    }
                }

                let response = accumulator.finish()?;
                usage.accumulate(response.usage);
                debug!(stop_reason = ?response.stop_reason, "Stream finished");

                let calls = pending_calls(&response.message);
                conversation.push(response.message);

                if response.stop_reason != StopReason::ToolUse || calls.is_empty() {
                    finished = true;
                    break;
                }

                for call in &calls {
                    yield RunEvent::ToolCall {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: call.input.clone(),
                    };
                }

                let outputs = self.execute_calls(&calls, &context).await;
                conversation.push(tool_results_message(&calls, &outputs));

                for (call, output) in calls.into_iter().zip(outputs) {
                    yield RunEvent::ToolResult {
                        id: call.id,
                        name: call.name,
                        output,
                    };
                }
            }

            if !finished {
                warn!(
                    "Max iterations ({}) reached, stopping",
                    self.config.max_iterations
                );
            }

            info!(
                response_length = content.len(),
                total_tokens = usage.total(),
                "Streaming run completed"
            );
            yield RunEvent::Completed { content, usage };
        }
    }

    /// Run the reasoning pass if enabled and record its steps in the context
    async fn reasoning_steps(
        &self,
        input: &str,
        context: &mut Context,
    ) -> Result<Vec<ReasoningStep>> {
        if !self.config.reasoning {
            return Ok(Vec::new());
        }

        let settings = ReasoningSettings {
            model: self.config.model.clone(),
            max_steps: self.config.max_reasoning_steps,
            structured_outputs: self.config.structured_outputs,
            max_tokens: self.config.max_tokens,
        };
        let steps = reasoning::reason(
            self.provider.as_ref(),
            &settings,
            self.config.system_prompt.as_deref(),
            input,
        )
        .await?;

        context.insert_typed(keys::REASONING_STEPS, &steps)?;
        Ok(steps)
    }

    /// System prompt for the answering requests, with reasoning folded in
    fn system_prompt(&self, steps: &[ReasoningStep]) -> Option<String> {
        if steps.is_empty() {
            return self.config.system_prompt.clone();
        }

        let mut prompt = self.config.system_prompt.clone().unwrap_or_default();
        if !prompt.is_empty() {
            prompt.push_str("\n\n");
        }
        prompt.push_str(
            "I have worked through this problem step by step. \
             Use these reasoning steps to write the final answer:\n\n",
        );
        prompt.push_str(&reasoning::format_steps(steps));
        Some(prompt)
    }

    fn build_request(
        &self,
        system: Option<&str>,
        conversation: &[Message],
        tools: &[ToolDefinition],
    ) -> CompletionRequest {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation.to_vec())
            .max_tokens(self.config.max_tokens)
            .tools(tools.to_vec());
        if let Some(system) = system {
            builder = builder.system(system);
        }
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        builder.build()
    }

    /// Execute tool calls concurrently; outputs come back in call order
    async fn execute_calls(&self, calls: &[PendingCall], context: &Context) -> Vec<ToolOutput> {
        info!(tool_count = calls.len(), "Starting tool execution");

        let runs = calls.iter().map(|call| async move {
            let input_preview: String = call.input.to_string().chars().take(500).collect();
            info!(
                tool_name = %call.name,
                tool_id = %call.id,
                input_preview = %input_preview,
                "Executing tool"
            );

            let start_time = Instant::now();
            let result = self
                .tools
                .dispatch(&call.name, call.input.clone(), context)
                .await;
            let duration_ms = start_time.elapsed().as_millis() as u64;

            match result {
                Ok(output) => {
                    info!(
                        tool_name = %call.name,
                        duration_ms = duration_ms,
                        result_length = output.content.len(),
                        is_error = output.is_error,
                        "Tool execution finished"
                    );
                    output
                }
                Err(e) => {
                    warn!(
                        tool_name = %call.name,
                        duration_ms = duration_ms,
                        error = %e,
                        "Tool execution failed"
                    );
                    ToolOutput::error(format!("Error: {e}"))
                }
            }
        });

        join_all(runs).await
    }
}

fn pending_calls(message: &Message) -> Vec<PendingCall> {
    message
        .tool_uses()
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some(PendingCall {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            _ => None,
        })
        .collect()
}

fn tool_results_message(calls: &[PendingCall], outputs: &[ToolOutput]) -> Message {
    Message::tool_results(
        calls
            .iter()
            .zip(outputs)
            .map(|(call, output)| (call.id.clone(), output.content.clone(), output.is_error))
            .collect(),
    )
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tools: Arc<dyn ToolDispatcher>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool dispatcher (a `ToolRegistry` or a team)
    pub fn tools(mut self, tools: Arc<dyn ToolDispatcher>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Enable the reasoning pass
    pub fn reasoning(mut self, max_steps: usize, structured_outputs: bool) -> Self {
        self.config.reasoning = true;
        self.config.max_reasoning_steps = max_steps;
        self.config.structured_outputs = structured_outputs;
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            advisor_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentExecutor::new(provider, self.tools, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
