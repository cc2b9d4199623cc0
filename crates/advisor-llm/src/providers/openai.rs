//! OpenAI-compatible provider implementation
//!
//! This module implements the LLMProvider trait for the OpenAI
//! chat-completions protocol. See: https://platform.openai.com/docs/api-reference/chat
//!
//! Groq exposes the same protocol under `/openai/v1`, so the same provider
//! serves both; [`OpenAIConfig::groq`] selects the Groq endpoint.
//!
//! # Examples
//!
//! ```no_run
//! use advisor_llm::{CompletionRequest, Message, LLMProvider};
//! use advisor_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAIProvider::with_config(OpenAIConfig::groq("gsk-..."))?;
//!
//!     let request = CompletionRequest::builder("deepseek-r1-distill-llama-70b")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```

use super::sse::{DONE, SseBuffer};
use crate::stream::provider_error;
use crate::{
    CompletionRequest, CompletionResponse, CompletionStream, ContentBlock, LLMError, LLMProvider,
    Message, MessageContent, ResponseFormat, Result, Role, StopReason, StreamEvent, TokenUsage,
    ToolDefinition,
};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for an OpenAI-compatible provider
#[derive(Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Name reported by [`LLMProvider::name`]
    pub provider_name: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// How reasoning models should return their reasoning (Groq only)
    pub reasoning_format: Option<String>,

    /// Optional list of supported models
    /// If None, any model string is accepted
    pub supported_models: Option<Vec<String>>,
}

impl fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("provider_name", &self.provider_name)
            .field("timeout_secs", &self.timeout_secs)
            .field("reasoning_format", &self.reasoning_format)
            .field("supported_models", &self.supported_models)
            .finish()
    }
}

impl OpenAIConfig {
    /// Create a config for api.openai.com with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create a config for Groq's OpenAI-compatible endpoint
    ///
    /// Reasoning output is requested in the `parsed` format so it arrives in
    /// its own field instead of inline `<think>` tags.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GROQ_API_BASE.to_string(),
            provider_name: "groq".to_string(),
            reasoning_format: Some("parsed".to_string()),
            ..Self::default()
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set or clear the reasoning format
    pub fn with_reasoning_format(mut self, format: Option<String>) -> Self {
        self.reasoning_format = format;
        self
    }

    /// Set supported models list
    ///
    /// When set, the provider will validate model names against this list.
    /// When None (default), any model string is accepted.
    pub fn with_supported_models(mut self, models: Vec<String>) -> Self {
        self.supported_models = Some(models);
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            provider_name: "openai".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            reasoning_format: None,
            supported_models: None,
        }
    }
}

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new provider with custom configuration
    ///
    /// Fails when the API key is blank or the HTTP client cannot be built.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(format!(
                "{} API key is empty",
                config.provider_name
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new OpenAI provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Validate model name against supported models list (if configured)
    fn validate_model(&self, model: &str) -> Result<()> {
        if let Some(supported) = &self.config.supported_models {
            if !supported.iter().any(|m| m == model) {
                return Err(LLMError::InvalidRequest(format!(
                    "Model '{model}' is not in the supported models list: {supported:?}"
                )));
            }
        }
        Ok(())
    }

    fn build_request(&self, request: CompletionRequest, stream: bool) -> OpenAIRequest {
        OpenAIRequest {
            model: request.model,
            messages: build_openai_messages(request.system, request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: request.tools.as_deref().map(convert_tools),
            stop: request.stop_sequences,
            response_format: request.response_format,
            reasoning_format: self.config.reasoning_format.clone(),
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    /// POST the request and map non-success statuses to errors
    async fn send(&self, body: &OpenAIRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await?;
        Err(match status.as_u16() {
            401 => LLMError::AuthenticationFailed(self.config.provider_name.clone()),
            429 => LLMError::RateLimitExceeded(error_text),
            400 => LLMError::InvalidRequest(error_text),
            404 => LLMError::ModelNotFound(body.model.clone()),
            _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(provider = %self.config.provider_name, model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.validate_model(&request.model)?;

        let body = self.build_request(request, false);
        let response = self.send(&body).await?;

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        // OpenAI can return multiple choices but we only ask for one
        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let usage = openai_response.usage.map(TokenUsage::from).unwrap_or_default();
        debug!(
            stop_reason = %choice.finish_reason,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Received completion"
        );

        let stop_reason = map_stop_reason(&choice.finish_reason);
        let reasoning = choice.message.reasoning.clone().filter(|r| !r.is_empty());
        let message = parse_openai_response(choice.message)?;

        Ok(CompletionResponse {
            message,
            reasoning,
            stop_reason,
            usage,
        })
    }

    #[instrument(skip(self, request), fields(provider = %self.config.provider_name, model = %request.model))]
    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        self.validate_model(&request.model)?;

        let body = self.build_request(request, true);
        let response = self.send(&body).await?;
        debug!("Streaming completion");

        Ok(Box::pin(sse_events(response)))
    }

    fn name(&self) -> &str {
        &self.config.provider_name
    }
}

/// Turn an SSE response body into stream events
fn sse_events(response: reqwest::Response) -> impl Stream<Item = Result<StreamEvent>> + Send {
    try_stream! {
        let mut bytes = response.bytes_stream();
        let mut buffer = SseBuffer::default();
        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for data in buffer.push(&chunk) {
                if data == DONE {
                    continue;
                }
                for event in parse_stream_data(&data)? {
                    yield event;
                }
            }
        }
        if let Some(data) = buffer.finish() {
            if data != DONE {
                for event in parse_stream_data(&data)? {
                    yield event;
                }
            }
        }
    }
}

/// Map one SSE payload to events
///
/// A chunk with a top-level `error` object is the provider failing mid-stream
/// and becomes an error. Other payloads that are not the expected chunk shape
/// are passed through as [`StreamEvent::Unrecognized`] rather than dropped.
fn parse_stream_data(data: &str) -> Result<Vec<StreamEvent>> {
    let value: serde_json::Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            warn!("failed to parse chunk: {e}, data: {data}");
            return Ok(vec![StreamEvent::Unrecognized(serde_json::Value::String(
                data.to_string(),
            ))]);
        }
    };

    if let Some(message) = provider_error(&value) {
        warn!(error = %message, "Provider reported an error mid-stream");
        return Err(LLMError::RequestFailed(message));
    }

    let chunk: OpenAIStreamChunk = match serde_json::from_value(value.clone()) {
        Ok(chunk) => chunk,
        Err(e) => {
            debug!("unrecognized chunk shape: {e}");
            return Ok(vec![StreamEvent::Unrecognized(value)]);
        }
    };

    let usage = chunk.usage.map(TokenUsage::from);
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(match usage {
            Some(usage) => vec![StreamEvent::Usage(usage)],
            None => vec![StreamEvent::Unrecognized(value)],
        });
    };

    let mut events = Vec::new();
    let delta = choice.delta;
    if let Some(reasoning) = delta.reasoning.filter(|r| !r.is_empty()) {
        events.push(StreamEvent::ReasoningDelta(reasoning));
    }
    if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
        events.push(StreamEvent::TextDelta(content));
    }
    for call in delta.tool_calls.unwrap_or_default() {
        let (name, arguments) = match call.function {
            Some(function) => (function.name, function.arguments.unwrap_or_default()),
            None => (None, String::new()),
        };
        events.push(StreamEvent::ToolCallDelta {
            index: call.index,
            id: call.id,
            name,
            arguments,
        });
    }
    if let Some(reason) = choice.finish_reason {
        events.push(StreamEvent::Finished {
            stop_reason: map_stop_reason(&reason),
            usage,
        });
    } else if let Some(usage) = usage {
        events.push(StreamEvent::Usage(usage));
    }
    Ok(events)
}

// ============================================================================
// OpenAI-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_format: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

/// Asks for a final usage-only chunk on streamed requests
#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAIMessage {
    fn text(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

// ============================================================================
// OpenAI-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    #[serde(default, alias = "reasoning_content")]
    reasoning: Option<String>,
    tool_calls: Option<Vec<OpenAIResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseToolCall {
    id: String,
    function: OpenAIResponseFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

impl From<OpenAIUsage> for TokenUsage {
    fn from(usage: OpenAIUsage) -> Self {
        TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChunk {
    choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChoice {
    #[serde(default)]
    delta: OpenAIDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIDelta {
    content: Option<String>,
    #[serde(default, alias = "reasoning_content")]
    reasoning: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCallDelta {
    index: usize,
    id: Option<String>,
    function: Option<OpenAIFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Build OpenAI messages from our generic format
///
/// The system prompt becomes the first message in the array.
fn build_openai_messages(system: Option<String>, messages: Vec<Message>) -> Vec<OpenAIMessage> {
    let mut result = Vec::new();

    if let Some(sys) = system {
        result.push(OpenAIMessage::text("system", sys));
    }

    for msg in messages {
        result.extend(convert_message(msg));
    }

    result
}

/// Convert a single message to OpenAI format
///
/// This may return multiple OpenAI messages (tool results become separate messages)
fn convert_message(msg: Message) -> Vec<OpenAIMessage> {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    };

    match msg.content {
        Some(MessageContent::Text(text)) => vec![OpenAIMessage::text(role, text)],
        Some(MessageContent::Blocks(blocks)) => convert_blocks(role, blocks),
        None => vec![OpenAIMessage::text(role, String::new())],
    }
}

/// Convert content blocks to OpenAI messages
fn convert_blocks(role: &str, blocks: Vec<ContentBlock>) -> Vec<OpenAIMessage> {
    let mut messages = Vec::new();
    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => text_parts.push(text),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(OpenAIToolCall {
                    id,
                    tool_type: "function".to_string(),
                    function: OpenAIFunctionCall {
                        name,
                        arguments: input.to_string(),
                    },
                });
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => {
                messages.push(OpenAIMessage {
                    role: "tool".to_string(),
                    content: Some(content),
                    tool_calls: None,
                    tool_call_id: Some(tool_use_id),
                });
            }
        }
    }

    if !text_parts.is_empty() || !tool_calls.is_empty() {
        let content = if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.concat())
        };

        messages.insert(
            0,
            OpenAIMessage {
                role: role.to_string(),
                content,
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                tool_call_id: None,
            },
        );
    }

    messages
}

/// Convert tool definitions to OpenAI format
fn convert_tools(tools: &[ToolDefinition]) -> Vec<OpenAITool> {
    tools
        .iter()
        .map(|tool| OpenAITool {
            tool_type: "function".to_string(),
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

/// Parse OpenAI response message to our format
fn parse_openai_response(msg: OpenAIResponseMessage) -> Result<Message> {
    let mut blocks = Vec::new();

    if let Some(content) = msg.content {
        if !content.is_empty() {
            blocks.push(ContentBlock::Text { text: content });
        }
    }

    if let Some(tool_calls) = msg.tool_calls {
        for call in tool_calls {
            let input: serde_json::Value = if call.function.arguments.trim().is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&call.function.arguments).map_err(|e| {
                    LLMError::UnexpectedResponse(format!("Failed to parse tool arguments: {e}"))
                })?
            };

            blocks.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            });
        }
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: String::new(),
        });
    }

    Ok(Message {
        role: Role::Assistant,
        content: Some(MessageContent::Blocks(blocks)),
    })
}

/// Map OpenAI stop reason to our format
fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "content_filter" => {
            debug!("Content filtered by provider safety systems");
            StopReason::EndTurn
        }
        _ => {
            debug!("Unknown stop reason: {}", reason);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
