//! LLM provider abstraction layer for the finance advisor
//!
//! This crate provides provider-agnostic abstractions for talking to hosted
//! chat-completion models. It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Streaming events and an accumulator that folds them back into a response
//! - Tool definitions for function calling
//! - Provider trait plus an OpenAI-compatible implementation (OpenAI, Groq)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod stream;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, ResponseFormat, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use stream::{CompletionStream, StreamAccumulator, StreamEvent};
pub use tools::ToolDefinition;
