//! Concrete LLM provider implementations
//!
//! Both OpenAI and Groq speak the OpenAI chat-completions protocol, so a
//! single provider covers them; the presets on [`OpenAIConfig`] pick the
//! endpoint and provider-specific options.

pub mod openai;
mod sse;

pub use openai::{OpenAIConfig, OpenAIProvider};
