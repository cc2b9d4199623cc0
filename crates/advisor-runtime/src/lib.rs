//! Agent runtime for executing LLM agents
//!
//! This crate provides the runtime infrastructure the advisor's agents run
//! on: the [`AgentExecutor`] loop (blocking and streaming), the step-by-step
//! reasoning pass, system prompt rendering, and the [`ToolAgent`] adapter
//! that exposes an executor through the `Agent` trait.

pub mod agents;
pub mod dispatch;
pub mod executor;
pub mod prompt;
pub mod reasoning;

// Re-export key types
pub use agents::ToolAgent;
pub use dispatch::{ToolDispatcher, ToolOutput};
pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig, RunEvent, RunStream};
pub use prompt::{MemberSummary, PromptSpec, ToolSummary, render_system_prompt};
pub use reasoning::{NextAction, ReasoningSettings, ReasoningStep};
