//! Error types for advisor-core

use thiserror::Error;

/// Result type alias for advisor-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// The model asked for a tool that is not registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments did not match the tool's schema
    #[error("Invalid input for tool '{tool}': {reason}")]
    InvalidToolInput {
        /// Tool name
        tool: String,
        /// What was wrong with the input
        reason: String,
    },
}

impl Error {
    /// Build an [`Error::InvalidToolInput`] from any displayable reason
    pub fn invalid_input(tool: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidToolInput {
            tool: tool.into(),
            reason: reason.to_string(),
        }
    }
}
