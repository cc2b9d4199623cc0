//! Error types for the finance advisor

use advisor_utils::ConfigError;
use thiserror::Error;

/// Message shown when a submission lacks a credential
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please provide both OpenAI and Groq API keys.";

/// Finance advisor errors
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// One or both API keys were left empty
    #[error("Please provide both OpenAI and Groq API keys.")]
    MissingCredentials,

    /// Invalid or unreadable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Agent or team failure
    #[error("Agent error: {0}")]
    Agent(#[from] advisor_core::Error),

    /// LLM provider failure outside an agent run
    #[error("LLM error: {0}")]
    Llm(#[from] advisor_llm::LLMError),

    /// Web search failure
    #[error("Search error: {0}")]
    SearchError(String),

    /// Yahoo Finance failure
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        /// Ticker symbol
        symbol: String,
        /// Why nothing came back
        reason: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The answer could not be rendered
    #[error("Display error: {0}")]
    DisplayError(String),
}

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Tool failures reach the model as `ProcessingFailed`
impl From<AdvisorError> for advisor_core::Error {
    fn from(err: AdvisorError) -> Self {
        match err {
            AdvisorError::Agent(inner) => inner,
            other => advisor_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AdvisorError::MissingCredentials.to_string(),
            MISSING_CREDENTIALS_MESSAGE
        );

        let err = AdvisorError::DataUnavailable {
            symbol: "ZZZZ".to_string(),
            reason: "No quotes".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for ZZZZ: No quotes");
    }

    #[test]
    fn test_error_conversion() {
        let agent_err: advisor_core::Error =
            AdvisorError::YahooFinanceError("timeout".to_string()).into();
        match agent_err {
            advisor_core::Error::ProcessingFailed(msg) => assert!(msg.contains("timeout")),
            other => panic!("Expected ProcessingFailed, got {other:?}"),
        }

        let inner = advisor_core::Error::ToolNotFound("x".to_string());
        let round_trip: advisor_core::Error = AdvisorError::from(inner).into();
        assert!(matches!(round_trip, advisor_core::Error::ToolNotFound(_)));
    }
}
