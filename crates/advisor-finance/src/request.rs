//! One submission from the form

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instructions pre-filled for the team leader
pub const DEFAULT_INSTRUCTIONS: &str = "\
Act as a reliable financial advisor capable of answering any finance-related questions.
Generate separate outputs for market research and financial data analysis, then integrate them into one comprehensive final answer.
Always include verified sources, clear numerical data, and step-by-step reasoning.";

/// Question pre-filled in the form
pub const DEFAULT_QUERY: &str = "Where should I invest my 10,000 dollars for 100% revenue?";

/// API keys for the hosted models, valid for one submission
///
/// Keys can be read from a serialized request but are never written out.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing)]
    openai_api_key: String,
    #[serde(default, skip_serializing)]
    groq_api_key: String,
}

impl Credentials {
    /// Wrap the two keys as entered; surrounding whitespace is dropped
    pub fn new(openai_api_key: impl Into<String>, groq_api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: openai_api_key.into().trim().to_string(),
            groq_api_key: groq_api_key.into().trim().to_string(),
        }
    }

    /// OpenAI key
    pub fn openai_api_key(&self) -> &str {
        &self.openai_api_key
    }

    /// Groq key
    pub fn groq_api_key(&self) -> &str {
        &self.groq_api_key
    }

    /// Both keys present
    pub fn is_complete(&self) -> bool {
        !self.openai_api_key.trim().is_empty() && !self.groq_api_key.trim().is_empty()
    }

    /// Fail with [`AdvisorError::MissingCredentials`] unless both keys are present
    pub fn validate(&self) -> Result<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(AdvisorError::MissingCredentials)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &str| if key.is_empty() { "<empty>" } else { "<redacted>" };
        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("groq_api_key", &redact(&self.groq_api_key))
            .finish()
    }
}

/// Everything one submission carries, passed by value into the handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorRequest {
    /// API keys
    pub credentials: Credentials,
    /// Team leader instructions, one per line
    pub instructions: String,
    /// The finance question
    pub query: String,
    /// Hide reasoning in the streamed answer
    pub close_reasoning: bool,
}

impl Default for AdvisorRequest {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            query: DEFAULT_QUERY.to_string(),
            close_reasoning: false,
        }
    }
}

impl AdvisorRequest {
    /// Create a request with the default instructions
    pub fn new(credentials: Credentials, query: impl Into<String>) -> Self {
        Self {
            credentials,
            query: query.into(),
            ..Self::default()
        }
    }

    /// Replace the leader instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Set the close-reasoning toggle
    pub fn with_close_reasoning(mut self, close_reasoning: bool) -> Self {
        self.close_reasoning = close_reasoning;
        self
    }

    /// Whether the run should surface reasoning
    pub fn show_full_reasoning(&self) -> bool {
        !self.close_reasoning
    }

    /// Non-blank instruction lines, trimmed
    pub fn instruction_lines(&self) -> Vec<String> {
        self.instructions
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("sk-a", "gsk-b").validate().is_ok());
        for (openai, groq) in [("", "gsk-b"), ("sk-a", ""), ("  ", "\t"), ("", "")] {
            assert!(matches!(
                Credentials::new(openai, groq).validate(),
                Err(AdvisorError::MissingCredentials)
            ));
        }
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let debug = format!("{:?}", Credentials::new("sk-secret", ""));
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("<empty>"));

        let request = AdvisorRequest::new(Credentials::new("sk-secret", "gsk-secret"), "q");
        assert!(!format!("{request:?}").contains("secret"));
    }

    #[test]
    fn test_keys_never_serialized() {
        let request = AdvisorRequest::new(Credentials::new("sk-secret", "gsk-secret"), "Bonds?");
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("Bonds?"));

        let incoming: AdvisorRequest = serde_json::from_value(serde_json::json!({
            "credentials": {"openai_api_key": "sk-a", "groq_api_key": "gsk-b"},
            "instructions": "",
            "query": "q",
            "close_reasoning": false,
        }))
        .unwrap();
        assert!(incoming.credentials.is_complete());

        let round_trip: AdvisorRequest = serde_json::from_str(&json).unwrap();
        assert!(!round_trip.credentials.is_complete());
    }

    #[test]
    fn test_defaults() {
        let request = AdvisorRequest::default();
        assert_eq!(request.query, DEFAULT_QUERY);
        assert!(request.show_full_reasoning());
        assert_eq!(request.instruction_lines().len(), 3);
        assert!(request.instruction_lines()[0].starts_with("Act as a reliable financial advisor"));
    }

    #[test]
    fn test_instruction_lines_skip_blanks() {
        let request = AdvisorRequest::default()
            .with_instructions("  Be brief  \n\n\nCite sources\n")
            .with_close_reasoning(true);
        assert_eq!(request.instruction_lines(), vec!["Be brief", "Cite sources"]);
        assert!(!request.show_full_reasoning());
    }
}
