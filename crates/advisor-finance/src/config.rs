//! Configuration for the finance advisor

use advisor_utils::{ConfigError, load_json};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for models, upstream APIs, caching, and display
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceConfig {
    /// Model for the team leader
    pub leader_model: String,
    /// Model for the web agent
    pub web_model: String,
    /// Model for the finance agent
    pub finance_model: String,
    /// Groq model for the reasoning agent
    pub reasoning_model: String,

    /// OpenAI-compatible base URL for OpenAI models
    pub openai_api_base: String,
    /// OpenAI-compatible base URL for Groq models
    pub groq_api_base: String,
    /// DuckDuckGo Instant Answer endpoint
    pub duckduckgo_api_base: String,

    /// Timeout for LLM requests, in seconds
    pub request_timeout_secs: u64,
    /// Timeout for tool HTTP requests, in seconds
    pub tool_timeout_secs: u64,

    /// Cache TTL for stock prices, in seconds
    pub cache_ttl_quote_secs: u64,
    /// Cache TTL for company information, in seconds
    pub cache_ttl_company_secs: u64,
    /// Cache TTL for search results, in seconds
    pub cache_ttl_search_secs: u64,

    /// Yahoo Finance requests per minute
    pub yahoo_rate_limit: u32,
    /// DuckDuckGo requests per minute
    pub search_rate_limit: u32,

    /// Pause after each rendered fragment, in milliseconds
    pub update_delay_ms: u64,

    /// Upper bound on reasoning steps for reasoning agents
    pub max_reasoning_steps: usize,
    /// Upper bound on agent loop iterations
    pub max_iterations: usize,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            leader_model: "gpt-4o".to_string(),
            web_model: "gpt-4o".to_string(),
            finance_model: "gpt-4o".to_string(),
            reasoning_model: "deepseek-r1-distill-llama-70b".to_string(),
            openai_api_base: "https://api.openai.com/v1".to_string(),
            groq_api_base: "https://api.groq.com/openai/v1".to_string(),
            duckduckgo_api_base: "https://api.duckduckgo.com".to_string(),
            request_timeout_secs: 120,
            tool_timeout_secs: 30,
            cache_ttl_quote_secs: 60,     // 1 minute
            cache_ttl_company_secs: 3600, // 1 hour
            cache_ttl_search_secs: 300,   // 5 minutes
            yahoo_rate_limit: 60,
            search_rate_limit: 30,
            update_delay_ms: 75,
            max_reasoning_steps: 10,
            max_iterations: 10,
        }
    }
}

impl FinanceConfig {
    /// Create a new configuration builder
    pub fn builder() -> FinanceConfigBuilder {
        FinanceConfigBuilder::default()
    }

    /// Load and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let models = [
            ("leader_model", &self.leader_model),
            ("web_model", &self.web_model),
            ("finance_model", &self.finance_model),
            ("reasoning_model", &self.reasoning_model),
        ];
        for (field, model) in models {
            if model.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }

        let bases = [
            ("openai_api_base", &self.openai_api_base),
            ("groq_api_base", &self.groq_api_base),
            ("duckduckgo_api_base", &self.duckduckgo_api_base),
        ];
        for (field, base) in bases {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be an http(s) URL, got '{base}'"
                )));
            }
        }

        if self.request_timeout_secs == 0 || self.tool_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeouts must be greater than 0".to_string(),
            ));
        }
        if self.yahoo_rate_limit == 0 || self.search_rate_limit == 0 {
            return Err(ConfigError::Invalid(
                "rate limits must be greater than 0".to_string(),
            ));
        }
        if self.max_reasoning_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_reasoning_steps must be at least 1".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Pause after each rendered fragment
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }

    /// Cache TTL for stock prices
    pub fn cache_ttl_quote(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_quote_secs)
    }

    /// Cache TTL for company information
    pub fn cache_ttl_company(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_company_secs)
    }

    /// Cache TTL for search results
    pub fn cache_ttl_search(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_search_secs)
    }

    /// Timeout for tool HTTP requests
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

/// Builder for FinanceConfig
#[derive(Debug, Default)]
pub struct FinanceConfigBuilder {
    config: Option<FinanceConfig>,
}

impl FinanceConfigBuilder {
    fn config(&mut self) -> &mut FinanceConfig {
        self.config.get_or_insert_with(FinanceConfig::default)
    }

    /// Set the leader model
    pub fn leader_model(mut self, model: impl Into<String>) -> Self {
        self.config().leader_model = model.into();
        self
    }

    /// Set the reasoning model
    pub fn reasoning_model(mut self, model: impl Into<String>) -> Self {
        self.config().reasoning_model = model.into();
        self
    }

    /// Set the OpenAI base URL
    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.config().openai_api_base = base.into();
        self
    }

    /// Set the Groq base URL
    pub fn groq_api_base(mut self, base: impl Into<String>) -> Self {
        self.config().groq_api_base = base.into();
        self
    }

    /// Set the LLM request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.config().request_timeout_secs = duration.as_secs();
        self
    }

    /// Set the cache TTLs (quote, company, search)
    pub fn cache_ttls(mut self, quote: Duration, company: Duration, search: Duration) -> Self {
        let config = self.config();
        config.cache_ttl_quote_secs = quote.as_secs();
        config.cache_ttl_company_secs = company.as_secs();
        config.cache_ttl_search_secs = search.as_secs();
        self
    }

    /// Set the per-minute rate limits (Yahoo Finance, DuckDuckGo)
    pub fn rate_limits(mut self, yahoo: u32, search: u32) -> Self {
        let config = self.config();
        config.yahoo_rate_limit = yahoo;
        config.search_rate_limit = search;
        self
    }

    /// Set the display update delay
    pub fn update_delay(mut self, delay: Duration) -> Self {
        self.config().update_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the reasoning step bound
    pub fn max_reasoning_steps(mut self, steps: usize) -> Self {
        self.config().max_reasoning_steps = steps;
        self
    }

    /// Set the agent iteration bound
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.config().max_iterations = iterations;
        self
    }

    /// Build the configuration
    pub fn build(mut self) -> Result<FinanceConfig, ConfigError> {
        let config = self.config.take().unwrap_or_default();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FinanceConfig::default();
        assert_eq!(config.leader_model, "gpt-4o");
        assert_eq!(config.reasoning_model, "deepseek-r1-distill-llama-70b");
        assert_eq!(config.update_delay(), Duration::from_millis(75));
        assert_eq!(config.request_timeout_secs, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = FinanceConfig::builder()
            .update_delay(Duration::ZERO)
            .max_reasoning_steps(4)
            .rate_limits(10, 5)
            .build()
            .unwrap();

        assert_eq!(config.update_delay(), Duration::ZERO);
        assert_eq!(config.max_reasoning_steps, 4);
        assert_eq!(config.yahoo_rate_limit, 10);
        assert_eq!(config.leader_model, "gpt-4o");
    }

    #[test]
    fn test_validation() {
        assert!(FinanceConfig::builder().max_reasoning_steps(0).build().is_err());
        assert!(FinanceConfig::builder().rate_limits(0, 1).build().is_err());
        assert!(FinanceConfig::builder().leader_model("  ").build().is_err());
        assert!(
            FinanceConfig::builder()
                .groq_api_base("api.groq.com")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_partial_json() {
        let config: FinanceConfig =
            serde_json::from_str(r#"{"reasoning_model": "qwen-qwq-32b", "update_delay_ms": 0}"#)
                .unwrap();
        assert_eq!(config.reasoning_model, "qwen-qwq-32b");
        assert_eq!(config.update_delay_ms, 0);
        assert_eq!(config.web_model, "gpt-4o");
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("advisor-finance-{}.json", std::process::id()));
        std::fs::write(&good, r#"{"max_iterations": 4}"#).unwrap();
        assert_eq!(FinanceConfig::from_file(&good).unwrap().max_iterations, 4);

        std::fs::write(&good, r#"{"max_iterations": 0}"#).unwrap();
        assert!(matches!(
            FinanceConfig::from_file(&good),
            Err(ConfigError::Invalid(_))
        ));
        std::fs::remove_file(&good).unwrap();
    }
}
