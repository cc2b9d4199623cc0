//! Tool trait definition

use advisor_core::{Error, Result};
use advisor_llm::ToolDefinition;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Tools are functions that LLM agents can call to interact with the world.
/// Each tool must provide a name, description, and JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// # Arguments
    ///
    /// * `params` - Tool input as JSON value (should match input_schema)
    ///
    /// # Returns
    ///
    /// Tool output as JSON value
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry and match the name in ToolDefinition
    fn name(&self) -> &str;

    /// Get the tool's description
    ///
    /// This description helps the LLM understand when to use this tool
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    fn input_schema(&self) -> Value;

    /// Describe this tool for an LLM request
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// Deserialize tool parameters, reporting failures against the tool name
///
/// # Example
///
/// ```
/// use advisor_tools::parse_params;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Params {
///     symbol: String,
/// }
///
/// let params: Params = parse_params("get_current_stock_price", json!({"symbol": "AAPL"})).unwrap();
/// assert_eq!(params.symbol, "AAPL");
/// ```
pub fn parse_params<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| Error::invalid_input(tool, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct SearchParams {
        query: String,
        #[serde(default)]
        max_results: Option<usize>,
    }

    #[test]
    fn test_parse_params_ok() {
        let params: SearchParams =
            parse_params("duckduckgo_search", json!({"query": "NVDA earnings"})).unwrap();
        assert_eq!(params.query, "NVDA earnings");
        assert!(params.max_results.is_none());
    }

    #[test]
    fn test_parse_params_reports_tool() {
        let err = parse_params::<SearchParams>("duckduckgo_search", json!({"q": 1})).unwrap_err();
        match err {
            Error::InvalidToolInput { tool, reason } => {
                assert_eq!(tool, "duckduckgo_search");
                assert!(reason.contains("query"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
