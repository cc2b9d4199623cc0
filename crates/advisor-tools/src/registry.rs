//! Tool registry for managing available tools

use crate::Tool;
use advisor_llm::ToolDefinition;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry for managing tools
///
/// Tools are kept ordered by name so the definitions sent to the model are
/// stable from one request to the next.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    /// List all registered tools
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().cloned().collect()
    }

    /// Names of all registered tools
    pub fn names(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.keys().cloned().collect()
    }

    /// Tool definitions for an LLM request
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list_tools().iter().map(|t| t.definition()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::Result;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        async fn execute(&self, params: Value) -> Result<Value> {
            Ok(json!({"tool": self.0, "params": params}))
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Named("get_current_stock_price")));
        registry.register(Arc::new(Named("get_company_info")));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("get_company_info").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_definitions_sorted_by_name() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Named("duckduckgo_search")));
        registry.register(Arc::new(Named("duckduckgo_news")));

        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["duckduckgo_news", "duckduckgo_search"]);
        assert_eq!(registry.names(), names);
    }

    #[test]
    fn test_registered_tool_executes() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Named("echo")));

        let tool = registry.get("echo").unwrap();
        let out = tokio_test::block_on(tool.execute(json!({"x": 1}))).unwrap();
        assert_eq!(out["params"]["x"], 1);
    }
}
