//! Web search tools backed by DuckDuckGo

use crate::api::WebSearch;
use crate::cache::{CacheKey, ToolCache};
use crate::error::AdvisorError;
use advisor_core::Result as AgentResult;
use advisor_llm::tools::schema;
use advisor_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

const DEFAULT_MAX_RESULTS: usize = 5;
const MAX_RESULTS_CAP: usize = 25;

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

impl SearchParams {
    fn max_results(&self) -> usize {
        self.max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_CAP)
    }
}

fn search_schema(query_description: &str) -> Value {
    schema::object(
        json!({
            "query": schema::string(query_description),
            "max_results": schema::integer("Maximum number of results to return (default 5)"),
        }),
        vec!["query"],
    )
}

#[derive(Clone, Copy)]
enum SearchKind {
    Web,
    News,
}

impl SearchKind {
    fn endpoint(self) -> &'static str {
        match self {
            SearchKind::Web => "search",
            SearchKind::News => "news",
        }
    }
}

async fn run_search(
    tool: &str,
    kind: SearchKind,
    search: &Arc<dyn WebSearch>,
    cache: &ToolCache,
    params: Value,
) -> AgentResult<Value> {
    let params: SearchParams = parse_params(tool, params)?;
    let query = params.query.trim().to_string();
    if query.is_empty() {
        return Err(advisor_core::Error::invalid_input(tool, "query must not be empty"));
    }
    let max_results = params.max_results();

    let key = CacheKey::new(&query, kind.endpoint(), json!({ "max_results": max_results }));
    let value = cache
        .get_or_fetch(key, || async {
            let results = match kind {
                SearchKind::Web => search.search(&query, max_results).await?,
                SearchKind::News => search.news(&query, max_results).await?,
            };
            Ok::<_, AdvisorError>(serde_json::to_value(results)?)
        })
        .await?;

    Ok(value)
}

/// `duckduckgo_search`: general web search
pub struct DuckDuckGoSearchTool {
    search: Arc<dyn WebSearch>,
    cache: ToolCache,
}

impl DuckDuckGoSearchTool {
    /// Create the tool over a search provider and its result cache
    pub fn new(search: Arc<dyn WebSearch>, cache: ToolCache) -> Self {
        Self { search, cache }
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        run_search(self.name(), SearchKind::Web, &self.search, &self.cache, params).await
    }

    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Use this function to search DuckDuckGo for a query. \
         Returns a JSON list of results with title, url, and snippet."
    }

    fn input_schema(&self) -> Value {
        search_schema("The query to search for")
    }
}

/// `duckduckgo_news`: news-oriented search
pub struct DuckDuckGoNewsTool {
    search: Arc<dyn WebSearch>,
    cache: ToolCache,
}

impl DuckDuckGoNewsTool {
    /// Create the tool over a search provider and its result cache
    pub fn new(search: Arc<dyn WebSearch>, cache: ToolCache) -> Self {
        Self { search, cache }
    }
}

#[async_trait]
impl Tool for DuckDuckGoNewsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        run_search(self.name(), SearchKind::News, &self.search, &self.cache, params).await
    }

    fn name(&self) -> &str {
        "duckduckgo_news"
    }

    fn description(&self) -> &str {
        "Use this function to get the latest news from DuckDuckGo. \
         Returns a JSON list of results with title, url, and snippet."
    }

    fn input_schema(&self) -> Value {
        search_schema("The query to search news for")
    }
}
