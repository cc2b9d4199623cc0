//! Submission handling and team assembly

use crate::agents::{AgentSpec, ModelRef, ProviderKind, TeamSpec, ToolKind, build_team_with};
use crate::api::{DuckDuckGoClient, MarketData, WebSearch, YahooFinanceClient};
use crate::cache::CacheManager;
use crate::config::FinanceConfig;
use crate::display::{AnswerSink, stream_answer};
use crate::error::Result;
use crate::request::AdvisorRequest;
use crate::tools::{CompanyInfoTool, DuckDuckGoNewsTool, DuckDuckGoSearchTool, StockPriceTool};
use advisor_core::Agent;
use advisor_llm::LLMProvider;
use advisor_llm::providers::{OpenAIConfig, OpenAIProvider};
use advisor_runtime::{
    AgentExecutor, ExecutorConfig, PromptSpec, ToolAgent, ToolSummary, render_system_prompt,
};
use advisor_team::{Fragment, FragmentStream, RunOptions, Team};
use advisor_tools::ToolRegistry;
use async_stream::try_stream;
use chrono::Utc;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tracing::info;

/// Runs a described team and streams its output
///
/// This is the one outward call a submission makes.
pub trait Orchestrator: Send + Sync {
    /// Run `team` on `query`, streaming display fragments
    fn run_stream(&self, team: TeamSpec, query: String, options: RunOptions) -> FragmentStream<'_>;
}

/// Handle one form submission
///
/// Checks the credentials before anything else: with a key missing no
/// descriptor is built and the orchestrator is never called. Otherwise the
/// team is described, run once, and its output streamed into `sink`.
/// Returns the raw response buffer.
pub async fn run_submission(
    request: AdvisorRequest,
    config: &FinanceConfig,
    orchestrator: &dyn Orchestrator,
    sink: &mut dyn AnswerSink,
) -> Result<String> {
    request.credentials.validate()?;

    let team = build_team_with(&request, config);
    let options = RunOptions {
        show_full_reasoning: request.show_full_reasoning(),
        run_id: Some(format!("run-{}", Utc::now().timestamp_millis())),
    };

    info!(
        members = team.members.len(),
        show_full_reasoning = options.show_full_reasoning,
        query_length = request.query.len(),
        "Submission accepted"
    );

    let fragments = orchestrator.run_stream(team, request.query, options);
    stream_answer(fragments, sink, config.update_delay()).await
}

/// Orchestrator running real agents against the hosted models
pub struct TeamOrchestrator {
    config: FinanceConfig,
    search: Arc<dyn WebSearch>,
    market: Arc<dyn MarketData>,
    caches: CacheManager,
}

impl TeamOrchestrator {
    /// Create an orchestrator with DuckDuckGo and Yahoo Finance clients
    pub fn new(config: FinanceConfig) -> Result<Self> {
        config.validate()?;
        let search = DuckDuckGoClient::new(
            &config.duckduckgo_api_base,
            config.search_rate_limit,
            config.tool_timeout(),
        )?;
        let market = YahooFinanceClient::new(config.yahoo_rate_limit)?;
        Ok(Self::with_sources(config, Arc::new(search), Arc::new(market)))
    }

    /// Create an orchestrator over the given data sources
    pub fn with_sources(
        config: FinanceConfig,
        search: Arc<dyn WebSearch>,
        market: Arc<dyn MarketData>,
    ) -> Self {
        let caches = CacheManager::from_config(&config);
        Self {
            config,
            search,
            market,
            caches,
        }
    }

    /// Turn a team descriptor into a runnable team
    pub fn assemble(&self, spec: TeamSpec) -> Result<Team> {
        let mut builder = Team::builder()
            .name("Finance Advisor Team")
            .leader(
                self.provider(&spec.model)?,
                ExecutorConfig {
                    model: spec.model.id.clone(),
                    max_iterations: self.config.max_iterations,
                    ..ExecutorConfig::default()
                },
            )
            .instructions(spec.instructions)
            .show_tool_calls(spec.show_tool_calls)
            .markdown(spec.markdown);

        for member in &spec.members {
            builder = builder.member(self.member(member)?);
        }

        Ok(builder.build()?)
    }

    fn provider(&self, model: &ModelRef) -> Result<Arc<dyn LLMProvider>> {
        let config = match model.provider {
            ProviderKind::OpenAI => {
                OpenAIConfig::new(model.api_key()).with_api_base(&self.config.openai_api_base)
            }
            ProviderKind::Groq => {
                OpenAIConfig::groq(model.api_key()).with_api_base(&self.config.groq_api_base)
            }
        }
        .with_timeout(self.config.request_timeout_secs);

        Ok(Arc::new(OpenAIProvider::with_config(config)?))
    }

    fn tools(&self, kinds: &[ToolKind]) -> ToolRegistry {
        let registry = ToolRegistry::new();
        for kind in kinds {
            match *kind {
                ToolKind::WebSearch => {
                    registry.register(Arc::new(DuckDuckGoSearchTool::new(
                        self.search.clone(),
                        self.caches.search.clone(),
                    )));
                    registry.register(Arc::new(DuckDuckGoNewsTool::new(
                        self.search.clone(),
                        self.caches.search.clone(),
                    )));
                }
                ToolKind::FinancialData {
                    stock_price,
                    company_info,
                } => {
                    if stock_price {
                        registry.register(Arc::new(StockPriceTool::new(
                            self.market.clone(),
                            self.caches.quotes.clone(),
                        )));
                    }
                    if company_info {
                        registry.register(Arc::new(CompanyInfoTool::new(
                            self.market.clone(),
                            self.caches.company.clone(),
                        )));
                    }
                }
            }
        }
        registry
    }

    fn member(&self, spec: &AgentSpec) -> Result<Arc<dyn Agent>> {
        let registry = self.tools(&spec.tools);
        let tools = registry
            .list_tools()
            .iter()
            .map(|tool| ToolSummary {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect();

        let system_prompt = render_system_prompt(&PromptSpec {
            name: Some(spec.name.clone()),
            role: spec.role.clone(),
            instructions: spec.instructions.clone(),
            tools,
            members: Vec::new(),
            markdown: spec.markdown,
        })?;

        let executor = AgentExecutor::new(
            self.provider(&spec.model)?,
            Arc::new(registry),
            ExecutorConfig {
                model: spec.model.id.clone(),
                system_prompt: Some(system_prompt),
                max_iterations: self.config.max_iterations,
                reasoning: spec.reasoning,
                max_reasoning_steps: self.config.max_reasoning_steps,
                structured_outputs: spec.structured_outputs,
                ..ExecutorConfig::default()
            },
        );

        let mut agent = ToolAgent::new(executor, &spec.name);
        if let Some(role) = &spec.role {
            agent = agent.with_role(role);
        }
        Ok(Arc::new(agent))
    }
}

impl TeamOrchestrator {
    fn team_stream(
        &self,
        spec: TeamSpec,
        query: String,
        options: RunOptions,
    ) -> impl Stream<Item = advisor_core::Result<Fragment>> + Send + '_ {
        try_stream! {
            let team = self.assemble(spec)?;
            let mut fragments = team.run_stream(query, options);
            while let Some(fragment) = fragments.next().await {
                yield fragment?;
            }
        }
    }
}

impl Orchestrator for TeamOrchestrator {
    fn run_stream(&self, team: TeamSpec, query: String, options: RunOptions) -> FragmentStream<'_> {
        Box::pin(self.team_stream(team, query, options))
    }
}
