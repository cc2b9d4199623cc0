//! Agent descriptors for one submission
//!
//! Descriptors are plain data. They are built fresh for every submission and
//! only turned into live agents by the orchestrator.

use crate::config::FinanceConfig;
use crate::request::AdvisorRequest;
use serde::Serialize;
use std::fmt;

/// Name of the web research member
pub const WEB_AGENT: &str = "Web Agent";
/// Name of the financial data member
pub const FINANCE_AGENT: &str = "Finance Agent";
/// Name of the integrating member
pub const REASONING_AGENT: &str = "Reasoning Agent";

/// Hosted model vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAI,
    /// Groq, OpenAI-compatible
    Groq,
}

/// Which model an agent runs on, with the key to reach it
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ModelRef {
    /// Vendor
    pub provider: ProviderKind,
    /// Model id
    pub id: String,
    #[serde(skip)]
    api_key: String,
}

impl ModelRef {
    /// An OpenAI model
    pub fn openai(id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            id: id.into(),
            api_key: api_key.into(),
        }
    }

    /// A Groq model
    pub fn groq(id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::Groq,
            id: id.into(),
            api_key: api_key.into(),
        }
    }

    /// Key for the vendor
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRef")
            .field("provider", &self.provider)
            .field("id", &self.id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A tool set an agent may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToolKind {
    /// DuckDuckGo web and news search
    WebSearch,
    /// Yahoo Finance data
    FinancialData {
        /// `get_current_stock_price`
        stock_price: bool,
        /// `get_company_info`
        company_info: bool,
    },
}

/// Descriptor of one agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSpec {
    /// Display name
    pub name: String,
    /// One-line role
    pub role: Option<String>,
    /// Model to run on
    pub model: ModelRef,
    /// Instruction lines
    pub instructions: Vec<String>,
    /// Tool sets
    pub tools: Vec<ToolKind>,
    /// Ask for markdown output
    pub markdown: bool,
    /// Surface tool calls in the output
    pub show_tool_calls: bool,
    /// Run a reasoning pass before answering
    pub reasoning: bool,
    /// Ask for JSON mode during reasoning
    pub structured_outputs: bool,
}

/// Descriptor of the whole team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSpec {
    /// Member descriptors, in order
    pub members: Vec<AgentSpec>,
    /// Leader instruction lines
    pub instructions: Vec<String>,
    /// Leader model
    pub model: ModelRef,
    /// Surface the leader's tool calls
    pub show_tool_calls: bool,
    /// Ask the leader for markdown output
    pub markdown: bool,
}

fn lines(items: [&str; 3]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Build the team descriptor with the default models
pub fn build_team(request: &AdvisorRequest) -> TeamSpec {
    build_team_with(request, &FinanceConfig::default())
}

/// Build the team descriptor with models taken from `config`
pub fn build_team_with(request: &AdvisorRequest, config: &FinanceConfig) -> TeamSpec {
    let openai_key = request.credentials.openai_api_key();
    let groq_key = request.credentials.groq_api_key();

    let web_agent = AgentSpec {
        name: WEB_AGENT.to_string(),
        role: Some(
            "Search the web for up-to-date financial news, market trends, and expert analysis"
                .to_string(),
        ),
        model: ModelRef::openai(&config.web_model, openai_key),
        instructions: lines([
            "Always provide verified sources and links to reputable financial news outlets.",
            "Include context on market trends and current events affecting the finance world.",
            "Summarize information clearly and accurately.",
        ]),
        tools: vec![ToolKind::WebSearch],
        markdown: true,
        show_tool_calls: true,
        reasoning: false,
        structured_outputs: false,
    };

    let finance_agent = AgentSpec {
        name: FINANCE_AGENT.to_string(),
        role: Some(
            "Retrieve and analyze financial data, perform calculations, and offer detailed insights"
                .to_string(),
        ),
        model: ModelRef::openai(&config.finance_model, openai_key),
        instructions: lines([
            "Provide detailed, step-by-step financial calculations where necessary.",
            "Always use tables for a clear presentation of numerical data.",
            "Verify data accuracy and include sources or references when available.",
        ]),
        tools: vec![ToolKind::FinancialData {
            stock_price: true,
            company_info: true,
        }],
        markdown: true,
        show_tool_calls: true,
        reasoning: false,
        structured_outputs: false,
    };

    let reasoning_agent = AgentSpec {
        name: REASONING_AGENT.to_string(),
        role: Some(
            "Integrate outputs from the Web and Finance agents to produce a reliable, \
             comprehensive final financial analysis"
                .to_string(),
        ),
        model: ModelRef::groq(&config.reasoning_model, groq_key),
        instructions: lines([
            "Aggregate the outputs from the Web and Finance agents, ensuring consistency and accuracy.",
            "Provide a final analysis that includes step-by-step reasoning and clearly highlights any calculations and assumptions.",
            "Cite sources from the individual agent responses where applicable.",
        ]),
        tools: Vec::new(),
        markdown: true,
        show_tool_calls: false,
        reasoning: true,
        structured_outputs: true,
    };

    TeamSpec {
        members: vec![web_agent, finance_agent, reasoning_agent],
        instructions: request.instruction_lines(),
        model: ModelRef::openai(&config.leader_model, openai_key),
        show_tool_calls: true,
        markdown: true,
    }
}
