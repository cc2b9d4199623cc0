//! Multi-agent finance advisor
//!
//! A web agent, a finance agent, and a reasoning agent answer finance
//! questions as a team. This crate holds everything specific to that team:
//!
//! - [`request`]: the submission (credentials, instructions, query, toggles)
//! - [`agents`]: the agent descriptors built for each submission
//! - [`tools`] and [`api`]: DuckDuckGo search and Yahoo Finance data
//! - [`display`] and [`markdown`]: the streaming render loop
//! - [`advisor`]: the submission handler and the orchestrator running the team
//!
//! # Example
//!
//! ```no_run
//! use advisor_finance::{
//!     AdvisorRequest, AnswerSink, Credentials, FinanceConfig, TeamOrchestrator, run_submission,
//! };
//!
//! struct Stdout;
//!
//! impl AnswerSink for Stdout {
//!     fn render(&mut self, markdown: &str) -> advisor_finance::Result<()> {
//!         println!("{markdown}");
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> advisor_finance::Result<()> {
//! let config = FinanceConfig::default();
//! let orchestrator = TeamOrchestrator::new(config.clone())?;
//! let request = AdvisorRequest::new(
//!     Credentials::new("sk-...", "gsk_..."),
//!     "Is NVDA a good long-term investment?",
//! );
//!
//! let answer = run_submission(request, &config, &orchestrator, &mut Stdout).await?;
//! # Ok(())
//! # }
//! ```

pub mod advisor;
pub mod agents;
pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod markdown;
pub mod request;
pub mod tools;

pub use advisor::{Orchestrator, TeamOrchestrator, run_submission};
pub use agents::{AgentSpec, ModelRef, ProviderKind, TeamSpec, ToolKind, build_team, build_team_with};
pub use config::FinanceConfig;
pub use display::{AnswerSink, stream_answer};
pub use error::{AdvisorError, MISSING_CREDENTIALS_MESSAGE, Result};
pub use markdown::adjust_markdown_headings;
pub use request::{AdvisorRequest, Credentials, DEFAULT_INSTRUCTIONS, DEFAULT_QUERY};
