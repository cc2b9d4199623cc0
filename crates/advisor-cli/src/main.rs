//! Terminal front end for the multi-agent finance advisor
//!
//! Collects API keys, instructions, and a question through an interactive
//! form, then streams the team's answer into the terminal.
//!
//! # Usage
//!
//! ```bash
//! finance-advisor                        # defaults
//! finance-advisor --config advisor.json  # override models, endpoints, cache TTLs
//! RUST_LOG=debug finance-advisor --log-format json 2> advisor.log
//! ```
//!
//! API keys are only ever read from the form.

mod form;
mod render;

use advisor_finance::{
    AdvisorError, FinanceConfig, MISSING_CREDENTIALS_MESSAGE, TeamOrchestrator, run_submission,
};
use advisor_utils::{Config, LogFormat, init_tracing};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "finance-advisor", version)]
#[command(about = "Ask a team of AI agents a finance question", long_about = None)]
struct Args {
    /// JSON file overriding the advisor configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output format (pretty or json); logs go to stderr
    #[arg(long, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Render fragments without the pause between updates
    #[arg(long)]
    no_delay: bool,
}

fn load_config(args: &Args) -> anyhow::Result<FinanceConfig> {
    let mut config = match &args.config {
        Some(path) => FinanceConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => FinanceConfig::default(),
    };
    if args.no_delay {
        config.update_delay_ms = 0;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let app = Config::default().with_log_format(args.log_format);
    init_tracing(app.log_format);
    info!(app = %app.app_name, environment = %app.environment, "Starting");

    let config = load_config(&args)?;

    let Some(request) = form::collect()? else {
        return Ok(());
    };

    let orchestrator = TeamOrchestrator::new(config.clone())?;
    let mut sink = render::TerminalSink::new();

    match run_submission(request, &config, &orchestrator, &mut sink).await {
        Ok(answer) => {
            sink.finish()?;
            info!(answer_length = answer.len(), "Answer complete");
            cliclack::outro("Done")?;
        }
        Err(AdvisorError::MissingCredentials) => {
            cliclack::log::error(MISSING_CREDENTIALS_MESSAGE)?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
