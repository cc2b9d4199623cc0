//! Submission form

use advisor_finance::{AdvisorRequest, Credentials, DEFAULT_INSTRUCTIONS, DEFAULT_QUERY};
use console::style;

/// Page title
pub const TITLE: &str = "Multi-Agent Finance Advisor with DeepSeek Reasoning";

const DESCRIPTION: &str = "\
Welcome to the Reliable Finance Advisor! This multi-agent system leverages up-to-date \
financial data, market news, and expert analysis to answer your finance-related questions. \
Adjust the advisor's instructions and API keys as needed.";

/// Ask for keys, instructions, question, and the reasoning toggle
///
/// Returns `None` when the user declines to submit. Keys are only
/// presence-checked later, by the submission handler.
pub fn collect() -> std::io::Result<Option<AdvisorRequest>> {
    cliclack::intro(style(format!(" {TITLE} ")).on_cyan().black())?;
    cliclack::note("Finance Advisor", DESCRIPTION)?;

    let openai_api_key: String = cliclack::password("Enter your OpenAI API Key")
        .mask('▪')
        .interact()?;
    let groq_api_key: String = cliclack::password("Enter your Groq API Key")
        .mask('▪')
        .interact()?;

    let instructions: String = cliclack::input("Agent Team Instructions (optional)")
        .default_input(DEFAULT_INSTRUCTIONS)
        .multiline()
        .interact()?;
    let query: String = cliclack::input("Enter your finance question")
        .default_input(DEFAULT_QUERY)
        .interact()?;
    let close_reasoning = cliclack::confirm("Disable detailed reasoning (Close Reasoning)")
        .initial_value(false)
        .interact()?;

    if !cliclack::confirm("Submit").initial_value(true).interact()? {
        cliclack::outro_cancel("Nothing submitted")?;
        return Ok(None);
    }

    Ok(Some(
        AdvisorRequest::new(Credentials::new(openai_api_key, groq_api_key), query)
            .with_instructions(instructions)
            .with_close_reasoning(close_reasoning),
    ))
}
