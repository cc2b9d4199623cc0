//! System prompt rendering
//!
//! Agents are described declaratively (name, role, instructions, tools); this
//! module turns that description into the system prompt sent to the model.

use advisor_core::{Error, Result};
use minijinja::Environment;
use serde::Serialize;

const SYSTEM_TEMPLATE: &str = r"
{% if members %}
You are the leader of a team of AI agents{% if name %} called {{ name }}{% endif %}.
You can either respond directly or transfer tasks to the members of your team.
Transfer a task with the matching `transfer_task_to_<member>` tool, giving a clear
task description and the output you expect back.
Always validate a member's output before relying on it, and transfer again if it
falls short.

## Team members
{% for member in members %}
- Agent {{ loop.index }}: {{ member.name }}
{% if member.role %}
  - Role: {{ member.role }}
{% endif %}
{% if member.tools %}
  - Available tools: {{ member.tools | join(', ') }}
{% endif %}
{% endfor %}
{% else %}
{% if name %}
You are {{ name }}.
{% endif %}
{% endif %}
{% if role %}

## Your role
{{ role }}
{% endif %}
{% if instructions %}

## Instructions
{% for instruction in instructions %}
- {{ instruction }}
{% endfor %}
{% endif %}
{% if tools %}

## Tools
{% for tool in tools %}
- {{ tool.name }}: {{ tool.description }}
{% endfor %}
{% endif %}
{% if markdown %}

Use markdown to format your answers.
{% endif %}
";

/// A team member as listed in the leader's prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemberSummary {
    /// Member name
    pub name: String,
    /// Member role
    pub role: Option<String>,
    /// Names of the member's tools
    pub tools: Vec<String>,
}

/// A tool as listed in the prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSummary {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
}

/// Everything the system prompt is rendered from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PromptSpec {
    /// Agent name
    pub name: Option<String>,
    /// One-line role
    pub role: Option<String>,
    /// Instruction lines
    pub instructions: Vec<String>,
    /// Tools the agent calls directly
    pub tools: Vec<ToolSummary>,
    /// Team members, for team leaders
    pub members: Vec<MemberSummary>,
    /// Ask for markdown output
    pub markdown: bool,
}

/// Render the system prompt for an agent
///
/// # Example
///
/// ```
/// use advisor_runtime::{PromptSpec, render_system_prompt};
///
/// let spec = PromptSpec {
///     name: Some("Finance Agent".to_string()),
///     instructions: vec!["Use tables to display data".to_string()],
///     markdown: true,
///     ..PromptSpec::default()
/// };
/// let prompt = render_system_prompt(&spec).unwrap();
/// assert!(prompt.contains("You are Finance Agent."));
/// assert!(prompt.contains("- Use tables to display data"));
/// ```
pub fn render_system_prompt(spec: &PromptSpec) -> Result<String> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);

    let rendered = env
        .render_str(SYSTEM_TEMPLATE, minijinja::Value::from_serialize(spec))
        .map_err(|e| Error::InitializationFailed(format!("Failed to render system prompt: {e}")))?;

    Ok(rendered.trim().to_string())
}
