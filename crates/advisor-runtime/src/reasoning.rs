//! Step-by-step reasoning pass
//!
//! A reasoning-enabled agent thinks before it answers: the model is asked for
//! one [`ReasoningStep`] at a time until it declares it is ready to give the
//! final answer, or the step budget runs out. The collected steps are then
//! handed to the answering request.

use advisor_core::Result;
use advisor_llm::{CompletionRequest, LLMProvider, Message, ResponseFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static THINK_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").ok());

const REASONING_PROMPT: &str = "\
You are a meticulous, thoughtful, and logical reasoning assistant.
Solve the task by working through it one step at a time.

Reply with exactly one JSON object describing your next step, with these fields:
- \"title\": a short title for the step
- \"action\": what you will do in this step, in the first person
- \"result\": the outcome of the action
- \"reasoning\": why this step moves you toward the answer
- \"next_action\": one of \"continue\", \"validate\", \"final_answer\", \"reset\"
- \"confidence\": your confidence in this step, between 0.0 and 1.0

Use \"final_answer\" once you are confident the steps so far fully answer the task.
Use \"reset\" if a previous step was wrong and you need to start over.";

/// What the model wants to do after a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    /// Keep reasoning
    #[default]
    Continue,
    /// Check the work so far
    Validate,
    /// Ready to answer
    FinalAnswer,
    /// Start over
    Reset,
}

/// One step of the reasoning pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningStep {
    /// Short title
    pub title: Option<String>,
    /// What the model did
    pub action: Option<String>,
    /// Outcome of the action
    pub result: Option<String>,
    /// Why the step was taken
    pub reasoning: Option<String>,
    /// What comes next
    pub next_action: NextAction,
    /// Confidence between 0 and 1
    pub confidence: Option<f32>,
}

impl ReasoningStep {
    /// Render the step as a markdown block
    pub fn to_markdown(&self, number: usize) -> String {
        let title = self.title.as_deref().unwrap_or("Reasoning step");
        let mut out = format!("## Step {number}: {title}\n");
        if let Some(action) = &self.action {
            out.push_str(&format!("**Action:** {action}\n\n"));
        }
        if let Some(result) = &self.result {
            out.push_str(&format!("**Result:** {result}\n\n"));
        }
        if let Some(reasoning) = &self.reasoning {
            out.push_str(&format!("**Reasoning:** {reasoning}\n\n"));
        }
        if let Some(confidence) = self.confidence {
            out.push_str(&format!("**Confidence:** {confidence:.2}\n\n"));
        }
        out
    }
}

/// Render a list of steps, numbered from 1
pub fn format_steps(steps: &[ReasoningStep]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| step.to_markdown(i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove `<think>...</think>` blocks some reasoning models emit inline
pub fn strip_think_blocks(text: &str) -> String {
    match THINK_BLOCK.as_ref() {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Parse a model reply into a reasoning step
///
/// Tolerates surrounding prose and code fences by taking the outermost
/// `{ ... }` span after think blocks are removed.
pub fn parse_step(text: &str) -> Option<ReasoningStep> {
    let cleaned = strip_think_blocks(text);
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

/// Settings for one reasoning pass
#[derive(Debug, Clone)]
pub struct ReasoningSettings {
    /// Model to reason with
    pub model: String,
    /// Upper bound on steps (values below 1 are treated as 1)
    pub max_steps: usize,
    /// Ask the provider for JSON mode
    pub structured_outputs: bool,
    /// Max tokens per step
    pub max_tokens: usize,
}

/// Run the reasoning pass for a task
///
/// Stops at the first `final_answer` step, at the step limit, or when a reply
/// cannot be parsed. Provider errors propagate.
pub async fn reason(
    provider: &dyn LLMProvider,
    settings: &ReasoningSettings,
    agent_prompt: Option<&str>,
    task: &str,
) -> Result<Vec<ReasoningStep>> {
    let max_steps = settings.max_steps.max(1);
    let system = match agent_prompt {
        Some(prompt) => format!("{REASONING_PROMPT}\n\n## Context\n{prompt}"),
        None => REASONING_PROMPT.to_string(),
    };

    let mut conversation = vec![Message::user(task)];
    let mut steps: Vec<ReasoningStep> = Vec::new();

    for step_number in 1..=max_steps {
        let mut builder = CompletionRequest::builder(&settings.model)
            .system(system.clone())
            .messages(conversation.clone())
            .max_tokens(settings.max_tokens);
        if settings.structured_outputs {
            builder = builder.response_format(ResponseFormat::JsonObject);
        }

        let response = provider.complete(builder.build()).await?;
        let reply = response.message.text().unwrap_or_default();

        let Some(step) = parse_step(&reply) else {
            warn!(step = step_number, "Could not parse reasoning step, ending pass");
            break;
        };

        debug!(
            step = step_number,
            title = step.title.as_deref().unwrap_or_default(),
            next_action = ?step.next_action,
            "Reasoning step"
        );

        let next_action = step.next_action;
        conversation.push(Message::assistant(strip_think_blocks(&reply)));
        if next_action == NextAction::Reset {
            steps.clear();
        } else {
            steps.push(step);
        }

        if next_action == NextAction::FinalAnswer {
            break;
        }
        conversation.push(Message::user("Continue with the next step."));
    }

    info!(steps = steps.len(), "Reasoning pass finished");
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_llm::{
        CompletionResponse, ContentBlock, MessageContent, Role, StopReason, TokenUsage,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<String>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|s| (*s).to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> advisor_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            let text = self.replies.lock().unwrap().pop().unwrap_or_default();
            Ok(CompletionResponse {
                message: Message {
                    role: Role::Assistant,
                    content: Some(MessageContent::Blocks(vec![ContentBlock::Text { text }])),
                },
                reasoning: None,
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn settings(max_steps: usize) -> ReasoningSettings {
        ReasoningSettings {
            model: "deepseek-r1-distill-llama-70b".to_string(),
            max_steps,
            structured_outputs: true,
            max_tokens: 512,
        }
    }

    #[test]
    fn test_strip_think_blocks() {
        let text = "<think>\nlet me see\n</think>\n{\"title\": \"x\"}";
        assert_eq!(strip_think_blocks(text), "{\"title\": \"x\"}");
        assert_eq!(strip_think_blocks("plain"), "plain");
    }

    #[test]
    fn test_parse_step_with_fences() {
        let text = "Here you go:\n```json\n{\"title\": \"Scan news\", \"next_action\": \"final_answer\", \"confidence\": 0.8}\n```";
        let step = parse_step(text).unwrap();
        assert_eq!(step.title.as_deref(), Some("Scan news"));
        assert_eq!(step.next_action, NextAction::FinalAnswer);
        assert_eq!(step.confidence, Some(0.8));
        assert!(step.action.is_none());
    }

    #[test]
    fn test_parse_step_rejects_prose() {
        assert!(parse_step("no json here").is_none());
        assert!(parse_step("} backwards {").is_none());
    }

    #[test]
    fn test_markdown_rendering() {
        let step = ReasoningStep {
            title: Some("Compare yields".to_string()),
            action: Some("I compare bond and equity yields".to_string()),
            ..ReasoningStep::default()
        };
        let md = format_steps(&[step]);
        assert!(md.starts_with("## Step 1: Compare yields\n"));
        assert!(md.contains("**Action:** I compare bond and equity yields"));
        assert!(!md.contains("**Result:**"));
    }

    #[tokio::test]
    async fn test_stops_at_final_answer() {
        let provider = Scripted::new(&[
            r#"{"title": "Gather", "next_action": "continue"}"#,
            r#"<think>ok</think>{"title": "Conclude", "next_action": "final_answer"}"#,
            r#"{"title": "Never reached", "next_action": "continue"}"#,
        ]);

        let steps = reason(&provider, &settings(10), None, "Where to invest?")
            .await
            .unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].title.as_deref(), Some("Conclude"));

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].response_format, Some(ResponseFormat::JsonObject));
        // user, assistant, user
        assert_eq!(requests[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_step_limit_and_minimum() {
        let provider = Scripted::new(&[
            r#"{"title": "a"}"#,
            r#"{"title": "b"}"#,
            r#"{"title": "c"}"#,
        ]);
        let steps = reason(&provider, &settings(2), None, "task").await.unwrap();
        assert_eq!(steps.len(), 2);

        let provider = Scripted::new(&[r#"{"title": "only"}"#, r#"{"title": "extra"}"#]);
        let steps = reason(&provider, &settings(0), None, "task").await.unwrap();
        assert_eq!(steps.len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_reply_ends_pass() {
        let provider = Scripted::new(&[r#"{"title": "first"}"#, "I refuse to use JSON"]);
        let steps = reason(&provider, &settings(5), Some("You are the Reasoning Agent"), "task")
            .await
            .unwrap();
        assert_eq!(steps.len(), 1);

        let requests = provider.requests.lock().unwrap();
        let system = requests[0].system.as_deref().unwrap_or_default();
        assert!(system.contains("You are the Reasoning Agent"));
    }

    #[tokio::test]
    async fn test_reset_discards_previous_steps() {
        let provider = Scripted::new(&[
            r#"{"title": "wrong"}"#,
            r#"{"title": "oops", "next_action": "reset"}"#,
            r#"{"title": "right", "next_action": "final_answer"}"#,
        ]);
        let steps = reason(&provider, &settings(10), None, "task").await.unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].title.as_deref(), Some("right"));
    }
}
