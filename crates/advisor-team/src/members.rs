//! Team members exposed to the leader as transfer tools

use advisor_core::context::keys;
use advisor_core::{Agent, Context, Error, Result};
use advisor_llm::ToolDefinition;
use advisor_llm::tools::schema;
use advisor_runtime::{MemberSummary, ReasoningStep, ToolDispatcher, ToolOutput};
use advisor_tools::parse_params;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Name of the tool that hands a task to `member_name`
///
/// # Example
///
/// ```
/// use advisor_team::transfer_tool_name;
///
/// assert_eq!(transfer_tool_name("Web Agent"), "transfer_task_to_web_agent");
/// ```
pub fn transfer_tool_name(member_name: &str) -> String {
    let mut snake = String::with_capacity(member_name.len());
    for ch in member_name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            snake.push(ch.to_ascii_lowercase());
        } else if !snake.ends_with('_') && !snake.is_empty() {
            snake.push('_');
        }
    }
    let snake = snake.trim_end_matches('_');
    format!("transfer_task_to_{snake}")
}

#[derive(Debug, Deserialize)]
struct TransferArgs {
    task_description: String,
    #[serde(default)]
    expected_output: Option<String>,
}

struct Member {
    tool_name: String,
    agent: Arc<dyn Agent>,
}

/// The members of a team, answering the leader's transfer calls
#[derive(Default)]
pub struct Members {
    members: Vec<Member>,
}

impl Members {
    /// Create an empty member list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member; a member with the same transfer tool name is replaced
    pub fn add(&mut self, agent: Arc<dyn Agent>) {
        let tool_name = transfer_tool_name(agent.name());
        self.members.retain(|m| m.tool_name != tool_name);
        self.members.push(Member { tool_name, agent });
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the team has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member descriptions for the leader's system prompt
    pub fn summaries(&self) -> Vec<MemberSummary> {
        self.members
            .iter()
            .map(|m| MemberSummary {
                name: m.agent.name().to_string(),
                role: m.agent.role().map(str::to_string),
                tools: m.agent.tool_names(),
            })
            .collect()
    }

    fn find(&self, tool_name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.tool_name == tool_name)
    }
}

#[async_trait]
impl ToolDispatcher for Members {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.members
            .iter()
            .map(|m| {
                let description = match m.agent.role() {
                    Some(role) => format!(
                        "Use this function to transfer a task to {}. Role: {role}",
                        m.agent.name()
                    ),
                    None => format!("Use this function to transfer a task to {}.", m.agent.name()),
                };
                ToolDefinition::new(
                    m.tool_name.clone(),
                    description,
                    schema::object(
                        json!({
                            "task_description": schema::string(
                                "A clear and concise description of the task the member should achieve."
                            ),
                            "expected_output": schema::string(
                                "The expected output from the member."
                            ),
                        }),
                        vec!["task_description", "expected_output"],
                    ),
                )
            })
            .collect()
    }

    async fn dispatch(&self, name: &str, input: Value, context: &Context) -> Result<ToolOutput> {
        let member = self
            .find(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        let args: TransferArgs = parse_params(name, input)?;

        let task = match args.expected_output.as_deref().map(str::trim) {
            Some(expected) if !expected.is_empty() => format!(
                "{}\n\n<expected_output>\n{expected}\n</expected_output>",
                args.task_description
            ),
            _ => args.task_description,
        };

        info!(member = %member.agent.name(), "Transferring task to member");
        let start_time = Instant::now();

        let mut member_context = context.child();
        let answer = member.agent.process(task, &mut member_context).await?;
        let reasoning: Vec<ReasoningStep> = member_context
            .get_typed(keys::REASONING_STEPS)?
            .unwrap_or_default();

        info!(
            member = %member.agent.name(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            answer_length = answer.len(),
            reasoning_steps = reasoning.len(),
            "Member finished"
        );

        Ok(ToolOutput {
            content: answer,
            reasoning,
            is_error: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Echoes the task and optionally leaves reasoning steps behind
    struct Stub {
        name: &'static str,
        steps: Vec<ReasoningStep>,
        seen: Mutex<Vec<String>>,
    }

    impl Stub {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                steps: Vec::new(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Agent for Stub {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            self.seen.lock().unwrap().push(input.clone());
            if !self.steps.is_empty() {
                context.insert_typed(keys::REASONING_STEPS, &self.steps)?;
            }
            Ok(format!("{} handled it", self.name))
        }

        fn name(&self) -> &str {
            self.name
        }

        fn role(&self) -> Option<&str> {
            Some("stub role")
        }
    }

    #[test]
    fn test_transfer_tool_names() {
        assert_eq!(transfer_tool_name("Web Agent"), "transfer_task_to_web_agent");
        assert_eq!(
            transfer_tool_name("Finance Agent"),
            "transfer_task_to_finance_agent"
        );
        assert_eq!(
            transfer_tool_name("  Reasoning -- Agent! "),
            "transfer_task_to_reasoning_agent"
        );
    }

    #[test]
    fn test_definitions_schema() {
        let mut members = Members::new();
        members.add(Arc::new(Stub::new("Web Agent")));
        members.add(Arc::new(Stub::new("Finance Agent")));

        let defs = members.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "transfer_task_to_web_agent");
        assert!(defs[0].description.contains("stub role"));
        assert_eq!(
            defs[1].input_schema["required"],
            json!(["task_description", "expected_output"])
        );
    }

    #[test]
    fn test_add_replaces_same_name() {
        let mut members = Members::new();
        members.add(Arc::new(Stub::new("Web Agent")));
        members.add(Arc::new(Stub::new("Web Agent")));
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_runs_member() {
        let stub = Arc::new(Stub::new("Web Agent"));
        let mut members = Members::new();
        members.add(stub.clone());

        let out = members
            .dispatch(
                "transfer_task_to_web_agent",
                json!({"task_description": "Find NVDA news", "expected_output": "Bullet list"}),
                &Context::new(),
            )
            .await
            .unwrap();

        assert_eq!(out.content, "Web Agent handled it");
        assert!(out.reasoning.is_empty());
        let seen = stub.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            "Find NVDA news\n\n<expected_output>\nBullet list\n</expected_output>"
        );
    }

    #[tokio::test]
    async fn test_dispatch_collects_member_reasoning() {
        let mut stub = Stub::new("Reasoning Agent");
        stub.steps = vec![ReasoningStep {
            title: Some("Weigh risk".to_string()),
            ..ReasoningStep::default()
        }];
        let mut members = Members::new();
        members.add(Arc::new(stub));

        let out = members
            .dispatch(
                "transfer_task_to_reasoning_agent",
                json!({"task_description": "Integrate"}),
                &Context::new().with_show_full_reasoning(true),
            )
            .await
            .unwrap();

        assert_eq!(out.reasoning.len(), 1);
        assert_eq!(out.reasoning[0].title.as_deref(), Some("Weigh risk"));
    }

    #[tokio::test]
    async fn test_dispatch_errors() {
        let mut members = Members::new();
        members.add(Arc::new(Stub::new("Web Agent")));

        let err = members
            .dispatch("transfer_task_to_nobody", json!({}), &Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));

        let err = members
            .dispatch("transfer_task_to_web_agent", json!({}), &Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidToolInput { .. }));
    }
}
