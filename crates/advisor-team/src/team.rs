//! Team: a leader agent delegating to its members

use crate::fragment::{Fragment, FragmentStream};
use crate::members::Members;
use advisor_core::{Agent, Context, Error, Result};
use advisor_llm::LLMProvider;
use advisor_runtime::reasoning::format_steps;
use advisor_runtime::{
    AgentExecutor, ExecutorConfig, PromptSpec, RunEvent, render_system_prompt,
};
use async_trait::async_trait;
use futures::{StreamExt, future};
use std::sync::Arc;
use tracing::{debug, info};

/// Options for one team run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Surface reasoning (model reasoning and member reasoning steps)
    pub show_full_reasoning: bool,
    /// Identifier for log correlation
    pub run_id: Option<String>,
}

/// A leader agent with member agents exposed as transfer tools
///
/// # Example
///
/// ```no_run
/// use advisor_llm::providers::OpenAIProvider;
/// use advisor_runtime::ExecutorConfig;
/// use advisor_team::{RunOptions, Team};
/// use futures::StreamExt;
/// use std::sync::Arc;
///
/// # async fn example(web: Arc<dyn advisor_core::Agent>) -> advisor_core::Result<()> {
/// let team = Team::builder()
///     .leader(Arc::new(OpenAIProvider::new("sk-...")?), ExecutorConfig::default())
///     .member(web)
///     .instructions(vec!["Act as a financial advisor".to_string()])
///     .show_tool_calls(true)
///     .markdown(true)
///     .build()?;
///
/// let mut fragments = team.run_stream("Where should I invest?".to_string(), RunOptions::default());
/// while let Some(fragment) = fragments.next().await {
///     print!("{}", fragment?.display_text());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Team {
    name: String,
    leader: AgentExecutor,
    show_tool_calls: bool,
}

impl Team {
    /// Create a team builder
    pub fn builder() -> TeamBuilder {
        TeamBuilder::new()
    }

    /// Run the team, streaming display fragments
    ///
    /// Text arrives in the order the leader produced it. Tool calls appear
    /// only when the team shows tool calls; reasoning only when
    /// `show_full_reasoning` is set.
    pub fn run_stream(&self, query: String, options: RunOptions) -> FragmentStream<'_> {
        let mut context = Context::new().with_show_full_reasoning(options.show_full_reasoning);
        if let Some(run_id) = &options.run_id {
            context = context.with_run_id(run_id.clone());
        }

        info!(
            team = %self.name,
            run_id = options.run_id.as_deref().unwrap_or_default(),
            show_full_reasoning = options.show_full_reasoning,
            "Team run started"
        );

        let show_tool_calls = self.show_tool_calls;
        let show_reasoning = options.show_full_reasoning;
        let events = self.leader.run_stream(query, context);

        Box::pin(events.filter_map(move |event| {
            future::ready(match event {
                Ok(event) => to_fragment(event, show_tool_calls, show_reasoning).map(Ok),
                Err(e) => Some(Err(e)),
            })
        }))
    }
}

/// Classify one run event, or drop it when it should not be shown
fn to_fragment(event: RunEvent, show_tool_calls: bool, show_reasoning: bool) -> Option<Fragment> {
    match event {
        RunEvent::Content(text) => Some(Fragment::Text(text)),
        RunEvent::Reasoning(text) => show_reasoning.then_some(Fragment::Reasoning(text)),
        RunEvent::ToolCall { name, input, .. } => show_tool_calls.then_some(Fragment::ToolCall {
            name,
            arguments: input,
        }),
        RunEvent::ToolResult { name, output, .. } => {
            debug!(tool = %name, is_error = output.is_error, "Tool result");
            (show_reasoning && !output.reasoning.is_empty())
                .then(|| Fragment::Reasoning(format_steps(&output.reasoning)))
        }
        RunEvent::Unrecognized(value) => Some(Fragment::Unknown(value)),
        RunEvent::Completed { content, usage } => {
            info!(
                response_length = content.len(),
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Team run completed"
            );
            None
        }
    }
}

#[async_trait]
impl Agent for Team {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        self.leader.run(input, context).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn tool_names(&self) -> Vec<String> {
        self.leader
            .tool_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect()
    }
}

/// Builder for [`Team`]
pub struct TeamBuilder {
    name: String,
    provider: Option<Arc<dyn LLMProvider>>,
    config: ExecutorConfig,
    members: Members,
    instructions: Vec<String>,
    show_tool_calls: bool,
    markdown: bool,
}

impl TeamBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            name: "Team Leader".to_string(),
            provider: None,
            config: ExecutorConfig::default(),
            members: Members::new(),
            instructions: Vec::new(),
            show_tool_calls: false,
            markdown: false,
        }
    }

    /// Set the team name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the leader's provider and executor configuration
    ///
    /// The system prompt in `config` is replaced by the rendered team prompt.
    pub fn leader(mut self, provider: Arc<dyn LLMProvider>, config: ExecutorConfig) -> Self {
        self.provider = Some(provider);
        self.config = config;
        self
    }

    /// Add a member
    pub fn member(mut self, agent: Arc<dyn Agent>) -> Self {
        self.members.add(agent);
        self
    }

    /// Set the leader's instructions
    pub fn instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Show the leader's tool calls as fragments
    pub fn show_tool_calls(mut self, show: bool) -> Self {
        self.show_tool_calls = show;
        self
    }

    /// Ask the leader for markdown output
    pub fn markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Build the team
    pub fn build(self) -> Result<Team> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Team leader provider not set".to_string()))?;
        if self.members.is_empty() {
            return Err(Error::InitializationFailed(
                "A team needs at least one member".to_string(),
            ));
        }

        let prompt = render_system_prompt(&PromptSpec {
            name: None,
            role: None,
            instructions: self.instructions,
            tools: Vec::new(),
            members: self.members.summaries(),
            markdown: self.markdown,
        })?;

        let config = ExecutorConfig {
            system_prompt: Some(prompt),
            ..self.config
        };
        info!(
            team = %self.name,
            members = self.members.len(),
            model = %config.model,
            "Team assembled"
        );

        Ok(Team {
            name: self.name,
            leader: AgentExecutor::new(provider, Arc::new(self.members), config),
            show_tool_calls: self.show_tool_calls,
        })
    }
}

impl Default for TeamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::context::keys;
    use advisor_llm::{
        CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role,
        StopReason, StreamEvent, TokenUsage,
    };
    use advisor_runtime::ReasoningStep;
    use futures::TryStreamExt;
    use serde_json::json;
    use std::sync::Mutex;

    struct Scripted {
        responses: Mutex<Vec<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<CompletionResponse>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> advisor_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses.lock().unwrap().pop().ok_or_else(|| {
                advisor_llm::LLMError::UnexpectedResponse("script exhausted".to_string())
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Analyst {
        name: &'static str,
    }

    #[async_trait]
    impl Agent for Analyst {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            let steps = vec![ReasoningStep {
                title: Some(format!("{} considered", self.name)),
                ..ReasoningStep::default()
            }];
            context.insert_typed(keys::REASONING_STEPS, &steps)?;
            Ok(format!("{}: {input}", self.name))
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn transfer_then_answer() -> Vec<CompletionResponse> {
        vec![
            CompletionResponse {
                message: Message {
                    role: Role::Assistant,
                    content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                        id: "call_1".to_string(),
                        name: "transfer_task_to_reasoning_agent".to_string(),
                        input: json!({"task_description": "Integrate", "expected_output": "Advice"}),
                    }])),
                },
                reasoning: None,
                stop_reason: StopReason::ToolUse,
                usage: TokenUsage::default(),
            },
            CompletionResponse {
                message: Message::assistant("#### Final advice"),
                reasoning: Some("leader thinking".to_string()),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            },
        ]
    }

    fn team(provider: Arc<Scripted>, show_tool_calls: bool) -> Team {
        Team::builder()
            .leader(provider, ExecutorConfig::default())
            .member(Arc::new(Analyst {
                name: "Reasoning Agent",
            }))
            .instructions(vec!["Act as a reliable financial advisor".to_string()])
            .show_tool_calls(show_tool_calls)
            .markdown(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_provider_and_members() {
        assert!(matches!(
            Team::builder().build(),
            Err(Error::InitializationFailed(_))
        ));
        let provider = Scripted::new(vec![]);
        assert!(matches!(
            Team::builder()
                .leader(provider, ExecutorConfig::default())
                .build(),
            Err(Error::InitializationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_leader_prompt_and_tools() {
        let provider = Scripted::new(vec![CompletionResponse {
            message: Message::assistant("ok"),
            reasoning: None,
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }]);
        let team = team(provider.clone(), true);
        assert_eq!(team.tool_names(), vec!["transfer_task_to_reasoning_agent"]);

        let _: Vec<Fragment> = team
            .run_stream("q".to_string(), RunOptions::default())
            .try_collect()
            .await
            .unwrap();

        let requests = provider.requests.lock().unwrap();
        let system = requests[0].system.as_deref().unwrap();
        assert!(system.contains("- Agent 1: Reasoning Agent"));
        assert!(system.contains("- Act as a reliable financial advisor"));
        assert!(system.contains("Use markdown"));
    }

    #[tokio::test]
    async fn test_stream_with_full_reasoning() {
        let team = team(Scripted::new(transfer_then_answer()), true);
        let options = RunOptions {
            show_full_reasoning: true,
            run_id: Some("run-1".to_string()),
        };

        let fragments: Vec<Fragment> = team
            .run_stream("Where to invest?".to_string(), options)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(fragments.len(), 4);
        assert_eq!(
            fragments[0],
            Fragment::ToolCall {
                name: "transfer_task_to_reasoning_agent".to_string(),
                arguments: json!({"task_description": "Integrate", "expected_output": "Advice"}),
            }
        );
        assert!(matches!(&fragments[1], Fragment::Reasoning(text) if text.contains("Reasoning Agent considered")));
        assert_eq!(fragments[2], Fragment::Reasoning("leader thinking".to_string()));
        assert_eq!(fragments[3], Fragment::Text("#### Final advice".to_string()));
    }

    #[tokio::test]
    async fn test_stream_hides_reasoning_and_tool_calls() {
        let team = team(Scripted::new(transfer_then_answer()), false);

        let fragments: Vec<Fragment> = team
            .run_stream("Where to invest?".to_string(), RunOptions::default())
            .try_collect()
            .await
            .unwrap();

        assert_eq!(
            fragments,
            vec![Fragment::Text("#### Final advice".to_string())]
        );
    }

    #[tokio::test]
    async fn test_member_answer_reaches_leader() {
        let provider = Scripted::new(transfer_then_answer());
        let team = team(provider.clone(), false);

        let answer = team
            .process("Where to invest?".to_string(), &mut Context::new())
            .await
            .unwrap();
        assert_eq!(answer, "#### Final advice");

        let requests = provider.requests.lock().unwrap();
        let last = requests[1].messages.last().unwrap();
        match &last.content {
            Some(MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult { content, .. } => {
                    assert!(content.starts_with("Reasoning Agent: Integrate"));
                }
                other => panic!("unexpected block: {other:?}"),
            },
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let team = team(Scripted::new(vec![]), true);
        let result: Result<Vec<Fragment>> = team
            .run_stream("q".to_string(), RunOptions::default())
            .try_collect()
            .await;
        assert!(result.is_err());
    }

    /// Leader whose stream breaks off with a provider error chunk
    struct ErrorChunk;

    #[async_trait]
    impl LLMProvider for ErrorChunk {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> advisor_llm::Result<CompletionResponse> {
            Err(advisor_llm::LLMError::RequestFailed("stream only".to_string()))
        }

        async fn stream(
            &self,
            _request: CompletionRequest,
        ) -> advisor_llm::Result<advisor_llm::CompletionStream> {
            Ok(Box::pin(futures::stream::iter(vec![
                Ok(StreamEvent::TextDelta("Invest in ".to_string())),
                Ok(StreamEvent::Unrecognized(json!({
                    "error": {"message": "Internal server error", "type": "server_error"}
                }))),
            ])))
        }

        fn name(&self) -> &str {
            "error-chunk"
        }
    }

    #[tokio::test]
    async fn test_provider_error_chunk_fails_run() {
        let team = Team::builder()
            .leader(Arc::new(ErrorChunk), ExecutorConfig::default())
            .member(Arc::new(Analyst { name: "Web Agent" }))
            .build()
            .unwrap();

        let mut fragments = team.run_stream("Where to invest?".to_string(), RunOptions::default());
        let mut shown = Vec::new();
        let mut failure = None;
        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => shown.push(fragment),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        assert_eq!(shown, vec![Fragment::Text("Invest in ".to_string())]);
        assert!(!shown.iter().any(|f| matches!(f, Fragment::Unknown(_))));
        assert!(
            matches!(failure, Some(Error::ProcessingFailed(msg)) if msg.contains("Internal server error"))
        );
    }
}
