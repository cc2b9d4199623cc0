//! Streaming completion events
//!
//! Providers emit [`StreamEvent`]s as the model produces output. The
//! [`StreamAccumulator`] folds a sequence of events back into a
//! [`CompletionResponse`] so callers can stream to the user and still get the
//! full assistant message for the conversation history.

use crate::{
    CompletionResponse, ContentBlock, LLMError, Message, MessageContent, Result, Role, StopReason,
    TokenUsage,
};
use futures::Stream;
use std::collections::BTreeMap;
use std::pin::Pin;

/// Boxed stream of completion events
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// One incremental piece of a streamed completion
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Answer text
    TextDelta(String),
    /// Reasoning text from a reasoning model
    ReasoningDelta(String),
    /// Part of a tool call; deltas with the same index belong together
    ToolCallDelta {
        /// Position of the call within the assistant turn
        index: usize,
        /// Call ID, usually only on the first delta
        id: Option<String>,
        /// Tool name, usually only on the first delta
        name: Option<String>,
        /// Fragment of the JSON-encoded arguments
        arguments: String,
    },
    /// Token usage reported separately from the finish event
    Usage(TokenUsage),
    /// The model stopped generating
    Finished {
        /// Why the model stopped
        stop_reason: StopReason,
        /// Usage, when the provider sends it with the final chunk
        usage: Option<TokenUsage>,
    },
    /// A chunk the provider sent that has no typed counterpart
    Unrecognized(serde_json::Value),
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

impl StreamEvent {
    /// Error message carried by a provider error chunk
    ///
    /// OpenAI-compatible APIs report failures after the stream has started as
    /// a chunk with a top-level `error` object instead of an HTTP status.
    pub fn error_message(&self) -> Option<String> {
        match self {
            StreamEvent::Unrecognized(value) => provider_error(value),
            _ => None,
        }
    }
}

/// Message of a top-level `{"error": {...}}` payload, if `value` is one
pub fn provider_error(value: &serde_json::Value) -> Option<String> {
    let error = value.get("error")?;
    match error {
        serde_json::Value::Object(fields) => Some(
            fields
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string),
        ),
        serde_json::Value::String(message) => Some(message.clone()),
        _ => None,
    }
}

/// Folds stream events into a complete response
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    reasoning: String,
    tool_calls: BTreeMap<usize, PartialToolCall>,
    stop_reason: Option<StopReason>,
    usage: TokenUsage,
}

impl StreamAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event
    pub fn push(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta(text) => self.text.push_str(text),
            StreamEvent::ReasoningDelta(text) => self.reasoning.push_str(text),
            StreamEvent::ToolCallDelta {
                index,
                id,
                name,
                arguments,
            } => {
                let call = self.tool_calls.entry(*index).or_default();
                if let Some(id) = id {
                    call.id = Some(id.clone());
                }
                if let Some(name) = name {
                    call.name.push_str(name);
                }
                call.arguments.push_str(arguments);
            }
            StreamEvent::Usage(usage) => self.usage = *usage,
            StreamEvent::Finished { stop_reason, usage } => {
                self.stop_reason = Some(*stop_reason);
                if let Some(usage) = usage {
                    self.usage = *usage;
                }
            }
            StreamEvent::Unrecognized(_) => {}
        }
    }

    /// Text received so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Build the final response
    ///
    /// Fails when the stream ended without a finish event, or when a tool
    /// call's accumulated arguments are not valid JSON.
    pub fn finish(self) -> Result<CompletionResponse> {
        let Some(stop_reason) = self.stop_reason else {
            return Err(LLMError::UnexpectedResponse(
                "Stream ended without a finish event".to_string(),
            ));
        };

        let mut blocks = Vec::new();
        if !self.text.is_empty() {
            blocks.push(ContentBlock::Text { text: self.text });
        }

        let has_tool_calls = !self.tool_calls.is_empty();
        for (index, call) in self.tool_calls {
            let input = if call.arguments.trim().is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&call.arguments).map_err(|e| {
                    LLMError::UnexpectedResponse(format!(
                        "Failed to parse arguments for tool '{}': {e}",
                        call.name
                    ))
                })?
            };
            blocks.push(ContentBlock::ToolUse {
                id: call.id.unwrap_or_else(|| format!("call_{index}")),
                name: call.name,
                input,
            });
        }

        if blocks.is_empty() {
            blocks.push(ContentBlock::Text {
                text: String::new(),
            });
        }

        let stop_reason = if has_tool_calls {
            StopReason::ToolUse
        } else {
            stop_reason
        };

        Ok(CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(blocks)),
            },
            reasoning: (!self.reasoning.is_empty()).then_some(self.reasoning),
            stop_reason,
            usage: self.usage,
        })
    }
}

/// Replay a finished response as a sequence of events
pub fn events_from_response(response: CompletionResponse) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    if let Some(reasoning) = response.reasoning {
        events.push(StreamEvent::ReasoningDelta(reasoning));
    }

    let blocks = match response.message.content {
        Some(MessageContent::Text(text)) => vec![ContentBlock::Text { text }],
        Some(MessageContent::Blocks(blocks)) => blocks,
        None => Vec::new(),
    };

    let mut index = 0;
    for block in blocks {
        match block {
            ContentBlock::Text { text } if !text.is_empty() => {
                events.push(StreamEvent::TextDelta(text));
            }
            ContentBlock::ToolUse { id, name, input } => {
                events.push(StreamEvent::ToolCallDelta {
                    index,
                    id: Some(id),
                    name: Some(name),
                    arguments: input.to_string(),
                });
                index += 1;
            }
            _ => {}
        }
    }

    events.push(StreamEvent::Finished {
        stop_reason: response.stop_reason,
        usage: Some(response.usage),
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accumulates_text_in_order() {
        let mut acc = StreamAccumulator::new();
        acc.push(&StreamEvent::TextDelta("Hel".to_string()));
        acc.push(&StreamEvent::TextDelta("lo".to_string()));
        acc.push(&StreamEvent::Finished {
            stop_reason: StopReason::EndTurn,
            usage: None,
        });

        let response = acc.finish().unwrap();
        assert_eq!(response.message.text().as_deref(), Some("Hello"));
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert!(response.reasoning.is_none());
    }

    #[test]
    fn test_tool_call_arguments_join_by_index() {
        let mut acc = StreamAccumulator::new();
        acc.push(&StreamEvent::ToolCallDelta {
            index: 1,
            id: Some("call_b".to_string()),
            name: Some("get_company_info".to_string()),
            arguments: "{\"symbol\":".to_string(),
        });
        acc.push(&StreamEvent::ToolCallDelta {
            index: 0,
            id: Some("call_a".to_string()),
            name: Some("get_current_stock_price".to_string()),
            arguments: "{\"symbol\":\"AAPL\"}".to_string(),
        });
        acc.push(&StreamEvent::ToolCallDelta {
            index: 1,
            id: None,
            name: None,
            arguments: "\"MSFT\"}".to_string(),
        });
        acc.push(&StreamEvent::Finished {
            stop_reason: StopReason::EndTurn,
            usage: Some(TokenUsage {
                input_tokens: 3,
                output_tokens: 4,
            }),
        });

        let response = acc.finish().unwrap();
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage.total(), 7);

        let uses = response.message.tool_uses();
        assert_eq!(uses.len(), 2);
        match uses[0] {
            ContentBlock::ToolUse { id, input, .. } => {
                assert_eq!(id, "call_a");
                assert_eq!(input, &json!({"symbol": "AAPL"}));
            }
            _ => panic!("expected tool use"),
        }
        match uses[1] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "get_company_info");
                assert_eq!(input, &json!({"symbol": "MSFT"}));
            }
            _ => panic!("expected tool use"),
        }
    }

    #[test]
    fn test_invalid_tool_arguments_fail() {
        let mut acc = StreamAccumulator::new();
        acc.push(&StreamEvent::ToolCallDelta {
            index: 0,
            id: None,
            name: Some("duckduckgo_search".to_string()),
            arguments: "{not json".to_string(),
        });
        acc.push(&StreamEvent::Finished {
            stop_reason: StopReason::ToolUse,
            usage: None,
        });
        assert!(matches!(
            acc.finish(),
            Err(LLMError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_reasoning_kept_separate() {
        let mut acc = StreamAccumulator::new();
        acc.push(&StreamEvent::ReasoningDelta("think".to_string()));
        acc.push(&StreamEvent::TextDelta("answer".to_string()));
        acc.push(&StreamEvent::Unrecognized(json!({"x_groq": {}})));
        acc.push(&StreamEvent::Finished {
            stop_reason: StopReason::EndTurn,
            usage: None,
        });

        let response = acc.finish().unwrap();
        assert_eq!(response.reasoning.as_deref(), Some("think"));
        assert_eq!(response.message.text().as_deref(), Some("answer"));
    }

    #[test]
    fn test_stream_without_finish_event_fails() {
        let mut acc = StreamAccumulator::new();
        acc.push(&StreamEvent::TextDelta("Invest in ".to_string()));

        let err = acc.finish().unwrap_err();
        assert!(matches!(err, LLMError::UnexpectedResponse(ref msg) if msg.contains("finish event")));
    }

    #[test]
    fn test_provider_error_chunks() {
        let event = StreamEvent::Unrecognized(
            json!({"error": {"message": "Internal server error", "type": "server_error"}}),
        );
        assert_eq!(event.error_message().as_deref(), Some("Internal server error"));

        let event = StreamEvent::Unrecognized(json!({"error": {"code": 503}}));
        assert_eq!(event.error_message().as_deref(), Some(r#"{"code":503}"#));

        assert!(StreamEvent::Unrecognized(json!({"x_groq": {"id": "q"}})).error_message().is_none());
        assert!(StreamEvent::TextDelta("error".to_string()).error_message().is_none());
    }

    #[test]
    fn test_replay_then_accumulate() {
        let original = CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![
                    ContentBlock::Text {
                        text: "Checking".to_string(),
                    },
                    ContentBlock::ToolUse {
                        id: "call_1".to_string(),
                        name: "duckduckgo_search".to_string(),
                        input: json!({"query": "NVDA"}),
                    },
                ])),
            },
            reasoning: None,
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };

        let events = events_from_response(original.clone());
        assert_eq!(events.len(), 3);

        let mut acc = StreamAccumulator::new();
        for event in &events {
            acc.push(event);
        }
        let rebuilt = acc.finish().unwrap();
        assert_eq!(rebuilt.message, original.message);
        assert_eq!(rebuilt.stop_reason, StopReason::ToolUse);
    }
}
