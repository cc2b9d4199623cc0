//! Display fragments produced by a team run

use advisor_core::Result;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

/// Boxed stream of fragments borrowing the team
pub type FragmentStream<'a> = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send + 'a>>;

/// One piece of streamed output, already classified
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Answer text
    Text(String),
    /// A tool call the leader made
    ToolCall {
        /// Tool name
        name: String,
        /// Tool arguments
        arguments: Value,
    },
    /// Reasoning to show the user
    Reasoning(String),
    /// Output with no typed counterpart, shown as raw JSON
    Unknown(Value),
}

impl Fragment {
    /// Text appended to the response buffer for this fragment
    pub fn display_text(&self) -> String {
        match self {
            Fragment::Text(text) => text.clone(),
            Fragment::ToolCall { name, arguments } => {
                format!(" - Running: {name}({})\n\n", format_arguments(arguments))
            }
            Fragment::Reasoning(text) => {
                let quoted: Vec<String> = text
                    .trim_end()
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {line}")
                        }
                    })
                    .collect();
                format!("{}\n\n", quoted.join("\n"))
            }
            Fragment::Unknown(value) => value.to_string(),
        }
    }
}

/// `key=value` pairs for objects, JSON for anything else
fn format_arguments(arguments: &Value) -> String {
    match arguments {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{key}={s}"),
                other => format!("{key}={other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_passes_through() {
        assert_eq!(Fragment::Text("Hel".to_string()).display_text(), "Hel");
    }

    #[test]
    fn test_tool_call_line() {
        let fragment = Fragment::ToolCall {
            name: "get_current_stock_price".to_string(),
            arguments: json!({"symbol": "NVDA"}),
        };
        assert_eq!(
            fragment.display_text(),
            " - Running: get_current_stock_price(symbol=NVDA)\n\n"
        );

        let fragment = Fragment::ToolCall {
            name: "duckduckgo_search".to_string(),
            arguments: json!({"max_results": 3, "query": "rates"}),
        };
        assert_eq!(
            fragment.display_text(),
            " - Running: duckduckgo_search(max_results=3, query=rates)\n\n"
        );
    }

    #[test]
    fn test_reasoning_is_quoted() {
        let fragment = Fragment::Reasoning("## Step 1\n\nCheck rates\n".to_string());
        assert_eq!(fragment.display_text(), "> ## Step 1\n>\n> Check rates\n\n");
    }

    #[test]
    fn test_unknown_renders_json() {
        let fragment = Fragment::Unknown(json!({"x_groq": {"id": "req_1"}}));
        assert_eq!(fragment.display_text(), r#"{"x_groq":{"id":"req_1"}}"#);
    }
}
