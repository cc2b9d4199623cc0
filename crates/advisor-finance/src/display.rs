//! Streaming display loop

use crate::error::Result;
use crate::markdown::adjust_markdown_headings;
use advisor_team::FragmentStream;
use futures::StreamExt;
use std::time::Duration;
use tracing::debug;

/// Where the growing answer is rendered
///
/// Every call replaces what the previous call rendered.
#[cfg_attr(test, mockall::automock)]
pub trait AnswerSink: Send {
    /// Render the full answer so far
    fn render(&mut self, markdown: &str) -> Result<()>;
}

/// Drain `fragments` into `sink`, re-rendering after every fragment
///
/// Returns the raw response buffer; headings are adjusted only in what the
/// sink sees.
pub async fn stream_answer(
    mut fragments: FragmentStream<'_>,
    sink: &mut dyn AnswerSink,
    delay: Duration,
) -> Result<String> {
    let mut response = String::new();
    let mut count = 0usize;

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        response.push_str(&fragment.display_text());
        sink.render(&adjust_markdown_headings(&response))?;
        count += 1;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    debug!(fragments = count, response_length = response.len(), "Answer stream drained");
    Ok(response)
}
