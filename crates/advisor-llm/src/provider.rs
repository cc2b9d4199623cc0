//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, CompletionStream, Result, stream};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations of this trait provide access to different LLM services.
/// Only [`complete`](LLMProvider::complete) is required; providers that can
/// stream natively override [`stream`](LLMProvider::stream).
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with messages, tools, and parameters
    ///
    /// # Returns
    ///
    /// The completion response with the assistant's message and metadata
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Generate a completion as a stream of incremental events
    ///
    /// The default implementation runs [`complete`](LLMProvider::complete)
    /// and replays the whole response as events.
    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let response = self.complete(request).await?;
        let events = stream::events_from_response(response);
        Ok(Box::pin(futures::stream::iter(events.into_iter().map(Ok))))
    }

    /// Get the provider name (e.g., "openai", "groq")
    fn name(&self) -> &str;
}
