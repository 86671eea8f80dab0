//! Chat-completion provider abstraction
//!
//! Provides a common interface for the chat collaborator plus the `OpenAI`
//! implementation used in production.

mod error;
mod openai;
mod types;

pub use error::{ChatError, ChatErrorKind};
pub use openai::OpenAIChat;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for chat-completion providers
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &ChatRequest) -> Result<AssistantReply, ChatError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for chat services
pub struct LoggingChat {
    inner: Arc<dyn ChatService>,
    model_id: String,
}

impl LoggingChat {
    pub fn new(inner: Arc<dyn ChatService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl ChatService for LoggingChat {
    async fn complete(&self, request: &ChatRequest) -> Result<AssistantReply, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(AssistantReply::Text(text)) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    chars = text.len(),
                    "Chat request completed with text"
                );
            }
            Ok(AssistantReply::Invocation(invocation)) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    capability = %invocation.name,
                    "Chat request completed with capability invocation"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
