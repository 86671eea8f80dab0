//! Capability-result summarization via a second completion call
//!
//! When enabled, a capability's raw result text is re-submitted to the chat
//! collaborator with a summarization instruction and the summary is shown in
//! addition to the result. The summary is never appended to History.

use crate::llm::{AssistantReply, ChatMessage, ChatRequest, ChatService};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const SUMMARIZE_PROMPT: &str =
    "Summarize the following tool result in one short, conversational sentence for the user. \
Output only the sentence.

Result:";

const SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESULT_LENGTH: usize = 2000;

/// Summarize a capability result for display.
///
/// Returns None if summarization fails (timeout, error, empty completion).
/// The caller shows only the raw result in that case; the turn is unaffected.
pub async fn summarize_result(result: &str, chat: Arc<dyn ChatService>) -> Option<String> {
    let truncated = if result.len() > MAX_RESULT_LENGTH {
        let mut cut: String = result.chars().take(MAX_RESULT_LENGTH).collect();
        cut.push_str("...");
        cut
    } else {
        result.to_string()
    };

    // No catalog: the summarizer must answer with text
    let mut request =
        ChatRequest::text_only(vec![ChatMessage::user(format!("{SUMMARIZE_PROMPT}\n{truncated}"))]);
    request.max_tokens = Some(100);

    match timeout(SUMMARIZE_TIMEOUT, chat.complete(&request)).await {
        Ok(Ok(AssistantReply::Text(text))) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Ok(Ok(AssistantReply::Invocation(invocation))) => {
            tracing::warn!(
                capability = %invocation.name,
                "Summarizer answered with an invocation, skipping summary"
            );
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e.message, "Summarization failed");
            None
        }
        Err(_) => {
            tracing::warn!("Summarization timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::DispatchPolicy;
    use crate::repl::testing::MockChat;

    #[tokio::test]
    async fn test_summarize_returns_trimmed_text() {
        let chat = Arc::new(MockChat::new("test-model"));
        chat.queue_text("  It is 9:30 in the morning in Tokyo.  ");

        let summary = summarize_result("The current time in Asia/Tokyo is 9:30AM.", chat.clone())
            .await
            .expect("summary");
        assert_eq!(summary, "It is 9:30 in the morning in Tokyo.");

        // The summarizer call must not offer the catalog
        let requests = chat.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].capabilities.is_empty());
        assert_eq!(requests[0].dispatch, DispatchPolicy::None);
    }

    #[tokio::test]
    async fn test_summarize_error_yields_none() {
        let chat = Arc::new(MockChat::new("test-model"));
        chat.queue_error(crate::llm::ChatError::network("connection refused"));

        assert!(summarize_result("anything", chat).await.is_none());
    }

    #[tokio::test]
    async fn test_summarize_empty_completion_yields_none() {
        let chat = Arc::new(MockChat::new("test-model"));
        chat.queue_text("   ");

        assert!(summarize_result("anything", chat).await.is_none());
    }

    #[tokio::test]
    async fn test_summarize_truncates_long_results() {
        let chat = Arc::new(MockChat::new("test-model"));
        chat.queue_text("long");

        let result = "x".repeat(MAX_RESULT_LENGTH + 500);
        summarize_result(&result, chat.clone()).await;

        let prompt = &chat.recorded_requests()[0].messages[0].content;
        assert!(prompt.len() < result.len());
        assert!(prompt.ends_with("..."));
    }
}
