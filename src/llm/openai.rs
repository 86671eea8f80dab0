//! `OpenAI` chat-completions provider implementation

use super::types::{
    AssistantReply, ChatMessage, ChatRequest, DispatchPolicy, InvocationRequest, Role,
};
use super::{ChatError, ChatService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// `OpenAI`-compatible chat service
pub struct OpenAIChat {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAIChat {
    pub fn new(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let base = base_url.map_or(DEFAULT_BASE_URL, |url| url.trim_end_matches('/'));
        let url = format!("{base}/chat/completions");

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            model,
            url,
        }
    }

    fn translate_request(&self, request: &ChatRequest) -> OpenAIRequest {
        let messages = request.messages.iter().map(translate_message).collect();

        let tools = if request.capabilities.is_empty() {
            None
        } else {
            Some(
                request
                    .capabilities
                    .iter()
                    .map(|c| OpenAITool {
                        r#type: "function".to_string(),
                        function: OpenAIFunction {
                            name: c.name.clone(),
                            description: c.description.clone(),
                            parameters: c.parameters.clone(),
                        },
                    })
                    .collect(),
            )
        };

        // tool_choice is only meaningful when tools are offered
        let tool_choice = tools.as_ref().map(|_| {
            match request.dispatch {
                DispatchPolicy::Auto => "auto",
                DispatchPolicy::None => "none",
            }
            .to_string()
        });

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            tools,
            tool_choice,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    fn normalize_response(resp: OpenAIResponse) -> Result<AssistantReply, ChatError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::unknown("No choices in response"))?;

        let text = choice.message.content.unwrap_or_default();

        let mut calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter(|tc| !tc.function.name.is_empty());

        if let Some(tc) = calls.next() {
            let dropped = calls.count();
            if dropped > 0 {
                tracing::warn!(dropped, "Response carried multiple tool calls, honoring the first");
            }
            if !text.is_empty() {
                tracing::debug!("Response carried both text and a tool call, dispatching the tool call");
            }
            return Ok(AssistantReply::Invocation(InvocationRequest {
                name: tc.function.name,
                arguments: tc.function.arguments,
            }));
        }

        if text.is_empty() {
            return Err(ChatError::unknown("Empty completion: no content or tool calls"));
        }

        Ok(AssistantReply::Text(text))
    }
}

#[async_trait]
impl ChatService for OpenAIChat {
    async fn complete(&self, request: &ChatRequest) -> Result<AssistantReply, ChatError> {
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::network(format!("Connection failed: {e}"))
                } else {
                    ChatError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            // Parse error response
            if let Ok(error_resp) = serde_json::from_str::<OpenAIErrorResponse>(&body) {
                let message = error_resp.error.message;
                return Err(match status.as_u16() {
                    401 => ChatError::auth(format!("Authentication failed: {message}")),
                    429 => ChatError::rate_limit(format!("Rate limit exceeded: {message}")),
                    400 => ChatError::invalid_request(format!("Invalid request: {message}")),
                    500..=599 => ChatError::server_error(format!("Server error: {message}")),
                    _ => ChatError::unknown(format!("HTTP {status}: {message}")),
                });
            }
            return Err(ChatError::unknown(format!("HTTP {status} error: {body}")));
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            ChatError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(openai_response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

fn translate_message(msg: &ChatMessage) -> OpenAIMessage {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    OpenAIMessage {
        role: role.to_string(),
        content: Some(msg.content.clone()),
        tool_calls: None,
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    r#type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIToolCall {
    #[allow(dead_code)] // Part of API response, never echoed back
    id: String,
    #[allow(dead_code)]
    r#type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
    #[allow(dead_code)]
    r#type: Option<String>,
    #[allow(dead_code)]
    code: Option<String>,
}
