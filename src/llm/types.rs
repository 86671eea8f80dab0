//! Common types for chat-completion interactions

use serde::{Deserialize, Serialize};

/// Chat completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub capabilities: Vec<CapabilitySpec>,
    pub dispatch: DispatchPolicy,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Request with no capabilities offered, e.g. for summarization calls
    pub fn text_only(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            capabilities: Vec::new(),
            dispatch: DispatchPolicy::None,
            max_tokens: None,
        }
    }
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Whether the model may elect to invoke a capability instead of answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Model decides autonomously between answering and invoking
    Auto,
    /// Model must answer with text
    None,
}

/// Capability descriptor advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitySpec {
    pub name: String,
    pub description: String,
    /// JSON schema for the arguments, including the `required` list
    pub parameters: serde_json::Value,
}

/// Chat completion outcome: a final answer or a capability invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantReply {
    Text(String),
    Invocation(InvocationRequest),
}

/// Structured capability-invocation request produced by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub name: String,
    /// JSON-encoded argument object, exactly as received off the wire
    pub arguments: String,
}
