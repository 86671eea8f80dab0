//! Email dispatch via the SendGrid v3 mail API

use crate::llm::CapabilitySpec;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub const NAME: &str = "sendEmail";

pub const STATUS_SENT: &str = "Email Sent";
pub const STATUS_FAILED: &str = "message not sent";

const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn spec() -> CapabilitySpec {
    CapabilitySpec {
        name: NAME.to_string(),
        description: "send an email to a given recipient".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "description": "The recipient email address"
                },
                "from": {
                    "type": "string",
                    "description": "The sender email address; omit to use the configured default"
                },
                "subject": {
                    "type": "string",
                    "description": "The subject line"
                },
                "text": {
                    "type": "string",
                    "description": "The plain-text message body"
                }
            },
            "required": ["to", "subject", "text"]
        }),
    }
}

/// Arguments for `sendEmail`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailSendInput {
    pub to: String,
    #[serde(default)]
    pub from: Option<String>,
    pub subject: String,
    pub text: String,
}

/// SendGrid client. Delivery is awaited so the reported status reflects the
/// actual mail-service outcome.
pub struct MailService {
    client: Client,
    api_key: String,
    sender: String,
    url: String,
}

impl MailService {
    pub fn new(api_key: String, sender: String, base_url: Option<&str>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            sender,
            url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        }
    }

    /// Deliver the message and report the outcome as a status string
    pub async fn send(&self, input: &EmailSendInput) -> String {
        match self.deliver(input).await {
            Ok(()) => STATUS_SENT.to_string(),
            Err(message) => {
                tracing::error!(to = %input.to, error = %message, "Email delivery failed");
                STATUS_FAILED.to_string()
            }
        }
    }

    async fn deliver(&self, input: &EmailSendInput) -> Result<(), String> {
        let payload = build_payload(input, &self.sender);

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status}: {body}"));
        }

        Ok(())
    }
}

fn build_payload(input: &EmailSendInput, default_sender: &str) -> MailRequest {
    let from = input.from.as_deref().unwrap_or(default_sender);

    MailRequest {
        personalizations: vec![Personalization {
            to: vec![Address {
                email: input.to.clone(),
            }],
        }],
        from: Address {
            email: from.to_string(),
        },
        subject: input.subject.clone(),
        content: vec![MailContent {
            r#type: "text/plain".to_string(),
            value: input.text.clone(),
        }],
    }
}

// SendGrid v3 request types

#[derive(Debug, Serialize)]
struct MailRequest {
    personalizations: Vec<Personalization>,
    from: Address,
    subject: String,
    content: Vec<MailContent>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct Address {
    email: String,
}

#[derive(Debug, Serialize)]
struct MailContent {
    r#type: String,
    value: String,
}
