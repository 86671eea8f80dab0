//! Time lookup against the World Time API

use super::InvokeError;
use crate::llm::CapabilitySpec;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const NAME: &str = "lookupTime";

const DEFAULT_BASE_URL: &str = "http://worldtimeapi.org/api/timezone";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn spec() -> CapabilitySpec {
    CapabilitySpec {
        name: NAME.to_string(),
        description: "get the current time in a given location".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location, e.g. Beijing, China. But it should be written in a timezone name like Asia/Shanghai"
                }
            },
            "required": ["location"]
        }),
    }
}

/// Arguments for `lookupTime`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeLookupInput {
    pub location: String,
}

/// World Time API client
pub struct TimeService {
    client: Client,
    base_url: String,
}

impl TimeService {
    pub fn new(base_url: Option<&str>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url
                .map_or(DEFAULT_BASE_URL, |url| url.trim_end_matches('/'))
                .to_string(),
        }
    }

    /// Current time in the given timezone, formatted for display.
    ///
    /// Failures abort the turn: details are logged here and the returned
    /// error carries a short message for the user-facing diagnostic.
    pub async fn lookup(&self, input: &TimeLookupInput) -> Result<String, InvokeError> {
        let url = format!("{}/{}", self.base_url, input.location);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InvokeError::service(NAME, format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InvokeError::service(NAME, format!("failed to read response: {e}")))?;

        if !status.is_success() {
            tracing::error!(%status, %body, location = %input.location, "Time lookup failed");
            return Err(InvokeError::service(NAME, format!("HTTP {status}")));
        }

        let payload: WorldTimeResponse = serde_json::from_str(&body)
            .map_err(|e| InvokeError::service(NAME, format!("unexpected payload: {e}")))?;

        render_time(&input.location, &payload.datetime)
    }
}

/// Format an RFC 3339 datetime as `h:mmA` in its own offset, e.g. `9:30AM`
fn render_time(location: &str, datetime: &str) -> Result<String, InvokeError> {
    let parsed = chrono::DateTime::parse_from_rfc3339(datetime)
        .map_err(|e| InvokeError::service(NAME, format!("unparseable datetime `{datetime}`: {e}")))?;

    Ok(format!(
        "The current time in {location} is {}.",
        parsed.format("%-I:%M%p")
    ))
}

#[derive(Debug, Deserialize)]
struct WorldTimeResponse {
    datetime: String,
}
