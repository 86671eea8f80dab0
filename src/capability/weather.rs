//! Weather lookup against the WeatherAPI service (via RapidAPI)

use crate::llm::CapabilitySpec;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const NAME: &str = "lookupWeather";

/// Fixed sentinel returned on any failure; this capability never errors past
/// its boundary.
pub const NO_FORECAST: &str = "No forecast found";

const DEFAULT_BASE_URL: &str = "https://weatherapi-com.p.rapidapi.com/forecast.json";
const RAPIDAPI_HOST: &str = "weatherapi-com.p.rapidapi.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn spec() -> CapabilitySpec {
    CapabilitySpec {
        name: NAME.to_string(),
        description: "get the weather forecast in a given location".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location, e.g. Beijing, China. But it should be written in a city, state, country"
                }
            },
            "required": ["location"]
        }),
    }
}

/// Arguments for `lookupWeather`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeatherLookupInput {
    pub location: String,
}

/// WeatherAPI client requesting a 3-day forecast
pub struct WeatherService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherService {
    pub fn new(api_key: String, base_url: Option<&str>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        }
    }

    /// Forecast summary for the location; the sentinel on any failure
    pub async fn forecast(&self, input: &WeatherLookupInput) -> String {
        match self.fetch(&input.location).await {
            Ok(summary) => summary,
            Err(message) => {
                tracing::error!(location = %input.location, error = %message, "Weather lookup failed");
                NO_FORECAST.to_string()
            }
        }
    }

    async fn fetch(&self, location: &str) -> Result<String, String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", location), ("days", "3")])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        if !status.is_success() {
            return Err(format!("HTTP {status}: {body}"));
        }

        render_forecast(&body)
    }
}

/// Summarize a forecast payload: current conditions plus per-day min/max
fn render_forecast(body: &str) -> Result<String, String> {
    let payload: ForecastResponse =
        serde_json::from_str(body).map_err(|e| format!("unexpected payload: {e}"))?;

    let mut summary = format!(
        "Weather for {}: currently {}, {:.0}F.",
        payload.location.name, payload.current.condition.text, payload.current.temp_f
    );
    for day in &payload.forecast.forecastday {
        summary.push_str(&format!(
            " {}: low {:.0}F, high {:.0}F.",
            day.date, day.day.mintemp_f, day.day.maxtemp_f
        ));
    }
    Ok(summary)
}

// WeatherAPI response subset

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: Location,
    current: Current,
    forecast: Forecast,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_f: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: Day,
}

#[derive(Debug, Deserialize)]
struct Day {
    mintemp_f: f64,
    maxtemp_f: f64,
}
