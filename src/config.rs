//! Process configuration from environment variables

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Runtime configuration, read once at startup
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    /// RapidAPI key for the weather service; gates `lookupWeather`
    pub rapidapi_key: Option<String>,
    /// `SendGrid` key for the mail service; gates `sendEmail` together with `sender_email`
    pub sendgrid_api_key: Option<String>,
    /// Default sender address used when an email invocation omits `from`
    pub sender_email: Option<String>,
    /// Chat model ID
    pub model: String,
    /// Optional `OpenAI`-compatible base URL override (e.g. a gateway)
    pub openai_base_url: Option<String>,
    /// Re-submit capability results for summarization before showing them
    pub summarize: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            rapidapi_key: std::env::var("X_RAPIDAPI_KEY").ok(),
            sendgrid_api_key: std::env::var("SENDGRID_API_KEY").ok(),
            sender_email: std::env::var("SENDER_EMAIL").ok(),
            model: std::env::var("CONCIERGE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            summarize: std::env::var("CONCIERGE_SUMMARIZE")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy(" on "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }
}
