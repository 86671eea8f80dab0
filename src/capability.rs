//! Capability catalog, typed invocations, and dispatch
//!
//! The chat collaborator is offered a catalog of named capabilities and may
//! answer a turn with an invocation request instead of text. Invocations are
//! resolved against the catalog into a typed `CapabilityCall` before any
//! side effect runs; unknown names and malformed arguments fail the turn with
//! a descriptive error rather than falling through.

pub mod email;
pub mod time;
pub mod weather;

pub use email::{EmailSendInput, MailService};
pub use time::{TimeLookupInput, TimeService};
pub use weather::{WeatherLookupInput, WeatherService};

use crate::config::Config;
use crate::llm::{CapabilitySpec, InvocationRequest};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Typed, validated capability invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityCall {
    TimeLookup(TimeLookupInput),
    WeatherLookup(WeatherLookupInput),
    EmailSend(EmailSendInput),
}

impl CapabilityCall {
    /// Parse a wire invocation into a typed call, validating the arguments
    /// against the capability's schema (required fields, types).
    pub fn parse(name: &str, arguments: &str) -> Result<Self, CallParseError> {
        match name {
            time::NAME => parse_args(name, arguments).map(CapabilityCall::TimeLookup),
            weather::NAME => parse_args(name, arguments).map(CapabilityCall::WeatherLookup),
            email::NAME => parse_args(name, arguments).map(CapabilityCall::EmailSend),
            _ => Err(CallParseError::Unrecognized {
                name: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CapabilityCall::TimeLookup(_) => time::NAME,
            CapabilityCall::WeatherLookup(_) => weather::NAME,
            CapabilityCall::EmailSend(_) => email::NAME,
        }
    }
}

fn parse_args<T: DeserializeOwned>(name: &str, arguments: &str) -> Result<T, CallParseError> {
    serde_json::from_str(arguments).map_err(|e| CallParseError::InvalidArguments {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Invocation resolution failure; aborts the turn, never the process
#[derive(Debug, Error)]
pub enum CallParseError {
    #[error("unrecognized capability `{name}`")]
    Unrecognized { name: String },
    #[error("invalid arguments for `{name}`: {message}")]
    InvalidArguments { name: String, message: String },
}

/// Capability execution failure
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("{capability} failed: {message}")]
    ServiceFailure {
        capability: &'static str,
        message: String,
    },
    #[error("{capability} is not configured")]
    NotConfigured { capability: &'static str },
}

impl InvokeError {
    pub fn service(capability: &'static str, message: impl Into<String>) -> Self {
        Self::ServiceFailure {
            capability,
            message: message.into(),
        }
    }
}

/// Catalog of capabilities advertised to the model.
///
/// Composed once at startup, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct CapabilityCatalog {
    specs: Vec<CapabilitySpec>,
}

impl CapabilityCatalog {
    pub fn new(specs: Vec<CapabilitySpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[CapabilitySpec] {
        &self.specs
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.iter().any(|s| s.name == name)
    }

    /// Resolve a wire invocation into a typed call. A name absent from the
    /// catalog is unrecognized even if the dispatch enum knows it, so an
    /// unconfigured capability can never be reached by a hallucinated call.
    pub fn resolve(&self, invocation: &InvocationRequest) -> Result<CapabilityCall, CallParseError> {
        if !self.contains(&invocation.name) {
            return Err(CallParseError::Unrecognized {
                name: invocation.name.clone(),
            });
        }
        CapabilityCall::parse(&invocation.name, &invocation.arguments)
    }
}

/// Executes resolved capability calls
#[async_trait]
pub trait CapabilityExecutor: Send + Sync {
    async fn invoke(&self, call: &CapabilityCall) -> Result<String, InvokeError>;
}

/// Production executor dispatching over the configured services
pub struct ServiceExecutor {
    time: TimeService,
    weather: Option<WeatherService>,
    email: Option<MailService>,
}

#[async_trait]
impl CapabilityExecutor for ServiceExecutor {
    async fn invoke(&self, call: &CapabilityCall) -> Result<String, InvokeError> {
        match call {
            CapabilityCall::TimeLookup(input) => self.time.lookup(input).await,
            CapabilityCall::WeatherLookup(input) => match &self.weather {
                Some(service) => Ok(service.forecast(input).await),
                None => Err(InvokeError::NotConfigured {
                    capability: weather::NAME,
                }),
            },
            CapabilityCall::EmailSend(input) => match &self.email {
                Some(service) => Ok(service.send(input).await),
                None => Err(InvokeError::NotConfigured {
                    capability: email::NAME,
                }),
            },
        }
    }
}

/// Compose the catalog and executor from configuration.
///
/// `lookupTime` needs no credentials and is always registered. The others are
/// omitted from the catalog with a warning when their credentials are missing,
/// so the model is never offered a capability that cannot run.
pub fn compose(config: &Config) -> (CapabilityCatalog, ServiceExecutor) {
    let mut specs = vec![time::spec()];

    let weather = if let Some(key) = config.rapidapi_key.clone() {
        specs.push(weather::spec());
        Some(WeatherService::new(key, None))
    } else {
        tracing::warn!("X_RAPIDAPI_KEY not set, lookupWeather disabled");
        None
    };

    let email = match (config.sendgrid_api_key.clone(), config.sender_email.clone()) {
        (Some(key), Some(sender)) => {
            specs.push(email::spec());
            Some(MailService::new(key, sender, None))
        }
        _ => {
            tracing::warn!("SENDGRID_API_KEY or SENDER_EMAIL not set, sendEmail disabled");
            None
        }
    };

    let executor = ServiceExecutor {
        time: TimeService::new(None),
        weather,
        email,
    };

    (CapabilityCatalog::new(specs), executor)
}
