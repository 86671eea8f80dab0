//! concierge - console conversational agent
//!
//! Forwards user turns to an LLM chat-completion endpoint and dispatches the
//! model's capability invocations (time lookup, weather lookup, email) before
//! resuming the conversation.

mod capability;
mod config;
mod dispatch;
mod llm;
mod repl;
mod session;
mod summarize;

use config::Config;
use dispatch::TurnContext;
use llm::{ChatService, LoggingChat, OpenAIChat};
use repl::{Repl, StdConsole};
use session::Session;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env first so the filter and config see it
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();

    let Some(api_key) = config.openai_api_key.clone() else {
        tracing::error!("OPENAI_API_KEY not set, cannot start");
        return Err("OPENAI_API_KEY not set".into());
    };

    let chat: Arc<dyn ChatService> = Arc::new(LoggingChat::new(Arc::new(OpenAIChat::new(
        api_key,
        config.model.clone(),
        config.openai_base_url.as_deref(),
    ))));

    let (catalog, executor) = capability::compose(&config);
    tracing::info!(
        model = %config.model,
        capabilities = catalog.specs().len(),
        summarize = config.summarize,
        "Starting conversation"
    );

    let context = TurnContext {
        summarize_results: config.summarize,
    };

    let mut session = Session::new();
    let mut repl = Repl::new(
        chat,
        Arc::new(executor),
        catalog,
        context,
        StdConsole::new(),
    );
    repl.run(&mut session).await?;

    tracing::info!(turns = session.len(), "Session over");
    Ok(())
}
