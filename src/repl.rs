//! Console driver for the turn state machine
//!
//! The driver owns the impure half of the loop: it performs the blocking work
//! the current state calls for (reading a line, calling the chat collaborator,
//! invoking a capability), feeds the outcome into the pure transition
//! function, and applies the returned effects against the session and the
//! console.

use crate::capability::{CallParseError, CapabilityCatalog, CapabilityExecutor};
use crate::dispatch::{transition, Effect, TransitionError, TurnContext, TurnEvent, TurnState};
use crate::llm::{AssistantReply, ChatRequest, ChatService, DispatchPolicy};
use crate::session::Session;
use crate::summarize::summarize_result;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const INPUT_PROMPT: &str = "Your input: ";
const CONTINUE_PROMPT: &str = "Would you like to continue the conversation? (Y/N) ";

/// Line-oriented console seam, mockable for loop tests
pub trait Console: Send {
    /// Print the prompt and block for one line. `None` means end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Show text to the user
    fn emit(&mut self, text: &str);
}

/// Stdin/stdout console
pub struct StdConsole {
    stdin: io::Stdin,
}

impl StdConsole {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = self.stdin.lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn emit(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Conversation REPL: the session is owned by the caller and handed in by
/// reference, so history never outlives its process run.
pub struct Repl<C: Console> {
    chat: Arc<dyn ChatService>,
    executor: Arc<dyn CapabilityExecutor>,
    catalog: CapabilityCatalog,
    context: TurnContext,
    console: C,
}

impl<C: Console> Repl<C> {
    pub fn new(
        chat: Arc<dyn ChatService>,
        executor: Arc<dyn CapabilityExecutor>,
        catalog: CapabilityCatalog,
        context: TurnContext,
        console: C,
    ) -> Self {
        Self {
            chat,
            executor,
            catalog,
            context,
            console,
        }
    }

    /// Drive the machine until Terminated or end of console input
    pub async fn run(&mut self, session: &mut Session) -> Result<(), TransitionError> {
        let mut state = TurnState::AwaitingInput;

        while state != TurnState::Terminated {
            let Some(event) = self.produce_event(&state, session).await? else {
                // EOF at a prompt: clean termination, same as answering N
                tracing::info!("End of input, terminating session");
                break;
            };

            let step = transition(&state, &self.context, event)?;
            state = step.new_state;
            for effect in step.effects {
                self.apply(effect, session).await;
            }
        }

        Ok(())
    }

    /// Perform the blocking work the state calls for; `Ok(None)` is EOF
    async fn produce_event(
        &mut self,
        state: &TurnState,
        session: &Session,
    ) -> Result<Option<TurnEvent>, TransitionError> {
        let event = match state {
            TurnState::AwaitingInput => match self.read(INPUT_PROMPT)? {
                Some(utterance) => TurnEvent::Input { utterance },
                None => return Ok(None),
            },

            TurnState::Dispatching { utterance } => {
                let request = ChatRequest {
                    messages: session.prompt_messages(utterance),
                    capabilities: self.catalog.specs().to_vec(),
                    dispatch: DispatchPolicy::Auto,
                    max_tokens: None,
                };

                match self.chat.complete(&request).await {
                    Ok(AssistantReply::Text(text)) => TurnEvent::ReplyText { text },
                    Ok(AssistantReply::Invocation(invocation)) => {
                        match self.catalog.resolve(&invocation) {
                            Ok(call) => TurnEvent::ReplyInvocation { call },
                            Err(CallParseError::Unrecognized { name }) => {
                                TurnEvent::Unrecognized { name }
                            }
                            Err(e @ CallParseError::InvalidArguments { .. }) => {
                                TurnEvent::TurnFailed {
                                    diagnostic: e.to_string(),
                                }
                            }
                        }
                    }
                    Err(e) => TurnEvent::TurnFailed {
                        diagnostic: format!("Chat request failed: {}", e.message),
                    },
                }
            }

            TurnState::Invoking { call, .. } => match self.executor.invoke(call).await {
                Ok(result) => TurnEvent::Resolved { result },
                Err(e) => TurnEvent::TurnFailed {
                    diagnostic: e.to_string(),
                },
            },

            TurnState::AwaitingContinue => match self.read(CONTINUE_PROMPT)? {
                Some(answer) => TurnEvent::Continue {
                    answer: answer.trim().to_string(),
                },
                None => return Ok(None),
            },

            TurnState::Terminated => {
                return Err(TransitionError::InvalidTransition(
                    "event requested after termination".to_string(),
                ))
            }
        };

        Ok(Some(event))
    }

    fn read(&mut self, prompt: &str) -> Result<Option<String>, TransitionError> {
        self.console
            .read_line(prompt)
            .map_err(|e| TransitionError::InvalidTransition(format!("console read failed: {e}")))
    }

    async fn apply(&mut self, effect: Effect, session: &mut Session) {
        match effect {
            Effect::RecordTurn {
                utterance,
                response,
            } => {
                session.record(utterance, response.clone());
                self.console.emit(&response);
            }
            Effect::Emit { text } => self.console.emit(&text),
            Effect::Summarize { result } => {
                if let Some(summary) = summarize_result(&result, self.chat.clone()).await {
                    self.console.emit(&summary);
                }
            }
        }
    }
}
