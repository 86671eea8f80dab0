//! Pure turn state machine
//!
//! One conversational turn moves through
//! `AwaitingInput -> Dispatching -> {Finalizing, Invoking} -> AwaitingContinue`
//! and then back to `AwaitingInput` or on to `Terminated`. The transition
//! function is pure: the driver performs the blocking work its current state
//! calls for (reading a line, calling the chat collaborator, invoking a
//! capability), feeds the outcome in as an event, and applies the returned
//! effects. Finalizing performs no waiting and is realized as the effect set
//! of its transition.

#[cfg(test)]
mod proptests;

use crate::capability::CapabilityCall;
use thiserror::Error;

/// Notice emitted when the continuation answer is neither Y nor N
pub const INVALID_CONTINUE_NOTICE: &str = "Invalid input. Please enter 'Y' or 'N'.";

/// Loop states. States carry the data their pending work needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    /// Blocked on the next line of user text
    AwaitingInput,
    /// Chat completion in flight for the utterance
    Dispatching { utterance: String },
    /// Capability call in flight
    Invoking {
        utterance: String,
        call: CapabilityCall,
    },
    /// Blocked on the yes/no continuation answer
    AwaitingContinue,
    /// Session over
    Terminated,
}

/// Outcomes of the driver's per-state work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// A line of user text was read
    Input { utterance: String },
    /// The chat collaborator answered with final text
    ReplyText { text: String },
    /// The chat collaborator requested a capability, resolved against the
    /// catalog into a typed call
    ReplyInvocation { call: CapabilityCall },
    /// The invocation named a capability outside the catalog
    Unrecognized { name: String },
    /// The capability produced result text
    Resolved { result: String },
    /// The chat call, argument validation, or capability failed; the turn is
    /// abandoned with a diagnostic and History untouched
    TurnFailed { diagnostic: String },
    /// The continuation prompt was answered
    Continue { answer: String },
}

/// Bookkeeping outputs of a transition, applied by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append Turn(utterance, response) to the session and emit the response
    RecordTurn { utterance: String, response: String },
    /// Print text without touching history (diagnostics, notices)
    Emit { text: String },
    /// Re-submit the result text for a summarized emission, never recorded
    Summarize { result: String },
}

/// Per-session settings consulted by the transition function
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnContext {
    /// Emit an additional summarized rendering of capability results
    pub summarize_results: bool,
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same outputs, no I/O
pub fn transition(
    state: &TurnState,
    context: &TurnContext,
    event: TurnEvent,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // A new utterance unconditionally goes to the chat collaborator
        (TurnState::AwaitingInput, TurnEvent::Input { utterance }) => {
            Ok(TransitionResult::new(TurnState::Dispatching { utterance }))
        }

        // Direct answer: record the turn, ask about continuing
        (TurnState::Dispatching { utterance }, TurnEvent::ReplyText { text }) => {
            Ok(TransitionResult::new(TurnState::AwaitingContinue).with_effect(
                Effect::RecordTurn {
                    utterance: utterance.clone(),
                    response: text,
                },
            ))
        }

        // Capability requested: go execute it
        (TurnState::Dispatching { utterance }, TurnEvent::ReplyInvocation { call }) => {
            Ok(TransitionResult::new(TurnState::Invoking {
                utterance: utterance.clone(),
                call,
            }))
        }

        // Unknown capability: surface it, leave History untouched, and fall
        // through to the continuation prompt like any completed turn
        (TurnState::Dispatching { .. }, TurnEvent::Unrecognized { name }) => {
            Ok(
                TransitionResult::new(TurnState::AwaitingContinue).with_effect(Effect::Emit {
                    text: format!("Unrecognized capability `{name}` requested; nothing was done."),
                }),
            )
        }

        // Capability result: record it and optionally summarize
        (TurnState::Invoking { utterance, .. }, TurnEvent::Resolved { result }) => {
            let mut transition_result = TransitionResult::new(TurnState::AwaitingContinue)
                .with_effect(Effect::RecordTurn {
                    utterance: utterance.clone(),
                    response: result.clone(),
                });
            if context.summarize_results {
                transition_result = transition_result.with_effect(Effect::Summarize { result });
            }
            Ok(transition_result)
        }

        // Failed turns skip the continuation prompt and go straight back to
        // the input prompt, with History untouched
        (
            TurnState::Dispatching { .. } | TurnState::Invoking { .. },
            TurnEvent::TurnFailed { diagnostic },
        ) => Ok(TransitionResult::new(TurnState::AwaitingInput)
            .with_effect(Effect::Emit { text: diagnostic })),

        (TurnState::AwaitingContinue, TurnEvent::Continue { answer }) => {
            if answer.eq_ignore_ascii_case("n") {
                Ok(TransitionResult::new(TurnState::Terminated))
            } else if answer.eq_ignore_ascii_case("y") {
                Ok(TransitionResult::new(TurnState::AwaitingInput))
            } else {
                Ok(
                    TransitionResult::new(TurnState::Terminated).with_effect(Effect::Emit {
                        text: INVALID_CONTINUE_NOTICE.to_string(),
                    }),
                )
            }
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in {state:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::TimeLookupInput;

    fn test_context() -> TurnContext {
        TurnContext::default()
    }

    fn time_call() -> CapabilityCall {
        CapabilityCall::TimeLookup(TimeLookupInput {
            location: "Asia/Tokyo".to_string(),
        })
    }

    #[test]
    fn test_input_goes_to_dispatching() {
        let result = transition(
            &TurnState::AwaitingInput,
            &test_context(),
            TurnEvent::Input {
                utterance: "hello".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            result.new_state,
            TurnState::Dispatching {
                utterance: "hello".to_string()
            }
        );
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_text_reply_records_and_asks_to_continue() {
        let result = transition(
            &TurnState::Dispatching {
                utterance: "what is 2+2?".to_string(),
            },
            &test_context(),
            TurnEvent::ReplyText {
                text: "4".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, TurnState::AwaitingContinue);
        assert_eq!(
            result.effects,
            vec![Effect::RecordTurn {
                utterance: "what is 2+2?".to_string(),
                response: "4".to_string(),
            }]
        );
    }

    #[test]
    fn test_invocation_goes_to_invoking() {
        let result = transition(
            &TurnState::Dispatching {
                utterance: "time in tokyo?".to_string(),
            },
            &test_context(),
            TurnEvent::ReplyInvocation { call: time_call() },
        )
        .unwrap();

        assert_eq!(
            result.new_state,
            TurnState::Invoking {
                utterance: "time in tokyo?".to_string(),
                call: time_call(),
            }
        );
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_resolved_records_result_text() {
        let result = transition(
            &TurnState::Invoking {
                utterance: "time in tokyo?".to_string(),
                call: time_call(),
            },
            &test_context(),
            TurnEvent::Resolved {
                result: "The current time in Asia/Tokyo is 9:30AM.".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, TurnState::AwaitingContinue);
        assert_eq!(
            result.effects,
            vec![Effect::RecordTurn {
                utterance: "time in tokyo?".to_string(),
                response: "The current time in Asia/Tokyo is 9:30AM.".to_string(),
            }]
        );
    }

    #[test]
    fn test_resolved_adds_summarize_effect_when_enabled() {
        let context = TurnContext {
            summarize_results: true,
        };
        let result = transition(
            &TurnState::Invoking {
                utterance: "weather?".to_string(),
                call: time_call(),
            },
            &context,
            TurnEvent::Resolved {
                result: "sunny".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.effects.len(), 2);
        assert_eq!(
            result.effects[1],
            Effect::Summarize {
                result: "sunny".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_emits_diagnostic_without_recording() {
        let result = transition(
            &TurnState::Dispatching {
                utterance: "fire the laser".to_string(),
            },
            &test_context(),
            TurnEvent::Unrecognized {
                name: "fireLaser".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, TurnState::AwaitingContinue);
        assert!(
            !result
                .effects
                .iter()
                .any(|e| matches!(e, Effect::RecordTurn { .. })),
            "history must stay untouched"
        );
        assert!(matches!(
            &result.effects[0],
            Effect::Emit { text } if text.contains("fireLaser")
        ));
    }

    #[test]
    fn test_failed_dispatch_returns_to_input() {
        let result = transition(
            &TurnState::Dispatching {
                utterance: "hello".to_string(),
            },
            &test_context(),
            TurnEvent::TurnFailed {
                diagnostic: "Rate limit exceeded".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, TurnState::AwaitingInput);
        assert_eq!(
            result.effects,
            vec![Effect::Emit {
                text: "Rate limit exceeded".to_string()
            }]
        );
    }

    #[test]
    fn test_failed_invocation_returns_to_input() {
        let result = transition(
            &TurnState::Invoking {
                utterance: "time?".to_string(),
                call: time_call(),
            },
            &test_context(),
            TurnEvent::TurnFailed {
                diagnostic: "lookupTime failed: HTTP 404".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, TurnState::AwaitingInput);
    }

    #[test]
    fn test_continue_yes_returns_to_input() {
        for answer in ["Y", "y"] {
            let result = transition(
                &TurnState::AwaitingContinue,
                &test_context(),
                TurnEvent::Continue {
                    answer: answer.to_string(),
                },
            )
            .unwrap();
            assert_eq!(result.new_state, TurnState::AwaitingInput);
            assert!(result.effects.is_empty());
        }
    }

    #[test]
    fn test_continue_no_terminates() {
        for answer in ["N", "n"] {
            let result = transition(
                &TurnState::AwaitingContinue,
                &test_context(),
                TurnEvent::Continue {
                    answer: answer.to_string(),
                },
            )
            .unwrap();
            assert_eq!(result.new_state, TurnState::Terminated);
            assert!(result.effects.is_empty());
        }
    }

    #[test]
    fn test_continue_other_terminates_with_notice() {
        let result = transition(
            &TurnState::AwaitingContinue,
            &test_context(),
            TurnEvent::Continue {
                answer: "maybe".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, TurnState::Terminated);
        assert_eq!(
            result.effects,
            vec![Effect::Emit {
                text: INVALID_CONTINUE_NOTICE.to_string()
            }]
        );
    }

    #[test]
    fn test_invalid_pair_is_rejected() {
        let result = transition(
            &TurnState::AwaitingInput,
            &test_context(),
            TurnEvent::Resolved {
                result: "out of nowhere".to_string(),
            },
        );

        assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }
}
