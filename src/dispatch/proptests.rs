//! Property-based tests for the turn machine
//!
//! The continuation policy must hold for arbitrary answers: only y/Y
//! continues, only n/N terminates silently, everything else terminates with
//! the invalid-input notice. Failed turns never touch history.

use super::{
    transition, Effect, TurnContext, TurnEvent, TurnState, INVALID_CONTINUE_NOTICE,
};
use proptest::prelude::*;

fn arb_answer() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Y".to_string()),
        Just("y".to_string()),
        Just("N".to_string()),
        Just("n".to_string()),
        "[a-zA-Z0-9 ]{0,12}",
    ]
}

proptest! {
    #[test]
    fn continuation_policy_is_total(answer in arb_answer()) {
        let result = transition(
            &TurnState::AwaitingContinue,
            &TurnContext::default(),
            TurnEvent::Continue { answer: answer.clone() },
        )
        .expect("continue answers always transition");

        if answer.eq_ignore_ascii_case("y") {
            prop_assert_eq!(result.new_state, TurnState::AwaitingInput);
            prop_assert!(result.effects.is_empty());
        } else if answer.eq_ignore_ascii_case("n") {
            prop_assert_eq!(result.new_state, TurnState::Terminated);
            prop_assert!(result.effects.is_empty());
        } else {
            prop_assert_eq!(result.new_state, TurnState::Terminated);
            prop_assert_eq!(
                &result.effects,
                &[Effect::Emit { text: INVALID_CONTINUE_NOTICE.to_string() }]
            );
        }
    }

    #[test]
    fn failed_turns_never_record_history(
        utterance in "[a-zA-Z0-9 ?]{1,40}",
        diagnostic in "[a-zA-Z0-9 :]{1,40}",
    ) {
        let result = transition(
            &TurnState::Dispatching { utterance },
            &TurnContext::default(),
            TurnEvent::TurnFailed { diagnostic },
        )
        .expect("failures always transition");

        prop_assert_eq!(result.new_state, TurnState::AwaitingInput);
        let recorded = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::RecordTurn { .. }));
        prop_assert!(!recorded);
    }
}
