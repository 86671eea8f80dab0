//! Property-based tests for history replay
//!
//! Replay must preserve insertion order, alternate user/assistant roles, and
//! produce exactly `2N + 1` messages for `N` recorded turns.

use super::Session;
use crate::llm::Role;
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.!?,]{0,60}"
}

fn arb_turns() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((arb_text(), arb_text()), 0..20)
}

proptest! {
    #[test]
    fn prompt_messages_has_2n_plus_1_entries(turns in arb_turns(), utterance in arb_text()) {
        let mut session = Session::new();
        for (u, r) in &turns {
            session.record(u.clone(), r.clone());
        }

        let messages = session.prompt_messages(&utterance);
        prop_assert_eq!(messages.len(), turns.len() * 2 + 1);
    }

    #[test]
    fn prompt_messages_alternates_roles_and_preserves_content(
        turns in arb_turns(),
        utterance in arb_text(),
    ) {
        let mut session = Session::new();
        for (u, r) in &turns {
            session.record(u.clone(), r.clone());
        }

        let messages = session.prompt_messages(&utterance);
        for (i, (u, r)) in turns.iter().enumerate() {
            prop_assert_eq!(messages[i * 2].role, Role::User);
            prop_assert_eq!(&messages[i * 2].content, u);
            prop_assert_eq!(messages[i * 2 + 1].role, Role::Assistant);
            prop_assert_eq!(&messages[i * 2 + 1].content, r);
        }

        let last = messages.last().expect("replay is never empty");
        prop_assert_eq!(last.role, Role::User);
        prop_assert_eq!(&last.content, &utterance);
    }

    #[test]
    fn record_only_appends(turns in arb_turns()) {
        let mut session = Session::new();
        for (i, (u, r)) in turns.iter().enumerate() {
            let before: Vec<_> = session.turns().to_vec();
            session.record(u.clone(), r.clone());
            prop_assert_eq!(session.len(), i + 1);
            prop_assert_eq!(&session.turns()[..i], &before[..]);
        }
    }
}
