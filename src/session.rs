//! Conversation session: append-only turn history and prompt replay

#[cfg(test)]
mod proptests;

use crate::llm::ChatMessage;

/// One user utterance paired with the assistant's resulting response text.
/// Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub utterance: String,
    pub response: String,
}

/// Append-only history for one process run.
///
/// Created empty at session start, never persisted, dropped at exit. Owned by
/// the REPL and handed to the dispatch loop by reference.
#[derive(Debug, Default)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Record a completed turn
    pub fn record(&mut self, utterance: impl Into<String>, response: impl Into<String>) {
        self.turns.push(Turn {
            utterance: utterance.into(),
            response: response.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Replay history as alternating user/assistant messages followed by the
    /// new utterance: exactly `2 * len + 1` entries, insertion order preserved.
    pub fn prompt_messages(&self, utterance: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.turns.len() * 2 + 1);
        for turn in &self.turns {
            messages.push(ChatMessage::user(turn.utterance.clone()));
            messages.push(ChatMessage::assistant(turn.response.clone()));
        }
        messages.push(ChatMessage::user(utterance.to_string()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_record_preserves_insertion_order() {
        let mut session = Session::new();
        session.record("first", "one");
        session.record("second", "two");

        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[0].utterance, "first");
        assert_eq!(session.turns()[1].response, "two");
    }

    #[test]
    fn test_prompt_messages_empty_history() {
        let session = Session::new();
        let messages = session.prompt_messages("hello");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], ChatMessage::user("hello"));
    }

    #[test]
    fn test_prompt_messages_replays_alternating_roles() {
        let mut session = Session::new();
        session.record("what is 2+2?", "4");
        session.record("and doubled?", "8");

        let messages = session.prompt_messages("thanks");
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0], ChatMessage::user("what is 2+2?"));
        assert_eq!(messages[1], ChatMessage::assistant("4"));
        assert_eq!(messages[2], ChatMessage::user("and doubled?"));
        assert_eq!(messages[3], ChatMessage::assistant("8"));
        assert_eq!(messages[4].role, Role::User);
        assert_eq!(messages[4].content, "thanks");
    }
}
