//! In-memory conversation session — bounded turn history plus named artifacts.
//!
//! One `Session` lives for one console run; nothing is persisted.
//!
//! Turns are kept oldest-first and capped at `max_turns`. When an append
//! would exceed the cap the oldest turn is dropped (FIFO), so replayed
//! context always ends with the most recent exchange.
//!
//! Artifacts are single-slot named values (the last budget table, the last
//! photo itinerary). Recording a name again replaces the previous value.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use tracing::{debug, trace};
use uuid::Uuid;

/// Artifact name for the most recent budget table.
pub const BUDGET_ARTIFACT: &str = "budget";
/// Artifact name for the most recent photo spot + itinerary text.
pub const ITINERARY_ARTIFACT: &str = "itinerary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Capitalised label used in exports and the console.
    pub fn title(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        })
    }
}

/// One role-attributed message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self { role, text: text.into() }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Active,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    max_turns: usize,
    turns: VecDeque<Turn>,
    artifacts: HashMap<String, String>,
}

impl Session {
    /// `max_turns` is clamped to at least 1.
    pub fn new(max_turns: usize) -> Self {
        let id = Uuid::new_v4();
        debug!(session_id = %id, max_turns, "session created");
        Self {
            id,
            max_turns: max_turns.max(1),
            turns: VecDeque::new(),
            artifacts: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        if self.turns.is_empty() { SessionState::Empty } else { SessionState::Active }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Empty input is rejected by the caller before it gets here.
    pub fn append_user_turn(&mut self, text: impl Into<String>) {
        self.push(Turn::new(Role::User, text));
    }

    /// Only called after a successful gateway response.
    pub fn append_assistant_turn(&mut self, text: impl Into<String>) {
        self.push(Turn::new(Role::Assistant, text));
    }

    fn push(&mut self, turn: Turn) {
        trace!(session_id = %self.id, role = %turn.role, len = turn.text.len(), "turn appended");
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
            debug!(session_id = %self.id, max_turns = self.max_turns, "oldest turn evicted");
        }
    }

    /// All retained turns, oldest first. Borrowing and cheap to call again;
    /// each call walks the same backing list from the start.
    pub fn history_as_context(&self) -> impl DoubleEndedIterator<Item = &Turn> + ExactSizeIterator + Clone + '_ {
        self.turns.iter()
    }

    pub fn record_artifact(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        debug!(session_id = %self.id, artifact = %name, "artifact recorded");
        self.artifacts.insert(name, value.into());
    }

    pub fn artifact(&self, name: &str) -> Option<&str> {
        self.artifacts.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty() {
        let s = Session::new(10);
        assert_eq!(s.state(), SessionState::Empty);
        assert_eq!(s.history_as_context().count(), 0);
    }

    #[test]
    fn history_preserves_append_order() {
        let mut s = Session::new(10);
        s.append_user_turn("Hi");
        s.append_assistant_turn("Hello");
        s.append_user_turn("Plan Kyoto");
        assert_eq!(s.state(), SessionState::Active);

        let got: Vec<(Role, &str)> = s.history_as_context().map(|t| (t.role(), t.text())).collect();
        assert_eq!(
            got,
            vec![(Role::User, "Hi"), (Role::Assistant, "Hello"), (Role::User, "Plan Kyoto")]
        );
    }

    #[test]
    fn history_is_restartable() {
        let mut s = Session::new(10);
        for i in 0..4 {
            s.append_user_turn(format!("m{i}"));
        }
        let first: Vec<Turn> = s.history_as_context().cloned().collect();
        let second: Vec<Turn> = s.history_as_context().cloned().collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);

        let iter = s.history_as_context();
        let copy = iter.clone();
        assert_eq!(iter.count(), copy.count());
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let mut s = Session::new(3);
        for i in 0..5 {
            s.append_user_turn(format!("msg{i}"));
        }
        let texts: Vec<&str> = s.history_as_context().map(Turn::text).collect();
        assert_eq!(texts, vec!["msg2", "msg3", "msg4"]);
    }

    #[test]
    fn zero_cap_is_clamped() {
        let mut s = Session::new(0);
        s.append_user_turn("a");
        s.append_user_turn("b");
        assert_eq!(s.len(), 1);
        assert_eq!(s.history_as_context().next_back().map(Turn::text), Some("b"));
    }

    #[test]
    fn artifacts_are_last_write_wins() {
        let mut s = Session::new(10);
        assert_eq!(s.artifact(BUDGET_ARTIFACT), None);
        s.record_artifact(BUDGET_ARTIFACT, "table v1");
        s.record_artifact(BUDGET_ARTIFACT, "table v2");
        assert_eq!(s.artifact(BUDGET_ARTIFACT), Some("table v2"));
        assert_eq!(s.artifact(ITINERARY_ARTIFACT), None);
        assert_eq!(s.state(), SessionState::Empty);
    }

    #[test]
    fn role_labels() {
        assert_eq!(Role::User.title(), "User");
        assert_eq!(Role::Assistant.title(), "Assistant");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
