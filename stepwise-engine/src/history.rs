//! Step history: the append-only record of steps taken in one session.
//!
//! The history is owned by the caller. The engine receives a snapshot, returns an updated one,
//! and never keeps a reference across calls. Persisting it is the job of a [`HistoryStore`].

use chrono::{DateTime, Utc};
use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One attempted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEntry {
    pub expression_before: String,

    /// The expression after the step. Empty while the step is pending, and when it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_after: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive_id: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl StepEntry {
    /// A step that has been decided on, but not executed yet.
    pub fn pending(expression_before: impl Into<String>, primitive_id: Option<String>) -> Self {
        Self {
            expression_before: expression_before.into(),
            expression_after: None,
            error_code: None,
            primitive_id,
            timestamp: Utc::now(),
        }
    }

    /// Returns true if the step has neither a result nor an error yet.
    pub fn is_pending(&self) -> bool {
        self.expression_after.is_none() && self.error_code.is_none()
    }
}

/// The ordered sequence of steps of one session.
///
/// It only changes by appending an entry, by filling in the result of the last entry, or by
/// dropping the last entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepHistory {
    entries: Vec<StepEntry>,
}

impl StepHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[StepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&StepEntry> {
        self.entries.last()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: StepEntry) {
        self.entries.push(entry);
    }

    /// Fills in the outcome of the last entry. Returns false if the history is empty.
    pub fn set_last_result(&mut self, expression_after: Option<String>, error_code: Option<ErrorCode>) -> bool {
        match self.entries.last_mut() {
            Some(entry) => {
                entry.expression_after = expression_after;
                entry.error_code = error_code;
                true
            },
            None => false,
        }
    }

    /// Removes and returns the last entry.
    pub fn truncate_last(&mut self) -> Option<StepEntry> {
        self.entries.pop()
    }
}

impl From<Vec<StepEntry>> for StepHistory {
    fn from(entries: Vec<StepEntry>) -> Self {
        Self { entries }
    }
}

/// Returns a copy of `history` without its last step.
pub fn remove_last_step(history: &StepHistory) -> StepHistory {
    let mut history = history.clone();
    history.truncate_last();
    history
}

/// Storage for the histories of many sessions.
pub trait HistoryStore {
    /// Returns the history of a session, empty if the session is unknown.
    fn get_history(&self, session_key: &str) -> StepHistory;

    /// Replaces the history of a session.
    fn update_history(&mut self, session_key: &str, history: StepHistory);
}

/// A [`HistoryStore`] that keeps every history in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    sessions: BTreeMap<String, StepHistory>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn get_history(&self, session_key: &str) -> StepHistory {
        self.sessions.get(session_key).cloned().unwrap_or_default()
    }

    fn update_history(&mut self, session_key: &str, history: StepHistory) {
        self.sessions.insert(session_key.to_string(), history);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn pending_then_result() {
        let mut history = StepHistory::new();
        assert!(!history.set_last_result(Some("3".into()), None));

        history.push(StepEntry::pending("1 + 2", Some("P.INT_ADD".into())));
        assert!(history.last().unwrap().is_pending());

        assert!(history.set_last_result(Some("3".into()), None));
        let last = history.last().unwrap();
        assert_eq!(last.expression_after.as_deref(), Some("3"));
        assert!(!last.is_pending());
    }

    #[test]
    fn remove_last_leaves_original() {
        let mut history = StepHistory::new();
        history.push(StepEntry::pending("1 + 2", None));
        history.push(StepEntry::pending("3", None));

        let shorter = remove_last_step(&history);
        assert_eq!(shorter.len(), 1);
        assert_eq!(history.len(), 2);
        assert_eq!(remove_last_step(&StepHistory::new()), StepHistory::new());
    }

    #[test]
    fn serializes_as_array() {
        let mut history = StepHistory::new();
        history.push(StepEntry::pending("4 : 0", Some("P.INT_DIV_EXACT".into())));
        history.set_last_result(None, Some(ErrorCode::DivisionByZero));

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json[0]["expressionBefore"], "4 : 0");
        assert_eq!(json[0]["errorCode"], "division-by-zero");
        assert!(json[0].get("expressionAfter").is_none());

        let back: StepHistory = serde_json::from_value(json).unwrap();
        assert_eq!(back, history);
    }

    #[test]
    fn memory_store() {
        let mut store = MemoryHistoryStore::new();
        assert!(store.get_history("a").is_empty());

        let mut history = StepHistory::new();
        history.push(StepEntry::pending("1 + 2", None));
        store.update_history("a", history.clone());
        assert_eq!(store.get_history("a"), history);
        assert!(store.get_history("b").is_empty());
    }
}
