use crate::{error::ErrorCode, orchestrator::StepStatus, registry::Registry};
use serde::Serialize;
use std::{collections::{vec_deque, VecDeque}, sync::Arc};

/// The default number of steps kept in a [`TraceBuffer`].
pub const DEFAULT_TRACE_CAPACITY: usize = 32;

/// A summary of one step, kept for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    pub expression: String,
    pub status: StepStatus,
    pub candidate_id: Option<String>,
    pub error_code: Option<ErrorCode>,
}

/// A bounded buffer of the most recent [`TraceEntry`]s. When full, pushing drops the oldest
/// entry.
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    entries: VecDeque<TraceEntry>,
    capacity: usize,
}

impl TraceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: TraceEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates from the oldest entry to the newest.
    pub fn iter(&self) -> vec_deque::Iter<'_, TraceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_CAPACITY)
    }
}

/// The context every step runs in: the registry to match against, and a trace of recent steps.
///
/// The registry is shared and read-only; one context can be created per caller.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub registry: Arc<Registry>,
    pub trace: TraceBuffer,
}

impl StepContext {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            trace: TraceBuffer::default(),
        }
    }
}

impl Default for StepContext {
    /// A context using the built-in registry.
    fn default() -> Self {
        Self::new(Registry::builtin())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn entry(expression: &str) -> TraceEntry {
        TraceEntry {
            expression: expression.to_string(),
            status: StepStatus::StepApplied,
            candidate_id: None,
            error_code: None,
        }
    }

    #[test]
    fn bounded() {
        let mut trace = TraceBuffer::new(2);
        trace.push(entry("a"));
        trace.push(entry("b"));
        trace.push(entry("c"));
        let kept = trace.iter().map(|e| e.expression.as_str()).collect::<Vec<_>>();
        assert_eq!(kept, vec!["b", "c"]);

        trace.clear();
        assert!(trace.is_empty());
        assert_eq!(trace.capacity(), 2);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut trace = TraceBuffer::new(0);
        trace.push(entry("a"));
        assert!(trace.is_empty());
    }
}
