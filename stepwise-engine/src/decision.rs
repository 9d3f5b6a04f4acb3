//! Choosing at most one candidate to execute.
//!
//! The executed candidate is always the first ready one in generation order. A [`Policy`] only
//! controls how many candidates are disclosed to the caller.

use crate::{
    candidate::Candidate,
    history::{StepEntry, StepHistory},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Caller-supplied settings for how much of the decision is disclosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,

    /// The maximum number of candidates returned to the caller.
    pub max_candidates_to_show: usize,

    /// If true, the response also carries every candidate that survived filtering.
    #[serde(default)]
    pub debug: bool,
}

impl Policy {
    /// Exposes only the candidate that was applied.
    pub fn student() -> Self {
        Self {
            id: "student".to_string(),
            max_candidates_to_show: 1,
            debug: false,
        }
    }

    /// Exposes every candidate.
    pub fn teacher_debug() -> Self {
        Self {
            id: "teacher-debug".to_string(),
            max_candidates_to_show: usize::MAX,
            debug: true,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::student()
    }
}

/// The outcome state of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionState {
    /// No candidate survived filtering.
    NoCandidates,

    /// A ready candidate was chosen.
    Chosen,

    /// Candidates exist, but none of them is ready.
    Blocked,
}

/// How confidently the decision can be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Exactly one ready candidate.
    Apply,

    /// Several ready candidates; the first one is applied, but the user may want to pick.
    AskUser,

    /// Nothing can be applied; the candidates only explain why.
    Diagnostic,
}

/// The result of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub state: DecisionState,
    pub mode: MatchMode,

    /// The candidate to execute, when `state` is [`DecisionState::Chosen`].
    pub chosen: Option<Candidate>,

    /// The candidates disclosed to the caller: the chosen (or first blocked) candidate first,
    /// then the rest in generation order, up to the policy limit.
    pub visible: Vec<Candidate>,
}

impl Decision {
    /// Returns the first blocked candidate, when nothing could be chosen.
    pub fn first_blocked(&self) -> Option<&Candidate> {
        match self.state {
            DecisionState::Blocked => self.visible.first(),
            _ => None,
        }
    }
}

/// Chooses among the filtered candidates.
pub fn decide(candidates: &[Candidate], history: &StepHistory, policy: &Policy) -> Decision {
    let ready = candidates.iter().filter(|c| c.readiness.is_ready()).count();
    let lead = candidates
        .iter()
        .position(|c| c.readiness.is_ready())
        .or_else(|| (!candidates.is_empty()).then_some(0));

    let (state, mode) = match (candidates.is_empty(), ready) {
        (true, _) => (DecisionState::NoCandidates, MatchMode::Diagnostic),
        (false, 0) => (DecisionState::Blocked, MatchMode::Diagnostic),
        (false, 1) => (DecisionState::Chosen, MatchMode::Apply),
        (false, _) => (DecisionState::Chosen, MatchMode::AskUser),
    };

    let visible = lead
        .into_iter()
        .chain((0..candidates.len()).filter(|&i| Some(i) != lead))
        .take(policy.max_candidates_to_show)
        .map(|i| candidates[i].clone())
        .collect();

    let chosen = match state {
        DecisionState::Chosen => lead.map(|i| candidates[i].clone()),
        _ => None,
    };

    debug!(
        policy = %policy.id,
        history = history.len(),
        ?state,
        ?mode,
        chosen = chosen.as_ref().map(|c| c.id.as_str()),
        "decided",
    );
    Decision { state, mode, chosen, visible }
}

/// Records a chosen decision as a pending history entry. Other decisions leave the history
/// untouched.
pub fn record(decision: &Decision, history: &mut StepHistory, expression_before: &str) {
    if let Some(chosen) = &decision.chosen {
        history.push(StepEntry::pending(expression_before, Some(chosen.primitive_id().to_string())));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_parser::tree::Path;
    use crate::candidate::Readiness;
    use super::*;

    fn candidate(id: &str, readiness: Readiness) -> Candidate {
        Candidate {
            id: id.to_string(),
            invariant_rule_id: "R.TEST".to_string(),
            invariant_set_id: "test".to_string(),
            primitive_ids: vec![format!("P.{}", id)],
            target_path: Path::root(),
            description: String::new(),
            bindings: None,
            result_pattern: None,
            readiness,
        }
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn nothing_to_choose() {
        let decision = decide(&[], &StepHistory::new(), &Policy::student());
        assert_eq!(decision.state, DecisionState::NoCandidates);
        assert_eq!(decision.mode, MatchMode::Diagnostic);
        assert!(decision.chosen.is_none());
        assert!(decision.visible.is_empty());
    }

    #[test]
    fn first_ready_wins() {
        let candidates = [
            candidate("a", Readiness::blocked("no")),
            candidate("b", Readiness::Ready),
            candidate("c", Readiness::Ready),
        ];
        let decision = decide(&candidates, &StepHistory::new(), &Policy::student());
        assert_eq!(decision.state, DecisionState::Chosen);
        assert_eq!(decision.mode, MatchMode::AskUser);
        assert_eq!(decision.chosen.unwrap().id, "b");
        assert_eq!(ids(&decision.visible), vec!["b"]);
    }

    #[test]
    fn debug_policy_shows_everything() {
        let candidates = [
            candidate("a", Readiness::blocked("no")),
            candidate("b", Readiness::Ready),
        ];
        let decision = decide(&candidates, &StepHistory::new(), &Policy::teacher_debug());
        assert_eq!(decision.mode, MatchMode::Apply);
        assert_eq!(ids(&decision.visible), vec!["b", "a"]);
    }

    #[test]
    fn all_blocked() {
        let candidates = [candidate("a", Readiness::blocked("no")), candidate("b", Readiness::blocked("no"))];
        let decision = decide(&candidates, &StepHistory::new(), &Policy::student());
        assert_eq!(decision.state, DecisionState::Blocked);
        assert_eq!(decision.first_blocked().unwrap().id, "a");
        assert!(decision.chosen.is_none());
    }

    #[test]
    fn record_only_chosen() {
        let mut history = StepHistory::new();
        let blocked = decide(&[candidate("a", Readiness::blocked("no"))], &history, &Policy::student());
        record(&blocked, &mut history, "1 + 2");
        assert!(history.is_empty());

        let chosen = decide(&[candidate("a", Readiness::Ready)], &history, &Policy::student());
        record(&chosen, &mut history, "1 + 2");
        let entry = history.last().unwrap();
        assert_eq!(entry.expression_before, "1 + 2");
        assert_eq!(entry.primitive_id.as_deref(), Some("P.a"));
        assert!(entry.is_pending());
    }
}
