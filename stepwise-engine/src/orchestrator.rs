//! Sequencing of one step: parse, anchor, window, match, generate, filter, decide, execute.
//!
//! The orchestrator holds no state of its own. History comes in as a snapshot and goes back out
//! updated; the registry and trace buffer live in the [`StepContext`].

use crate::{
    candidate::{self, Candidate},
    ctxt::{StepContext, TraceEntry},
    decision::{self, Decision, DecisionState, MatchMode, Policy},
    error::{EngineError, ErrorCode},
    execute::execute,
    history::{remove_last_step, HistoryStore, StepHistory},
    matcher::match_rules,
    selection::{normalize, Selection},
    window::resolve,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use stepwise_parser::{parse, tree::Node};
use tracing::{debug, info, warn};

/// A request to take one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    pub expression_text: String,

    /// Carried as the top-level `selectionPath` and `operatorOrdinal` fields.
    #[serde(default, flatten)]
    pub selection: Selection,

    /// The invariant sets to match against. Empty selects every set.
    #[serde(default)]
    pub invariant_set_ids: Vec<String>,

    #[serde(default)]
    pub policy: Policy,

    /// Executes this exact candidate instead of letting the decision pick one.
    #[serde(default)]
    pub candidate_id: Option<String>,
}

impl StepRequest {
    /// A request for the given expression, with no selection, every set, and the student
    /// policy.
    pub fn new(expression_text: impl Into<String>) -> Self {
        Self {
            expression_text: expression_text.into(),
            ..Default::default()
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_sets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invariant_set_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_candidate(mut self, id: impl Into<String>) -> Self {
        self.candidate_id = Some(id.into());
        self
    }
}

/// The overall outcome of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    StepApplied,
    NoCandidates,
    Blocked,
    EngineError,
}

/// The response to a [`StepRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub status: StepStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_expression_text: Option<String>,

    /// The executed candidate, or the first blocked one when the status is
    /// [`StepStatus::Blocked`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_candidate: Option<Candidate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<MatchMode>,

    /// The candidates disclosed under the request's policy.
    pub candidates: Vec<Candidate>,

    /// Every candidate that survived filtering; only present under a debug policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_candidates: Option<Vec<Candidate>>,
}

impl StepResponse {
    fn error(err: EngineError) -> Self {
        Self {
            status: StepStatus::EngineError,
            new_expression_text: None,
            chosen_candidate: None,
            error_code: Some(err.code),
            message: Some(err.detail),
            mode: None,
            candidates: Vec::new(),
            all_candidates: None,
        }
    }

    fn from_decision(decision: Decision, all: Vec<Candidate>, policy: &Policy) -> Self {
        let (status, error_code, chosen) = match decision.state {
            DecisionState::NoCandidates => (StepStatus::NoCandidates, Some(ErrorCode::NoPrimitiveForShape), None),
            DecisionState::Blocked => (
                StepStatus::Blocked,
                Some(ErrorCode::BlockedByReadinessCheck),
                decision.first_blocked().cloned(),
            ),
            DecisionState::Chosen => (StepStatus::StepApplied, None, decision.chosen),
        };

        let message = match chosen.as_ref().map(|c| &c.readiness) {
            Some(candidate::Readiness::Blocked { reason }) => Some(reason.clone()),
            _ => None,
        };

        Self {
            status,
            new_expression_text: None,
            chosen_candidate: chosen,
            error_code,
            message,
            mode: Some(decision.mode),
            candidates: decision.visible,
            all_candidates: policy.debug.then_some(all),
        }
    }
}

/// A [`StepResponse`] along with the updated history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub response: StepResponse,
    pub history: StepHistory,
}

/// Parses the expression and produces the filtered candidates for the request's selection.
///
/// When nothing is selected and the root is not an operation, there are no candidates.
pub fn candidates_for(ctx: &StepContext, request: &StepRequest) -> Result<(Node, Vec<Candidate>), EngineError> {
    let root = parse(&request.expression_text)
        .map_err(|err| EngineError::new(ErrorCode::ParseError, format!("{:?}", err.kind)))?;
    let rules = ctx.registry.rules_for(&request.invariant_set_ids)?;

    let Some(anchor) = normalize(&root, &request.selection) else {
        if request.selection.is_explicit() {
            return Err(EngineError::new(ErrorCode::InvalidSelection, "the selection does not resolve to a node"));
        }
        debug!("nothing selected and the root is not an operation");
        return Ok((root, Vec::new()));
    };
    let window = resolve(&root, &anchor)
        .ok_or_else(|| EngineError::new(ErrorCode::InvalidSelection, "the selection has no window"))?;

    let matched = match_rules(&ctx.registry, &window, &rules);
    let generated = candidate::generate(&ctx.registry, &root, &anchor, &window, &matched);
    let local = candidate::filter_locality(generated, &window);
    let anchored = candidate::filter_anchoring(local, &anchor, &window);
    Ok((root, anchored))
}

/// Takes one step.
pub fn step(ctx: &mut StepContext, request: &StepRequest, history: StepHistory) -> StepOutcome {
    let outcome = run_step(ctx, request, history);
    let response = &outcome.response;

    info!(
        expression = %request.expression_text,
        status = ?response.status,
        error_code = response.error_code.map(|code| code.as_str()),
        "step",
    );
    ctx.trace.push(TraceEntry {
        expression: request.expression_text.clone(),
        status: response.status,
        candidate_id: response.chosen_candidate.as_ref().map(|c| c.id.clone()),
        error_code: response.error_code,
    });
    outcome
}

fn run_step(ctx: &StepContext, request: &StepRequest, mut history: StepHistory) -> StepOutcome {
    let (root, candidates) = match candidates_for(ctx, request) {
        Ok(found) => found,
        Err(err) => return StepOutcome { response: StepResponse::error(err), history },
    };

    let decision = match &request.candidate_id {
        Some(id) => {
            let Some(requested) = candidates.iter().find(|c| &c.id == id) else {
                let err = EngineError::new(
                    ErrorCode::ChosenCandidateNotFound,
                    format!("no candidate `{}` for this selection", id),
                );
                return StepOutcome { response: StepResponse::error(err), history };
            };
            decision::decide(std::slice::from_ref(requested), &history, &request.policy)
        },
        None => decision::decide(&candidates, &history, &request.policy),
    };

    let Some(chosen) = decision.chosen.clone() else {
        let response = StepResponse::from_decision(decision, candidates, &request.policy);
        return StepOutcome { response, history };
    };

    decision::record(&decision, &mut history, &request.expression_text);
    let mut response = StepResponse::from_decision(decision, candidates, &request.policy);

    match execute(&ctx.registry, &root, &chosen) {
        Ok(node) => {
            let text = node.to_string();
            history.set_last_result(Some(text.clone()), None);
            response.new_expression_text = Some(text);
        },
        Err(err) => {
            warn!(candidate = %chosen.id, %err, "chosen candidate failed");
            history.set_last_result(None, Some(err.code));
            response.status = StepStatus::EngineError;
            response.error_code = Some(err.code);
            response.message = Some(err.detail);
        },
    }

    StepOutcome { response, history }
}

/// Takes one step within a session, loading and storing its history through `store`.
pub fn step_session<S: HistoryStore>(
    ctx: &mut StepContext,
    store: &mut S,
    session_key: &str,
    request: &StepRequest,
) -> StepResponse {
    let history = store.get_history(session_key);
    let StepOutcome { response, history } = step(ctx, request, history);
    store.update_history(session_key, history);
    response
}

/// Undoes the last step, returning the shortened history and the expression before that step.
pub fn undo(history: &StepHistory) -> (StepHistory, Option<String>) {
    let before = history.last().map(|entry| entry.expression_before.clone());
    (remove_last_step(history), before)
}

/// The status of a [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationStatus {
    Ok,
    None,
    Error,
}

/// Which single primitive, if any, applies to a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub status: ClassificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitive_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl Classification {
    fn error(code: ErrorCode) -> Self {
        Self { status: ClassificationStatus::Error, primitive_id: None, error_code: Some(code) }
    }
}

/// Classifies the selection without executing anything: `ok` if exactly one primitive applies,
/// `none` if none does, and `error` if several distinct primitives do.
pub fn classify(ctx: &StepContext, request: &StepRequest) -> Classification {
    let candidates = match candidates_for(ctx, request) {
        Ok((_, candidates)) => candidates,
        Err(err) => return Classification::error(err.code),
    };

    let primitives = candidates
        .iter()
        .map(Candidate::primitive_id)
        .collect::<BTreeSet<_>>();

    let classification = match primitives.len() {
        0 => Classification {
            status: ClassificationStatus::None,
            primitive_id: None,
            error_code: Some(ErrorCode::NoPrimitiveForShape),
        },
        1 => Classification {
            status: ClassificationStatus::Ok,
            primitive_id: primitives.first().map(|id| id.to_string()),
            error_code: None,
        },
        _ => Classification::error(ErrorCode::MultiplePrimitiveCandidates),
    };
    debug!(?classification, "classified");
    classification
}
