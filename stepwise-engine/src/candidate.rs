//! Candidate generation: turning matched rules into concrete, executable proposals, then
//! narrowing them to the user's selection.

use crate::{
    pattern::{calc::Condition, Bindings, Template},
    primitive::{PrimitiveKind, Scope},
    registry::{PrimitiveDefinition, Registry, ScopedRule},
    selection::{Anchor, AnchorKind},
    window::Window,
};
use serde::Serialize;
use std::borrow::Cow;
use stepwise_parser::tree::{Node, Path, Segment};
use tracing::{debug, trace, warn};

/// Whether a candidate can be executed now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Readiness {
    Ready,
    Blocked {
        reason: String,
    },
}

impl Readiness {
    /// A blocked readiness with the given reason.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked { reason: reason.into() }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_blocked(&self) -> bool {
        !self.is_ready()
    }
}

/// One executable proposal: a rule, a primitive, and the node it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Stable id of the form `rule:primitive@path`.
    pub id: String,
    pub invariant_rule_id: String,
    pub invariant_set_id: String,
    pub primitive_ids: Vec<String>,
    pub target_path: Path,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Bindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_pattern: Option<String>,
    pub readiness: Readiness,
}

impl Candidate {
    fn new(scoped: &ScopedRule, primitive: &PrimitiveDefinition, target_path: Path, readiness: Readiness) -> Self {
        Self {
            id: format!("{}:{}@{}", scoped.rule.id, primitive.id, target_path),
            invariant_rule_id: scoped.rule.id.clone(),
            invariant_set_id: scoped.set_id.clone(),
            primitive_ids: vec![primitive.id.clone()],
            target_path,
            description: primitive.description.clone(),
            bindings: None,
            result_pattern: primitive.result_pattern.clone(),
            readiness,
        }
    }

    /// Returns the id of the primitive this candidate executes.
    pub fn primitive_id(&self) -> &str {
        self.primitive_ids.first().map_or("", String::as_str)
    }

    /// Returns the scope of the candidate's primitive, if it has a typed handler.
    fn scope(&self) -> Option<Scope> {
        PrimitiveKind::from_id(self.primitive_id()).map(PrimitiveKind::scope)
    }
}

/// Returns the target paths of an operand-scoped primitive: the anchor if it is a direct operand
/// of the window, otherwise both operands, left first.
fn operand_targets(anchor: &Anchor, window: &Window) -> Vec<(Path, Segment)> {
    if anchor.path.parent().as_ref() == Some(&window.path) {
        if let Some(side @ (Segment::Left | Segment::Right)) = anchor.path.last() {
            return vec![(anchor.path.clone(), side)];
        }
    }

    if window.node.is_operator() {
        [Segment::Left, Segment::Right]
            .into_iter()
            .map(|side| (window.path.child(side), side))
            .collect()
    } else {
        Vec::new()
    }
}

/// Generates the candidates of a primitive with a typed handler.
fn typed_candidates(
    kind: PrimitiveKind,
    scoped: &ScopedRule,
    primitive: &PrimitiveDefinition,
    root: &Node,
    anchor: &Anchor,
    window: &Window,
) -> Vec<Candidate> {
    let targets: Vec<(Path, Option<Segment>)> = match kind.scope() {
        Scope::Window => vec![(window.path.clone(), None)],
        Scope::Operand => operand_targets(anchor, window)
            .into_iter()
            .map(|(path, side)| (path, Some(side)))
            .collect(),
        // a numerator or denominator slot only ever holds an integer
        Scope::Node if matches!(anchor.path.last(), Some(Segment::Num | Segment::Den)) => Vec::new(),
        Scope::Node => vec![(anchor.path.clone(), None)],
    };

    targets
        .into_iter()
        .filter_map(|(path, side)| {
            let target = root.get(&path)?;
            if !kind.applies(&window.node, &target, side) {
                trace!(primitive = kind.id(), target = %path, "does not apply");
                return None;
            }
            let readiness = kind.readiness(&window.node, &target, side);
            Some(Candidate::new(scoped, primitive, path, readiness))
        })
        .collect()
}

/// Generates the candidate of a primitive executed by pattern substitution. The template is
/// matched against the window first, then against the anchor.
fn generic_candidates(
    scoped: &ScopedRule,
    primitive: &PrimitiveDefinition,
    pattern: &str,
    root: &Node,
    anchor: &Anchor,
    window: &Window,
) -> Vec<Candidate> {
    let template = match Template::parse(pattern) {
        Ok(template) => template,
        Err(err) => {
            warn!(primitive = %primitive.id, ?err, "unparseable pattern");
            return Vec::new();
        },
    };

    let mut sites = vec![(window.path.clone(), Cow::Borrowed(&window.node))];
    if anchor.path != window.path {
        if let Some(node) = root.get(&anchor.path) {
            sites.push((anchor.path.clone(), node));
        }
    }

    sites
        .into_iter()
        .find_map(|(path, node)| template.matches(&node).map(|bindings| (path, bindings)))
        .map(|(path, bindings)| {
            let readiness = match &primitive.condition {
                Some(condition) => condition_readiness(condition, &bindings),
                None => Readiness::Ready,
            };
            let mut candidate = Candidate::new(scoped, primitive, path, readiness);
            candidate.bindings = Some(bindings);
            candidate
        })
        .into_iter()
        .collect()
}

fn condition_readiness(condition: &str, bindings: &Bindings) -> Readiness {
    match Condition::parse(condition).and_then(|condition| condition.eval(bindings)) {
        Ok(true) => Readiness::Ready,
        Ok(false) => Readiness::blocked(format!("condition `{}` does not hold", condition)),
        Err(err) => Readiness::blocked(format!("condition `{}` cannot be evaluated: {:?}", condition, err.kind)),
    }
}

/// Turns every matched rule into candidates, in rule order and then primitive order.
pub fn generate(
    registry: &Registry,
    root: &Node,
    anchor: &Anchor,
    window: &Window,
    rules: &[ScopedRule],
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for scoped in rules {
        for primitive_id in &scoped.rule.primitive_ids {
            let Some(primitive) = registry.primitive(primitive_id) else {
                // validation rules this out; keep going rather than fail the whole step
                warn!(rule = %scoped.rule.id, %primitive_id, "rule refers to a missing primitive");
                continue;
            };

            if let Some(kind) = PrimitiveKind::from_id(&primitive.id) {
                candidates.extend(typed_candidates(kind, scoped, &primitive, root, anchor, window));
            } else if let Some(pattern) = &primitive.pattern {
                candidates.extend(generic_candidates(scoped, &primitive, pattern, root, anchor, window));
            } else {
                // no handler and no template; execution reports it as unknown
                candidates.push(Candidate::new(scoped, &primitive, window.path.clone(), Readiness::Ready));
            }
        }
    }

    debug!(count = candidates.len(), "generated candidates");
    candidates
}

/// Discards every candidate whose target lies outside the window.
pub fn filter_locality(candidates: Vec<Candidate>, window: &Window) -> Vec<Candidate> {
    let kept = candidates
        .into_iter()
        .filter(|candidate| candidate.target_path.starts_with(&window.path))
        .collect::<Vec<_>>();
    debug!(count = kept.len(), "after locality filter");
    kept
}

/// If the anchor was pinned by the caller, keeps only candidates that act on exactly that node.
///
/// For an operator anchor, that is the operator itself, or one of its operands for
/// operand-scoped primitives. For an operand anchor, that is the operand itself, or the window
/// operation it belongs to.
pub fn filter_anchoring(candidates: Vec<Candidate>, anchor: &Anchor, window: &Window) -> Vec<Candidate> {
    if !anchor.pinned {
        return candidates;
    }

    let kept = candidates
        .into_iter()
        .filter(|candidate| {
            let target = &candidate.target_path;
            if *target == anchor.path {
                return true;
            }
            match anchor.kind {
                AnchorKind::Operator => candidate.scope() == Some(Scope::Operand)
                    && target.parent().as_ref() == Some(&anchor.path),
                AnchorKind::Operand => *target == window.path,
            }
        })
        .collect::<Vec<_>>();
    debug!(count = kept.len(), "after anchoring filter");
    kept
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_parser::parse;
    use crate::{matcher::match_rules, selection::{normalize, Selection}, window::resolve};
    use super::*;

    fn candidates(text: &str, selection: Selection) -> Vec<Candidate> {
        let registry = Registry::builtin();
        let root = parse(text).unwrap();
        let anchor = normalize(&root, &selection).unwrap();
        let window = resolve(&root, &anchor).unwrap();
        let rules = match_rules(&registry, &window, &registry.rules_for(&[]).unwrap());
        let all = generate(&registry, &root, &anchor, &window, &rules);
        let local = filter_locality(all, &window);
        filter_anchoring(local, &anchor, &window)
    }

    fn ids(candidates: &[Candidate]) -> Vec<String> {
        candidates.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn integer_window() {
        let found = candidates("1 + 2", Selection::default());
        assert_eq!(ids(&found), vec!["R.INT_ADD:P.INT_ADD@root"]);
        assert_eq!(found[0].invariant_set_id, "arithmetic-basics");
        assert!(found[0].readiness.is_ready());
    }

    #[test]
    fn operand_anchor_targets_only_that_operand() {
        let found = candidates("3/1 + 2/5", Selection::path("term[0]"));
        assert!(found.iter().any(|c| c.id == "R.FRAC_EQUIV:P.FRAC_EQUIV@term[0]"));
        assert!(found.iter().all(|c| c.target_path.to_string() != "term[1]"));
    }

    #[test]
    fn unpinned_operator_targets_both_operands() {
        let found = candidates("1/2 + 1/3", Selection::default());
        assert_eq!(ids(&found), vec![
            "R.FRAC_EQUIV:P.FRAC_EQUIV@term[0]",
            "R.FRAC_EQUIV:P.FRAC_EQUIV@term[1]",
        ]);
    }

    #[test]
    fn blocked_candidates_are_kept() {
        let found = candidates("3/1 + 2/5", Selection::default());
        let right = found.iter().find(|c| c.id == "R.FRAC_EQUIV:P.FRAC_EQUIV@term[1]").unwrap();
        assert!(right.readiness.is_blocked());
    }

    #[test]
    fn generic_pattern_binds() {
        let found = candidates("(1 + 2) + 0", Selection::default());
        let add_zero = found.iter().find(|c| c.primitive_id() == "P.ADD_ZERO").unwrap();
        assert_eq!(add_zero.target_path, Path::root());
        assert_eq!(add_zero.bindings.as_ref().unwrap()["x"], parse("1 + 2").unwrap());
    }

    #[test]
    fn generic_condition_blocks() {
        let found = candidates("0 + 0", Selection::default());
        let double = found.iter().find(|c| c.primitive_id() == "P.DOUBLE").unwrap();
        assert!(double.readiness.is_blocked());
    }

    #[test]
    fn locality() {
        // selecting inside the left group never reaches into the right group or the root
        let corpus = [
            ("(1 + 2) * (3 + 4)", "term[0].term[0]"),
            ("(1 + 2) * (3 + 4)", "term[0]"),
            ("(1/2 + 1/3) : (2/5 - 1/5)", "term[0].term[1]"),
            ("(1/2 * 3/4) + (5 - 2)", "term[0].term[0]"),
            ("(2 + 1/3) - (4 : 2)", "term[0].term[0]"),
        ];

        for (text, path) in corpus {
            for candidate in candidates(text, Selection::path(path)) {
                assert!(
                    candidate.target_path.starts_with(&"term[0]".parse().unwrap()),
                    "{} selecting {} produced {}",
                    text,
                    path,
                    candidate.id,
                );
            }
        }
    }

    #[test]
    fn determinism() {
        let corpus = [
            ("1/2 + 1/3", Selection::default()),
            ("3/1 + 2/5", Selection::path("term[0]")),
            ("(1 + 2) * (3 + 4)", Selection::operator(1)),
            ("2 1/3 + 1", Selection::path("term[0]")),
        ];

        for (text, selection) in corpus {
            let first = serde_json::to_string(&candidates(text, selection.clone())).unwrap();
            let second = serde_json::to_string(&candidates(text, selection)).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn fraction_slots_take_no_node_rewrites() {
        for path in ["term[0].num", "term[0].den"] {
            assert_eq!(ids(&candidates("1/2 + 3", Selection::path(path))), Vec::<String>::new());
        }
    }

    #[test]
    fn pinned_operator_drops_unrelated_targets() {
        // pinning the inner multiplication must not fall back to the outer addition
        let found = candidates("1 + 2 * 3", Selection::path("term[1]"));
        assert_eq!(ids(&found), vec!["R.INT_MUL:P.INT_MUL@term[1]"]);
    }
}
