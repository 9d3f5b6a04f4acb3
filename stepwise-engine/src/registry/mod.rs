//! The invariant registry: an immutable catalogue of primitives and rule sets.
//!
//! A [`Registry`] is built once from a validated [`InvariantModel`] and never mutated. Every
//! accessor returns an owned copy, so callers cannot reach into the registry's storage, and one
//! registry can be shared freely across threads behind an [`Arc`].

pub mod error;
pub mod model;

pub use error::ValidationError;
pub use model::{
    InvariantModel,
    InvariantRuleDefinition,
    InvariantSetDefinition,
    Level,
    PrimitiveDefinition,
    RulePattern,
};

use crate::{error::{EngineError, ErrorCode}, matcher::Domain, primitive::PrimitiveKind};
use levenshtein::levenshtein;
use once_cell::sync::Lazy;
use std::{collections::BTreeMap, sync::Arc};

/// The model shipped with the engine.
const DEFAULT_MODEL: &str = include_str!("../../data/default_model.json");

static BUILTIN: Lazy<Arc<Registry>> = Lazy::new(|| {
    let model = InvariantModel::from_json(DEFAULT_MODEL)
        .expect("the embedded default model is valid");
    Arc::new(Registry::new(model))
});

/// A rule, together with the invariant set it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRule {
    pub set_id: String,
    pub rule: InvariantRuleDefinition,
}

/// A read-only catalogue of primitives and rule sets.
#[derive(Debug, Clone)]
pub struct Registry {
    model: InvariantModel,

    /// Index into `model.primitives` by id.
    primitives: BTreeMap<String, usize>,

    /// Index into `model.invariant_sets` by id.
    sets: BTreeMap<String, usize>,
}

impl Registry {
    /// Builds a registry from a validated model.
    pub fn new(model: InvariantModel) -> Self {
        let primitives = model.primitives
            .iter()
            .enumerate()
            .map(|(idx, primitive)| (primitive.id.clone(), idx))
            .collect();
        let sets = model.invariant_sets
            .iter()
            .enumerate()
            .map(|(idx, set)| (set.id.clone(), idx))
            .collect();
        Self { model, primitives, sets }
    }

    /// Parses, validates, and indexes a model from its JSON form.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        InvariantModel::from_json(text).map(Self::new)
    }

    /// Returns the registry built from the embedded default model.
    pub fn builtin() -> Arc<Registry> {
        Arc::clone(&BUILTIN)
    }

    /// Returns a copy of the whole model.
    pub fn model(&self) -> InvariantModel {
        self.model.clone()
    }

    /// Returns true if a primitive with the given id exists.
    pub fn has_primitive(&self, id: &str) -> bool {
        self.primitives.contains_key(id)
    }

    /// Returns the primitive with the given id.
    pub fn primitive(&self, id: &str) -> Option<PrimitiveDefinition> {
        self.primitives.get(id).map(|&idx| self.model.primitives[idx].clone())
    }

    /// Returns the invariant set with the given id.
    pub fn set(&self, id: &str) -> Option<InvariantSetDefinition> {
        self.sets.get(id).map(|&idx| self.model.invariant_sets[idx].clone())
    }

    /// Returns every invariant set, in registry order.
    pub fn sets(&self) -> Vec<InvariantSetDefinition> {
        self.model.invariant_sets.clone()
    }

    /// Returns the rule with the given id from the given set.
    pub fn rule(&self, set_id: &str, rule_id: &str) -> Option<InvariantRuleDefinition> {
        let &idx = self.sets.get(set_id)?;
        self.model.invariant_sets[idx]
            .rules
            .iter()
            .find(|rule| rule.id == rule_id)
            .cloned()
    }

    /// Returns the ids of every set whose id is similar to the given one.
    pub fn similar_set_ids(&self, id: &str) -> Vec<String> {
        self.model.invariant_sets
            .iter()
            .filter(|set| levenshtein(&set.id, id) < 3)
            .map(|set| set.id.clone())
            .collect()
    }

    /// Returns the rules of the given sets, in registry order. An empty list selects every set.
    ///
    /// Returns [`ErrorCode::UnknownInvariantSet`] if any id does not name a set.
    pub fn rules_for(&self, set_ids: &[String]) -> Result<Vec<ScopedRule>, EngineError> {
        if let Some(unknown) = set_ids.iter().find(|id| !self.sets.contains_key(id.as_str())) {
            let similar = self.similar_set_ids(unknown);
            let detail = if similar.is_empty() {
                format!("unknown invariant set `{}`", unknown)
            } else {
                format!("unknown invariant set `{}`, did you mean: {}", unknown, similar.join(", "))
            };
            return Err(EngineError::new(ErrorCode::UnknownInvariantSet, detail));
        }

        Ok(self.model.invariant_sets
            .iter()
            .filter(|set| set_ids.is_empty() || set_ids.contains(&set.id))
            .flat_map(|set| set.rules.iter().map(|rule| ScopedRule {
                set_id: set.id.clone(),
                rule: rule.clone(),
            }))
            .collect())
    }

    /// Returns the domain the rule applies to: the declared one, or else the natural domain of
    /// the first of its primitives that has one.
    pub fn effective_domain(&self, rule: &InvariantRuleDefinition) -> Option<Domain> {
        rule.domain.or_else(|| rule.primitive_ids
            .iter()
            .filter_map(|id| PrimitiveKind::from_id(id))
            .find_map(PrimitiveKind::domain))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn model_with(primitives: &str, sets: &str) -> String {
        format!(r#"{{ "primitives": [{}], "invariantSets": [{}] }}"#, primitives, sets)
    }

    const ADD: &str = r#"{ "id": "P.INT_ADD", "name": "Add", "description": "Add two integers" }"#;

    fn set_with(id: &str, rules: &str) -> String {
        format!(
            r#"{{ "id": "{}", "name": "Set", "description": "A set", "version": "1", "rules": [{}] }}"#,
            id,
            rules,
        )
    }

    fn rule_with(id: &str, level: &str, primitive: &str) -> String {
        format!(
            r#"{{ "id": "{}", "title": "Rule", "shortLabel": "R", "description": "A rule", "level": "{}", "primitiveIds": ["{}"] }}"#,
            id,
            level,
            primitive,
        )
    }

    #[test]
    fn builtin_model_is_valid() {
        let registry = Registry::builtin();
        assert!(!registry.sets().is_empty());
        for set in registry.sets() {
            for rule in &set.rules {
                for id in &rule.primitive_ids {
                    assert!(registry.has_primitive(id), "{} -> {}", rule.id, id);
                }
            }
        }
    }

    #[test]
    fn accepts_valid_model() {
        let json = model_with(ADD, &set_with("basics", &rule_with("R.ADD", "intro", "P.INT_ADD")));
        let registry = Registry::from_json(&json).unwrap();
        assert_eq!(registry.primitive("P.INT_ADD").unwrap().name, "Add");
        assert_eq!(registry.rule("basics", "R.ADD").unwrap().level, Level::Intro);
        assert_eq!(registry.effective_domain(&registry.rule("basics", "R.ADD").unwrap()), Some(Domain::Integers));
        assert!(registry.rule("basics", "R.NOPE").is_none());
    }

    #[test]
    fn rejects_malformed_shapes() {
        let err = Registry::from_json(r#"{ "primitives": {}, "invariantSets": [] }"#).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));

        let err = Registry::from_json(r#"{ "primitives": [{ "id": 3, "name": "x", "description": "y" }], "invariantSets": [] }"#).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn rejects_empty_fields() {
        let json = model_with(r#"{ "id": "P.X", "name": "", "description": "d" }"#, "");
        let err = Registry::from_json(&json).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { field: "name", .. }));

        let set = r#"{ "id": "s", "name": "Set", "description": " ", "version": "1", "rules": [] }"#;
        let err = Registry::from_json(&model_with(ADD, set)).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { field: "description", .. }));
    }

    #[test]
    fn rejects_duplicates() {
        let json = model_with(&format!("{},{}", ADD, ADD), "");
        assert!(matches!(Registry::from_json(&json).unwrap_err(), ValidationError::DuplicatePrimitive(id) if id == "P.INT_ADD"));

        let rules = format!("{},{}", rule_with("R.A", "core", "P.INT_ADD"), rule_with("R.A", "core", "P.INT_ADD"));
        let json = model_with(ADD, &set_with("s", &rules));
        assert!(matches!(Registry::from_json(&json).unwrap_err(), ValidationError::DuplicateRule { .. }));

        let sets = format!("{},{}", set_with("s", ""), set_with("s", ""));
        let json = model_with(ADD, &sets);
        assert!(matches!(Registry::from_json(&json).unwrap_err(), ValidationError::DuplicateSet(id) if id == "s"));
    }

    #[test]
    fn same_rule_id_in_different_sets_is_fine() {
        let rule = rule_with("R.A", "core", "P.INT_ADD");
        let sets = format!("{},{}", set_with("s1", &rule), set_with("s2", &rule));
        assert!(Registry::from_json(&model_with(ADD, &sets)).is_ok());
    }

    #[test]
    fn rejects_bad_level_and_references() {
        let json = model_with(ADD, &set_with("s", &rule_with("R.A", "expert", "P.INT_ADD")));
        assert!(matches!(Registry::from_json(&json).unwrap_err(), ValidationError::InvalidLevel { level, .. } if level == "expert"));

        let json = model_with(ADD, &set_with("s", &rule_with("R.A", "core", "P.MISSING")));
        assert!(matches!(
            Registry::from_json(&json).unwrap_err(),
            ValidationError::UnknownPrimitiveRef { primitive_id, .. } if primitive_id == "P.MISSING"
        ));
    }

    #[test]
    fn rejects_unparseable_templates() {
        let json = model_with(
            r#"{ "id": "P.G", "name": "g", "description": "d", "pattern": "x +", "resultPattern": "x" }"#,
            "",
        );
        assert!(matches!(Registry::from_json(&json).unwrap_err(), ValidationError::InvalidPattern { field: "pattern", .. }));

        let json = model_with(
            r#"{ "id": "P.G", "name": "g", "description": "d", "pattern": "a + b", "resultPattern": "calc(a ^ b)" }"#,
            "",
        );
        assert!(matches!(Registry::from_json(&json).unwrap_err(), ValidationError::InvalidPattern { field: "resultPattern", .. }));
    }

    #[test]
    fn rules_for_unknown_set_suggests() {
        let registry = Registry::builtin();
        let err = registry.rules_for(&["fraction-basic".to_string()]).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownInvariantSet);
        assert!(err.detail.contains("did you mean"));
        assert!(err.detail.contains("fractions-basics"));
    }

    #[test]
    fn rules_for_keeps_registry_order() {
        let registry = Registry::builtin();
        let all = registry.rules_for(&[]).unwrap();
        let reversed = registry.rules_for(&["fractions-basics".to_string(), "arithmetic-basics".to_string()]).unwrap();
        assert_eq!(all[0].set_id, "arithmetic-basics");
        assert_eq!(reversed[0].set_id, "arithmetic-basics");
    }
}
