//! The invariant model: primitives, rules, and the sets that bundle rules into courses.
//!
//! The JSON document is first deserialized into raw definitions, then [`validate`]d into an
//! [`InvariantModel`]. Nothing downstream ever sees an unvalidated model.

use crate::{matcher::Domain, pattern::{calc, describe, Template}};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use stepwise_parser::parser::token::op::BinOpKind;
use super::error::ValidationError;

/// An atomic, executable arithmetic transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,

    /// Template the target must match for generic substitution, such as `x + 0`.
    #[serde(default)]
    pub pattern: Option<String>,

    /// Template the target is replaced with, such as `x`, or `calc(a + b)`.
    #[serde(default)]
    pub result_pattern: Option<String>,

    /// Comparison over bound variables that must hold for the primitive to be ready, such as
    /// `b != 0`.
    #[serde(default)]
    pub condition: Option<String>,
}

/// The level of a rule within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Intro,
    Core,
    Advanced,
    Challenge,
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intro" => Ok(Self::Intro),
            "core" => Ok(Self::Core),
            "advanced" => Ok(Self::Advanced),
            "challenge" => Ok(Self::Challenge),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Intro => "intro",
            Self::Core => "core",
            Self::Advanced => "advanced",
            Self::Challenge => "challenge",
        })
    }
}

/// Structural constraints a rule places on the semantic window. Every declared constraint must
/// hold for the rule to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<BinOpKind>,
    #[serde(default)]
    pub requires_fractions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_same_denominator: Option<bool>,
    #[serde(default)]
    pub requires_integers: bool,
}

/// A named, leveled teaching rule linking a structural precondition to one or more primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantRuleDefinition {
    pub id: String,
    pub title: String,
    pub short_label: String,
    pub description: String,
    pub level: Level,
    pub tags: Vec<String>,
    pub primitive_ids: Vec<String>,
    pub scenario_id: Option<String>,
    pub teaching_tag: Option<String>,

    /// The window domain this rule applies to. When absent, it is inferred from the primitives.
    pub domain: Option<Domain>,
    pub pattern: Option<RulePattern>,
}

/// A named, versioned bundle of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantSetDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub rules: Vec<InvariantRuleDefinition>,
}

/// A validated invariant model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantModel {
    pub primitives: Vec<PrimitiveDefinition>,
    pub invariant_sets: Vec<InvariantSetDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPattern {
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    requires_fractions: bool,
    #[serde(default)]
    require_same_denominator: Option<bool>,
    #[serde(default)]
    requires_integers: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    id: String,
    title: String,
    short_label: String,
    description: String,
    level: String,
    #[serde(default)]
    tags: Vec<String>,
    primitive_ids: Vec<String>,
    #[serde(default)]
    scenario_id: Option<String>,
    #[serde(default)]
    teaching_tag: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    pattern: Option<RawPattern>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSet {
    id: String,
    name: String,
    description: String,
    version: String,
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawModel {
    primitives: Vec<PrimitiveDefinition>,
    invariant_sets: Vec<RawSet>,
}

fn require(owner: impl FnOnce() -> String, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField { owner: owner(), field })
    } else {
        Ok(())
    }
}

fn validate_primitive(primitive: &PrimitiveDefinition) -> Result<(), ValidationError> {
    let owner = || format!("primitive {}", primitive.id);
    require(|| "a primitive".to_string(), "id", &primitive.id)?;
    require(owner, "name", &primitive.name)?;
    require(owner, "description", &primitive.description)?;

    let invalid = |field, reason: String| ValidationError::InvalidPattern {
        primitive_id: primitive.id.clone(),
        field,
        reason,
    };
    if let Some(pattern) = &primitive.pattern {
        Template::parse(pattern).map_err(|err| invalid("pattern", describe(&err)))?;
    }
    if let Some(result) = &primitive.result_pattern {
        let parsed = match calc::strip_calc(result) {
            Some(body) => calc::CalcExpr::parse(body).map(|_| ()),
            None => Template::parse(result).map(|_| ()),
        };
        parsed.map_err(|err| invalid("resultPattern", describe(&err)))?;
    }
    if let Some(condition) = &primitive.condition {
        calc::Condition::parse(condition).map_err(|err| invalid("condition", describe(&err)))?;
    }

    Ok(())
}

fn validate_rule(set_id: &str, raw: RawRule, primitive_ids: &BTreeSet<&str>) -> Result<InvariantRuleDefinition, ValidationError> {
    let owner = || format!("rule {} in invariant set {}", raw.id, set_id);
    require(|| format!("a rule in invariant set {}", set_id), "id", &raw.id)?;
    require(owner, "title", &raw.title)?;
    require(owner, "shortLabel", &raw.short_label)?;
    require(owner, "description", &raw.description)?;

    let level = raw.level.parse().map_err(|_| ValidationError::InvalidLevel {
        rule_id: raw.id.clone(),
        level: raw.level.clone(),
    })?;

    for primitive_id in &raw.primitive_ids {
        if !primitive_ids.contains(primitive_id.as_str()) {
            return Err(ValidationError::UnknownPrimitiveRef {
                set_id: set_id.to_string(),
                rule_id: raw.id.clone(),
                primitive_id: primitive_id.clone(),
            });
        }
    }

    let domain = raw.domain
        .map(|domain| domain.parse().map_err(|_| ValidationError::InvalidDomain {
            rule_id: raw.id.clone(),
            domain,
        }))
        .transpose()?;

    let pattern = raw.pattern
        .map(|pattern| {
            let operator = pattern.operator
                .map(|operator| operator.parse::<BinOpKind>().map_err(|_| ValidationError::InvalidOperator {
                    rule_id: raw.id.clone(),
                    operator,
                }))
                .transpose()?;
            Ok::<_, ValidationError>(RulePattern {
                operator,
                requires_fractions: pattern.requires_fractions,
                require_same_denominator: pattern.require_same_denominator,
                requires_integers: pattern.requires_integers,
            })
        })
        .transpose()?;

    Ok(InvariantRuleDefinition {
        id: raw.id,
        title: raw.title,
        short_label: raw.short_label,
        description: raw.description,
        level,
        tags: raw.tags,
        primitive_ids: raw.primitive_ids,
        scenario_id: raw.scenario_id,
        teaching_tag: raw.teaching_tag,
        domain,
        pattern,
    })
}

/// Validates a raw model, producing an owned, normalized [`InvariantModel`].
fn validate(raw: RawModel) -> Result<InvariantModel, ValidationError> {
    let mut primitive_ids = BTreeSet::new();
    for primitive in &raw.primitives {
        validate_primitive(primitive)?;
        if !primitive_ids.insert(primitive.id.as_str()) {
            return Err(ValidationError::DuplicatePrimitive(primitive.id.clone()));
        }
    }

    let mut set_ids = BTreeSet::new();
    let mut invariant_sets = Vec::with_capacity(raw.invariant_sets.len());
    for set in raw.invariant_sets {
        let owner = || format!("invariant set {}", set.id);
        require(|| "an invariant set".to_string(), "id", &set.id)?;
        require(owner, "name", &set.name)?;
        require(owner, "description", &set.description)?;
        require(owner, "version", &set.version)?;
        if !set_ids.insert(set.id.clone()) {
            return Err(ValidationError::DuplicateSet(set.id));
        }

        let mut rule_ids = BTreeSet::new();
        let mut rules = Vec::with_capacity(set.rules.len());
        for raw_rule in set.rules {
            let rule = validate_rule(&set.id, raw_rule, &primitive_ids)?;
            if !rule_ids.insert(rule.id.clone()) {
                return Err(ValidationError::DuplicateRule {
                    set_id: set.id.clone(),
                    rule_id: rule.id,
                });
            }
            rules.push(rule);
        }

        invariant_sets.push(InvariantSetDefinition {
            id: set.id,
            name: set.name,
            description: set.description,
            version: set.version,
            rules,
        });
    }

    Ok(InvariantModel {
        primitives: raw.primitives,
        invariant_sets,
    })
}

impl InvariantModel {
    /// Parses and validates a model from its JSON form.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        let raw: RawModel = serde_json::from_str(text)?;
        validate(raw)
    }
}
