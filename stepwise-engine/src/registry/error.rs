use thiserror::Error;

/// A reason an invariant model was rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The document is not valid JSON, or a field has the wrong type or shape.
    #[error("malformed invariant model: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required string field is empty.
    #[error("`{field}` of {owner} must not be empty")]
    EmptyField {
        /// Where the field lives, such as `primitive P.INT_ADD`.
        owner: String,

        /// The JSON name of the field.
        field: &'static str,
    },

    #[error("duplicate primitive id `{0}`")]
    DuplicatePrimitive(String),

    #[error("duplicate invariant set id `{0}`")]
    DuplicateSet(String),

    #[error("duplicate rule id `{rule_id}` in invariant set `{set_id}`")]
    DuplicateRule {
        set_id: String,
        rule_id: String,
    },

    #[error("rule `{rule_id}` has level `{level}`, expected one of intro, core, advanced, challenge")]
    InvalidLevel {
        rule_id: String,
        level: String,
    },

    #[error("rule `{rule_id}` in invariant set `{set_id}` refers to unknown primitive `{primitive_id}`")]
    UnknownPrimitiveRef {
        set_id: String,
        rule_id: String,
        primitive_id: String,
    },

    #[error("rule `{rule_id}` has unknown domain `{domain}`")]
    InvalidDomain {
        rule_id: String,
        domain: String,
    },

    #[error("rule `{rule_id}` has unknown pattern operator `{operator}`")]
    InvalidOperator {
        rule_id: String,
        operator: String,
    },

    /// A `pattern`, `resultPattern`, or `condition` of a primitive does not parse.
    #[error("`{field}` of primitive `{primitive_id}` is invalid: {reason}")]
    InvalidPattern {
        primitive_id: String,
        field: &'static str,
        reason: String,
    },
}
