//! Engine-level outcome codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, machine-readable code describing why a step did not produce a new expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// The expression text could not be parsed.
    ParseError,

    /// A selection was given but does not resolve to a node.
    InvalidSelection,

    /// Several distinct primitives match, and the caller asked for exactly one.
    MultiplePrimitiveCandidates,

    /// No primitive matches the selected shape.
    NoPrimitiveForShape,

    /// A primitive matches, but its readiness check fails.
    BlockedByReadinessCheck,

    /// The chosen primitive could not be applied to its target.
    PrimitiveFailed,

    /// The chosen primitive divides by zero.
    DivisionByZero,

    /// The candidate requested by id was not among the generated candidates.
    ChosenCandidateNotFound,

    /// The candidate refers to a primitive the registry does not know.
    InvalidPrimitiveId,

    /// The primitive exists in the registry, but there is no way to execute it.
    UnknownPrimitive,

    /// A requested invariant set does not exist.
    UnknownInvariantSet,
}

impl ErrorCode {
    /// Returns the kebab-case form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "parse-error",
            Self::InvalidSelection => "invalid-selection",
            Self::MultiplePrimitiveCandidates => "multiple-primitive-candidates",
            Self::NoPrimitiveForShape => "no-primitive-for-shape",
            Self::BlockedByReadinessCheck => "blocked-by-readiness-check",
            Self::PrimitiveFailed => "primitive-failed",
            Self::DivisionByZero => "division-by-zero",
            Self::ChosenCandidateNotFound => "chosen-candidate-not-found",
            Self::InvalidPrimitiveId => "invalid-primitive-id",
            Self::UnknownPrimitive => "unknown-primitive",
            Self::UnknownInvariantSet => "unknown-invariant-set",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed failure of one stage of a step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {detail}")]
pub struct EngineError {
    /// The outcome code.
    pub code: ErrorCode,

    /// A human-readable description of what went wrong.
    pub detail: String,
}

impl EngineError {
    /// Creates a new error with the given code and detail.
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self { code, detail: detail.into() }
    }

    /// Shorthand for a [`ErrorCode::DivisionByZero`] error.
    pub fn division_by_zero() -> Self {
        Self::new(ErrorCode::DivisionByZero, "division by zero")
    }
}
