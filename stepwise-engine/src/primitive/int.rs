//! Handlers for integer arithmetic.

use crate::{candidate::Readiness, error::EngineError};
use rug::Integer;
use stepwise_parser::tree::{Binary, Fraction, Node};
use super::frac::normalized;

/// Returns the two operands of the operation, if both are integers.
fn operands(binary: &Binary) -> Option<(&Integer, &Integer)> {
    Some((binary.lhs.as_integer()?, binary.rhs.as_integer()?))
}

pub(super) fn readiness(target: &Node) -> Readiness {
    match target.as_binary().and_then(operands) {
        Some(_) => Readiness::Ready,
        None => Readiness::blocked("both operands must be integers"),
    }
}

/// Exact division is only ready when the divisor goes into the dividend. A zero divisor stays
/// ready, so that executing it reports the division by zero.
pub(super) fn div_exact_readiness(target: &Node) -> Readiness {
    match target.as_binary().and_then(operands) {
        Some((a, b)) if *b != 0 && !a.is_divisible(b) => {
            Readiness::blocked(format!("{} is not a multiple of {}", a, b))
        },
        Some(_) => Readiness::Ready,
        None => Readiness::blocked("both operands must be integers"),
    }
}

pub(super) fn add(binary: &Binary) -> Option<Node> {
    let (a, b) = operands(binary)?;
    Some(Node::Integer(Integer::from(a + b)))
}

pub(super) fn sub(binary: &Binary) -> Option<Node> {
    let (a, b) = operands(binary)?;
    Some(Node::Integer(Integer::from(a - b)))
}

pub(super) fn mul(binary: &Binary) -> Option<Node> {
    let (a, b) = operands(binary)?;
    Some(Node::Integer(Integer::from(a * b)))
}

/// Divides two integers, succeeding only if the quotient is an integer.
pub(super) fn div_exact(binary: &Binary) -> Result<Option<Node>, EngineError> {
    let Some((a, b)) = operands(binary) else {
        return Ok(None);
    };
    if *b == 0 {
        return Err(EngineError::division_by_zero());
    }

    if a.is_divisible(b) {
        Ok(Some(Node::Integer(a.clone().div_exact(b))))
    } else {
        Ok(None)
    }
}

/// Rewrites `a : b` as the fraction `a/b`, without reducing it.
pub(super) fn div_to_fraction(binary: &Binary) -> Result<Option<Node>, EngineError> {
    let Some((a, b)) = operands(binary) else {
        return Ok(None);
    };
    if *b == 0 {
        return Err(EngineError::division_by_zero());
    }

    let (numerator, denominator) = normalized(a.clone(), b.clone());
    Ok(Some(Node::Fraction(Fraction::new(numerator, denominator))))
}

/// Rewrites `n` as `n/1`.
pub(super) fn to_fraction(target: &Node) -> Option<Node> {
    let n = target.as_integer()?;
    Some(Node::Fraction(Fraction::new(n.clone(), Integer::from(1))))
}
