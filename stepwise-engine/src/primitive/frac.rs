//! Handlers for fraction arithmetic. Denominators of produced fractions are always positive.

use crate::{candidate::Readiness, error::EngineError};
use rug::Integer;
use stepwise_parser::{
    parser::token::op::BinOpKind,
    tree::{Binary, FracPart, Fraction, Node},
};

/// Moves the sign of a fraction onto its numerator.
pub(super) fn normalized(numerator: Integer, denominator: Integer) -> (Integer, Integer) {
    if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    }
}

/// Builds the fraction `numerator/denominator` in lowest terms.
fn reduced(numerator: Integer, denominator: Integer) -> Result<Node, EngineError> {
    if denominator == 0 {
        return Err(EngineError::division_by_zero());
    }

    let gcd = numerator.clone().gcd(&denominator);
    let (numerator, denominator) = normalized(numerator.div_exact(&gcd), denominator.div_exact(&gcd));
    Ok(Node::Fraction(Fraction::new(numerator, denominator)))
}

/// Returns the integer parts of a fraction node.
fn int_parts(node: &Node) -> Option<(&Integer, &Integer)> {
    node.as_fraction()?.int_parts()
}

/// Returns the integer parts of a fraction node, failing on a zero denominator.
fn checked_parts(node: &Node) -> Result<Option<(&Integer, &Integer)>, EngineError> {
    match int_parts(node) {
        Some((_, d)) if *d == 0 => Err(EngineError::division_by_zero()),
        parts => Ok(parts),
    }
}

fn both_parts(binary: &Binary) -> Result<Option<((&Integer, &Integer), (&Integer, &Integer))>, EngineError> {
    let lhs = checked_parts(&binary.lhs)?;
    let rhs = checked_parts(&binary.rhs)?;
    Ok(lhs.zip(rhs))
}

pub(super) fn same_den_readiness(target: &Node) -> Readiness {
    let Some(binary) = target.as_binary() else {
        return Readiness::blocked("the target is not an operation");
    };
    match (int_parts(&binary.lhs), int_parts(&binary.rhs)) {
        (Some((_, b)), Some((_, d))) if b == d => Readiness::Ready,
        (Some(_), Some(_)) => Readiness::blocked("the denominators are not equal yet"),
        _ => Readiness::blocked("both operands must be fractions of integers"),
    }
}

pub(super) fn operands_readiness(target: &Node) -> Readiness {
    match target.as_binary().map(|binary| (int_parts(&binary.lhs), int_parts(&binary.rhs))) {
        Some((Some(_), Some(_))) => Readiness::Ready,
        _ => Readiness::blocked("both operands must be fractions of integers"),
    }
}

pub(super) fn equiv_readiness(target: &Node, other: &Node) -> Readiness {
    match (int_parts(target), int_parts(other)) {
        (Some((_, b)), Some((_, d))) if *b != 0 && *d != 0 => {
            if Integer::from(b.lcm_ref(d)) == *b {
                Readiness::blocked("this fraction already has the common denominator")
            } else {
                Readiness::Ready
            }
        },
        (Some(_), Some(_)) => Readiness::Ready,
        _ => Readiness::blocked("both operands must be fractions of integers"),
    }
}

pub(super) fn lift_readiness(other: &Node) -> Readiness {
    match int_parts(other) {
        Some(_) => Readiness::Ready,
        None => Readiness::blocked("the other operand must be a fraction of integers"),
    }
}

pub(super) fn reduce_readiness(target: &Node) -> Readiness {
    match int_parts(target) {
        Some((_, d)) if *d == 0 => Readiness::Ready,
        Some((n, d)) => {
            if Integer::from(n.gcd_ref(d)) == 1 && *d > 0 {
                Readiness::blocked("the fraction is already in lowest terms")
            } else {
                Readiness::Ready
            }
        },
        None => Readiness::blocked("the fraction has symbolic parts"),
    }
}

/// `a/c ± b/c = (a ± b)/c`. The result is not reduced.
pub(super) fn add_same_den(binary: &Binary, op: BinOpKind) -> Result<Option<Node>, EngineError> {
    let Some(((a, c), (b, d))) = both_parts(binary)? else {
        return Ok(None);
    };
    if c != d {
        return Ok(None);
    }

    let numerator = match op {
        BinOpKind::Sub => Integer::from(a - b),
        _ => Integer::from(a + b),
    };
    let (numerator, denominator) = normalized(numerator, c.clone());
    Ok(Some(Node::Fraction(Fraction::new(numerator, denominator))))
}

/// `a/b * c/d = (ac)/(bd)`, reduced.
pub(super) fn mul(binary: &Binary) -> Result<Option<Node>, EngineError> {
    let Some(((a, b), (c, d))) = both_parts(binary)? else {
        return Ok(None);
    };
    reduced(Integer::from(a * c), Integer::from(b * d)).map(Some)
}

/// `a/b : c/d = (ad)/(bc)`, reduced.
pub(super) fn div(binary: &Binary) -> Result<Option<Node>, EngineError> {
    let Some(((a, b), (c, d))) = both_parts(binary)? else {
        return Ok(None);
    };
    reduced(Integer::from(a * d), Integer::from(b * c)).map(Some)
}

/// Scales `target` so that its denominator is the least common multiple of both denominators.
pub(super) fn equiv_scale(target: &Node, other: &Node) -> Result<Option<Node>, EngineError> {
    let (Some((a, b)), Some((_, d))) = (checked_parts(target)?, checked_parts(other)?) else {
        return Ok(None);
    };

    let factor = Integer::from(b.lcm_ref(d)).div_exact(b);
    let (numerator, denominator) = normalized(Integer::from(a * &factor), Integer::from(b * &factor));
    Ok(Some(Node::Fraction(Fraction::new(numerator, denominator))))
}

/// Rewrites the integer `target` as a fraction over the denominator of `other`.
pub(super) fn lift_int(target: &Node, other: &Node) -> Result<Option<Node>, EngineError> {
    let (Some(n), Some((_, d))) = (target.as_integer(), checked_parts(other)?) else {
        return Ok(None);
    };

    let (numerator, denominator) = normalized(Integer::from(n * d), d.clone());
    Ok(Some(Node::Fraction(Fraction::new(numerator, denominator))))
}

pub(super) fn reduce(target: &Node) -> Result<Option<Node>, EngineError> {
    let Some((n, d)) = int_parts(target) else {
        return Ok(None);
    };
    reduced(n.clone(), d.clone()).map(Some)
}

/// `W N/D = (W·D + N)/D`, with the sign of `W` applying to the whole number.
pub(super) fn mixed_to_fraction(target: &Node) -> Result<Option<Node>, EngineError> {
    let Node::Mixed(mixed) = target else {
        return Ok(None);
    };
    if mixed.denominator == 0 {
        return Err(EngineError::division_by_zero());
    }

    let magnitude = Integer::from(mixed.whole.abs_ref()) * &mixed.denominator + &mixed.numerator;
    let numerator = if mixed.whole < 0 { -magnitude } else { magnitude };
    let (numerator, denominator) = normalized(numerator, mixed.denominator.clone());
    Ok(Some(Node::Fraction(Fraction {
        numerator: FracPart::Int(numerator),
        denominator: FracPart::Int(denominator),
    })))
}
