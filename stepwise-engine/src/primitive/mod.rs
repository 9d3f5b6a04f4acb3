//! The typed primitives: atomic transformations that need real arithmetic, and are therefore
//! always executed by a dedicated handler rather than by pattern substitution.

mod frac;
mod int;

use crate::{candidate::Readiness, error::EngineError, matcher::Domain};
use serde::Serialize;
use stepwise_parser::{
    parser::token::op::BinOpKind,
    tree::{Binary, Node, Path, Segment},
};

/// Where a primitive's target lives relative to the semantic window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The target is the window itself, a binary operation.
    Window,

    /// The target is one operand of the window.
    Operand,

    /// The target is the anchored node, whatever the window.
    Node,
}

/// Every primitive with a typed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
    IntAdd,
    IntSub,
    IntMul,
    IntDivExact,
    IntDivToFraction,
    FracAddSameDen,
    FracSubSameDen,
    FracMul,
    FracDiv,
    FracEquivScale,
    FracLiftInt,
    IntToFrac,
    FracReduce,
    MixedToFrac,
}

impl PrimitiveKind {
    /// Every kind, in catalogue order.
    pub const ALL: [PrimitiveKind; 14] = [
        Self::IntAdd,
        Self::IntSub,
        Self::IntMul,
        Self::IntDivExact,
        Self::IntDivToFraction,
        Self::FracAddSameDen,
        Self::FracSubSameDen,
        Self::FracMul,
        Self::FracDiv,
        Self::FracEquivScale,
        Self::FracLiftInt,
        Self::IntToFrac,
        Self::FracReduce,
        Self::MixedToFrac,
    ];

    /// Returns the registry id of this primitive.
    pub fn id(self) -> &'static str {
        match self {
            Self::IntAdd => "P.INT_ADD",
            Self::IntSub => "P.INT_SUB",
            Self::IntMul => "P.INT_MUL",
            Self::IntDivExact => "P.INT_DIV_EXACT",
            Self::IntDivToFraction => "P.INT_DIV_TO_FRAC",
            Self::FracAddSameDen => "P.FRAC_ADD_SAME_DEN",
            Self::FracSubSameDen => "P.FRAC_SUB_SAME_DEN",
            Self::FracMul => "P.FRAC_MUL",
            Self::FracDiv => "P.FRAC_DIV",
            Self::FracEquivScale => "P.FRAC_EQUIV",
            Self::FracLiftInt => "P.FRAC_LIFT_INT",
            Self::IntToFrac => "P.INT_TO_FRAC",
            Self::FracReduce => "P.FRAC_REDUCE",
            Self::MixedToFrac => "P.MIXED_TO_FRAC",
        }
    }

    /// Returns the kind with the given registry id, if it has a typed handler.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Returns the window domain this primitive naturally belongs to. Primitives that work across
    /// several domains, or on a single node, have none.
    pub fn domain(self) -> Option<Domain> {
        match self {
            Self::IntAdd | Self::IntSub | Self::IntMul
                | Self::IntDivExact | Self::IntDivToFraction => Some(Domain::Integers),
            Self::FracAddSameDen | Self::FracSubSameDen => Some(Domain::FractionsSameDen),
            Self::FracEquivScale => Some(Domain::FractionsDiffDen),
            Self::FracLiftInt => Some(Domain::Mixed),
            Self::FracMul | Self::FracDiv
                | Self::IntToFrac | Self::FracReduce | Self::MixedToFrac => None,
        }
    }

    /// Returns where the target of this primitive lives.
    pub fn scope(self) -> Scope {
        match self {
            Self::FracEquivScale | Self::FracLiftInt => Scope::Operand,
            Self::IntToFrac | Self::FracReduce | Self::MixedToFrac => Scope::Node,
            _ => Scope::Window,
        }
    }

    /// Returns the operator a window-scoped primitive works on.
    fn operator(self) -> Option<BinOpKind> {
        match self {
            Self::IntAdd | Self::FracAddSameDen => Some(BinOpKind::Add),
            Self::IntSub | Self::FracSubSameDen => Some(BinOpKind::Sub),
            Self::IntMul | Self::FracMul => Some(BinOpKind::Mul),
            Self::IntDivExact | Self::IntDivToFraction | Self::FracDiv => Some(BinOpKind::Div),
            _ => None,
        }
    }

    /// Structural gate: returns true if this primitive could ever be applied to `target`.
    ///
    /// `window` is the semantic window; for operand-scoped primitives, `target` must be one of
    /// its operands, located at `side`.
    pub fn applies(self, window: &Node, target: &Node, side: Option<Segment>) -> bool {
        match self.scope() {
            Scope::Window => match (target, self.operator()) {
                (Node::Binary(binary), Some(op)) if binary.op == op => match self {
                    Self::FracMul | Self::FracDiv => is_fraction(&binary.lhs) && is_fraction(&binary.rhs),
                    _ => true,
                },
                _ => false,
            },
            Scope::Operand => {
                let Some((binary, other)) = side.and_then(|side| other_operand(window, side)) else {
                    return false;
                };
                let additive = matches!(binary.op, BinOpKind::Add | BinOpKind::Sub);
                match self {
                    Self::FracEquivScale => additive && is_fraction(target) && is_fraction(other),
                    Self::FracLiftInt => additive && matches!(target, Node::Integer(_)) && is_fraction(other),
                    _ => false,
                }
            },
            Scope::Node => match self {
                Self::IntToFrac => matches!(target, Node::Integer(_)),
                Self::FracReduce => is_fraction(target),
                Self::MixedToFrac => matches!(target, Node::Mixed(_)),
                _ => false,
            },
        }
    }

    /// Pedagogical gate: whether the primitive may be executed now. Only meaningful when
    /// [`PrimitiveKind::applies`] holds.
    pub fn readiness(self, window: &Node, target: &Node, side: Option<Segment>) -> Readiness {
        match self {
            Self::IntAdd | Self::IntSub | Self::IntMul | Self::IntDivToFraction => int::readiness(target),
            Self::IntDivExact => int::div_exact_readiness(target),
            Self::FracAddSameDen | Self::FracSubSameDen => frac::same_den_readiness(target),
            Self::FracMul | Self::FracDiv => frac::operands_readiness(target),
            Self::FracEquivScale | Self::FracLiftInt => {
                match side.and_then(|side| other_operand(window, side)) {
                    Some((_, other)) if self == Self::FracEquivScale => frac::equiv_readiness(target, other),
                    Some((_, other)) => frac::lift_readiness(other),
                    None => Readiness::blocked("the target is not an operand of the window"),
                }
            },
            Self::IntToFrac | Self::MixedToFrac => Readiness::Ready,
            Self::FracReduce => frac::reduce_readiness(target),
        }
    }

    /// Executes the primitive at `target_path` in `root`, returning the new root.
    ///
    /// Returns `Ok(None)` if the target does not have the shape the handler needs, and an error
    /// for conditions that must never be swallowed, such as division by zero.
    pub fn execute(self, root: &Node, target_path: &Path) -> Result<Option<Node>, EngineError> {
        let Some(target) = root.get(target_path) else {
            return Ok(None);
        };

        let replacement = match self.scope() {
            Scope::Window => {
                let Node::Binary(binary) = &*target else {
                    return Ok(None);
                };
                match self {
                    Self::IntAdd => int::add(binary),
                    Self::IntSub => int::sub(binary),
                    Self::IntMul => int::mul(binary),
                    Self::IntDivExact => int::div_exact(binary)?,
                    Self::IntDivToFraction => int::div_to_fraction(binary)?,
                    Self::FracAddSameDen => frac::add_same_den(binary, BinOpKind::Add)?,
                    Self::FracSubSameDen => frac::add_same_den(binary, BinOpKind::Sub)?,
                    Self::FracMul => frac::mul(binary)?,
                    Self::FracDiv => frac::div(binary)?,
                    _ => None,
                }
            },
            Scope::Operand => {
                let (Some(side), Some(parent)) = (target_path.last(), target_path.parent()) else {
                    return Ok(None);
                };
                let Some(other) = root.get(&parent)
                    .and_then(|window| other_operand(&window, side).map(|(_, other)| other.clone()))
                else {
                    return Ok(None);
                };
                match self {
                    Self::FracEquivScale => frac::equiv_scale(&target, &other)?,
                    Self::FracLiftInt => frac::lift_int(&target, &other)?,
                    _ => None,
                }
            },
            Scope::Node => match self {
                Self::IntToFrac => int::to_fraction(&target),
                Self::FracReduce => frac::reduce(&target)?,
                Self::MixedToFrac => frac::mixed_to_fraction(&target)?,
                _ => None,
            },
        };

        Ok(replacement.and_then(|replacement| root.replace(target_path, replacement)))
    }
}

fn is_fraction(node: &Node) -> bool {
    matches!(node, Node::Fraction(_))
}

/// Returns the operation and the operand opposite `side`, if `window` is an operation.
fn other_operand(window: &Node, side: Segment) -> Option<(&Binary, &Node)> {
    let binary = window.as_binary()?;
    let other = match side {
        Segment::Left => &binary.rhs,
        Segment::Right => &binary.lhs,
        Segment::Num | Segment::Den => return None,
    };
    Some((binary, other))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_parser::parse;
    use crate::error::ErrorCode;
    use super::*;

    fn run(kind: PrimitiveKind, text: &str, path: &str) -> Result<Option<String>, EngineError> {
        let root = parse(text).unwrap();
        kind.execute(&root, &path.parse().unwrap())
            .map(|node| node.map(|node| node.to_string()))
    }

    fn ok(kind: PrimitiveKind, text: &str, path: &str) -> String {
        run(kind, text, path).unwrap().unwrap()
    }

    #[test]
    fn ids_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_id("P.NOPE"), None);
    }

    #[test]
    fn integer_handlers() {
        assert_eq!(ok(PrimitiveKind::IntAdd, "1 + 2", "root"), "3");
        assert_eq!(ok(PrimitiveKind::IntSub, "2 - 5", "root"), "-3");
        assert_eq!(ok(PrimitiveKind::IntMul, "(1 + 2) * (3 * -4)", "term[1]"), "(1 + 2) * -12");
        assert_eq!(ok(PrimitiveKind::IntDivExact, "4 : 2", "root"), "2");
        assert_eq!(run(PrimitiveKind::IntDivExact, "7 : 2", "root").unwrap(), None);
        assert_eq!(ok(PrimitiveKind::IntDivToFraction, "6 : 4", "root"), "6/4");
        assert_eq!(ok(PrimitiveKind::IntDivToFraction, "3 : -2", "root"), "-3/2");
        assert_eq!(ok(PrimitiveKind::IntToFrac, "3", "root"), "3/1");
    }

    #[test]
    fn integer_handlers_reject_wrong_shapes() {
        assert_eq!(run(PrimitiveKind::IntAdd, "1/2 + 2", "root").unwrap(), None);
        assert_eq!(run(PrimitiveKind::IntAdd, "1 + 2", "term[0]").unwrap(), None);
        assert_eq!(run(PrimitiveKind::IntAdd, "1 + 2", "term[1].term[0]").unwrap(), None);
    }

    #[test]
    fn division_by_zero_is_a_hard_failure() {
        for (kind, text, path) in [
            (PrimitiveKind::IntDivExact, "4 : 0", "root"),
            (PrimitiveKind::IntDivToFraction, "4 : 0", "root"),
            (PrimitiveKind::FracAddSameDen, "1/0 + 2/0", "root"),
            (PrimitiveKind::FracMul, "1/2 * 3/0", "root"),
            (PrimitiveKind::FracDiv, "1/2 : 0/3", "root"),
            (PrimitiveKind::FracReduce, "4/0", "root"),
            (PrimitiveKind::FracEquivScale, "1/0 + 1/2", "term[0]"),
        ] {
            let err = run(kind, text, path).unwrap_err();
            assert_eq!(err.code, ErrorCode::DivisionByZero, "{:?} on {}", kind, text);
        }
    }

    #[test]
    fn fraction_handlers() {
        assert_eq!(ok(PrimitiveKind::FracAddSameDen, "1/7 + 3/7", "root"), "4/7");
        assert_eq!(ok(PrimitiveKind::FracAddSameDen, "1/4 + 1/4", "root"), "2/4");
        assert_eq!(ok(PrimitiveKind::FracSubSameDen, "3/7 - 1/7", "root"), "2/7");
        assert_eq!(run(PrimitiveKind::FracAddSameDen, "1/7 + 3/8", "root").unwrap(), None);
        assert_eq!(ok(PrimitiveKind::FracMul, "1/2 * 3/5", "root"), "3/10");
        assert_eq!(ok(PrimitiveKind::FracMul, "2/3 * 3/4", "root"), "1/2");
        assert_eq!(ok(PrimitiveKind::FracDiv, "1/2 : 3/5", "root"), "5/6");
        assert_eq!(ok(PrimitiveKind::FracDiv, "1/2 : -3/5", "root"), "-5/6");
        assert_eq!(ok(PrimitiveKind::FracReduce, "6/4", "root"), "3/2");
        assert_eq!(ok(PrimitiveKind::MixedToFrac, "2 1/3", "root"), "7/3");
        assert_eq!(ok(PrimitiveKind::MixedToFrac, "-2 1/3", "root"), "-7/3");
    }

    #[test]
    fn operand_handlers() {
        assert_eq!(ok(PrimitiveKind::FracEquivScale, "3/1 + 2/5", "term[0]"), "15/5 + 2/5");
        assert_eq!(ok(PrimitiveKind::FracEquivScale, "1/4 + 1/6", "term[1]"), "1/4 + 2/12");
        assert_eq!(ok(PrimitiveKind::FracLiftInt, "2 + 1/3", "term[0]"), "6/3 + 1/3");
        assert_eq!(ok(PrimitiveKind::FracLiftInt, "1/4 - 3", "term[1]"), "1/4 - 12/4");
        assert_eq!(run(PrimitiveKind::FracLiftInt, "2 + 1/3", "term[1]").unwrap(), None);
    }

    #[test]
    fn gates() {
        let root = parse("3/1 + 2/5").unwrap();
        let lhs = root.get(&"term[0]".parse().unwrap()).unwrap();
        let rhs = root.get(&"term[1]".parse().unwrap()).unwrap();
        assert!(PrimitiveKind::FracEquivScale.applies(&root, &lhs, Some(Segment::Left)));
        assert_eq!(PrimitiveKind::FracEquivScale.readiness(&root, &lhs, Some(Segment::Left)), Readiness::Ready);
        assert!(PrimitiveKind::FracEquivScale.readiness(&root, &rhs, Some(Segment::Right)).is_blocked());
        assert!(!PrimitiveKind::FracAddSameDen.readiness(&root, &root, None).is_ready());
        assert!(!PrimitiveKind::FracMul.applies(&root, &root, None));
        assert!(PrimitiveKind::FracReduce.readiness(&root, &lhs, None).is_blocked());

        for (text, ready) in [("8 : 4", true), ("7 : 2", false), ("4 : 0", true)] {
            let quotient = parse(text).unwrap();
            let readiness = PrimitiveKind::IntDivExact.readiness(&quotient, &quotient, None);
            assert_eq!(readiness.is_ready(), ready, "{}", text);
        }

        let product = parse("1/2 * 3/5").unwrap();
        assert!(PrimitiveKind::FracMul.applies(&product, &product, None));
        assert!(!PrimitiveKind::FracEquivScale.applies(
            &product,
            &product.get(&"term[0]".parse().unwrap()).unwrap(),
            Some(Segment::Left),
        ));
    }
}
