//! The expression tree that every other component operates on.
//!
//! A [`Node`] is an immutable tagged union: integers, fractions, mixed numbers, variables, and
//! binary operations. A node owns its children exclusively, so there is no shared mutable
//! sub-structure; any transformation of a tree (see [`Node::replace`]) produces a new tree.
//!
//! Nodes are addressed from the root with a [`Path`]. Paths are the only addressing mechanism
//! used across the engine; there is no notion of node identity.
//!
//! The textual form of a tree is produced by its [`Display`](std::fmt::Display) implementation,
//! which is the inverse of [`parse`](crate::parse): for any tree `t`, `parse(&t.to_string())`
//! is structurally equal to `t`.

mod fmt;
mod ops;
pub mod path;

pub use path::{Path, Segment};

use crate::parser::token::op::BinOpKind;
use rug::Integer;

/// One side of a [`Fraction`]: either an integer, or a symbol such as the `a` in `a/b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FracPart {
    /// An integer. Only the numerator of a fraction may be negative.
    Int(Integer),

    /// A symbol.
    Sym(String),
}

impl FracPart {
    /// Returns the integer value of this part, if it is an integer.
    pub fn as_int(&self) -> Option<&Integer> {
        match self {
            Self::Int(n) => Some(n),
            Self::Sym(_) => None,
        }
    }
}

impl From<Integer> for FracPart {
    fn from(n: Integer) -> Self {
        Self::Int(n)
    }
}

/// A fraction literal, such as `3/7` or `a/b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fraction {
    /// The numerator, which carries the sign of the fraction.
    pub numerator: FracPart,

    /// The denominator.
    pub denominator: FracPart,
}

impl Fraction {
    /// Creates a fraction from two integers.
    pub fn new(numerator: Integer, denominator: Integer) -> Self {
        Self {
            numerator: FracPart::Int(numerator),
            denominator: FracPart::Int(denominator),
        }
    }

    /// Returns the numerator and denominator if both are integers.
    pub fn int_parts(&self) -> Option<(&Integer, &Integer)> {
        Some((self.numerator.as_int()?, self.denominator.as_int()?))
    }
}

/// A mixed number, such as `2 1/3`. The sign is carried by the whole part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mixed {
    /// The whole part.
    pub whole: Integer,

    /// The numerator of the fractional part.
    pub numerator: Integer,

    /// The denominator of the fractional part.
    pub denominator: Integer,
}

/// A binary operation, such as `1 + 2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    /// The operator.
    pub op: BinOpKind,

    /// The left-hand side (path segment `term[0]`).
    pub lhs: Box<Node>,

    /// The right-hand side (path segment `term[1]`).
    pub rhs: Box<Node>,
}

impl Binary {
    /// Returns the operand on the given side.
    pub fn operand(&self, segment: Segment) -> Option<&Node> {
        match segment {
            Segment::Left => Some(&self.lhs),
            Segment::Right => Some(&self.rhs),
            Segment::Num | Segment::Den => None,
        }
    }
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// An integer, such as `2` or `-144`.
    Integer(Integer),

    /// A fraction, such as `3/7`.
    Fraction(Fraction),

    /// A mixed number, such as `2 1/3`.
    Mixed(Mixed),

    /// A variable, such as `x`.
    Variable(String),

    /// A binary operation.
    Binary(Binary),
}

impl Node {
    /// Creates an integer node.
    pub fn int<T>(n: T) -> Self
    where
        Integer: From<T>,
    {
        Self::Integer(Integer::from(n))
    }

    /// Creates an integer fraction node.
    pub fn frac<N, D>(numerator: N, denominator: D) -> Self
    where
        Integer: From<N> + From<D>,
    {
        Self::Fraction(Fraction::new(Integer::from(numerator), Integer::from(denominator)))
    }

    /// Creates a variable node.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Creates a binary operation node.
    pub fn binary(op: BinOpKind, lhs: Node, rhs: Node) -> Self {
        Self::Binary(Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// Returns the integer value of this node, if it is an integer.
    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Self::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Returns this node as a fraction, if it is one.
    pub fn as_fraction(&self) -> Option<&Fraction> {
        match self {
            Self::Fraction(frac) => Some(frac),
            _ => None,
        }
    }

    /// Returns this node as a binary operation, if it is one.
    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Self::Binary(binary) => Some(binary),
            _ => None,
        }
    }

    /// Returns true if this node is a binary operation.
    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Returns true if this node occupies an operator slot when counting operators by ordinal.
    /// Fractions and mixed numbers count, since their fraction bar is clickable.
    pub fn is_operator_slot(&self) -> bool {
        matches!(self, Self::Binary(_) | Self::Fraction(_) | Self::Mixed(_))
    }
}
