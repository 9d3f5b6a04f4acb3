//! Serialization of expression trees back to text.
//!
//! Parentheses are only inserted where the tree shape could not otherwise be recovered by the
//! parser: around an operand whose operator binds more loosely than its parent's, and around a
//! right operand whose operator binds exactly as tightly as its parent's (all operators are
//! left-associative, so `a - (b - c)` and `a + (b + c)` both need them).

use std::fmt::{Display, Formatter, Result};
use super::{Binary, FracPart, Fraction, Mixed, Node};

impl Display for FracPart {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Sym(name) => f.write_str(name),
        }
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl Display for Mixed {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{} {}/{}", self.whole, self.numerator, self.denominator)
    }
}

impl Binary {
    /// Returns true if `operand` must be wrapped in parentheses when printed on the given side of
    /// this operation.
    fn needs_paren(&self, operand: &Node, is_rhs: bool) -> bool {
        match operand {
            Node::Binary(inner) => {
                let (outer, inner) = (self.op.precedence(), inner.op.precedence());
                inner < outer || (is_rhs && inner == outer)
            },
            _ => false,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter, operand: &Node, is_rhs: bool) -> Result {
        if self.needs_paren(operand, is_rhs) {
            write!(f, "({})", operand)
        } else {
            write!(f, "{}", operand)
        }
    }
}

impl Display for Binary {
    fn fmt(&self, f: &mut Formatter) -> Result {
        self.fmt_operand(f, &self.lhs, false)?;
        write!(f, " {} ", self.op)?;
        self.fmt_operand(f, &self.rhs, true)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Fraction(frac) => frac.fmt(f),
            Self::Mixed(mixed) => mixed.fmt(f),
            Self::Variable(name) => f.write_str(name),
            Self::Binary(binary) => binary.fmt(f),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Node {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        crate::parse(&text).map_err(|err| serde::de::Error::custom(format!("{:?}", err.kind)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, parser::token::op::BinOpKind};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn fmt_leaves() {
        assert_eq!(Node::int(-3).to_string(), "-3");
        assert_eq!(Node::frac(4, 7).to_string(), "4/7");
        assert_eq!(Node::var("x").to_string(), "x");
        assert_eq!(parse("-2 1/3").unwrap().to_string(), "-2 1/3");
    }

    #[test]
    fn fmt_minimal_parens() {
        let cases = [
            ("1 + 2 * 3", "1 + 2 * 3"),
            ("(1 + 2) * 3", "(1 + 2) * 3"),
            ("1 - (2 - 3)", "1 - (2 - 3)"),
            ("(1 - 2) - 3", "1 - 2 - 3"),
            ("1 + (2 + 3)", "1 + (2 + 3)"),
            ("4 ÷ (2 : 1)", "4 : (2 : 1)"),
            ("((1/2))", "1/2"),
            ("(3/1) + (2/5)", "3/1 + 2/5"),
        ];

        for (input, expected) in cases {
            assert_eq!(parse(input).unwrap().to_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn fmt_division_uses_colon() {
        let tree = Node::binary(BinOpKind::Div, Node::int(2), Node::int(3));
        assert_eq!(tree.to_string(), "2 : 3");
        assert_eq!(parse(&tree.to_string()).unwrap(), tree);
    }

    #[test]
    fn round_trip() {
        let corpus = [
            "1 + 2",
            "4 : 2",
            "1/7 + 3/7",
            "3/1 + 2/5",
            "1/2 * 3/5 - 2",
            "(1 + 2) * (3 - x)",
            "a/b + c/b",
            "1 - (2 - (3 - 4))",
            "\\frac{1 + 2}{3}",
            "2 1/3 + -4/5",
            "7 : (2 * -3)",
            "x * (y : (z + 1/2))",
        ];

        for input in corpus {
            let tree = parse(input).unwrap();
            let reparsed = parse(&tree.to_string()).unwrap();
            assert_eq!(reparsed, tree, "input: {}", input);
        }
    }
}
