//! The `calc(...)` mini-language used by result patterns and conditions.
//!
//! A calculation is a tiny, explicitly defined arithmetic language: integer literals, variables
//! bound by the pattern, `+ - * /`, unary minus, and parentheses. It is parsed into a
//! [`CalcExpr`] and interpreted directly; text is never handed to a general-purpose evaluator.
//! Before tokenizing, the text is checked against a strict character class.

pub mod error;

use rug::Integer;
use std::{cmp::Ordering, ops::Range};
use stepwise_error::Error;
use stepwise_parser::{
    tokenizer::{tokenize_complete, Token, TokenKind},
    tree::Node,
};
use super::Bindings;

/// If `text` has the form `calc(...)`, returns the text between the parentheses.
pub fn strip_calc(text: &str) -> Option<&str> {
    text.trim()
        .strip_prefix("calc(")?
        .strip_suffix(')')
}

fn check_charset(text: &str, extra: &[char]) -> Result<(), Error> {
    let allowed = |c: char| c.is_ascii_alphanumeric()
        || matches!(c, '_' | ' ' | '\t' | '+' | '-' | '*' | '/' | '(' | ')')
        || extra.contains(&c);

    match text.char_indices().find(|&(_, c)| !allowed(c)) {
        Some((idx, found)) => Err(Error::new(
            vec![idx..idx + found.len_utf8()],
            error::InvalidCharacter { found },
        )),
        None => Ok(()),
    }
}

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A parsed calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalcExpr {
    Int(Integer),
    Var {
        name: String,
        span: Range<usize>,
    },
    Neg(Box<CalcExpr>),
    Binary {
        op: CalcOp,
        lhs: Box<CalcExpr>,
        rhs: Box<CalcExpr>,

        /// The span of the operator.
        span: Range<usize>,
    },
}

/// Recursive-descent parser over a slice of non-whitespace tokens.
struct CalcParser<'a, 'source> {
    tokens: &'a [Token<'source>],
    cursor: usize,
    end: usize,
}

impl<'a, 'source> CalcParser<'a, 'source> {
    fn new(tokens: &'a [Token<'source>], end: usize) -> Self {
        Self { tokens, cursor: 0, end }
    }

    fn peek(&self) -> Option<&'a Token<'source>> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Result<&'a Token<'source>, Error> {
        let token = self.tokens
            .get(self.cursor)
            .ok_or_else(|| Error::new(vec![self.end..self.end], error::UnexpectedEnd))?;
        self.cursor += 1;
        Ok(token)
    }

    fn unexpected(token: &Token) -> Error {
        Error::new(vec![token.span.clone()], error::UnexpectedToken { found: token.lexeme.to_string() })
    }

    /// Parses the whole slice.
    fn parse_complete(mut self) -> Result<CalcExpr, Error> {
        let expr = self.parse_sum()?;
        match self.peek() {
            Some(token) => Err(Self::unexpected(token)),
            None => Ok(expr),
        }
    }

    fn parse_sum(&mut self) -> Result<CalcExpr, Error> {
        let mut lhs = self.parse_product()?;
        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Add => CalcOp::Add,
                TokenKind::Sub => CalcOp::Sub,
                _ => break,
            };
            let span = token.span.clone();
            self.cursor += 1;
            let rhs = self.parse_product()?;
            lhs = CalcExpr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_product(&mut self) -> Result<CalcExpr, Error> {
        let mut lhs = self.parse_unary()?;
        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Mul => CalcOp::Mul,
                TokenKind::Slash => CalcOp::Div,
                _ => break,
            };
            let span = token.span.clone();
            self.cursor += 1;
            let rhs = self.parse_unary()?;
            lhs = CalcExpr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<CalcExpr, Error> {
        if self.peek().is_some_and(|token| token.kind == TokenKind::Sub) {
            self.cursor += 1;
            return Ok(CalcExpr::Neg(Box::new(self.parse_unary()?)));
        }

        let token = self.next()?;
        match token.kind {
            TokenKind::Int => Integer::from_str_radix(token.lexeme, 10)
                .map(CalcExpr::Int)
                .map_err(|_| Self::unexpected(token)),
            TokenKind::Name => Ok(CalcExpr::Var {
                name: token.lexeme.to_string(),
                span: token.span.clone(),
            }),
            TokenKind::OpenParen => {
                let expr = self.parse_sum()?;
                let close = self.next()?;
                if close.kind == TokenKind::CloseParen {
                    Ok(expr)
                } else {
                    Err(Self::unexpected(close))
                }
            },
            _ => Err(Self::unexpected(token)),
        }
    }
}

/// Tokenizes text that already passed the character class check, dropping whitespace.
fn tokens(text: &str) -> Vec<Token<'_>> {
    tokenize_complete(text)
        .into_vec()
        .into_iter()
        .filter(|token| !token.is_whitespace())
        .collect()
}

impl CalcExpr {
    /// Parses a calculation, such as `a + b * 2`.
    pub fn parse(text: &str) -> Result<Self, Error> {
        check_charset(text, &[])?;
        CalcParser::new(&tokens(text), text.len()).parse_complete()
    }

    /// Evaluates the calculation, looking variables up in `bindings`.
    pub fn eval(&self, bindings: &Bindings) -> Result<Integer, Error> {
        match self {
            Self::Int(n) => Ok(n.clone()),
            Self::Var { name, span } => match bindings.get(name) {
                Some(Node::Integer(n)) => Ok(n.clone()),
                Some(_) => Err(Error::new(vec![span.clone()], error::NonIntegerBinding { name: name.clone() })),
                None => Err(Error::new(vec![span.clone()], error::UnboundVariable { name: name.clone() })),
            },
            Self::Neg(expr) => Ok(-expr.eval(bindings)?),
            Self::Binary { op, lhs, rhs, span } => {
                let lhs = lhs.eval(bindings)?;
                let rhs = rhs.eval(bindings)?;
                match op {
                    CalcOp::Add => Ok(lhs + rhs),
                    CalcOp::Sub => Ok(lhs - rhs),
                    CalcOp::Mul => Ok(lhs * rhs),
                    CalcOp::Div if rhs == 0 => Err(Error::new(vec![span.clone()], error::DivisionByZero)),
                    CalcOp::Div if !lhs.is_divisible(&rhs) => Err(Error::new(vec![span.clone()], error::InexactDivision)),
                    CalcOp::Div => Ok(lhs.div_exact(&rhs)),
                }
            },
        }
    }
}

/// A comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl Comparison {
    fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Eq => Some(Self::Eq),
            TokenKind::NotEq => Some(Self::NotEq),
            TokenKind::Less => Some(Self::Less),
            TokenKind::LessEq => Some(Self::LessEq),
            TokenKind::Greater => Some(Self::Greater),
            TokenKind::GreaterEq => Some(Self::GreaterEq),
            _ => None,
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::NotEq => ordering != Ordering::Equal,
            Self::Less => ordering == Ordering::Less,
            Self::LessEq => ordering != Ordering::Greater,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterEq => ordering != Ordering::Less,
        }
    }
}

/// A comparison between two calculations, such as `b != 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub lhs: CalcExpr,
    pub op: Comparison,
    pub rhs: CalcExpr,
}

impl Condition {
    /// Parses a condition.
    pub fn parse(text: &str) -> Result<Self, Error> {
        check_charset(text, &['<', '>', '=', '!'])?;
        let tokens = tokens(text);

        let mut comparisons = tokens
            .iter()
            .enumerate()
            .filter_map(|(idx, token)| Comparison::from_kind(token.kind).map(|op| (idx, op)));
        let (Some((idx, op)), None) = (comparisons.next(), comparisons.next()) else {
            return Err(Error::new(vec![0..text.len()], error::MissingComparison));
        };

        let split = tokens[idx].span.start;
        Ok(Self {
            lhs: CalcParser::new(&tokens[..idx], split).parse_complete()?,
            op,
            rhs: CalcParser::new(&tokens[idx + 1..], text.len()).parse_complete()?,
        })
    }

    /// Evaluates the condition.
    pub fn eval(&self, bindings: &Bindings) -> Result<bool, Error> {
        let lhs = self.lhs.eval(bindings)?;
        let rhs = self.rhs.eval(bindings)?;
        Ok(self.op.holds(lhs.cmp(&rhs)))
    }
}

/// Returns true if the error is a division by zero, which callers must report distinctly.
pub fn is_division_by_zero(err: &Error) -> bool {
    err.is::<error::DivisionByZero>()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn bindings(pairs: &[(&str, Node)]) -> Bindings {
        pairs.iter().map(|(name, node)| (name.to_string(), node.clone())).collect()
    }

    fn eval(text: &str, pairs: &[(&str, Node)]) -> Result<Integer, Error> {
        CalcExpr::parse(text)?.eval(&bindings(pairs))
    }

    #[test]
    fn strip() {
        assert_eq!(strip_calc("calc(a + b)"), Some("a + b"));
        assert_eq!(strip_calc("  calc((a))  "), Some("(a)"));
        assert_eq!(strip_calc("a + b"), None);
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 2 * 3", &[]).unwrap(), 7);
        assert_eq!(eval("(1 + 2) * 3", &[]).unwrap(), 9);
        assert_eq!(eval("10 - 4 - 3", &[]).unwrap(), 3);
        assert_eq!(eval("-2 * -3", &[]).unwrap(), 6);
        assert_eq!(eval("12 / 4 / 3", &[]).unwrap(), 1);
    }

    #[test]
    fn variables() {
        let pairs = [("a", Node::int(4)), ("b", Node::int(6))];
        assert_eq!(eval("a + b", &pairs).unwrap(), 10);
        assert_eq!(eval("b / (a - 2)", &pairs).unwrap(), 3);

        let err = eval("a + c", &pairs).unwrap_err();
        assert!(err.is::<error::UnboundVariable>());
        assert_eq!(err.spans, vec![4..5]);

        let err = eval("x + 1", &[("x", Node::frac(1, 2))]).unwrap_err();
        assert!(err.is::<error::NonIntegerBinding>());
    }

    #[test]
    fn exact_division_only() {
        let err = eval("7 / 0", &[]).unwrap_err();
        assert!(is_division_by_zero(&err));
        assert!(eval("7 / 2", &[]).unwrap_err().is::<error::InexactDivision>());
    }

    #[test]
    fn rejects_outside_character_class() {
        for text in ["a ^ b", "a; b", "a.b", "a % b", "a == b", "2 × 3"] {
            let err = CalcExpr::parse(text).unwrap_err();
            assert!(err.is::<error::InvalidCharacter>(), "text: {}", text);
        }
    }

    #[test]
    fn rejects_malformed() {
        assert!(CalcExpr::parse("a +").unwrap_err().is::<error::UnexpectedEnd>());
        assert!(CalcExpr::parse("a b").unwrap_err().is::<error::UnexpectedToken>());
        assert!(CalcExpr::parse("(a + b").unwrap_err().is::<error::UnexpectedEnd>());
        assert!(CalcExpr::parse("a)").unwrap_err().is::<error::UnexpectedToken>());
    }

    #[test]
    fn conditions() {
        let pairs = [("n", Node::int(3))];
        let holds = |text: &str| Condition::parse(text).unwrap().eval(&bindings(&pairs)).unwrap();
        assert!(holds("n > 0"));
        assert!(holds("n * 2 == 6"));
        assert!(holds("n != 4"));
        assert!(!holds("n <= 2"));
        assert!(holds("n >= 3"));
        assert!(!holds("n < 3"));

        assert!(Condition::parse("n + 1").unwrap_err().is::<error::MissingComparison>());
        assert!(Condition::parse("1 < n < 5").unwrap_err().is::<error::MissingComparison>());
        assert!(Condition::parse("n = 1").unwrap_err().is::<error::MissingComparison>());
        assert!(Condition::parse("n == = 1").unwrap_err().is::<error::UnexpectedToken>());
    }
}
