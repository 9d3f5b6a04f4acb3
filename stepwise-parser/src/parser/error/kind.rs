use ariadne::Fmt;
use stepwise_attrs::ErrorKind;
use stepwise_error::{ErrorKind, EXPR};
use crate::tokenizer::TokenKind;

/// The end of the source code was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of expression",
    labels = [format!("you might need to add another {} here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The end of the source code was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of expression",
    labels = [format!("I could not understand the remaining {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedEof;

/// An unexpected token was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected token",
    labels = [format!("expected one of: {}", self.expected.iter().map(|t| format!("{:?}", t)).collect::<Vec<_>>().join(", "))],
    help = format!("found {:?}", self.found),
)]
pub struct UnexpectedToken {
    /// The token(s) that were expected.
    pub expected: &'static [TokenKind],

    /// The token that was found.
    pub found: TokenKind,
}

/// A parenthesis was not closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed parenthesis",
    labels = ["this parenthesis is not closed"],
    help = if self.opening {
        "add a closing parenthesis `)` somewhere after this"
    } else {
        "add an opening parenthesis `(` somewhere before this"
    },
)]
pub struct UnclosedParenthesis {
    /// Whether the parenthesis was an opening parenthesis `(`. Otherwise, the parenthesis was a
    /// closing parenthesis `)`.
    pub opening: bool,
}

/// There was no expression inside a pair of parentheses.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "missing expression inside parenthesis",
    labels = ["add an expression here"],
)]
pub struct EmptyParenthesis;

/// A unary minus was applied to something other than a number.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "a minus sign can only be placed directly in front of a number",
    labels = ["this minus sign"],
    help = format!("rewrite the expression without negating it, e.g. {} instead of {}", "0 - (a + b)".fg(EXPR), "-(a + b)".fg(EXPR)),
)]
pub struct UnsupportedUnaryMinus;

/// A decimal number with a non-zero fractional part was used.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "decimal numbers are not supported",
    labels = ["this number"],
    help = format!("write it as a fraction instead, e.g. {} instead of {}", "1/2".fg(EXPR), "0.5".fg(EXPR)),
)]
pub struct UnsupportedDecimal;

/// The arguments of `\frac` were not written as `\frac{numerator}{denominator}`.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "malformed fraction",
    labels = ["this fraction"],
    help = format!("write fractions as {}", "\\frac{numerator}{denominator}".fg(EXPR)),
)]
pub struct MalformedFrac;
