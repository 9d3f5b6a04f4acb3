use stepwise_attrs::ErrorKind;
use stepwise_error::ErrorKind;

/// A character outside the arithmetic character class was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not allowed in a calculation", self.found),
    labels = ["this character"],
    help = "calculations may only contain integers, variable names, `+ - * /` and parentheses",
)]
pub struct InvalidCharacter {
    pub found: char,
}

/// A token that does not belong at this position was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected token in calculation",
    labels = [format!("did not expect `{}` here", self.found)],
)]
pub struct UnexpectedToken {
    pub found: String,
}

/// The calculation ended while an operand was still expected.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of calculation",
    labels = ["add an operand here"],
)]
pub struct UnexpectedEnd;

/// A condition did not contain exactly one comparison.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "a condition must compare two calculations",
    labels = ["in this condition"],
    help = "use exactly one of `==`, `!=`, `<`, `<=`, `>`, `>=`",
)]
pub struct MissingComparison;

/// A variable was used that the pattern did not bind.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not bound by the pattern", self.name),
    labels = ["this variable"],
)]
pub struct UnboundVariable {
    pub name: String,
}

/// A variable was bound to something other than an integer.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not bound to an integer", self.name),
    labels = ["this variable"],
)]
pub struct NonIntegerBinding {
    pub name: String,
}

/// The divisor of a division evaluated to zero.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "division by zero",
    labels = ["this division"],
)]
pub struct DivisionByZero;

/// A division did not produce an integer.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "division does not produce an integer",
    labels = ["this division"],
)]
pub struct InexactDivision;
