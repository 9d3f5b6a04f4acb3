use rug::Integer;
use std::ops::Range;
use crate::{
    tokenizer::TokenKind,
    tree::{FracPart, Fraction, Mixed, Node},
    try_parse_catch_fatal,
};
use super::{
    error::{kind, Error},
    token::{Name, Slash},
    Parse,
    Parser,
};

/// Parses a string of ASCII digits into an [`Integer`].
fn parse_digits(digits: &str, span: &Range<usize>) -> Result<Integer, Error> {
    Integer::from_str_radix(digits, 10).map_err(|_| {
        Error::new_fatal(vec![span.clone()], kind::UnexpectedToken {
            expected: &[TokenKind::Int],
            found: TokenKind::Symbol,
        })
    })
}

/// An unsigned integer literal.
///
/// A decimal literal whose fractional digits are all zero, such as `3.` or `3.00`, is accepted
/// as the integer it denotes. Any other decimal literal is a fatal error.
#[derive(Debug, Clone, PartialEq)]
pub struct LitInt {
    /// The value of the literal.
    pub value: Integer,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitInt {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.next_token()?;
        let value = match token.kind {
            TokenKind::Int => parse_digits(token.lexeme, &token.span)?,
            TokenKind::Decimal => {
                let (whole, fraction) = token.lexeme.split_once('.').unwrap_or((token.lexeme, ""));
                if fraction.chars().any(|c| c != '0') {
                    return Err(Error::new_fatal(vec![token.span], kind::UnsupportedDecimal));
                }
                parse_digits(whole, &token.span)?
            },
            _ => return Err(Error::new(vec![token.span], kind::UnexpectedToken {
                expected: &[TokenKind::Int],
                found: token.kind,
            })),
        };

        Ok(Self { value, span: token.span })
    }
}

/// A symbol literal, such as `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LitSym {
    /// The name of the symbol.
    pub name: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitSym {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.try_parse::<Name>()?;
        Ok(Self {
            name: token.lexeme,
            span: token.span,
        })
    }
}

/// The simplest literals: one integer or one symbol. These are the only things allowed on either
/// side of a fraction bar.
#[derive(Debug, Clone, PartialEq)]
pub enum LitSimple {
    Int(LitInt),
    Sym(LitSym),
}

impl LitSimple {
    /// Returns the span of the literal.
    pub fn span(&self) -> Range<usize> {
        match self {
            Self::Int(int) => int.span.clone(),
            Self::Sym(sym) => sym.span.clone(),
        }
    }

    fn into_part(self) -> FracPart {
        match self {
            Self::Int(int) => FracPart::Int(int.value),
            Self::Sym(sym) => FracPart::Sym(sym.name),
        }
    }
}

impl Parse for LitSimple {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let _ = try_parse_catch_fatal!(input.try_parse::<LitInt>().map(Self::Int));
        input.try_parse::<LitSym>().map(Self::Sym)
    }
}

/// A fraction literal, `a/b`, where each side is a [`LitSimple`].
#[derive(Debug, Clone, PartialEq)]
pub struct LitFrac {
    /// The fraction.
    pub value: Fraction,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitFrac {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let numerator = input.try_parse::<LitSimple>()?;
        input.try_parse::<Slash>()?;
        let denominator = input.try_parse::<LitSimple>()?;
        let span = numerator.span().start..denominator.span().end;

        Ok(Self {
            value: Fraction {
                numerator: numerator.into_part(),
                denominator: denominator.into_part(),
            },
            span,
        })
    }
}

/// A mixed number literal, `w n/d`. The whole part and the fraction must be separated by
/// whitespace, and every part must be an integer.
#[derive(Debug, Clone, PartialEq)]
pub struct LitMixed {
    /// The mixed number.
    pub value: Mixed,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitMixed {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let whole = input.try_parse::<LitInt>()?;

        // `2 1/3` is a mixed number, `21/3` is not
        match input.current_token() {
            Some(token) if token.is_whitespace() => (),
            _ => return Err(input.error(kind::UnexpectedToken {
                expected: &[TokenKind::Whitespace],
                found: input.current_token().map_or(TokenKind::Symbol, |token| token.kind),
            })),
        }

        let numerator = input.try_parse::<LitInt>()?;
        input.try_parse::<Slash>()?;
        let denominator = input.try_parse::<LitInt>()?;

        Ok(Self {
            value: Mixed {
                whole: whole.value,
                numerator: numerator.value,
                denominator: denominator.value,
            },
            span: whole.span.start..denominator.span.end,
        })
    }
}

/// A literal value written directly in an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// An integer literal, such as `3`.
    Integer(LitInt),

    /// A fraction literal, such as `3/7` or `a/b`.
    Fraction(LitFrac),

    /// A mixed number literal, such as `2 1/3`.
    Mixed(LitMixed),

    /// A symbol literal, such as `x`.
    Symbol(LitSym),
}

impl Literal {
    /// Returns the span of the literal.
    pub fn span(&self) -> Range<usize> {
        match self {
            Self::Integer(int) => int.span.clone(),
            Self::Fraction(frac) => frac.span.clone(),
            Self::Mixed(mixed) => mixed.span.clone(),
            Self::Symbol(sym) => sym.span.clone(),
        }
    }

    /// Returns the negation of this literal, if it is numeric. The sign is folded into the value:
    /// the numerator of a fraction, or the whole part of a mixed number. A mixed number with a
    /// zero whole part has nowhere to carry the sign, so it cannot be negated.
    pub fn negate(self) -> Option<Self> {
        match self {
            Self::Integer(mut int) => {
                int.value = -int.value;
                Some(Self::Integer(int))
            },
            Self::Fraction(mut frac) => {
                let FracPart::Int(numerator) = &mut frac.value.numerator else {
                    return None;
                };
                *numerator = -std::mem::take(numerator);
                Some(Self::Fraction(frac))
            },
            Self::Mixed(mut mixed) => {
                if mixed.value.whole == 0 {
                    return None;
                }
                mixed.value.whole = -mixed.value.whole;
                Some(Self::Mixed(mixed))
            },
            Self::Symbol(_) => None,
        }
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Integer(int) => Node::Integer(int.value),
            Literal::Fraction(frac) => Node::Fraction(frac.value),
            Literal::Mixed(mixed) => Node::Mixed(mixed.value),
            Literal::Symbol(sym) => Node::Variable(sym.name),
        }
    }
}

impl Parse for Literal {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let _ = try_parse_catch_fatal!(input.try_parse::<LitMixed>().map(Self::Mixed));
        let _ = try_parse_catch_fatal!(input.try_parse::<LitFrac>().map(Self::Fraction));
        input.try_parse::<LitSimple>().map(|simple| match simple {
            LitSimple::Int(int) => Self::Integer(int),
            LitSimple::Sym(sym) => Self::Symbol(sym),
        })
    }
}
