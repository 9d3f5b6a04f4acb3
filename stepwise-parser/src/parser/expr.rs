use std::ops::Range;
use crate::{
    tokenizer::TokenKind,
    tree::{FracPart, Fraction, Node},
    try_parse_catch_fatal,
};
use super::{
    binary::Binary,
    error::{kind, Error},
    literal::Literal,
    paren::Paren,
    token::{op::BinOpKind, CloseCurly, CloseParen, FracMacro, OpenCurly, Sub},
    Parse,
    Parser,
    Precedence,
};

/// A primary expression: a literal, a parenthesized expression, a `\frac{A}{B}` expression, or a
/// negated numeric literal. Primaries are the operands of binary operators.
#[derive(Debug, Clone, PartialEq)]
pub struct Primary(pub Node);

impl Parse for Primary {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        if let Ok(sub) = input.try_parse::<Sub>() {
            return parse_negated(input, sub.span).map(Self);
        }

        let _ = try_parse_catch_fatal!(input.try_parse_with_fn(parse_frac_macro).map(Self));
        let _ = try_parse_catch_fatal!(input.try_parse::<Paren>().map(|paren| Self(*paren.expr)));
        input.try_parse::<Literal>().map(|literal| Self(literal.into()))
    }
}

/// Parses the literal following a unary minus. The minus is folded into the literal; it may only
/// be applied to a numeric literal.
fn parse_negated(input: &mut Parser, minus: Range<usize>) -> Result<Node, Error> {
    let unsupported = || Error::new_fatal(vec![minus.clone()], kind::UnsupportedUnaryMinus);
    let literal = match input.try_parse::<Literal>() {
        Ok(literal) => literal,
        Err(err) if err.fatal => return Err(err),
        Err(_) => return Err(unsupported()),
    };

    literal.negate()
        .map(Node::from)
        .ok_or_else(unsupported)
}

/// Parses one `{...}` argument of `\frac`.
fn parse_frac_arg(input: &mut Parser) -> Result<Node, Error> {
    input.try_parse::<OpenCurly>()?;
    let node = input.try_parse::<Node>()?;
    input.try_parse::<CloseCurly>()?;
    Ok(node)
}

/// Returns the fraction part a `\frac` argument can be stored as, if it is an unsigned integer or
/// a symbol.
fn as_frac_part(node: &Node) -> Option<FracPart> {
    match node {
        Node::Integer(n) if *n >= 0 => Some(FracPart::Int(n.clone())),
        Node::Variable(name) => Some(FracPart::Sym(name.clone())),
        _ => None,
    }
}

/// Parses `\frac{A}{B}`. If both arguments are simple enough to be a fraction literal, the result
/// is a [`Node::Fraction`]; otherwise it is a division.
fn parse_frac_macro(input: &mut Parser) -> Result<Node, Error> {
    let frac = input.try_parse::<FracMacro>()?;

    // once `\frac` is seen, every error is fatal
    let malformed = |input: &Parser, err: Error| {
        if err.fatal {
            err
        } else {
            Error::new_fatal(vec![frac.span.start..input.span().end], kind::MalformedFrac)
        }
    };
    let numerator = match input.try_parse_with_fn(parse_frac_arg) {
        Ok(node) => node,
        Err(err) => return Err(malformed(input, err)),
    };
    let denominator = match input.try_parse_with_fn(parse_frac_arg) {
        Ok(node) => node,
        Err(err) => return Err(malformed(input, err)),
    };

    Ok(match (as_frac_part(&numerator), as_frac_part(&denominator)) {
        (Some(numerator), Some(denominator)) => Node::Fraction(Fraction { numerator, denominator }),
        _ => Node::binary(BinOpKind::Div, numerator, denominator),
    })
}

impl Parse for Node {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        if input.peek_kind() == Some(TokenKind::CloseParen) {
            let close_paren = input.try_parse::<CloseParen>()?;
            return Err(Error::new_fatal(
                vec![close_paren.span],
                kind::UnclosedParenthesis { opening: false },
            ));
        }

        let lhs = input.try_parse::<Primary>()?.0;
        Binary::parse_expr(input, lhs, Precedence::Any)
    }
}
