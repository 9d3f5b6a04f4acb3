use std::ops::Range;
use crate::{tokenizer::TokenKind, tree::Node};
use super::{
    error::{kind, Error},
    token::{CloseParen, OpenParen},
    Parse,
    Parser,
};

/// A parenthesized expression. Parentheses only group; they leave no trace in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Paren {
    /// The inner expression.
    pub expr: Box<Node>,

    /// The region of the source code that this parenthesized expression was parsed from.
    pub span: Range<usize>,
}

impl Parse for Paren {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let open_paren = input.try_parse::<OpenParen>()?;

        // once an opening parenthesis is seen, every error is fatal
        if input.peek_kind() == Some(TokenKind::CloseParen) {
            let close_paren = input.try_parse::<CloseParen>()?;
            return Err(Error::new_fatal(
                vec![open_paren.span.start..close_paren.span.end],
                kind::EmptyParenthesis,
            ));
        }

        let expr = input.try_parse::<Node>().map_err(|mut err| {
            err.fatal = true;
            err
        })?;
        let close_paren = input.try_parse::<CloseParen>().map_err(|_| {
            Error::new_fatal(vec![open_paren.span.clone()], kind::UnclosedParenthesis { opening: true })
        })?;

        Ok(Self {
            expr: Box::new(expr),
            span: open_paren.span.start..close_paren.span.end,
        })
    }
}
