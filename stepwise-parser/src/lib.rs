//! Parsing, serialization, and path addressing for the arithmetic expressions handled by the
//! stepwise engine.
//!
//! The entry point is [`parse`], which turns text such as `1/7 + 3/7` into a [`tree::Node`].
//! The [`Display`](std::fmt::Display) implementation of [`tree::Node`] is its inverse.

pub mod parser;
pub mod tokenizer;
pub mod tree;

pub use parser::error::Error;
pub use tree::{Node, Path, Segment};

use parser::Parser;
use std::str::FromStr;

/// Parses a complete expression. Trailing input that is not part of the expression is an error.
pub fn parse(text: &str) -> Result<Node, Error> {
    Parser::new(text).try_parse_full::<Node>()
}

impl FromStr for Node {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
