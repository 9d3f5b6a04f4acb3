use crate::tree::Node;
use super::{
    error::Error,
    expr::Primary,
    token::op::BinOp,
    Parser,
    Precedence,
};

/// Precedence-climbing construction of [`Node::Binary`] trees. There is no implicit
/// multiplication: two operands must always be separated by an operator.
pub struct Binary;

impl Binary {
    /// After parsing the operator and the right-hand side of a potential binary expression, parse
    /// ahead to see if the right-hand side is incomplete. Returns the completed right-hand side.
    fn complete_rhs(input: &mut Parser, op: &BinOp, mut rhs: Node) -> Result<Node, Error> {
        let precedence = op.precedence();

        loop {
            // clone the input stream to emulate peeking
            let mut input_ahead = input.clone();
            match input_ahead.try_parse::<BinOp>() {
                Ok(next_op) if next_op.precedence() > precedence => {
                    // `3 + 4 * 5`: the next operator binds tighter, so it takes `rhs` first
                    rhs = Self::parse_expr(input, rhs, next_op.precedence())?;
                },
                // equal or lower precedence: `1 * 2 + 3` or `1 * 2 * 3`
                // the outer loop of `parse_expr` picks the operator up
                _ => break,
            }
        }

        Ok(rhs)
    }

    /// Parses a binary expression with the given left-hand side. Only operators with precedence
    /// at least `precedence` are consumed.
    pub fn parse_expr(input: &mut Parser, mut lhs: Node, precedence: Precedence) -> Result<Node, Error> {
        loop {
            let mut input_ahead = input.clone();
            let op = match input_ahead.try_parse::<BinOp>() {
                Ok(op) if op.precedence() >= precedence => op,
                _ => break,
            };
            input.set_cursor(&input_ahead);

            let rhs = input.try_parse::<Primary>()?.0;
            let rhs = Self::complete_rhs(input, &op, rhs)?;
            lhs = Node::binary(op.kind, lhs, rhs);
        }

        Ok(lhs)
    }
}
