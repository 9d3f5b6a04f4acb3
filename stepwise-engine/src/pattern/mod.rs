//! Structural pattern matching and substitution over template trees.
//!
//! A template is an ordinary expression, parsed with the regular parser, in which every variable
//! is a placeholder. `x + 0` matches `(1 + 2) + 0` with `x` bound to `1 + 2`. A symbol in a
//! fraction slot, like the `a` in `a/c`, binds the integer in that slot.

pub mod calc;

use std::collections::BTreeMap;
use stepwise_parser::tree::{FracPart, Fraction, Node};

/// Variable bindings produced by a match, ordered by name.
pub type Bindings = BTreeMap<String, Node>;

/// Returns a one-line description of a source-located error.
pub fn describe(err: &stepwise_error::Error) -> String {
    format!("{:?}", err.kind)
}

/// A substitution could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubstituteError {
    /// A fraction slot names a variable bound to something other than an integer or a symbol.
    #[error("`{0}` is bound to a compound expression, which cannot fill a fraction slot")]
    CompoundInFractionSlot(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(Node);

impl Template {
    /// Parses a template.
    pub fn parse(text: &str) -> Result<Self, stepwise_error::Error> {
        stepwise_parser::parse(text)
            .map(Self)
            .map_err(Into::into)
    }

    /// Matches the template against a node, returning the bindings on success.
    pub fn matches(&self, node: &Node) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        match_into(&self.0, node, &mut bindings).then_some(bindings)
    }

    /// Replaces every bound variable of the template with its value.
    pub fn substitute(&self, bindings: &Bindings) -> Result<Node, SubstituteError> {
        substitute(&self.0, bindings)
    }
}

/// Binds `name` to `value`, or checks that an existing binding is equal to it.
fn bind(name: &str, value: Node, bindings: &mut Bindings) -> bool {
    match bindings.get(name) {
        Some(existing) => *existing == value,
        None => {
            bindings.insert(name.to_string(), value);
            true
        },
    }
}

fn match_part(template: &FracPart, part: &FracPart, bindings: &mut Bindings) -> bool {
    match (template, part) {
        (FracPart::Sym(name), FracPart::Int(n)) => bind(name, Node::Integer(n.clone()), bindings),
        (FracPart::Sym(name), FracPart::Sym(sym)) => bind(name, Node::Variable(sym.clone()), bindings),
        (FracPart::Int(a), FracPart::Int(b)) => a == b,
        (FracPart::Int(_), FracPart::Sym(_)) => false,
    }
}

fn match_into(template: &Node, node: &Node, bindings: &mut Bindings) -> bool {
    match (template, node) {
        (Node::Variable(name), _) => bind(name, node.clone(), bindings),
        (Node::Integer(a), Node::Integer(b)) => a == b,
        (Node::Fraction(a), Node::Fraction(b)) => {
            match_part(&a.numerator, &b.numerator, bindings)
                && match_part(&a.denominator, &b.denominator, bindings)
        },
        (Node::Mixed(a), Node::Mixed(b)) => a == b,
        (Node::Binary(a), Node::Binary(b)) => {
            a.op == b.op
                && match_into(&a.lhs, &b.lhs, bindings)
                && match_into(&a.rhs, &b.rhs, bindings)
        },
        _ => false,
    }
}

fn substitute_part(part: &FracPart, bindings: &Bindings) -> Result<FracPart, SubstituteError> {
    let FracPart::Sym(name) = part else {
        return Ok(part.clone());
    };

    match bindings.get(name) {
        None => Ok(part.clone()),
        Some(Node::Integer(n)) => Ok(FracPart::Int(n.clone())),
        Some(Node::Variable(sym)) => Ok(FracPart::Sym(sym.clone())),
        Some(_) => Err(SubstituteError::CompoundInFractionSlot(name.clone())),
    }
}

fn substitute(template: &Node, bindings: &Bindings) -> Result<Node, SubstituteError> {
    Ok(match template {
        Node::Variable(name) => bindings.get(name).cloned().unwrap_or_else(|| template.clone()),
        Node::Fraction(frac) => Node::Fraction(Fraction {
            numerator: substitute_part(&frac.numerator, bindings)?,
            denominator: substitute_part(&frac.denominator, bindings)?,
        }),
        Node::Binary(binary) => Node::binary(
            binary.op,
            substitute(&binary.lhs, bindings)?,
            substitute(&binary.rhs, bindings)?,
        ),
        Node::Integer(_) | Node::Mixed(_) => template.clone(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_parser::parse;
    use super::*;

    fn template(text: &str) -> Template {
        Template::parse(text).unwrap()
    }

    #[test]
    fn variables_bind_subtrees() {
        let bindings = template("x + 0").matches(&parse("(1 + 2) + 0").unwrap()).unwrap();
        assert_eq!(bindings["x"], parse("1 + 2").unwrap());
        assert!(template("x + 0").matches(&parse("1 + 1").unwrap()).is_none());
        assert!(template("x + 0").matches(&parse("1 - 0").unwrap()).is_none());
    }

    #[test]
    fn repeated_variables_must_agree() {
        assert!(template("n + n").matches(&parse("2/3 + 2/3").unwrap()).is_some());
        assert!(template("n + n").matches(&parse("2/3 + 1/3").unwrap()).is_none());
    }

    #[test]
    fn fraction_slots_bind_parts() {
        let bindings = template("a/c + b/c").matches(&parse("1/7 + 3/7").unwrap()).unwrap();
        assert_eq!(bindings["a"], Node::int(1));
        assert_eq!(bindings["b"], Node::int(3));
        assert_eq!(bindings["c"], Node::int(7));
        assert!(template("a/c + b/c").matches(&parse("1/7 + 3/8").unwrap()).is_none());

        let bindings = template("a/c").matches(&parse("x/y").unwrap()).unwrap();
        assert_eq!(bindings["c"], Node::var("y"));
    }

    #[test]
    fn substitution() {
        let bindings = template("a/c * b").matches(&parse("3/4 * 5").unwrap()).unwrap();
        let result = template("b/c * a").substitute(&bindings).unwrap();
        assert_eq!(result, parse("5/4 * 3").unwrap());

        let bindings = template("x * 1").matches(&parse("(1 + 2) * 1").unwrap()).unwrap();
        assert_eq!(template("x").substitute(&bindings).unwrap(), parse("1 + 2").unwrap());
        assert_eq!(
            template("x/2").substitute(&bindings).unwrap_err(),
            SubstituteError::CompoundInFractionSlot("x".to_string()),
        );
    }
}
