//! Domain classification and rule matching against a semantic window.

use crate::{
    registry::{Registry, RulePattern, ScopedRule},
    window::Window,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use stepwise_parser::tree::{Binary, Node};
use tracing::{debug, trace};

/// The shape of the operands of a semantic window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Two fractions with equal denominators.
    FractionsSameDen,

    /// Two fractions with different denominators.
    FractionsDiffDen,

    /// Two integers.
    Integers,

    /// One integer and one fraction, in either order.
    Mixed,

    /// Anything else, including every window that is not a binary operation.
    Other,
}

impl Domain {
    /// Returns the kebab-case form of the domain.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FractionsSameDen => "fractions-same-den",
            Self::FractionsDiffDen => "fractions-diff-den",
            Self::Integers => "integers",
            Self::Mixed => "mixed",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fractions-same-den" => Ok(Self::FractionsSameDen),
            "fractions-diff-den" => Ok(Self::FractionsDiffDen),
            "integers" => Ok(Self::Integers),
            "mixed" => Ok(Self::Mixed),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// Classifies the operands of a window node.
pub fn classify(node: &Node) -> Domain {
    let Node::Binary(Binary { lhs, rhs, .. }) = node else {
        return Domain::Other;
    };

    match (&**lhs, &**rhs) {
        (Node::Fraction(a), Node::Fraction(b)) if a.denominator == b.denominator => Domain::FractionsSameDen,
        (Node::Fraction(_), Node::Fraction(_)) => Domain::FractionsDiffDen,
        (Node::Integer(_), Node::Integer(_)) => Domain::Integers,
        (Node::Integer(_), Node::Fraction(_)) | (Node::Fraction(_), Node::Integer(_)) => Domain::Mixed,
        _ => Domain::Other,
    }
}

impl RulePattern {
    /// Returns true if every declared constraint holds against the window node.
    ///
    /// On a window that is not a binary operation, an operator or same-denominator constraint
    /// never holds, and the fraction / integer constraints apply to the node itself.
    pub fn holds(&self, node: &Node) -> bool {
        match node {
            Node::Binary(binary) => {
                let both = |f: fn(&Node) -> bool| f(&binary.lhs) && f(&binary.rhs);
                self.operator.map_or(true, |op| op == binary.op)
                    && (!self.requires_fractions || both(|n| matches!(n, Node::Fraction(_))))
                    && (!self.requires_integers || both(|n| matches!(n, Node::Integer(_))))
                    && self.require_same_denominator.map_or(true, |same| {
                        match (&*binary.lhs, &*binary.rhs) {
                            (Node::Fraction(a), Node::Fraction(b)) => (a.denominator == b.denominator) == same,
                            _ => false,
                        }
                    })
            },
            leaf => {
                self.operator.is_none()
                    && self.require_same_denominator.is_none()
                    && (!self.requires_fractions || matches!(leaf, Node::Fraction(_)))
                    && (!self.requires_integers || matches!(leaf, Node::Integer(_)))
            },
        }
    }
}

/// Returns the rules that apply to the window, in the order given.
///
/// A rule applies if its (declared or inferred) domain equals the window's domain, and its
/// declared pattern holds. A rule with neither is structural: it always applies here, and its
/// primitives decide for themselves during candidate generation.
pub fn match_rules(registry: &Registry, window: &Window, rules: &[ScopedRule]) -> Vec<ScopedRule> {
    let domain = classify(&window.node);
    debug!(window = %window.path, %domain, "matching {} rules", rules.len());

    let matched = rules
        .iter()
        .filter(|scoped| {
            let rule = &scoped.rule;
            let domain_ok = registry.effective_domain(rule).map_or(true, |d| d == domain);
            let pattern_ok = rule.pattern.as_ref().map_or(true, |pattern| pattern.holds(&window.node));
            trace!(rule = %rule.id, domain_ok, pattern_ok);
            domain_ok && pattern_ok
        })
        .cloned()
        .collect::<Vec<_>>();

    debug!(matched = matched.len(), "rules matched");
    matched
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_parser::{parse, parser::token::op::BinOpKind, Path};
    use super::*;

    fn window(text: &str) -> Window {
        Window { path: Path::root(), node: parse(text).unwrap() }
    }

    #[test]
    fn classify_domains() {
        let cases = [
            ("1/7 + 3/7", Domain::FractionsSameDen),
            ("1/2 + 1/3", Domain::FractionsDiffDen),
            ("a/b + c/b", Domain::FractionsSameDen),
            ("1 + 2", Domain::Integers),
            ("1 + 2/3", Domain::Mixed),
            ("2/3 : 4", Domain::Mixed),
            ("x + 1", Domain::Other),
            ("(1 + 2) * 3", Domain::Other),
            ("2 1/3 + 1", Domain::Other),
            ("3", Domain::Other),
            ("3/4", Domain::Other),
        ];

        for (input, expected) in cases {
            assert_eq!(classify(&parse(input).unwrap()), expected, "input: {}", input);
        }
    }

    #[test]
    fn pattern_constraints() {
        let add_same = RulePattern {
            operator: Some(BinOpKind::Add),
            requires_fractions: true,
            require_same_denominator: Some(true),
            requires_integers: false,
        };
        assert!(add_same.holds(&parse("1/7 + 3/7").unwrap()));
        assert!(!add_same.holds(&parse("1/7 - 3/7").unwrap()));
        assert!(!add_same.holds(&parse("1/7 + 3/8").unwrap()));
        assert!(!add_same.holds(&parse("1 + 3").unwrap()));
        assert!(!add_same.holds(&parse("1/7").unwrap()));

        let ints = RulePattern { requires_integers: true, ..Default::default() };
        assert!(ints.holds(&parse("1 : 3").unwrap()));
        assert!(ints.holds(&parse("3").unwrap()));
        assert!(!ints.holds(&parse("3/1").unwrap()));
    }

    #[test]
    fn matching_is_pure_and_ordered() {
        let registry = Registry::builtin();
        let rules = registry.rules_for(&[]).unwrap();
        let window = window("1/7 + 3/7");
        let first = match_rules(&registry, &window, &rules);
        let second = match_rules(&registry, &window, &rules);
        assert_eq!(first, second);

        let positions = first
            .iter()
            .map(|m| rules.iter().position(|r| r == m).unwrap())
            .collect::<Vec<_>>();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(first.iter().any(|m| m.rule.id == "R.FRAC_ADD_SAME_DEN"));
        assert!(first.iter().all(|m| m.rule.id != "R.FRAC_SUB_SAME_DEN"));
    }
}
