//! Path-based access to expression trees.

use std::borrow::Cow;
use super::{Binary, FracPart, Fraction, Node, Path, Segment};

impl Node {
    /// Returns the node at the given path, or [`None`] if the path does not resolve.
    ///
    /// `num` and `den` segments resolve to virtual integer leaves, which are materialized as new
    /// [`Node::Integer`]s; they only resolve when they are the last segment of the path and the
    /// fraction part is an integer.
    pub fn get(&self, path: &Path) -> Option<Cow<'_, Node>> {
        let mut node = self;
        let mut segments = path.segments().iter();

        while let Some(segment) = segments.next() {
            match (node, segment) {
                (Node::Binary(binary), Segment::Left) => node = &binary.lhs,
                (Node::Binary(binary), Segment::Right) => node = &binary.rhs,
                (Node::Fraction(frac), Segment::Num | Segment::Den) => {
                    if segments.next().is_some() {
                        return None;
                    }

                    let part = if *segment == Segment::Num { &frac.numerator } else { &frac.denominator };
                    return part.as_int().map(|n| Cow::Owned(Node::Integer(n.clone())));
                },
                _ => return None,
            }
        }

        Some(Cow::Borrowed(node))
    }

    /// Returns a new tree where the node at the given path is replaced with `replacement`. Every
    /// ancestor along the path is rebuilt; all other subtrees are carried over unchanged.
    ///
    /// Returns [`None`] if the path does not resolve, or if it addresses a `num` / `den` slot and
    /// `replacement` is not an integer.
    pub fn replace(&self, path: &Path, replacement: Node) -> Option<Node> {
        replace_in(self, path.segments(), replacement)
    }

    /// Returns the paths of every operator slot in the tree, in in-order traversal order. Binary
    /// operations, fractions, and mixed numbers each occupy one slot; integers and variables are
    /// never counted.
    pub fn operators(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        collect_operators(self, Path::root(), &mut paths);
        paths
    }

    /// Returns the path of the `n`th operator slot (zero-based), as numbered by
    /// [`Node::operators`].
    pub fn nth_operator(&self, n: usize) -> Option<Path> {
        self.operators().into_iter().nth(n)
    }
}

fn replace_in(node: &Node, segments: &[Segment], replacement: Node) -> Option<Node> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(replacement);
    };

    match (node, segment) {
        (Node::Binary(binary), Segment::Left) => Some(Node::Binary(Binary {
            op: binary.op,
            lhs: Box::new(replace_in(&binary.lhs, rest, replacement)?),
            rhs: binary.rhs.clone(),
        })),
        (Node::Binary(binary), Segment::Right) => Some(Node::Binary(Binary {
            op: binary.op,
            lhs: binary.lhs.clone(),
            rhs: Box::new(replace_in(&binary.rhs, rest, replacement)?),
        })),
        (Node::Fraction(frac), Segment::Num | Segment::Den) if rest.is_empty() => {
            let Node::Integer(value) = replacement else {
                return None;
            };

            let mut frac: Fraction = frac.clone();
            let slot = if *segment == Segment::Num { &mut frac.numerator } else { &mut frac.denominator };
            slot.as_int()?;
            *slot = FracPart::Int(value);
            Some(Node::Fraction(frac))
        },
        _ => None,
    }
}

fn collect_operators(node: &Node, path: Path, paths: &mut Vec<Path>) {
    if let Node::Binary(binary) = node {
        collect_operators(&binary.lhs, path.child(Segment::Left), paths);
        let rhs_path = path.child(Segment::Right);
        paths.push(path);
        collect_operators(&binary.rhs, rhs_path, paths);
    } else if node.is_operator_slot() {
        paths.push(path);
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use pretty_assertions::assert_eq;
    use super::*;

    fn path(s: &str) -> Path {
        s.parse().unwrap()
    }

    #[test]
    fn get_nodes() {
        let tree = parse("(1 + 2/3) * x").unwrap();
        assert_eq!(tree.get(&Path::root()).unwrap().into_owned(), tree);
        assert_eq!(tree.get(&path("term[0].term[0]")).unwrap().into_owned(), Node::int(1));
        assert_eq!(tree.get(&path("term[0].term[1]")).unwrap().into_owned(), Node::frac(2, 3));
        assert_eq!(tree.get(&path("term[0].term[1].den")).unwrap().into_owned(), Node::int(3));
        assert_eq!(tree.get(&path("term[1]")).unwrap().into_owned(), Node::var("x"));
        assert!(tree.get(&path("term[1].term[0]")).is_none());
        assert!(tree.get(&path("term[0].term[1].den.num")).is_none());
    }

    #[test]
    fn symbolic_fraction_parts_are_not_addressable() {
        let tree = parse("a/2").unwrap();
        assert!(tree.get(&path("num")).is_none());
        assert_eq!(tree.get(&path("den")).unwrap().into_owned(), Node::int(2));
    }

    #[test]
    fn replace_rebuilds_ancestors_only() {
        let tree = parse("(1 + 2) * (3 + 4)").unwrap();
        let replaced = tree.replace(&path("term[0]"), Node::int(3)).unwrap();
        assert_eq!(replaced, parse("3 * (3 + 4)").unwrap());

        // the original is untouched
        assert_eq!(tree, parse("(1 + 2) * (3 + 4)").unwrap());
    }

    #[test]
    fn replace_fraction_slots() {
        let tree = parse("1/7 + 3/7").unwrap();
        let replaced = tree.replace(&path("term[1].num"), Node::int(5)).unwrap();
        assert_eq!(replaced, parse("1/7 + 5/7").unwrap());
        assert!(tree.replace(&path("term[1].num"), Node::var("y")).is_none());
        assert!(tree.replace(&path("term[1].term[0]"), Node::int(1)).is_none());
    }

    #[test]
    fn operator_ordinals() {
        let tree = parse("1/2 + 3 * 4/5").unwrap();
        assert_eq!(tree.operators(), vec![
            path("term[0]"),
            Path::root(),
            path("term[1]"),
            path("term[1].term[1]"),
        ]);
        assert_eq!(tree.nth_operator(1), Some(Path::root()));
        assert_eq!(tree.nth_operator(4), None);
        assert_eq!(parse("3").unwrap().nth_operator(0), None);
    }
}
