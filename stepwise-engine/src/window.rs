//! Resolution of an [`Anchor`] into the semantic window rules are matched against.

use crate::selection::{Anchor, AnchorKind};
use stepwise_parser::tree::{Node, Path};
use tracing::debug;

/// The minimal subtree around an anchor that a rule can be matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub path: Path,
    pub node: Node,
}

/// Expands an anchor to its window. An operator anchor is its own window; an operand anchor's
/// window is its parent operation, or the operand itself if it has no such parent.
pub fn resolve(root: &Node, anchor: &Anchor) -> Option<Window> {
    let path = match anchor.kind {
        AnchorKind::Operator => anchor.path.clone(),
        AnchorKind::Operand => anchor.path
            .parent()
            .filter(|parent| root.get(parent).is_some_and(|node| node.is_operator()))
            .unwrap_or_else(|| anchor.path.clone()),
    };

    let node = root.get(&path)?.into_owned();
    debug!(window = %path, "resolved window");
    Some(Window { path, node })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_parser::parse;
    use crate::selection::{normalize, Selection};
    use super::*;

    fn window_path(text: &str, selection: Selection) -> String {
        let root = parse(text).unwrap();
        let anchor = normalize(&root, &selection).unwrap();
        resolve(&root, &anchor).unwrap().path.to_string()
    }

    #[test]
    fn operator_is_own_window() {
        assert_eq!(window_path("(1 + 2) * 3", Selection::path("term[0]")), "term[0]");
        assert_eq!(window_path("1 + 2", Selection::default()), "root");
    }

    #[test]
    fn operand_widens_to_parent() {
        assert_eq!(window_path("3/1 + 2/5", Selection::path("term[0]")), "root");
        assert_eq!(window_path("(1 + 2) * 3", Selection::path("term[0].term[1]")), "term[0]");
    }

    #[test]
    fn isolated_operand() {
        assert_eq!(window_path("3", Selection::path("root")), "root");

        // the parent of a virtual leaf is a fraction, not an operation
        assert_eq!(window_path("1/2 + 3", Selection::path("term[0].den")), "term[0].den");
    }
}
