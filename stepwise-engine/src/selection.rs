//! Normalization of a raw user selection into an [`Anchor`].

use serde::{Deserialize, Serialize};
use stepwise_parser::tree::{Node, Path};
use tracing::debug;

/// A raw selection, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// A path such as `term[0].num`, or `root`.
    #[serde(default, rename = "selectionPath")]
    pub path: Option<String>,

    /// A zero-based operator ordinal, counted in the order of [`Node::operators`].
    #[serde(default, rename = "operatorOrdinal")]
    pub operator_index: Option<i64>,
}

impl Selection {
    /// A selection of the given path.
    pub fn path(path: impl Into<String>) -> Self {
        Self { path: Some(path.into()), operator_index: None }
    }

    /// A selection of the `n`th operator.
    pub fn operator(n: i64) -> Self {
        Self { path: None, operator_index: Some(n) }
    }

    /// Returns true if the caller pointed at something, as opposed to leaving the selection
    /// empty.
    pub fn is_explicit(&self) -> bool {
        self.path.is_some() || self.operator_index.is_some()
    }
}

/// Whether an anchor points at an operator or at an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    Operator,
    Operand,
}

/// The normalized selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub path: Path,
    pub kind: AnchorKind,

    /// How the anchor was resolved, one line per decision.
    pub trace: Vec<String>,

    /// True if the caller pinned this exact node, through a path or an ordinal.
    pub pinned: bool,
}

impl Anchor {
    fn at(root: &Node, path: Path, mut trace: Vec<String>, pinned: bool) -> Option<Self> {
        let node = root.get(&path)?;
        let kind = if node.is_operator() { AnchorKind::Operator } else { AnchorKind::Operand };
        trace.push(format!("resolved `{}` as {:?}", path, kind));
        Some(Self { path, kind, trace, pinned })
    }
}

/// Resolves a selection against a tree. The first applicable rule wins:
///
/// 1. path `root` anchors at the root;
/// 2. any other path anchors at that path, or fails if it does not resolve;
/// 3. an operator ordinal anchors at that operator, or fails if out of range or negative;
/// 4. if the root is a binary operation, anchors at the root;
/// 5. otherwise there is no anchor.
pub fn normalize(root: &Node, selection: &Selection) -> Option<Anchor> {
    let anchor = if let Some(text) = &selection.path {
        if text.trim() == "root" {
            Anchor::at(root, Path::root(), vec!["explicit root".to_string()], true)
        } else {
            match text.parse::<Path>() {
                Ok(path) => Anchor::at(root, path, vec![format!("explicit path `{}`", text)], true),
                Err(err) => {
                    debug!(%err, "unparseable selection path");
                    None
                },
            }
        }
    } else if let Some(n) = selection.operator_index {
        usize::try_from(n)
            .ok()
            .and_then(|n| root.nth_operator(n))
            .and_then(|path| Anchor::at(root, path, vec![format!("operator #{}", n)], true))
    } else if root.is_operator() {
        Anchor::at(root, Path::root(), vec!["fallback to root operator".to_string()], false)
    } else {
        None
    };

    debug!(?anchor, "normalized selection");
    anchor
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_parser::parse;
    use super::*;

    fn anchor(text: &str, selection: Selection) -> Option<(String, AnchorKind, bool)> {
        normalize(&parse(text).unwrap(), &selection)
            .map(|anchor| (anchor.path.to_string(), anchor.kind, anchor.pinned))
    }

    #[test]
    fn explicit_root() {
        assert_eq!(anchor("3", Selection::path("root")), Some(("root".into(), AnchorKind::Operand, true)));
        assert_eq!(anchor("1 + 2", Selection::path("root")), Some(("root".into(), AnchorKind::Operator, true)));
    }

    #[test]
    fn explicit_path() {
        assert_eq!(
            anchor("3/1 + 2/5", Selection::path("term[0]")),
            Some(("term[0]".into(), AnchorKind::Operand, true)),
        );
        assert_eq!(
            anchor("(1 + 2) * 3", Selection::path("term[0]")),
            Some(("term[0]".into(), AnchorKind::Operator, true)),
        );
        assert_eq!(
            anchor("3/1 + 2/5", Selection::path("term[1].den")),
            Some(("term[1].den".into(), AnchorKind::Operand, true)),
        );
        assert_eq!(anchor("3/1 + 2/5", Selection::path("term[2]")), None);
        assert_eq!(anchor("3/1 + 2/5", Selection::path("term[0].term[0]")), None);
    }

    #[test]
    fn path_wins_over_ordinal() {
        let selection = Selection { path: Some("term[1]".into()), operator_index: Some(0) };
        assert_eq!(anchor("1 + 2", selection), Some(("term[1]".into(), AnchorKind::Operand, true)));
    }

    #[test]
    fn ordinals() {
        assert_eq!(anchor("1/2 + 3 * 4", Selection::operator(0)), Some(("term[0]".into(), AnchorKind::Operand, true)));
        assert_eq!(anchor("1/2 + 3 * 4", Selection::operator(2)), Some(("term[1]".into(), AnchorKind::Operator, true)));
        assert_eq!(anchor("1/2 + 3 * 4", Selection::operator(3)), None);
        assert_eq!(anchor("1/2 + 3 * 4", Selection::operator(-1)), None);
    }

    #[test]
    fn fallback() {
        assert_eq!(anchor("1 + 2", Selection::default()), Some(("root".into(), AnchorKind::Operator, false)));
        assert_eq!(anchor("3", Selection::default()), None);
    }
}
