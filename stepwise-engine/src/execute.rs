//! Execution of a chosen candidate against the tree.
//!
//! Primitives with a typed handler are always executed by that handler. Every other primitive is
//! executed by substituting its bindings into its result pattern. Either way, the result is a new
//! root or an error; a partially rewritten tree is never returned.

use crate::{
    candidate::Candidate,
    error::{EngineError, ErrorCode},
    pattern::{calc, describe, Bindings, Template},
    primitive::PrimitiveKind,
    registry::Registry,
};
use stepwise_parser::tree::{Node, Path};
use tracing::debug;

/// Executes `candidate` on `root`, returning the new root.
pub fn execute(registry: &Registry, root: &Node, candidate: &Candidate) -> Result<Node, EngineError> {
    let primitive_id = candidate.primitive_id();
    let Some(primitive) = registry.primitive(primitive_id) else {
        return Err(EngineError::new(
            ErrorCode::InvalidPrimitiveId,
            format!("no primitive `{}` in the registry", primitive_id),
        ));
    };

    let result = if let Some(kind) = PrimitiveKind::from_id(&primitive.id) {
        kind.execute(root, &candidate.target_path)?.ok_or_else(|| EngineError::new(
            ErrorCode::PrimitiveFailed,
            format!("`{}` does not apply at `{}`", primitive.id, candidate.target_path),
        ))
    } else {
        let result_pattern = candidate.result_pattern.as_ref().or(primitive.result_pattern.as_ref());
        match (result_pattern, &candidate.bindings) {
            (Some(result_pattern), Some(bindings)) => {
                substitute(root, &candidate.target_path, result_pattern, bindings)
            },
            _ => Err(EngineError::new(
                ErrorCode::UnknownPrimitive,
                format!("`{}` has neither a handler nor a result pattern with bindings", primitive.id),
            )),
        }
    };

    match &result {
        Ok(node) => debug!(candidate = %candidate.id, result = %node, "executed"),
        Err(err) => debug!(candidate = %candidate.id, %err, "execution failed"),
    }
    result
}

/// Replaces the node at `target_path` with the result pattern, instantiated with `bindings`.
fn substitute(root: &Node, target_path: &Path, result_pattern: &str, bindings: &Bindings) -> Result<Node, EngineError> {
    let failed = |detail: String| EngineError::new(ErrorCode::PrimitiveFailed, detail);

    let replacement = match calc::strip_calc(result_pattern) {
        Some(body) => calc::CalcExpr::parse(body)
            .and_then(|expr| expr.eval(bindings))
            .map(Node::Integer)
            .map_err(|err| if calc::is_division_by_zero(&err) {
                EngineError::division_by_zero()
            } else {
                failed(describe(&err))
            })?,
        None => Template::parse(result_pattern)
            .map_err(|err| failed(describe(&err)))?
            .substitute(bindings)
            .map_err(|err| failed(err.to_string()))?,
    };

    root.replace(target_path, replacement)
        .ok_or_else(|| failed(format!("cannot replace the node at `{}`", target_path)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_parser::parse;
    use crate::candidate::Readiness;
    use super::*;

    fn candidate(primitive_id: &str, path: &str, bindings: Option<Bindings>) -> Candidate {
        Candidate {
            id: format!("R.TEST:{}@{}", primitive_id, path),
            invariant_rule_id: "R.TEST".to_string(),
            invariant_set_id: "test".to_string(),
            primitive_ids: vec![primitive_id.to_string()],
            target_path: path.parse().unwrap(),
            description: String::new(),
            bindings,
            result_pattern: None,
            readiness: Readiness::Ready,
        }
    }

    fn bind(template: &str, text: &str) -> Bindings {
        Template::parse(template).unwrap().matches(&parse(text).unwrap()).unwrap()
    }

    #[test]
    fn typed_handlers() {
        let registry = Registry::builtin();
        let root = parse("1 + 2").unwrap();
        let result = execute(&registry, &root, &candidate("P.INT_ADD", "root", None)).unwrap();
        assert_eq!(result, Node::int(3));

        let root = parse("7 : 2").unwrap();
        let err = execute(&registry, &root, &candidate("P.INT_DIV_EXACT", "root", None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PrimitiveFailed);

        let root = parse("7 : 0").unwrap();
        let err = execute(&registry, &root, &candidate("P.INT_DIV_TO_FRAC", "root", None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DivisionByZero);
    }

    #[test]
    fn generic_substitution() {
        let registry = Registry::builtin();
        let root = parse("(1 + 2) + 0").unwrap();
        let bindings = bind("x + 0", "(1 + 2) + 0");
        let result = execute(&registry, &root, &candidate("P.ADD_ZERO", "root", Some(bindings))).unwrap();
        assert_eq!(result.to_string(), "1 + 2");
    }

    #[test]
    fn generic_calc() {
        let registry = Registry::builtin();
        let root = parse("1 + (3 + 3)").unwrap();
        let bindings = bind("n + n", "3 + 3");
        let result = execute(&registry, &root, &candidate("P.DOUBLE", "term[1]", Some(bindings))).unwrap();
        assert_eq!(result.to_string(), "1 + 6");
    }

    #[test]
    fn unknown_ids() {
        let registry = Registry::builtin();
        let root = parse("1 + 2").unwrap();
        let err = execute(&registry, &root, &candidate("P.NOPE", "root", None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrimitiveId);

        // a generic primitive without bindings has nothing to substitute
        let err = execute(&registry, &root, &candidate("P.ADD_ZERO", "root", None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownPrimitive);
    }

    #[test]
    fn calc_division_by_zero() {
        let json = r#"{
            "primitives": [{
                "id": "P.QUOTIENT",
                "name": "Quotient",
                "description": "Divide exactly",
                "pattern": "a : b",
                "resultPattern": "calc(a / b)"
            }],
            "invariantSets": []
        }"#;
        let registry = Registry::from_json(json).unwrap();

        let root = parse("6 : 3").unwrap();
        let result = execute(&registry, &root, &candidate("P.QUOTIENT", "root", Some(bind("a : b", "6 : 3")))).unwrap();
        assert_eq!(result, Node::int(2));

        let root = parse("6 : 0").unwrap();
        let err = execute(&registry, &root, &candidate("P.QUOTIENT", "root", Some(bind("a : b", "6 : 0")))).unwrap_err();
        assert_eq!(err.code, ErrorCode::DivisionByZero);

        let root = parse("6 : 4").unwrap();
        let err = execute(&registry, &root, &candidate("P.QUOTIENT", "root", Some(bind("a : b", "6 : 4")))).unwrap_err();
        assert_eq!(err.code, ErrorCode::PrimitiveFailed);
    }
}
