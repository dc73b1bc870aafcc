//! Serializable graph documents.
//!
//! A [`GraphDoc`] is the pre-parsed form the engine ingests: a list of node
//! specs plus an optional default target. Typed documents name their node
//! kinds explicitly; untyped documents are accepted for compatibility, with
//! `value` implying a constant and `op` implying an operation. Anything
//! contradictory is a construction error.

use serde::{Deserialize, Serialize};

use strand_core::{Graph, GraphError, Node, NodeKind};
use strand_exec::{Bindings, Executor};

/// One node of a graph document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique node id.
    pub id: String,
    /// Node kind: `constant`, `placeholder`, `variable` or `operation`.
    /// Optional for untyped documents.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Value for constants and variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Operation name for operation nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    /// Input references for operation nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<String>>,
    /// Constant arguments for operation nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<Vec<String>>,
}

/// A graph document: node specs plus an optional default target address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDoc {
    /// The nodes of the graph.
    pub nodes: Vec<NodeSpec>,
    /// Default target for one-shot execution. Accepts the legacy
    /// `target_node` spelling.
    #[serde(default, alias = "target_node", skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Parses a JSON graph document.
pub fn doc_from_json(json: &str) -> Result<GraphDoc, GraphError> {
    serde_json::from_str(json)
        .map_err(|e| GraphError::Construction(format!("invalid graph document: {e}")))
}

fn construction(id: &str, reason: &str) -> GraphError {
    GraphError::Construction(format!("node '{id}': {reason}"))
}

fn build_node(spec: &NodeSpec) -> Result<Node, GraphError> {
    let declared = match spec.kind.as_deref() {
        None => None,
        Some("constant") => Some(NodeKind::Constant),
        Some("placeholder") => Some(NodeKind::Placeholder),
        Some("variable") => Some(NodeKind::Variable),
        Some("operation") => Some(NodeKind::Operation),
        Some(other) => {
            return Err(construction(&spec.id, &format!("unknown type '{other}'")));
        }
    };

    // Untyped documents: a value means a constant, an op means an
    // operation, and neither demands an explicit type.
    let kind = match declared {
        Some(kind) => kind,
        None => {
            if spec.value.is_some() && spec.op.is_some() {
                return Err(construction(
                    &spec.id,
                    "carries both 'value' and 'op'; declare an explicit type",
                ));
            }
            if spec.value.is_some() {
                NodeKind::Constant
            } else if spec.op.is_some() {
                NodeKind::Operation
            } else {
                return Err(construction(
                    &spec.id,
                    "has neither 'value' nor 'op' and no explicit type",
                ));
            }
        }
    };

    let reject_operation_fields = |what: &str| -> Result<(), GraphError> {
        if spec.op.is_some() {
            return Err(construction(&spec.id, &format!("{what} cannot carry 'op'")));
        }
        if spec.inputs.as_ref().is_some_and(|i| !i.is_empty()) {
            return Err(construction(
                &spec.id,
                &format!("{what} cannot carry 'inputs'"),
            ));
        }
        if spec.constants.as_ref().is_some_and(|c| !c.is_empty()) {
            return Err(construction(
                &spec.id,
                &format!("{what} cannot carry 'constants'"),
            ));
        }
        Ok(())
    };

    match kind {
        NodeKind::Constant => {
            reject_operation_fields("a constant")?;
            let value = spec
                .value
                .clone()
                .ok_or_else(|| construction(&spec.id, "constant requires a 'value'"))?;
            Ok(Node::constant(&spec.id, value))
        }
        NodeKind::Placeholder => {
            reject_operation_fields("a placeholder")?;
            if spec.value.is_some() {
                return Err(construction(
                    &spec.id,
                    "placeholder cannot carry a 'value'; bind it at evaluation",
                ));
            }
            Ok(Node::placeholder(&spec.id))
        }
        NodeKind::Variable => {
            reject_operation_fields("a variable")?;
            Ok(Node::variable(&spec.id, spec.value.clone()))
        }
        NodeKind::Operation => {
            if spec.value.is_some() {
                return Err(construction(&spec.id, "operation cannot carry a 'value'"));
            }
            let op = spec
                .op
                .clone()
                .ok_or_else(|| construction(&spec.id, "operation requires an 'op'"))?;
            Ok(Node::operation(
                &spec.id,
                op,
                spec.inputs.clone().unwrap_or_default(),
                spec.constants.clone().unwrap_or_default(),
            ))
        }
    }
}

/// Builds a validated [`Graph`] from a document.
///
/// Duplicate ids, kind contradictions and unresolvable input references
/// all fail here, before any evaluation.
pub fn build_graph(doc: &GraphDoc) -> Result<Graph, GraphError> {
    let mut graph = Graph::new();
    for spec in &doc.nodes {
        graph.insert(build_node(spec)?)?;
    }
    graph.validate()?;
    Ok(graph)
}

/// Builds a document's graph and evaluates its own target once.
///
/// One-shot counterpart of [`crate::CompiledGraph`] for callers that do not
/// reuse the graph. The document must carry a target.
pub fn execute_document(doc: &GraphDoc, bindings: &Bindings) -> Result<String, GraphError> {
    let target = doc
        .target
        .clone()
        .ok_or_else(|| GraphError::Construction("document has no target".into()))?;
    let mut graph = build_graph(doc)?;
    let mut executor = Executor::new(&mut graph);
    executor.evaluate_recursive(&target, bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(json: &str) -> NodeSpec {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_typed_nodes_build() {
        let doc = GraphDoc {
            nodes: vec![
                spec(r#"{"id": "c", "type": "constant", "value": "x"}"#),
                spec(r#"{"id": "p", "type": "placeholder"}"#),
                spec(r#"{"id": "v", "type": "variable", "value": "seed"}"#),
                spec(r#"{"id": "o", "type": "operation", "op": "concat", "inputs": ["c", "p", "v"]}"#),
            ],
            target: None,
        };
        let graph = build_graph(&doc).unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get("v").unwrap().kind, NodeKind::Variable);
    }

    #[test]
    fn test_untyped_compatibility() {
        // A value implies a constant, an op implies an operation.
        let doc = GraphDoc {
            nodes: vec![
                spec(r#"{"id": "a", "value": "hello"}"#),
                spec(r#"{"id": "b", "op": "reverse", "inputs": ["a"]}"#),
            ],
            target: None,
        };
        let graph = build_graph(&doc).unwrap();
        assert_eq!(graph.get("a").unwrap().kind, NodeKind::Constant);
        assert_eq!(graph.get("b").unwrap().kind, NodeKind::Operation);
    }

    #[test]
    fn test_untyped_without_value_or_op_is_rejected() {
        let doc = GraphDoc {
            nodes: vec![spec(r#"{"id": "mystery"}"#)],
            target: None,
        };
        assert!(matches!(
            build_graph(&doc),
            Err(GraphError::Construction(_))
        ));
    }

    #[test]
    fn test_contradictions_are_rejected() {
        for node in [
            // Placeholder with a value.
            r#"{"id": "n", "type": "placeholder", "value": "x"}"#,
            // Constant without a value.
            r#"{"id": "n", "type": "constant"}"#,
            // Constant with inputs.
            r#"{"id": "n", "type": "constant", "value": "x", "inputs": ["m"]}"#,
            // Operation with a value.
            r#"{"id": "n", "type": "operation", "op": "concat", "value": "x"}"#,
            // Unknown type string.
            r#"{"id": "n", "type": "tensor"}"#,
            // Untyped with both value and op.
            r#"{"id": "n", "value": "x", "op": "concat"}"#,
        ] {
            let doc = GraphDoc {
                nodes: vec![spec(node)],
                target: None,
            };
            assert!(
                matches!(build_graph(&doc), Err(GraphError::Construction(_))),
                "expected construction error for {node}"
            );
        }
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let doc = GraphDoc {
            nodes: vec![
                spec(r#"{"id": "a", "value": "x"}"#),
                spec(r#"{"id": "a", "value": "y"}"#),
            ],
            target: None,
        };
        assert!(matches!(
            build_graph(&doc),
            Err(GraphError::Construction(_))
        ));
    }

    #[test]
    fn test_unresolved_reference_is_rejected() {
        let doc = GraphDoc {
            nodes: vec![spec(r#"{"id": "b", "op": "reverse", "inputs": ["ghost"]}"#)],
            target: None,
        };
        assert!(matches!(
            build_graph(&doc),
            Err(GraphError::UnknownNode(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_execute_document() {
        let doc = doc_from_json(
            r#"{
                "nodes": [
                    {"id": "a", "value": "hello"},
                    {"id": "b", "op": "concat", "inputs": ["a"], "constants": [" ", "world"]}
                ],
                "target": "b"
            }"#,
        )
        .unwrap();
        let result = execute_document(&doc, &Bindings::new()).unwrap();
        assert_eq!(result, "hello world");
    }

    #[test]
    fn test_execute_document_accepts_legacy_target_field() {
        let doc = doc_from_json(
            r#"{
                "nodes": [{"id": "a", "value": "hi"}],
                "target_node": "a"
            }"#,
        )
        .unwrap();
        assert_eq!(doc.target.as_deref(), Some("a"));
        assert_eq!(execute_document(&doc, &Bindings::new()).unwrap(), "hi");
    }

    #[test]
    fn test_execute_document_without_target() {
        let doc = doc_from_json(r#"{"nodes": [{"id": "a", "value": "hi"}]}"#).unwrap();
        assert!(matches!(
            execute_document(&doc, &Bindings::new()),
            Err(GraphError::Construction(_))
        ));
    }

    #[test]
    fn test_doc_from_json_rejects_garbage() {
        assert!(matches!(
            doc_from_json("{"),
            Err(GraphError::Construction(_))
        ));
        assert!(matches!(
            doc_from_json(r#"{"no_nodes": []}"#),
            Err(GraphError::Construction(_))
        ));
    }

    #[test]
    fn test_doc_roundtrip_json() {
        let doc = GraphDoc {
            nodes: vec![
                spec(r#"{"id": "a", "type": "constant", "value": "x"}"#),
                spec(r#"{"id": "b", "op": "reverse", "inputs": ["a"]}"#),
            ],
            target: Some("b".into()),
        };
        let json = serde_json::to_string(&doc).unwrap();
        let loaded = doc_from_json(&json).unwrap();
        assert_eq!(loaded.nodes.len(), 2);
        assert_eq!(loaded.target.as_deref(), Some("b"));
    }
}
