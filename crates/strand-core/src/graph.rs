//! Graph container.
//!
//! A [`Graph`] is a keyed collection of [`Node`]s and nothing else. It is
//! append-only while being built and immutable during evaluation; executors
//! borrow it and manage the per-node cache slots.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::node::{Node, NodeKind, IDENTITY_OP};
use crate::reference::parse_reference;

/// A string computation graph: a map from node id to node.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<String, Node>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, enforcing the construction-time invariants.
    ///
    /// Ids must be unique, non-empty and colon-free. Each kind constrains
    /// the remaining fields: constants require an initial value,
    /// placeholders and operations forbid one, and only operation nodes may
    /// carry inputs or a non-identity operation name.
    pub fn insert(&mut self, node: Node) -> Result<(), GraphError> {
        if node.id.is_empty() {
            return Err(GraphError::Construction("node id must not be empty".into()));
        }
        if node.id.contains(':') {
            return Err(GraphError::Construction(format!(
                "node id '{}' must not contain ':'",
                node.id
            )));
        }
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::Construction(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }

        let complain = |reason: &str| {
            Err(GraphError::Construction(format!(
                "node '{}': {}",
                node.id, reason
            )))
        };
        match node.kind {
            NodeKind::Constant => {
                if node.initial_value.is_none() {
                    return complain("constant requires a value");
                }
                if !node.inputs.is_empty() {
                    return complain("constant takes no inputs");
                }
                if node.op_name != IDENTITY_OP {
                    return complain("constant cannot carry an operation");
                }
            }
            NodeKind::Placeholder => {
                if node.initial_value.is_some() {
                    return complain("placeholder cannot carry a value; bind it at evaluation");
                }
                if !node.inputs.is_empty() {
                    return complain("placeholder takes no inputs");
                }
                if node.op_name != IDENTITY_OP {
                    return complain("placeholder cannot carry an operation");
                }
            }
            NodeKind::Variable => {
                if !node.inputs.is_empty() {
                    return complain("variable takes no inputs");
                }
                if node.op_name != IDENTITY_OP {
                    return complain("variable cannot carry an operation");
                }
            }
            NodeKind::Operation => {
                if node.initial_value.is_some() {
                    return complain("operation cannot carry a value");
                }
            }
        }

        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Checks that every input reference of every node parses and resolves
    /// to a known node id.
    pub fn validate(&self) -> Result<(), GraphError> {
        for node in self.nodes.values() {
            for raw in &node.inputs {
                let reference = parse_reference(raw)?;
                if !self.nodes.contains_key(reference.id) {
                    return Err(GraphError::UnknownNode(reference.id.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Gets a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Gets a node by id, mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Gets a node by id, failing with [`GraphError::UnknownNode`].
    pub fn node(&self, id: &str) -> Result<&Node, GraphError> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    /// `true` if a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterates over all nodes, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut graph = Graph::new();
        graph.insert(Node::constant("a", "hello")).unwrap();
        graph
            .insert(Node::operation("b", "reverse", vec!["a".into()], vec![]))
            .unwrap();

        assert_eq!(graph.len(), 2);
        assert!(graph.contains("a"));
        assert_eq!(graph.node("b").unwrap().op_name, "reverse");
        assert!(matches!(graph.node("c"), Err(GraphError::UnknownNode(id)) if id == "c"));
    }

    #[test]
    fn test_rejects_bad_ids() {
        let mut graph = Graph::new();
        assert!(matches!(
            graph.insert(Node::constant("", "x")),
            Err(GraphError::Construction(_))
        ));
        assert!(matches!(
            graph.insert(Node::constant("a:b", "x")),
            Err(GraphError::Construction(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let mut graph = Graph::new();
        graph.insert(Node::constant("a", "x")).unwrap();
        let err = graph.insert(Node::placeholder("a")).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_kind_invariants() {
        let mut graph = Graph::new();

        // Placeholder with a value.
        let mut bad = Node::placeholder("p");
        bad.initial_value = Some("x".into());
        assert!(matches!(
            graph.insert(bad),
            Err(GraphError::Construction(_))
        ));

        // Constant without a value.
        let mut bad = Node::constant("c", "x");
        bad.initial_value = None;
        assert!(matches!(
            graph.insert(bad),
            Err(GraphError::Construction(_))
        ));

        // Operation with a value.
        let mut bad = Node::operation("o", "concat", vec![], vec![]);
        bad.initial_value = Some("x".into());
        assert!(matches!(
            graph.insert(bad),
            Err(GraphError::Construction(_))
        ));

        // Variable with inputs.
        let mut bad = Node::variable("v", Some("x".into()));
        bad.inputs.push("c".into());
        assert!(matches!(
            graph.insert(bad),
            Err(GraphError::Construction(_))
        ));
    }

    #[test]
    fn test_validate_resolves_references() {
        let mut graph = Graph::new();
        graph.insert(Node::constant("a", "hello")).unwrap();
        graph
            .insert(Node::operation("b", "reverse", vec!["a".into()], vec![]))
            .unwrap();
        graph.validate().unwrap();

        graph
            .insert(Node::operation("c", "reverse", vec!["ghost".into()], vec![]))
            .unwrap();
        assert!(matches!(
            graph.validate(),
            Err(GraphError::UnknownNode(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_validate_rejects_malformed_reference() {
        let mut graph = Graph::new();
        graph.insert(Node::constant("a", "hello")).unwrap();
        graph
            .insert(Node::operation("b", "reverse", vec!["a:x".into()], vec![]))
            .unwrap();
        assert!(matches!(
            graph.validate(),
            Err(GraphError::Addressing { .. })
        ));
    }
}
