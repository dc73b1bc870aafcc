//! Nodes of the string computation graph.

use crate::value::Value;

/// Operation name carried by non-operation nodes.
pub const IDENTITY_OP: &str = "identity";

/// How a node's value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Fixed value supplied at construction time.
    Constant,
    /// Runtime input, bound per evaluation.
    Placeholder,
    /// Initialized once for the graph's lifetime.
    Variable,
    /// Computed by a registered operation.
    Operation,
}

/// Computation state of a node within an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeState {
    /// Not computed yet.
    Pending,
    /// Result is cached and readable.
    Computed,
}

/// A node in the computation graph.
///
/// The descriptive fields (`id`, `kind`, `op_name`, `inputs`, `constants`,
/// `initial_value`) are plain data fixed at construction; the cache slot and
/// state are managed by the executor through [`Node::commit`] and
/// [`Node::reset`].
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier. Non-empty and colon-free.
    pub id: String,
    /// How the value is produced.
    pub kind: NodeKind,
    /// Operation name; `"identity"` for non-operation nodes.
    pub op_name: String,
    /// Input references (`"id"` or `"id:k"`), in operation argument order.
    pub inputs: Vec<String>,
    /// Constant arguments passed to the operation after the inputs.
    pub constants: Vec<String>,
    /// Seed value for constants and variables.
    pub initial_value: Option<String>,
    state: NodeState,
    result: Option<Value>,
}

impl Node {
    fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            op_name: IDENTITY_OP.to_string(),
            inputs: Vec::new(),
            constants: Vec::new(),
            initial_value: None,
            state: NodeState::Pending,
            result: None,
        }
    }

    /// A constant node with a fixed value.
    pub fn constant(id: impl Into<String>, value: impl Into<String>) -> Self {
        let mut node = Self::new(id, NodeKind::Constant);
        node.initial_value = Some(value.into());
        node
    }

    /// A placeholder node, bound from the per-evaluation bindings map.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Placeholder)
    }

    /// A variable node, optionally seeded with an initial value.
    pub fn variable(id: impl Into<String>, initial_value: Option<String>) -> Self {
        let mut node = Self::new(id, NodeKind::Variable);
        node.initial_value = initial_value;
        node
    }

    /// An operation node applying `op_name` to its inputs and constants.
    pub fn operation(
        id: impl Into<String>,
        op_name: impl Into<String>,
        inputs: Vec<String>,
        constants: Vec<String>,
    ) -> Self {
        let mut node = Self::new(id, NodeKind::Operation);
        node.op_name = op_name.into();
        node.inputs = inputs;
        node.constants = constants;
        node
    }

    /// Current computation state.
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// `true` once a result has been committed.
    pub fn is_computed(&self) -> bool {
        self.state == NodeState::Computed
    }

    /// The cached result, if computed.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Store a result and mark the node computed.
    pub fn commit(&mut self, value: Value) {
        self.result = Some(value);
        self.state = NodeState::Computed;
    }

    /// Clear the cache slot and return the node to pending.
    pub fn reset(&mut self) {
        self.result = None;
        self.state = NodeState::Pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_carries_value() {
        let node = Node::constant("a", "hello");
        assert_eq!(node.kind, NodeKind::Constant);
        assert_eq!(node.op_name, IDENTITY_OP);
        assert_eq!(node.initial_value.as_deref(), Some("hello"));
        assert_eq!(node.state(), NodeState::Pending);
    }

    #[test]
    fn test_operation_carries_arguments() {
        let node = Node::operation(
            "out",
            "concat",
            vec!["a".into(), "b:1".into()],
            vec!["!".into()],
        );
        assert_eq!(node.kind, NodeKind::Operation);
        assert_eq!(node.inputs, vec!["a".to_string(), "b:1".to_string()]);
        assert_eq!(node.constants, vec!["!".to_string()]);
        assert!(node.initial_value.is_none());
    }

    #[test]
    fn test_commit_and_reset() {
        let mut node = Node::placeholder("x");
        assert!(!node.is_computed());

        node.commit(Value::from("fed"));
        assert!(node.is_computed());
        assert_eq!(node.result().and_then(Value::as_single), Some("fed"));

        node.reset();
        assert!(!node.is_computed());
        assert!(node.result().is_none());
    }
}
