//! Error types for strand-core.

use thiserror::Error;

/// Error raised inside an operation callback.
///
/// Operations only know about their own inputs and constants, so this type
/// carries a message and nothing else. The executor wraps it into
/// [`GraphError::OperationContract`] together with the node and operation
/// name before surfacing it to the caller.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct OpError(String);

impl OpError {
    /// Create a new operation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur while building or evaluating a graph.
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    /// Malformed node spec, contradictory fields, duplicate id or missing
    /// target in a graph document.
    #[error("graph construction failed: {0}")]
    Construction(String),

    /// An input reference or target names a node id that does not exist.
    #[error("node not found: '{0}'")]
    UnknownNode(String),

    /// The referenced operation name is not in the registry.
    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),

    /// An operation callback failed or rejected its inputs.
    #[error("operation '{op}' failed on node '{node}': {reason}")]
    OperationContract {
        /// Node being evaluated.
        node: String,
        /// Operation name.
        op: String,
        /// Failure reason reported by the callback.
        reason: String,
    },

    /// A placeholder has no entry in the bindings map.
    #[error("no binding for placeholder '{0}'")]
    MissingBinding(String),

    /// A variable was demanded but never received a value.
    #[error("variable '{0}' has no value")]
    UninitializedVariable(String),

    /// The evaluated subgraph is not acyclic.
    #[error("cycle detected involving node '{0}'")]
    Cycle(String),

    /// Wrong use of the `id:k` output addressing syntax.
    #[error("bad address '{reference}': {reason}")]
    Addressing {
        /// The offending reference or target address.
        reference: String,
        /// What was wrong with it.
        reason: String,
    },

    /// `run` was called on a compiled graph whose construction failed.
    #[error("graph failed to compile and cannot be run")]
    InvalidGraph,
}
