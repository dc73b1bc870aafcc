//! Core types for the strand string dataflow engine.
//!
//! This crate provides the data model shared by the whole workspace:
//!
//! - [`Graph`] / [`Node`] - the keyed node collection and its invariants
//! - [`Value`] - the single-or-multi output sum type cached in nodes
//! - [`StringOp`] / [`OperationRegistry`] - named string operations and
//!   the process-wide registry, pre-seeded with the built-ins
//! - [`GraphError`] - the error taxonomy surfaced to callers
//!
//! Evaluation lives in `strand-exec`; document parsing and the compiled
//! facade live in `strand-serde`.

mod error;
mod graph;
mod node;
mod ops;
mod reference;
mod registry;
mod value;

pub use error::{GraphError, OpError};
pub use graph::Graph;
pub use node::{Node, NodeKind, NodeState, IDENTITY_OP};
pub use ops::register_builtins;
pub use reference::{base_id, parse_reference, Reference};
pub use registry::{OperationRegistry, StringOp};
pub use value::Value;
