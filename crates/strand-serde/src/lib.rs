//! Graph documents and the compiled-graph facade.
//!
//! This crate is the bridge between an external graph description and the
//! engine: [`NodeSpec`] / [`GraphDoc`] deserialize with serde (JSON via
//! [`doc_from_json`]), [`build_graph`] turns a document into a validated
//! [`strand_core::Graph`], and [`CompiledGraph`] bundles the built graph
//! with an executor so one parse serves many evaluations.

mod compiled;
mod doc;

pub use compiled::CompiledGraph;
pub use doc::{build_graph, doc_from_json, execute_document, GraphDoc, NodeSpec};
