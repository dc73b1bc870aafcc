//! Compiled graphs: parse once, run many times.

use strand_core::{Graph, GraphError};
use strand_exec::{Bindings, Executor};

use crate::doc::{build_graph, doc_from_json, GraphDoc};

/// A graph document bound to an executor for repeated evaluation.
///
/// Construction never fails outright: a bad document yields a value whose
/// [`CompiledGraph::valid`] is false and whose `run` calls fail with
/// [`GraphError::InvalidGraph`], with the original construction error kept
/// for inspection. Variables keep their seeded values across runs on the
/// same compiled graph.
///
/// # Example
///
/// ```
/// use strand_exec::Bindings;
/// use strand_serde::CompiledGraph;
///
/// let mut compiled = CompiledGraph::from_json(
///     r#"{
///         "nodes": [
///             {"id": "x", "type": "placeholder"},
///             {"id": "y", "op": "to_upper", "inputs": ["x"]}
///         ]
///     }"#,
/// );
/// assert!(compiled.valid());
///
/// let mut bindings = Bindings::new();
/// bindings.insert("x".into(), "hello".into());
/// assert_eq!(compiled.run("y", &bindings).unwrap(), "HELLO");
/// ```
pub struct CompiledGraph {
    graph: Option<Graph>,
    error: Option<GraphError>,
}

impl CompiledGraph {
    /// Compiles a document.
    pub fn new(doc: &GraphDoc) -> Self {
        match build_graph(doc) {
            Ok(graph) => Self {
                graph: Some(graph),
                error: None,
            },
            Err(error) => Self {
                graph: None,
                error: Some(error),
            },
        }
    }

    /// Parses and compiles a JSON document.
    pub fn from_json(json: &str) -> Self {
        match doc_from_json(json) {
            Ok(doc) => Self::new(&doc),
            Err(error) => Self {
                graph: None,
                error: Some(error),
            },
        }
    }

    /// `true` when construction succeeded and the graph is runnable.
    pub fn valid(&self) -> bool {
        self.graph.is_some()
    }

    /// The construction error, when construction failed.
    pub fn error(&self) -> Option<&GraphError> {
        self.error.as_ref()
    }

    /// Read-only view of the compiled graph, when valid.
    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    /// Evaluates a target with the recursive strategy.
    pub fn run(&mut self, target: &str, bindings: &Bindings) -> Result<String, GraphError> {
        let Some(graph) = self.graph.as_mut() else {
            return Err(GraphError::InvalidGraph);
        };
        Executor::new(graph).evaluate_recursive(target, bindings)
    }

    /// Evaluates a target with automatic strategy selection.
    pub fn run_auto(&mut self, target: &str, bindings: &Bindings) -> Result<String, GraphError> {
        let Some(graph) = self.graph.as_mut() else {
            return Err(GraphError::InvalidGraph);
        };
        Executor::new(graph).evaluate_auto(target, bindings)
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("valid", &self.valid())
            .field("nodes", &self.graph.as_ref().map(Graph::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPELINE: &str = r#"{
        "nodes": [
            {"id": "greeting", "value": "hello"},
            {"id": "x", "type": "placeholder"},
            {"id": "v", "type": "variable", "value": "!"},
            {"id": "joined", "op": "concat", "inputs": ["greeting", "x", "v"], "constants": []},
            {"id": "loud", "op": "to_upper", "inputs": ["joined"]}
        ]
    }"#;

    #[test]
    fn test_run_repeatedly_with_fresh_bindings() {
        let mut compiled = CompiledGraph::from_json(PIPELINE);
        assert!(compiled.valid());
        assert!(compiled.error().is_none());

        let mut bindings = Bindings::new();
        bindings.insert("x".into(), " there".into());
        assert_eq!(compiled.run("loud", &bindings).unwrap(), "HELLO THERE!");

        bindings.insert("x".into(), " again".into());
        assert_eq!(compiled.run("loud", &bindings).unwrap(), "HELLO AGAIN!");
    }

    #[test]
    fn test_run_auto_matches_run() {
        let mut compiled = CompiledGraph::from_json(PIPELINE);
        let mut bindings = Bindings::new();
        bindings.insert("x".into(), " there".into());

        let recursive = compiled.run("loud", &bindings).unwrap();
        let auto = compiled.run_auto("loud", &bindings).unwrap();
        assert_eq!(recursive, auto);
    }

    #[test]
    fn test_invalid_document_is_constructed_but_not_runnable() {
        let mut compiled = CompiledGraph::from_json(r#"{"nodes": [{"id": "p", "type": "placeholder", "value": "x"}]}"#);
        assert!(!compiled.valid());
        assert!(matches!(compiled.error(), Some(GraphError::Construction(_))));
        assert!(compiled.graph().is_none());
        assert!(matches!(
            compiled.run("p", &Bindings::new()),
            Err(GraphError::InvalidGraph)
        ));
        assert!(matches!(
            compiled.run_auto("p", &Bindings::new()),
            Err(GraphError::InvalidGraph)
        ));
    }

    #[test]
    fn test_unparseable_json_is_not_runnable() {
        let mut compiled = CompiledGraph::from_json("not json");
        assert!(!compiled.valid());
        assert!(matches!(
            compiled.run("x", &Bindings::new()),
            Err(GraphError::InvalidGraph)
        ));
    }

    #[test]
    fn test_graph_view() {
        let compiled = CompiledGraph::from_json(PIPELINE);
        let graph = compiled.graph().unwrap();
        assert_eq!(graph.len(), 5);
        assert!(graph.contains("loud"));
    }
}
