//! Graph evaluation.
//!
//! An [`Executor`] borrows one [`Graph`] and evaluates a target address
//! under one of four strategies. The strategies differ only in scheduling:
//! they share the per-node evaluation step, the prepare pass that resets
//! caches between evaluations, and the output-addressing protocol for
//! `id` / `id:k` references.
//!
//! # Example
//!
//! ```
//! use strand_core::{Graph, Node};
//! use strand_exec::{Bindings, Executor};
//!
//! let mut graph = Graph::new();
//! graph.insert(Node::constant("a", "hello")).unwrap();
//! graph
//!     .insert(Node::operation("b", "reverse", vec!["a".into()], vec![]))
//!     .unwrap();
//!
//! let mut executor = Executor::new(&mut graph);
//! let result = executor.evaluate_recursive("b", &Bindings::new()).unwrap();
//! assert_eq!(result, "olleh");
//! ```

use std::collections::{HashMap, HashSet};

use tracing::debug;

use strand_core::{
    parse_reference, Graph, GraphError, NodeKind, OperationRegistry, Value,
};

use crate::strategy::{
    self, GraphShape, Strategy, PARALLEL_MIN_NODES, RECURSIVE_DEPTH_LIMIT,
};
use crate::topo;

#[cfg(feature = "parallel")]
use crate::strategy::PARALLEL_LAYER_THRESHOLD;

/// Per-evaluation map from placeholder id to its value.
pub type Bindings = HashMap<String, String>;

/// Evaluates targets against a borrowed graph.
///
/// The executor owns no nodes; results are cached inside the graph and
/// cleared by the prepare pass at the start of every evaluation (variables
/// excepted, which keep their first seeded value for the graph's lifetime).
pub struct Executor<'g> {
    graph: &'g mut Graph,
    visiting: HashSet<String>,
}

impl<'g> Executor<'g> {
    /// Creates an executor for the given graph.
    pub fn new(graph: &'g mut Graph) -> Self {
        Self {
            graph,
            visiting: HashSet::new(),
        }
    }

    /// Read-only view of the underlying graph.
    pub fn graph(&self) -> &Graph {
        self.graph
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Depth-first demand evaluation with a visiting set for cycle
    /// detection.
    ///
    /// Uses the program stack, so graphs deeper than the auto-selection
    /// depth limit are better served by [`Executor::evaluate_iterative`].
    pub fn evaluate_recursive(
        &mut self,
        target: &str,
        bindings: &Bindings,
    ) -> Result<String, GraphError> {
        debug!(addr = target, strategy = "recursive", "evaluate");
        self.prepare();
        self.visiting.clear();
        let reference = parse_reference(target)?;
        self.eval_recursive(reference.id, bindings)?;
        resolve_address(self.graph, target)
    }

    /// Evaluates the reachable subgraph in Kahn order, one node at a time.
    pub fn evaluate_iterative(
        &mut self,
        target: &str,
        bindings: &Bindings,
    ) -> Result<String, GraphError> {
        debug!(addr = target, strategy = "iterative", "evaluate");
        self.prepare();
        let reference = parse_reference(target)?;
        let reachable = topo::reachable_from(self.graph, reference.id)?;
        let order = topo::kahn_order(self.graph, &reachable)?;
        for id in &order {
            compute_node(self.graph, id, bindings)?;
        }
        resolve_address(self.graph, target)
    }

    /// Evaluates the reachable subgraph layer by layer.
    ///
    /// Nodes in one layer have no mutual dependencies; a layer at or above
    /// the dispatch threshold is fanned out to the worker pool, smaller
    /// layers run serially. A hard barrier separates layers: every node of
    /// level L is committed before any node of level L+1 starts. Without
    /// the `parallel` feature every layer runs serially and results are
    /// unchanged.
    pub fn evaluate_parallel(
        &mut self,
        target: &str,
        bindings: &Bindings,
    ) -> Result<String, GraphError> {
        self.prepare();
        let reference = parse_reference(target)?;
        let reachable = topo::reachable_from(self.graph, reference.id)?;
        let order = topo::kahn_order(self.graph, &reachable)?;
        let layers = topo::partition_layers(self.graph, &order)?;
        debug!(
            addr = target,
            strategy = "parallel",
            layers = layers.len(),
            "evaluate"
        );

        for layer in &layers {
            self.run_layer(layer, bindings)?;
        }
        resolve_address(self.graph, target)
    }

    /// Picks a strategy from the shape of the reachable subgraph and runs
    /// it. See [`crate::strategy::choose`] for the policy.
    pub fn evaluate_auto(
        &mut self,
        target: &str,
        bindings: &Bindings,
    ) -> Result<String, GraphError> {
        match self.planned_strategy(target)? {
            Strategy::Recursive => self.evaluate_recursive(target, bindings),
            Strategy::Iterative => self.evaluate_iterative(target, bindings),
            Strategy::Parallel => self.evaluate_parallel(target, bindings),
        }
    }

    /// The strategy [`Executor::evaluate_auto`] would pick for this target.
    pub fn planned_strategy(&self, target: &str) -> Result<Strategy, GraphError> {
        let reference = parse_reference(target)?;
        let reachable = topo::reachable_from(self.graph, reference.id)?;
        let nodes = reachable.len();
        let depth = topo::estimate_depth(self.graph, reference.id, RECURSIVE_DEPTH_LIMIT + 1)?;

        // The widest layer only matters once the node count qualifies for
        // parallel dispatch; a cyclic subgraph has no layering and falls
        // through to a strategy that will report the cycle.
        let max_width = if strategy::parallel_available() && nodes >= PARALLEL_MIN_NODES {
            match topo::kahn_order(self.graph, &reachable) {
                Ok(order) => topo::partition_layers(self.graph, &order)?
                    .iter()
                    .map(Vec::len)
                    .max(),
                Err(_) => None,
            }
        } else {
            None
        };

        let shape = GraphShape {
            depth,
            nodes,
            max_width,
        };
        let chosen = strategy::choose(shape);
        debug!(?chosen, depth, nodes, ?max_width, "strategy selected");
        Ok(chosen)
    }

    // ------------------------------------------------------------------
    // Scheduling internals
    // ------------------------------------------------------------------

    /// Resets caches for a fresh evaluation.
    ///
    /// Non-variable nodes go back to pending with cleared caches; constants
    /// are then re-seeded and marked computed. Variables are seeded the
    /// first time they are prepared and left untouched afterwards.
    fn prepare(&mut self) {
        for node in self.graph.iter_mut() {
            match node.kind {
                NodeKind::Variable => {
                    if node.result().is_none() {
                        if let Some(value) = node.initial_value.clone() {
                            node.commit(Value::Single(value));
                        }
                    }
                }
                NodeKind::Constant => {
                    node.reset();
                    if let Some(value) = node.initial_value.clone() {
                        node.commit(Value::Single(value));
                    }
                }
                NodeKind::Placeholder | NodeKind::Operation => node.reset(),
            }
        }
    }

    fn eval_recursive(&mut self, id: &str, bindings: &Bindings) -> Result<(), GraphError> {
        let node = self.graph.node(id)?;
        if node.is_computed() {
            return Ok(());
        }
        if self.visiting.contains(id) {
            return Err(GraphError::Cycle(id.to_string()));
        }
        let inputs = node.inputs.clone();
        self.visiting.insert(id.to_string());

        for raw in &inputs {
            let reference = parse_reference(raw)?;
            self.eval_recursive(reference.id, bindings)?;
        }
        compute_node(self.graph, id, bindings)?;
        self.visiting.remove(id);
        Ok(())
    }

    fn run_layer(&mut self, layer: &[String], bindings: &Bindings) -> Result<(), GraphError> {
        #[cfg(feature = "parallel")]
        {
            let pending: Vec<&str> = layer
                .iter()
                .filter(|id| self.graph.get(id).is_some_and(|n| !n.is_computed()))
                .map(String::as_str)
                .collect();

            if pending.len() >= PARALLEL_LAYER_THRESHOLD {
                use rayon::prelude::*;

                debug!(size = pending.len(), "dispatching layer to worker pool");
                let graph: &Graph = self.graph;
                let results: Vec<(&str, Result<Value, GraphError>)> = pending
                    .par_iter()
                    .map(|id| (*id, node_value(graph, id, bindings)))
                    .collect();

                // Every sibling ran to completion; commit the successes and
                // surface the first failure in layer order.
                let mut first_error = None;
                for (id, result) in results {
                    match result {
                        Ok(value) => {
                            if let Some(node) = self.graph.get_mut(id) {
                                node.commit(value);
                            }
                        }
                        Err(error) => {
                            if first_error.is_none() {
                                first_error = Some(error);
                            }
                        }
                    }
                }
                return match first_error {
                    Some(error) => Err(error),
                    None => Ok(()),
                };
            }
        }

        for id in layer {
            compute_node(self.graph, id, bindings)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Shared per-node step
// ----------------------------------------------------------------------

/// Computes and commits one node whose inputs are already computed.
fn compute_node(graph: &mut Graph, id: &str, bindings: &Bindings) -> Result<(), GraphError> {
    if graph.node(id)?.is_computed() {
        return Ok(());
    }
    let value = node_value(graph, id, bindings)?;
    if let Some(node) = graph.get_mut(id) {
        node.commit(value);
    }
    Ok(())
}

/// Produces the value of one node without committing it.
///
/// Requires every input of the node to be computed already; the strategies
/// guarantee that by scheduling inputs first.
fn node_value(graph: &Graph, id: &str, bindings: &Bindings) -> Result<Value, GraphError> {
    let node = graph.node(id)?;
    match node.kind {
        NodeKind::Constant => match &node.initial_value {
            Some(value) => Ok(Value::Single(value.clone())),
            None => Err(GraphError::Construction(format!(
                "constant '{id}' has no value"
            ))),
        },
        NodeKind::Placeholder => bindings
            .get(id)
            .map(|value| Value::Single(value.clone()))
            .ok_or_else(|| GraphError::MissingBinding(id.to_string())),
        NodeKind::Variable => match node.result() {
            Some(value) => Ok(value.clone()),
            None => Err(GraphError::UninitializedVariable(id.to_string())),
        },
        NodeKind::Operation => {
            let mut inputs = Vec::with_capacity(node.inputs.len());
            for raw in &node.inputs {
                inputs.push(resolve_address(graph, raw)?);
            }
            let input_refs: Vec<&str> = inputs.iter().map(String::as_str).collect();
            let constant_refs: Vec<&str> = node.constants.iter().map(String::as_str).collect();

            let op = OperationRegistry::global()
                .get(&node.op_name)
                .ok_or_else(|| GraphError::UnknownOperation(node.op_name.clone()))?;
            op.apply(&input_refs, &constant_refs)
                .map_err(|error| GraphError::OperationContract {
                    node: id.to_string(),
                    op: node.op_name.clone(),
                    reason: error.to_string(),
                })
        }
    }
}

/// Resolves an `id` / `id:k` address against computed caches.
///
/// A single-output cache takes no index; a multi-output cache requires an
/// in-range one. Everything else is an addressing error.
fn resolve_address(graph: &Graph, raw: &str) -> Result<String, GraphError> {
    let reference = parse_reference(raw)?;
    let node = graph.node(reference.id)?;
    let bad = |reason: String| GraphError::Addressing {
        reference: raw.to_string(),
        reason,
    };

    let Some(value) = node.result() else {
        return Err(bad(format!("node '{}' has not been computed", reference.id)));
    };
    match (value, reference.index) {
        (Value::Single(s), None) => Ok(s.clone()),
        (Value::Single(_), Some(_)) => Err(bad(format!(
            "node '{}' has a single output and takes no index",
            reference.id
        ))),
        (Value::Multi(items), Some(k)) => items.get(k).cloned().ok_or_else(|| {
            bad(format!(
                "output index {k} out of range for {} outputs",
                items.len()
            ))
        }),
        (Value::Multi(items), None) => Err(bad(format!(
            "node '{}' has {} outputs and requires an index",
            reference.id,
            items.len()
        ))),
    }
}
