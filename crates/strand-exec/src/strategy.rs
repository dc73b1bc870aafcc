//! Strategy selection policy.
//!
//! `evaluate_auto` measures the subgraph reachable from the target and picks
//! a strategy from its shape: small shallow graphs go to the recursive
//! walker, large wide graphs to the layered worker pool when one is
//! compiled in, everything else to the iterative scheduler.

/// Maximum dependency depth the recursive strategy is trusted with.
pub const RECURSIVE_DEPTH_LIMIT: usize = 100;

/// Maximum reachable node count for the recursive strategy.
pub const RECURSIVE_NODE_LIMIT: usize = 500;

/// Minimum reachable node count before parallel dispatch pays off.
pub const PARALLEL_MIN_NODES: usize = 500;

/// Minimum widest-layer size before parallel dispatch pays off.
pub const PARALLEL_MIN_WIDTH: usize = 100;

/// Layers at least this large are dispatched to the worker pool; smaller
/// layers run serially even under `evaluate_parallel`.
pub const PARALLEL_LAYER_THRESHOLD: usize = 200;

/// An evaluation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Depth-first demand evaluation with a visiting set.
    Recursive,
    /// Kahn order over the reachable subgraph, evaluated in sequence.
    Iterative,
    /// Kahn order grouped into layers, wide layers fanned out to workers.
    Parallel,
}

/// Shape of the subgraph reachable from a target.
#[derive(Debug, Clone, Copy)]
pub struct GraphShape {
    /// Depth estimate, capped at [`RECURSIVE_DEPTH_LIMIT`] + 1.
    pub depth: usize,
    /// Reachable node count.
    pub nodes: usize,
    /// Widest layer, when it was worth computing.
    pub max_width: Option<usize>,
}

/// `true` when the worker pool is compiled in.
pub const fn parallel_available() -> bool {
    cfg!(feature = "parallel")
}

/// Picks a strategy for a subgraph of the given shape.
pub fn choose(shape: GraphShape) -> Strategy {
    if shape.depth <= RECURSIVE_DEPTH_LIMIT && shape.nodes <= RECURSIVE_NODE_LIMIT {
        return Strategy::Recursive;
    }
    if parallel_available()
        && shape.nodes >= PARALLEL_MIN_NODES
        && shape.max_width.is_some_and(|w| w >= PARALLEL_MIN_WIDTH)
    {
        return Strategy::Parallel;
    }
    Strategy::Iterative
}
