//! Evaluation engine for strand graphs.
//!
//! This crate schedules and runs the evaluation of a [`strand_core::Graph`]:
//!
//! - [`Executor`] - binds a graph and evaluates target addresses
//! - four strategies behind one per-node step: recursive, iterative
//!   (Kahn order), layered-parallel, and auto-selection by graph shape
//! - [`topo`] - reachability, topological ordering, layer partitioning
//!   and depth estimation shared by the strategies
//!
//! The `parallel` feature (default-on) provides the rayon worker pool used
//! for wide layers; without it every strategy runs serially and results
//! are identical.

mod executor;
pub mod strategy;
pub mod topo;

pub use executor::{Bindings, Executor};
pub use strategy::{
    parallel_available, GraphShape, Strategy, PARALLEL_LAYER_THRESHOLD, PARALLEL_MIN_NODES,
    PARALLEL_MIN_WIDTH, RECURSIVE_DEPTH_LIMIT, RECURSIVE_NODE_LIMIT,
};
