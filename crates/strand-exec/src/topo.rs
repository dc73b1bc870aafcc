//! Topological analysis shared by the evaluation strategies.
//!
//! Everything here works on the subgraph reachable from a target and is
//! careful to stay off the program stack: deep graphs are walked with
//! explicit work lists.

use std::collections::{HashMap, HashSet, VecDeque};

use strand_core::{base_id, Graph, GraphError};

/// Node ids reachable from `start` by following input references.
///
/// References are followed through their base id (any `:k` suffix is
/// stripped); already-seen ids terminate the walk.
pub fn reachable_from(graph: &Graph, start: &str) -> Result<HashSet<String>, GraphError> {
    let mut seen = HashSet::new();
    let mut stack = vec![start.to_string()];

    while let Some(id) = stack.pop() {
        if seen.contains(&id) {
            continue;
        }
        let node = graph.node(&id)?;
        for raw in &node.inputs {
            let base = base_id(raw);
            if !seen.contains(base) {
                stack.push(base.to_string());
            }
        }
        seen.insert(id);
    }
    Ok(seen)
}

/// Topological order of `set` by Kahn's algorithm.
///
/// Seeds a FIFO queue with zero-in-degree nodes and decrements successors.
/// If the produced order is shorter than the set, some node kept a positive
/// in-degree, which means a cycle; the error names one such node.
pub fn kahn_order(graph: &Graph, set: &HashSet<String>) -> Result<Vec<String>, GraphError> {
    let mut in_degree: HashMap<String, usize> = set.iter().map(|id| (id.clone(), 0)).collect();
    let mut successors: HashMap<String, Vec<String>> = HashMap::new();

    for id in set {
        for raw in &graph.node(id)?.inputs {
            let from = base_id(raw);
            if !set.contains(from) {
                continue;
            }
            successors.entry(from.to_string()).or_default().push(id.clone());
            *in_degree.get_mut(id).unwrap() += 1;
        }
    }

    let mut queue: VecDeque<String> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| id.clone())
        .collect();
    let mut order = Vec::with_capacity(set.len());

    while let Some(id) = queue.pop_front() {
        if let Some(next) = successors.get(&id) {
            for succ in next {
                let degree = in_degree.get_mut(succ).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(succ.clone());
                }
            }
        }
        order.push(id);
    }

    if order.len() != set.len() {
        let stuck = in_degree
            .iter()
            .filter(|(_, degree)| **degree > 0)
            .map(|(id, _)| id.clone())
            .min()
            .unwrap_or_default();
        return Err(GraphError::Cycle(stuck));
    }
    Ok(order)
}

/// Groups a topological order into layers of mutually independent nodes.
///
/// A node's level is `1 + max(level of its inputs)`, with sources at level
/// 0; one pass over the order suffices because inputs precede consumers.
pub fn partition_layers(graph: &Graph, order: &[String]) -> Result<Vec<Vec<String>>, GraphError> {
    let mut levels: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    let mut layers: Vec<Vec<String>> = Vec::new();

    for id in order {
        let node = graph.node(id)?;
        let mut level = 0;
        for raw in &node.inputs {
            if let Some(input_level) = levels.get(base_id(raw)) {
                level = level.max(input_level + 1);
            }
        }
        levels.insert(id, level);
        if level >= layers.len() {
            layers.resize_with(level + 1, Vec::new);
        }
        layers[level].push(id.clone());
    }
    Ok(layers)
}

/// Longest dependency chain from `start`, in nodes, capped at `limit`.
///
/// Memoized post-order walk on an explicit stack; returns the moment any
/// node's depth reaches the cap, so pathological graphs cost no more than
/// `limit` levels of work. Nodes revisited along the current path (cycles)
/// contribute no depth here; the strategies report cycles themselves.
pub fn estimate_depth(graph: &Graph, start: &str, limit: usize) -> Result<usize, GraphError> {
    enum Phase {
        Enter,
        Exit,
    }

    let mut memo: HashMap<String, usize> = HashMap::new();
    let mut on_path: HashSet<String> = HashSet::new();
    let mut stack = vec![(start.to_string(), Phase::Enter)];

    while let Some((id, phase)) = stack.pop() {
        match phase {
            Phase::Enter => {
                if memo.contains_key(&id) || on_path.contains(&id) {
                    continue;
                }
                on_path.insert(id.clone());
                stack.push((id.clone(), Phase::Exit));
                for raw in &graph.node(&id)?.inputs {
                    let base = base_id(raw);
                    if !memo.contains_key(base) && !on_path.contains(base) {
                        stack.push((base.to_string(), Phase::Enter));
                    }
                }
            }
            Phase::Exit => {
                on_path.remove(&id);
                let mut depth = 1;
                for raw in &graph.node(&id)?.inputs {
                    if let Some(input_depth) = memo.get(base_id(raw)) {
                        depth = depth.max(input_depth + 1);
                    }
                }
                if depth >= limit {
                    return Ok(limit);
                }
                memo.insert(id, depth);
            }
        }
    }
    Ok(memo.get(start).copied().unwrap_or(1))
}
