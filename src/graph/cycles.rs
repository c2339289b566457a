//! Cycle detection helpers for the component graph.
//!
//! Edges point from the declaring node to the declared component. Adding
//! `from -> to` closes a cycle if `from` is already reachable from `to`.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

/// Check whether adding `from -> to` would introduce a cycle.
///
/// Returns the node path `from -> to -> ... -> from` when it would.
/// An edge that already exists creates no new cycle.
pub fn would_create_cycle<N>(
    graph: &DiGraph<N, ()>,
    from: NodeIndex,
    to: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    if from == to {
        return Some(vec![from, from]);
    }

    if graph.contains_edge(from, to) {
        return None;
    }

    // BFS from `to` looking for `from`
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([to]);
    let mut visited: HashSet<NodeIndex> = HashSet::from([to]);
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if current == from {
            return Some(reconstruct_cycle_path(from, to, &parent));
        }

        for edge in graph.edges(current) {
            let next = edge.target();
            if visited.insert(next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Find the strongly connected components that contain a cycle.
///
/// Self-loops are reported as one-element cycles.
pub fn find_cycles<N>(graph: &DiGraph<N, ()>) -> Vec<Vec<NodeIndex>> {
    tarjan_scc(graph)
        .into_iter()
        .filter(|scc| {
            scc.len() > 1 || scc.first().is_some_and(|node| graph.find_edge(*node, *node).is_some())
        })
        .collect()
}

fn reconstruct_cycle_path(
    from: NodeIndex,
    to: NodeIndex,
    parent: &HashMap<NodeIndex, NodeIndex>,
) -> Vec<NodeIndex> {
    // Parent links walk back from `from` to `to`
    let mut to_to_from = vec![from];
    let mut cursor = from;
    while cursor != to {
        match parent.get(&cursor) {
            Some(next) => {
                cursor = *next;
                to_to_from.push(cursor);
            }
            None => break,
        }
    }
    to_to_from.reverse();

    let mut cycle = Vec::with_capacity(to_to_from.len() + 1);
    cycle.push(from);
    cycle.extend(to_to_from);
    cycle
}
