//! Utility functions for the oracle's local search moves.

use super::SubProblem;

/// Generate the `granularity` closest station nodes of every node.
///
/// Entry 0 (the depot) is left empty.
pub fn neighbor_lists(problem: &SubProblem, granularity: usize) -> Vec<Vec<usize>> {
    let n = problem.node_count();
    let mut lists = vec![Vec::new(); n];

    for (node, list) in lists.iter_mut().enumerate().skip(1) {
        let mut candidates: Vec<usize> = (1..n).filter(|&other| other != node).collect();
        // Stable sort keeps lower indices first among equal distances
        candidates.sort_by_key(|&other| problem.distance(node, other));
        candidates.truncate(granularity);
        *list = candidates;
    }

    lists
}

/// Find which route contains a specific node and its position.
pub fn find_node(routes: &[Vec<usize>], node: usize) -> Option<(usize, usize)> {
    for (r_idx, route) in routes.iter().enumerate() {
        if let Some(pos) = route.iter().position(|&n| n == node) {
            return Some((r_idx, pos));
        }
    }
    None
}

/// Predecessor of a position (the depot before the first node).
pub fn prev_node(route: &[usize], pos: usize) -> usize {
    if pos == 0 {
        0
    } else {
        route[pos - 1]
    }
}

/// Successor of a position (the depot after the last node).
pub fn next_node(route: &[usize], pos: usize) -> usize {
    if pos + 1 < route.len() {
        route[pos + 1]
    } else {
        0
    }
}

/// Cost change when removing the node at `pos`.
pub fn removal_delta(problem: &SubProblem, route: &[usize], pos: usize) -> i64 {
    let prev = prev_node(route, pos);
    let node = route[pos];
    let next = next_node(route, pos);

    problem.distance(prev, next) - problem.distance(prev, node) - problem.distance(node, next)
}

/// Cost change when inserting `node` before position `pos` (`pos == len` appends).
pub fn insertion_delta(problem: &SubProblem, route: &[usize], node: usize, pos: usize) -> i64 {
    let prev = if pos == 0 { 0 } else { route[pos - 1] };
    let next = if pos < route.len() { route[pos] } else { 0 };

    problem.distance(prev, node) + problem.distance(node, next) - problem.distance(prev, next)
}

/// Cost change when the node at `pos` is replaced by `node`.
pub fn replacement_delta(problem: &SubProblem, route: &[usize], pos: usize, node: usize) -> i64 {
    let prev = prev_node(route, pos);
    let old = route[pos];
    let next = next_node(route, pos);

    problem.distance(prev, node) + problem.distance(node, next)
        - problem.distance(prev, old)
        - problem.distance(old, next)
}
