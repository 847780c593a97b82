use std::collections::VecDeque;

use gnav_core::errors::{ErrorInfo, GenError};
use gnav_core::{Graph, NodeId};

/// Directed edges in `(parent, child)` form, in id then child order.
pub fn edges(graph: &Graph) -> Vec<(NodeId, NodeId)> {
    graph
        .iter()
        .flat_map(|(node, children)| children.iter().map(move |child| (node, *child)))
        .collect()
}

/// Ids of nodes without children.
pub fn leaves(graph: &Graph) -> Vec<NodeId> {
    graph
        .iter()
        .filter(|(_, children)| children.is_empty())
        .map(|(node, _)| node)
        .collect()
}

/// Number of parents of every node.
///
/// Edges pointing outside the graph are not counted.
pub fn in_degrees(graph: &Graph) -> Vec<usize> {
    let mut degrees = vec![0usize; graph.len()];
    for (_, child) in edges(graph) {
        if let Some(degree) = degrees.get_mut(child) {
            *degree += 1;
        }
    }
    degrees
}

/// Returns true when the graph has no directed cycle (Kahn's algorithm).
///
/// Dangling edges are ignored; use [`Graph::dangling_edge`] to reject them.
pub fn is_acyclic(graph: &Graph) -> bool {
    let mut degrees = in_degrees(graph);
    let mut queue: VecDeque<NodeId> = degrees
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(node, _)| node)
        .collect();
    let mut visited = 0usize;
    while let Some(node) = queue.pop_front() {
        visited += 1;
        for &child in graph.children(node) {
            let Some(degree) = degrees.get_mut(child) else {
                continue;
            };
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(child);
            }
        }
    }
    visited == graph.len()
}

/// Every path from `start` down to a leaf, listing the nodes after `start`.
///
/// A leaf start yields a single empty path.
pub fn paths_from(graph: &Graph, start: NodeId) -> Result<Vec<Vec<NodeId>>, GenError> {
    if start >= graph.len() {
        return Err(GenError::Template(
            ErrorInfo::new("start-out-of-range", "start node is not a node of the graph")
                .with_context("start", start)
                .with_context("nodes", graph.len()),
        ));
    }
    if let Some((node, child)) = graph.dangling_edge() {
        return Err(GenError::Template(
            ErrorInfo::new("dangling-edge", "edge points outside the graph")
                .with_context("node", node)
                .with_context("child", child),
        ));
    }
    if !is_acyclic(graph) {
        return Err(GenError::Template(ErrorInfo::new(
            "cyclic-graph",
            "paths are only enumerable on acyclic graphs",
        )));
    }

    let mut paths = Vec::new();
    // (node, path so far); children pushed in reverse to keep child order
    let mut stack: Vec<(NodeId, Vec<NodeId>)> = vec![(start, Vec::new())];
    while let Some((node, path)) = stack.pop() {
        let children = graph.children(node);
        if children.is_empty() {
            paths.push(path);
            continue;
        }
        for child in children.iter().rev() {
            let mut next = path.clone();
            next.push(*child);
            stack.push((*child, next));
        }
    }
    Ok(paths)
}
