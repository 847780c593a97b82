use gnav_core::errors::{ErrorInfo, GenError};
use gnav_core::Graph;

/// Offsets of the two successors of every ring node.
pub const RING_OFFSETS: [usize; 2] = [1, 3];

/// Deterministic ring used by the introduction and collect-all phases.
///
/// Node `i` points at `(i + 1) mod n` and `(i + 3) mod n`. For rings too
/// small to separate the two successors the duplicate edge is dropped.
pub fn ring_graph(n: usize) -> Result<Graph, GenError> {
    if n == 0 {
        return Err(GenError::Config(ErrorInfo::new(
            "empty-ring",
            "ring graph requires at least one node",
        )));
    }
    let adjacency = (0..n)
        .map(|node| {
            let mut children = Vec::with_capacity(RING_OFFSETS.len());
            for offset in RING_OFFSETS {
                let child = (node + offset) % n;
                if !children.contains(&child) {
                    children.push(child);
                }
            }
            children
        })
        .collect();
    Ok(Graph::from_adjacency(adjacency))
}
