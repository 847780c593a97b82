use gnav_core::rng::RngHandle;
use gnav_core::{Graph, NodeId};
use rand::Rng;

/// Builds a tree whose nodes at depth `d` all have `branching[d]` children.
///
/// Nodes deeper than the branching sequence are leaves. Ids are assigned in
/// preorder, so the root is 0 and each subtree occupies a contiguous id range.
pub fn regular_tree(branching: &[usize]) -> Graph {
    // subtree_size[d] = number of nodes in a subtree rooted at depth d
    let mut subtree_size = vec![1usize; branching.len() + 1];
    for depth in (0..branching.len()).rev() {
        subtree_size[depth] = 1 + branching[depth] * subtree_size[depth + 1];
    }

    let mut adjacency = vec![Vec::new(); subtree_size[0]];
    let mut stack: Vec<(NodeId, usize)> = vec![(0, 0)];
    while let Some((node, depth)) = stack.pop() {
        let Some(&fanout) = branching.get(depth) else {
            continue;
        };
        let stride = subtree_size[depth + 1];
        let children: Vec<NodeId> = (0..fanout).map(|k| node + 1 + k * stride).collect();
        stack.extend(children.iter().map(|child| (*child, depth + 1)));
        adjacency[node] = children;
    }
    Graph::from_adjacency(adjacency)
}

/// Single-node tree.
pub fn empty_tree() -> Graph {
    Graph::empty(1)
}

/// Joins two trees under a fresh root.
///
/// The output lists the new root (id 0), then `g1` shifted by 1, then `g2`
/// shifted by `1 + |g1|`. The root's children are the former roots of both
/// inputs. Internal edges of each input are preserved exactly.
pub fn tree_join(g1: &Graph, g2: &Graph) -> Graph {
    let n1 = g1.len();
    let shift = |graph: &Graph, offset: usize| {
        graph
            .adjacency()
            .iter()
            .map(|children| children.iter().map(|c| c + offset).collect::<Vec<_>>())
            .collect::<Vec<_>>()
    };

    let mut adjacency = Vec::with_capacity(1 + n1 + g2.len());
    adjacency.push(vec![1, 1 + n1]);
    adjacency.extend(shift(g1, 1));
    adjacency.extend(shift(g2, 1 + n1));
    Graph::from_adjacency(adjacency)
}

/// Builds a random binary tree with `splits` internal nodes.
///
/// The `splits - 1` remaining splits are divided uniformly between the left
/// and right subtree, each built independently and joined under a new root.
pub fn random_tree(splits: usize, rng: &mut RngHandle) -> Graph {
    if splits == 0 {
        return empty_tree();
    }
    let left = rng.gen_range(0..splits);
    let right = splits - 1 - left;
    let left_tree = random_tree(left, rng);
    let right_tree = random_tree(right, rng);
    tree_join(&left_tree, &right_tree)
}
