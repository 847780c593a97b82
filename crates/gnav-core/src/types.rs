use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, GenError};

/// Identifier of a node: its index in the adjacency list.
pub type NodeId = usize;

/// Numeric reward attached to a node.
pub type Reward = i64;

/// Step budget meaning "no limit" in a [`Problem`].
pub const UNLIMITED_STEPS: i64 = -1;

/// Directed graph stored as one child list per node.
///
/// Graphs produced by the builders are acyclic by construction; nothing here
/// checks that at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph(Vec<Vec<NodeId>>);

impl Graph {
    /// Wraps an adjacency list without validation.
    pub fn from_adjacency(adjacency: Vec<Vec<NodeId>>) -> Self {
        Self(adjacency)
    }

    /// Graph holding `n` nodes and no edges.
    pub fn empty(n: usize) -> Self {
        Self(vec![Vec::new(); n])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Children of `node`, in stored order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.0[node]
    }

    /// Returns true when `node` has no children.
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.0[node].is_empty()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Iterates `(node, children)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(node, children)| (node, children.as_slice()))
    }

    /// Borrows the raw adjacency list.
    pub fn adjacency(&self) -> &[Vec<NodeId>] {
        &self.0
    }

    /// Consumes the graph and returns its adjacency list.
    pub fn into_adjacency(self) -> Vec<Vec<NodeId>> {
        self.0
    }

    /// Returns the first child id that does not index a node, if any.
    pub fn dangling_edge(&self) -> Option<(NodeId, NodeId)> {
        self.iter().find_map(|(node, children)| {
            children
                .iter()
                .find(|child| **child >= self.len())
                .map(|child| (node, *child))
        })
    }
}

impl Index<NodeId> for Graph {
    type Output = [NodeId];

    fn index(&self, node: NodeId) -> &Self::Output {
        &self.0[node]
    }
}

impl From<Vec<Vec<NodeId>>> for Graph {
    fn from(adjacency: Vec<Vec<NodeId>>) -> Self {
        Self(adjacency)
    }
}

/// One decision-task instance presented to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Task graph.
    pub graph: Graph,
    /// Reward per node, indexed by node id.
    pub rewards: Vec<Reward>,
    /// Node the subject starts on.
    pub start: NodeId,
    /// Step budget, [`UNLIMITED_STEPS`] for none.
    pub n_steps: i64,
}

impl Problem {
    /// Builds a problem after checking the reward length and start node.
    pub fn new(
        graph: Graph,
        rewards: Vec<Reward>,
        start: NodeId,
        n_steps: i64,
    ) -> Result<Self, GenError> {
        let problem = Self {
            graph,
            rewards,
            start,
            n_steps,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Number of nodes in the problem graph.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Returns true when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Sum of all node rewards.
    pub fn value(&self) -> Reward {
        self.rewards.iter().sum()
    }

    /// Checks the per-problem invariants that hold for every generated trial.
    pub fn validate(&self) -> Result<(), GenError> {
        let n = self.graph.len();
        if self.rewards.len() != n {
            return Err(GenError::Rewards(
                ErrorInfo::new("reward-length", "reward vector length differs from node count")
                    .with_context("nodes", n)
                    .with_context("rewards", self.rewards.len()),
            ));
        }
        if self.start >= n {
            return Err(GenError::Template(
                ErrorInfo::new("start-out-of-range", "start node is not a node of the graph")
                    .with_context("start", self.start)
                    .with_context("nodes", n),
            ));
        }
        if let Some((node, child)) = self.graph.dangling_edge() {
            return Err(GenError::Template(
                ErrorInfo::new("dangling-edge", "edge points outside the graph")
                    .with_context("node", node)
                    .with_context("child", child)
                    .with_context("nodes", n),
            ));
        }
        Ok(())
    }
}
