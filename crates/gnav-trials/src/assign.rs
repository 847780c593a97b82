//! Reward assignment policies, one per experiment phase.

use std::collections::BTreeSet;

use gnav_core::errors::{ErrorInfo, GenError};
use gnav_core::rng::RngHandle;
use gnav_core::{Graph, NodeId, Problem, Reward};
use gnav_graph::{ring_graph, sample_graph, SampledGraph};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::sources::RewardSource;

/// Rule deciding which nodes of a main-task graph may carry reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Eligibility {
    /// Non-leaf nodes and their children, never the start node.
    #[default]
    ExcludeStart,
    /// Every non-leaf node and its children, start included.
    IncludeStart,
}

impl Eligibility {
    /// Eligible node ids in ascending order.
    pub fn nodes(self, graph: &Graph, start: NodeId) -> Vec<NodeId> {
        let skip = |node: NodeId| self == Eligibility::ExcludeStart && node == start;
        let mut eligible = BTreeSet::new();
        for (node, children) in graph.iter() {
            if children.is_empty() || skip(node) {
                continue;
            }
            eligible.insert(node);
            eligible.extend(children.iter().copied().filter(|child| !skip(*child)));
        }
        eligible.into_iter().collect()
    }
}

fn draw_at_least(
    source: &mut dyn RewardSource,
    required: usize,
    rng: &mut RngHandle,
) -> Result<Vec<Reward>, GenError> {
    let values = source.draw(rng);
    if values.len() < required {
        return Err(GenError::Rewards(
            ErrorInfo::new("reward-count", "reward source produced too few values")
                .with_context("required", required)
                .with_context("produced", values.len()),
        ));
    }
    Ok(values[..required].to_vec())
}

/// Main task: rewards spread over the eligible nodes of a sampled graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainTask {
    /// Nodes per graph.
    pub nodes: usize,
    /// Template relabeled onto every graph.
    pub template: Graph,
    /// Step budget written into each problem.
    pub n_steps: i64,
    /// Which nodes may carry reward.
    pub eligibility: Eligibility,
}

impl MainTask {
    /// Samples a fresh graph and assigns rewards to it.
    pub fn sample(
        &self,
        source: &mut dyn RewardSource,
        rng: &mut RngHandle,
    ) -> Result<Problem, GenError> {
        let sampled = sample_graph(self.nodes, &self.template, rng)?;
        self.assign(sampled.graph, sampled.start, source, rng)
    }

    /// Assigns one draw from `source` to the eligible nodes of `graph`.
    ///
    /// Values go to eligible nodes in ascending id order; every other node,
    /// the start included, gets zero.
    pub fn assign(
        &self,
        graph: Graph,
        start: NodeId,
        source: &mut dyn RewardSource,
        rng: &mut RngHandle,
    ) -> Result<Problem, GenError> {
        let eligible = self.eligibility.nodes(&graph, start);
        let values = draw_at_least(source, eligible.len(), rng)?;
        let mut rewards = vec![0; graph.len()];
        for (node, value) in eligible.into_iter().zip(values) {
            rewards[node] = value;
        }
        Problem::new(graph, rewards, start, self.n_steps)
    }
}

/// Reward-learning task: two rewarded children directly below the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnTask {
    /// Nodes per graph.
    pub nodes: usize,
    /// Template whose root must keep two children.
    pub template: Graph,
    /// Step budget written into each problem.
    pub n_steps: i64,
}

impl LearnTask {
    /// Samples a graph from the template and assigns rewards to it.
    pub fn sample(
        &self,
        source: &mut dyn RewardSource,
        rng: &mut RngHandle,
    ) -> Result<Problem, GenError> {
        let sampled = sample_graph(self.nodes, &self.template, rng)?;
        self.assign(sampled, source, rng)
    }

    /// Puts the first two drawn values on the start node's first two children.
    pub fn assign(
        &self,
        sampled: SampledGraph,
        source: &mut dyn RewardSource,
        rng: &mut RngHandle,
    ) -> Result<Problem, GenError> {
        let SampledGraph { graph, start, .. } = sampled;
        let children = graph.children(start);
        if children.len() < 2 {
            return Err(GenError::Template(
                ErrorInfo::new("start-children", "start node needs at least two children")
                    .with_context("start", start)
                    .with_context("children", children.len()),
            ));
        }
        let (first, second) = (children[0], children[1]);
        let values = draw_at_least(source, 2, rng)?;
        let mut rewards = vec![0; graph.len()];
        rewards[first] = values[0];
        rewards[second] = values[1];
        Problem::new(graph, rewards, start, self.n_steps)
    }
}

/// Introduction and collect-all phases on the fixed ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroTask {
    /// Ring size.
    pub nodes: usize,
    /// Step budget written into each problem.
    pub n_steps: i64,
}

impl IntroTask {
    /// Fits `rewards` to the ring size, then shuffles them onto the nodes.
    ///
    /// Short lists are padded with zeros and long lists truncated before the
    /// shuffle. The start node is always 0.
    pub fn assign(
        &self,
        mut rewards: Vec<Reward>,
        rng: &mut RngHandle,
    ) -> Result<Problem, GenError> {
        let graph = ring_graph(self.nodes)?;
        rewards.resize(self.nodes, 0);
        rewards.shuffle(rng);
        Problem::new(graph, rewards, 0, self.n_steps)
    }

    /// Ring with every reward zero.
    pub fn blank(&self, rng: &mut RngHandle) -> Result<Problem, GenError> {
        self.assign(Vec::new(), rng)
    }
}
