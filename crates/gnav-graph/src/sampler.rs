use gnav_core::errors::{ErrorInfo, GenError};
use gnav_core::rng::RngHandle;
use gnav_core::{Graph, NodeId};
use rand::seq::SliceRandom;

/// Bijection between template indices and final node ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    to_final: Vec<NodeId>,
    to_template: Vec<usize>,
}

impl Permutation {
    /// Identity relabeling on `[0, n)`.
    pub fn identity(n: usize) -> Self {
        Self {
            to_final: (0..n).collect(),
            to_template: (0..n).collect(),
        }
    }

    /// Builds the permutation from the template index placed at each final position.
    pub fn from_placement(placement: Vec<usize>) -> Result<Self, GenError> {
        let n = placement.len();
        let mut to_final = vec![usize::MAX; n];
        for (position, &template) in placement.iter().enumerate() {
            if template >= n || to_final[template] != usize::MAX {
                return Err(GenError::Template(
                    ErrorInfo::new("not-a-bijection", "placement is not a permutation")
                        .with_context("position", position)
                        .with_context("template", template)
                        .with_context("size", n),
                ));
            }
            to_final[template] = position;
        }
        Ok(Self {
            to_final,
            to_template: placement,
        })
    }

    /// Number of relabeled ids.
    pub fn len(&self) -> usize {
        self.to_final.len()
    }

    /// Returns true for the permutation on the empty set.
    pub fn is_empty(&self) -> bool {
        self.to_final.is_empty()
    }

    /// Final node id assigned to a template index.
    pub fn final_of(&self, template: usize) -> NodeId {
        self.to_final[template]
    }

    /// Template index that ended up at a final node id.
    pub fn template_of(&self, node: NodeId) -> usize {
        self.to_template[node]
    }

    /// Template index to final id table.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.to_final
    }
}

/// Output of [`sample_graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledGraph {
    /// Relabeled graph of the requested size.
    pub graph: Graph,
    /// Relabeling applied to the padded template.
    pub permutation: Permutation,
    /// Final id of template index 0.
    pub start: NodeId,
}

/// Default template: a root with two children, each with two leaf children.
pub fn default_template() -> Graph {
    Graph::from_adjacency(vec![vec![1, 2], vec![3, 4], vec![5, 6]])
}

/// Relabels `base` onto `n` nodes with a uniformly random permutation.
///
/// The template is padded with childless nodes up to `n`. Template index 0 is
/// the designated root and becomes `start`.
pub fn sample_graph(n: usize, base: &Graph, rng: &mut RngHandle) -> Result<SampledGraph, GenError> {
    check_template(n, base)?;
    let mut placement: Vec<usize> = (0..n).collect();
    placement.shuffle(rng);
    let permutation = Permutation::from_placement(placement)?;
    let graph = relabel(n, base, &permutation);
    let start = permutation.final_of(0);
    Ok(SampledGraph {
        graph,
        permutation,
        start,
    })
}

/// Applies `permutation` to `base` padded to `n` nodes.
pub fn relabel(n: usize, base: &Graph, permutation: &Permutation) -> Graph {
    let adjacency = (0..n)
        .map(|position| {
            let template = permutation.template_of(position);
            if template < base.len() {
                base.children(template)
                    .iter()
                    .map(|child| permutation.final_of(*child))
                    .collect()
            } else {
                Vec::new()
            }
        })
        .collect();
    Graph::from_adjacency(adjacency)
}

fn check_template(n: usize, base: &Graph) -> Result<(), GenError> {
    if n == 0 {
        return Err(GenError::Template(ErrorInfo::new(
            "empty-graph",
            "graph sampling requires at least one node",
        )));
    }
    if n < base.len() {
        return Err(GenError::Template(
            ErrorInfo::new("template-too-large", "template has more nodes than requested")
                .with_context("nodes", n)
                .with_context("template", base.len()),
        ));
    }
    if let Some((node, child)) = base.iter().find_map(|(node, children)| {
        children
            .iter()
            .find(|child| **child >= n)
            .map(|child| (node, *child))
    }) {
        return Err(GenError::Template(
            ErrorInfo::new("template-dangling", "template edge points past the padded size")
                .with_context("node", node)
                .with_context("child", child)
                .with_context("nodes", n),
        ));
    }
    Ok(())
}
