#![deny(missing_docs)]

//! Trial graph construction: tree builders, the permutation-based graph
//! sampler and the fixed ring used by the introduction phases.

mod query;
mod ring;
mod sampler;
mod trees;

pub use query::{edges, in_degrees, is_acyclic, leaves, paths_from};
pub use ring::{ring_graph, RING_OFFSETS};
pub use sampler::{default_template, relabel, sample_graph, Permutation, SampledGraph};
pub use trees::{empty_tree, random_tree, regular_tree, tree_join};
