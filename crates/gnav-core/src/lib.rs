#![deny(missing_docs)]
#![doc = "Core types, errors and deterministic randomness shared by the graph-navigation trial generators."]

pub mod errors;
pub mod rng;
pub mod serde;
mod types;

pub use errors::{serde_error, ErrorInfo, GenError};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{Graph, NodeId, Problem, Reward, UNLIMITED_STEPS};
