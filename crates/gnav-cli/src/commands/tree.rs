use std::error::Error;

use clap::Args;
use gnav_core::rng::RngHandle;
use gnav_graph::{random_tree, regular_tree};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Build a random binary tree with this many splits.
    #[arg(long, conflicts_with = "branching")]
    pub random: Option<usize>,
    /// Comma separated out-degree per depth for a regular tree.
    #[arg(long, value_delimiter = ',')]
    pub branching: Vec<usize>,
    /// Seed for the random tree.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

pub fn run(args: &TreeArgs) -> Result<(), Box<dyn Error>> {
    let tree = match args.random {
        Some(splits) => random_tree(splits, &mut RngHandle::from_seed(args.seed)),
        None => regular_tree(&args.branching),
    };
    println!("{}", serde_json::to_string(&tree)?);
    Ok(())
}
