use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gnav_trials::{linear_rewards, run_batch, BatchReport, TrialConfig};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// YAML configuration; defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory (overrides `output.directory`).
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Number of subjects (overrides `subjects`).
    #[arg(long)]
    pub subjects: Option<usize>,
    /// Master seed (overrides `seed_policy.master_seed`).
    #[arg(long)]
    pub seed: Option<u64>,
    /// Replace the reward pool with the symmetric scale of this even size.
    #[arg(long)]
    pub reward_scale: Option<usize>,
    /// Worker threads (overrides `output.parallelism`).
    #[arg(long)]
    pub parallelism: Option<usize>,
    /// Abort on the first failed subject.
    #[arg(long)]
    pub fail_fast: bool,
}

pub fn resolve_config(args: &GenerateArgs) -> Result<TrialConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => TrialConfig::load(path)?,
        None => TrialConfig::default(),
    };
    if let Some(out) = &args.out {
        config.output.directory = out.clone();
    }
    if let Some(subjects) = args.subjects {
        config.subjects = subjects;
    }
    if let Some(seed) = args.seed {
        config.seed_policy.master_seed = seed;
    }
    if let Some(size) = args.reward_scale {
        config.reward_pool = linear_rewards(size)?;
    }
    if let Some(parallelism) = args.parallelism {
        config.output.parallelism = parallelism;
    }
    config.output.fail_fast |= args.fail_fast;
    Ok(config)
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(args)?;
    let report: BatchReport = run_batch(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.failed > 0 {
        let total = report.subjects.len();
        return Err(format!("{} of {total} subjects failed", report.failed).into());
    }
    Ok(())
}
