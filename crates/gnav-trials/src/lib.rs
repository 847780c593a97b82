#![deny(missing_docs)]
#![doc = "Reward policies, trial set composition and batch output for graph-navigation experiments."]

pub mod assign;
pub mod batch;
pub mod check;
pub mod compose;
mod config;
mod sources;

pub use assign::{Eligibility, IntroTask, LearnTask, MainTask};
pub use batch::{
    generate_subject, run_batch, subject_path, write_subject, BatchReport, SubjectReport,
    SubjectState,
};
pub use check::{check_directory, check_file, check_subject, CheckIssue, FileCheck};
pub use compose::{
    compose_subject, reward_graphics, LearnRewards, Parameters, SubjectConfig, TrialSet,
};
pub use config::{DisplayConfig, OutputConfig, SeedPolicy, StepBudgets, TrialConfig};
pub use sources::{linear_rewards, RewardSource, SampleSource, ShuffleSource, SourceSpec};
