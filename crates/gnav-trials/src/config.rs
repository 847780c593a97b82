use std::fs;
use std::path::{Path, PathBuf};

use gnav_core::errors::{serde_error, ErrorInfo, GenError};
use gnav_core::{Graph, Reward, UNLIMITED_STEPS};
use gnav_graph::default_template;
use serde::{Deserialize, Serialize};

use crate::assign::Eligibility;
use crate::sources::SourceSpec;

/// YAML-configurable parameters governing a trial generation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Nodes in every task graph.
    #[serde(default = "default_node_count")]
    pub node_count: usize,
    /// Number of subject files to generate.
    #[serde(default = "default_subjects")]
    pub subjects: usize,
    /// Reward values shared by the sources, collect-all and glyph map.
    #[serde(default = "default_reward_pool")]
    pub reward_pool: Vec<Reward>,
    /// Main-task problems per subject.
    #[serde(default = "default_main_trials")]
    pub main_trials: usize,
    /// Reward-learning problems per trial set.
    #[serde(default = "default_learn_trials")]
    pub learn_trials: usize,
    /// Number of reward-learning trial sets.
    #[serde(default = "default_learn_sets")]
    pub learn_sets: usize,
    /// Practice problems with revealed rewards (0 drops the phase).
    #[serde(default = "default_practice_trials")]
    pub practice_trials: usize,
    /// Emit the hover introduction and hover practice phases.
    #[serde(default = "default_hover")]
    pub hover: bool,
    /// Template relabeled into main and reward-learning graphs.
    #[serde(default = "default_template")]
    pub template: Graph,
    /// Reward source for main-task and practice problems.
    #[serde(default = "default_main_source")]
    pub main_source: SourceSpec,
    /// Reward source for reward-learning problems.
    #[serde(default = "default_learn_source")]
    pub learn_source: SourceSpec,
    /// Main-task eligibility rule.
    #[serde(default)]
    pub eligibility: Eligibility,
    /// Step budgets per phase.
    #[serde(default)]
    pub steps: StepBudgets,
    /// Glyph file names mapped onto reward values.
    #[serde(default = "default_glyph_pool")]
    pub glyph_pool: Vec<String>,
    /// Presentation toggles copied into every subject file.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output location and batch behaviour.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_node_count() -> usize {
    9
}

fn default_subjects() -> usize {
    10
}

fn default_reward_pool() -> Vec<Reward> {
    (-4..0).chain(1..=4).collect()
}

fn default_main_trials() -> usize {
    1
}

fn default_learn_trials() -> usize {
    5
}

fn default_learn_sets() -> usize {
    1
}

fn default_practice_trials() -> usize {
    1
}

fn default_hover() -> bool {
    true
}

fn default_main_source() -> SourceSpec {
    SourceSpec::WithoutReplacement { k: 6 }
}

fn default_learn_source() -> SourceSpec {
    SourceSpec::WithoutReplacement { k: 2 }
}

fn default_glyph_pool() -> Vec<String> {
    (1..=8).map(|i| format!("pattern_{i}.png")).collect()
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            node_count: default_node_count(),
            subjects: default_subjects(),
            reward_pool: default_reward_pool(),
            main_trials: default_main_trials(),
            learn_trials: default_learn_trials(),
            learn_sets: default_learn_sets(),
            practice_trials: default_practice_trials(),
            hover: default_hover(),
            template: default_template(),
            main_source: default_main_source(),
            learn_source: default_learn_source(),
            eligibility: Eligibility::default(),
            steps: StepBudgets::default(),
            glyph_pool: default_glyph_pool(),
            display: DisplayConfig::default(),
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Step budget per phase; -1 means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBudgets {
    /// Introduction and collect-all rings.
    #[serde(default = "unlimited")]
    pub intro: i64,
    /// Reward-learning problems.
    #[serde(default = "default_learn_steps")]
    pub learn: i64,
    /// Main, practice and hover problems.
    #[serde(default = "unlimited")]
    pub main: i64,
}

fn unlimited() -> i64 {
    UNLIMITED_STEPS
}

fn default_learn_steps() -> i64 {
    1
}

impl Default for StepBudgets {
    fn default() -> Self {
        Self {
            intro: unlimited(),
            learn: default_learn_steps(),
            main: unlimited(),
        }
    }
}

/// Presentation parameters passed through to the experiment front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Reveal edges on hover.
    #[serde(default)]
    pub hover_edges: bool,
    /// Reveal rewards on hover.
    #[serde(default)]
    pub hover_rewards: bool,
    /// Points converted into one cent of bonus.
    #[serde(default = "default_points_per_cent")]
    pub points_per_cent: f64,
    /// Enforce each problem's step budget.
    #[serde(default = "default_true")]
    pub use_n_steps: bool,
    /// Vary transition structure between trials.
    #[serde(default)]
    pub vary_transition: bool,
    /// Rewards are fixed per glyph.
    #[serde(default = "default_true")]
    pub fixed_rewards: bool,
}

fn default_points_per_cent() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hover_edges: false,
            hover_rewards: false,
            points_per_cent: default_points_per_cent(),
            use_n_steps: true,
            vary_transition: false,
            fixed_rewards: true,
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed; subject `i` draws from substream `i`.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
        }
    }
}

/// Output directory and batch failure handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `<subject>.json`. Created if missing.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    /// Abort the batch on the first failed subject.
    #[serde(default)]
    pub fail_fast: bool,
    /// Worker threads used for subject generation.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("static/json/config")
}

fn default_parallelism() -> usize {
    1
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            fail_fast: false,
            parallelism: default_parallelism(),
        }
    }
}

fn config_error(code: &str, message: &str) -> GenError {
    GenError::Config(ErrorInfo::new(code, message))
}

impl TrialConfig {
    /// Loads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, GenError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            serde_error("config-read", err).with_context("path", path.display())
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parses a YAML document; an empty document yields the defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, GenError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|err| serde_error("config-yaml", err))
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml_string(&self) -> Result<String, GenError> {
        serde_yaml::to_string(self).map_err(|err| serde_error("config-yaml", err))
    }

    /// Checks values that would make every subject fail.
    pub fn validate(&self) -> Result<(), GenError> {
        if self.node_count == 0 {
            return Err(config_error("node-count", "node_count must be positive"));
        }
        if self.template.is_empty() {
            return Err(config_error("template", "template needs a root node"));
        }
        if self.template.len() > self.node_count {
            return Err(GenError::Config(
                ErrorInfo::new("template", "template has more nodes than node_count")
                    .with_context("template", self.template.len())
                    .with_context("node_count", self.node_count),
            ));
        }
        if self.reward_pool.is_empty() {
            return Err(config_error("reward-pool", "reward_pool is empty"));
        }
        let mut glyphs = self.glyph_pool.clone();
        glyphs.sort();
        glyphs.dedup();
        if glyphs.len() != self.glyph_pool.len() {
            return Err(config_error("glyph-pool", "glyph_pool contains duplicates"));
        }
        if self.output.parallelism == 0 {
            return Err(config_error("parallelism", "output.parallelism must be positive"));
        }
        for (phase, spec) in [("main", &self.main_source), ("learn", &self.learn_source)] {
            spec.build(&self.reward_pool)
                .map_err(|err| err.with_context("phase", phase))?;
        }
        Ok(())
    }
}
