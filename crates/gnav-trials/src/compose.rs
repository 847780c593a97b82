//! Per-subject trial set assembly.

use std::collections::{BTreeMap, BTreeSet};

use gnav_core::errors::{ErrorInfo, GenError};
use gnav_core::rng::RngHandle;
use gnav_core::{Problem, Reward};
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::assign::{IntroTask, LearnTask, MainTask};
use crate::config::{DisplayConfig, TrialConfig};
use crate::sources::RewardSource;

/// Reward-learning phase: one or more batches of problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnRewards {
    /// Batches presented in order.
    pub trial_sets: Vec<Vec<Problem>>,
}

/// Problems of every phase for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSet {
    /// Ring with no rewards.
    pub intro: Problem,
    /// Ring carrying the whole reward pool.
    pub collect_all: Problem,
    /// Two-choice reward-learning problems.
    pub learn_rewards: LearnRewards,
    /// Practice problems with rewards shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_revealed: Option<Vec<Problem>>,
    /// Problem introducing hover reveal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_hover: Option<Problem>,
    /// Practice problems under hover reveal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_hover: Option<Vec<Problem>>,
    /// Scored main-task problems.
    pub main: Vec<Problem>,
}

impl TrialSet {
    /// Every problem labelled by phase, in document order.
    pub fn phases(&self) -> Vec<(String, &Problem)> {
        let mut out = vec![
            ("intro".to_string(), &self.intro),
            ("collect_all".to_string(), &self.collect_all),
        ];
        for (set, problems) in self.learn_rewards.trial_sets.iter().enumerate() {
            label_list(&mut out, &format!("learn_rewards[{set}]"), problems);
        }
        if let Some(problems) = &self.practice_revealed {
            label_list(&mut out, "practice_revealed", problems);
        }
        if let Some(problem) = &self.intro_hover {
            out.push(("intro_hover".to_string(), problem));
        }
        if let Some(problems) = &self.practice_hover {
            label_list(&mut out, "practice_hover", problems);
        }
        label_list(&mut out, "main", &self.main);
        out
    }

    /// Phases whose graphs come from the tree template rather than the ring.
    pub fn template_phases(&self) -> impl Iterator<Item = (String, &Problem)> {
        self.phases()
            .into_iter()
            .filter(|(label, _)| label != "intro" && label != "collect_all")
    }
}

fn label_list<'a>(out: &mut Vec<(String, &'a Problem)>, name: &str, problems: &'a [Problem]) {
    out.extend(
        problems
            .iter()
            .enumerate()
            .map(|(i, p)| (format!("{name}[{i}]"), p)),
    );
}

/// Presentation parameters read by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Glyph shown for each reward value.
    #[serde(rename = "rewardGraphics")]
    pub reward_graphics: BTreeMap<Reward, String>,
    /// Reveal edges on hover.
    pub hover_edges: bool,
    /// Reveal rewards on hover.
    pub hover_rewards: bool,
    /// Points converted into one cent of bonus.
    pub points_per_cent: f64,
    /// Enforce step budgets.
    pub use_n_steps: bool,
    /// Vary transition structure between trials.
    pub vary_transition: bool,
    /// Rewards are fixed per glyph.
    pub fixed_rewards: bool,
}

impl Parameters {
    /// Combines a glyph map with the display toggles.
    pub fn new(reward_graphics: BTreeMap<Reward, String>, display: &DisplayConfig) -> Self {
        Self {
            reward_graphics,
            hover_edges: display.hover_edges,
            hover_rewards: display.hover_rewards,
            points_per_cent: display.points_per_cent,
            use_n_steps: display.use_n_steps,
            vary_transition: display.vary_transition,
            fixed_rewards: display.fixed_rewards,
        }
    }
}

/// Complete document written for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectConfig {
    /// Presentation parameters.
    pub parameters: Parameters,
    /// Problems grouped by phase.
    pub trials: TrialSet,
}

/// Maps each distinct reward value to its own glyph drawn without replacement.
pub fn reward_graphics(
    rewards: &[Reward],
    glyph_pool: &[String],
    rng: &mut RngHandle,
) -> Result<BTreeMap<Reward, String>, GenError> {
    let values: BTreeSet<Reward> = rewards.iter().copied().collect();
    if values.len() > glyph_pool.len() {
        return Err(GenError::Rewards(
            ErrorInfo::new("glyph-pool-too-small", "fewer glyphs than distinct rewards")
                .with_context("rewards", values.len())
                .with_context("glyphs", glyph_pool.len()),
        ));
    }
    let picks = index::sample(rng, glyph_pool.len(), values.len());
    Ok(values
        .into_iter()
        .zip(picks)
        .map(|(value, idx)| (value, glyph_pool[idx].clone()))
        .collect())
}

fn in_phase<T>(phase: &str, result: Result<T, GenError>) -> Result<T, GenError> {
    result.map_err(|err| err.with_context("phase", phase))
}

fn batch(
    phase: &str,
    count: usize,
    mut next: impl FnMut() -> Result<Problem, GenError>,
) -> Result<Vec<Problem>, GenError> {
    (0..count)
        .map(|trial| {
            next().map_err(|err| err.with_context("phase", phase).with_context("trial", trial))
        })
        .collect()
}

fn main_batch(
    task: &MainTask,
    phase: &str,
    count: usize,
    source: &mut dyn RewardSource,
    rng: &mut RngHandle,
) -> Result<Vec<Problem>, GenError> {
    batch(phase, count, || task.sample(source, rng))
}

/// Builds the full document for one subject from its own RNG substream.
///
/// Phases draw from the one `rng` in a fixed order. Any failure
/// aborts the subject; the error context names the phase.
pub fn compose_subject(
    config: &TrialConfig,
    rng: &mut RngHandle,
) -> Result<SubjectConfig, GenError> {
    let graphics = in_phase(
        "parameters",
        reward_graphics(&config.reward_pool, &config.glyph_pool, rng),
    )?;
    let parameters = Parameters::new(graphics, &config.display);

    let ring = IntroTask {
        nodes: config.node_count,
        n_steps: config.steps.intro,
    };
    let intro = in_phase("intro", ring.blank(rng))?;
    let collect_all = in_phase("collect_all", ring.assign(config.reward_pool.clone(), rng))?;

    let learn = LearnTask {
        nodes: config.node_count,
        template: config.template.clone(),
        n_steps: config.steps.learn,
    };
    let mut learn_source = in_phase(
        "learn_rewards",
        config.learn_source.build(&config.reward_pool),
    )?;
    let mut trial_sets = Vec::with_capacity(config.learn_sets);
    for _ in 0..config.learn_sets {
        trial_sets.push(batch("learn_rewards", config.learn_trials, || {
            learn.sample(learn_source.as_mut(), rng)
        })?);
    }

    let task = MainTask {
        nodes: config.node_count,
        template: config.template.clone(),
        n_steps: config.steps.main,
        eligibility: config.eligibility,
    };
    let mut source = in_phase("main", config.main_source.build(&config.reward_pool))?;
    let main = main_batch(&task, "main", config.main_trials, source.as_mut(), rng)?;
    let practice_revealed = match config.practice_trials {
        0 => None,
        count => Some(main_batch(
            &task,
            "practice_revealed",
            count,
            source.as_mut(),
            rng,
        )?),
    };
    let (intro_hover, practice_hover) = if config.hover {
        let intro_hover = main_batch(&task, "intro_hover", 1, source.as_mut(), rng)?;
        let practice_hover = main_batch(
            &task,
            "practice_hover",
            config.practice_trials,
            source.as_mut(),
            rng,
        )?;
        (intro_hover.into_iter().next(), Some(practice_hover))
    } else {
        (None, None)
    };

    Ok(SubjectConfig {
        parameters,
        trials: TrialSet {
            intro,
            collect_all,
            learn_rewards: LearnRewards { trial_sets },
            practice_revealed,
            intro_hover,
            practice_hover,
            main,
        },
    })
}
