use gnav_core::errors::{ErrorInfo, GenError};
use gnav_core::rng::RngHandle;
use gnav_core::Reward;
use rand::seq::{index, SliceRandom};
use serde::{Deserialize, Serialize};

/// Produces a reward sequence on demand.
///
/// The returned slice borrows the source: it is only valid until the next
/// draw, and for [`ShuffleSource`] it is the source's own pool.
pub trait RewardSource: Send {
    /// Number of values every draw yields.
    fn draw_len(&self) -> usize;

    /// Draws the next reward sequence.
    fn draw(&mut self, rng: &mut RngHandle) -> &[Reward];
}

/// Permutes a fixed multiset in place on every draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleSource {
    pool: Vec<Reward>,
}

impl ShuffleSource {
    /// Wraps the multiset to shuffle.
    pub fn new(pool: Vec<Reward>) -> Self {
        Self { pool }
    }
}

impl RewardSource for ShuffleSource {
    fn draw_len(&self) -> usize {
        self.pool.len()
    }

    fn draw(&mut self, rng: &mut RngHandle) -> &[Reward] {
        self.pool.shuffle(rng);
        &self.pool
    }
}

/// Draws `k` distinct pool positions uniformly, leaving the pool untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSource {
    k: usize,
    pool: Vec<Reward>,
    drawn: Vec<Reward>,
}

impl SampleSource {
    /// Creates the source; `k` may not exceed the pool size.
    pub fn new(k: usize, pool: Vec<Reward>) -> Result<Self, GenError> {
        if k > pool.len() {
            return Err(GenError::Rewards(
                ErrorInfo::new("pool-too-small", "cannot sample more values than the pool holds")
                    .with_context("k", k)
                    .with_context("pool", pool.len()),
            ));
        }
        Ok(Self {
            k,
            pool,
            drawn: Vec::with_capacity(k),
        })
    }

    /// The pool values are drawn from.
    pub fn pool(&self) -> &[Reward] {
        &self.pool
    }
}

impl RewardSource for SampleSource {
    fn draw_len(&self) -> usize {
        self.k
    }

    fn draw(&mut self, rng: &mut RngHandle) -> &[Reward] {
        let picks = index::sample(rng, self.pool.len(), self.k);
        let pool = &self.pool;
        self.drawn.clear();
        self.drawn.extend(picks.into_iter().map(|idx| pool[idx]));
        &self.drawn
    }
}

/// Configuration-level choice of reward source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourceSpec {
    /// [`ShuffleSource`] over the whole reward pool.
    Shuffle,
    /// [`SampleSource`] drawing `k` values per call.
    WithoutReplacement {
        /// Values per draw.
        k: usize,
    },
}

impl SourceSpec {
    /// Instantiates the configured source over `pool`.
    pub fn build(&self, pool: &[Reward]) -> Result<Box<dyn RewardSource>, GenError> {
        match self {
            SourceSpec::Shuffle => Ok(Box::new(ShuffleSource::new(pool.to_vec()))),
            SourceSpec::WithoutReplacement { k } => {
                Ok(Box::new(SampleSource::new(*k, pool.to_vec())?))
            }
        }
    }
}

/// Symmetric reward scale `[-n/2, .., -1, 1, .., n/2]`; `n` must be even.
pub fn linear_rewards(n: usize) -> Result<Vec<Reward>, GenError> {
    if n % 2 != 0 {
        return Err(GenError::Config(
            ErrorInfo::new("odd-reward-scale", "linear reward scale needs an even size")
                .with_context("n", n),
        ));
    }
    let half = (n / 2) as Reward;
    Ok((-half..0).chain(1..=half).collect())
}
