use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::{Outcome, OutcomeScript};

/// Supplies the result of each round to a session.
pub trait OutcomeSource {
    /// The next round result, or `None` if this source has run dry. Sessions stop playing when
    /// their source runs dry.
    fn next_outcome(&mut self) -> Option<Outcome>;
}

/// A fair, never-ending coin backed by any random number generator.
pub struct FairCoin<R: Rng> {
    rng: R,
}

impl<R: Rng> FairCoin<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl FairCoin<ChaCha8Rng> {
    /// A coin whose flips are fully determined by `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> OutcomeSource for FairCoin<R> {
    fn next_outcome(&mut self) -> Option<Outcome> {
        Some(self.rng.gen())
    }
}

/// A fixed list of outcomes, played back in order.
#[derive(Clone, Debug, Default)]
pub struct ScriptedOutcomes {
    remaining: VecDeque<Outcome>,
}

impl ScriptedOutcomes {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self { remaining: outcomes.into_iter().collect() }
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl From<OutcomeScript> for ScriptedOutcomes {
    fn from(script: OutcomeScript) -> Self {
        Self::new(script.0)
    }
}

impl OutcomeSource for ScriptedOutcomes {
    fn next_outcome(&mut self) -> Option<Outcome> {
        self.remaining.pop_front()
    }
}
