use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use crate::params::{SessionParameters, DEFAULT_SIMULATIONS};

/// Everything needed to run one batch.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub params: SessionParameters,

    /// Number of independent sessions to play
    pub num_simulations: u64,

    /// Master seed. Session `i` is played with seed `seed + i`. (None = draw one at random)
    pub seed: Option<u64>,

    /// Worker threads to spread the sessions over
    pub threads: usize,

    /// How often to log progress while the batch runs (None = never)
    pub progress_interval: Option<Duration>,

    /// Keep every session's result so it can be exported
    pub record_sessions: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            params: SessionParameters::default(),
            num_simulations: DEFAULT_SIMULATIONS,
            seed: None,
            threads: default_threads(),
            progress_interval: None,
            record_sessions: false,
        }
    }
}

pub fn default_threads() -> usize {
    thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1)
}

impl SimConfig {
    pub fn new(params: SessionParameters, num_simulations: u64) -> Self {
        Self { params, num_simulations, ..Default::default() }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}
