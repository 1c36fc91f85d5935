use thiserror::Error;

use crate::types::Money;

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Error type for simulation setup and batch execution.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("number of simulations must be at least 1")]
    NoSimulations,
    #[error("initial investment {0} gives a base stake below 1 (investment must be at least 4)")]
    InvalidInvestment(Money),
    #[error("initial balance {0} must be a finite, non-negative amount")]
    InvalidBalance(Money),
    #[error("thread count must be at least 1")]
    NoThreads,
    #[error("unknown outcome '{0}' (expected W or L)")]
    InvalidOutcome(char),
    #[error("batch cancelled after {completed} sessions")]
    Cancelled { completed: u64 },
    #[error("simulation worker panicked")]
    WorkerPanicked,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
