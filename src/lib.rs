//! Monte Carlo simulation of the Labouchère staking progression.
//!
//! A session starts from a balance and a stake sequence `[u, 2u, 3u]`, and each round bets the
//! sum of the sequence's two ends on an even-money, 50/50 outcome. Wins cross both ends off,
//! losses write the lost bet onto the end. A batch plays many independent sessions and reports
//! how often they end ruined, below their starting balance, or in profit.
//!
//! ## Modules
//!
//! - `sequence`: the stake sequence and how it is built from an investment
//! - `session`: plays one session to its round cap or to ruin
//! - `statistics`: mergeable per-batch totals and the summary they reduce to
//! - `batch`: plays a batch over worker threads
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- run --investment 4000 --balance 60000 --rounds 50 --simulations 10000
//! cargo run --release -- trace --outcomes LWLLW
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod outcome;
pub mod params;
pub mod sequence;
pub mod session;
pub mod statistics;
pub mod types;

pub use batch::{run_batch, run_batch_with, BatchRunner};
pub use error::{Result, SimulationError};
pub use params::SessionParameters;
pub use session::run_session;
pub use statistics::BatchStatistics;
