use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::SimConfig;
use crate::error::{Result, SimulationError};
use crate::outcome::{FairCoin, OutcomeSource};
use crate::params::SessionParameters;
use crate::session::{play_session, SessionResult};
use crate::statistics::{BatchAccumulator, BatchStatistics};

const SESSIONS_PER_REPORT: u64 = 1000;  // sessions to play on each thread before reporting to the mutex
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Statistics of a finished batch, plus what is needed to reproduce or export it.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub statistics: BatchStatistics,
    pub seed: u64,
    /// Every session's result in session order, if the config asked for them.
    pub sessions: Vec<SessionResult>,
    pub elapsed: Duration,
}

/// Plays the sessions of a batch spread over worker threads.
pub struct BatchRunner {
    config: SimConfig,
    cancelled: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(config: SimConfig) -> Self {
        Self { config, cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// A flag that stops the batch when set. Workers check it between sessions.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn run(&self) -> Result<BatchReport> {
        let config = &self.config;
        config.params.validate()?;
        if config.num_simulations == 0 {
            return Err(SimulationError::NoSimulations);
        }
        if config.threads == 0 {
            return Err(SimulationError::NoThreads);
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let total = config.num_simulations;
        let threads = (config.threads as u64).min(total) as usize;
        info!(sessions = total, threads, seed, params = ?config.params, "starting batch");

        let status = Arc::new(Mutex::new(vec![
            BatchAccumulator::new(config.params.initial_balance);
            threads
        ]));
        let mut thread_handles = vec![];

        for (worker, sessions) in partition(total, threads).into_iter().enumerate() {
            let status_clone = status.clone();
            let cancelled = self.cancelled.clone();
            let params = config.params;
            let record = config.record_sessions;
            thread_handles.push(thread::spawn(move || {
                play_sessions_and_report(worker, sessions, &params, seed, record, &status_clone, &cancelled)
            }));
        }

        let start_time = Instant::now();
        let mut last_report = start_time;
        while thread_handles.iter().any(|h| !h.is_finished()) {
            thread::sleep(POLL_INTERVAL);
            if let Some(interval) = config.progress_interval {
                if last_report.elapsed() >= interval {
                    last_report = Instant::now();
                    let done = merged(&status)?.sessions;
                    info!(
                        "Played {}/{} sessions, {} sessions/sec",
                        done,
                        total,
                        (done as f64 / start_time.elapsed().as_secs_f64()).round()
                    );
                }
            }
        }

        let mut sessions = vec![];
        for handle in thread_handles {
            let recorded = handle.join().map_err(|_| SimulationError::WorkerPanicked)??;
            sessions.extend(recorded);
        }

        let accumulator = merged(&status)?;
        if self.cancelled.load(Ordering::Relaxed) && accumulator.sessions < total {
            return Err(SimulationError::Cancelled { completed: accumulator.sessions });
        }

        let elapsed = start_time.elapsed();
        info!(sessions = accumulator.sessions, ?elapsed, "batch finished");
        Ok(BatchReport { statistics: accumulator.statistics(), seed, sessions, elapsed })
    }
}

/// Run a batch of `num_simulations` sessions with fresh randomness and summarize it.
pub fn run_batch(params: &SessionParameters, num_simulations: u64) -> Result<BatchStatistics> {
    BatchRunner::new(SimConfig::new(*params, num_simulations))
        .run()
        .map(|report| report.statistics)
}

/// Run a batch on the calling thread, drawing every session's rounds from one outcome source.
pub fn run_batch_with(
    params: &SessionParameters,
    num_simulations: u64,
    outcomes: &mut impl OutcomeSource,
) -> Result<BatchStatistics> {
    params.validate()?;
    if num_simulations == 0 {
        return Err(SimulationError::NoSimulations);
    }

    let mut accumulator = BatchAccumulator::new(params.initial_balance);
    for _ in 0..num_simulations {
        accumulator.record(&play_session(params, outcomes, None));
    }
    Ok(accumulator.statistics())
}

/// Split `total` sessions into `parts` contiguous ranges whose sizes differ by at most one.
fn partition(total: u64, parts: usize) -> Vec<Range<u64>> {
    let parts = parts as u64;
    let chunk = total / parts;
    let extra = total % parts;
    (0..parts)
        .map(|i| {
            let start = i * chunk + i.min(extra);
            let len = chunk + u64::from(i < extra);
            start..start + len
        })
        .collect()
}

fn merged(status: &Mutex<Vec<BatchAccumulator>>) -> Result<BatchAccumulator> {
    let slots = status.lock().map_err(|_| SimulationError::WorkerPanicked)?;
    let mut total = BatchAccumulator::new(slots[0].initial_balance());
    for slot in slots.iter() {
        total += slot;
    }
    Ok(total)
}

/// Play a range of sessions, reporting partial results into this worker's slot of `status` every
/// [SESSIONS_PER_REPORT] sessions.
fn play_sessions_and_report(
    worker: usize,
    sessions: Range<u64>,
    params: &SessionParameters,
    seed: u64,
    record: bool,
    status: &Mutex<Vec<BatchAccumulator>>,
    cancelled: &AtomicBool,
) -> Result<Vec<SessionResult>> {
    debug!(worker, ?sessions, "worker started");
    let mut result_accum = BatchAccumulator::new(params.initial_balance);
    let mut recorded = vec![];

    let report = |accum: &mut BatchAccumulator| -> Result<()> {
        let mut s = status.lock().map_err(|_| SimulationError::WorkerPanicked)?;
        s[worker] += &*accum;
        *accum = BatchAccumulator::new(params.initial_balance);
        Ok(())
    };

    for index in sessions {
        if cancelled.load(Ordering::Relaxed) {
            debug!(worker, index, "worker cancelled");
            break;
        }
        let mut coin = FairCoin::seeded(seed.wrapping_add(index));
        let result = play_session(params, &mut coin, None);
        result_accum.record(&result);
        if record {
            recorded.push(result);
        }
        if result_accum.sessions >= SESSIONS_PER_REPORT {
            report(&mut result_accum)?;
        }
    }
    report(&mut result_accum)?;

    Ok(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ScriptedOutcomes;
    use crate::types::Outcome::*;

    fn default_params() -> SessionParameters {
        SessionParameters::default()
    }

    #[test]
    fn test_partition() {
        assert_eq!(partition(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition(4, 4), vec![0..1, 1..2, 2..3, 3..4]);
        assert_eq!(partition(5, 1), vec![0..5]);
    }

    #[test]
    fn test_reference_batch() {
        let stats = run_batch(&default_params(), 10_000).expect("batch failed");

        println!("{}", stats);
        assert_eq!(stats.sessions, 10_000);
        assert!(stats.bankruptcy_rate > 0.0 && stats.bankruptcy_rate < 100.0);
        assert!(stats.avg_final_balance.is_finite());
        assert!(stats.min_final_balance <= stats.avg_final_balance);
        assert!(stats.avg_final_balance <= stats.max_final_balance);
        assert!(stats.bankruptcy_rate <= stats.below_initial_rate);
        let total = stats.below_initial_rate + stats.break_even_rate + stats.profit_rate;
        assert!((total - 100.0).abs() < 1e-9);
        assert!(stats.avg_rounds_played <= 50.0);
    }

    #[test]
    fn test_rejects_empty_batch() {
        assert!(matches!(run_batch(&default_params(), 0), Err(SimulationError::NoSimulations)));
        assert!(matches!(
            run_batch_with(&default_params(), 0, &mut ScriptedOutcomes::default()),
            Err(SimulationError::NoSimulations)
        ));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let params = SessionParameters::new(0.0, 60000.0, 50);
        assert!(matches!(run_batch(&params, 10), Err(SimulationError::InvalidInvestment(_))));

        let config = SimConfig::new(default_params(), 10).with_threads(0);
        assert!(matches!(BatchRunner::new(config).run(), Err(SimulationError::NoThreads)));
    }

    #[test]
    fn test_same_seed_same_statistics() {
        let config = SimConfig::new(default_params(), 2_000).with_seed(1234);
        let single = BatchRunner::new(config.clone().with_threads(1)).run().unwrap();
        let multi = BatchRunner::new(config.clone().with_threads(4)).run().unwrap();
        let again = BatchRunner::new(config.with_threads(4)).run().unwrap();

        assert_eq!(single.seed, 1234);
        assert_eq!(multi.statistics, again.statistics);
        assert_eq!(single.statistics.bankruptcy_rate, multi.statistics.bankruptcy_rate);
        assert_eq!(single.statistics.profit_rate, multi.statistics.profit_rate);
        assert_eq!(single.statistics.min_final_balance, multi.statistics.min_final_balance);
        assert_eq!(single.statistics.max_final_balance, multi.statistics.max_final_balance);
        assert!((single.statistics.avg_final_balance - multi.statistics.avg_final_balance).abs() < 1e-6);
    }

    #[test]
    fn test_recorded_sessions_in_order() {
        let mut config = SimConfig::new(default_params(), 37).with_seed(5).with_threads(3);
        config.record_sessions = true;
        let report = BatchRunner::new(config).run().unwrap();
        assert_eq!(report.sessions.len(), 37);

        // Session i is reproducible on its own from seed + i.
        for (i, recorded) in report.sessions.iter().enumerate() {
            let replayed = play_session(&default_params(), &mut FairCoin::seeded(5 + i as u64), None);
            assert_eq!(*recorded, replayed);
        }
    }

    #[test]
    fn test_more_threads_than_sessions() {
        let config = SimConfig::new(default_params(), 3).with_seed(9).with_threads(16);
        let report = BatchRunner::new(config).run().unwrap();
        assert_eq!(report.statistics.sessions, 3);
    }

    #[test]
    fn test_cancelled_batch() {
        let runner = BatchRunner::new(SimConfig::new(default_params(), 10_000).with_seed(1));
        runner.cancel_handle().store(true, Ordering::Relaxed);
        match runner.run() {
            Err(SimulationError::Cancelled { completed }) => assert_eq!(completed, 0),
            other => panic!("Expected a cancelled batch, got {:?}", other.map(|r| r.statistics)),
        }
    }

    #[test]
    fn test_sequential_batch_with_script() {
        // Two sessions of two rounds each: [L, W] ends at 61000, [W, W] ends at 68000.
        let params = SessionParameters::new(4000.0, 60000.0, 2);
        let mut script = ScriptedOutcomes::new([Loss, Win, Win, Win]);
        let stats = run_batch_with(&params, 2, &mut script).unwrap();

        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.avg_final_balance, 64500.0);
        assert_eq!(stats.profit_rate, 100.0);
        assert_eq!(stats.avg_profitable_balance, 64500.0);
        assert_eq!(stats.max_profitable_balance, 68000.0);
        assert_eq!(stats.min_final_balance, 61000.0);
        assert_eq!(stats.bankruptcy_rate, 0.0);
    }
}
