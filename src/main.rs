use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use labouchere_sim::batch::BatchRunner;
use labouchere_sim::config::{default_threads, SimConfig};
use labouchere_sim::export;
use labouchere_sim::outcome::{FairCoin, ScriptedOutcomes};
use labouchere_sim::params::*;
use labouchere_sim::session::{play_session, RoundRecord};
use labouchere_sim::types::{Money, OutcomeScript};

/// Monte Carlo simulator for the Labouchère staking progression on an even-money bet.
#[derive(Parser, Debug)]
#[command(name = "labouchere", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a batch of independent sessions and print summary statistics.
    Run(RunArgs),
    /// Play a single session and print every round.
    Trace(TraceArgs),
}

#[derive(Args, Debug, Clone, Copy)]
struct SessionArgs {
    /// Investment that sets the stake sequence; the base stake is a quarter of it.
    #[arg(long, default_value_t = DEFAULT_INITIAL_INVESTMENT)]
    investment: Money,

    /// Balance each session starts with.
    #[arg(long, default_value_t = DEFAULT_INITIAL_BALANCE)]
    balance: Money,

    /// Maximum rounds per session.
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    rounds: u32,
}

impl From<SessionArgs> for SessionParameters {
    fn from(args: SessionArgs) -> Self {
        SessionParameters::new(args.investment, args.balance, args.rounds)
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Number of sessions to simulate.
    #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
    simulations: u64,

    /// Master seed for reproducible batches.
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (defaults to the available parallelism).
    #[arg(long)]
    threads: Option<usize>,

    /// Write every session's result to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Log progress every N seconds (0 disables).
    #[arg(long, default_value_t = 1)]
    progress_secs: u64,
}

#[derive(Args, Debug)]
struct TraceArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Seed for the coin flips.
    #[arg(long, conflicts_with = "outcomes")]
    seed: Option<u64>,

    /// Play these outcomes instead of flipping a coin, e.g. "LWLLW".
    #[arg(long)]
    outcomes: Option<OutcomeScript>,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => run(args),
        Command::Trace(args) => trace(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = SimConfig {
        params: args.session.into(),
        num_simulations: args.simulations,
        seed: args.seed,
        threads: args.threads.unwrap_or_else(default_threads),
        progress_interval: (args.progress_secs > 0).then(|| Duration::from_secs(args.progress_secs)),
        record_sessions: args.csv.is_some(),
    };
    let params = config.params;

    let report = BatchRunner::new(config).run().context("simulation failed")?;

    println!("Investment {}, balance {}, up to {} rounds, {} sessions (seed {})",
             params.initial_investment, params.initial_balance, params.max_rounds,
             report.statistics.sessions, report.seed);
    println!("{}", "-".repeat(50));
    println!("{}", report.statistics);
    println!("Simulated in {:.2?}", report.elapsed);

    if let Some(path) = args.csv {
        export::write_sessions_to_path(&path, &report.sessions)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), rows = report.sessions.len(), "wrote session results");
    }

    Ok(())
}

fn trace(args: TraceArgs) -> Result<()> {
    let params: SessionParameters = args.session.into();
    params.validate().context("invalid session parameters")?;

    let mut log = vec![];
    let result = match args.outcomes {
        Some(script) => play_session(&params, &mut ScriptedOutcomes::from(script), Some(&mut log)),
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            println!("Seed {}", seed);
            play_session(&params, &mut FairCoin::seeded(seed), Some(&mut log))
        }
    };

    println!("Start   {:>12.2}", params.initial_balance);
    for record in &log {
        print_round(record);
    }
    println!(" Result {:>12.2} after {} rounds ({:+.2})",
             result.final_balance, result.counts.rounds,
             result.final_balance - params.initial_balance);

    Ok(())
}

fn print_round(record: &RoundRecord) {
    println!("Round {:>3} {} bet {:>10.2} -> {:>12.2}  {}",
             record.round, record.outcome, record.bet, record.balance, record.sequence);
}
