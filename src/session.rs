use derive_more::{Add, AddAssign};
use tracing::trace;

use crate::outcome::OutcomeSource;
use crate::params::SessionParameters;
use crate::sequence::{initial_sequence, StakeSequence};
use crate::types::{Money, Outcome};

/// Per-session counters, summed across a batch.
#[derive(Default, Add, AddAssign, PartialEq, Eq, Clone, Copy, Debug)]
pub struct RoundCounts {
    pub rounds: u64,
    pub wins: u64,
    pub losses: u64,
    /// Times the sequence was fully crossed off and started over.
    pub resets: u64,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub struct SessionResult {
    pub final_balance: Money,
    pub counts: RoundCounts,
}

/// One played round, as shown by a session trace.
#[derive(PartialEq, Clone, Debug)]
pub struct RoundRecord {
    pub round: u32,
    /// The sequence as it stood when the bet was placed.
    pub sequence: StakeSequence,
    /// Amount actually wagered, after capping at the balance.
    pub bet: Money,
    pub outcome: Outcome,
    pub balance: Money,
}

/// Play one session and return its final balance.
pub fn run_session(params: &SessionParameters, outcomes: &mut impl OutcomeSource) -> Money {
    play_session(params, outcomes, None).final_balance
}

/// Play out one complete session of the staking progression.
///
/// # Arguments
/// * `params` - Investment, starting balance and round cap for the session.
/// * `outcomes` - Source of round results. The session ends early if it runs dry.
/// * `log` - If given, every played round is appended to it.
pub fn play_session(
    params: &SessionParameters,
    outcomes: &mut impl OutcomeSource,
    mut log: Option<&mut Vec<RoundRecord>>,
) -> SessionResult {
    let template = initial_sequence(params.initial_investment);
    let mut sequence = template.clone();
    let mut balance = params.initial_balance;
    let mut counts = RoundCounts::default();

    for round in 1..=params.max_rounds {
        if balance <= 0.0 {
            trace!(round, "balance exhausted");
            break;
        }

        let Some(outcome) = outcomes.next_outcome() else {
            break;
        };

        if sequence.is_empty() {
            counts.resets += 1;
            sequence = template.clone();
        }
        let bet = sequence.next_bet().unwrap_or_default().min(balance);
        let sequence_before = log.as_ref().map(|_| sequence.clone());

        balance -= bet;
        match outcome {
            Outcome::Win => {
                balance += 2.0 * bet;
                sequence.cross_off();
                counts.wins += 1;
            }
            Outcome::Loss => {
                sequence += bet;
                counts.losses += 1;
            }
        }
        counts.rounds += 1;
        trace!(round, bet, ?outcome, balance, "round played");

        if let (Some(log), Some(sequence)) = (log.as_deref_mut(), sequence_before) {
            log.push(RoundRecord { round, sequence, bet, outcome, balance });
        }
    }

    SessionResult { final_balance: balance, counts }
}
