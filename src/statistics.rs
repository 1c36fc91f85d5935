use std::fmt::{Display, Formatter};
use std::ops;

use enum_map::EnumMap;

use crate::session::{RoundCounts, SessionResult};
use crate::types::{Money, Standing};

/// Running totals over any number of sessions that all started from the same balance.
///
/// Accumulators from different workers can be merged with `+=` in any order; the merged result
/// is the same as if every session had been recorded into a single accumulator.
#[derive(PartialEq, Clone, Debug)]
pub struct BatchAccumulator {
    initial_balance: Money,
    pub sessions: u64,
    pub ruined: u64,
    pub standings: EnumMap<Standing, u64>,
    pub counts: RoundCounts,
    pub balance_sum: Money,
    pub profitable_sum: Money,
    /// Largest profitable final balance, floored at 0.
    pub max_profitable: Money,
    pub min_balance: Option<Money>,
    pub max_balance: Option<Money>,
}

impl BatchAccumulator {
    pub fn new(initial_balance: Money) -> Self {
        Self {
            initial_balance,
            sessions: 0,
            ruined: 0,
            standings: EnumMap::default(),
            counts: RoundCounts::default(),
            balance_sum: 0.0,
            profitable_sum: 0.0,
            max_profitable: 0.0,
            min_balance: None,
            max_balance: None,
        }
    }

    pub fn initial_balance(&self) -> Money {
        self.initial_balance
    }

    pub fn record(&mut self, result: &SessionResult) {
        let balance = result.final_balance;

        self.sessions += 1;
        self.counts += result.counts;
        self.balance_sum += balance;
        if balance == 0.0 {
            self.ruined += 1;
        }

        let standing = Standing::of(balance, self.initial_balance);
        self.standings[standing] += 1;
        if standing == Standing::Above {
            self.profitable_sum += balance;
            self.max_profitable = self.max_profitable.max(balance);
        }

        self.min_balance = Some(self.min_balance.map_or(balance, |m| m.min(balance)));
        self.max_balance = Some(self.max_balance.map_or(balance, |m| m.max(balance)));
    }

    /// Reduce the totals into a statistics record. An empty accumulator gives a record of all
    /// zeros.
    pub fn statistics(&self) -> BatchStatistics {
        if self.sessions == 0 {
            return BatchStatistics::default();
        }

        let n = self.sessions as f64;
        let percent = |count: u64| count as f64 / n * 100.0;
        let profitable = self.standings[Standing::Above];

        BatchStatistics {
            sessions: self.sessions,
            avg_final_balance: self.balance_sum / n,
            bankruptcy_rate: percent(self.ruined),
            below_initial_rate: percent(self.standings[Standing::Below]),
            break_even_rate: percent(self.standings[Standing::Even]),
            profit_rate: percent(profitable),
            avg_profitable_balance: if profitable > 0 {
                self.profitable_sum / profitable as f64
            } else {
                0.0
            },
            max_profitable_balance: self.max_profitable,
            min_final_balance: self.min_balance.unwrap_or_default(),
            max_final_balance: self.max_balance.unwrap_or_default(),
            avg_rounds_played: self.counts.rounds as f64 / n,
            win_ratio: if self.counts.rounds > 0 {
                self.counts.wins as f64 / self.counts.rounds as f64 * 100.0
            } else {
                0.0
            },
        }
    }
}

fn merge_extreme(a: Option<Money>, b: Option<Money>, pick: fn(Money, Money) -> Money) -> Option<Money> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

impl ops::AddAssign<&BatchAccumulator> for BatchAccumulator {
    fn add_assign(&mut self, rhs: &BatchAccumulator) {
        debug_assert_eq!(self.initial_balance, rhs.initial_balance);
        self.sessions += rhs.sessions;
        self.ruined += rhs.ruined;
        for (standing, &count) in &rhs.standings {
            self.standings[standing] += count;
        }
        self.counts += rhs.counts;
        self.balance_sum += rhs.balance_sum;
        self.profitable_sum += rhs.profitable_sum;
        self.max_profitable = self.max_profitable.max(rhs.max_profitable);
        self.min_balance = merge_extreme(self.min_balance, rhs.min_balance, Money::min);
        self.max_balance = merge_extreme(self.max_balance, rhs.max_balance, Money::max);
    }
}

/// Summary of a batch of sessions. Rates are percentages in `0..=100`.
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct BatchStatistics {
    pub sessions: u64,
    pub avg_final_balance: Money,
    /// Sessions that ended with exactly nothing left.
    pub bankruptcy_rate: f64,
    /// Sessions that ended below the starting balance, ruined sessions included.
    pub below_initial_rate: f64,
    pub break_even_rate: f64,
    pub profit_rate: f64,
    pub avg_profitable_balance: Money,
    pub max_profitable_balance: Money,
    pub min_final_balance: Money,
    pub max_final_balance: Money,
    pub avg_rounds_played: f64,
    /// Share of all played rounds that were won.
    pub win_ratio: f64,
}

impl Display for BatchStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Average final balance:          {:.2}", self.avg_final_balance)?;
        writeln!(f, "Bankruptcy rate:                {:.2}%", self.bankruptcy_rate)?;
        writeln!(f, "Below initial balance:          {:.2}%", self.below_initial_rate)?;
        writeln!(f, "Profit rate:                    {:.2}%", self.profit_rate)?;
        writeln!(f, "Average profitable balance:     {:.2}", self.avg_profitable_balance)?;
        writeln!(f, "Maximum profitable balance:     {:.2}", self.max_profitable_balance)?;
        writeln!(f, "Minimum final balance:          {:.2}", self.min_final_balance)?;
        writeln!(f)?;
        writeln!(f, "Sessions:                       {}", self.sessions)?;
        writeln!(f, "Break-even rate:                {:.2}%", self.break_even_rate)?;
        writeln!(f, "Maximum final balance:          {:.2}", self.max_final_balance)?;
        writeln!(f, "Average rounds played:          {:.2}", self.avg_rounds_played)?;
        write!(f, "Rounds won:                     {:.2}%", self.win_ratio)
    }
}
