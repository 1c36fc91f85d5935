use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use strum_macros::EnumIter;

use crate::error::SimulationError;

/// An amount of money, either a balance or a stake.
pub type Money = f64;

/// Probability that a single round is won. The game is always even money.
pub const WIN_PROBABILITY: f64 = 0.5;

/// Result of a single even-money round.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Outcome {
    Win,
    Loss,
}

impl Distribution<Outcome> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Outcome {
        if rng.gen_bool(WIN_PROBABILITY) {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

impl TryFrom<char> for Outcome {
    type Error = SimulationError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'W' | 'w' => Ok(Outcome::Win),
            'L' | 'l' => Ok(Outcome::Loss),
            other => Err(SimulationError::InvalidOutcome(other)),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "W"),
            Outcome::Loss => write!(f, "L"),
        }
    }
}

/// A list of outcomes written as letters, for example `"LWWL"`. Whitespace and commas are
/// ignored so that `"L, W"` also parses.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct OutcomeScript(pub Vec<Outcome>);

impl FromStr for OutcomeScript {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(Outcome::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(OutcomeScript)
    }
}

/// Where a session finished relative to the balance it started with.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, EnumIter, enum_map::Enum)]
pub enum Standing {
    Below,
    Even,
    Above,
}

impl Standing {
    pub fn of(final_balance: Money, initial_balance: Money) -> Self {
        if final_balance < initial_balance {
            Standing::Below
        } else if final_balance > initial_balance {
            Standing::Above
        } else {
            Standing::Even
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_outcome_script_parse() {
        let script: OutcomeScript = "LW, wl".parse().unwrap();
        assert_eq!(script.0, vec![Outcome::Loss, Outcome::Win, Outcome::Win, Outcome::Loss]);

        let round_trip: String = script.0.iter().map(|o| o.to_string()).collect();
        assert_eq!(round_trip, "LWWL");
    }

    #[test]
    fn test_outcome_script_rejects_unknown_letters() {
        match "WLX".parse::<OutcomeScript>() {
            Err(SimulationError::InvalidOutcome('X')) => {}
            other => panic!("Expected InvalidOutcome('X'), got {:?}", other),
        }
    }

    #[test]
    fn test_standing() {
        assert_eq!(Standing::of(0.0, 60000.0), Standing::Below);
        assert_eq!(Standing::of(60000.0, 60000.0), Standing::Even);
        assert_eq!(Standing::of(61000.0, 60000.0), Standing::Above);
        assert_eq!(Standing::iter().count(), 3);
    }
}
