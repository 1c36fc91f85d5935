use std::fmt::{Display, Formatter};
use std::ops;
use std::ops::Index;

use crate::types::Money;

/// A staking sequence. The next bet is the sum of the first and last stakes; a win crosses off
/// both ends and a loss writes the amount lost onto the end.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct StakeSequence {
    pub stakes: Vec<Money>,
}

#[macro_export]
macro_rules! sequence {
    ( $( $x:expr ),* ) => {
        {
            let mut temp_vec: Vec<$crate::types::Money> = Vec::new();
            $(
                temp_vec.push($x as $crate::types::Money);
            )*
            $crate::sequence::StakeSequence { stakes: temp_vec }
        }
    };
}

/// The smallest stake unit for an investment: a quarter of it, rounded down.
pub fn base_stake(initial_investment: Money) -> Money {
    (initial_investment / 4.0).floor()
}

/// Build the opening sequence `[u, 2u, 3u]` for an investment, where `u` is the base stake.
/// Every call returns a new sequence; no validation is done on the investment.
pub fn initial_sequence(initial_investment: Money) -> StakeSequence {
    let unit = base_stake(initial_investment);
    sequence![unit, 2.0 * unit, 3.0 * unit]
}

impl StakeSequence {
    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    /// The bet this sequence asks for, or `None` if it has been fully crossed off. A sequence of
    /// one stake asks for twice that stake.
    pub fn next_bet(&self) -> Option<Money> {
        match (self.stakes.first(), self.stakes.last()) {
            (Some(first), Some(last)) => Some(first + last),
            _ => None,
        }
    }

    /// Cross off the first and last stakes after a winning round.
    pub fn cross_off(&mut self) {
        match self.stakes.len() {
            0 => {}
            1 => self.stakes.clear(),
            _ => {
                self.stakes.pop();
                self.stakes.remove(0);
            }
        }
    }
}

impl Index<usize> for StakeSequence {
    type Output = Money;

    fn index(&self, index: usize) -> &Self::Output {
        &self.stakes[index]
    }
}

impl ops::AddAssign<Money> for StakeSequence {
    /// Append a lost bet to the end of the sequence.
    fn add_assign(&mut self, rhs: Money) {
        self.stakes.push(rhs);
    }
}

impl Display for StakeSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, stake) in self.stakes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", stake)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_sequence() {
        assert_eq!(initial_sequence(4000.0), sequence![1000, 2000, 3000]);
        assert_eq!(initial_sequence(4003.0), sequence![1000, 2000, 3000]);
        assert_eq!(initial_sequence(10.0), sequence![2, 4, 6]);

        for investment in [4.0, 7.5, 100.0, 4001.0, 123456.0] {
            let seq = initial_sequence(investment);
            assert_eq!(seq.len(), 3);
            assert!(seq[0] < seq[1] && seq[1] < seq[2]);
            assert_eq!(seq[1], 2.0 * seq[0]);
            assert_eq!(seq[2], 3.0 * seq[0]);
            assert_eq!(seq[0].fract(), 0.0);
        }
    }

    #[test]
    fn test_degenerate_investment_is_not_rejected() {
        assert_eq!(initial_sequence(3.0), sequence![0, 0, 0]);
        assert_eq!(initial_sequence(-8.0), sequence![-2, -4, -6]);
    }

    #[test]
    fn test_initial_sequences_do_not_alias() {
        let mut a = initial_sequence(4000.0);
        let b = initial_sequence(4000.0);
        assert_eq!(a, b);

        a += 4000.0;
        a.cross_off();
        assert_eq!(a, sequence![2000, 3000]);
        assert_eq!(b, sequence![1000, 2000, 3000]);
    }

    #[test]
    fn test_next_bet_and_cross_off() {
        let mut seq = sequence![1000, 2000, 3000];
        assert_eq!(seq.next_bet(), Some(4000.0));

        seq.cross_off();
        assert_eq!(seq, sequence![2000]);
        // A single stake is both ends of the sequence.
        assert_eq!(seq.next_bet(), Some(4000.0));

        seq.cross_off();
        assert!(seq.is_empty());
        assert_eq!(seq.next_bet(), None);

        seq.cross_off();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(sequence![1000, 2000, 3000].to_string(), "[1000, 2000, 3000]");
        assert_eq!(sequence![2.5].to_string(), "[2.5]");
        assert_eq!(StakeSequence::default().to_string(), "[]");
    }
}
