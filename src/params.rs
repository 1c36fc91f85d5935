use crate::error::{Result, SimulationError};
use crate::sequence::base_stake;
use crate::types::Money;

pub const DEFAULT_INITIAL_INVESTMENT: Money = 4000.0;
pub const DEFAULT_INITIAL_BALANCE: Money = 60000.0;
pub const DEFAULT_MAX_ROUNDS: u32 = 50;
pub const DEFAULT_SIMULATIONS: u64 = 10_000;

/// The inputs that fully describe one session. Every session of a batch is played with the same
/// parameters.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct SessionParameters {
    /// Determines the staking sequence: the base stake is a quarter of this amount.
    pub initial_investment: Money,
    pub initial_balance: Money,
    /// Upper bound on rounds played. A session may stop earlier if the balance runs out.
    pub max_rounds: u32,
}

impl Default for SessionParameters {
    fn default() -> Self {
        Self {
            initial_investment: DEFAULT_INITIAL_INVESTMENT,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl SessionParameters {
    pub fn new(initial_investment: Money, initial_balance: Money, max_rounds: u32) -> Self {
        Self { initial_investment, initial_balance, max_rounds }
    }

    /// Reject parameters that would make every stake zero or negative, or that start a session
    /// with a balance that can't be played.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_investment.is_finite() || base_stake(self.initial_investment) < 1.0 {
            return Err(SimulationError::InvalidInvestment(self.initial_investment));
        }
        if !self.initial_balance.is_finite() || self.initial_balance < 0.0 {
            return Err(SimulationError::InvalidBalance(self.initial_balance));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = SessionParameters::default();
        assert_eq!(params, SessionParameters::new(4000.0, 60000.0, 50));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_investment() {
        for investment in [0.0, -4000.0, 3.99, f64::NAN, f64::INFINITY] {
            let params = SessionParameters::new(investment, 60000.0, 50);
            assert!(
                matches!(params.validate(), Err(SimulationError::InvalidInvestment(_))),
                "investment {} should be rejected", investment
            );
        }
        assert!(SessionParameters::new(4.0, 60000.0, 50).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_balance() {
        assert!(matches!(
            SessionParameters::new(4000.0, -1.0, 50).validate(),
            Err(SimulationError::InvalidBalance(_))
        ));
        assert!(SessionParameters::new(4000.0, 0.0, 50).validate().is_ok());
    }
}
