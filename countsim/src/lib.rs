pub mod count;
mod error;
pub mod player;
pub mod simulation;
pub mod stats;
pub mod strategy;
pub mod table;

pub use count::{CardCount, CountingSystem};
pub use error::{ConfigError, SimulationError};
pub use player::{BackCounter, Counter, Player, PlayerKind};
pub use simulation::{
    hand::{Hand, HandStatus},
    shoe::Shoe,
    Card, RoundEventHandler, RoundPhase, Simulator,
};
pub use stats::{StatCategory, Stats};
pub use strategy::{BasicStrategy, BetRamp, Holding, StrategyTable};
pub use table::Table;

use strum_macros::Display;

/// Table rules. Build one with struct update syntax from `Rules::default()`
/// and hand it to `Table::new`, which validates it once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub min_bet: f64,
    pub max_bet: f64,
    pub blackjack_payout: f64,
    /// Most hands a player may hold after splitting. Only 2, 3 or 4.
    pub max_hands: u8,
    pub max_players: u8,
    pub double_down: bool,
    pub double_after_split: bool,
    pub surrender: bool,
    pub insurance: bool,
    pub resplit_aces: bool,
    pub dealer_hits_soft17: bool,
    /// Dealer turns the hole card over even when every hand settled early.
    pub dealer_shows_hole_card: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            min_bet: 10.0,
            max_bet: 500.0,
            blackjack_payout: 1.5,
            max_hands: 4,
            max_players: 7,
            double_down: true,
            double_after_split: true,
            surrender: true,
            insurance: true,
            resplit_aces: false,
            dealer_hits_soft17: false,
            dealer_shows_hole_card: false,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| Err(ConfigError::InvalidRule(reason.to_string()));
        if !(self.min_bet > 0.0) {
            return invalid("min_bet must be positive");
        }
        if !(self.max_bet > self.min_bet) {
            return invalid("max_bet must be greater than min_bet");
        }
        if !(self.blackjack_payout > 0.0) {
            return invalid("blackjack_payout must be positive");
        }
        if !(2..=4).contains(&self.max_hands) {
            return invalid("max_hands must be 2, 3 or 4");
        }
        if !(1..=7).contains(&self.max_players) {
            return invalid("max_players must be between 1 and 7");
        }
        if self.double_after_split && !self.double_down {
            return invalid("double_after_split requires double_down");
        }
        if self.resplit_aces && self.max_hands <= 2 {
            return invalid("resplit_aces requires max_hands above 2");
        }
        Ok(())
    }
}

/// Playing codes produced by a strategy table. Codes with two letters carry
/// their own fallback: `Dh` doubles if allowed, else hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Action {
    H,
    S,
    Dh,
    Ds,
    P,
    /// Split if double after split is offered, else hit.
    Ph,
    Rh,
    Rs,
    Rp,
    /// Never looked up. Returned for a hand over 21.
    Busted,
}

impl Action {
    pub fn is_surrender(self) -> bool {
        matches!(self, Action::Rh | Action::Rs | Action::Rp)
    }

    /// What a surrender code means once surrender is off the table.
    pub fn without_surrender(self) -> Action {
        match self {
            Action::Rh => Action::H,
            Action::Rs => Action::S,
            Action::Rp => Action::P,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_valid() {
        assert!(Rules::default().validate().is_ok());
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let rules = Rules {
            max_bet: 10.0,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());

        let rules = Rules {
            max_hands: 5,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());

        let rules = Rules {
            double_down: false,
            double_after_split: true,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());

        let rules = Rules {
            resplit_aces: true,
            max_hands: 2,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());

        let rules = Rules {
            resplit_aces: true,
            max_hands: 3,
            ..Rules::default()
        };
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn surrender_codes_fall_back() {
        assert_eq!(Action::Rh.without_surrender(), Action::H);
        assert_eq!(Action::Rs.without_surrender(), Action::S);
        assert_eq!(Action::Rp.without_surrender(), Action::P);
        assert_eq!(Action::Dh.without_surrender(), Action::Dh);
        assert!(Action::Rp.is_surrender());
        assert!(!Action::Ph.is_surrender());
    }
}
