use crate::count::CountingSystem;
use crate::simulation::RoundPhase;

use thiserror::Error;

/// Rejected construction of rules, players, shoes or seats. Raised before
/// any round runs and never recovered from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("invalid player {name}: {reason}")]
    InvalidPlayer { name: String, reason: String },

    #[error("invalid shoe: {0}")]
    InvalidShoe(String),

    #[error("cannot seat {name}: {reason}")]
    Seating { name: String, reason: String },
}

impl ConfigError {
    pub(crate) fn player(name: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidPlayer {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn seating(name: &str, reason: impl Into<String>) -> Self {
        ConfigError::Seating {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Conditions raised while a shoe is being played. Apart from `Config`, each
/// one is an orchestration bug rather than a game state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("the shoe ran out of cards in the middle of a round")]
    ShoeExhausted,

    #[error("true count is undefined for the unbalanced {0:?} system")]
    UnbalancedTrueCount(CountingSystem),

    #[error("penetration {0} is outside (0.5, 0.9]")]
    PenetrationOutOfRange(f64),

    #[error("{method} is only allowed in {expected:?} phase, current phase is {actual:?}")]
    WrongPhase {
        method: &'static str,
        expected: RoundPhase,
        actual: RoundPhase,
    },

    #[error("{0} asked for a decision on a busted hand")]
    DecisionOnBustedHand(String),

    #[error("{name} cannot wager {amount:.2} with a bankroll of {bankroll:.2}")]
    InsufficientBankroll {
        name: String,
        amount: f64,
        bankroll: f64,
    },
}
