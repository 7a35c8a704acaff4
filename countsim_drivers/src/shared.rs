use countsim::{
    BetRamp, ConfigError, Counter, CountingSystem, Player, Rules, SimulationError, Table,
};
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    ConfigPath(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rule: ConfigRule,
    pub shoe: ConfigShoe,
    pub simulator: ConfigSimulator,
    pub players: Vec<ConfigPlayer>,
}

/// Every field falls back to the default table rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub min_bet: f64,
    pub max_bet: f64,
    pub blackjack_payout: f64,
    pub max_hands: u8,
    pub max_players: u8,
    pub double_down: bool,
    pub double_after_split: bool,
    pub surrender: bool,
    pub insurance: bool,
    pub resplit_aces: bool,
    pub dealer_hits_soft17: bool,
    pub dealer_shows_hole_card: bool,
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rules = Rules::default();
        ConfigRule {
            min_bet: rules.min_bet,
            max_bet: rules.max_bet,
            blackjack_payout: rules.blackjack_payout,
            max_hands: rules.max_hands,
            max_players: rules.max_players,
            double_down: rules.double_down,
            double_after_split: rules.double_after_split,
            surrender: rules.surrender,
            insurance: rules.insurance,
            resplit_aces: rules.resplit_aces,
            dealer_hits_soft17: rules.dealer_hits_soft17,
            dealer_shows_hole_card: rules.dealer_shows_hole_card,
        }
    }
}

impl TryInto<Rules> for ConfigRule {
    type Error = ConfigError;

    fn try_into(self) -> Result<Rules, Self::Error> {
        let rules = Rules {
            min_bet: self.min_bet,
            max_bet: self.max_bet,
            blackjack_payout: self.blackjack_payout,
            max_hands: self.max_hands,
            max_players: self.max_players,
            double_down: self.double_down,
            double_after_split: self.double_after_split,
            surrender: self.surrender,
            insurance: self.insurance,
            resplit_aces: self.resplit_aces,
            dealer_hits_soft17: self.dealer_hits_soft17,
            dealer_shows_hole_card: self.dealer_shows_hole_card,
        };
        rules.validate()?;
        Ok(rules)
    }
}

/// Cards a round is allowed to need per hand, per extra split hand, and for
/// the dealer when checking a shoe's reserve.
const CARDS_PER_HAND: usize = 4;
const CARDS_PER_SPLIT: usize = 2;
const DEALER_CARDS: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfigShoe {
    pub number_of_decks: u8,
    /// Share of the shoe dealt before the cut card, in (0.5, 0.9].
    pub penetration: f64,
}

impl ConfigShoe {
    pub fn validate(&self) -> Result<(), DriverError> {
        countsim::Shoe::new(self.number_of_decks)?;
        if !(self.penetration > 0.5 && self.penetration <= 0.9) {
            return Err(SimulationError::PenetrationOutOfRange(self.penetration).into());
        }
        Ok(())
    }

    /// Cards left behind the cut card.
    fn reserve(&self) -> usize {
        let total = self.number_of_decks as f64 * 52.0;
        (total * (1.0 - self.penetration)).floor() as usize
    }

    /// The cut card is only checked between rounds, so the cards behind it
    /// must cover a whole round at a full table.
    pub fn check_reserve(&self, rules: &Rules, seats: usize) -> Result<(), ConfigError> {
        let seats = seats.min(rules.max_players as usize);
        let per_seat = CARDS_PER_HAND + CARDS_PER_SPLIT * (rules.max_hands as usize - 1);
        let needed = seats * per_seat + DEALER_CARDS;
        let reserve = self.reserve();
        if reserve < needed {
            return Err(ConfigError::InvalidShoe(format!(
                "{} cards behind the cut card, but a round of {} seats may need {}",
                reserve, seats, needed
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSimulator {
    pub number_of_threads: usize,
    pub number_of_shoes: u64,
    /// Shoe `i` is shuffled with `seed + i`. Without a seed every shoe
    /// draws its own from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPlayerKind {
    Basic,
    Counter,
    BackCounter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPlayer {
    pub name: String,
    pub bankroll: f64,
    pub kind: ConfigPlayerKind,
    #[serde(default)]
    pub system: Option<CountingSystem>,
    #[serde(default)]
    pub ramp: Option<ConfigRamp>,
    #[serde(default)]
    pub insurance: Option<f32>,
    #[serde(default)]
    pub entry: Option<f32>,
    #[serde(default)]
    pub exit: Option<f32>,
    #[serde(default)]
    pub partner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRamp {
    pub base: f64,
    #[serde(default)]
    pub steps: Vec<ConfigRampStep>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfigRampStep {
    pub count: f32,
    pub bet: f64,
}

impl ConfigPlayer {
    fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidPlayer {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }

    fn counter(&self) -> Result<Counter, ConfigError> {
        let system = self.system.ok_or_else(|| self.invalid("a counter needs a system"))?;
        let ramp = match &self.ramp {
            Some(ramp) => BetRamp::new(
                ramp.base,
                ramp.steps.iter().map(|step| (step.count, step.bet)).collect(),
            )?,
            None => return Err(self.invalid("a counter needs a ramp")),
        };
        Ok(Counter::new(system, ramp, self.insurance))
    }

    /// Builds the player. A back-counter looks its partner up in `table`.
    pub fn build(&self, table: &Table) -> Result<Player, ConfigError> {
        match self.kind {
            ConfigPlayerKind::Basic => Player::basic(&self.name, self.bankroll),
            ConfigPlayerKind::Counter => {
                Player::counter(&self.name, self.bankroll, self.counter()?)
            }
            ConfigPlayerKind::BackCounter => {
                let (entry, exit) = match (self.entry, self.exit) {
                    (Some(entry), Some(exit)) => (entry, exit),
                    _ => return Err(self.invalid("a back-counter needs entry and exit points")),
                };
                let partner_name = self
                    .partner
                    .as_deref()
                    .ok_or_else(|| self.invalid("a back-counter needs a partner"))?;
                let partner = table
                    .players()
                    .iter()
                    .find(|player| player.name() == partner_name)
                    .ok_or_else(|| self.invalid("partner is not seated at the table"))?;
                Player::back_counter(
                    &self.name,
                    self.bankroll,
                    self.counter()?,
                    entry,
                    exit,
                    partner,
                )
            }
        }
    }
}

/// Seats everyone in config order, then puts back-counters behind the table.
pub fn build_table(rules: Rules, players: &[ConfigPlayer]) -> Result<Table, ConfigError> {
    let mut table = Table::new(rules)?;
    let (back_counters, seated): (Vec<_>, Vec<_>) = players
        .iter()
        .partition(|player| player.kind == ConfigPlayerKind::BackCounter);
    for config_player in seated {
        let player = config_player.build(&table)?;
        table.seat(player)?;
    }
    for config_player in back_counters {
        let player = config_player.build(&table)?;
        table.observe(player)?;
    }
    Ok(table)
}

pub fn parse_config(content: &str) -> Result<Config, DriverError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> Result<Config, DriverError> {
    let file_content = fs::read_to_string(filename).map_err(|source| DriverError::Io {
        path: filename.to_string(),
        source,
    })?;
    parse_config(&file_content)
}
