use crate::{ConfigError, Player, Rules};

use tracing::debug;

/// Seated players in seat order, plus back-counters watching from behind.
/// A back-counter is in exactly one of the two lists at any time.
#[derive(Debug, Clone)]
pub struct Table {
    rules: Rules,
    players: Vec<Player>,
    observers: Vec<Player>,
    /// Players who could no longer cover the table minimum.
    retired: Vec<Player>,
}

impl Table {
    pub fn new(rules: Rules) -> Result<Table, ConfigError> {
        rules.validate()?;
        Ok(Table {
            rules,
            players: Vec::new(),
            observers: Vec::new(),
            retired: Vec::new(),
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn observers(&self) -> &[Player] {
        &self.observers
    }

    pub fn retired(&self) -> &[Player] {
        &self.retired
    }

    /// Everyone who ever sat or watched at this table.
    pub fn everyone(&self) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .chain(self.observers.iter())
            .chain(self.retired.iter())
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.rules.max_players as usize
    }

    /// Seats a player for every round. Back-counters start out observing.
    pub fn seat(&mut self, player: Player) -> Result<(), ConfigError> {
        if player.is_back_counter() {
            return Err(ConfigError::seating(
                player.name(),
                "back-counters join as observers",
            ));
        }
        self.check_joinable(&player)?;
        if self.is_full() {
            return Err(ConfigError::seating(player.name(), "the table is full"));
        }
        self.players.push(player);
        Ok(())
    }

    pub fn observe(&mut self, player: Player) -> Result<(), ConfigError> {
        if !player.is_back_counter() {
            return Err(ConfigError::seating(
                player.name(),
                "only back-counters may observe",
            ));
        }
        self.check_joinable(&player)?;
        if !self
            .players
            .iter()
            .any(|seated| Some(seated.name()) == partner_of(&player))
        {
            return Err(ConfigError::seating(
                player.name(),
                "partner must be seated first",
            ));
        }
        self.observers.push(player);
        Ok(())
    }

    fn check_joinable(&self, player: &Player) -> Result<(), ConfigError> {
        if self.everyone().any(|other| other.name() == player.name()) {
            return Err(ConfigError::seating(player.name(), "name already taken"));
        }
        if let Some(counter) = player.counter_profile() {
            let ramp = counter.ramp();
            if ramp.min_amount() < self.rules.min_bet || ramp.max_amount() > self.rules.max_bet {
                return Err(ConfigError::seating(
                    player.name(),
                    "bet ramp goes outside the table limits",
                ));
            }
        }
        Ok(())
    }

    /// Moves observer `index` to the last seat. Returns false if the table
    /// is full and nothing moved.
    pub(crate) fn admit(&mut self, index: usize) -> bool {
        if self.is_full() {
            return false;
        }
        let player = self.observers.remove(index);
        debug!(player = player.name(), count = player.count(), "back-counter enters");
        self.players.push(player);
        true
    }

    /// Moves seated back-counter `index` behind the table.
    pub(crate) fn evict(&mut self, index: usize) {
        let player = self.players.remove(index);
        debug!(player = player.name(), count = player.count(), "back-counter leaves");
        self.observers.push(player);
    }

    /// Takes seated player `index` out of play for good.
    pub(crate) fn retire(&mut self, index: usize) {
        let player = self.players.remove(index);
        debug!(player = player.name(), bankroll = player.bankroll(), "player retires");
        self.retired.push(player);
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub(crate) fn observers_mut(&mut self) -> &mut [Player] {
        &mut self.observers
    }
}

fn partner_of(player: &Player) -> Option<&str> {
    match player.kind() {
        crate::PlayerKind::BackCounter(back_counter) => Some(back_counter.partner()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BetRamp, Counter, CountingSystem};

    fn counter(name: &str) -> Player {
        let ramp = BetRamp::new(10.0, vec![(2.0, 100.0)]).unwrap();
        Player::counter(name, 1000.0, Counter::new(CountingSystem::HiLo, ramp, None)).unwrap()
    }

    fn wonger(name: &str, partner: &Player) -> Player {
        let ramp = BetRamp::new(10.0, vec![(2.0, 100.0)]).unwrap();
        let counter = Counter::new(CountingSystem::HiLo, ramp, None);
        Player::back_counter(name, 1000.0, counter, 1.0, 0.0, partner).unwrap()
    }

    #[test]
    fn invalid_rules_never_make_a_table() {
        let rules = Rules {
            max_hands: 1,
            ..Rules::default()
        };
        assert!(Table::new(rules).is_err());
    }

    #[test]
    fn seats_are_limited() {
        let rules = Rules {
            max_players: 2,
            ..Rules::default()
        };
        let mut table = Table::new(rules).unwrap();
        table.seat(Player::basic("a", 100.0).unwrap()).unwrap();
        table.seat(Player::basic("b", 100.0).unwrap()).unwrap();
        assert!(table.is_full());
        assert!(table.seat(Player::basic("c", 100.0).unwrap()).is_err());
    }

    #[test]
    fn names_are_unique() {
        let mut table = Table::new(Rules::default()).unwrap();
        table.seat(Player::basic("a", 100.0).unwrap()).unwrap();
        assert!(table.seat(Player::basic("a", 100.0).unwrap()).is_err());
    }

    #[test]
    fn ramp_must_fit_table_limits() {
        let rules = Rules {
            max_bet: 50.0,
            ..Rules::default()
        };
        let mut table = Table::new(rules).unwrap();
        assert!(table.seat(counter("big")).is_err());
    }

    #[test]
    fn back_counters_only_observe_next_to_their_partner() {
        let mut table = Table::new(Rules::default()).unwrap();
        let partner = counter("partner");
        let back = wonger("wonger", &partner);
        assert!(table.seat(back.clone()).is_err());
        assert!(table.observe(back.clone()).is_err());
        assert!(table.observe(Player::basic("basic", 10.0).unwrap()).is_err());

        table.seat(partner).unwrap();
        table.observe(back).unwrap();
        assert_eq!(table.observers().len(), 1);
    }

    #[test]
    fn moving_between_lists_never_duplicates() {
        let rules = Rules {
            max_players: 2,
            ..Rules::default()
        };
        let mut table = Table::new(rules).unwrap();
        let partner = counter("partner");
        let first = wonger("first", &partner);
        let second = wonger("second", &partner);
        table.seat(partner).unwrap();
        table.observe(first).unwrap();
        table.observe(second).unwrap();

        assert!(table.admit(0));
        assert!(!table.admit(0));
        assert_eq!(table.players().len(), 2);
        assert_eq!(table.observers().len(), 1);

        table.evict(1);
        assert_eq!(table.players().len(), 1);
        assert_eq!(table.observers().len(), 2);
        assert_eq!(table.everyone().count(), 3);

        table.retire(0);
        assert_eq!(table.retired().len(), 1);
        assert_eq!(table.everyone().count(), 3);
    }
}
