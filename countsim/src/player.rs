use crate::simulation::{hand::Hand, shoe::Shoe, Card};
use crate::strategy::{BetRamp, Holding, StrategyTable};
use crate::{Action, ConfigError, CountingSystem, Rules, SimulationError, Stats};

/// Betting and insurance policy of anyone who counts cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    system: CountingSystem,
    ramp: BetRamp,
    insurance: Option<f32>,
}

impl Counter {
    /// `insurance` is the count at or above which insurance is taken. `None`
    /// never insures.
    pub fn new(system: CountingSystem, ramp: BetRamp, insurance: Option<f32>) -> Counter {
        Counter {
            system,
            ramp,
            insurance,
        }
    }

    pub fn system(&self) -> CountingSystem {
        self.system
    }

    pub fn ramp(&self) -> &BetRamp {
        &self.ramp
    }

    pub fn insurance(&self) -> Option<f32> {
        self.insurance
    }
}

/// A counter who watches the shoe from behind the table and only sits down
/// while the count is good.
#[derive(Debug, Clone, PartialEq)]
pub struct BackCounter {
    counter: Counter,
    entry: f32,
    exit: f32,
    partner: String,
}

impl BackCounter {
    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    pub fn entry(&self) -> f32 {
        self.entry
    }

    pub fn exit(&self) -> f32 {
        self.exit
    }

    pub fn partner(&self) -> &str {
        &self.partner
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerKind {
    /// Flat bets the table minimum and never insures.
    Basic,
    Counter(Counter),
    BackCounter(BackCounter),
}

#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    bankroll: f64,
    hands: Vec<Hand>,
    stats: Stats,
    kind: PlayerKind,
    count: f32,
    insurance_count: f32,
}

impl Player {
    pub fn basic(name: &str, bankroll: f64) -> Result<Player, ConfigError> {
        Player::with_kind(name, bankroll, PlayerKind::Basic)
    }

    pub fn counter(name: &str, bankroll: f64, counter: Counter) -> Result<Player, ConfigError> {
        Player::with_kind(name, bankroll, PlayerKind::Counter(counter))
    }

    /// A back-counter shares its partner's counting system. Its exit point
    /// sits strictly below its entry point, and no higher than its insurance
    /// threshold when it insures.
    pub fn back_counter(
        name: &str,
        bankroll: f64,
        counter: Counter,
        entry: f32,
        exit: f32,
        partner: &Player,
    ) -> Result<Player, ConfigError> {
        match partner.counting_system() {
            Some(system) if system != counter.system => {
                return Err(ConfigError::player(
                    name,
                    format!(
                        "counts {:?} but partner {} counts {:?}",
                        counter.system, partner.name, system
                    ),
                ))
            }
            Some(_) => {}
            None => {
                return Err(ConfigError::player(
                    name,
                    format!("partner {} does not count cards", partner.name),
                ))
            }
        }
        if !(exit < entry) {
            return Err(ConfigError::player(name, "exit point must be below entry point"));
        }
        if let Some(threshold) = counter.insurance {
            if exit > threshold {
                return Err(ConfigError::player(
                    name,
                    "exit point must not exceed the insurance threshold",
                ));
            }
        }
        let back_counter = BackCounter {
            counter,
            entry,
            exit,
            partner: partner.name.clone(),
        };
        Player::with_kind(name, bankroll, PlayerKind::BackCounter(back_counter))
    }

    fn with_kind(name: &str, bankroll: f64, kind: PlayerKind) -> Result<Player, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::player(name, "name must not be empty"));
        }
        if !(bankroll >= 0.0) || !bankroll.is_finite() {
            return Err(ConfigError::player(name, "bankroll must be a non-negative amount"));
        }
        Ok(Player {
            name: name.to_string(),
            bankroll,
            hands: vec![Hand::new()],
            stats: Stats::new(),
            kind,
            count: 0.0,
            insurance_count: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    pub fn kind(&self) -> &PlayerKind {
        &self.kind
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn counter_profile(&self) -> Option<&Counter> {
        match &self.kind {
            PlayerKind::Basic => None,
            PlayerKind::Counter(counter) => Some(counter),
            PlayerKind::BackCounter(back_counter) => Some(&back_counter.counter),
        }
    }

    pub fn counting_system(&self) -> Option<CountingSystem> {
        self.counter_profile().map(Counter::system)
    }

    pub fn is_back_counter(&self) -> bool {
        matches!(self.kind, PlayerKind::BackCounter(_))
    }

    /// Count taken before the bet of the current round.
    pub fn count(&self) -> f32 {
        self.count
    }

    /// Count taken after the initial deal, used for insurance.
    pub fn insurance_count(&self) -> f32 {
        self.insurance_count
    }

    /// The count this player bets by: running count for an unbalanced system,
    /// true count otherwise. Non-counters are filed under the Hi-Lo true count
    /// so their statistics line up with everyone else's.
    pub fn count_on(&self, shoe: &Shoe) -> Result<f32, SimulationError> {
        match self.counting_system() {
            Some(system) if !system.is_balanced() => Ok(shoe.running_count(system)),
            Some(system) => shoe.true_count(system),
            None => shoe.true_count(CountingSystem::HiLo),
        }
    }

    pub(crate) fn take_count(&mut self, shoe: &Shoe) -> Result<f32, SimulationError> {
        self.count = self.count_on(shoe)?;
        Ok(self.count)
    }

    pub(crate) fn take_insurance_count(&mut self, shoe: &Shoe) -> Result<f32, SimulationError> {
        self.insurance_count = self.count_on(shoe)?;
        Ok(self.insurance_count)
    }

    pub fn can_enter(&self, count: f32) -> bool {
        match &self.kind {
            PlayerKind::BackCounter(back_counter) => count >= back_counter.entry,
            _ => false,
        }
    }

    pub fn can_exit(&self, count: f32) -> bool {
        match &self.kind {
            PlayerKind::BackCounter(back_counter) => count <= back_counter.exit,
            _ => false,
        }
    }

    /// Wager for the given count, kept within the table limits.
    pub fn placed_bet(&self, count: f32, rules: &Rules) -> f64 {
        match self.counter_profile() {
            None => rules.min_bet,
            Some(counter) => counter.ramp.amount(count).clamp(rules.min_bet, rules.max_bet),
        }
    }

    pub fn wants_insurance(&self, count: f32) -> bool {
        self.counter_profile()
            .and_then(Counter::insurance)
            .map_or(false, |threshold| count >= threshold)
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        amount <= self.bankroll
    }

    /// Takes `amount` out of the bankroll, or leaves it untouched and fails.
    pub(crate) fn place_wager(&mut self, amount: f64) -> Result<(), SimulationError> {
        if !self.can_afford(amount) {
            return Err(SimulationError::InsufficientBankroll {
                name: self.name.clone(),
                amount,
                bankroll: self.bankroll,
            });
        }
        self.bankroll -= amount;
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: f64) {
        self.bankroll += amount;
    }

    pub(crate) fn hands_mut(&mut self) -> &mut Vec<Hand> {
        &mut self.hands
    }

    pub(crate) fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    pub(crate) fn clear_hands(&mut self) {
        self.hands.truncate(1);
        self.hands[0].clear();
    }

    /// The strategy code for hand `hand_index` against `dealer_up`. A pair
    /// is only played as a pair while another hand fits under `max_hands`
    /// and the bankroll covers another bet.
    pub fn decision(
        &self,
        hand_index: usize,
        dealer_up: Card,
        rules: &Rules,
        table: &dyn StrategyTable,
    ) -> Action {
        let hand = &self.hands[hand_index];
        if hand.is_busted() {
            return Action::Busted;
        }
        if hand.len() == 1 {
            return Action::H;
        }

        let dealer_up = dealer_up.blackjack_value();
        let can_split = self.hands.len() < rules.max_hands as usize
            && self.can_afford(hand.total_bet());
        let holding = if hand.is_pair() && can_split {
            Holding::Pair(hand.cards()[0].blackjack_value())
        } else if hand.is_soft() {
            Holding::Soft(hand.total())
        } else {
            Holding::Hard(hand.total())
        };
        table.lookup(holding, dealer_up)
    }
}
