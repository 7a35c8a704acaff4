pub mod hand;
pub mod shoe;

use crate::strategy::{BasicStrategy, StrategyTable};
use crate::{Action, Player, Rules, SimulationError, StatCategory, Stats, Table};
use countsim_macros::allowed_phase;
use strum_macros::EnumIter;
use tracing::{debug, info};

use self::{
    hand::{Hand, HandStatus},
    shoe::Shoe,
};

static FACE_VALUE_TO_BLACKJACK_VALUE: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

/// A card is only its rank. Suits never matter to the game or the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Card {
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Card {
    pub fn face_value(&self) -> u8 {
        *self as u8
    }

    pub fn blackjack_value(&self) -> u8 {
        FACE_VALUE_TO_BLACKJACK_VALUE[(self.face_value() - 1) as usize]
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Card::Ace => 'A',
            Card::Two => '2',
            Card::Three => '3',
            Card::Four => '4',
            Card::Five => '5',
            Card::Six => '6',
            Card::Seven => '7',
            Card::Eight => '8',
            Card::Nine => '9',
            Card::Ten => 'T',
            Card::Jack => 'J',
            Card::Queen => 'Q',
            Card::King => 'K',
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    BeginRound,
    PlaceBets,
    DealInitialCards,
    Insurance,
    InitialSettlement,
    PlayHands,
    DealerPlay,
    Showdown,
    Clear,
}

/// Hooks into a round as it is played. Every hook defaults to doing nothing.
pub trait RoundEventHandler {
    fn on_round_begin(&mut self, _round: u64, _table: &Table) {}
    fn on_wager(&mut self, _player: &Player, _amount: f64) {}
    fn on_insurance(&mut self, _player: &Player, _amount: f64, _dealer_natural: bool) {}
    fn on_decision(&mut self, _player: &Player, _hand_index: usize, _action: Action) {}
    fn on_split(&mut self, _player: &Player, _hand_index: usize) {}
    fn on_bust(&mut self, _player: &Player, _hand_index: usize) {}
    /// Called before hands are cleared, so the final hands are still visible.
    fn on_round_end(&mut self, _round: u64, _dealer_hand: &Hand, _table: &Table) {}
}

impl RoundEventHandler for () {}

/// Plays rounds at one table out of one shoe.
pub struct Simulator {
    table: Table,
    shoe: Shoe,
    strategy: Box<dyn StrategyTable>,
    dealer_hand: Hand,
    /// First decision per seat, taken at initial settlement and played out
    /// in `play_hands`. `None` once the hand is settled.
    first_decisions: Vec<Option<Action>>,
    current_round_phase: RoundPhase,
    rounds_played: u64,
}

impl Simulator {
    /// Plays basic strategy for the table's soft 17 rule.
    pub fn new(table: Table, shoe: Shoe) -> Simulator {
        let strategy = Box::new(BasicStrategy::for_rules(table.rules()));
        Simulator {
            table,
            shoe,
            strategy,
            dealer_hand: Hand::new(),
            first_decisions: Vec::new(),
            current_round_phase: RoundPhase::BeginRound,
            rounds_played: 0,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    pub fn current_round_phase(&self) -> RoundPhase {
        self.current_round_phase
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// Plays rounds until the cut card comes out or nobody is left at the
    /// table. The cut card is only looked at between rounds. Returns the
    /// number of rounds played.
    pub fn run_shoe<H: RoundEventHandler>(
        &mut self,
        penetration: f64,
        handler: &mut H,
    ) -> Result<u64, SimulationError> {
        info!(
            decks = self.shoe.number_of_decks(),
            penetration,
            players = self.table.players().len(),
            observers = self.table.observers().len(),
            "shoe begins"
        );
        let first_round = self.rounds_played;
        while !self.shoe.cut_card_reached(penetration)? {
            if self.table.players().is_empty() && self.table.observers().is_empty() {
                debug!("table is empty, ending shoe early");
                break;
            }
            self.play_round(handler)?;
        }
        let rounds = self.rounds_played - first_round;
        info!(rounds, remaining = self.shoe.remaining_cards(), "shoe ends");
        Ok(rounds)
    }

    /// Plays one round through every phase.
    pub fn play_round<H: RoundEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), SimulationError> {
        self.begin_round(handler)?;
        self.collect_wagers(handler)?;
        self.deal_initial_cards()?;
        self.resolve_insurance(handler)?;
        self.settle_naturals(handler)?;
        self.play_hands(handler)?;
        self.dealer_plays()?;
        self.settle_showdown()?;
        self.clear_round(handler)
    }

    /// Takes everyone's pre-bet count, then lets back-counters in and out.
    #[allowed_phase(BeginRound)]
    pub fn begin_round<H: RoundEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), SimulationError> {
        self.rounds_played += 1;
        for player in self.table.players_mut() {
            player.take_count(&self.shoe)?;
        }
        for observer in self.table.observers_mut() {
            observer.take_count(&self.shoe)?;
        }

        let mut index = 0;
        while index < self.table.observers().len() {
            let observer = &self.table.observers()[index];
            if observer.can_enter(observer.count()) && self.table.admit(index) {
                continue;
            }
            index += 1;
        }

        let mut index = 0;
        while index < self.table.players().len() {
            let player = &self.table.players()[index];
            if player.can_exit(player.count()) {
                self.table.evict(index);
            } else {
                index += 1;
            }
        }

        debug!(
            round = self.rounds_played,
            seated = self.table.players().len(),
            observing = self.table.observers().len(),
            "round begins"
        );
        handler.on_round_begin(self.rounds_played, &self.table);
        self.current_round_phase = RoundPhase::PlaceBets;
        Ok(())
    }

    /// Anyone who can't cover the table minimum leaves before a card is dealt.
    #[allowed_phase(PlaceBets)]
    pub fn collect_wagers<H: RoundEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), SimulationError> {
        let rules = *self.table.rules();
        let mut index = 0;
        while index < self.table.players().len() {
            if !self.table.players()[index].can_afford(rules.min_bet) {
                self.table.retire(index);
                continue;
            }

            let player = &mut self.table.players_mut()[index];
            let amount = player
                .placed_bet(player.count(), &rules)
                .min(player.bankroll());
            player.place_wager(amount)?;
            player.hands_mut()[0].add_bet(amount);

            let bucket = Stats::bucket(player.count());
            let stats = player.stats_mut();
            stats.increment(bucket, StatCategory::RoundsPlayed);
            stats.increment(bucket, StatCategory::HandsPlayed);
            stats.record(bucket, StatCategory::AmountWagered, amount);
            handler.on_wager(player, amount);
            index += 1;
        }
        self.current_round_phase = RoundPhase::DealInitialCards;
        Ok(())
    }

    /// Two passes round the table. The dealer's first card is the hole card
    /// and stays out of the count; the second is the up card.
    #[allowed_phase(DealInitialCards)]
    pub fn deal_initial_cards(&mut self) -> Result<(), SimulationError> {
        for pass in 0..2 {
            for player in self.table.players_mut() {
                let card = self.shoe.deal_card(true)?;
                player.hands_mut()[0].add_card(card);
            }
            let card = self.shoe.deal_card(pass == 1)?;
            self.dealer_hand.add_card(card);
        }
        self.current_round_phase = RoundPhase::Insurance;
        Ok(())
    }

    /// Insurance is settled on the spot against the dealer's two cards, on a
    /// count retaken now that the first cards are out.
    #[allowed_phase(Insurance)]
    pub fn resolve_insurance<H: RoundEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), SimulationError> {
        let rules = *self.table.rules();
        if rules.insurance && self.up_card() == Card::Ace {
            let dealer_natural = self.dealer_hand.is_blackjack();
            for player in self.table.players_mut() {
                let count = player.take_insurance_count(&self.shoe)?;
                let side_bet = player.hands()[0].total_bet() / 2.0;
                if !player.wants_insurance(count) || !player.can_afford(side_bet) {
                    continue;
                }
                player.place_wager(side_bet)?;
                player.hands_mut()[0].set_insurance_bet(side_bet);

                let bucket = Stats::bucket(count);
                if dealer_natural {
                    player.credit(side_bet * 3.0);
                }
                let stats = player.stats_mut();
                stats.record(bucket, StatCategory::InsuranceWagered, side_bet);
                if dealer_natural {
                    stats.increment(bucket, StatCategory::InsurancesWon);
                    stats.record(bucket, StatCategory::InsuranceEarned, side_bet * 2.0);
                } else {
                    stats.increment(bucket, StatCategory::InsurancesLost);
                    stats.record(bucket, StatCategory::InsuranceEarned, -side_bet);
                }
                handler.on_insurance(player, side_bet, dealer_natural);
            }
        }
        self.current_round_phase = RoundPhase::InitialSettlement;
        Ok(())
    }

    /// Naturals are paid at once. Otherwise the first decision is taken and
    /// reported here, and a surrender settles the hand.
    #[allowed_phase(InitialSettlement)]
    pub fn settle_naturals<H: RoundEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), SimulationError> {
        let rules = *self.table.rules();
        let up_card = self.up_card();
        let dealer_natural = self.dealer_hand.is_blackjack();
        let strategy = self.strategy.as_ref();
        self.first_decisions.clear();

        for player in self.table.players_mut() {
            let bucket = Stats::bucket(player.count());
            let bet = player.hands()[0].total_bet();
            let player_natural = player.hands()[0].is_blackjack();

            if player_natural || dealer_natural {
                if player_natural && dealer_natural {
                    player.credit(bet);
                    player.stats_mut().increment(bucket, StatCategory::HandsPushed);
                } else if player_natural {
                    let winnings = bet * rules.blackjack_payout;
                    player.credit(bet + winnings);
                    let stats = player.stats_mut();
                    stats.increment(bucket, StatCategory::HandsWon);
                    stats.record(bucket, StatCategory::AmountEarned, winnings);
                } else {
                    let stats = player.stats_mut();
                    stats.increment(bucket, StatCategory::HandsLost);
                    stats.record(bucket, StatCategory::AmountEarned, -bet);
                }
                let stats = player.stats_mut();
                if player_natural {
                    stats.increment(bucket, StatCategory::PlayerBlackjacks);
                }
                if dealer_natural {
                    stats.increment(bucket, StatCategory::DealerBlackjacks);
                }
                player.hands_mut()[0].set_status(HandStatus::Settled);
                self.first_decisions.push(None);
                continue;
            }

            let action = player.decision(0, up_card, &rules, strategy);
            handler.on_decision(player, 0, action);
            if action.is_surrender() && rules.surrender {
                player.credit(bet / 2.0);
                let stats = player.stats_mut();
                stats.increment(bucket, StatCategory::Surrenders);
                stats.record(bucket, StatCategory::AmountEarned, -bet / 2.0);
                player.hands_mut()[0].set_status(HandStatus::Settled);
                self.first_decisions.push(None);
            } else {
                self.first_decisions.push(Some(action));
            }
        }
        self.current_round_phase = RoundPhase::PlayHands;
        Ok(())
    }

    /// Each player plays out every hand in seat order. Splits push new hands
    /// onto the player's list, and the index walk picks them up in turn.
    #[allowed_phase(PlayHands)]
    pub fn play_hands<H: RoundEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), SimulationError> {
        let rules = *self.table.rules();
        let up_card = self.up_card();
        let mut turn = Turn {
            rules: &rules,
            up_card,
            strategy: self.strategy.as_ref(),
            shoe: &mut self.shoe,
        };

        for (seat, player) in self.table.players_mut().iter_mut().enumerate() {
            let mut decided = self.first_decisions.get(seat).copied().flatten();
            let mut hand_index = 0;
            while hand_index < player.hands().len() {
                while player.hands()[hand_index].status() == HandStatus::InPlay {
                    turn.play(player, hand_index, decided.take(), handler)?;
                }
                hand_index += 1;
            }
        }
        self.current_round_phase = RoundPhase::DealerPlay;
        Ok(())
    }

    /// The dealer only draws when some hand is waiting at showdown. The hole
    /// card is counted from then on.
    #[allowed_phase(DealerPlay)]
    pub fn dealer_plays(&mut self) -> Result<(), SimulationError> {
        let rules = *self.table.rules();
        let any_showdown = self
            .table
            .players()
            .iter()
            .flat_map(|player| player.hands())
            .any(|hand| hand.status() == HandStatus::Showdown);
        let hole_card = self.dealer_hand.cards()[0];

        if any_showdown {
            self.shoe.reveal(hole_card);
            while dealer_must_hit(&self.dealer_hand, &rules) {
                let card = self.shoe.deal_card(true)?;
                self.dealer_hand.add_card(card);
            }
        } else if self.dealer_hand.is_blackjack() || rules.dealer_shows_hole_card {
            self.shoe.reveal(hole_card);
        }
        self.current_round_phase = RoundPhase::Showdown;
        Ok(())
    }

    #[allowed_phase(Showdown)]
    pub fn settle_showdown(&mut self) -> Result<(), SimulationError> {
        let dealer_total = self.dealer_hand.total();
        let dealer_busted = self.dealer_hand.is_busted();

        for player in self.table.players_mut() {
            let bucket = Stats::bucket(player.count());
            for hand_index in 0..player.hands().len() {
                let hand = &player.hands()[hand_index];
                if hand.status() != HandStatus::Showdown {
                    continue;
                }
                let bet = hand.total_bet();
                let total = hand.total();
                if dealer_busted || total > dealer_total {
                    player.credit(bet * 2.0);
                    let stats = player.stats_mut();
                    stats.increment(bucket, StatCategory::HandsWon);
                    stats.record(bucket, StatCategory::AmountEarned, bet);
                } else if total == dealer_total {
                    player.credit(bet);
                    player.stats_mut().increment(bucket, StatCategory::HandsPushed);
                } else {
                    let stats = player.stats_mut();
                    stats.increment(bucket, StatCategory::HandsLost);
                    stats.record(bucket, StatCategory::AmountEarned, -bet);
                }
                player.hands_mut()[hand_index].set_status(HandStatus::Settled);
            }
        }
        self.current_round_phase = RoundPhase::Clear;
        Ok(())
    }

    #[allowed_phase(Clear)]
    pub fn clear_round<H: RoundEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), SimulationError> {
        handler.on_round_end(self.rounds_played, &self.dealer_hand, &self.table);
        self.dealer_hand.clear();
        for player in self.table.players_mut() {
            player.clear_hands();
        }
        self.current_round_phase = RoundPhase::BeginRound;
        Ok(())
    }

    fn up_card(&self) -> Card {
        self.dealer_hand.cards()[1]
    }
}

/// Hit below 17, and on soft 17 when the rules say so.
pub fn dealer_must_hit(dealer_hand: &Hand, rules: &Rules) -> bool {
    let total = dealer_hand.total();
    total < 17 || (total == 17 && dealer_hand.is_soft() && rules.dealer_hits_soft17)
}

/// Everything a player's turn needs besides the player.
struct Turn<'a> {
    rules: &'a Rules,
    up_card: Card,
    strategy: &'a dyn StrategyTable,
    shoe: &'a mut Shoe,
}

impl Turn<'_> {
    /// Advances hand `hand_index` by one decision. `decided` is a decision
    /// already taken and reported for this hand.
    fn play<H: RoundEventHandler>(
        &mut self,
        player: &mut Player,
        hand_index: usize,
        decided: Option<Action>,
        handler: &mut H,
    ) -> Result<(), SimulationError> {
        let bucket = Stats::bucket(player.count());

        if player.hands()[hand_index].len() == 1 {
            self.deal_to(player, hand_index)?;
            if self.split_aces_are_done(player, hand_index) {
                player.hands_mut()[hand_index].set_status(HandStatus::Showdown);
            }
            return Ok(());
        }

        let action = match decided {
            Some(action) => action,
            None => {
                let action = player.decision(hand_index, self.up_card, self.rules, self.strategy);
                handler.on_decision(player, hand_index, action);
                action
            }
        };
        let bet = player.hands()[hand_index].total_bet();

        match action.without_surrender() {
            Action::Busted => {
                return Err(SimulationError::DecisionOnBustedHand(
                    player.name().to_string(),
                ))
            }
            Action::P | Action::Ph
                if self.can_split(player, hand_index)
                    && (action != Action::Ph || self.rules.double_after_split) =>
            {
                player.place_wager(bet)?;
                let new_hand = player.hands_mut()[hand_index].split();
                player.hands_mut().push(new_hand);
                let stats = player.stats_mut();
                stats.increment(bucket, StatCategory::Splits);
                stats.increment(bucket, StatCategory::HandsPlayed);
                stats.record(bucket, StatCategory::AmountWagered, bet);
                handler.on_split(player, hand_index);

                self.deal_to(player, hand_index)?;
                if self.split_aces_are_done(player, hand_index) {
                    player.hands_mut()[hand_index].set_status(HandStatus::Showdown);
                }
            }
            Action::Dh | Action::Ds if self.can_double(player, hand_index) => {
                player.place_wager(bet)?;
                player.hands_mut()[hand_index].add_bet(bet);
                let stats = player.stats_mut();
                stats.increment(bucket, StatCategory::Doubles);
                stats.record(bucket, StatCategory::AmountWagered, bet);

                self.deal_to(player, hand_index)?;
                if !self.settle_if_busted(player, hand_index, handler) {
                    player.hands_mut()[hand_index].set_status(HandStatus::Showdown);
                }
            }
            Action::H | Action::Dh | Action::Ph => {
                self.deal_to(player, hand_index)?;
                self.settle_if_busted(player, hand_index, handler);
            }
            _ => player.hands_mut()[hand_index].set_status(HandStatus::Showdown),
        }
        Ok(())
    }

    fn deal_to(&mut self, player: &mut Player, hand_index: usize) -> Result<(), SimulationError> {
        let card = self.shoe.deal_card(true)?;
        player.hands_mut()[hand_index].add_card(card);
        Ok(())
    }

    /// A bust loses the whole bet right away and never meets the dealer.
    fn settle_if_busted<H: RoundEventHandler>(
        &self,
        player: &mut Player,
        hand_index: usize,
        handler: &mut H,
    ) -> bool {
        let hand = &player.hands()[hand_index];
        if !hand.is_busted() {
            return false;
        }
        let bet = hand.total_bet();
        let bucket = Stats::bucket(player.count());
        let stats = player.stats_mut();
        stats.increment(bucket, StatCategory::HandsLost);
        stats.record(bucket, StatCategory::AmountEarned, -bet);
        player.hands_mut()[hand_index].set_status(HandStatus::Settled);
        handler.on_bust(player, hand_index);
        true
    }

    fn can_split(&self, player: &Player, hand_index: usize) -> bool {
        let hand = &player.hands()[hand_index];
        let aces = hand.cards()[0] == Card::Ace;
        hand.is_pair()
            && player.hands().len() < self.rules.max_hands as usize
            && player.can_afford(hand.total_bet())
            && !(aces && hand.is_split_derived() && !self.rules.resplit_aces)
    }

    fn can_double(&self, player: &Player, hand_index: usize) -> bool {
        let hand = &player.hands()[hand_index];
        hand.len() == 2
            && self.rules.double_down
            && (!hand.is_split_derived() || self.rules.double_after_split)
            && player.can_afford(hand.total_bet())
    }

    /// Split Aces take one card each unless they pair up again and may be
    /// resplit.
    fn split_aces_are_done(&self, player: &Player, hand_index: usize) -> bool {
        let hand = &player.hands()[hand_index];
        let cards = hand.cards();
        cards[0] == Card::Ace
            && hand.is_split_derived()
            && (player.hands().len() >= self.rules.max_hands as usize
                || !self.rules.resplit_aces
                || cards[1] != Card::Ace)
    }
}
