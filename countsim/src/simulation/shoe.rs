use crate::{CardCount, ConfigError, CountingSystem, SimulationError};

use super::Card;

use rand::seq::SliceRandom;
use rand::Rng;
use strum::IntoEnumIterator;
use tracing::trace;

pub const MAX_DECKS: u8 = 8;

/// Represents a shoe in the real world. The end of `cards` is the next card
/// out, and `seen` holds every card exposed to the table so far.
#[derive(Debug, Clone)]
pub struct Shoe {
    number_of_decks: u8,
    cards: Vec<Card>,
    seen: CardCount,
}

impl Shoe {
    /// Creates a new shoe with ordered cards.
    pub fn new(number_of_decks: u8) -> Result<Shoe, ConfigError> {
        if number_of_decks == 0 || number_of_decks > MAX_DECKS {
            return Err(ConfigError::InvalidShoe(format!(
                "number_of_decks must be between 1 and {}",
                MAX_DECKS
            )));
        }
        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks as usize * 4 {
            cards.extend(Card::iter());
        }
        Ok(Shoe {
            number_of_decks,
            cards,
            seen: CardCount::new(),
        })
    }

    /// Creates a shuffled shoe whose first cards dealt are exactly `firsts`,
    /// in order. Fails if the shoe doesn't hold enough of some rank.
    pub fn stacked<R: Rng + ?Sized>(
        number_of_decks: u8,
        firsts: &[Card],
        rng: &mut R,
    ) -> Result<Shoe, ConfigError> {
        let mut shoe = Shoe::new(number_of_decks)?;
        for card in firsts {
            match shoe.cards.iter().position(|c| c == card) {
                Some(index) => {
                    shoe.cards.swap_remove(index);
                }
                None => {
                    return Err(ConfigError::InvalidShoe(format!(
                        "not enough {} left to stack",
                        card
                    )))
                }
            }
        }
        shoe.cards.shuffle(rng);
        shoe.cards.extend(firsts.iter().rev());
        Ok(shoe)
    }

    /// Returns every card into the shoe, shuffles, and burns the top card.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SimulationError> {
        self.cards.clear();
        for _ in 0..self.number_of_decks as usize * 4 {
            self.cards.extend(Card::iter());
        }
        self.seen = CardCount::new();
        self.cards.shuffle(rng);
        self.burn_card()?;
        Ok(())
    }

    /// Deals the next card. A `seen` card goes into the count right away.
    pub fn deal_card(&mut self, seen: bool) -> Result<Card, SimulationError> {
        let card = self.cards.pop().ok_or(SimulationError::ShoeExhausted)?;
        if seen {
            self.seen.add_card(card.blackjack_value());
        }
        trace!(card = %card, seen, remaining = self.cards.len(), "deal card");
        Ok(card)
    }

    pub fn burn_card(&mut self) -> Result<Card, SimulationError> {
        self.deal_card(false)
    }

    /// Exposes a card that was dealt face down.
    pub fn reveal(&mut self, card: Card) {
        self.seen.add_card(card.blackjack_value());
    }

    pub fn seen(&self) -> &CardCount {
        &self.seen
    }

    pub fn number_of_decks(&self) -> u8 {
        self.number_of_decks
    }

    pub fn total_cards(&self) -> usize {
        self.number_of_decks as usize * 52
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    /// Remaining decks the way a counter eyeballs the discard tray: half
    /// decks while a deck or more is left, then 1, 0.5 or 0.25. Never zero.
    pub fn remaining_decks(&self) -> f32 {
        let decks = self.cards.len() as f32 / 52.0;
        if decks >= 1.0 {
            let whole = decks.floor();
            let fraction = decks - whole;
            if fraction >= 0.75 {
                whole + 1.0
            } else if fraction >= 0.25 {
                whole + 0.5
            } else {
                whole
            }
        } else if decks >= 0.75 {
            1.0
        } else if decks >= 0.375 {
            0.5
        } else {
            0.25
        }
    }

    pub fn running_count(&self, system: CountingSystem) -> f32 {
        system.running_count(&self.seen, self.number_of_decks)
    }

    pub fn true_count(&self, system: CountingSystem) -> Result<f32, SimulationError> {
        if !system.is_balanced() {
            return Err(SimulationError::UnbalancedTrueCount(system));
        }
        Ok(self.running_count(system) / self.remaining_decks())
    }

    /// Checks if the cut card has been reached.
    pub fn cut_card_reached(&self, penetration: f64) -> Result<bool, SimulationError> {
        if !(penetration > 0.5 && penetration <= 0.9) {
            return Err(SimulationError::PenetrationOutOfRange(penetration));
        }
        let total = self.total_cards() as f64;
        let dealt = total - self.cards.len() as f64;
        Ok(dealt / total >= penetration)
    }
}
