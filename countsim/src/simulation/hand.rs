use super::Card;

/// Where a hand is in a round. Hands only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandStatus {
    InPlay,
    /// Standing, waiting to be compared against the dealer.
    Showdown,
    Settled,
}

/// A single group of cards with the money riding on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
    total_bet: f64,
    insurance_bet: f64,
    status: HandStatus,
    /// This hand was split.
    split: bool,
    /// This hand was produced by splitting another hand.
    parent_split: bool,
}

impl Default for Hand {
    fn default() -> Self {
        Hand::new()
    }
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(3),
            total_bet: 0.0,
            insurance_bet: 0.0,
            status: HandStatus::InPlay,
            split: false,
            parent_split: false,
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Note that this method treats Ace as 1.
    pub fn hard_total(&self) -> u8 {
        self.cards.iter().map(Card::blackjack_value).sum()
    }

    /// An Ace can still count as 11 without busting.
    pub fn is_soft(&self) -> bool {
        self.cards.contains(&Card::Ace) && self.hard_total() <= 11
    }

    pub fn total(&self) -> u8 {
        if self.is_soft() {
            self.hard_total() + 10
        } else {
            self.hard_total()
        }
    }

    pub fn is_busted(&self) -> bool {
        self.total() > 21
    }

    /// Any hand touched by a split can reach 21 in two cards without being a
    /// natural.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.total() == 21 && !self.is_split_derived()
    }

    /// Two cards of the same rank. K and Q do not pair up.
    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0] == self.cards[1]
    }

    pub fn is_split_derived(&self) -> bool {
        self.split || self.parent_split
    }

    /// Moves the second card into a new hand carrying the same bet. Callers
    /// check `is_pair` first.
    pub fn split(&mut self) -> Hand {
        debug_assert!(self.is_pair(), "only a pair can be split");
        let mut new_hand = Hand::new();
        if let Some(card) = self.cards.pop() {
            new_hand.add_card(card);
        }
        new_hand.total_bet = self.total_bet;
        new_hand.parent_split = true;
        new_hand.split = true;
        self.split = true;
        new_hand
    }

    pub fn total_bet(&self) -> f64 {
        self.total_bet
    }

    pub fn add_bet(&mut self, amount: f64) {
        self.total_bet += amount;
    }

    pub fn insurance_bet(&self) -> f64 {
        self.insurance_bet
    }

    pub fn set_insurance_bet(&mut self, amount: f64) {
        self.insurance_bet = amount;
    }

    pub fn status(&self) -> HandStatus {
        self.status
    }

    pub fn set_status(&mut self, status: HandStatus) {
        self.status = status;
    }

    pub fn clear(&mut self) {
        *self = Hand::new();
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_of(cards: &[Card]) -> Hand {
        let mut hand = Hand::new();
        for card in cards {
            hand.add_card(*card);
        }
        hand
    }

    #[test]
    fn soft_totals_count_one_ace_as_eleven() {
        let hand = hand_of(&[Card::Ace, Card::Six]);
        assert!(hand.is_soft());
        assert_eq!(hand.total(), 17);

        let hand = hand_of(&[Card::Ace, Card::Six, Card::Nine]);
        assert!(!hand.is_soft());
        assert_eq!(hand.total(), 16);

        let hand = hand_of(&[Card::Ace, Card::Ace]);
        assert!(hand.is_soft());
        assert_eq!(hand.total(), 12);
    }

    #[test]
    fn bust_is_over_twenty_one() {
        let hand = hand_of(&[Card::King, Card::Queen, Card::Two]);
        assert!(hand.is_busted());
        let hand = hand_of(&[Card::King, Card::Queen, Card::Ace]);
        assert!(!hand.is_busted());
        assert_eq!(hand.total(), 21);
    }

    #[test]
    fn blackjack_needs_two_untouched_cards() {
        assert!(hand_of(&[Card::Ace, Card::Jack]).is_blackjack());
        assert!(!hand_of(&[Card::Seven, Card::Seven, Card::Seven]).is_blackjack());
        assert!(!hand_of(&[Card::Ace, Card::Nine]).is_blackjack());
    }

    #[test]
    fn only_equal_ranks_pair_up() {
        assert!(hand_of(&[Card::King, Card::King]).is_pair());
        assert!(!hand_of(&[Card::King, Card::Ten]).is_pair());
        assert!(!hand_of(&[Card::Jack, Card::Queen]).is_pair());
        assert!(!hand_of(&[Card::King, Card::Nine]).is_pair());
        assert!(!hand_of(&[Card::King]).is_pair());
    }

    #[test]
    fn split_copies_the_bet_and_marks_both_hands() {
        let mut hand = hand_of(&[Card::Eight, Card::Eight]);
        hand.add_bet(25.0);
        let new_hand = hand.split();

        assert_eq!(hand.cards(), &[Card::Eight]);
        assert_eq!(new_hand.cards(), &[Card::Eight]);
        assert_eq!(hand.total_bet(), 25.0);
        assert_eq!(new_hand.total_bet(), 25.0);
        assert!(hand.is_split_derived());
        assert!(new_hand.is_split_derived());
    }

    #[test]
    fn split_hands_never_make_blackjack() {
        let mut hand = hand_of(&[Card::Eight, Card::Eight]);
        let mut new_hand = hand.split();
        hand.add_card(Card::Three);
        new_hand.add_card(Card::Ace);
        assert_eq!(new_hand.total(), 19);
        assert!(!new_hand.is_blackjack());

        let mut aces = hand_of(&[Card::Ace, Card::Ace]);
        let mut other = aces.split();
        aces.add_card(Card::King);
        other.add_card(Card::Ace);
        let resplit = other.split();
        assert_eq!(aces.total(), 21);
        assert!(!aces.is_blackjack());
        assert!(resplit.is_split_derived());
    }

    #[test]
    fn clear_resets_everything() {
        let mut hand = hand_of(&[Card::Four, Card::Four]);
        hand.add_bet(10.0);
        hand.set_status(HandStatus::Settled);
        let _ = hand.split();
        hand.clear();
        assert_eq!(hand, Hand::new());
    }
}
