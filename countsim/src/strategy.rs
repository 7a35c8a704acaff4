use crate::{Action, ConfigError, Rules};

/// What a strategy chart is indexed by besides the dealer's up card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holding {
    Hard(u8),
    Soft(u8),
    /// Blackjack value of each card of the pair, Ace being 1.
    Pair(u8),
}

pub trait StrategyTable {
    /// `dealer_up` is the blackjack value of the up card, Ace being 1.
    fn lookup(&self, holding: Holding, dealer_up: u8) -> Action;
}

/// Multi-deck basic strategy. The H17 and S17 charts differ in a handful of
/// cells, so pick one with `for_rules`.
pub struct BasicStrategy {
    hard_charts: [[Action; 10]; 14],
    soft_charts: [[Action; 10]; 9],
    pair_charts: [[Action; 10]; 10],
}

const H: Action = Action::H;
const S: Action = Action::S;
const DH: Action = Action::Dh;
const DS: Action = Action::Ds;
const P: Action = Action::P;
const PH: Action = Action::Ph;
const RH: Action = Action::Rh;
const RS: Action = Action::Rs;
const RP: Action = Action::Rp;

impl BasicStrategy {
    pub fn for_rules(rules: &Rules) -> BasicStrategy {
        if rules.dealer_hits_soft17 {
            BasicStrategy::hit_soft17()
        } else {
            BasicStrategy::stand_soft17()
        }
    }

    /// Columns run A, 2, ..., 10.
    pub fn hit_soft17() -> BasicStrategy {
        BasicStrategy {
            hard_charts: [
                [H, H, H, H, H, H, H, H, H, H], // 5
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, DH, DH, DH, DH, H, H, H, H],
                [H, DH, DH, DH, DH, DH, DH, DH, DH, H],
                [DH, DH, DH, DH, DH, DH, DH, DH, DH, DH],
                [H, H, H, S, S, S, H, H, H, H],
                [H, S, S, S, S, S, H, H, H, H],
                [H, S, S, S, S, S, H, H, H, H],
                [RH, S, S, S, S, S, H, H, H, RH],
                [RH, S, S, S, S, S, H, H, RH, RH],
                [RS, S, S, S, S, S, S, S, S, S], // 17
                [S, S, S, S, S, S, S, S, S, S],  // 18, 18+
            ],
            soft_charts: [
                [H, H, H, H, DH, DH, H, H, H, H], // soft 13
                [H, H, H, H, DH, DH, H, H, H, H],
                [H, H, H, DH, DH, DH, H, H, H, H],
                [H, H, H, DH, DH, DH, H, H, H, H],
                [H, H, DH, DH, DH, DH, H, H, H, H],
                [H, DS, DS, DS, DS, DS, S, S, H, H],
                [S, S, S, S, S, DS, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S], // soft 21
            ],
            pair_charts: [
                [P, P, P, P, P, P, P, P, P, P], // Double Ace
                [H, PH, PH, P, P, P, P, H, H, H],
                [H, PH, PH, P, P, P, P, H, H, H],
                [H, H, H, H, PH, PH, H, H, H, H],
                [H, DH, DH, DH, DH, DH, DH, DH, DH, H],
                [H, PH, P, P, P, P, H, H, H, H],
                [H, P, P, P, P, P, P, H, H, H],
                [RP, P, P, P, P, P, P, P, P, P],
                [S, P, P, P, P, P, S, P, P, S],
                [S, S, S, S, S, S, S, S, S, S], // Double 10
            ],
        }
    }

    pub fn stand_soft17() -> BasicStrategy {
        let mut strategy = BasicStrategy::hit_soft17();
        strategy.hard_charts[6][0] = H; // 11
        strategy.hard_charts[10][0] = H; // 15
        strategy.hard_charts[12][0] = S; // 17
        strategy.soft_charts[5][1] = S; // soft 18
        strategy.soft_charts[6][5] = S; // soft 19
        strategy.pair_charts[7][0] = P; // 8, 8
        strategy
    }
}

impl StrategyTable for BasicStrategy {
    fn lookup(&self, holding: Holding, dealer_up: u8) -> Action {
        let col = (dealer_up.clamp(1, 10) - 1) as usize;
        match holding {
            Holding::Pair(value) => self.pair_charts[(value.clamp(1, 10) - 1) as usize][col],
            // Two Aces that can't be split again.
            Holding::Soft(total) if total < 13 => H,
            Holding::Soft(total) => self.soft_charts[(total.min(21) - 13) as usize][col],
            Holding::Hard(total) => {
                let row = total.clamp(5, 18) - 5;
                self.hard_charts[row as usize][col]
            }
        }
    }
}

/// Wager as a step function of the count. Below the first step the base
/// amount is bet.
#[derive(Debug, Clone, PartialEq)]
pub struct BetRamp {
    base: f64,
    steps: Vec<(f32, f64)>,
}

impl BetRamp {
    pub fn flat(amount: f64) -> BetRamp {
        BetRamp {
            base: amount,
            steps: vec![],
        }
    }

    /// `steps` are `(count, bet)` pairs: at or above `count`, bet `bet`.
    /// Counts must increase and bets must not decrease.
    pub fn new(base: f64, steps: Vec<(f32, f64)>) -> Result<BetRamp, ConfigError> {
        if !(base > 0.0) {
            return Err(ConfigError::InvalidRule(String::from(
                "bet ramp base must be positive",
            )));
        }
        let mut previous = (f32::NEG_INFINITY, base);
        for &(count, bet) in &steps {
            if count <= previous.0 || bet < previous.1 {
                return Err(ConfigError::InvalidRule(String::from(
                    "bet ramp must be monotonic",
                )));
            }
            previous = (count, bet);
        }
        Ok(BetRamp { base, steps })
    }

    pub fn amount(&self, count: f32) -> f64 {
        self.steps
            .iter()
            .take_while(|(threshold, _)| count >= *threshold)
            .last()
            .map_or(self.base, |(_, bet)| *bet)
    }

    pub fn min_amount(&self) -> f64 {
        self.base
    }

    pub fn max_amount(&self) -> f64 {
        self.steps.last().map_or(self.base, |(_, bet)| *bet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eights_split_against_six() {
        let strategy = BasicStrategy::stand_soft17();
        assert_eq!(strategy.lookup(Holding::Pair(8), 6), Action::P);
        assert_eq!(strategy.lookup(Holding::Pair(8), 1), Action::P);
        let strategy = BasicStrategy::hit_soft17();
        assert_eq!(strategy.lookup(Holding::Pair(8), 1), Action::Rp);
    }

    #[test]
    fn charts_differ_on_soft17_rule() {
        let s17 = BasicStrategy::for_rules(&Rules::default());
        let h17 = BasicStrategy::for_rules(&Rules {
            dealer_hits_soft17: true,
            ..Rules::default()
        });
        assert_eq!(s17.lookup(Holding::Hard(11), 1), Action::H);
        assert_eq!(h17.lookup(Holding::Hard(11), 1), Action::Dh);
        assert_eq!(s17.lookup(Holding::Soft(19), 6), Action::S);
        assert_eq!(h17.lookup(Holding::Soft(19), 6), Action::Ds);
        assert_eq!(s17.lookup(Holding::Hard(17), 1), Action::S);
        assert_eq!(h17.lookup(Holding::Hard(17), 1), Action::Rs);
    }

    #[test]
    fn totals_outside_the_chart_are_clamped() {
        let strategy = BasicStrategy::stand_soft17();
        assert_eq!(strategy.lookup(Holding::Hard(4), 10), Action::H);
        assert_eq!(strategy.lookup(Holding::Hard(20), 10), Action::S);
        assert_eq!(strategy.lookup(Holding::Soft(12), 5), Action::H);
        assert_eq!(strategy.lookup(Holding::Soft(16), 5), Action::Dh);
        assert_eq!(strategy.lookup(Holding::Hard(16), 10), Action::Rh);
    }

    #[test]
    fn ramp_steps_up_with_count() {
        let ramp = BetRamp::new(10.0, vec![(1.0, 20.0), (2.0, 40.0), (4.0, 100.0)]).unwrap();
        assert_eq!(ramp.amount(-3.0), 10.0);
        assert_eq!(ramp.amount(0.9), 10.0);
        assert_eq!(ramp.amount(1.0), 20.0);
        assert_eq!(ramp.amount(3.5), 40.0);
        assert_eq!(ramp.amount(9.0), 100.0);
        assert_eq!(ramp.max_amount(), 100.0);
        assert_eq!(BetRamp::flat(25.0).amount(5.0), 25.0);
    }

    #[test]
    fn ramp_must_be_monotonic() {
        assert!(BetRamp::new(10.0, vec![(2.0, 20.0), (1.0, 40.0)]).is_err());
        assert!(BetRamp::new(10.0, vec![(1.0, 40.0), (2.0, 20.0)]).is_err());
        assert!(BetRamp::new(10.0, vec![(1.0, 5.0)]).is_err());
        assert!(BetRamp::new(0.0, vec![]).is_err());
    }
}
