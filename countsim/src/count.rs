use std::ops::Index;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;

/// Per-rank weights, ordered A, 2, 3, ..., 10, J, Q, K.
type Weights = [f32; 13];

const HI_LO: Weights = [-1., 1., 1., 1., 1., 1., 0., 0., 0., -1., -1., -1., -1.];
const HI_OPT_I: Weights = [0., 0., 1., 1., 1., 1., 0., 0., 0., -1., -1., -1., -1.];
const HI_OPT_II: Weights = [0., 1., 1., 2., 2., 1., 1., 0., 0., -2., -2., -2., -2.];
const OMEGA_II: Weights = [0., 1., 1., 2., 2., 2., 1., 0., -1., -2., -2., -2., -2.];
const ZEN: Weights = [-1., 1., 1., 2., 2., 2., 1., 0., 0., -2., -2., -2., -2.];
const WONG_HALVES: Weights = [
    -1., 0.5, 1., 1., 1.5, 1., 0.5, 0., -0.5, -1., -1., -1., -1.,
];
const KO: Weights = [-1., 1., 1., 1., 1., 1., 1., 0., 0., -1., -1., -1., -1.];

/// Supported card counting systems. Parses from and prints to the names
/// players use for them, e.g. `"Hi-Lo"` or `"KO"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize_enum_str, Deserialize_enum_str,
)]
pub enum CountingSystem {
    #[serde(rename = "Hi-Lo")]
    HiLo,
    #[serde(rename = "Hi-Opt I")]
    HiOptI,
    #[serde(rename = "Hi-Opt II")]
    HiOptII,
    #[serde(rename = "Omega II")]
    OmegaII,
    #[serde(rename = "Zen Count")]
    Zen,
    #[serde(rename = "Wong Halves")]
    WongHalves,
    #[serde(rename = "KO")]
    Ko,
}

impl CountingSystem {
    pub fn weights(&self) -> &'static Weights {
        match self {
            CountingSystem::HiLo => &HI_LO,
            CountingSystem::HiOptI => &HI_OPT_I,
            CountingSystem::HiOptII => &HI_OPT_II,
            CountingSystem::OmegaII => &OMEGA_II,
            CountingSystem::Zen => &ZEN,
            CountingSystem::WongHalves => &WONG_HALVES,
            CountingSystem::Ko => &KO,
        }
    }

    /// Running count at the top of a fresh shoe, per deck beyond the first.
    pub fn starting_offset(&self) -> f32 {
        match self {
            CountingSystem::Ko => -4.0,
            _ => 0.0,
        }
    }

    /// Unbalanced systems are bet and back-counted off the running count.
    pub fn is_balanced(&self) -> bool {
        self.weights().iter().sum::<f32>() == 0.0
    }

    /// Running count over the seen histogram of a shoe of `number_of_decks`.
    pub fn running_count(&self, seen: &CardCount, number_of_decks: u8) -> f32 {
        let weights = self.weights();
        let weighted: f32 = (1..=10u8)
            .map(|value| weights[(value - 1) as usize] * seen[value] as f32)
            .sum();
        weighted + self.starting_offset() * (number_of_decks.max(1) - 1) as f32
    }
}

/// Numbers of each card value (1 to 10 inclusive, where 10 groups 10, J, Q
/// and K) held by a hand or seen out of a shoe.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CardCount {
    counts: [u16; 10],
    total: u16,
}

impl CardCount {
    pub fn new() -> CardCount {
        Default::default()
    }

    pub fn with_number_of_decks(number_of_decks: u8) -> CardCount {
        let mut counts = [number_of_decks as u16 * 4; 10];
        counts[9] = number_of_decks as u16 * 16;
        CardCount {
            counts,
            total: number_of_decks as u16 * 52,
        }
    }

    /// Add a card of given card value.
    ///
    /// Note that this method won't check if the card value is valid.
    pub fn add_card(&mut self, card_value: u8) {
        self.counts[(card_value - 1) as usize] += 1;
        self.total += 1;
    }

    pub fn get_total(&self) -> u16 {
        self.total
    }
}

impl Index<u8> for CardCount {
    type Output = u16;

    fn index(&self, card_value: u8) -> &Self::Output {
        &self.counts[(card_value - 1) as usize]
    }
}
