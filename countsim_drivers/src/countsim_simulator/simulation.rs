use std::collections::BTreeMap;

use countsim::{
    Action, Hand, Player, RoundEventHandler, Rules, Shoe, Simulator, StatCategory, Stats, Table,
};
use countsim_drivers::{build_table, Config, DriverError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

/// Prints every round as it is played.
#[derive(Debug, Default)]
pub struct RoundPrinter {
    decisions: BTreeMap<(String, usize), Vec<String>>,
}

impl RoundEventHandler for RoundPrinter {
    fn on_round_begin(&mut self, round: u64, table: &Table) {
        self.decisions.clear();
        println!("Round #{}", round);
        let observers: Vec<_> = table.observers().iter().map(Player::name).collect();
        if !observers.is_empty() {
            println!("Watching: {}", observers.join(", "));
        }
    }

    fn on_wager(&mut self, player: &Player, amount: f64) {
        println!("{} bets {} at count {:.2}", player.name(), amount, player.count());
    }

    fn on_insurance(&mut self, player: &Player, amount: f64, dealer_natural: bool) {
        println!(
            "{} insures for {} at count {:.2}: {}",
            player.name(),
            amount,
            player.insurance_count(),
            if dealer_natural { "won" } else { "lost" }
        );
    }

    fn on_decision(&mut self, player: &Player, hand_index: usize, action: Action) {
        self.decisions
            .entry((player.name().to_string(), hand_index))
            .or_default()
            .push(action.to_string());
    }

    fn on_split(&mut self, player: &Player, hand_index: usize) {
        self.decisions
            .entry((player.name().to_string(), hand_index))
            .or_default()
            .push(String::from("SPLIT"));
    }

    fn on_bust(&mut self, player: &Player, hand_index: usize) {
        self.decisions
            .entry((player.name().to_string(), hand_index))
            .or_default()
            .push(String::from("BUST"));
    }

    fn on_round_end(&mut self, _round: u64, dealer_hand: &Hand, table: &Table) {
        println!("Dealer: {} ({})", dealer_hand, dealer_hand.total());
        for player in table.players() {
            for (hand_index, hand) in player.hands().iter().enumerate() {
                let decisions = self
                    .decisions
                    .get(&(player.name().to_string(), hand_index))
                    .map(|decisions| decisions.join(" "))
                    .unwrap_or_default();
                println!(
                    "{} hand {}: {} ({}) bet {} [{}]",
                    player.name(),
                    hand_index,
                    hand,
                    hand.total(),
                    hand.total_bet(),
                    decisions
                );
            }
            println!("{} bankroll: {:.2}", player.name(), player.bankroll());
        }
        println!("----------------------------------------------------");
    }
}

#[derive(Debug, Default, Serialize)]
pub struct PlayerReport {
    pub bankroll_delta: f64,
    pub stats: Stats,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub shoes: u64,
    pub rounds: u64,
    pub players: BTreeMap<String, PlayerReport>,
}

struct ShoeOutcome {
    rounds: u64,
    players: Vec<(String, f64, Stats)>,
}

impl Report {
    fn add(&mut self, outcome: ShoeOutcome) {
        self.shoes += 1;
        self.rounds += outcome.rounds;
        for (name, bankroll_delta, stats) in outcome.players {
            let report = self.players.entry(name).or_default();
            report.bankroll_delta += bankroll_delta;
            report.stats.merge(&stats);
        }
    }
}

/// Plays `number_of_shoes` independent shoes on a pool of
/// `number_of_threads` workers. With a printer the shoes are played one
/// after another on this thread so rounds print in order.
pub fn simulate(
    config: &Config,
    printer: Option<&mut RoundPrinter>,
) -> Result<Report, DriverError> {
    let rules: Rules = config.rule.clone().try_into()?;
    config.shoe.validate()?;
    let table = build_table(rules, &config.players)?;
    let seats = table.players().len() + table.observers().len();
    config.shoe.check_reserve(&rules, seats)?;
    info!(
        shoes = config.simulator.number_of_shoes,
        threads = config.simulator.number_of_threads,
        seed = ?config.simulator.seed,
        "simulation begins"
    );

    let outcomes: Vec<ShoeOutcome> = match printer {
        Some(printer) => (0..config.simulator.number_of_shoes)
            .map(|shoe_index| play_shoe(config, rules, shoe_index, &mut *printer))
            .collect::<Result<Vec<_>, DriverError>>()?,
        None => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.simulator.number_of_threads)
                .build()?;
            pool.install(|| {
                (0..config.simulator.number_of_shoes)
                    .into_par_iter()
                    .map(|shoe_index| play_shoe(config, rules, shoe_index, &mut ()))
                    .collect::<Result<Vec<_>, DriverError>>()
            })?
        }
    };

    let mut report = Report::default();
    for outcome in outcomes {
        report.add(outcome);
    }
    info!(shoes = report.shoes, rounds = report.rounds, "simulation ends");
    Ok(report)
}

fn play_shoe<H: RoundEventHandler>(
    config: &Config,
    rules: Rules,
    shoe_index: u64,
    handler: &mut H,
) -> Result<ShoeOutcome, DriverError> {
    let mut rng = match config.simulator.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(shoe_index)),
        None => StdRng::from_entropy(),
    };
    let mut shoe = Shoe::new(config.shoe.number_of_decks)?;
    shoe.shuffle(&mut rng)?;
    let mut simulator = Simulator::new(build_table(rules, &config.players)?, shoe);
    let rounds = simulator.run_shoe(config.shoe.penetration, handler)?;

    let table = simulator.into_table();
    let players = table
        .everyone()
        .map(|player| {
            let starting = config
                .players
                .iter()
                .find(|config_player| config_player.name == player.name())
                .map_or(0.0, |config_player| config_player.bankroll);
            (
                player.name().to_string(),
                player.bankroll() - starting,
                player.stats().clone(),
            )
        })
        .collect();
    Ok(ShoeOutcome { rounds, players })
}

fn percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

pub fn print_report(report: &Report) {
    println!("Shoes: {}   Rounds: {}", report.shoes, report.rounds);
    for (name, player) in &report.players {
        let stats = &player.stats;
        let wagered = stats.total(StatCategory::AmountWagered);
        let earned = stats.total(StatCategory::AmountEarned);
        let insurance_wagered = stats.total(StatCategory::InsuranceWagered);
        let insurance_earned = stats.total(StatCategory::InsuranceEarned);
        println!();
        println!("== {} ==", name);
        println!(
            "Rounds: {}. Hands: {}. Won/Lost/Pushed: {}/{}/{}.",
            stats.total(StatCategory::RoundsPlayed),
            stats.total(StatCategory::HandsPlayed),
            stats.total(StatCategory::HandsWon),
            stats.total(StatCategory::HandsLost),
            stats.total(StatCategory::HandsPushed),
        );
        println!(
            "Wagered: {:.2}. Earned: {:.2}. Rate: {:.3}%. Bankroll change: {:.2}.",
            wagered,
            earned,
            percent(earned, wagered),
            player.bankroll_delta,
        );
        println!(
            "Insurance wagered: {:.2}. Earned: {:.2}. Won/Lost: {}/{}.",
            insurance_wagered,
            insurance_earned,
            stats.total(StatCategory::InsurancesWon),
            stats.total(StatCategory::InsurancesLost),
        );
        println!(
            "Blackjacks: {}. Dealer blackjacks: {}. Doubles: {}. Splits: {}. Surrenders: {}.",
            stats.total(StatCategory::PlayerBlackjacks),
            stats.total(StatCategory::DealerBlackjacks),
            stats.total(StatCategory::Doubles),
            stats.total(StatCategory::Splits),
            stats.total(StatCategory::Surrenders),
        );
        println!(
            "{:>6} {:>10} {:>14} {:>14} {:>9}",
            "count", "rounds", "wagered", "earned", "rate"
        );
        for bucket in stats.buckets() {
            let wagered = stats.get(bucket, StatCategory::AmountWagered);
            let earned = stats.get(bucket, StatCategory::AmountEarned);
            println!(
                "{:>6} {:>10} {:>14.2} {:>14.2} {:>8.3}%",
                bucket,
                stats.get(bucket, StatCategory::RoundsPlayed),
                wagered,
                earned,
                percent(earned, wagered),
            );
        }
    }
}
