use std::collections::BTreeMap;

use serde::Serialize;
use strum_macros::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Display, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatCategory {
    RoundsPlayed,
    HandsPlayed,
    HandsWon,
    HandsLost,
    HandsPushed,
    AmountWagered,
    /// Net result of main bets, negative for a loss.
    AmountEarned,
    InsuranceWagered,
    /// Net result of insurance side bets.
    InsuranceEarned,
    InsurancesWon,
    InsurancesLost,
    Surrenders,
    Doubles,
    Splits,
    PlayerBlackjacks,
    DealerBlackjacks,
}

/// Sparse table of sums keyed by count bucket, then category.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Stats {
    table: BTreeMap<i32, BTreeMap<StatCategory, f64>>,
}

impl Stats {
    pub fn new() -> Stats {
        Default::default()
    }

    /// The bucket a count is filed under.
    pub fn bucket(count: f32) -> i32 {
        count.round() as i32
    }

    pub fn record(&mut self, bucket: i32, category: StatCategory, amount: f64) {
        *self
            .table
            .entry(bucket)
            .or_default()
            .entry(category)
            .or_insert(0.0) += amount;
    }

    pub fn increment(&mut self, bucket: i32, category: StatCategory) {
        self.record(bucket, category, 1.0);
    }

    pub fn get(&self, bucket: i32, category: StatCategory) -> f64 {
        self.table
            .get(&bucket)
            .and_then(|row| row.get(&category))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn total(&self, category: StatCategory) -> f64 {
        self.table
            .values()
            .filter_map(|row| row.get(&category))
            .sum()
    }

    pub fn buckets(&self) -> impl Iterator<Item = i32> + '_ {
        self.table.keys().copied()
    }

    pub fn merge(&mut self, other: &Stats) {
        for (bucket, row) in &other.table {
            for (category, amount) in row {
                self.record(*bucket, *category, *amount);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_bucketed_by_rounding() {
        assert_eq!(Stats::bucket(1.4), 1);
        assert_eq!(Stats::bucket(1.5), 2);
        assert_eq!(Stats::bucket(-2.6), -3);
        assert_eq!(Stats::bucket(-0.2), 0);
    }

    #[test]
    fn records_accumulate_per_bucket() {
        let mut stats = Stats::new();
        stats.record(2, StatCategory::AmountWagered, 20.0);
        stats.record(2, StatCategory::AmountWagered, 40.0);
        stats.increment(-1, StatCategory::HandsWon);
        assert_eq!(stats.get(2, StatCategory::AmountWagered), 60.0);
        assert_eq!(stats.get(-1, StatCategory::HandsWon), 1.0);
        assert_eq!(stats.get(5, StatCategory::HandsWon), 0.0);
        assert_eq!(stats.total(StatCategory::HandsWon), 1.0);
        assert_eq!(stats.buckets().collect::<Vec<_>>(), vec![-1, 2]);
    }

    #[test]
    fn merge_is_a_plain_sum() {
        let mut left = Stats::new();
        left.record(0, StatCategory::AmountEarned, -10.0);
        let mut right = Stats::new();
        right.record(0, StatCategory::AmountEarned, 15.0);
        right.increment(3, StatCategory::Splits);

        let mut merged = left.clone();
        merged.merge(&right);
        let mut other_way = right.clone();
        other_way.merge(&left);

        assert_eq!(merged, other_way);
        assert_eq!(merged.get(0, StatCategory::AmountEarned), 5.0);
        assert_eq!(merged.get(3, StatCategory::Splits), 1.0);
    }
}
