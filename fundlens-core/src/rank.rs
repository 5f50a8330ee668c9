//! Distinct-value ranking of period aggregates across a result set.
//!
//! Ranks are ordinal positions among *distinct* values (rows that share a value
//! share a rank), computed independently per period. The rank map is a pure
//! function of its inputs and is rebuilt whenever the row set changes.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{PeriodKey, Row, RowIdentity, RowKey};

/// Position of one row's value among the distinct values of a period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankInfo {
    /// 0 = highest distinct value.
    pub rank: usize,
    /// Number of distinct finite values observed for the period.
    pub total: usize,
    /// The row's own value.
    pub value: f64,
}

/// Row identity → period → rank.
///
/// Rows or periods without a finite value have no entry at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankMap {
    entries: BTreeMap<RowKey, BTreeMap<PeriodKey, RankInfo>>,
}

impl RankMap {
    pub fn get(&self, key: &RowKey, period: PeriodKey) -> Option<&RankInfo> {
        self.entries.get(key).and_then(|m| m.get(&period))
    }

    /// All ranked periods for one row.
    pub fn row(&self, key: &RowKey) -> Option<&BTreeMap<PeriodKey, RankInfo>> {
        self.entries.get(key)
    }

    /// Rows ranked for a single period.
    pub fn period(&self, period: PeriodKey) -> impl Iterator<Item = (&RowKey, &RankInfo)> {
        self.entries
            .iter()
            .filter_map(move |(k, m)| m.get(&period).map(|info| (k, info)))
    }

    /// Number of rows with at least one ranked period.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// -0.0 and 0.0 are the same distinct value.
fn distinct_bits(v: f64) -> u64 {
    (v + 0.0).to_bits()
}

/// Build the rank map for `periods` over `rows`.
///
/// For each period independently: collect `value_of(row, period)`, keep finite
/// values, deduplicate by exact numeric equality, sort descending, and record
/// each row's ordinal under its identity key.
pub fn compute_rank_map<F>(
    rows: &[Row],
    periods: &[PeriodKey],
    identity: RowIdentity,
    value_of: F,
) -> RankMap
where
    F: Fn(&Row, PeriodKey) -> Option<f64>,
{
    let mut map = RankMap::default();

    for &period in periods {
        let mut values: Vec<f64> = rows
            .iter()
            .filter_map(|row| value_of(row, period))
            .filter(|v| v.is_finite())
            .map(|v| v + 0.0)
            .collect();
        values.sort_by(|a, b| b.total_cmp(a));
        values.dedup_by(|a, b| a == b);

        let total = values.len();
        if total == 0 {
            continue;
        }

        let ordinal: HashMap<u64, usize> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (distinct_bits(*v), i))
            .collect();

        for row in rows {
            let Some(value) = value_of(row, period).filter(|v| v.is_finite()) else {
                continue;
            };
            let Some(&rank) = ordinal.get(&distinct_bits(value)) else {
                continue;
            };
            map.entries
                .entry(row.key(identity))
                .or_default()
                .insert(period, RankInfo { rank, total, value });
        }
    }

    map
}

/// Rank every period by `total_rate`, the value every multi-period table colours.
pub fn rank_total_rates(rows: &[Row], identity: RowIdentity) -> RankMap {
    compute_rank_map(rows, &PeriodKey::ALL, identity, |row, period| {
        row.total_rate(period)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeriodAggregate;

    fn hour_row(symbol: &str, rate: f64) -> Row {
        Row::new(symbol).with_agg(PeriodKey::Hour, PeriodAggregate::new(rate, 0.0))
    }

    #[test]
    fn ties_share_rank_and_total_counts_distinct() {
        let rows = vec![
            hour_row("A", 5.0),
            hour_row("B", 5.0),
            hour_row("C", 3.0),
            hour_row("D", 1.0),
        ];
        let map = rank_total_rates(&rows, RowIdentity::Symbol);
        let h = PeriodKey::Hour;
        let get = |s: &str| *map.get(&RowKey::symbol(s), h).unwrap();

        assert_eq!(get("A").rank, 0);
        assert_eq!(get("B").rank, 0);
        assert_eq!(get("C").rank, 1);
        assert_eq!(get("D").rank, 2);
        for s in ["A", "B", "C", "D"] {
            assert_eq!(get(s).total, 3);
        }
        assert_eq!(get("C").value, 3.0);
    }

    #[test]
    fn missing_and_nan_values_are_absent() {
        let rows = vec![hour_row("A", 0.1), Row::new("B"), hour_row("C", f64::NAN)];
        let map = rank_total_rates(&rows, RowIdentity::Symbol);
        assert!(map.get(&RowKey::symbol("A"), PeriodKey::Hour).is_some());
        assert!(map.get(&RowKey::symbol("B"), PeriodKey::Hour).is_none());
        assert!(map.get(&RowKey::symbol("C"), PeriodKey::Hour).is_none());
        assert!(map.row(&RowKey::symbol("B")).is_none());
        assert_eq!(map.get(&RowKey::symbol("A"), PeriodKey::Hour).unwrap().total, 1);
    }

    #[test]
    fn periods_are_ranked_independently() {
        let rows = vec![
            Row::new("A")
                .with_agg(PeriodKey::Hour, PeriodAggregate::new(1.0, 0.0))
                .with_agg(PeriodKey::Day, PeriodAggregate::new(-1.0, 0.0)),
            Row::new("B")
                .with_agg(PeriodKey::Hour, PeriodAggregate::new(2.0, 0.0))
                .with_agg(PeriodKey::Day, PeriodAggregate::new(5.0, 0.0)),
        ];
        let map = rank_total_rates(&rows, RowIdentity::Symbol);
        assert_eq!(map.get(&RowKey::symbol("A"), PeriodKey::Hour).unwrap().rank, 1);
        assert_eq!(map.get(&RowKey::symbol("A"), PeriodKey::Day).unwrap().rank, 1);
        assert_eq!(map.get(&RowKey::symbol("B"), PeriodKey::Day).unwrap().rank, 0);
        assert!(map.get(&RowKey::symbol("A"), PeriodKey::Week).is_none());
    }

    #[test]
    fn rank_is_order_independent() {
        let rows = vec![hour_row("A", 0.3), hour_row("B", -0.1), hour_row("C", 0.2)];
        let mut reversed = rows.clone();
        reversed.reverse();
        assert_eq!(
            rank_total_rates(&rows, RowIdentity::Symbol),
            rank_total_rates(&reversed, RowIdentity::Symbol)
        );
    }

    #[test]
    fn cross_exchange_rows_keep_separate_entries() {
        let rows = vec![
            hour_row("BTC", 0.002).with_exchange("binance"),
            hour_row("BTC", 0.001).with_exchange("okx"),
        ];
        let map = rank_total_rates(&rows, RowIdentity::ExchangeSymbol);
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&RowKey::pair("binance", "BTC"), PeriodKey::Hour).unwrap().rank,
            0
        );
        assert_eq!(
            map.get(&RowKey::pair("okx", "BTC"), PeriodKey::Hour).unwrap().rank,
            1
        );
    }

    #[test]
    fn negative_zero_equals_zero() {
        let rows = vec![hour_row("A", 0.0), hour_row("B", -0.0)];
        let map = rank_total_rates(&rows, RowIdentity::Symbol);
        assert_eq!(map.get(&RowKey::symbol("B"), PeriodKey::Hour).unwrap().total, 1);
    }

    #[test]
    fn period_iterator() {
        let rows = vec![hour_row("A", 0.3), hour_row("B", 0.1)];
        let map = rank_total_rates(&rows, RowIdentity::Symbol);
        assert_eq!(map.period(PeriodKey::Hour).count(), 2);
        assert_eq!(map.period(PeriodKey::Year).count(), 0);
    }
}
