//! Page-level derivations shared by the terminal dashboard and the CLI.
//!
//! Everything here is a pure function of fetched data; the binaries only add
//! fetching and rendering.

use crate::domain::{
    AggregateRecord, ArbitrageOpportunity, FundingRateRecord, PeriodAggregate, PeriodKey, Row,
    RowIdentity,
};
use crate::rank::{rank_total_rates, RankMap};
use crate::sort::{sorted_by, ArbitrageSortField, RowSortField, SortKey, SortState};

/// Exchange the Search page selects first.
pub const PREFERRED_EXCHANGE: &str = "binance";

/// Number of records plotted on the Overview chart.
pub const OVERVIEW_CHART_POINTS: usize = 20;

/// Collapse the aggregate endpoint's per-period records for one pair into a
/// single row. Unknown period types are ignored; a later record for the same
/// period replaces an earlier one.
pub fn pair_row(exchange: &str, symbol: &str, records: &[AggregateRecord]) -> Row {
    let mut row = Row::new(symbol).with_exchange(exchange);
    for rec in records {
        if let Ok(period) = rec.period_type.parse::<PeriodKey>() {
            row.aggs
                .insert(period, PeriodAggregate::new(rec.total_rate, rec.apr));
        }
    }
    row
}

/// Funding-rate history ordered oldest first.
pub fn history_ascending(records: &[FundingRateRecord]) -> Vec<FundingRateRecord> {
    let mut out = records.to_vec();
    out.sort_by_key(|r| r.timestamp_ms);
    out
}

/// One point on the Overview trend chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub timestamp_ms: i64,
    /// Funding rate in percent.
    pub percent: f64,
}

/// Summary card and chart data for the Overview page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketOverview {
    /// Rate of the first (most recent) record.
    pub latest_rate: Option<f64>,
    pub positive: usize,
    pub negative: usize,
    pub total: usize,
    /// Oldest first.
    pub chart: Vec<ChartPoint>,
}

impl MarketOverview {
    pub fn from_records(records: &[FundingRateRecord]) -> Self {
        let chart = records
            .iter()
            .take(OVERVIEW_CHART_POINTS)
            .rev()
            .map(|r| ChartPoint {
                timestamp_ms: r.timestamp_ms,
                percent: r.funding_rate * 100.0,
            })
            .collect();

        Self {
            latest_rate: records.first().map(|r| r.funding_rate),
            positive: records.iter().filter(|r| r.funding_rate > 0.0).count(),
            negative: records.iter().filter(|r| r.funding_rate < 0.0).count(),
            total: records.len(),
            chart,
        }
    }
}

/// Options whose text contains `query`, case-insensitively.
/// An empty query keeps everything.
pub fn filter_options<'a>(options: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    options
        .iter()
        .map(String::as_str)
        .filter(|o| needle.is_empty() || o.to_lowercase().contains(&needle))
        .collect()
}

/// Lower-case exchange ids.
pub fn normalize_exchanges(exchanges: Vec<String>) -> Vec<String> {
    exchanges.into_iter().map(|e| e.to_lowercase()).collect()
}

/// `binance` when listed, otherwise the first exchange.
pub fn default_exchange(exchanges: &[String]) -> Option<&str> {
    exchanges
        .iter()
        .find(|e| e.as_str() == PREFERRED_EXCHANGE)
        .or_else(|| exchanges.first())
        .map(String::as_str)
}

/// A sortable table whose sorted view is memoized on
/// (row-set generation, sort state).
#[derive(Debug, Clone)]
pub struct SortedTable<T, K> {
    items: Vec<T>,
    generation: u64,
    sort: SortState<K>,
    view: Vec<T>,
    memo: Option<(u64, SortState<K>)>,
}

impl<T, K> SortedTable<T, K>
where
    T: Clone,
    K: SortKey<T> + Copy + PartialEq,
{
    pub fn new(sort: SortState<K>) -> Self {
        let mut table = Self {
            items: Vec::new(),
            generation: 0,
            sort,
            view: Vec::new(),
            memo: None,
        };
        table.refresh();
        table
    }

    /// Replace the whole row set.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.generation += 1;
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.set_items(Vec::new());
    }

    /// Header click: same field flips direction, a new field sorts descending.
    pub fn toggle_sort(&mut self, field: K) {
        self.sort.toggle(field);
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortState<K>) {
        self.sort = sort;
        self.refresh();
    }

    pub fn sort(&self) -> SortState<K> {
        self.sort
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[T] {
        &self.view
    }

    /// Rows in fetch order.
    pub fn unsorted(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn refresh(&mut self) {
        let key = (self.generation, self.sort);
        if self.memo.as_ref() == Some(&key) {
            return;
        }
        self.view = sorted_by(&self.items, &self.sort);
        self.memo = Some(key);
    }
}

/// Multi-period rows with their rank map.
///
/// Ranking is order-independent, so the rank map is rebuilt only when the row
/// set changes; sorting only reorders the view.
#[derive(Debug, Clone)]
pub struct RankedTable {
    identity: RowIdentity,
    table: SortedTable<Row, RowSortField>,
    ranks: RankMap,
}

impl RankedTable {
    pub fn new(identity: RowIdentity, sort: SortState<RowSortField>) -> Self {
        Self {
            identity,
            table: SortedTable::new(sort),
            ranks: RankMap::default(),
        }
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.ranks = rank_total_rates(&rows, self.identity);
        self.table.set_items(rows);
    }

    pub fn clear(&mut self) {
        self.set_rows(Vec::new());
    }

    pub fn toggle_sort(&mut self, field: RowSortField) {
        self.table.toggle_sort(field);
    }

    pub fn sort(&self) -> SortState<RowSortField> {
        self.table.sort()
    }

    pub fn rows(&self) -> &[Row] {
        self.table.rows()
    }

    pub fn ranks(&self) -> &RankMap {
        &self.ranks
    }

    pub fn identity(&self) -> RowIdentity {
        self.identity
    }

    pub fn generation(&self) -> u64 {
        self.table.generation()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Arbitrage opportunities with client-side column sorting.
pub type ArbitrageTable = SortedTable<ArbitrageOpportunity, ArbitrageSortField>;

impl Default for ArbitrageTable {
    fn default() -> Self {
        SortedTable::new(SortState::new(ArbitrageSortField::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortOrder;

    fn rec(ts: i64, rate: f64) -> FundingRateRecord {
        FundingRateRecord {
            id: ts,
            exchange: "binance".into(),
            symbol: "BTC".into(),
            funding_rate: rate,
            funding_time: String::new(),
            timestamp_ms: ts,
        }
    }

    fn agg(period: &str, rate: f64) -> AggregateRecord {
        AggregateRecord {
            period_type: period.into(),
            total_rate: rate,
            apr: rate * 10.0,
        }
    }

    #[test]
    fn pair_row_ignores_unknown_periods() {
        let row = pair_row(
            "okx",
            "ETH",
            &[agg("hour", 0.001), agg("decade", 1.0), agg("day", 0.002)],
        );
        assert_eq!(row.exchange.as_deref(), Some("okx"));
        assert_eq!(row.aggs.len(), 2);
        assert_eq!(row.total_rate(PeriodKey::Day), Some(0.002));
    }

    #[test]
    fn history_sorted_oldest_first() {
        let h = history_ascending(&[rec(3, 0.0), rec(1, 0.0), rec(2, 0.0)]);
        let ts: Vec<_> = h.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(ts, vec![1, 2, 3]);
    }

    #[test]
    fn overview_summary_and_chart() {
        let records: Vec<_> = (0..25)
            .map(|i| rec(100 - i, if i % 2 == 0 { 0.0001 } else { -0.0001 }))
            .chain(std::iter::once(rec(0, 0.0)))
            .collect();
        let ov = MarketOverview::from_records(&records);
        assert_eq!(ov.latest_rate, Some(0.0001));
        assert_eq!(ov.positive, 13);
        assert_eq!(ov.negative, 12);
        assert_eq!(ov.total, 26);
        assert_eq!(ov.chart.len(), 20);
        // First 20 records reversed: oldest of them (ts 81) first.
        assert_eq!(ov.chart[0].timestamp_ms, 81);
        assert_eq!(ov.chart[19].timestamp_ms, 100);
        assert!((ov.chart[19].percent - 0.01).abs() < 1e-12);

        assert_eq!(MarketOverview::from_records(&[]), MarketOverview::default());
    }

    #[test]
    fn option_filtering() {
        let opts = vec!["binance".to_string(), "Bybit".to_string(), "okx".to_string()];
        assert_eq!(filter_options(&opts, "BI"), vec!["binance", "Bybit"]);
        assert_eq!(filter_options(&opts, "  ").len(), 3);
        assert!(filter_options(&opts, "kraken").is_empty());
    }

    #[test]
    fn default_exchange_prefers_binance() {
        let ex = normalize_exchanges(vec!["OKX".into(), "Binance".into()]);
        assert_eq!(default_exchange(&ex), Some("binance"));
        let ex = vec!["okx".to_string(), "bybit".to_string()];
        assert_eq!(default_exchange(&ex), Some("okx"));
        assert_eq!(default_exchange(&[]), None);
    }

    #[test]
    fn ranked_table_sorts_and_ranks() {
        let mut t = RankedTable::new(
            RowIdentity::ExchangeSymbol,
            SortState::new(RowSortField::Volume),
        );
        t.set_rows(vec![
            Row::new("BTC").with_exchange("binance").with_volume(10.0),
            Row::new("ETH").with_exchange("okx").with_volume(30.0).with_agg(
                PeriodKey::Hour,
                PeriodAggregate::new(0.001, 0.1),
            ),
        ]);
        assert_eq!(t.rows()[0].symbol, "ETH");
        assert_eq!(t.generation(), 1);
        assert!(t
            .ranks()
            .get(&crate::domain::RowKey::pair("okx", "ETH"), PeriodKey::Hour)
            .is_some());

        t.toggle_sort(RowSortField::Volume);
        assert_eq!(t.sort().order, SortOrder::Asc);
        assert_eq!(t.rows()[0].symbol, "BTC");
        assert_eq!(t.generation(), 1);

        t.clear();
        assert!(t.is_empty());
        assert!(t.ranks().is_empty());
    }

    #[test]
    fn arbitrage_table_defaults_to_annualized_desc() {
        let t = ArbitrageTable::default();
        assert_eq!(t.sort().field, ArbitrageSortField::AnnualizedArbitrage);
        assert_eq!(t.sort().order, SortOrder::Desc);
    }
}
