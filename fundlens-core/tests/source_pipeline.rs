//! Fetch → sort → rank → cell pipeline over an in-memory source.

use fundlens_core::api::{
    AggregateQuery, ArbitrageQuery, FundingRateQuery, FundingSource, MemorySource, TopVolumeQuery,
};
use fundlens_core::cell::period_cell;
use fundlens_core::color::Rgb;
use fundlens_core::domain::{
    AggregateRecord, ArbitrageOpportunity, FundingRateRecord, PeriodAggregate, PeriodKey, Row,
    RowIdentity,
};
use fundlens_core::pages::{pair_row, ArbitrageTable, MarketOverview, RankedTable};
use fundlens_core::sort::{ArbitrageSortField, RowSortField, SortState};

fn ranked_source() -> MemorySource {
    let mut src = MemorySource::new();
    src.exchanges = vec!["binance".into(), "okx".into()];
    src.rows = (0..10)
        .map(|i| {
            let rate = (i as f64 - 4.0) * 1e-4; // -0.0004 ..= 0.0005
            Row::new(format!("C{i}"))
                .with_exchange(if i % 2 == 0 { "binance" } else { "okx" })
                .with_volume(1_000.0 * (10 - i) as f64)
                .with_agg(PeriodKey::Day, PeriodAggregate::new(rate, rate * 365.0))
        })
        .collect();
    src
}

#[test]
fn top_volume_table_colours_extremes() {
    let src = ranked_source();
    let rows = src.top_volume_aggregate(&TopVolumeQuery::top(10)).unwrap();

    let mut table = RankedTable::new(RowIdentity::ExchangeSymbol, SortState::new(RowSortField::Volume));
    table.set_rows(rows);
    assert_eq!(table.rows()[0].symbol, "C0");

    table.toggle_sort(RowSortField::Period(PeriodKey::Day));
    let order: Vec<&str> = table.rows().iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order[0], "C9");
    assert_eq!(order[9], "C0");

    let cells: Vec<_> = table
        .rows()
        .iter()
        .map(|r| period_cell(r, PeriodKey::Day, table.ranks(), table.identity()))
        .collect();

    // 10 distinct values: ranks 0..3 green, ranks 7..10 red.
    let shaded: Vec<Option<Rgb>> = cells.iter().map(|c| c.background).collect();
    assert_eq!(shaded[0], Some(Rgb(16, 185, 129)));
    assert!(shaded[1].is_some());
    assert!(shaded[2].is_some());
    assert!(shaded[3..7].iter().all(Option::is_none));
    // C4 is zero and lands at rank 5: plain.
    assert_eq!(cells[5].text, "0.00000%");
    assert!(shaded[7].is_some());
    assert_eq!(shaded[9], Some(Rgb(239, 68, 68)));
}

#[test]
fn failing_source_degrades_to_empty_table() {
    let src = ranked_source();
    let mut table = RankedTable::new(RowIdentity::Symbol, SortState::new(RowSortField::Volume));
    table.set_rows(src.top_volume_aggregate(&TopVolumeQuery::top(10)).unwrap());
    assert_eq!(table.len(), 10);

    src.set_failing(true);
    match src.top_volume_aggregate(&TopVolumeQuery::top(10)) {
        Ok(rows) => table.set_rows(rows),
        Err(_) => table.clear(),
    }
    assert!(table.is_empty());
    assert!(table.ranks().is_empty());
}

#[test]
fn pair_detail_from_aggregates() {
    let mut src = MemorySource::new();
    src.aggregates.insert(
        ("okx".into(), "ETH".into()),
        vec![
            AggregateRecord { period_type: "hour".into(), total_rate: 0.0001, apr: 0.1 },
            AggregateRecord { period_type: "year".into(), total_rate: 0.2, apr: 0.2 },
            AggregateRecord { period_type: "fortnight".into(), total_rate: 0.3, apr: 0.3 },
        ],
    );
    let query = AggregateQuery {
        exchange: Some("okx".into()),
        symbol: Some("ETH".into()),
        limit: Some(1000),
    };
    let records = src.funding_rate_aggregate(&query).unwrap();
    let row = pair_row("okx", "ETH", &records);
    assert_eq!(row.aggs.len(), 2);
    assert_eq!(row.apr(PeriodKey::Year), Some(0.2));
}

#[test]
fn overview_from_funding_records() {
    let mut src = MemorySource::new();
    src.funding_rates = (0..5)
        .map(|i| FundingRateRecord {
            id: i,
            exchange: "binance".into(),
            symbol: "BTC".into(),
            funding_rate: if i == 0 { 0.0003 } else { -0.0001 },
            funding_time: String::new(),
            timestamp_ms: 1_000 - i,
        })
        .collect();
    let query = FundingRateQuery {
        exchange: Some("binance".into()),
        limit: Some(3),
        ..FundingRateQuery::default()
    };
    let records = src.list_funding_rates(&query).unwrap();
    let ov = MarketOverview::from_records(&records);
    assert_eq!(ov.total, 3);
    assert_eq!(ov.latest_rate, Some(0.0003));
    assert_eq!((ov.positive, ov.negative), (1, 2));
}

#[test]
fn arbitrage_table_sorts_client_side() {
    let opp = |symbol: &str, annualized: f64| ArbitrageOpportunity {
        symbol: symbol.into(),
        exchange_a: "binance".into(),
        rate_a: 0.0001,
        funding_interval_a: Some(8.0),
        volume_a: 1.0,
        exchange_b: "okx".into(),
        rate_b: -0.0001,
        funding_interval_b: Some(4.0),
        volume_b: 2.0,
        difference_8h: 0.0002,
        annualized_arbitrage: annualized,
    };
    let mut src = MemorySource::new();
    src.arbitrage.data = vec![opp("ETH", 12.0), opp("BTC", 80.0), opp("SOL", 40.0)];

    let page = src.arbitrage_opportunities(&ArbitrageQuery::default()).unwrap();
    assert_eq!(page.total, 3);

    let mut table = ArbitrageTable::default();
    table.set_items(page.data);
    let syms: Vec<_> = table.rows().iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(syms, vec!["BTC", "SOL", "ETH"]);

    table.toggle_sort(ArbitrageSortField::Symbol);
    let syms: Vec<_> = table.rows().iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(syms, vec!["SOL", "ETH", "BTC"]);
}
