//! Read-only data-fetch contract for the funding-rate REST API.
//!
//! [`FundingSource`] abstracts the backend so pages can be driven by the HTTP
//! client in production and by [`MemorySource`] in tests.

mod client;
mod error;
mod memory;
pub(crate) mod wire;

pub use client::HttpSource;
pub use error::ApiError;
pub use memory::MemorySource;

use crate::domain::{
    AggregateRecord, ArbitragePage, FundingRateRecord, HedgeSort, PeriodKey, Row, TimeRange,
};

pub const EXCHANGES_PATH: &str = "/api/v1/exchanges";
pub const SYMBOLS_PATH: &str = "/api/v1/symbols";
pub const FUNDING_RATES_PATH: &str = "/api/v1/funding-rates";
pub const AGGREGATE_PATH: &str = "/api/v1/funding-rate-agg";
pub const TOP_VOLUME_PATH: &str = "/api/v1/top-volume-funding-rate-agg";
pub const ARBITRAGE_PATH: &str = "/api/v1/arbitrage-opportunities";

/// Sentinel the pickers use for "no filter".
pub const ALL: &str = "all";

/// Query parameters as `(name, value)` pairs.
pub type Params = Vec<(&'static str, String)>;

fn push_text(params: &mut Params, name: &'static str, value: Option<&str>) {
    if let Some(v) = value.map(str::trim) {
        if !v.is_empty() && !v.eq_ignore_ascii_case(ALL) {
            params.push((name, v.to_string()));
        }
    }
}

fn push_count(params: &mut Params, name: &'static str, value: Option<u32>) {
    if let Some(n) = value.filter(|n| *n > 0) {
        params.push((name, n.to_string()));
    }
}

/// `/api/v1/funding-rates` filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundingRateQuery {
    pub exchange: Option<String>,
    pub symbol: Option<String>,
    pub limit: Option<u32>,
    pub period_type: Option<PeriodKey>,
}

impl FundingRateQuery {
    pub fn params(&self) -> Params {
        let mut p = Params::new();
        push_text(&mut p, "exchange", self.exchange.as_deref());
        push_text(&mut p, "symbol", self.symbol.as_deref());
        push_count(&mut p, "limit", self.limit);
        push_text(&mut p, "period_type", self.period_type.map(PeriodKey::as_str));
        p
    }
}

/// `/api/v1/funding-rate-agg` filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateQuery {
    pub exchange: Option<String>,
    pub symbol: Option<String>,
    pub limit: Option<u32>,
}

impl AggregateQuery {
    pub fn params(&self) -> Params {
        let mut p = Params::new();
        push_text(&mut p, "exchange", self.exchange.as_deref());
        push_text(&mut p, "symbol", self.symbol.as_deref());
        push_count(&mut p, "limit", self.limit);
        p
    }
}

/// `/api/v1/top-volume-funding-rate-agg` filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopVolumeQuery {
    pub top_n: Option<u32>,
    pub exchange: Option<String>,
    pub symbol: Option<String>,
}

impl TopVolumeQuery {
    pub fn top(n: u32) -> Self {
        Self {
            top_n: Some(n),
            ..Self::default()
        }
    }

    pub fn params(&self) -> Params {
        let mut p = Params::new();
        push_count(&mut p, "top_n", self.top_n);
        push_text(&mut p, "exchange", self.exchange.as_deref());
        push_text(&mut p, "symbol", self.symbol.as_deref());
        p
    }
}

/// `/api/v1/arbitrage-opportunities` filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrageQuery {
    pub symbol: Option<String>,
    pub sort_by: HedgeSort,
    pub time_range: TimeRange,
    pub limit: Option<u32>,
}

impl Default for ArbitrageQuery {
    fn default() -> Self {
        Self {
            symbol: None,
            sort_by: HedgeSort::default(),
            time_range: TimeRange::default(),
            limit: Some(10),
        }
    }
}

impl ArbitrageQuery {
    pub fn params(&self) -> Params {
        let mut p = Params::new();
        push_text(&mut p, "symbol", self.symbol.as_deref());
        p.push(("sort_by", self.sort_by.as_str().to_string()));
        p.push(("time_range", self.time_range.as_str().to_string()));
        push_count(&mut p, "limit", self.limit);
        p
    }
}

/// A backend that can answer every read the dashboard makes.
///
/// Each call is a single attempt; failures are returned as-is and callers
/// decide how to degrade (usually an empty table).
pub trait FundingSource: Send + Sync {
    fn list_exchanges(&self) -> Result<Vec<String>, ApiError>;

    /// Symbols listed on `exchange`. An empty exchange yields an empty list.
    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, ApiError>;

    fn list_funding_rates(
        &self,
        query: &FundingRateQuery,
    ) -> Result<Vec<FundingRateRecord>, ApiError>;

    fn funding_rate_aggregate(
        &self,
        query: &AggregateQuery,
    ) -> Result<Vec<AggregateRecord>, ApiError>;

    fn top_volume_aggregate(&self, query: &TopVolumeQuery) -> Result<Vec<Row>, ApiError>;

    fn arbitrage_opportunities(&self, query: &ArbitrageQuery) -> Result<ArbitragePage, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_all_values_are_omitted() {
        let q = FundingRateQuery {
            exchange: Some("".into()),
            symbol: Some("all".into()),
            limit: Some(50),
            period_type: None,
        };
        assert_eq!(q.params(), vec![("limit", "50".to_string())]);
    }

    #[test]
    fn zero_counts_are_omitted() {
        let q = TopVolumeQuery {
            top_n: Some(0),
            exchange: Some("binance".into()),
            symbol: None,
        };
        assert_eq!(q.params(), vec![("exchange", "binance".to_string())]);
    }

    #[test]
    fn arbitrage_defaults() {
        let p = ArbitrageQuery::default().params();
        assert_eq!(
            p,
            vec![
                ("sort_by", "hedge".to_string()),
                ("time_range", "latest".to_string()),
                ("limit", "10".to_string()),
            ]
        );
    }

    #[test]
    fn funding_rate_period_param() {
        let q = FundingRateQuery {
            exchange: Some("okx".into()),
            symbol: Some(" ETH/USDT:USDT ".into()),
            limit: Some(100),
            period_type: Some(PeriodKey::Hour),
        };
        assert_eq!(
            q.params(),
            vec![
                ("exchange", "okx".to_string()),
                ("symbol", "ETH/USDT:USDT".to_string()),
                ("limit", "100".to_string()),
                ("period_type", "hour".to_string()),
            ]
        );
    }
}
