//! Row: one (exchange, symbol) pair, or one symbol scoped to a single exchange,
//! carrying its multi-period aggregate funding rates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::period::PeriodKey;

/// Aggregate funding rate for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    /// Sum of funding rates over the period (fraction, not percent).
    pub total_rate: f64,
    /// Annualized rate derived from `total_rate` (fraction).
    pub apr: f64,
    /// Number of funding events or window descriptor reported by the API.
    pub period_value: Option<String>,
}

impl PeriodAggregate {
    pub fn new(total_rate: f64, apr: f64) -> Self {
        Self {
            total_rate,
            apr,
            period_value: None,
        }
    }
}

/// A table row: one pair with its per-period aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub symbol: String,
    /// Absent when the whole row set is already scoped to a single exchange.
    pub exchange: Option<String>,
    /// 24h traded volume in quote currency.
    pub volume: Option<f64>,
    pub aggs: BTreeMap<PeriodKey, PeriodAggregate>,
}

impl Row {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: None,
            volume: None,
            aggs: BTreeMap::new(),
        }
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_agg(mut self, period: PeriodKey, agg: PeriodAggregate) -> Self {
        self.aggs.insert(period, agg);
        self
    }

    /// `total_rate` for a period, if the row has an aggregate for it.
    pub fn total_rate(&self, period: PeriodKey) -> Option<f64> {
        self.aggs.get(&period).map(|a| a.total_rate)
    }

    pub fn apr(&self, period: PeriodKey) -> Option<f64> {
        self.aggs.get(&period).map(|a| a.apr)
    }

    /// Identity of this row under the given keying mode.
    pub fn key(&self, identity: RowIdentity) -> RowKey {
        match identity {
            RowIdentity::Symbol => RowKey::symbol(&self.symbol),
            RowIdentity::ExchangeSymbol => RowKey {
                exchange: Some(self.exchange.clone().unwrap_or_default()),
                symbol: self.symbol.clone(),
            },
        }
    }
}

/// How rows are identified within a result set.
///
/// Single-exchange views key by symbol alone; cross-exchange views must include
/// the exchange because the same symbol appears once per venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowIdentity {
    Symbol,
    ExchangeSymbol,
}

/// Composite row identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    pub exchange: Option<String>,
    pub symbol: String,
}

impl RowKey {
    pub fn symbol(symbol: &str) -> Self {
        Self {
            exchange: None,
            symbol: symbol.to_string(),
        }
    }

    pub fn pair(exchange: &str, symbol: &str) -> Self {
        Self {
            exchange: Some(exchange.to_string()),
            symbol: symbol.to_string(),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exchange {
            Some(ex) => write!(f, "{ex}:{}", self.symbol),
            None => f.write_str(&self.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_respects_identity_mode() {
        let row = Row::new("BTC/USDT:USDT").with_exchange("binance");
        assert_eq!(row.key(RowIdentity::Symbol), RowKey::symbol("BTC/USDT:USDT"));
        assert_eq!(
            row.key(RowIdentity::ExchangeSymbol),
            RowKey::pair("binance", "BTC/USDT:USDT")
        );
    }

    #[test]
    fn same_symbol_on_two_exchanges_has_distinct_pair_keys() {
        let a = Row::new("ETH").with_exchange("okx");
        let b = Row::new("ETH").with_exchange("bybit");
        assert_eq!(a.key(RowIdentity::Symbol), b.key(RowIdentity::Symbol));
        assert_ne!(
            a.key(RowIdentity::ExchangeSymbol),
            b.key(RowIdentity::ExchangeSymbol)
        );
    }

    #[test]
    fn total_rate_lookup() {
        let row = Row::new("SOL").with_agg(PeriodKey::Day, PeriodAggregate::new(0.0003, 0.1095));
        assert_eq!(row.total_rate(PeriodKey::Day), Some(0.0003));
        assert_eq!(row.total_rate(PeriodKey::Hour), None);
        assert_eq!(row.apr(PeriodKey::Day), Some(0.1095));
    }

    #[test]
    fn key_display() {
        assert_eq!(RowKey::pair("okx", "BTC").to_string(), "okx:BTC");
        assert_eq!(RowKey::symbol("BTC").to_string(), "BTC");
    }
}
