//! In-memory [`FundingSource`] backed by canned data.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{
    AggregateQuery, ApiError, ArbitrageQuery, FundingRateQuery, FundingSource, TopVolumeQuery,
    ALL,
};
use crate::domain::{AggregateRecord, ArbitragePage, FundingRateRecord, Row};

/// Canned responses with the same filtering the API applies.
///
/// `set_failing(true)` turns every call into a `Status { 503 }` error, which
/// is how tests exercise the failure path of a page.
#[derive(Debug, Default)]
pub struct MemorySource {
    pub exchanges: Vec<String>,
    pub symbols: BTreeMap<String, Vec<String>>,
    pub funding_rates: Vec<FundingRateRecord>,
    /// Aggregates keyed by `(exchange, symbol)`.
    pub aggregates: BTreeMap<(String, String), Vec<AggregateRecord>>,
    pub rows: Vec<Row>,
    pub arbitrage: ArbitragePage,
    failing: AtomicBool,
    calls: AtomicUsize,
}

fn passes(filter: Option<&str>, value: &str) -> bool {
    match filter.map(str::trim) {
        None => true,
        Some(f) if f.is_empty() || f.eq_ignore_ascii_case(ALL) => true,
        Some(f) => f.eq_ignore_ascii_case(value),
    }
}

fn take<T>(items: impl Iterator<Item = T>, limit: Option<u32>) -> Vec<T> {
    match limit.filter(|n| *n > 0) {
        Some(n) => items.take(n as usize).collect(),
        None => items.collect(),
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls answered so far, failures included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, endpoint: &str) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                endpoint: endpoint.to_string(),
            });
        }
        Ok(())
    }
}

impl FundingSource for MemorySource {
    fn list_exchanges(&self) -> Result<Vec<String>, ApiError> {
        self.enter(super::EXCHANGES_PATH)?;
        Ok(self.exchanges.clone())
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, ApiError> {
        if exchange.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.enter(super::SYMBOLS_PATH)?;
        Ok(self.symbols.get(exchange).cloned().unwrap_or_default())
    }

    fn list_funding_rates(
        &self,
        query: &FundingRateQuery,
    ) -> Result<Vec<FundingRateRecord>, ApiError> {
        self.enter(super::FUNDING_RATES_PATH)?;
        let hits = self.funding_rates.iter().filter(|r| {
            passes(query.exchange.as_deref(), &r.exchange)
                && passes(query.symbol.as_deref(), &r.symbol)
        });
        Ok(take(hits.cloned(), query.limit))
    }

    fn funding_rate_aggregate(
        &self,
        query: &AggregateQuery,
    ) -> Result<Vec<AggregateRecord>, ApiError> {
        self.enter(super::AGGREGATE_PATH)?;
        let hits = self
            .aggregates
            .iter()
            .filter(|((ex, sym), _)| {
                passes(query.exchange.as_deref(), ex) && passes(query.symbol.as_deref(), sym)
            })
            .flat_map(|(_, recs)| recs.iter().cloned());
        Ok(take(hits, query.limit))
    }

    fn top_volume_aggregate(&self, query: &TopVolumeQuery) -> Result<Vec<Row>, ApiError> {
        self.enter(super::TOP_VOLUME_PATH)?;
        let hits = self.rows.iter().filter(|r| {
            passes(query.exchange.as_deref(), r.exchange.as_deref().unwrap_or_default())
                && passes(query.symbol.as_deref(), &r.symbol)
        });
        Ok(take(hits.cloned(), query.top_n))
    }

    fn arbitrage_opportunities(&self, query: &ArbitrageQuery) -> Result<ArbitragePage, ApiError> {
        self.enter(super::ARBITRAGE_PATH)?;
        let hits: Vec<_> = self
            .arbitrage
            .data
            .iter()
            .filter(|o| passes(query.symbol.as_deref(), &o.symbol))
            .cloned()
            .collect();
        let total = hits.len() as u64;
        Ok(ArbitragePage {
            total,
            data: take(hits.into_iter(), query.limit),
        })
    }
}
