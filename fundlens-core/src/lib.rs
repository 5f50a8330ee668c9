//! Fundlens Core: domain types and derived computations for the funding-rate
//! dashboard.
//!
//! This crate contains everything that is independent of a front end:
//! - Domain types (rows, period aggregates, funding records, arbitrage)
//! - Sort comparator shared by every sortable table
//! - Distinct-value rank map and rank-to-colour emphasis
//! - Rate cell contract (text, APR line, background, tooltip)
//! - REST client for the funding-rate API behind the `FundingSource` trait
//! - Configuration and request-generation tracking

pub mod api;
pub mod cell;
pub mod color;
pub mod config;
pub mod domain;
pub mod format;
pub mod pages;
pub mod rank;
pub mod request;
pub mod sort;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed to the fetch worker are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Row>();
        require_sync::<domain::Row>();
        require_send::<domain::FundingRateRecord>();
        require_sync::<domain::FundingRateRecord>();
        require_send::<domain::AggregateRecord>();
        require_sync::<domain::AggregateRecord>();
        require_send::<domain::ArbitragePage>();
        require_sync::<domain::ArbitragePage>();

        require_send::<rank::RankMap>();
        require_sync::<rank::RankMap>();
        require_send::<pages::RankedTable>();
        require_sync::<pages::RankedTable>();

        require_send::<api::HttpSource>();
        require_sync::<api::HttpSource>();
        require_send::<api::MemorySource>();
        require_sync::<api::MemorySource>();
        require_send::<api::ApiError>();
        require_sync::<api::ApiError>();
    }

    /// `FundingSource` must stay object-safe: the worker holds a `Box<dyn _>`.
    #[test]
    fn funding_source_is_object_safe() {
        fn _boxed(src: api::MemorySource) -> Box<dyn api::FundingSource> {
            Box::new(src)
        }
    }
}
