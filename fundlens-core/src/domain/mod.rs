//! Domain types for funding-rate data

pub mod period;
pub mod records;
pub mod row;

pub use period::{ParsePeriodError, PeriodKey};
pub use records::{
    AggregateRecord, ArbitrageOpportunity, ArbitragePage, FundingRateRecord, HedgeSort, TimeRange,
};
pub use row::{PeriodAggregate, Row, RowIdentity, RowKey};
