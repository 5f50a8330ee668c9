//! Flat records returned by the history, aggregate, and arbitrage endpoints.

use serde::{Deserialize, Serialize};

/// A single funding event for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRateRecord {
    pub id: i64,
    pub exchange: String,
    pub symbol: String,
    pub funding_rate: f64,
    /// Funding time as reported by the exchange (UTC string).
    pub funding_time: String,
    /// Funding time in Unix milliseconds.
    pub timestamp_ms: i64,
}

/// One period total from the aggregate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Period type as sent by the API; may include values outside `PeriodKey`.
    pub period_type: String,
    pub total_rate: f64,
    pub apr: f64,
}

/// A cross-exchange funding divergence for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub symbol: String,
    pub exchange_a: String,
    pub rate_a: f64,
    /// Funding interval in hours.
    pub funding_interval_a: Option<f64>,
    pub volume_a: f64,
    pub exchange_b: String,
    pub rate_b: f64,
    pub funding_interval_b: Option<f64>,
    pub volume_b: f64,
    /// Rate difference normalized to an 8h interval.
    pub difference_8h: f64,
    /// Annualized arbitrage yield in percent.
    pub annualized_arbitrage: f64,
}

/// Arbitrage endpoint response: a page of opportunities plus the overall count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArbitragePage {
    pub total: u64,
    pub data: Vec<ArbitrageOpportunity>,
}

/// Ranking strategy the arbitrage endpoint applies server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HedgeSort {
    #[default]
    Hedge,
    Difference,
}

impl HedgeSort {
    pub fn as_str(self) -> &'static str {
        match self {
            HedgeSort::Hedge => "hedge",
            HedgeSort::Difference => "difference",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HedgeSort::Hedge => "Hedge",
            HedgeSort::Difference => "Difference",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            HedgeSort::Hedge => HedgeSort::Difference,
            HedgeSort::Difference => HedgeSort::Hedge,
        }
    }
}

/// Which funding observation the arbitrage endpoint compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Latest,
    Average,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Latest => "latest",
            TimeRange::Average => "average",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Latest => "Latest",
            TimeRange::Average => "Average",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            TimeRange::Latest => TimeRange::Average,
            TimeRange::Average => TimeRange::Latest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hedge_sort_cycles() {
        assert_eq!(HedgeSort::Hedge.cycle(), HedgeSort::Difference);
        assert_eq!(HedgeSort::Difference.cycle(), HedgeSort::Hedge);
        assert_eq!(HedgeSort::default().as_str(), "hedge");
    }

    #[test]
    fn time_range_wire_values() {
        assert_eq!(TimeRange::Latest.as_str(), "latest");
        assert_eq!(TimeRange::Average.as_str(), "average");
        assert_eq!(TimeRange::Latest.cycle(), TimeRange::Average);
    }
}
