//! JSON shapes as sent by the funding-rate API, and their normalization into
//! domain types.
//!
//! The API is loose about optional fields: list envelopes may be missing,
//! numbers may be null, and `period_value` arrives as either a number or a
//! string. Everything is normalized here so nothing downstream sees raw JSON.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    AggregateRecord, ArbitrageOpportunity, ArbitragePage, FundingRateRecord, PeriodAggregate,
    PeriodKey, Row,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExchangesEnvelope {
    #[serde(default)]
    pub exchanges: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SymbolsEnvelope {
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct DataEnvelope<T> {
    #[serde(default)]
    pub data: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArbitrageEnvelope {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub data: Option<Vec<WireOpportunity>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFundingRate {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub funding_rate: Option<f64>,
    #[serde(default)]
    pub funding_time: Option<String>,
    #[serde(default, alias = "timestamp_ms")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAggregate {
    #[serde(default)]
    pub period_type: Option<String>,
    #[serde(default)]
    pub total_rate: Option<f64>,
    #[serde(default)]
    pub apr: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePeriodAggregate {
    #[serde(default)]
    pub total_rate: Option<f64>,
    #[serde(default)]
    pub apr: Option<f64>,
    #[serde(default)]
    pub period_value: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRow {
    pub symbol: String,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub aggs: Option<BTreeMap<String, Option<WirePeriodAggregate>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireOpportunity {
    pub symbol: String,
    pub exchange_a: String,
    #[serde(default)]
    pub rate_a: Option<f64>,
    #[serde(default)]
    pub funding_interval_a: Option<f64>,
    #[serde(default)]
    pub volume_a: Option<f64>,
    pub exchange_b: String,
    #[serde(default)]
    pub rate_b: Option<f64>,
    #[serde(default)]
    pub funding_interval_b: Option<f64>,
    #[serde(default)]
    pub volume_b: Option<f64>,
    #[serde(default)]
    pub difference_8h: Option<f64>,
    #[serde(default)]
    pub annualized_arbitrage: Option<f64>,
}

/// `period_value` as display text; `null` and nested values are dropped.
fn period_value_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl From<WireRow> for Row {
    fn from(wire: WireRow) -> Self {
        let aggs = wire
            .aggs
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, agg)| {
                let period = key.parse::<PeriodKey>().ok()?;
                let agg = agg?;
                let total_rate = agg.total_rate.filter(|v| v.is_finite())?;
                Some((
                    period,
                    PeriodAggregate {
                        total_rate,
                        apr: agg.apr.unwrap_or(f64::NAN),
                        period_value: agg.period_value.and_then(period_value_text),
                    },
                ))
            })
            .collect();

        Row {
            symbol: wire.symbol,
            exchange: wire.exchange.filter(|e| !e.is_empty()),
            volume: wire.volume.filter(|v| v.is_finite()),
            aggs,
        }
    }
}

impl WireFundingRate {
    /// Records without a rate carry no information and are dropped.
    pub fn into_record(self) -> Option<FundingRateRecord> {
        Some(FundingRateRecord {
            id: self.id.unwrap_or_default(),
            exchange: self.exchange.unwrap_or_default(),
            symbol: self.symbol.unwrap_or_default(),
            funding_rate: self.funding_rate.filter(|v| v.is_finite())?,
            funding_time: self.funding_time.unwrap_or_default(),
            timestamp_ms: self.timestamp.unwrap_or_default(),
        })
    }
}

impl WireAggregate {
    pub fn into_record(self) -> Option<AggregateRecord> {
        Some(AggregateRecord {
            period_type: self.period_type?,
            total_rate: self.total_rate.filter(|v| v.is_finite())?,
            apr: self.apr.unwrap_or(f64::NAN),
        })
    }
}

impl From<WireOpportunity> for ArbitrageOpportunity {
    fn from(w: WireOpportunity) -> Self {
        ArbitrageOpportunity {
            symbol: w.symbol,
            exchange_a: w.exchange_a,
            rate_a: w.rate_a.unwrap_or(f64::NAN),
            funding_interval_a: w.funding_interval_a,
            volume_a: w.volume_a.unwrap_or(0.0),
            exchange_b: w.exchange_b,
            rate_b: w.rate_b.unwrap_or(f64::NAN),
            funding_interval_b: w.funding_interval_b,
            volume_b: w.volume_b.unwrap_or(0.0),
            difference_8h: w.difference_8h.unwrap_or(f64::NAN),
            annualized_arbitrage: w.annualized_arbitrage.unwrap_or(f64::NAN),
        }
    }
}

impl From<ArbitrageEnvelope> for ArbitragePage {
    fn from(env: ArbitrageEnvelope) -> Self {
        let data: Vec<ArbitrageOpportunity> = env
            .data
            .unwrap_or_default()
            .into_iter()
            .map(ArbitrageOpportunity::from)
            .collect();
        ArbitragePage {
            total: env.total.unwrap_or(data.len() as u64),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_normalization_drops_unknown_and_non_finite() {
        let json = r#"{
            "symbol": "BTC/USDT:USDT",
            "exchange": "binance",
            "volume": 1.5e9,
            "aggs": {
                "hour": {"total_rate": 0.0001, "apr": 0.1095, "period_value": 8},
                "day": {"total_rate": null, "apr": 0.1},
                "month": null,
                "decade": {"total_rate": 0.5, "apr": 0.5},
                "week": {"total_rate": -0.002, "apr": -0.1, "period_value": "21"}
            }
        }"#;
        let row: Row = serde_json::from_str::<WireRow>(json).unwrap().into();
        assert_eq!(row.exchange.as_deref(), Some("binance"));
        assert_eq!(row.aggs.len(), 2);
        assert_eq!(row.total_rate(PeriodKey::Hour), Some(0.0001));
        assert_eq!(
            row.aggs[&PeriodKey::Hour].period_value.as_deref(),
            Some("8")
        );
        assert_eq!(
            row.aggs[&PeriodKey::Week].period_value.as_deref(),
            Some("21")
        );
        assert!(row.total_rate(PeriodKey::Day).is_none());
    }

    #[test]
    fn row_without_aggs_is_empty() {
        let row: Row = serde_json::from_str::<WireRow>(r#"{"symbol":"SOL"}"#)
            .unwrap()
            .into();
        assert!(row.aggs.is_empty());
        assert!(row.volume.is_none());
        assert!(row.exchange.is_none());
    }

    #[test]
    fn missing_envelope_fields_are_empty() {
        let env: ExchangesEnvelope = serde_json::from_str("{}").unwrap();
        assert!(env.exchanges.is_none());
        let env: DataEnvelope<WireAggregate> = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(env.data.is_none());
    }

    #[test]
    fn funding_rate_accepts_timestamp_alias() {
        let json = r#"{"id":7,"exchange":"okx","symbol":"ETH","funding_rate":-0.0001,
                       "funding_time":"2025-07-23T00:00:00","timestamp":1753228800000}"#;
        let rec = serde_json::from_str::<WireFundingRate>(json)
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(rec.timestamp_ms, 1_753_228_800_000);
        assert_eq!(rec.id, 7);

        let no_rate = serde_json::from_str::<WireFundingRate>(r#"{"symbol":"ETH"}"#).unwrap();
        assert!(no_rate.into_record().is_none());
    }

    #[test]
    fn arbitrage_total_defaults_to_len() {
        let json = r#"{"data":[{"symbol":"BTC","exchange_a":"binance","rate_a":0.0001,
            "exchange_b":"okx","rate_b":-0.0002,"difference_8h":0.0003,
            "annualized_arbitrage":32.85}]}"#;
        let page: ArbitragePage = serde_json::from_str::<ArbitrageEnvelope>(json)
            .unwrap()
            .into();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].volume_a, 0.0);
        assert!(page.data[0].funding_interval_a.is_none());
    }
}
