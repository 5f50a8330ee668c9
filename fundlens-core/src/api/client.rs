//! Blocking HTTP implementation of [`FundingSource`].

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::wire::{
    ArbitrageEnvelope, DataEnvelope, ExchangesEnvelope, SymbolsEnvelope, WireAggregate,
    WireFundingRate, WireRow,
};
use super::{
    AggregateQuery, ApiError, ArbitrageQuery, FundingRateQuery, FundingSource, TopVolumeQuery,
    AGGREGATE_PATH, ARBITRAGE_PATH, EXCHANGES_PATH, FUNDING_RATES_PATH, SYMBOLS_PATH,
    TOP_VOLUME_PATH,
};
use crate::config::ApiConfig;
use crate::domain::{AggregateRecord, ArbitragePage, FundingRateRecord, Row};

/// Funding-rate API client over `reqwest::blocking`.
///
/// One request per call, no retry, no caching. The configured timeout bounds
/// every request.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fundlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &'static str,
        params: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(endpoint = path, ?params, "GET");

        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .map_err(|e| ApiError::Network {
                endpoint: path.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(endpoint = path, status = status.as_u16(), "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        resp.json::<T>().map_err(|e| ApiError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

impl FundingSource for HttpSource {
    fn list_exchanges(&self) -> Result<Vec<String>, ApiError> {
        let env: ExchangesEnvelope = self.get(EXCHANGES_PATH, &[])?;
        Ok(env.exchanges.unwrap_or_default())
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, ApiError> {
        let exchange = exchange.trim();
        if exchange.is_empty() {
            return Ok(Vec::new());
        }
        let env: SymbolsEnvelope = self.get(SYMBOLS_PATH, &[("exchange", exchange.to_string())])?;
        Ok(env.symbols.unwrap_or_default())
    }

    fn list_funding_rates(
        &self,
        query: &FundingRateQuery,
    ) -> Result<Vec<FundingRateRecord>, ApiError> {
        let env: DataEnvelope<WireFundingRate> = self.get(FUNDING_RATES_PATH, &query.params())?;
        Ok(env
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(WireFundingRate::into_record)
            .collect())
    }

    fn funding_rate_aggregate(
        &self,
        query: &AggregateQuery,
    ) -> Result<Vec<AggregateRecord>, ApiError> {
        let env: DataEnvelope<WireAggregate> = self.get(AGGREGATE_PATH, &query.params())?;
        Ok(env
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(WireAggregate::into_record)
            .collect())
    }

    fn top_volume_aggregate(&self, query: &TopVolumeQuery) -> Result<Vec<Row>, ApiError> {
        let env: DataEnvelope<WireRow> = self.get(TOP_VOLUME_PATH, &query.params())?;
        Ok(env
            .data
            .unwrap_or_default()
            .into_iter()
            .map(Row::from)
            .collect())
    }

    fn arbitrage_opportunities(&self, query: &ArbitrageQuery) -> Result<ArbitragePage, ApiError> {
        let env: ArbitrageEnvelope = self.get(ARBITRAGE_PATH, &query.params())?;
        Ok(env.into())
    }
}
