//! Background worker thread: every network call runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Each fetch
//! carries the request id issued by the app so stale answers can be dropped.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use fundlens_core::api::{
    AggregateQuery, ApiError, ArbitrageQuery, FundingRateQuery, FundingSource, TopVolumeQuery,
};
use fundlens_core::domain::{AggregateRecord, ArbitragePage, FundingRateRecord, Row};
use fundlens_core::request::RequestId;

use crate::app::Slot;

/// A single query against the funding-rate API.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Exchanges,
    Symbols { exchange: String },
    FundingRates(FundingRateQuery),
    Aggregate(AggregateQuery),
    TopVolume(TopVolumeQuery),
    Arbitrage(ArbitrageQuery),
}

impl FetchRequest {
    pub fn label(&self) -> &'static str {
        match self {
            FetchRequest::Exchanges => "exchanges",
            FetchRequest::Symbols { .. } => "symbols",
            FetchRequest::FundingRates(_) => "funding rates",
            FetchRequest::Aggregate(_) => "aggregate",
            FetchRequest::TopVolume(_) => "top volume",
            FetchRequest::Arbitrage(_) => "arbitrage",
        }
    }
}

/// Decoded payload of a successful fetch.
#[derive(Debug, Clone)]
pub enum FetchPayload {
    Exchanges(Vec<String>),
    Symbols(Vec<String>),
    FundingRates(Vec<FundingRateRecord>),
    Aggregate(Vec<AggregateRecord>),
    TopVolume(Vec<Row>),
    Arbitrage(ArbitragePage),
}

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Fetch {
        id: RequestId,
        slot: Slot,
        request: FetchRequest,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub struct WorkerResponse {
    pub id: RequestId,
    pub slot: Slot,
    pub result: Result<FetchPayload, ApiError>,
}

/// Spawn the worker thread. It exits on `Shutdown` or when the command
/// channel closes.
pub fn spawn_worker(
    source: Arc<dyn FundingSource>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("fundlens-worker".into())
        .spawn(move || {
            worker_loop(source.as_ref(), rx, tx);
        })
}

fn worker_loop(source: &dyn FundingSource, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Fetch { id, slot, request }) => {
                tracing::debug!(id = id.get(), ?slot, request = request.label(), "fetch");
                let result = execute(source, &request);
                if let Err(err) = &result {
                    tracing::warn!(id = id.get(), ?slot, error = %err, "fetch failed");
                }
                if tx.send(WorkerResponse { id, slot, result }).is_err() {
                    break;
                }
            }
        }
    }
    tracing::debug!("worker stopped");
}

/// Run one request synchronously against `source`.
pub fn execute(source: &dyn FundingSource, request: &FetchRequest) -> Result<FetchPayload, ApiError> {
    match request {
        FetchRequest::Exchanges => source.list_exchanges().map(FetchPayload::Exchanges),
        FetchRequest::Symbols { exchange } => {
            source.list_symbols(exchange).map(FetchPayload::Symbols)
        }
        FetchRequest::FundingRates(query) => {
            source.list_funding_rates(query).map(FetchPayload::FundingRates)
        }
        FetchRequest::Aggregate(query) => {
            source.funding_rate_aggregate(query).map(FetchPayload::Aggregate)
        }
        FetchRequest::TopVolume(query) => {
            source.top_volume_aggregate(query).map(FetchPayload::TopVolume)
        }
        FetchRequest::Arbitrage(query) => {
            source.arbitrage_opportunities(query).map(FetchPayload::Arbitrage)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use fundlens_core::api::MemorySource;

    use super::*;
    use crate::app::Slot;

    fn source() -> MemorySource {
        let mut source = MemorySource::new();
        source.exchanges = vec!["okx".into(), "binance".into()];
        source
    }

    #[test]
    fn execute_maps_payload() {
        let source = source();
        match execute(&source, &FetchRequest::Exchanges) {
            Ok(FetchPayload::Exchanges(list)) => assert_eq!(list.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn execute_propagates_failure() {
        let source = source();
        source.set_failing(true);
        assert!(execute(&source, &FetchRequest::Exchanges).is_err());
    }

    #[test]
    fn worker_answers_then_shuts_down() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(Arc::new(source()), cmd_rx, resp_tx).unwrap();

        let mut tracker = fundlens_core::request::RequestTracker::new();
        let id = tracker.issue(Slot::Exchanges);
        cmd_tx
            .send(WorkerCommand::Fetch {
                id,
                slot: Slot::Exchanges,
                request: FetchRequest::Exchanges,
            })
            .unwrap();

        let resp = resp_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(resp.id, id);
        assert_eq!(resp.slot, Slot::Exchanges);
        assert!(resp.result.is_ok());

        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }
}
