//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. Fetches are dispatched to the worker thread and
//! their answers come back through [`AppState::apply_response`], which drops
//! any response that is no longer the latest one issued for its slot.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use fundlens_core::api::{
    AggregateQuery, ApiError, ArbitrageQuery, FundingRateQuery, TopVolumeQuery, ALL,
};
use fundlens_core::cell::{period_cell, CellView};
use fundlens_core::config::PageLimits;
use fundlens_core::domain::{FundingRateRecord, PeriodKey, Row, RowIdentity};
use fundlens_core::pages::{
    default_exchange, filter_options, history_ascending, normalize_exchanges, pair_row,
    ArbitrageTable, MarketOverview, RankedTable,
};
use fundlens_core::request::{RequestId, RequestTracker};
use fundlens_core::sort::{ArbitrageSortField, RowSortField, SortState};

use crate::worker::{FetchPayload, FetchRequest, WorkerCommand, WorkerResponse};

/// Row limits offered on the overview page.
pub const OVERVIEW_LIMITS: [u32; 5] = [10, 20, 50, 100, 200];
/// Row limits offered on the arbitrage page.
pub const ARBITRAGE_LIMITS: [u32; 4] = [10, 20, 50, 100];

const ERROR_HISTORY_CAP: usize = 50;

const ARBITRAGE_FAILURE: &str =
    "Failed to load arbitrage opportunities. Check the network connection or try again later.";

/// Which page is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Overview,
    Top10,
    Search,
    Arbitrage,
    Exchange,
    Pair,
    Help,
}

impl Page {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        match self {
            Page::Overview => 0,
            Page::Top10 => 1,
            Page::Search => 2,
            Page::Arbitrage => 3,
            Page::Exchange => 4,
            Page::Pair => 5,
            Page::Help => 6,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Page::Overview),
            1 => Some(Page::Top10),
            2 => Some(Page::Search),
            3 => Some(Page::Arbitrage),
            4 => Some(Page::Exchange),
            5 => Some(Page::Pair),
            6 => Some(Page::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Top10 => "Top 10",
            Page::Search => "Search",
            Page::Arbitrage => "Arbitrage",
            Page::Exchange => "Exchange",
            Page::Pair => "Pair",
            Page::Help => "Help",
        }
    }

    pub fn next(self) -> Page {
        Page::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Page::Overview)
    }

    pub fn prev(self) -> Page {
        Page::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Page::Overview)
    }

    /// Drill-down pages that are opened from a row of another page.
    pub fn is_detail(self) -> bool {
        matches!(self, Page::Exchange | Page::Pair)
    }
}

/// Independent fetch slots. A new request in a slot supersedes the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Exchanges,
    OverviewSymbols,
    OverviewRates,
    Top10,
    SearchSymbols,
    SearchRows,
    Arbitrage,
    ExchangeRows,
    PairAggregate,
    PairHistory,
}

impl Slot {
    pub fn label(self) -> &'static str {
        match self {
            Slot::Exchanges => "exchange list",
            Slot::OverviewSymbols | Slot::SearchSymbols => "symbol list",
            Slot::OverviewRates => "overview",
            Slot::Top10 => "top 10",
            Slot::SearchRows => "search",
            Slot::Arbitrage => "arbitrage",
            Slot::ExchangeRows => "exchange detail",
            Slot::PairAggregate => "pair aggregate",
            Slot::PairHistory => "pair history",
        }
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Http,
    Decode,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Http => "HTTP",
            ErrorCategory::Decode => "DATA",
            ErrorCategory::Other => "ERR",
        }
    }

    pub fn of(err: &ApiError) -> Self {
        match err {
            ApiError::Network { .. } => ErrorCategory::Network,
            ApiError::Status { .. } => ErrorCategory::Http,
            ApiError::Decode { .. } => ErrorCategory::Decode,
            ApiError::InvalidBaseUrl(_) | ApiError::Client(_) => ErrorCategory::Other,
        }
    }
}

/// Row/column cursor inside a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCursor {
    pub row: usize,
    pub column: usize,
}

impl TableCursor {
    pub fn down(&mut self, len: usize) {
        if self.row + 1 < len {
            self.row += 1;
        }
    }

    pub fn up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn left(&mut self) {
        self.column = self.column.saturating_sub(1);
    }

    pub fn right(&mut self, columns: usize) {
        if self.column + 1 < columns {
            self.column += 1;
        }
    }

    pub fn clamp(&mut self, len: usize, columns: usize) {
        self.row = self.row.min(len.saturating_sub(1));
        self.column = self.column.min(columns.saturating_sub(1));
    }
}

/// A ranked multi-period table with its cursor.
#[derive(Debug, Clone)]
pub struct RankedView {
    pub table: RankedTable,
    pub cursor: TableCursor,
    pub loaded: bool,
}

impl RankedView {
    pub fn new(identity: RowIdentity) -> Self {
        Self {
            table: RankedTable::new(identity, SortState::new(RowSortField::Volume)),
            cursor: TableCursor::default(),
            loaded: false,
        }
    }

    pub fn columns(&self) -> Vec<RowSortField> {
        RowSortField::columns(self.table.identity())
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.table.set_rows(rows);
        self.loaded = true;
        let columns = self.columns().len();
        self.cursor.clamp(self.table.len(), columns);
    }

    pub fn clear(&mut self) {
        self.set_rows(Vec::new());
    }

    pub fn focused_field(&self) -> Option<RowSortField> {
        self.columns().get(self.cursor.column).copied()
    }

    pub fn focused_row(&self) -> Option<&Row> {
        self.table.rows().get(self.cursor.row)
    }

    /// The rate cell under the cursor, if the focused column is a period.
    pub fn focused_cell(&self) -> Option<(PeriodKey, CellView)> {
        let row = self.focused_row()?;
        match self.focused_field()? {
            RowSortField::Period(p) => Some((
                p,
                period_cell(row, p, self.table.ranks(), self.table.identity()),
            )),
            _ => None,
        }
    }

    pub fn sort_focused(&mut self) {
        if let Some(field) = self.focused_field() {
            self.table.toggle_sort(field);
        }
    }
}

/// Overview list tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverviewTab {
    #[default]
    Table,
    Chart,
}

/// Overview page state.
#[derive(Debug, Clone)]
pub struct OverviewState {
    pub exchange: String,
    pub symbol: String,
    pub limit: u32,
    pub symbols: Vec<String>,
    pub records: Vec<FundingRateRecord>,
    pub summary: MarketOverview,
    pub tab: OverviewTab,
    pub cursor: usize,
    pub loaded: bool,
}

impl OverviewState {
    pub fn new(limit: u32) -> Self {
        Self {
            exchange: ALL.to_string(),
            symbol: ALL.to_string(),
            limit,
            symbols: Vec::new(),
            records: Vec::new(),
            summary: MarketOverview::default(),
            tab: OverviewTab::default(),
            cursor: 0,
            loaded: false,
        }
    }

    pub fn query(&self) -> FundingRateQuery {
        FundingRateQuery {
            exchange: Some(self.exchange.clone()),
            symbol: Some(self.symbol.clone()),
            limit: Some(self.limit),
            period_type: None,
        }
    }

    pub fn set_records(&mut self, records: Vec<FundingRateRecord>) {
        self.summary = MarketOverview::from_records(&records);
        self.records = records;
        self.cursor = self.cursor.min(self.records.len().saturating_sub(1));
        self.loaded = true;
    }
}

/// Search page state. Nothing is fetched until the user submits.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub exchange: Option<String>,
    pub symbol: String,
    pub symbols: Vec<String>,
    pub top_n: u32,
    pub view: RankedView,
    pub queried: bool,
}

impl SearchState {
    pub fn new(top_n: u32) -> Self {
        Self {
            exchange: None,
            symbol: ALL.to_string(),
            symbols: Vec::new(),
            top_n,
            view: RankedView::new(RowIdentity::Symbol),
            queried: false,
        }
    }

    pub fn query(&self) -> Option<TopVolumeQuery> {
        let exchange = self.exchange.clone()?;
        Some(TopVolumeQuery {
            top_n: Some(self.top_n),
            exchange: Some(exchange),
            symbol: Some(self.symbol.clone()),
        })
    }
}

/// Arbitrage page state.
#[derive(Debug, Clone)]
pub struct ArbitrageState {
    pub query: ArbitrageQuery,
    pub table: ArbitrageTable,
    pub total: u64,
    pub error: Option<String>,
    pub cursor: TableCursor,
    pub loaded: bool,
}

impl ArbitrageState {
    pub fn new(limit: u32) -> Self {
        Self {
            query: ArbitrageQuery {
                limit: Some(limit),
                ..ArbitrageQuery::default()
            },
            table: ArbitrageTable::default(),
            total: 0,
            error: None,
            cursor: TableCursor::default(),
            loaded: false,
        }
    }

    pub fn focused_field(&self) -> ArbitrageSortField {
        ArbitrageSortField::ALL
            .get(self.cursor.column)
            .copied()
            .unwrap_or_default()
    }
}

/// Exchange detail page state.
#[derive(Debug, Clone)]
pub struct ExchangeState {
    pub exchange: Option<String>,
    pub top_n: u32,
    pub view: RankedView,
}

/// Pair detail page state.
#[derive(Debug, Clone)]
pub struct PairState {
    pub target: Option<(String, String)>,
    pub view: RankedView,
    pub history: Vec<FundingRateRecord>,
    pub history_loaded: bool,
}

impl PairState {
    fn new() -> Self {
        Self {
            target: None,
            view: RankedView::new(RowIdentity::ExchangeSymbol),
            history: Vec::new(),
            history_loaded: false,
        }
    }
}

/// What a picker selection is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
    OverviewExchange,
    OverviewSymbol,
    SearchExchange,
    SearchSymbol,
    DetailExchange,
}

impl PickerTarget {
    pub fn title(self) -> &'static str {
        match self {
            PickerTarget::OverviewExchange
            | PickerTarget::SearchExchange
            | PickerTarget::DetailExchange => "Exchange",
            PickerTarget::OverviewSymbol | PickerTarget::SearchSymbol => "Symbol",
        }
    }
}

/// Type-to-filter option list.
#[derive(Debug, Clone)]
pub struct PickerState {
    pub target: PickerTarget,
    pub options: Vec<String>,
    pub query: String,
    pub cursor: usize,
}

impl PickerState {
    pub fn visible(&self) -> Vec<&str> {
        filter_options(&self.options, &self.query)
    }

    pub fn selected(&self) -> Option<&str> {
        self.visible().get(self.cursor).copied()
    }
}

/// Active overlay, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
    Picker,
    SymbolInput,
}

/// Top-level application state.
pub struct AppState {
    pub active_page: Page,
    /// Page to return to when leaving a drill-down page.
    pub return_page: Page,
    pub running: bool,
    pub limits: PageLimits,

    pub exchanges: Vec<String>,
    pub overview: OverviewState,
    pub top10: RankedView,
    pub search: SearchState,
    pub arbitrage: ArbitrageState,
    pub exchange: ExchangeState,
    pub pair: PairState,

    pub requests: RequestTracker<Slot>,
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    pub overlay: Overlay,
    pub picker: Option<PickerState>,
    pub text_input: String,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,

    pub state_path: PathBuf,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        limits: PageLimits,
        state_path: PathBuf,
    ) -> Self {
        Self {
            active_page: Page::Overview,
            return_page: Page::Top10,
            running: true,
            overview: OverviewState::new(limits.overview_limit),
            top10: RankedView::new(RowIdentity::ExchangeSymbol),
            search: SearchState::new(limits.search_top_n),
            arbitrage: ArbitrageState::new(limits.arbitrage_limit),
            exchange: ExchangeState {
                exchange: None,
                top_n: limits.exchange_top_n,
                view: RankedView::new(RowIdentity::Symbol),
            },
            pair: PairState::new(),
            limits,
            exchanges: Vec::new(),
            requests: RequestTracker::new(),
            worker_tx,
            worker_rx,
            overlay: Overlay::Welcome,
            picker: None,
            text_input: String::new(),
            status_message: None,
            error_history: VecDeque::new(),
            error_scroll: 0,
            state_path,
        }
    }

    /// Initial loads: the exchange list plus whatever the active page needs.
    pub fn start(&mut self) {
        self.request(Slot::Exchanges, FetchRequest::Exchanges);
        if self.overview.exchange != ALL {
            self.fetch_symbols(Slot::OverviewSymbols, self.overview.exchange.clone());
        }
        if let Some(exchange) = self.search.exchange.clone() {
            self.fetch_symbols(Slot::SearchSymbols, exchange);
        }
        self.visit();
    }

    // ── Navigation ───────────────────────────────────────────────────

    pub fn switch_page(&mut self, page: Page) {
        if page.is_detail() && !self.active_page.is_detail() {
            self.return_page = self.active_page;
        }
        self.active_page = page;
        self.visit();
    }

    /// Leave a drill-down page.
    pub fn go_back(&mut self) {
        if self.active_page.is_detail() {
            self.switch_page(self.return_page);
        }
    }

    /// Load the active page on first visit.
    fn visit(&mut self) {
        match self.active_page {
            Page::Overview if !self.overview.loaded && !self.is_loading(Slot::OverviewRates) => {
                self.fetch_overview()
            }
            Page::Top10 if !self.top10.loaded && !self.is_loading(Slot::Top10) => {
                self.fetch_top10()
            }
            Page::Arbitrage
                if !self.arbitrage.loaded && !self.is_loading(Slot::Arbitrage) =>
            {
                self.fetch_arbitrage()
            }
            _ => {}
        }
    }

    /// Re-run the active page's query with its current filters.
    pub fn refresh(&mut self) {
        match self.active_page {
            Page::Overview => self.fetch_overview(),
            Page::Top10 => self.fetch_top10(),
            Page::Search => self.run_search(),
            Page::Arbitrage => self.fetch_arbitrage(),
            Page::Exchange => self.fetch_exchange(),
            Page::Pair => self.fetch_pair(),
            Page::Help => {}
        }
    }

    /// Drill into the focused row of the active page.
    pub fn open_focused(&mut self) {
        match self.active_page {
            Page::Overview => {
                if let Some(rec) = self.overview.records.get(self.overview.cursor) {
                    let (ex, sym) = (rec.exchange.clone(), rec.symbol.clone());
                    self.open_pair(&ex, &sym);
                }
            }
            Page::Top10 => {
                let Some(row) = self.top10.focused_row() else {
                    return;
                };
                let exchange = row.exchange.clone().unwrap_or_default();
                let symbol = row.symbol.clone();
                if self.top10.focused_field() == Some(RowSortField::Exchange) {
                    self.open_exchange(&exchange);
                } else {
                    self.open_pair(&exchange, &symbol);
                }
            }
            Page::Search => {
                let exchange = self.search.exchange.clone();
                let symbol = self.search.view.focused_row().map(|r| r.symbol.clone());
                if let (Some(ex), Some(sym)) = (exchange, symbol) {
                    self.open_pair(&ex, &sym);
                }
            }
            Page::Exchange => {
                let exchange = self.exchange.exchange.clone();
                let symbol = self.exchange.view.focused_row().map(|r| r.symbol.clone());
                if let (Some(ex), Some(sym)) = (exchange, symbol) {
                    self.open_pair(&ex, &sym);
                }
            }
            Page::Arbitrage => {
                let Some(opp) = self.arbitrage.table.rows().get(self.arbitrage.cursor.row) else {
                    return;
                };
                let exchange = match self.arbitrage.focused_field() {
                    ArbitrageSortField::ExchangeB
                    | ArbitrageSortField::RateB
                    | ArbitrageSortField::VolumeB => opp.exchange_b.clone(),
                    _ => opp.exchange_a.clone(),
                };
                let symbol = opp.symbol.clone();
                self.open_pair(&exchange, &symbol);
            }
            Page::Pair | Page::Help => {}
        }
    }

    pub fn open_exchange(&mut self, exchange: &str) {
        if exchange.is_empty() {
            return;
        }
        self.exchange.exchange = Some(exchange.to_lowercase());
        self.exchange.view = RankedView::new(RowIdentity::Symbol);
        self.switch_page(Page::Exchange);
        self.fetch_exchange();
    }

    pub fn open_pair(&mut self, exchange: &str, symbol: &str) {
        if exchange.is_empty() || symbol.is_empty() {
            return;
        }
        self.pair = PairState::new();
        self.pair.target = Some((exchange.to_lowercase(), symbol.to_string()));
        self.switch_page(Page::Pair);
        self.fetch_pair();
    }

    // ── Filters ──────────────────────────────────────────────────────

    pub fn select_overview_exchange(&mut self, exchange: &str) {
        self.overview.exchange = exchange.to_string();
        self.overview.symbol = ALL.to_string();
        self.overview.symbols.clear();
        if exchange != ALL {
            self.fetch_symbols(Slot::OverviewSymbols, exchange.to_string());
        }
    }

    pub fn select_search_exchange(&mut self, exchange: &str) {
        self.search.exchange = Some(exchange.to_string());
        self.search.symbol = ALL.to_string();
        self.search.symbols.clear();
        self.fetch_symbols(Slot::SearchSymbols, exchange.to_string());
    }

    pub fn cycle_overview_limit(&mut self, forward: bool) {
        self.overview.limit = step_choice(&OVERVIEW_LIMITS, self.overview.limit, forward);
        self.set_status(format!("Limit {}, Enter to apply", self.overview.limit));
    }

    pub fn cycle_arbitrage_limit(&mut self, forward: bool) {
        let current = self.arbitrage.query.limit.unwrap_or(ARBITRAGE_LIMITS[0]);
        let limit = step_choice(&ARBITRAGE_LIMITS, current, forward);
        self.arbitrage.query.limit = Some(limit);
        self.set_status(format!("Limit {limit}, Enter to apply"));
    }

    pub fn cycle_hedge_sort(&mut self) {
        self.arbitrage.query.sort_by = self.arbitrage.query.sort_by.cycle();
    }

    pub fn cycle_time_range(&mut self) {
        self.arbitrage.query.time_range = self.arbitrage.query.time_range.cycle();
    }

    /// Custom arbitrage symbol. Blank input clears the filter.
    pub fn set_arbitrage_symbol(&mut self, input: &str) {
        let trimmed = input.trim();
        self.arbitrage.query.symbol = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    // ── Pickers ──────────────────────────────────────────────────────

    pub fn open_picker(&mut self, target: PickerTarget) {
        let with_all = |list: &[String]| {
            std::iter::once(ALL.to_string())
                .chain(list.iter().cloned())
                .collect::<Vec<_>>()
        };
        let options = match target {
            PickerTarget::OverviewExchange => with_all(&self.exchanges),
            PickerTarget::OverviewSymbol => with_all(&self.overview.symbols),
            PickerTarget::SearchSymbol => with_all(&self.search.symbols),
            PickerTarget::SearchExchange | PickerTarget::DetailExchange => self.exchanges.clone(),
        };
        if options.is_empty() {
            self.set_warning("No exchanges loaded yet");
            return;
        }
        self.picker = Some(PickerState {
            target,
            options,
            query: String::new(),
            cursor: 0,
        });
        self.overlay = Overlay::Picker;
    }

    /// Apply the picker's highlighted option and close it.
    pub fn confirm_picker(&mut self) {
        let Some(picker) = self.picker.take() else {
            self.overlay = Overlay::None;
            return;
        };
        self.overlay = Overlay::None;
        let Some(choice) = picker.selected().map(str::to_string) else {
            return;
        };
        match picker.target {
            PickerTarget::OverviewExchange => self.select_overview_exchange(&choice),
            PickerTarget::OverviewSymbol => self.overview.symbol = choice,
            PickerTarget::SearchExchange => self.select_search_exchange(&choice),
            PickerTarget::SearchSymbol => self.search.symbol = choice,
            PickerTarget::DetailExchange => self.open_exchange(&choice),
        }
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
        self.overlay = Overlay::None;
    }

    // ── Fetching ─────────────────────────────────────────────────────

    pub fn is_loading(&self, slot: Slot) -> bool {
        self.requests.is_pending(slot)
    }

    /// Issue a request for `slot`, superseding whatever is in flight there.
    pub fn request(&mut self, slot: Slot, request: FetchRequest) -> Option<RequestId> {
        let id = self.requests.issue(slot);
        tracing::debug!(id = id.get(), ?slot, request = request.label(), "dispatch");
        match self.worker_tx.send(WorkerCommand::Fetch { id, slot, request }) {
            Ok(()) => Some(id),
            Err(_) => {
                self.requests.accept(slot, id);
                self.push_error(
                    ErrorCategory::Other,
                    "Worker thread is not running".into(),
                    slot.label().into(),
                );
                None
            }
        }
    }

    fn fetch_symbols(&mut self, slot: Slot, exchange: String) {
        self.request(slot, FetchRequest::Symbols { exchange });
    }

    pub fn fetch_overview(&mut self) {
        let query = self.overview.query();
        self.request(Slot::OverviewRates, FetchRequest::FundingRates(query));
    }

    pub fn fetch_top10(&mut self) {
        let query = TopVolumeQuery::top(self.limits.top10_size);
        self.request(Slot::Top10, FetchRequest::TopVolume(query));
    }

    pub fn run_search(&mut self) {
        match self.search.query() {
            Some(query) => {
                self.search.queried = true;
                self.request(Slot::SearchRows, FetchRequest::TopVolume(query));
            }
            None => self.set_warning("Pick an exchange first (x)"),
        }
    }

    pub fn fetch_arbitrage(&mut self) {
        self.arbitrage.error = None;
        let query = self.arbitrage.query.clone();
        self.request(Slot::Arbitrage, FetchRequest::Arbitrage(query));
    }

    pub fn fetch_exchange(&mut self) {
        let Some(exchange) = self.exchange.exchange.clone() else {
            return;
        };
        let query = TopVolumeQuery {
            top_n: Some(self.exchange.top_n),
            exchange: Some(exchange),
            symbol: None,
        };
        self.request(Slot::ExchangeRows, FetchRequest::TopVolume(query));
    }

    pub fn fetch_pair(&mut self) {
        let Some((exchange, symbol)) = self.pair.target.clone() else {
            return;
        };
        let aggregate = AggregateQuery {
            exchange: Some(exchange.clone()),
            symbol: Some(symbol.clone()),
            limit: Some(self.limits.aggregate_limit),
        };
        let history = FundingRateQuery {
            exchange: Some(exchange),
            symbol: Some(symbol),
            limit: Some(self.limits.history_limit),
            period_type: Some(PeriodKey::Hour),
        };
        self.request(Slot::PairAggregate, FetchRequest::Aggregate(aggregate));
        self.request(Slot::PairHistory, FetchRequest::FundingRates(history));
    }

    // ── Responses ────────────────────────────────────────────────────

    /// Apply a worker response if it answers the latest request of its slot.
    pub fn apply_response(&mut self, resp: WorkerResponse) {
        if !self.requests.accept(resp.slot, resp.id) {
            tracing::debug!(id = resp.id.get(), slot = ?resp.slot, "discarding superseded response");
            return;
        }
        match resp.result {
            Ok(payload) => self.apply_payload(resp.slot, payload),
            Err(err) => self.apply_failure(resp.slot, &err),
        }
    }

    fn apply_payload(&mut self, slot: Slot, payload: FetchPayload) {
        match (slot, payload) {
            (Slot::Exchanges, FetchPayload::Exchanges(list)) => {
                self.exchanges = normalize_exchanges(list);
                if self.search.exchange.is_none() {
                    if let Some(ex) = default_exchange(&self.exchanges).map(str::to_string) {
                        self.select_search_exchange(&ex);
                    }
                }
            }
            (Slot::OverviewSymbols, FetchPayload::Symbols(list)) => self.overview.symbols = list,
            (Slot::SearchSymbols, FetchPayload::Symbols(list)) => self.search.symbols = list,
            (Slot::OverviewRates, FetchPayload::FundingRates(records)) => {
                self.overview.set_records(records)
            }
            (Slot::Top10, FetchPayload::TopVolume(rows)) => self.top10.set_rows(rows),
            (Slot::SearchRows, FetchPayload::TopVolume(rows)) => self.search.view.set_rows(rows),
            (Slot::ExchangeRows, FetchPayload::TopVolume(rows)) => {
                self.exchange.view.set_rows(rows)
            }
            (Slot::Arbitrage, FetchPayload::Arbitrage(page)) => {
                self.arbitrage.total = page.total;
                self.arbitrage.table.set_items(page.data);
                self.arbitrage.error = None;
                self.arbitrage.loaded = true;
                let len = self.arbitrage.table.len();
                self.arbitrage
                    .cursor
                    .clamp(len, ArbitrageSortField::ALL.len());
            }
            (Slot::PairAggregate, FetchPayload::Aggregate(records)) => {
                if let Some((exchange, symbol)) = &self.pair.target {
                    let row = pair_row(exchange, symbol, &records);
                    self.pair.view.set_rows(vec![row]);
                }
            }
            (Slot::PairHistory, FetchPayload::FundingRates(records)) => {
                self.pair.history = history_ascending(&records);
                self.pair.history_loaded = true;
            }
            (slot, payload) => {
                tracing::warn!(?slot, ?payload, "payload does not match slot");
            }
        }
    }

    /// A failed fetch degrades its view to empty and is recorded.
    fn apply_failure(&mut self, slot: Slot, err: &ApiError) {
        match slot {
            Slot::Exchanges => self.exchanges.clear(),
            Slot::OverviewSymbols => self.overview.symbols.clear(),
            Slot::SearchSymbols => self.search.symbols.clear(),
            Slot::OverviewRates => self.overview.set_records(Vec::new()),
            Slot::Top10 => self.top10.clear(),
            Slot::SearchRows => self.search.view.clear(),
            Slot::ExchangeRows => self.exchange.view.clear(),
            Slot::Arbitrage => {
                self.arbitrage.table.clear();
                self.arbitrage.total = 0;
                self.arbitrage.loaded = true;
                self.arbitrage.error = Some(ARBITRAGE_FAILURE.to_string());
            }
            Slot::PairAggregate => self.pair.view.clear(),
            Slot::PairHistory => {
                self.pair.history.clear();
                self.pair.history_loaded = true;
            }
        }
        self.push_error(ErrorCategory::of(err), err.to_string(), slot.label().to_string());
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Push an error to the history and set the status bar.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

/// Move to the neighbouring choice. Values not in `choices` snap to the
/// nearest larger choice first.
pub fn step_choice(choices: &[u32], current: u32, forward: bool) -> u32 {
    let Some(last) = choices.len().checked_sub(1) else {
        return current;
    };
    let pos = match choices.iter().position(|c| *c == current) {
        Some(pos) if forward => (pos + 1).min(last),
        Some(pos) => pos.saturating_sub(1),
        None => choices.iter().position(|c| *c > current).unwrap_or(last),
    };
    choices[pos]
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use fundlens_core::domain::{ArbitrageOpportunity, ArbitragePage, PeriodAggregate};

    use super::*;

    fn app() -> (AppState, Receiver<WorkerCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(cmd_tx, resp_rx, PageLimits::default(), PathBuf::from("state.json"));
        (app, cmd_rx)
    }

    fn issued(rx: &Receiver<WorkerCommand>) -> Vec<(RequestId, Slot, FetchRequest)> {
        rx.try_iter()
            .filter_map(|cmd| match cmd {
                WorkerCommand::Fetch { id, slot, request } => Some((id, slot, request)),
                WorkerCommand::Shutdown => None,
            })
            .collect()
    }

    fn row(symbol: &str, exchange: &str, volume: f64, day: f64) -> Row {
        Row::new(symbol)
            .with_exchange(exchange)
            .with_volume(volume)
            .with_agg(PeriodKey::Day, PeriodAggregate::new(day, day * 365.0))
    }

    #[test]
    fn page_navigation_wraps() {
        assert_eq!(Page::Overview.prev(), Page::Help);
        assert_eq!(Page::Help.next(), Page::Overview);
        for i in 0..Page::COUNT {
            assert_eq!(Page::from_index(i).map(Page::index), Some(i));
        }
        assert!(Page::from_index(Page::COUNT).is_none());
    }

    #[test]
    fn start_requests_exchanges_and_overview() {
        let (mut app, rx) = app();
        app.start();
        let slots: Vec<Slot> = issued(&rx).into_iter().map(|(_, s, _)| s).collect();
        assert_eq!(slots, vec![Slot::Exchanges, Slot::OverviewRates]);
        assert!(app.is_loading(Slot::OverviewRates));
    }

    #[test]
    fn stale_response_is_discarded() {
        let (mut app, rx) = app();
        app.active_page = Page::Top10;
        app.fetch_top10();
        app.fetch_top10();
        let ids: Vec<RequestId> = issued(&rx).into_iter().map(|(id, _, _)| id).collect();

        app.apply_response(WorkerResponse {
            id: ids[1],
            slot: Slot::Top10,
            result: Ok(FetchPayload::TopVolume(vec![row("BTC", "okx", 5.0, 0.01)])),
        });
        app.apply_response(WorkerResponse {
            id: ids[0],
            slot: Slot::Top10,
            result: Ok(FetchPayload::TopVolume(Vec::new())),
        });

        assert_eq!(app.top10.table.len(), 1);
        assert!(!app.is_loading(Slot::Top10));
    }

    #[test]
    fn failure_empties_table_and_records_error() {
        let (mut app, rx) = app();
        app.fetch_top10();
        let (id, _, _) = issued(&rx).remove(0);
        app.top10.set_rows(vec![row("BTC", "okx", 5.0, 0.01)]);

        app.apply_response(WorkerResponse {
            id,
            slot: Slot::Top10,
            result: Err(ApiError::Status {
                status: 500,
                endpoint: "/x".into(),
            }),
        });

        assert!(app.top10.table.is_empty());
        assert!(app.top10.loaded);
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Http);
        assert!(matches!(app.status_message, Some((_, StatusLevel::Error))));
    }

    #[test]
    fn arbitrage_failure_sets_message() {
        let (mut app, rx) = app();
        app.fetch_arbitrage();
        let (id, _, _) = issued(&rx).remove(0);
        app.apply_response(WorkerResponse {
            id,
            slot: Slot::Arbitrage,
            result: Err(ApiError::Network {
                endpoint: "/a".into(),
                message: "refused".into(),
            }),
        });
        assert!(app.arbitrage.error.is_some());
        assert!(app.arbitrage.table.is_empty());
    }

    #[test]
    fn exchange_list_selects_default_search_exchange() {
        let (mut app, rx) = app();
        app.start();
        let (id, _, _) = issued(&rx).remove(0);
        app.apply_response(WorkerResponse {
            id,
            slot: Slot::Exchanges,
            result: Ok(FetchPayload::Exchanges(vec!["OKX".into(), "Binance".into()])),
        });
        assert_eq!(app.exchanges, vec!["okx", "binance"]);
        assert_eq!(app.search.exchange.as_deref(), Some("binance"));
        assert_eq!(app.search.symbol, ALL);

        let symbol_req = issued(&rx);
        assert_eq!(symbol_req.len(), 1);
        assert_eq!(
            symbol_req[0].2,
            FetchRequest::Symbols {
                exchange: "binance".into()
            }
        );
    }

    #[test]
    fn search_waits_for_submit() {
        let (mut app, rx) = app();
        app.switch_page(Page::Search);
        assert!(issued(&rx).is_empty());

        app.run_search();
        assert!(!app.search.queried);
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));

        app.search.exchange = Some("okx".into());
        app.search.symbol = "ETH".into();
        app.run_search();
        assert!(app.search.queried);
        let reqs = issued(&rx);
        match &reqs[0].2 {
            FetchRequest::TopVolume(q) => {
                assert_eq!(q.top_n, Some(50));
                assert_eq!(q.exchange.as_deref(), Some("okx"));
                assert_eq!(q.symbol.as_deref(), Some("ETH"));
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn changing_exchange_resets_symbol() {
        let (mut app, rx) = app();
        app.overview.symbol = "BTC".into();
        app.select_overview_exchange("okx");
        assert_eq!(app.overview.symbol, ALL);
        assert_eq!(issued(&rx).len(), 1);

        app.select_overview_exchange(ALL);
        assert!(issued(&rx).is_empty());
    }

    #[test]
    fn top10_exchange_column_opens_exchange_page() {
        let (mut app, rx) = app();
        app.switch_page(Page::Top10);
        app.top10.set_rows(vec![row("BTC", "okx", 5.0, 0.01)]);
        let _ = issued(&rx);

        app.top10.cursor.column = 0;
        app.open_focused();
        assert_eq!(app.active_page, Page::Exchange);
        assert_eq!(app.exchange.exchange.as_deref(), Some("okx"));
        assert_eq!(issued(&rx)[0].1, Slot::ExchangeRows);

        app.go_back();
        assert_eq!(app.active_page, Page::Top10);
        app.top10.cursor.column = 1;
        app.open_focused();
        assert_eq!(app.active_page, Page::Pair);
        assert_eq!(app.pair.target, Some(("okx".into(), "BTC".into())));
        let slots: Vec<Slot> = issued(&rx).into_iter().map(|(_, s, _)| s).collect();
        assert_eq!(slots, vec![Slot::PairAggregate, Slot::PairHistory]);
    }

    #[test]
    fn pair_history_is_sorted_ascending() {
        let (mut app, rx) = app();
        app.open_pair("okx", "BTC");
        let reqs = issued(&rx);
        let rec = |ts: i64| FundingRateRecord {
            id: ts,
            exchange: "okx".into(),
            symbol: "BTC".into(),
            funding_rate: 0.0001,
            funding_time: String::new(),
            timestamp_ms: ts,
        };
        app.apply_response(WorkerResponse {
            id: reqs[1].0,
            slot: Slot::PairHistory,
            result: Ok(FetchPayload::FundingRates(vec![rec(3), rec(1), rec(2)])),
        });
        let ts: Vec<i64> = app.pair.history.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(ts, vec![1, 2, 3]);
    }

    #[test]
    fn arbitrage_payload_sorts_by_annualized() {
        let (mut app, rx) = app();
        app.fetch_arbitrage();
        let (id, _, _) = issued(&rx).remove(0);
        let opp = |symbol: &str, annualized: f64| ArbitrageOpportunity {
            symbol: symbol.into(),
            exchange_a: "okx".into(),
            rate_a: 0.0,
            funding_interval_a: None,
            volume_a: 0.0,
            exchange_b: "binance".into(),
            rate_b: 0.0,
            funding_interval_b: None,
            volume_b: 0.0,
            difference_8h: 0.0,
            annualized_arbitrage: annualized,
        };
        app.apply_response(WorkerResponse {
            id,
            slot: Slot::Arbitrage,
            result: Ok(FetchPayload::Arbitrage(ArbitragePage {
                total: 2,
                data: vec![opp("A", 5.0), opp("B", 50.0)],
            })),
        });
        assert_eq!(app.arbitrage.table.rows()[0].symbol, "B");
        assert_eq!(app.arbitrage.total, 2);
    }

    #[test]
    fn limits_step_through_choices() {
        assert_eq!(step_choice(&ARBITRAGE_LIMITS, 10, true), 20);
        assert_eq!(step_choice(&ARBITRAGE_LIMITS, 100, true), 100);
        assert_eq!(step_choice(&ARBITRAGE_LIMITS, 10, false), 10);
        assert_eq!(step_choice(&ARBITRAGE_LIMITS, 30, true), 50);
        assert_eq!(step_choice(&[], 7, true), 7);
    }

    #[test]
    fn blank_arbitrage_symbol_clears_filter() {
        let (mut app, _rx) = app();
        app.set_arbitrage_symbol("  ETH ");
        assert_eq!(app.arbitrage.query.symbol.as_deref(), Some("ETH"));
        app.set_arbitrage_symbol("   ");
        assert!(app.arbitrage.query.symbol.is_none());
    }

    #[test]
    fn error_history_is_capped() {
        let (mut app, _rx) = app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("e{i}"), String::new());
        }
        assert_eq!(app.error_history.len(), ERROR_HISTORY_CAP);
        assert_eq!(app.error_history[0].message, "e59");
    }
}
