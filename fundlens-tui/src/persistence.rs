//! App state persistence: JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use fundlens_core::api::ALL;
use fundlens_core::config::PageLimits;
use fundlens_core::domain::{HedgeSort, TimeRange};

use crate::app::{AppState, Overlay, Page, OVERVIEW_LIMITS};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub active_page: Page,
    pub overview_exchange: String,
    pub overview_symbol: String,
    pub overview_limit: u32,
    pub search_exchange: Option<String>,
    pub search_symbol: String,
    pub arbitrage_symbol: Option<String>,
    pub arbitrage_sort_by: HedgeSort,
    pub arbitrage_time_range: TimeRange,
    pub arbitrage_limit: u32,
    pub welcome_dismissed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        let limits = PageLimits::default();
        Self {
            active_page: Page::Overview,
            overview_exchange: ALL.to_string(),
            overview_symbol: ALL.to_string(),
            overview_limit: limits.overview_limit,
            search_exchange: None,
            search_symbol: ALL.to_string(),
            arbitrage_symbol: None,
            arbitrage_sort_by: HedgeSort::default(),
            arbitrage_time_range: TimeRange::default(),
            arbitrage_limit: limits.arbitrage_limit,
            welcome_dismissed: false,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "ignoring corrupt state file");
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    let active_page = if app.active_page.is_detail() {
        app.return_page
    } else {
        app.active_page
    };
    PersistedState {
        active_page,
        overview_exchange: app.overview.exchange.clone(),
        overview_symbol: app.overview.symbol.clone(),
        overview_limit: app.overview.limit,
        search_exchange: app.search.exchange.clone(),
        search_symbol: app.search.symbol.clone(),
        arbitrage_symbol: app.arbitrage.query.symbol.clone(),
        arbitrage_sort_by: app.arbitrage.query.sort_by,
        arbitrage_time_range: app.arbitrage.query.time_range,
        arbitrage_limit: app.arbitrage.query.limit.unwrap_or(app.limits.arbitrage_limit),
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

/// Apply persisted state to AppState. Drill-down pages need a target, so they
/// are never restored directly.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.active_page = if state.active_page.is_detail() {
        Page::Overview
    } else {
        state.active_page
    };
    app.overview.exchange = state.overview_exchange;
    app.overview.symbol = state.overview_symbol;
    if OVERVIEW_LIMITS.contains(&state.overview_limit) {
        app.overview.limit = state.overview_limit;
    }
    app.search.exchange = state.search_exchange;
    app.search.symbol = state.search_symbol;
    app.arbitrage.query.symbol = state.arbitrage_symbol;
    app.arbitrage.query.sort_by = state.arbitrage_sort_by;
    app.arbitrage.query.time_range = state.arbitrage_time_range;
    if state.arbitrage_limit > 0 {
        app.arbitrage.query.limit = Some(state.arbitrage_limit);
    }
    app.overlay = if state.welcome_dismissed {
        Overlay::None
    } else {
        Overlay::Welcome
    };
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::mpsc;

    use super::*;

    fn app() -> AppState {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        AppState::new(cmd_tx, resp_rx, PageLimits::default(), PathBuf::from("state.json"))
    }

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut state = PersistedState::default();
        state.active_page = Page::Arbitrage;
        state.search_exchange = Some("okx".into());
        state.arbitrage_sort_by = HedgeSort::Difference;
        state.welcome_dismissed = true;

        save(&path, &state).unwrap();
        let loaded = load(&path);

        assert_eq!(loaded.active_page, Page::Arbitrage);
        assert_eq!(loaded.search_exchange.as_deref(), Some("okx"));
        assert_eq!(loaded.arbitrage_sort_by, HedgeSort::Difference);
        assert!(loaded.welcome_dismissed);
    }

    #[test]
    fn missing_file_returns_defaults() {
        let loaded = load(Path::new("/nonexistent/path/state.json"));
        assert_eq!(loaded.active_page, Page::Overview);
        assert!(!loaded.welcome_dismissed);
    }

    #[test]
    fn corrupt_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        let loaded = load(&path);
        assert_eq!(loaded.overview_exchange, ALL);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"overview_limit": 100}"#).unwrap();
        let loaded = load(&path);
        assert_eq!(loaded.overview_limit, 100);
        assert_eq!(loaded.arbitrage_limit, 10);
    }

    #[test]
    fn detail_page_is_not_restored() {
        let mut app = app();
        let mut state = PersistedState::default();
        state.active_page = Page::Pair;
        state.welcome_dismissed = true;
        apply(&mut app, state);
        assert_eq!(app.active_page, Page::Overview);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn extract_reports_return_page_from_detail() {
        let mut app = app();
        app.return_page = Page::Search;
        app.active_page = Page::Exchange;
        app.overlay = Overlay::None;
        let state = extract(&app);
        assert_eq!(state.active_page, Page::Search);
        assert!(state.welcome_dismissed);
    }
}
