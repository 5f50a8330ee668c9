//! FundLens TUI - terminal dashboard for cross-exchange funding rates
//!
//! Pages:
//! 1. Overview - latest funding rates with summary and trend chart
//! 2. Top 10 - highest-volume pairs across exchanges, ranked per period
//! 3. Search - top pairs on one exchange
//! 4. Arbitrage - cross-exchange funding divergences
//! 5. Exchange - drill-down for one exchange
//! 6. Pair - drill-down for one pair with hourly history
//! 7. Help - keyboard shortcuts

pub mod app;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;
pub use theme::Theme;
