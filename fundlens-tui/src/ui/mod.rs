//! Top-level UI layout: one page at a time with a status bar.

pub mod arbitrage;
pub mod exchange;
pub mod help;
pub mod overlays;
pub mod overview;
pub mod pair;
pub mod search;
pub mod status_bar;
pub mod table;
pub mod top10;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, Overlay, Page};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    draw_page(f, main_area, app);
    status_bar::render(f, status_area, app);

    // Draw overlays on top.
    match app.overlay {
        Overlay::Welcome => overlays::render_welcome(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::Picker => {
            if let Some(picker) = &app.picker {
                overlays::render_picker(f, main_area, picker);
            }
        }
        Overlay::SymbolInput => overlays::render_symbol_input(f, main_area, &app.text_input),
        Overlay::None => {}
    }
}

/// Draw the active page with its border.
fn draw_page(f: &mut Frame, area: Rect, app: &AppState) {
    let page = app.active_page;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", page_title(app), page.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match page {
        Page::Overview => overview::render(f, inner, app),
        Page::Top10 => top10::render(f, inner, app),
        Page::Search => search::render(f, inner, app),
        Page::Arbitrage => arbitrage::render(f, inner, app),
        Page::Exchange => exchange::render(f, inner, app),
        Page::Pair => pair::render(f, inner, app),
        Page::Help => help::render(f, inner, app),
    }
}

fn page_title(app: &AppState) -> String {
    match app.active_page {
        Page::Exchange => match &app.exchange.exchange {
            Some(ex) => format!("Exchange: {}", ex.to_uppercase()),
            None => Page::Exchange.label().to_string(),
        },
        Page::Pair => match &app.pair.target {
            Some((ex, sym)) => format!("{sym} on {}", ex.to_uppercase()),
            None => Page::Pair.label().to_string(),
        },
        page => page.label().to_string(),
    }
}

/// A one-line filter bar: `label: value` pairs followed by key hints.
pub fn filter_line<'a>(pairs: &[(&'a str, String)], hints: &'a str) -> Line<'a> {
    let mut spans = Vec::with_capacity(pairs.len() * 2 + 1);
    for (label, value) in pairs {
        spans.push(Span::styled(format!("{label}: "), theme::muted()));
        spans.push(Span::styled(format!("{value}  "), theme::accent_bold()));
    }
    spans.push(Span::styled(hints, theme::neutral()));
    Line::from(spans)
}

/// Centered placeholder message (loading, empty, errors).
pub fn render_message(f: &mut Frame, area: Rect, lines: Vec<Line>) {
    let mut padded = vec![Line::from("")];
    padded.extend(lines);
    f.render_widget(Paragraph::new(padded), area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
