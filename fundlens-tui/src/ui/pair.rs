//! Page 6, Pair detail: multi-period aggregate row and hourly rate history.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};

use fundlens_core::domain::FundingRateRecord;
use fundlens_core::format::{format_gmt8, format_gmt8_short, format_rate};

use crate::app::{AppState, Slot};
use crate::theme;
use crate::ui::{render_message, table};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let pair = &app.pair;
    if pair.target.is_none() {
        render_message(
            f,
            area,
            vec![
                Line::from(Span::styled("No pair selected.", theme::muted())),
                Line::from(Span::styled(
                    "Press o on a row in Overview, Top 10, Search, Arbitrage or Exchange.",
                    theme::muted(),
                )),
            ],
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(6)])
        .split(area);

    let agg_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Aggregated Rates ")
        .title_style(theme::neutral());
    let agg_area = agg_block.inner(chunks[0]);
    f.render_widget(agg_block, chunks[0]);

    if app.is_loading(Slot::PairAggregate) {
        render_message(f, agg_area, vec![Line::from(Span::styled("Loading...", theme::warning()))]);
    } else if pair.view.table.is_empty() {
        render_message(
            f,
            agg_area,
            vec![Line::from(Span::styled("No aggregate data.", theme::muted()))],
        );
    } else {
        table::render_ranked(f, agg_area, &pair.view);
    }

    let history_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" Hourly Funding History ({} records) ", pair.history.len()))
        .title_style(theme::neutral());
    let history_area = history_block.inner(chunks[1]);
    f.render_widget(history_block, chunks[1]);

    if app.is_loading(Slot::PairHistory) {
        render_message(f, history_area, vec![Line::from(Span::styled("Loading...", theme::warning()))]);
    } else if pair.history.is_empty() {
        render_message(
            f,
            history_area,
            vec![Line::from(Span::styled("No history data.", theme::muted()))],
        );
    } else {
        render_history(f, history_area, &pair.history);
    }
}

fn render_history(f: &mut Frame, area: Rect, history: &[FundingRateRecord]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(area);

    let data: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.funding_rate * 100.0))
        .collect();

    let min_y = data.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let max_y = data.iter().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max);
    let padding = ((max_y - min_y).abs() * 0.1).max(0.0001);
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = data.len().saturating_sub(1) as f64;

    let dataset = Dataset::default()
        .name("Rate %")
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .graph_type(GraphType::Line)
        .data(&data);

    let first = history.first().map(|r| format_gmt8_short(r.timestamp_ms)).unwrap_or_default();
    let last = history.last().map(|r| format_gmt8_short(r.timestamp_ms)).unwrap_or_default();

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first, theme::muted()),
                    Span::styled(last, theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Rate %", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.4}"), theme::muted()),
                    Span::styled(format!("{y_max:.4}"), theme::muted()),
                ]),
        );
    f.render_widget(chart, chunks[0]);

    if let Some(latest) = history.last() {
        let line = Line::from(vec![
            Span::styled("Latest: ", theme::muted()),
            Span::styled(format_rate(latest.funding_rate), theme::rate(latest.funding_rate)),
            Span::styled(format!("  at {}", format_gmt8(latest.timestamp_ms)), theme::muted()),
        ]);
        f.render_widget(Paragraph::new(line), chunks[1]);
    }
}
