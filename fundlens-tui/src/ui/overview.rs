//! Page 1, Overview: latest funding rates, a market summary, and a trend chart.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row as TableRow, Table,
    TableState,
};

use fundlens_core::cell::RankedCell;
use fundlens_core::format::{format_gmt8, format_gmt8_short, format_rate, RateDirection};
use fundlens_core::pages::MarketOverview;

use crate::app::{AppState, OverviewState, OverviewTab, Slot};
use crate::theme;
use crate::ui::{filter_line, render_message};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let overview = &app.overview;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(area);

    let tab = match overview.tab {
        OverviewTab::Table => "Table",
        OverviewTab::Chart => "Chart",
    };
    let filters = filter_line(
        &[
            ("Exchange", overview.exchange.to_uppercase()),
            ("Symbol", overview.symbol.clone()),
            ("Limit", overview.limit.to_string()),
            ("View", tab.to_string()),
        ],
        "[x]exchange [y]symbol [+/-]limit [c]view [Enter]query",
    );
    f.render_widget(Paragraph::new(filters), chunks[0]);

    render_summary(f, chunks[1], &overview.summary);

    let body = chunks[2];
    if app.is_loading(Slot::OverviewRates) && overview.records.is_empty() {
        render_message(f, body, vec![Line::from(Span::styled("Loading...", theme::warning()))]);
        return;
    }
    if overview.records.is_empty() {
        render_message(
            f,
            body,
            vec![Line::from(Span::styled(
                "No funding rates. Adjust the filters and press Enter.",
                theme::muted(),
            ))],
        );
        return;
    }

    match overview.tab {
        OverviewTab::Table => render_table(f, body, overview),
        OverviewTab::Chart => render_chart(f, body, &overview.summary),
    }
}

fn render_summary(f: &mut Frame, area: Rect, summary: &MarketOverview) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Market Overview ")
        .title_style(theme::neutral());

    let latest = match summary.latest_rate {
        Some(rate) => Span::styled(format_rate(rate), theme::rate(rate)),
        None => Span::styled("-", theme::muted()),
    };
    let direction = summary
        .latest_rate
        .map(|rate| RateDirection::of(rate).label())
        .unwrap_or("");

    let lines = vec![
        Line::from(vec![
            Span::styled("Latest rate: ", theme::muted()),
            latest,
            Span::styled(format!("  {direction}"), theme::muted()),
        ]),
        Line::from(vec![
            Span::styled("Positive: ", theme::muted()),
            Span::styled(summary.positive.to_string(), theme::negative()),
            Span::styled("  Negative: ", theme::muted()),
            Span::styled(summary.negative.to_string(), theme::positive()),
            Span::styled("  Records: ", theme::muted()),
            Span::styled(summary.total.to_string(), theme::accent()),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(f: &mut Frame, area: Rect, overview: &OverviewState) {
    let header = TableRow::new(["Exchange", "Pair", "Rate", "Direction", "Time (GMT+8)"]
        .into_iter()
        .map(|h| Cell::from(h).style(theme::header(false))));

    let rows = overview.records.iter().map(|rec| {
        let direction = RateDirection::of(rec.funding_rate);
        TableRow::new(vec![
            Cell::from(rec.exchange.to_uppercase()).style(theme::neutral()),
            Cell::from(rec.symbol.clone()).style(theme::accent_bold()),
            Cell::from(RankedCell::new(Some(rec.funding_rate)).build().text)
                .style(theme::rate(rec.funding_rate)),
            Cell::from(direction.label()).style(theme::rate(rec.funding_rate)),
            Cell::from(format_gmt8(rec.timestamp_ms)).style(theme::muted()),
        ])
    });

    let widths = [
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(11),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default().with_selected(Some(overview.cursor));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_chart(f: &mut Frame, area: Rect, summary: &MarketOverview) {
    let points = &summary.chart;
    if points.is_empty() {
        render_message(f, area, vec![Line::from(Span::styled("No chart data.", theme::muted()))]);
        return;
    }

    let min_y = points.iter().map(|p| p.percent).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.percent).fold(f64::NEG_INFINITY, f64::max);
    let padding = ((max_y - min_y).abs() * 0.1).max(0.0001);
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = points.len().saturating_sub(1) as f64;

    let data: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.percent))
        .collect();

    let dataset = Dataset::default()
        .name("Funding rate %")
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .graph_type(GraphType::Line)
        .data(&data);

    let first = points.first().map(|p| format_gmt8_short(p.timestamp_ms)).unwrap_or_default();
    let last = points.last().map(|p| format_gmt8_short(p.timestamp_ms)).unwrap_or_default();

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(Span::styled("Time", theme::muted()))
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

    f.render_widget(chart, area);
}
