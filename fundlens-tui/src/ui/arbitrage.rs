//! Page 4, Arbitrage: cross-exchange funding divergences.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row as TableRow, Table, TableState};

use fundlens_core::cell::RankedCell;
use fundlens_core::domain::{ArbitrageOpportunity, PeriodKey};
use fundlens_core::format::{format_annualized, format_signed_rate, format_volume, ArbitrageTier};
use fundlens_core::sort::ArbitrageSortField;

use crate::app::{AppState, ArbitrageState, Slot};
use crate::theme;
use crate::ui::{filter_line, render_message};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let arb = &app.arbitrage;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    let symbol = arb.query.symbol.clone().unwrap_or_else(|| "all".into());
    let limit = arb
        .query
        .limit
        .map(|l| l.to_string())
        .unwrap_or_else(|| "-".into());
    let filters = filter_line(
        &[
            ("Symbol", symbol),
            ("Rank by", arb.query.sort_by.label().to_string()),
            ("Rates", arb.query.time_range.label().to_string()),
            ("Limit", limit),
        ],
        "[/]symbol [b]rank [t]rates [+/-]limit [Enter]search",
    );
    f.render_widget(Paragraph::new(filters), chunks[0]);

    let summary = if arb.loaded {
        format!("{} opportunities ({} total)", arb.table.len(), arb.total)
    } else {
        String::new()
    };
    f.render_widget(
        Paragraph::new(Span::styled(summary, theme::muted())),
        chunks[1],
    );

    let body = chunks[2];
    if app.is_loading(Slot::Arbitrage) {
        render_message(f, body, vec![Line::from(Span::styled("Loading...", theme::warning()))]);
    } else if let Some(err) = &arb.error {
        render_message(f, body, vec![Line::from(Span::styled(err.as_str(), theme::negative()))]);
    } else if arb.table.is_empty() {
        render_message(
            f,
            body,
            vec![Line::from(Span::styled(
                "No arbitrage opportunities found.",
                theme::muted(),
            ))],
        );
    } else {
        render_table(f, body, arb);
    }
}

fn render_table(f: &mut Frame, area: Rect, arb: &ArbitrageState) {
    let sort = arb.table.sort();
    let header = TableRow::new(ArbitrageSortField::ALL.iter().enumerate().map(|(i, field)| {
        let sorted = sort.field == *field;
        let label = if sorted {
            format!("{} {}", field.label(), sort.order.arrow())
        } else {
            field.label().to_string()
        };
        let mut style = theme::header(sorted);
        if i == arb.cursor.column {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Cell::from(label).style(style)
    }));

    let rows = arb.table.rows().iter().map(|opp| {
        TableRow::new(
            ArbitrageSortField::ALL
                .iter()
                .map(|field| opportunity_cell(opp, *field))
                .collect::<Vec<_>>(),
        )
    });

    let widths = ArbitrageSortField::ALL.map(|field| match field {
        ArbitrageSortField::Symbol => Constraint::Length(12),
        ArbitrageSortField::ExchangeA | ArbitrageSortField::ExchangeB => Constraint::Length(11),
        ArbitrageSortField::RateA | ArbitrageSortField::RateB => Constraint::Length(16),
        ArbitrageSortField::VolumeA | ArbitrageSortField::VolumeB => Constraint::Length(10),
        ArbitrageSortField::Difference8h => Constraint::Length(10),
        ArbitrageSortField::AnnualizedArbitrage => Constraint::Length(11),
    });

    let table = Table::new(rows, widths)
        .header(header.bottom_margin(1))
        .column_spacing(1)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default().with_selected(Some(arb.cursor.row));
    f.render_stateful_widget(table, area, &mut state);
}

/// Rate text with its funding interval tag, e.g. `0.01000% 【8h】`.
fn rate_text(rate: f64, interval: Option<f64>) -> String {
    RankedCell::new(Some(rate))
        .funding_interval(interval)
        .period(PeriodKey::Hour)
        .build()
        .inline()
}

fn opportunity_cell(opp: &ArbitrageOpportunity, field: ArbitrageSortField) -> Cell<'static> {
    match field {
        ArbitrageSortField::Symbol => Cell::from(opp.symbol.clone()).style(theme::accent_bold()),
        ArbitrageSortField::ExchangeA => {
            Cell::from(opp.exchange_a.to_uppercase()).style(theme::neutral())
        }
        ArbitrageSortField::ExchangeB => {
            Cell::from(opp.exchange_b.to_uppercase()).style(theme::neutral())
        }
        ArbitrageSortField::RateA => {
            Cell::from(rate_text(opp.rate_a, opp.funding_interval_a)).style(theme::rate(opp.rate_a))
        }
        ArbitrageSortField::RateB => {
            Cell::from(rate_text(opp.rate_b, opp.funding_interval_b)).style(theme::rate(opp.rate_b))
        }
        ArbitrageSortField::VolumeA => {
            Cell::from(format_volume(Some(opp.volume_a))).style(theme::muted())
        }
        ArbitrageSortField::VolumeB => {
            Cell::from(format_volume(Some(opp.volume_b))).style(theme::muted())
        }
        ArbitrageSortField::Difference8h => {
            Cell::from(format_signed_rate(opp.difference_8h)).style(theme::warning())
        }
        ArbitrageSortField::AnnualizedArbitrage => {
            let tier = ArbitrageTier::of(opp.annualized_arbitrage);
            Cell::from(format_annualized(opp.annualized_arbitrage))
                .style(theme::tier(tier).add_modifier(Modifier::BOLD))
        }
    }
}
