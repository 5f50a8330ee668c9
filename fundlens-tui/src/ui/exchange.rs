//! Page 5, Exchange detail: top pairs listed on a single exchange.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, Slot};
use crate::theme;
use crate::ui::{filter_line, render_message, table};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(exchange) = &app.exchange.exchange else {
        render_message(
            f,
            area,
            vec![
                Line::from(Span::styled("No exchange selected.", theme::muted())),
                Line::from(Span::styled(
                    "Press x to pick one, or o on an Exchange cell in Top 10.",
                    theme::muted(),
                )),
            ],
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let filters = filter_line(
        &[
            ("Exchange", exchange.to_uppercase()),
            ("Top", app.exchange.top_n.to_string()),
        ],
        "[x]switch [o]open pair [Esc]back",
    );
    f.render_widget(Paragraph::new(filters), chunks[0]);

    let view = &app.exchange.view;
    if app.is_loading(Slot::ExchangeRows) {
        render_message(f, chunks[1], vec![Line::from(Span::styled("Loading...", theme::warning()))]);
    } else if view.table.is_empty() {
        render_message(
            f,
            chunks[1],
            vec![Line::from(Span::styled(
                format!("No data for {}.", exchange.to_uppercase()),
                theme::muted(),
            ))],
        );
    } else {
        table::render_ranked(f, chunks[1], view);
    }
}
