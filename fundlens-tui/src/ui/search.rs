//! Page 3, Search: top pairs on one exchange, optionally one symbol.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, Slot};
use crate::theme;
use crate::ui::{filter_line, render_message, table};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let search = &app.search;
    let exchange = search
        .exchange
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "(none)".into());
    let filters = filter_line(
        &[
            ("Exchange", exchange),
            ("Symbol", search.symbol.clone()),
            ("Top", search.top_n.to_string()),
        ],
        "[x]exchange [y]symbol [Enter]search [o]open pair",
    );
    f.render_widget(Paragraph::new(filters), chunks[0]);

    let body = chunks[1];
    if app.is_loading(Slot::SearchRows) {
        render_message(f, body, vec![Line::from(Span::styled("Searching...", theme::warning()))]);
    } else if !search.queried {
        render_message(
            f,
            body,
            vec![Line::from(Span::styled(
                "Pick an exchange and symbol, then press Enter to search.",
                theme::muted(),
            ))],
        );
    } else if search.view.table.is_empty() {
        render_message(
            f,
            body,
            vec![Line::from(Span::styled(
                "No data. Try adjusting the filters.",
                theme::muted(),
            ))],
        );
    } else {
        table::render_ranked(f, body, &search.view);
    }
}
