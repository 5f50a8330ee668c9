//! Page 2, Top 10: highest-volume pairs across all exchanges.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, Slot};
use crate::theme;
use crate::ui::{render_message, table};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let header = Line::from(vec![
        Span::styled(
            format!("Top {} by 24h volume across exchanges  ", app.limits.top10_size),
            theme::accent_bold(),
        ),
        Span::styled(
            "o on Exchange opens the exchange, elsewhere opens the pair",
            theme::neutral(),
        ),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    if app.is_loading(Slot::Top10) && app.top10.table.is_empty() {
        render_message(f, chunks[1], vec![Line::from(Span::styled("Loading...", theme::warning()))]);
    } else if app.top10.table.is_empty() {
        render_message(
            f,
            chunks[1],
            vec![Line::from(Span::styled("No data. Press r to retry.", theme::muted()))],
        );
    } else {
        table::render_ranked(f, chunks[1], &app.top10);
    }
}
