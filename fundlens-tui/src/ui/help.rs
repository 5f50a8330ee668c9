//! Page 7, Help: keyboard shortcuts and color legend.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use fundlens_core::color::{cell_background, Bucket};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global Navigation");
    key(&mut lines, "1-7", "Switch to page by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle pages forward / back");
    key(&mut lines, "Enter / r", "Run the page query with its current filters");
    key(&mut lines, "o", "Open the exchange or pair under the cursor");
    key(&mut lines, "Esc", "Leave an exchange or pair page");
    key(&mut lines, "e", "Open error history overlay");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Tables");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "h / l", "Move column focus left / right");
    key(&mut lines, "s", "Sort by focused column (again to flip)");
    key(&mut lines, "g / G", "Jump to first / last row");
    lines.push(Line::from(""));

    section(&mut lines, "Page 1 - Overview");
    key(&mut lines, "x / y", "Pick exchange / symbol");
    key(&mut lines, "+ / -", "Change row limit");
    key(&mut lines, "c", "Toggle table / trend chart");
    lines.push(Line::from(""));

    section(&mut lines, "Page 3 - Search");
    key(&mut lines, "x / y", "Pick exchange / symbol");
    lines.push(Line::from(""));

    section(&mut lines, "Page 4 - Arbitrage");
    key(&mut lines, "/", "Filter by symbol");
    key(&mut lines, "b", "Toggle hedge / difference ranking");
    key(&mut lines, "t", "Toggle latest / average rates");
    key(&mut lines, "+ / -", "Change result limit");
    lines.push(Line::from(""));

    section(&mut lines, "Rate Colors");
    lines.push(Line::from(vec![
        Span::styled("  top 30% of a period  ", theme::emphasized(cell_background(0, 10, Bucket::Positive))),
        Span::raw("  "),
        Span::styled("  bottom 30% of a period  ", theme::emphasized(cell_background(0, 10, Bucket::Negative))),
    ]));
    key(&mut lines, "", "Positive rates mean longs pay shorts; deeper color means more extreme");

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
