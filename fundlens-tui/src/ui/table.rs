//! Ranked multi-period table widget shared by the Top 10, Search, Exchange
//! and Pair pages.
//!
//! Each period cell shows the total rate with its APR underneath. Cells in the
//! top or bottom band of their period get the rank emphasis background. The
//! focused cell's tooltip is echoed on a detail line below the table.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Cell, Paragraph, Row as TableRow, Table, TableState};

use fundlens_core::cell::{period_cell, CellView};
use fundlens_core::domain::Row;
use fundlens_core::format::format_volume;
use fundlens_core::sort::{RowSortField, SortState};

use crate::app::RankedView;
use crate::theme;

pub fn render_ranked(f: &mut Frame, area: Rect, view: &RankedView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let columns = view.columns();
    let sort = view.table.sort();
    let ranks = view.table.ranks();
    let identity = view.table.identity();

    let header = TableRow::new(
        columns
            .iter()
            .enumerate()
            .map(|(i, col)| header_cell(*col, sort, i == view.cursor.column)),
    );

    let rows = view.table.rows().iter().enumerate().map(|(r, row)| {
        let cells = columns.iter().enumerate().map(|(c, col)| {
            let focused = r == view.cursor.row && c == view.cursor.column;
            let cell = match col {
                RowSortField::Exchange => text_cell(
                    row.exchange.as_deref().unwrap_or("-").to_uppercase(),
                    theme::neutral(),
                ),
                RowSortField::Symbol => text_cell(row.symbol.clone(), theme::accent_bold()),
                RowSortField::Volume => text_cell(format_volume(row.volume), theme::muted()),
                RowSortField::Period(p) => rate_cell(&period_cell(row, *p, ranks, identity)),
            };
            if focused {
                cell.style(Style::default().add_modifier(Modifier::UNDERLINED | Modifier::BOLD))
            } else {
                cell
            }
        });
        TableRow::new(cells).height(2)
    });

    let widths = columns.iter().map(|col| match col {
        RowSortField::Exchange => Constraint::Length(10),
        RowSortField::Symbol => Constraint::Length(14),
        RowSortField::Volume => Constraint::Length(10),
        RowSortField::Period(_) => Constraint::Length(13),
    });

    let table = Table::new(rows, widths)
        .header(header.bottom_margin(1))
        .column_spacing(1)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default().with_selected(Some(view.cursor.row));
    f.render_stateful_widget(table, chunks[0], &mut state);

    f.render_widget(Paragraph::new(detail_line(view)), chunks[1]);
}

fn header_cell(field: RowSortField, sort: SortState<RowSortField>, focused: bool) -> Cell<'static> {
    let sorted = sort.field == field;
    let label = if sorted {
        format!("{} {}", field.label(), sort.order.arrow())
    } else {
        field.label().to_string()
    };
    let mut style = theme::header(sorted);
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Cell::from(label).style(style)
}

fn text_cell(text: String, style: Style) -> Cell<'static> {
    Cell::from(text).style(style)
}

/// A period cell: rate line plus optional APR line.
pub fn rate_cell(view: &CellView) -> Cell<'static> {
    if view.is_placeholder() {
        return Cell::from(view.text.clone()).style(theme::muted());
    }
    let mut lines = vec![Line::from(view.text.clone())];
    if let Some(apr) = &view.apr_text {
        lines.push(Line::from(Span::styled(apr.clone(), theme::muted())));
    }
    let style = match view.background {
        Some(bg) => theme::emphasized(bg),
        None => Style::default(),
    };
    Cell::from(Text::from(lines)).style(style)
}

/// Key, period, and tooltip of the focused cell.
fn detail_line(view: &RankedView) -> Line<'static> {
    let Some(row) = view.focused_row() else {
        return Line::from("");
    };
    let mut spans = vec![Span::styled(row_label(row), theme::accent_bold())];
    match view.focused_cell() {
        Some((period, cell)) => {
            spans.push(Span::styled(format!("  {}: ", period.label()), theme::muted()));
            spans.push(Span::styled(cell.text.clone(), theme::accent()));
            if let Some(apr) = &cell.apr_text {
                spans.push(Span::styled(format!("  {apr}"), theme::muted()));
            }
            if let Some(info) = view.table.ranks().get(&row.key(view.table.identity()), period) {
                spans.push(Span::styled(
                    format!("  rank {}/{}", info.rank + 1, info.total),
                    theme::neutral(),
                ));
            }
            for line in &cell.tooltip {
                spans.push(Span::styled(format!("  {line}"), theme::muted()));
            }
        }
        None => spans.push(Span::styled(
            "  h/l move between columns, s sorts, o opens".to_string(),
            theme::muted(),
        )),
    }
    Line::from(spans)
}

fn row_label(row: &Row) -> String {
    match &row.exchange {
        Some(ex) => format!("{} {}", ex.to_uppercase(), row.symbol),
        None => row.symbol.clone(),
    }
}
