//! Keyboard input dispatch: overlays → global keys → page-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use fundlens_core::sort::ArbitrageSortField;

use crate::app::{AppState, OverviewTab, Overlay, Page, PickerTarget, RankedView};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Picker => {
            handle_picker_overlay(app, key);
            return;
        }
        Overlay::SymbolInput => {
            handle_symbol_input(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='7') => {
            let index = c as usize - '1' as usize;
            if let Some(page) = Page::from_index(index) {
                app.switch_page(page);
            }
            return;
        }
        KeyCode::Tab => {
            app.switch_page(app.active_page.next());
            return;
        }
        KeyCode::BackTab => {
            app.switch_page(app.active_page.prev());
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        KeyCode::Char('r') | KeyCode::Enter => {
            app.refresh();
            return;
        }
        KeyCode::Char('o') => {
            app.open_focused();
            return;
        }
        KeyCode::Esc | KeyCode::Backspace if app.active_page.is_detail() => {
            app.go_back();
            return;
        }
        _ => {}
    }

    // 3. Page-specific keys.
    match app.active_page {
        Page::Overview => handle_overview_key(app, key),
        Page::Top10 => handle_table_key(&mut app.top10, key),
        Page::Search => handle_search_key(app, key),
        Page::Arbitrage => handle_arbitrage_key(app, key),
        Page::Exchange => {
            if key.code == KeyCode::Char('x') {
                app.open_picker(PickerTarget::DetailExchange);
            } else {
                handle_table_key(&mut app.exchange.view, key);
            }
        }
        Page::Pair => handle_table_key(&mut app.pair.view, key),
        Page::Help => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_picker_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_picker(),
        KeyCode::Enter => app.confirm_picker(),
        KeyCode::Down => {
            if let Some(picker) = app.picker.as_mut() {
                if picker.cursor + 1 < picker.visible().len() {
                    picker.cursor += 1;
                }
            }
        }
        KeyCode::Up => {
            if let Some(picker) = app.picker.as_mut() {
                picker.cursor = picker.cursor.saturating_sub(1);
            }
        }
        KeyCode::Backspace => {
            if let Some(picker) = app.picker.as_mut() {
                picker.query.pop();
                picker.cursor = 0;
            }
        }
        KeyCode::Char(c) => {
            if let Some(picker) = app.picker.as_mut() {
                picker.query.push(c);
                picker.cursor = 0;
            }
        }
        _ => {}
    }
}

fn handle_symbol_input(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.text_input.clear();
        }
        KeyCode::Enter => {
            let symbol = app.text_input.trim().to_uppercase();
            app.set_arbitrage_symbol(&symbol);
            app.text_input.clear();
            app.overlay = Overlay::None;
            app.fetch_arbitrage();
        }
        KeyCode::Backspace => {
            app.text_input.pop();
        }
        KeyCode::Char(c) => {
            app.text_input.push(c);
        }
        _ => {}
    }
}

/// Cursor movement and column sorting shared by ranked tables.
fn handle_table_key(view: &mut RankedView, key: KeyEvent) {
    let rows = view.table.len();
    let columns = view.columns().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => view.cursor.down(rows),
        KeyCode::Char('k') | KeyCode::Up => view.cursor.up(),
        KeyCode::Char('h') | KeyCode::Left => view.cursor.left(),
        KeyCode::Char('l') | KeyCode::Right => view.cursor.right(columns),
        KeyCode::Char('g') | KeyCode::Home => view.cursor.row = 0,
        KeyCode::Char('G') | KeyCode::End => view.cursor.row = rows.saturating_sub(1),
        KeyCode::Char('s') => view.sort_focused(),
        _ => {}
    }
}

fn handle_overview_key(app: &mut AppState, key: KeyEvent) {
    let len = app.overview.records.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.overview.cursor + 1 < len {
                app.overview.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.overview.cursor = app.overview.cursor.saturating_sub(1);
        }
        KeyCode::Char('x') => app.open_picker(PickerTarget::OverviewExchange),
        KeyCode::Char('y') => app.open_picker(PickerTarget::OverviewSymbol),
        KeyCode::Char('+') | KeyCode::Char('=') => app.cycle_overview_limit(true),
        KeyCode::Char('-') => app.cycle_overview_limit(false),
        KeyCode::Char('c') => {
            app.overview.tab = match app.overview.tab {
                OverviewTab::Table => OverviewTab::Chart,
                OverviewTab::Chart => OverviewTab::Table,
            };
        }
        _ => {}
    }
}

fn handle_search_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('x') => app.open_picker(PickerTarget::SearchExchange),
        KeyCode::Char('y') => app.open_picker(PickerTarget::SearchSymbol),
        _ => handle_table_key(&mut app.search.view, key),
    }
}

fn handle_arbitrage_key(app: &mut AppState, key: KeyEvent) {
    let rows = app.arbitrage.table.len();
    let columns = ArbitrageSortField::ALL.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.arbitrage.cursor.down(rows),
        KeyCode::Char('k') | KeyCode::Up => app.arbitrage.cursor.up(),
        KeyCode::Char('h') | KeyCode::Left => app.arbitrage.cursor.left(),
        KeyCode::Char('l') | KeyCode::Right => app.arbitrage.cursor.right(columns),
        KeyCode::Char('s') => {
            let field = app.arbitrage.focused_field();
            app.arbitrage.table.toggle_sort(field);
        }
        KeyCode::Char('/') => {
            app.text_input = app.arbitrage.query.symbol.clone().unwrap_or_default();
            app.overlay = Overlay::SymbolInput;
        }
        KeyCode::Char('b') => app.cycle_hedge_sort(),
        KeyCode::Char('t') => app.cycle_time_range(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.cycle_arbitrage_limit(true),
        KeyCode::Char('-') => app.cycle_arbitrage_limit(false),
        _ => {}
    }
}
