//! End-to-end behavior of the grid runtime through its public API.

use std::sync::Arc;

use listgrid::app::{Key, KeyEvent, Selection};
use listgrid::domain::{CellValue, Column, ListItem};
use listgrid::layout::{allocate_column_widths, LayoutOptions};
use listgrid::search::{parse_search_query, ManualClock, SearchShortcut};
use listgrid::{handle_event, Action, AppState, Event, ListState};

#[derive(Debug, Clone, PartialEq)]
struct Ticket {
    id: u32,
    title: String,
}

impl ListItem for Ticket {
    fn item_id(&self) -> String {
        self.id.to_string()
    }
}

fn tickets(n: u32) -> Vec<Ticket> {
    (0..n)
        .map(|id| Ticket {
            id,
            title: format!("ticket {id}"),
        })
        .collect()
}

fn grid() -> AppState<Ticket> {
    let columns = vec![
        Column::fixed("id", "ID", 6).with_value(|t: &Ticket| Ok(CellValue::from(f64::from(t.id)))),
        Column::flexible("title", "Title").with_value(|t: &Ticket| Ok(CellValue::from(t.title.as_str()))),
    ];
    AppState::new(columns, Vec::new())
}

#[test]
fn fixed_and_flexible_columns_fill_the_budget_exactly() {
    let columns: Vec<Column<Ticket>> = vec![Column::flexible("a", "A"), Column::fixed("b", "B", 10)];
    let options = LayoutOptions {
        terminal_width: 50,
        column_gap: 1,
        reserved_width: 4,
        min_column_width: 8,
        max_column_width: 50,
    };

    let layout = allocate_column_widths(&columns, &options);

    assert_eq!(layout.widths, vec![35, 10]);
    assert_eq!(layout.total_width, 46);
    assert!(layout.fits_in_terminal);
}

#[test]
fn flexible_remainder_goes_to_leading_columns() {
    let columns: Vec<Column<Ticket>> = vec![
        Column::flexible("a", "A"),
        Column::flexible("b", "B"),
        Column::flexible("c", "C"),
    ];
    // 26 - 4 reserved - 2 gaps leaves 20 for the columns.
    let options = LayoutOptions {
        terminal_width: 26,
        ..LayoutOptions::default()
    };

    let layout = allocate_column_widths(&columns, &options);

    assert_eq!(layout.widths, vec![7, 7, 6]);
    assert_eq!(layout.widths.iter().sum::<usize>(), 20);
}

#[test]
fn known_shortcut_becomes_a_filter() {
    let shortcuts = vec![SearchShortcut::new("status", "Status").with_values(["done", "todo"])];

    let parsed = parse_search_query(r#"status:done urgent task "needs review""#, &shortcuts);

    assert_eq!(parsed.filters.get("status"), Some(&["done".to_string()][..]));
    assert_eq!(parsed.text, "urgent task needs review");
}

#[test]
fn unknown_filter_key_stays_free_text() {
    let parsed = parse_search_query("foo:bar", &[]);

    assert!(parsed.filters.is_empty());
    assert_eq!(parsed.text, "foo:bar");
}

#[test]
fn requested_page_past_the_end_is_clamped() {
    let list = ListState::new(10, true).with_total_items(25);
    assert_eq!(list.pagination().total_pages, 3);

    let list = list.with_pagination(5, 10);

    let p = list.pagination();
    assert_eq!(p.page, 2);
    assert!(!p.has_next_page);
    assert!(p.has_previous_page);
}

#[test]
fn single_select_toggles_are_idempotent() {
    let empty = Selection::new(false);

    let once = empty.with_ids(empty.toggled("a"));
    let twice = once.with_ids(once.toggled("a"));
    assert!(twice.is_empty());

    let first = empty.with_ids(empty.toggled("a"));
    let second = first.with_ids(first.toggled("b"));
    assert_eq!(second.to_vec(), vec!["b".to_string()]);
}

#[test]
fn single_select_through_key_presses_keeps_last_item() {
    let mut state = grid().with_multi_select(false);
    handle_event(&mut state, &Event::ItemsLoaded(tickets(5))).unwrap();
    let space = Event::Key(KeyEvent::char(' '));

    handle_event(&mut state, &space).unwrap();
    handle_event(&mut state, &Event::Key(KeyEvent::plain(Key::Down))).unwrap();
    let (_, actions) = handle_event(&mut state, &space).unwrap();

    assert_eq!(actions, vec![Action::SelectionChanged(vec!["1".to_string()])]);
    assert_eq!(state.selected_items().len(), 1);
}

#[test]
fn move_up_at_the_top_of_the_first_page_does_nothing() {
    let mut state = grid();
    handle_event(&mut state, &Event::ItemsLoaded(tickets(25))).unwrap();
    let before = state.list().clone();

    let (_, actions) = handle_event(&mut state, &Event::Key(KeyEvent::plain(Key::Up))).unwrap();

    assert!(actions.is_empty());
    assert_eq!(state.list().highlighted(), 0);
    assert_eq!(state.list().pagination(), before.pagination());
}

#[test]
fn rapid_search_edits_apply_once_with_the_last_value() {
    let clock = Arc::new(ManualClock::default());
    let mut state = grid().with_debounce_ms(300).with_clock(clock.clone());
    handle_event(&mut state, &Event::ItemsLoaded(tickets(12))).unwrap();
    handle_event(&mut state, &Event::EnterSearch).unwrap();

    let mut actions = Vec::new();
    for c in "ticket 1".chars() {
        let (_, edit) = handle_event(&mut state, &Event::SearchInput(c)).unwrap();
        actions.extend(edit);
        clock.advance(40);
        let (_, tick) = handle_event(&mut state, &Event::Tick).unwrap();
        actions.extend(tick);
    }
    clock.advance(300);
    let (render, fired) = handle_event(&mut state, &Event::Tick).unwrap();
    actions.extend(fired);

    let searches: Vec<_> = actions
        .iter()
        .filter_map(|a| match a {
            Action::SearchChanged(parsed) => Some(parsed.text.clone()),
            _ => None,
        })
        .collect();
    assert!(render);
    assert_eq!(searches, vec!["ticket 1".to_string()]);
    assert_eq!(state.list().query(), "ticket 1");
}
