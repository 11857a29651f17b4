//! Event handling and state transition logic.
//!
//! [`handle_event`] is the only entry point that mutates an
//! [`AppState`]. It processes one [`Event`] to completion and reports whether
//! the grid needs a re-render along with the [`Action`]s the host should run.
//!
//! # Event Types
//!
//! - **Navigation**: `Key`, routed through the navigation controller
//! - **Search input**: `EnterSearch`, `SearchInput`, `SearchBackspace`,
//!   `SubmitSearch`, `ExitSearch`
//! - **Timers**: `Tick`, delivered after an `Action::ScheduleTimer`
//! - **List control**: `SortBy`, `ClearSort`, `SetPageSize`, `ItemsLoaded`
//! - **Host**: `Resize`, `Focus`, `Teardown`
//!
//! # Example
//!
//! ```rust
//! use listgrid::app::{handle_event, AppState, Event, Key, KeyEvent};
//! use listgrid::domain::{CellValue, Column, ListItem};
//!
//! #[derive(Debug, Clone)]
//! struct Row(u32);
//!
//! impl ListItem for Row {
//!     fn item_id(&self) -> String {
//!         self.0.to_string()
//!     }
//! }
//!
//! let columns = vec![Column::flexible("n", "N").with_value(|r: &Row| Ok(CellValue::from(f64::from(r.0))))];
//! let mut state = AppState::new(columns, vec![]);
//!
//! handle_event(&mut state, &Event::ItemsLoaded(vec![Row(1), Row(2)]))?;
//! let (render, _) = handle_event(&mut state, &Event::Key(KeyEvent::plain(Key::Down)))?;
//! assert!(render);
//! assert_eq!(state.list().highlighted(), 1);
//! # Ok::<(), listgrid::GridError>(())
//! ```

use super::keymap::KeyEvent;
use super::modes::InputMode;
use super::navigation::{NavContext, NavIntent};
use super::state::Pagination;
use super::{Action, AppState};
use crate::domain::{ListItem, Result, SortState};
use crate::search::{parse_search_query, validate_search_query};

/// Inputs to the grid, translated from host events by the plugin shim.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    /// A key press outside of search typing.
    Key(KeyEvent),
    /// A character typed into the search input.
    SearchInput(char),
    /// Deletes the last character of the search input.
    SearchBackspace,
    /// Starts search typing with the applied query as the initial input.
    EnterSearch,
    /// Leaves search typing and clears the query.
    ExitSearch,
    /// Applies the search input immediately and leaves search typing.
    SubmitSearch,
    /// Timer callback; fires a due search edit.
    Tick,
    /// The terminal width changed.
    Resize { cols: usize },
    /// Cycles the sort on a column: ascending, descending, unsorted.
    SortBy(String),
    ClearSort,
    SetPageSize(usize),
    /// Replaces the item set.
    ItemsLoaded(Vec<T>),
    /// The grid gained or lost keyboard focus.
    Focus(bool),
    /// The grid is going away; pending timers must not fire.
    Teardown,
}

/// Processes an event, mutates state, and returns `(re-render, actions)`.
///
/// # Errors
///
/// Currently infallible. The `Result` leaves room for host-facing failures
/// without changing the signature.
#[allow(clippy::too_many_lines, clippy::unnecessary_wraps)]
pub fn handle_event<T>(state: &mut AppState<T>, event: &Event<T>) -> Result<(bool, Vec<Action<T>>)>
where
    T: ListItem + Clone,
{
    let _span = tracing::debug_span!("handle_event", event_type = event_name(event)).entered();

    match event {
        Event::Key(key) => {
            if state.input_mode.is_search() {
                tracing::debug!("key ignored while typing a search");
                return Ok((false, vec![]));
            }
            let page_ids = state.page_ids();
            let all_ids = state.filtered_ids();
            let intent = {
                let ctx = NavContext {
                    highlighted: state.list.highlighted(),
                    page_ids: &page_ids,
                    all_ids: &all_ids,
                    pagination: state.list.pagination(),
                    selection: state.list.selection(),
                };
                state.controller.dispatch(key, &ctx)
            };
            Ok(intent.map_or((false, vec![]), |intent| apply_intent(state, intent)))
        }

        Event::SearchInput(c) => {
            if !state.input_mode.is_search() {
                return Ok((false, vec![]));
            }
            state.search_input.push(*c);
            Ok((true, schedule_search(state)))
        }

        Event::SearchBackspace => {
            if !state.input_mode.is_search() || state.search_input.pop().is_none() {
                return Ok((false, vec![]));
            }
            Ok((true, schedule_search(state)))
        }

        Event::EnterSearch => {
            if state.input_mode.is_search() {
                return Ok((false, vec![]));
            }
            state.input_mode = InputMode::Search;
            state.search_input = state.list.query().to_string();
            state.controller.set_enabled(false);
            state.refresh_footer();
            Ok((true, vec![]))
        }

        Event::ExitSearch => {
            if !state.input_mode.is_search() {
                return Ok((false, vec![]));
            }
            state.debouncer.cancel();
            state.input_mode = InputMode::Normal;
            state.search_input.clear();
            state.controller.set_enabled(true);

            let actions = if state.list.query().is_empty() {
                vec![]
            } else {
                apply_search(state, String::new())
            };
            state.refresh_footer();
            Ok((true, actions))
        }

        Event::SubmitSearch => {
            if !state.input_mode.is_search() {
                return Ok((false, vec![]));
            }
            state.debouncer.cancel();
            state.input_mode = InputMode::Normal;
            state.controller.set_enabled(true);
            let query = std::mem::take(&mut state.search_input);
            let actions = apply_search(state, query);
            state.refresh_footer();
            Ok((true, actions))
        }

        Event::Tick => {
            let now = state.clock.now_ms();
            if let Some(query) = state.debouncer.poll(now) {
                tracing::debug!(query = %query, "debounced search fired");
                let actions = apply_search(state, query);
                state.refresh_footer();
                return Ok((true, actions));
            }
            let actions = state
                .debouncer
                .time_until_due(now)
                .map(|delay_ms| Action::ScheduleTimer { delay_ms })
                .into_iter()
                .collect();
            Ok((false, actions))
        }

        Event::Resize { cols } => Ok((state.resize(*cols), vec![])),

        Event::SortBy(key) => {
            let sortable = state.columns.iter().any(|c| &c.key == key && c.sortable);
            if !sortable {
                tracing::debug!(column = %key, "sort requested on unknown or unsortable column");
                return Ok((false, vec![]));
            }
            let next = SortState::cycle(state.list.sort(), key);
            Ok((true, apply_sort(state, next)))
        }

        Event::ClearSort => {
            if state.list.sort().is_none() {
                return Ok((false, vec![]));
            }
            Ok((true, apply_sort(state, None)))
        }

        Event::SetPageSize(size) => {
            let current = *state.list.pagination();
            let size = (*size).max(1);
            if size == current.page_size {
                return Ok((false, vec![]));
            }
            let first_visible = current.page_range().start;
            state.list = state.list.with_pagination(first_visible / size, size);
            Ok((true, pagination_changed(&current, state)))
        }

        Event::ItemsLoaded(items) => {
            let before = *state.list.pagination();
            state.items.clone_from(items);
            state.refilter();
            tracing::debug!(
                total = state.items.len(),
                visible = state.filtered.len(),
                "items loaded"
            );

            let mut actions = pagination_changed(&before, state);
            let present: Vec<String> = state
                .list
                .selection()
                .ids()
                .iter()
                .filter(|id| state.items.iter().any(|item| &item.item_id() == *id))
                .cloned()
                .collect();
            if present.len() != state.list.selection().len() {
                state.list = state.list.with_selection(present.clone());
                actions.push(Action::SelectionChanged(present));
            }
            Ok((true, actions))
        }

        Event::Focus(focused) => {
            let was_active = state.controller.is_active();
            state.controller.set_focused(*focused);
            Ok((was_active != state.controller.is_active(), vec![]))
        }

        Event::Teardown => {
            if state.debouncer.cancel() {
                tracing::debug!("pending search dropped on teardown");
            }
            state.controller.set_focused(false);
            Ok((false, vec![]))
        }
    }
}

const fn event_name<T>(event: &Event<T>) -> &'static str {
    match event {
        Event::Key(_) => "key",
        Event::SearchInput(_) => "search_input",
        Event::SearchBackspace => "search_backspace",
        Event::EnterSearch => "enter_search",
        Event::ExitSearch => "exit_search",
        Event::SubmitSearch => "submit_search",
        Event::Tick => "tick",
        Event::Resize { .. } => "resize",
        Event::SortBy(_) => "sort_by",
        Event::ClearSort => "clear_sort",
        Event::SetPageSize(_) => "set_page_size",
        Event::ItemsLoaded(_) => "items_loaded",
        Event::Focus(_) => "focus",
        Event::Teardown => "teardown",
    }
}

fn schedule_search<T: ListItem>(state: &mut AppState<T>) -> Vec<Action<T>> {
    let now = state.clock.now_ms();
    let generation = state.debouncer.schedule(state.search_input.clone(), now);
    tracing::debug!(generation, input = %state.search_input, "search edit scheduled");
    state.refresh_footer();
    vec![Action::ScheduleTimer {
        delay_ms: state.debouncer.delay_ms(),
    }]
}

/// Parses and applies `query`, then re-filters.
fn apply_search<T: ListItem>(state: &mut AppState<T>, query: String) -> Vec<Action<T>> {
    let before = *state.list.pagination();
    let parsed = parse_search_query(&query, &state.shortcuts);
    let validation = validate_search_query(&query, &state.shortcuts);
    if !validation.valid {
        tracing::debug!(errors = ?validation.errors, "search query has invalid values");
    }
    state.validation = Some(validation);
    state.list = state.list.with_search(query, parsed.clone());
    state.refilter();

    let mut actions = vec![Action::SearchChanged(parsed)];
    actions.extend(pagination_changed(&before, state));
    actions
}

fn apply_sort<T: ListItem>(state: &mut AppState<T>, sort: Option<SortState>) -> Vec<Action<T>> {
    let before = *state.list.pagination();
    state.list = state.list.with_sort(sort.clone());
    state.refilter();

    let mut actions = vec![Action::SortChanged(sort)];
    actions.extend(pagination_changed(&before, state));
    actions
}

fn pagination_changed<T>(before: &Pagination, state: &AppState<T>) -> Vec<Action<T>> {
    let after = *state.list.pagination();
    if &after == before {
        vec![]
    } else {
        vec![Action::PaginationChanged(after)]
    }
}

fn apply_intent<T: ListItem + Clone>(state: &mut AppState<T>, intent: NavIntent) -> (bool, Vec<Action<T>>) {
    match intent {
        NavIntent::Highlight(index) => {
            state.list = state.list.with_highlight(index);
            (true, vec![])
        }
        NavIntent::GoToPage { page, highlight } => {
            let before = *state.list.pagination();
            state.list = state
                .list
                .with_pagination(page, before.page_size)
                .with_highlight(highlight);
            (true, pagination_changed(&before, state))
        }
        NavIntent::SetSelection(ids) => {
            state.list = state.list.with_selection(ids);
            (true, vec![Action::SelectionChanged(state.list.selection().to_vec())])
        }
        NavIntent::Activate { id, index } => {
            let item = state
                .filtered
                .get(index)
                .map(|&i| &state.items[i])
                .filter(|item| item.item_id() == id)
                .cloned();
            match item {
                Some(item) => (false, vec![Action::ItemAction { item, index }]),
                None => {
                    tracing::warn!(id = %id, index, "activated item not found");
                    (false, vec![])
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::keymap::Key;
    use crate::domain::{CellValue, Column};
    use crate::search::{ManualClock, SearchShortcut};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Session {
        name: &'static str,
        current: bool,
    }

    impl ListItem for Session {
        fn item_id(&self) -> String {
            self.name.to_string()
        }
    }

    fn sessions() -> Vec<Session> {
        ["alpha", "bravo", "charlie", "delta", "echo"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| Session { name, current: i == 0 })
            .collect()
    }

    fn setup() -> (AppState<Session>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let columns = vec![
            Column::flexible("name", "Name")
                .sortable()
                .with_value(|s: &Session| Ok(CellValue::from(s.name))),
            Column::fixed("current", "Current", 8)
                .with_value(|s: &Session| Ok(CellValue::from(if s.current { "yes" } else { "no" }))),
        ];
        let shortcuts = vec![SearchShortcut::new("current", "Current").with_values(["yes", "no"])];
        let mut state = AppState::new(columns, shortcuts)
            .with_page_size(2)
            .with_clock(clock.clone());
        handle_event(&mut state, &Event::ItemsLoaded(sessions())).unwrap();
        (state, clock)
    }

    fn key(state: &mut AppState<Session>, key: Key) -> (bool, Vec<Action<Session>>) {
        handle_event(state, &Event::Key(KeyEvent::plain(key))).unwrap()
    }

    fn type_text(state: &mut AppState<Session>, text: &str) {
        for c in text.chars() {
            handle_event(state, &Event::SearchInput(c)).unwrap();
        }
    }

    #[test]
    fn move_down_crosses_pages() {
        let (mut state, _) = setup();
        key(&mut state, Key::Down);
        let (render, actions) = key(&mut state, Key::Down);

        assert!(render);
        assert_eq!(state.list.pagination().page, 1);
        assert_eq!(state.list.highlighted(), 0);
        assert!(matches!(actions.as_slice(), [Action::PaginationChanged(p)] if p.page == 1));
    }

    #[test]
    fn move_up_at_top_does_nothing() {
        let (mut state, _) = setup();
        let (render, actions) = key(&mut state, Key::Up);
        assert!(!render);
        assert!(actions.is_empty());
        assert_eq!(state.list.highlighted(), 0);
    }

    #[test]
    fn enter_triggers_item_action_with_absolute_index() {
        let (mut state, _) = setup();
        key(&mut state, Key::PageDown);
        key(&mut state, Key::Down);
        let (_, actions) = key(&mut state, Key::Enter);

        assert_eq!(
            actions,
            vec![Action::ItemAction {
                item: Session { name: "delta", current: false },
                index: 3,
            }]
        );
    }

    #[test]
    fn selection_toggles_and_clears() {
        let (mut state, _) = setup();
        let (_, actions) = handle_event(&mut state, &Event::Key(KeyEvent::char(' '))).unwrap();
        assert_eq!(actions, vec![Action::SelectionChanged(vec!["alpha".to_string()])]);

        let (_, actions) = handle_event(&mut state, &Event::Key(KeyEvent::ctrl(Key::Char('a')))).unwrap();
        assert!(matches!(&actions[0], Action::SelectionChanged(ids) if ids.len() == 5));

        let (_, actions) = key(&mut state, Key::Esc);
        assert_eq!(actions, vec![Action::SelectionChanged(vec![])]);
    }

    #[test]
    fn typed_search_is_debounced() {
        let (mut state, clock) = setup();
        handle_event(&mut state, &Event::EnterSearch).unwrap();
        assert!(state.input_mode().is_search());

        type_text(&mut state, "current:no");
        clock.advance(100);
        let (render, actions) = handle_event(&mut state, &Event::Tick).unwrap();
        assert!(!render);
        assert_eq!(actions, vec![Action::ScheduleTimer { delay_ms: 200 }]);

        clock.advance(200);
        let (render, actions) = handle_event(&mut state, &Event::Tick).unwrap();
        assert!(render);
        let Action::SearchChanged(parsed) = &actions[0] else {
            panic!("expected a search notification, got {actions:?}");
        };
        assert_eq!(parsed.filters.get("current"), Some(&["no".to_string()][..]));
        assert_eq!(state.visible_items().count(), 4);
        assert!(state.input_mode().is_search(), "debounce does not leave search mode");
    }

    #[test]
    fn keys_are_ignored_while_typing() {
        let (mut state, _) = setup();
        handle_event(&mut state, &Event::EnterSearch).unwrap();
        let (render, _) = key(&mut state, Key::Down);
        assert!(!render);
        assert_eq!(state.list.highlighted(), 0);
    }

    #[test]
    fn submit_applies_immediately_and_exit_clears() {
        let (mut state, clock) = setup();
        handle_event(&mut state, &Event::EnterSearch).unwrap();
        type_text(&mut state, "char");
        let (_, actions) = handle_event(&mut state, &Event::SubmitSearch).unwrap();

        assert!(matches!(&actions[0], Action::SearchChanged(p) if p.text == "char"));
        assert_eq!(state.list.query(), "char");
        assert_eq!(state.visible_items().count(), 1);
        assert_eq!(state.input_mode(), InputMode::Normal);

        clock.advance(1_000);
        let (_, actions) = handle_event(&mut state, &Event::Tick).unwrap();
        assert!(actions.is_empty(), "submitted search must not fire again");

        handle_event(&mut state, &Event::EnterSearch).unwrap();
        let (_, actions) = handle_event(&mut state, &Event::ExitSearch).unwrap();
        assert!(matches!(&actions[0], Action::SearchChanged(p) if p.is_empty()));
        assert_eq!(state.visible_items().count(), 5);
    }

    #[test]
    fn invalid_filter_value_shows_in_footer() {
        let (mut state, _) = setup();
        handle_event(&mut state, &Event::EnterSearch).unwrap();
        type_text(&mut state, "current:maybe");
        handle_event(&mut state, &Event::SubmitSearch).unwrap();

        assert_eq!(
            state.footer().help(),
            "Invalid value \"maybe\" for Current. Expected one of: yes, no"
        );
        assert_eq!(state.visible_items().count(), 0);
    }

    #[test]
    fn search_footer_shows_suggestions() {
        let (mut state, _) = setup();
        handle_event(&mut state, &Event::EnterSearch).unwrap();
        type_text(&mut state, "cu");
        assert!(state.footer().help().starts_with("current:"));
    }

    #[test]
    fn teardown_cancels_pending_search() {
        let (mut state, clock) = setup();
        handle_event(&mut state, &Event::EnterSearch).unwrap();
        type_text(&mut state, "alpha");
        handle_event(&mut state, &Event::Teardown).unwrap();

        clock.advance(5_000);
        let (render, actions) = handle_event(&mut state, &Event::Tick).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
        assert_eq!(state.list.query(), "");
    }

    #[test]
    fn sort_cycles_and_ignores_unsortable_columns() {
        let (mut state, _) = setup();
        let (_, actions) = handle_event(&mut state, &Event::SortBy("name".into())).unwrap();
        assert_eq!(actions, vec![Action::SortChanged(Some(SortState::ascending("name")))]);

        handle_event(&mut state, &Event::SortBy("name".into())).unwrap();
        let first = state.visible_items().next().map(|s| s.name);
        assert_eq!(first, Some("echo"));

        let (render, actions) = handle_event(&mut state, &Event::SortBy("current".into())).unwrap();
        assert!(!render && actions.is_empty());

        let (_, actions) = handle_event(&mut state, &Event::ClearSort).unwrap();
        assert_eq!(actions, vec![Action::SortChanged(None)]);
        let (render, _) = handle_event(&mut state, &Event::ClearSort).unwrap();
        assert!(!render);
    }

    #[test]
    fn page_size_change_keeps_first_row_visible() {
        let (mut state, _) = setup();
        key(&mut state, Key::End);
        key(&mut state, Key::PageDown);
        key(&mut state, Key::PageDown);
        assert_eq!(state.list.pagination().page, 2);

        let (_, actions) = handle_event(&mut state, &Event::SetPageSize(3)).unwrap();
        assert_eq!(state.list.pagination().page, 1);
        assert!(matches!(actions.as_slice(), [Action::PaginationChanged(p)] if p.page_size == 3));
    }

    #[test]
    fn unbounded_page_size_shows_everything_on_one_page() {
        let (mut state, _) = setup();
        key(&mut state, Key::PageDown);
        key(&mut state, Key::PageDown);

        let (render, actions) = handle_event(&mut state, &Event::SetPageSize(usize::MAX)).unwrap();

        assert!(render);
        let p = *state.list.pagination();
        assert_eq!((p.page, p.total_pages, p.total_items), (0, 1, 5));
        assert!(!p.has_next_page && !p.has_previous_page);
        assert_eq!(state.page_items().count(), 5);
        assert_eq!(actions, vec![Action::PaginationChanged(p)]);
    }

    #[test]
    fn reload_drops_vanished_selection() {
        let (mut state, _) = setup();
        handle_event(&mut state, &Event::Key(KeyEvent::ctrl(Key::Char('a')))).unwrap();

        let remaining: Vec<Session> = sessions().into_iter().take(2).collect();
        let (_, actions) = handle_event(&mut state, &Event::ItemsLoaded(remaining)).unwrap();

        assert!(actions.contains(&Action::SelectionChanged(vec![
            "alpha".to_string(),
            "bravo".to_string()
        ])));
        assert_eq!(state.list.pagination().total_items, 2);
    }

    #[test]
    fn unfocused_grid_ignores_keys() {
        let (mut state, _) = setup();
        let (render, _) = handle_event(&mut state, &Event::Focus(false)).unwrap();
        assert!(render);
        let (render, _) = key(&mut state, Key::Down);
        assert!(!render);
        handle_event(&mut state, &Event::Focus(true)).unwrap();
        assert!(key(&mut state, Key::Down).0);
    }

    #[test]
    fn resize_only_renders_on_change() {
        let (mut state, _) = setup();
        assert!(handle_event(&mut state, &Event::Resize { cols: 100 }).unwrap().0);
        assert!(!handle_event(&mut state, &Event::Resize { cols: 100 }).unwrap().0);
    }
}
