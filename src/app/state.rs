//! List state snapshots and the central application state.
//!
//! [`ListState`] is the derived view state of one grid: the applied search,
//! the sort, pagination, selection, and the highlighted row. It is immutable;
//! every transition returns a new snapshot and enforces the pagination
//! invariant `page <= max(0, total_pages - 1)`.
//!
//! [`AppState`] owns the items, the column descriptors, the current
//! `ListState`, and the collaborators that feed it (navigation controller,
//! search debouncer, clock, column layout, footer context). It is mutated only
//! by [`handle_event`](super::handle_event).
//!
//! # Example
//!
//! ```rust
//! use listgrid::app::state::ListState;
//!
//! let state = ListState::new(10, true).with_total_items(25);
//! assert_eq!(state.pagination().total_pages, 3);
//!
//! let moved = state.with_pagination(5, 10);
//! assert_eq!(moved.pagination().page, 2);
//! assert!(!moved.pagination().has_next_page);
//! assert!(moved.pagination().has_previous_page);
//! ```

use super::context::FooterContext;
use super::keymap::KeyBindings;
use super::modes::InputMode;
use super::navigation::NavigationController;
use super::view::{fit_cell, GridRow, GridView, HeaderCell};
use crate::domain::{Column, ListItem, SortState};
use crate::layout::{allocate_column_widths, ColumnLayout, LayoutOptions};
use crate::search::{
    filter_items, search_suggestions, sort_indices, Clock, Debouncer, MonotonicClock,
    ParsedSearch, SearchShortcut, SearchValidation,
};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page position derived from a page request and an item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Zero-based current page.
    pub page: usize,
    /// Rows per page, at least 1.
    pub page_size: usize,
    pub total_items: usize,
    /// `ceil(total_items / page_size)`; zero for an empty list.
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, 0)
    }
}

impl Pagination {
    /// Derives every field from a requested page, clamping it into range.
    #[must_use]
    pub fn new(requested_page: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items / page_size + usize::from(total_items % page_size != 0);
        let page = requested_page.min(total_pages.saturating_sub(1));
        Self {
            page,
            page_size,
            total_items,
            total_pages,
            has_next_page: page + 1 < total_pages,
            has_previous_page: page > 0,
        }
    }

    /// Positions of the current page's rows in the filtered set.
    #[must_use]
    pub fn page_range(&self) -> Range<usize> {
        let first = self.page.saturating_mul(self.page_size);
        let end = first.saturating_add(self.page_size).min(self.total_items);
        let start = first.min(end);
        start..end
    }

    #[must_use]
    pub fn items_on_page(&self) -> usize {
        self.page_range().len()
    }
}

/// Set of selected item identifiers.
///
/// In single mode the set never holds more than one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    ids: BTreeSet<String>,
    multiple: bool,
}

impl Selection {
    #[must_use]
    pub const fn new(multiple: bool) -> Self {
        Self {
            ids: BTreeSet::new(),
            multiple,
        }
    }

    /// Replaces the identifiers. Single mode keeps only the first in set order.
    #[must_use]
    pub fn with_ids<I, S>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        if !self.multiple {
            ids = ids.into_iter().take(1).collect();
        }
        Self {
            ids,
            multiple: self.multiple,
        }
    }

    #[must_use]
    pub const fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.multiple
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// The identifier set after toggling `id`.
    ///
    /// A selected id is removed. Otherwise it is added, replacing the current
    /// selection in single mode.
    #[must_use]
    pub fn toggled(&self, id: &str) -> BTreeSet<String> {
        let mut ids = self.ids.clone();
        if !ids.remove(id) {
            if !self.multiple {
                ids.clear();
            }
            ids.insert(id.to_string());
        }
        ids
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

/// Immutable snapshot of the grid's view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    query: String,
    search: ParsedSearch,
    sort: Option<SortState>,
    pagination: Pagination,
    selection: Selection,
    highlighted: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, true)
    }
}

impl ListState {
    #[must_use]
    pub fn new(page_size: usize, multiple: bool) -> Self {
        Self {
            query: String::new(),
            search: ParsedSearch::default(),
            sort: None,
            pagination: Pagination::new(0, page_size, 0),
            selection: Selection::new(multiple),
            highlighted: 0,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn search(&self) -> &ParsedSearch {
        &self.search
    }

    #[must_use]
    pub const fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn highlighted(&self) -> usize {
        self.highlighted
    }

    fn first_page(&self) -> Pagination {
        Pagination::new(0, self.pagination.page_size, self.pagination.total_items)
    }

    /// Applies a new search: back to the first page and the first row.
    #[must_use]
    pub fn with_search(&self, query: impl Into<String>, search: ParsedSearch) -> Self {
        Self {
            query: query.into(),
            search,
            pagination: self.first_page(),
            highlighted: 0,
            ..self.clone()
        }
    }

    /// Applies a new sort: back to the first page and the first row.
    #[must_use]
    pub fn with_sort(&self, sort: Option<SortState>) -> Self {
        Self {
            sort,
            pagination: self.first_page(),
            highlighted: 0,
            ..self.clone()
        }
    }

    /// Moves to `page` with `page_size` rows, clamping the page.
    #[must_use]
    pub fn with_pagination(&self, page: usize, page_size: usize) -> Self {
        Self {
            pagination: Pagination::new(page, page_size, self.pagination.total_items),
            highlighted: 0,
            ..self.clone()
        }
    }

    /// Updates the item count, keeping the page unless it no longer exists.
    #[must_use]
    pub fn with_total_items(&self, total_items: usize) -> Self {
        let pagination = Pagination::new(self.pagination.page, self.pagination.page_size, total_items);
        let highlighted = self
            .highlighted
            .min(pagination.items_on_page().saturating_sub(1));
        Self {
            pagination,
            highlighted,
            ..self.clone()
        }
    }

    /// Replaces the selection with an owned copy of `ids`.
    #[must_use]
    pub fn with_selection<I, S>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selection: self.selection.with_ids(ids),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_highlight(&self, highlighted: usize) -> Self {
        Self {
            highlighted,
            ..self.clone()
        }
    }
}

/// Rows of chrome around the data rows: header, status, and help.
const CHROME_ROWS: usize = 3;

/// Central state of one grid instance.
pub struct AppState<T> {
    pub(crate) items: Vec<T>,
    pub(crate) columns: Vec<Column<T>>,
    pub(crate) shortcuts: Vec<SearchShortcut>,
    /// Positions in `items` of the filtered and sorted set.
    pub(crate) filtered: Vec<usize>,
    pub(crate) list: ListState,
    pub(crate) controller: NavigationController,
    pub(crate) debouncer: Debouncer,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) layout_options: LayoutOptions,
    pub(crate) layout: ColumnLayout,
    pub(crate) footer: FooterContext,
    pub(crate) input_mode: InputMode,
    /// Search text being typed; applied to `list` once debounced or submitted.
    pub(crate) search_input: String,
    pub(crate) validation: Option<SearchValidation>,
}

impl<T> fmt::Debug for AppState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("items", &self.items.len())
            .field("columns", &self.columns)
            .field("filtered", &self.filtered.len())
            .field("list", &self.list)
            .field("input_mode", &self.input_mode)
            .field("search_input", &self.search_input)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<T: ListItem> AppState<T> {
    /// Creates an empty grid over `columns` with default settings.
    #[must_use]
    pub fn new(columns: Vec<Column<T>>, shortcuts: Vec<SearchShortcut>) -> Self {
        let layout_options = LayoutOptions::default();
        let layout = allocate_column_widths(&columns, &layout_options);
        let mut state = Self {
            items: Vec::new(),
            columns,
            shortcuts,
            filtered: Vec::new(),
            list: ListState::default(),
            controller: NavigationController::default(),
            debouncer: Debouncer::default(),
            clock: Arc::new(MonotonicClock::default()),
            layout_options,
            layout,
            footer: FooterContext::default(),
            input_mode: InputMode::Normal,
            search_input: String::new(),
            validation: None,
        };
        state.refresh_footer();
        state
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.list = self.list.with_pagination(0, page_size);
        self
    }

    #[must_use]
    pub fn with_multi_select(mut self, multiple: bool) -> Self {
        self.list.selection = Selection::new(multiple);
        self
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.controller = NavigationController::new(bindings);
        self.refresh_footer();
        self
    }

    #[must_use]
    pub fn with_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.debouncer = Debouncer::new(delay_ms);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout_options = options;
        self.layout = allocate_column_widths(&self.columns, &self.layout_options);
        self
    }

    /// Replaces the items and re-applies the current search and sort.
    #[must_use]
    pub fn with_items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self.refilter();
        self
    }

    #[must_use]
    pub const fn list(&self) -> &ListState {
        &self.list
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    #[must_use]
    pub const fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    #[must_use]
    pub const fn footer(&self) -> &FooterContext {
        &self.footer
    }

    #[must_use]
    pub const fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    #[must_use]
    pub const fn controller(&self) -> &NavigationController {
        &self.controller
    }

    /// Result of validating the last applied query.
    #[must_use]
    pub const fn validation(&self) -> Option<&SearchValidation> {
        self.validation.as_ref()
    }

    /// Items in the filtered and sorted set, in display order.
    pub fn visible_items(&self) -> impl Iterator<Item = &T> {
        self.filtered.iter().map(|&i| &self.items[i])
    }

    /// Items on the current page.
    pub fn page_items(&self) -> impl Iterator<Item = &T> {
        self.filtered[self.list.pagination.page_range()]
            .iter()
            .map(|&i| &self.items[i])
    }

    /// The item under the highlight, if the page has one there.
    #[must_use]
    pub fn highlighted_item(&self) -> Option<&T> {
        self.page_items().nth(self.list.highlighted)
    }

    /// Selected items that are still present, in item order.
    #[must_use]
    pub fn selected_items(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| self.list.selection.contains(&item.item_id()))
            .collect()
    }

    pub(crate) fn page_ids(&self) -> Vec<String> {
        self.page_items().map(ListItem::item_id).collect()
    }

    pub(crate) fn filtered_ids(&self) -> Vec<String> {
        self.visible_items().map(ListItem::item_id).collect()
    }

    /// Re-runs filtering and sorting for the applied search and sort.
    pub(crate) fn refilter(&mut self) {
        let mut filtered = filter_items(&self.items, &self.columns, &self.list.search);
        sort_indices(&self.items, &self.columns, &mut filtered, self.list.sort.as_ref());
        self.filtered = filtered;
        self.list = self.list.with_total_items(self.filtered.len());
    }

    /// Recomputes the column layout for a terminal width.
    ///
    /// Returns `false` if the width is unchanged and nothing was recomputed.
    pub(crate) fn resize(&mut self, terminal_width: usize) -> bool {
        if terminal_width == self.layout_options.terminal_width {
            return false;
        }
        self.layout_options.terminal_width = terminal_width;
        let layout = allocate_column_widths(&self.columns, &self.layout_options);
        let changed = layout != self.layout;
        self.layout = layout;
        changed
    }

    /// Updates the footer for the current mode. Returns `true` if it changed.
    pub(crate) fn refresh_footer(&mut self) -> bool {
        let help = if self.input_mode.is_search() {
            search_help(&self.search_input, &self.shortcuts)
        } else {
            match self.validation.as_ref().filter(|v| !v.valid) {
                Some(validation) => validation.errors.join("; "),
                None => self.controller.bindings().help_text(),
            }
        };
        self.footer.set_help(help)
    }

    /// Builds the frame for a terminal `rows` lines tall.
    ///
    /// Rows of the current page that do not fit are windowed around the
    /// highlighted row.
    #[must_use]
    pub fn compute_view(&self, rows: usize) -> GridView {
        let _span = tracing::debug_span!(
            "compute_view",
            rows,
            filtered = self.filtered.len(),
            page = self.list.pagination.page
        )
        .entered();

        let header = self
            .columns
            .iter()
            .zip(&self.layout.widths)
            .map(|(column, &width)| {
                let label = match &self.list.sort {
                    Some(sort) if sort.column == column.key => {
                        format!("{} {}", column.label, sort.direction.indicator())
                    }
                    _ => column.label.clone(),
                };
                HeaderCell {
                    key: column.key.clone(),
                    text: fit_cell(&label, width, column.align),
                }
            })
            .collect();

        let search_line = usize::from(self.input_mode.is_search() || !self.list.query.is_empty());
        let available = rows.saturating_sub(CHROME_ROWS + search_line).max(1);
        let range = self.list.pagination.page_range();
        let page = &self.filtered[range.clone()];
        let highlighted = self.list.highlighted;

        let mut start = highlighted.saturating_sub(available / 2);
        let end = (start + available).min(page.len());
        if end - start.min(end) < available && page.len() >= available {
            start = end.saturating_sub(available);
        }
        let start = start.min(end);

        let rows = page[start..end]
            .iter()
            .enumerate()
            .map(|(offset, &item_index)| {
                let position = start + offset;
                let absolute = range.start + position;
                let item = &self.items[item_index];
                let id = item.item_id();
                let cells = self
                    .columns
                    .iter()
                    .zip(&self.layout.widths)
                    .map(|(column, &width)| {
                        let content = column.cell_content(item, position);
                        fit_cell(&content.plain_text(), width, column.align)
                    })
                    .collect();
                GridRow {
                    selected: self.list.selection.contains(&id),
                    highlighted: position == highlighted,
                    id,
                    index: absolute,
                    cells,
                }
            })
            .collect();

        let empty_message = if self.items.is_empty() {
            Some("No items".to_string())
        } else if self.filtered.is_empty() {
            Some(format!("No matches for \"{}\"", self.list.query))
        } else {
            None
        };

        GridView {
            layout: self.layout.clone(),
            column_gap: self.layout_options.column_gap,
            header,
            rows,
            pagination: self.list.pagination,
            query: self.list.query.clone(),
            search: self.list.search.clone(),
            search_input: self
                .input_mode
                .is_search()
                .then(|| self.search_input.clone()),
            input_mode: self.input_mode,
            selected_count: self.list.selection.len(),
            empty_message,
            help: self.footer.help().to_string(),
        }
    }
}

fn search_help(input: &str, shortcuts: &[SearchShortcut]) -> String {
    let suggestions = search_suggestions(input, input.chars().count(), shortcuts);
    if suggestions.is_empty() {
        "enter apply · esc cancel".to_string()
    } else {
        format!("{} · enter apply · esc cancel", suggestions.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, RenderableContent};
    use crate::search::ManualClock;

    #[test]
    fn pagination_derives_flags_and_clamps() {
        let p = Pagination::new(5, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.page, 2);
        assert!(!p.has_next_page);
        assert!(p.has_previous_page);
        assert_eq!(p.page_range(), 20..25);

        let empty = Pagination::new(3, 0, 0);
        assert_eq!(empty.page, 0);
        assert_eq!(empty.page_size, 1);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page && !empty.has_previous_page);
        assert_eq!(empty.items_on_page(), 0);
    }

    #[test]
    fn huge_page_size_holds_everything_on_one_page() {
        let p = Pagination::new(0, usize::MAX, 5);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.page, 0);
        assert!(!p.has_next_page && !p.has_previous_page);
        assert_eq!(p.page_range(), 0..5);

        let last = Pagination::new(1, usize::MAX - 1, usize::MAX);
        assert_eq!(last.total_pages, 2);
        assert_eq!(last.page_range(), usize::MAX - 1..usize::MAX);
    }

    #[test]
    fn with_pagination_clamps_requested_page() {
        let state = ListState::new(10, true).with_total_items(25).with_highlight(4);
        let next = state.with_pagination(5, 10);

        assert_eq!(next.pagination().page, 2);
        assert!(!next.pagination().has_next_page);
        assert!(next.pagination().has_previous_page);
        assert_eq!(next.highlighted(), 0);
        assert_eq!(state.pagination().page, 0, "original snapshot is untouched");
    }

    #[test]
    fn search_and_sort_reset_to_first_page() {
        let state = ListState::new(10, true)
            .with_total_items(25)
            .with_pagination(2, 10)
            .with_highlight(3);

        let searched = state.with_search("bug", ParsedSearch::default());
        assert_eq!(searched.pagination().page, 0);
        assert_eq!(searched.pagination().total_pages, 3);
        assert!(searched.pagination().has_next_page);
        assert_eq!(searched.highlighted(), 0);
        assert_eq!(searched.query(), "bug");

        let sorted = state.with_sort(Some(SortState::ascending("name")));
        assert_eq!(sorted.pagination().page, 0);
        assert_eq!(sorted.sort(), Some(&SortState::ascending("name")));
    }

    #[test]
    fn total_items_keeps_page_when_possible() {
        let state = ListState::new(10, true)
            .with_total_items(25)
            .with_pagination(1, 10)
            .with_highlight(8);

        let grown = state.with_total_items(40);
        assert_eq!(grown.pagination().page, 1);
        assert_eq!(grown.highlighted(), 8);

        let shrunk = state.with_total_items(13);
        assert_eq!(shrunk.pagination().page, 1);
        assert_eq!(shrunk.highlighted(), 2);

        let tiny = state.with_total_items(4);
        assert_eq!(tiny.pagination().page, 0);
        assert_eq!(tiny.highlighted(), 3);
    }

    #[test]
    fn single_select_toggle_is_idempotent() {
        let selection = Selection::new(false);
        let once = selection.with_ids(selection.toggled("a"));
        let twice = once.with_ids(once.toggled("a"));
        assert!(twice.is_empty());

        let first = selection.with_ids(selection.toggled("a"));
        let second = first.with_ids(first.toggled("b"));
        assert_eq!(second.to_vec(), vec!["b".to_string()]);
    }

    #[test]
    fn single_mode_with_selection_keeps_one_id() {
        let state = ListState::new(10, false).with_selection(["c", "a", "b"]);
        assert_eq!(state.selection().to_vec(), vec!["a".to_string()]);

        let multi = ListState::new(10, true).with_selection(["c", "a"]);
        assert_eq!(multi.selection().len(), 2);
    }

    #[derive(Debug, Clone)]
    struct Row(usize);

    impl ListItem for Row {
        fn item_id(&self) -> String {
            format!("r{}", self.0)
        }
    }

    fn grid(n: usize) -> AppState<Row> {
        let columns = vec![Column::fixed("n", "N", 6)
            .sortable()
            .with_value(|r: &Row| Ok(CellValue::from(r.0)))];
        AppState::new(columns, vec![])
            .with_clock(Arc::new(ManualClock::default()))
            .with_page_size(4)
            .with_items((0..n).map(Row).collect())
    }

    #[test]
    fn compute_view_renders_current_page() {
        let state = grid(10);
        let view = state.compute_view(24);

        assert_eq!(view.rows.len(), 4);
        assert_eq!(view.rows[0].id, "r0");
        assert!(view.rows[0].highlighted);
        assert_eq!(view.header[0].text, "N     ");
        assert_eq!(view.rows[1].cells, vec!["1     ".to_string()]);
        assert_eq!(view.status_line(), "Page 1/3 · 10 items");
        assert!(view.empty_message.is_none());
        assert!(view.lines()[1].starts_with("> 0"));
    }

    #[test]
    fn compute_view_windows_short_terminals() {
        let mut state = grid(10);
        state.list = state.list.with_highlight(3);
        let view = state.compute_view(5);

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[1].index, 3);
        assert!(view.rows[1].highlighted);
    }

    #[test]
    fn renderers_receive_page_relative_rows() {
        let columns = vec![Column::fixed("n", "N", 8).with_value(|r: &Row| Ok(CellValue::from(r.0))).with_renderer(
            |value: &CellValue, _: &Row, row: usize| Ok(RenderableContent::Text(format!("{row}@{value}"))),
        )];
        let mut state = AppState::new(columns, vec![])
            .with_page_size(4)
            .with_items((0..10).map(Row).collect());
        state.list = state.list.with_pagination(1, 4);

        let view = state.compute_view(24);
        let cells: Vec<&str> = view.rows.iter().map(|r| r.cells[0].trim_end()).collect();
        assert_eq!(cells, vec!["0@4", "1@5", "2@6", "3@7"]);
        assert_eq!(view.rows[0].index, 4);
    }

    #[test]
    fn compute_view_marks_sort_and_empty_state() {
        let mut state = grid(0);
        assert_eq!(state.compute_view(24).empty_message.as_deref(), Some("No items"));

        state.list = state.list.with_sort(Some(SortState::descending("n")));
        let view = state.compute_view(24);
        assert_eq!(view.header[0].text, "N ▼   ");
    }

    #[test]
    fn resize_is_idempotent() {
        let mut state = grid(3);
        assert!(!state.resize(80));
        let before = state.layout().widths.clone();
        assert!(state.resize(120));
        let after = state.layout().clone();
        assert!(!state.resize(120));
        assert_eq!(state.layout(), &after);
        assert_eq!(after.widths, before, "fixed column keeps its width");
    }
}
