//! Notifications emitted by the event handler.
//!
//! [`handle_event`](super::handle_event) returns a `Vec<Action<T>>` after each
//! event. The host executes them in order: forwarding change notifications to
//! whoever owns the data, arming timers, and running row actions.

use super::state::Pagination;
use crate::domain::SortState;
use crate::search::ParsedSearch;

/// Side effects requested by the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<T> {
    /// A debounced or submitted search was applied.
    SearchChanged(ParsedSearch),

    /// The sort column or direction changed. `None` means unsorted.
    SortChanged(Option<SortState>),

    /// The page or page size changed.
    PaginationChanged(Pagination),

    /// The selection set changed. Identifiers are in sorted order.
    SelectionChanged(Vec<String>),

    /// The row action was triggered on an item.
    ItemAction {
        item: T,
        /// Position of the item in the filtered and sorted set.
        index: usize,
    },

    /// The host should deliver [`Event::Tick`](super::Event::Tick) after
    /// `delay_ms` so a pending search edit can fire.
    ScheduleTimer { delay_ms: u64 },
}
