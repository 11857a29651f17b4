//! Input mode of the grid.
//!
//! In [`InputMode::Normal`] key events go to the navigation controller. In
//! [`InputMode::Search`] they edit the search query and the controller is
//! disabled until the mode is left again.

/// Current input handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigation, selection, and row actions.
    #[default]
    Normal,

    /// Typing into the search input. Edits are debounced before they filter
    /// the list; submitting applies the query immediately.
    Search,
}

impl InputMode {
    #[must_use]
    pub const fn is_search(self) -> bool {
        matches!(self, Self::Search)
    }
}
