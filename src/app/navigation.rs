//! Keyboard navigation controller.
//!
//! Dispatch is two table lookups. The [`KeyBindings`] table turns a
//! [`KeyEvent`] into a [`LogicalAction`], then [`NAVIGATION_RULES`] turns the
//! action into a [`NavIntent`]: the first row for the action whose guard holds
//! against the current [`NavContext`] produces the intent. No row matching is
//! a no-op.
//!
//! The controller never mutates list state itself. Intents are applied by
//! [`AppState`](super::AppState) through the `ListState` transitions.

use super::keymap::{KeyBindings, KeyEvent, LogicalAction};
use super::state::{Pagination, Selection};
use std::collections::BTreeSet;

/// Snapshot of the list as seen by the rule guards and effects.
#[derive(Debug, Clone, Copy)]
pub struct NavContext<'a> {
    /// Highlighted row within the current page.
    pub highlighted: usize,
    /// Identifiers of the rows on the current page, in display order.
    pub page_ids: &'a [String],
    /// Identifiers of every item in the filtered set.
    pub all_ids: &'a [String],
    pub pagination: &'a Pagination,
    pub selection: &'a Selection,
}

impl NavContext<'_> {
    /// Number of rows on the current page.
    #[must_use]
    pub fn count(&self) -> usize {
        self.page_ids.len()
    }

    fn highlighted_id(&self) -> Option<&String> {
        self.page_ids.get(self.highlighted)
    }
}

/// State change requested by a navigation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavIntent {
    /// Move the highlight within the current page.
    Highlight(usize),
    /// Switch page and place the highlight.
    GoToPage { page: usize, highlight: usize },
    /// Replace the selection set.
    SetSelection(BTreeSet<String>),
    /// Invoke the row action on an item.
    Activate {
        id: String,
        /// Position in the filtered set: `page * page_size + highlighted`.
        index: usize,
    },
}

/// One row of the dispatch table.
#[derive(Clone, Copy)]
pub struct NavigationRule {
    pub action: LogicalAction,
    pub guard: fn(&NavContext<'_>) -> bool,
    pub effect: fn(&NavContext<'_>) -> NavIntent,
}

impl std::fmt::Debug for NavigationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationRule")
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

const fn rule(
    action: LogicalAction,
    guard: fn(&NavContext<'_>) -> bool,
    effect: fn(&NavContext<'_>) -> NavIntent,
) -> NavigationRule {
    NavigationRule {
        action,
        guard,
        effect,
    }
}

fn toggled(ctx: &NavContext<'_>) -> NavIntent {
    let id = ctx.highlighted_id().cloned().unwrap_or_default();
    NavIntent::SetSelection(ctx.selection.toggled(&id))
}

fn activate(ctx: &NavContext<'_>) -> NavIntent {
    NavIntent::Activate {
        id: ctx.highlighted_id().cloned().unwrap_or_default(),
        index: ctx.pagination.page_range().start + ctx.highlighted,
    }
}

/// Rule table, checked top to bottom for the resolved action.
pub const NAVIGATION_RULES: &[NavigationRule] = &[
    rule(
        LogicalAction::MoveUp,
        |c| c.highlighted > 0,
        |c| NavIntent::Highlight(c.highlighted - 1),
    ),
    rule(
        LogicalAction::MoveUp,
        |c| c.highlighted == 0 && c.pagination.has_previous_page,
        |c| NavIntent::GoToPage {
            page: c.pagination.page - 1,
            highlight: c.pagination.page_size - 1,
        },
    ),
    rule(
        LogicalAction::MoveDown,
        |c| c.highlighted + 1 < c.count(),
        |c| NavIntent::Highlight(c.highlighted + 1),
    ),
    rule(
        LogicalAction::MoveDown,
        |c| c.count() > 0 && c.highlighted + 1 >= c.count() && c.pagination.has_next_page,
        |c| NavIntent::GoToPage {
            page: c.pagination.page + 1,
            highlight: 0,
        },
    ),
    rule(LogicalAction::MoveToTop, |c| c.count() > 0, |_| NavIntent::Highlight(0)),
    rule(
        LogicalAction::MoveToBottom,
        |c| c.count() > 0,
        |c| NavIntent::Highlight(c.count() - 1),
    ),
    rule(
        LogicalAction::NextPage,
        |c| c.pagination.has_next_page,
        |c| NavIntent::GoToPage {
            page: c.pagination.page + 1,
            highlight: 0,
        },
    ),
    rule(
        LogicalAction::PreviousPage,
        |c| c.pagination.has_previous_page,
        |c| NavIntent::GoToPage {
            page: c.pagination.page - 1,
            highlight: 0,
        },
    ),
    rule(
        LogicalAction::FirstPage,
        |c| c.pagination.page != 0,
        |_| NavIntent::GoToPage {
            page: 0,
            highlight: 0,
        },
    ),
    rule(
        LogicalAction::LastPage,
        |c| c.pagination.total_pages > 0 && c.pagination.page + 1 != c.pagination.total_pages,
        |c| NavIntent::GoToPage {
            page: c.pagination.total_pages - 1,
            highlight: 0,
        },
    ),
    rule(
        LogicalAction::ToggleSelection,
        |c| c.highlighted < c.count(),
        toggled,
    ),
    rule(
        LogicalAction::SelectAll,
        |c| c.selection.is_multiple() && !c.all_ids.is_empty(),
        |c| NavIntent::SetSelection(c.all_ids.iter().cloned().collect()),
    ),
    rule(
        LogicalAction::DeselectAll,
        |c| !c.selection.is_empty(),
        |_| NavIntent::SetSelection(BTreeSet::new()),
    ),
    rule(
        LogicalAction::TriggerAction,
        |c| c.highlighted < c.count(),
        activate,
    ),
];

/// Evaluates [`NAVIGATION_RULES`] for `action`.
#[must_use]
pub fn apply_rules(action: LogicalAction, ctx: &NavContext<'_>) -> Option<NavIntent> {
    NAVIGATION_RULES
        .iter()
        .filter(|r| r.action == action)
        .find(|r| (r.guard)(ctx))
        .map(|r| (r.effect)(ctx))
}

/// Turns key events into navigation intents while focused and enabled.
#[derive(Debug, Clone)]
pub struct NavigationController {
    bindings: KeyBindings,
    focused: bool,
    enabled: bool,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

impl NavigationController {
    /// A focused, enabled controller.
    #[must_use]
    pub const fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            focused: true,
            enabled: true,
        }
    }

    #[must_use]
    pub const fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether key events are currently handled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.focused && self.enabled
    }

    /// Logical action bound to `event`, if the controller is active.
    #[must_use]
    pub fn resolve(&self, event: &KeyEvent) -> Option<LogicalAction> {
        if !self.is_active() {
            return None;
        }
        self.bindings.resolve(event)
    }

    /// Resolves `event` and evaluates the rule table against `ctx`.
    #[must_use]
    pub fn dispatch(&self, event: &KeyEvent, ctx: &NavContext<'_>) -> Option<NavIntent> {
        let action = self.resolve(event)?;
        let intent = apply_rules(action, ctx);
        tracing::debug!(action = %action, intent = ?intent, "key dispatched");
        intent
    }
}
