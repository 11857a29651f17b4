//! Application layer coordinating state, events, and actions.
//!
//! This module sits between the host shim (`main.rs`) and the search and
//! layout layers. It follows a unidirectional data flow:
//!
//! ```text
//! Host input → Event → handle_event → ListState transition → Actions
//!                           │
//!                           └─ key events → NavigationController → NavIntent
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Notifications emitted by the event handler
//! - [`context`]: Footer help text shared across components
//! - [`handler`]: Event processing and state transitions
//! - [`keymap`]: Key events, triggers, and the binding table
//! - [`modes`]: Normal and search input modes
//! - [`navigation`]: Rule-table keyboard navigation controller
//! - [`state`]: `ListState` snapshots and the central `AppState`
//! - [`view`]: Render-ready grid snapshot and cell fitting

pub mod actions;
pub mod context;
pub mod handler;
pub mod keymap;
pub mod modes;
pub mod navigation;
pub mod state;
pub mod view;

pub use actions::Action;
pub use context::FooterContext;
pub use handler::{handle_event, Event};
pub use keymap::{Key, KeyBindings, KeyEvent, LogicalAction, Trigger};
pub use modes::InputMode;
pub use navigation::{apply_rules, NavContext, NavIntent, NavigationController, NAVIGATION_RULES};
pub use state::{AppState, ListState, Pagination, Selection, DEFAULT_PAGE_SIZE};
pub use view::{fit_cell, GridRow, GridView, HeaderCell};
