//! listgrid: a keyboard-driven data grid for terminal plugins.
//!
//! The crate turns a slice of items plus a set of column descriptors into a
//! paginated, searchable, sortable grid:
//! - Filter-aware search queries (`status:active "exact phrase" free text`)
//! - Column widths fitted to the terminal, with fixed and flexible columns
//! - Immutable list state snapshots for search, sort, pagination, and selection
//! - Rule-table keyboard navigation with rebindable keys

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Zellij Plugin Shim (main.rs)                       │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Event handling and actions                       │
//! │  - List state and navigation controller             │
//! │  - Grid view snapshot                               │
//! └─────────────────────────────────────────────────────┘
//!         │                                      │
//! ┌─────────────────────────┐   ┌───────────────────────────┐
//! │ Search (search/)        │   │ Layout (layout/)          │
//! │ - Query parser          │   │ - Column width allocator  │
//! │ - Validation, debounce  │   │                           │
//! │ - Filtering, sorting    │   │                           │
//! └─────────────────────────┘   └───────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain & Infrastructure                            │
//! │  - Columns, cell values, errors (domain/)           │
//! │  - Sandbox paths (infrastructure/)                  │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```kdl
//! pane {
//!     plugin location="file:/path/to/listgrid.wasm" {
//!         page_size "15"
//!         debounce_ms "250"
//!         multi_select "false"
//!         keymap_file "~/.config/listgrid/keys.toml"
//!         trace_level "listgrid=debug"
//!     }
//! }
//! ```
//!
//! # Example
//!
//! ```rust
//! use listgrid::app::{handle_event, Event, Key, KeyEvent};
//! use listgrid::domain::{CellValue, Column, ListItem};
//! use listgrid::{initialize, Config};
//!
//! #[derive(Clone)]
//! struct Host { name: String }
//!
//! impl ListItem for Host {
//!     fn item_id(&self) -> String {
//!         self.name.clone()
//!     }
//! }
//!
//! let columns = vec![Column::flexible("name", "Name")
//!     .with_value(|h: &Host| Ok(CellValue::from(h.name.as_str())))];
//!
//! let mut state = initialize(&Config::default(), columns, Vec::new());
//! let hosts = vec![Host { name: "alpha".into() }, Host { name: "beta".into() }];
//! handle_event(&mut state, &Event::ItemsLoaded(hosts))?;
//! handle_event(&mut state, &Event::Key(KeyEvent::plain(Key::Down)))?;
//!
//! assert_eq!(state.highlighted_item().map(|h| h.name.as_str()), Some("beta"));
//! # Ok::<(), listgrid::GridError>(())
//! ```

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod layout;
pub mod search;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, InputMode, ListState};
pub use domain::{GridError, Result};

use crate::app::KeyBindings;
use crate::domain::{Column, ListItem};
use crate::layout::LayoutOptions;
use crate::search::{SearchShortcut, DEFAULT_DEBOUNCE_MS};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Widest terminal a host can report, in cells.
pub const MAX_TERMINAL_WIDTH: usize = u16::MAX as usize;

/// Plugin configuration parsed from Zellij's configuration map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Rows per page. Default: 10
    pub page_size: usize,

    /// Delay between the last search keystroke and applying the query.
    /// Default: 300
    pub debounce_ms: u64,

    /// Whether more than one row can be selected. Default: `true`
    pub multi_select: bool,

    /// Cells between adjacent columns. Default: 1
    pub column_gap: usize,

    /// Cells reserved outside the columns. Default: 4
    pub reserved_width: usize,

    /// Global lower bound on column widths. Default: 4
    pub min_column_width: usize,

    /// Global upper bound on column widths. Default: 60
    pub max_column_width: usize,

    /// Path to a TOML file overriding key bindings. `~` expands to the
    /// sandbox host root.
    pub keymap_file: Option<String>,

    /// `EnvFilter` directive for span export. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let layout = LayoutOptions::default();
        Self {
            page_size: app::DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            multi_select: true,
            column_gap: layout.column_gap,
            reserved_width: layout.reserved_width,
            min_column_width: layout.min_column_width,
            max_column_width: layout.max_column_width,
            keymap_file: None,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from Zellij's configuration map.
    ///
    /// Missing or unparseable values fall back to their defaults.
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use listgrid::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("page_size".to_string(), "25".to_string());
    /// map.insert("multi_select".to_string(), "false".to_string());
    ///
    /// let config = Config::from_zellij(&map);
    /// assert_eq!(config.page_size, 25);
    /// assert!(!config.multi_select);
    /// assert_eq!(config.debounce_ms, 300);
    /// ```
    #[must_use]
    pub fn from_zellij(config: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        Self {
            page_size: parse_or(config, "page_size", defaults.page_size),
            debounce_ms: parse_or(config, "debounce_ms", defaults.debounce_ms),
            multi_select: parse_or(config, "multi_select", defaults.multi_select),
            column_gap: parse_or(config, "column_gap", defaults.column_gap),
            reserved_width: parse_or(config, "reserved_width", defaults.reserved_width),
            min_column_width: parse_or(config, "min_column_width", defaults.min_column_width),
            max_column_width: parse_or(config, "max_column_width", defaults.max_column_width),
            keymap_file: non_empty(config, "keymap_file"),
            trace_level: non_empty(config, "trace_level"),
        }
    }

    /// Checks the values that have no sensible clamped interpretation.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Config`] for a zero page size, a minimum column
    /// width above the maximum, or a gap or reserve wider than any terminal.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(GridError::Config("page_size must be at least 1".to_string()));
        }
        for (name, value) in [("column_gap", self.column_gap), ("reserved_width", self.reserved_width)] {
            if value > MAX_TERMINAL_WIDTH {
                return Err(GridError::Config(format!(
                    "{name} ({value}) exceeds the widest terminal ({MAX_TERMINAL_WIDTH})"
                )));
            }
        }
        if self.min_column_width > self.max_column_width {
            return Err(GridError::Config(format!(
                "min_column_width ({}) exceeds max_column_width ({})",
                self.min_column_width, self.max_column_width
            )));
        }
        Ok(())
    }

    /// Layout bounds for the allocator. The terminal width starts at the
    /// default and is replaced on the first resize.
    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            column_gap: self.column_gap,
            reserved_width: self.reserved_width,
            min_column_width: self.min_column_width,
            max_column_width: self.max_column_width,
            ..LayoutOptions::default()
        }
    }

    fn key_bindings(&self) -> KeyBindings {
        let Some(file) = self.keymap_file.as_deref() else {
            return KeyBindings::default();
        };
        let path = infrastructure::expand_tilde(file);
        KeyBindings::from_file(Path::new(&path)).unwrap_or_else(|e| {
            tracing::warn!(keymap_file = %path, error = %e, "failed to load keymap, using defaults");
            KeyBindings::default()
        })
    }
}

fn parse_or<V: FromStr>(config: &BTreeMap<String, String>, key: &str, default: V) -> V {
    match config.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::debug!(key, value = %raw, "unparseable config value, using default");
            default
        }),
    }
}

fn non_empty(config: &BTreeMap<String, String>, key: &str) -> Option<String> {
    config
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Builds the grid state for `columns` from plugin configuration.
///
/// A keymap file that fails to load is logged and replaced by the default
/// bindings. An invalid configuration is logged and replaced by the defaults.
pub fn initialize<T: ListItem>(
    config: &Config,
    columns: Vec<Column<T>>,
    shortcuts: Vec<SearchShortcut>,
) -> AppState<T> {
    tracing::debug!("initializing listgrid");

    let fallback;
    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            tracing::warn!(error = %e, "invalid configuration, using defaults");
            fallback = Config {
                keymap_file: config.keymap_file.clone(),
                trace_level: config.trace_level.clone(),
                ..Config::default()
            };
            &fallback
        }
    };

    AppState::new(columns, shortcuts)
        .with_page_size(config.page_size)
        .with_multi_select(config.multi_select)
        .with_debounce_ms(config.debounce_ms)
        .with_layout_options(config.layout_options())
        .with_bindings(config.key_bindings())
}
