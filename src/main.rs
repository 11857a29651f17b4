//! Zellij plugin wrapper and entry point.
//!
//! A session browser built on the listgrid runtime: every Zellij session is a
//! row with its tab count, connected clients, and whether it is the current
//! session. The shim only translates between Zellij and the library:
//!
//! - Zellij events become [`listgrid::Event`]s
//! - [`listgrid::Action`]s become Zellij API calls
//! - [`listgrid::app::GridView`] lines are printed as plain text
//!
//! # Keybindings
//!
//! Navigation keys come from the configured keymap (`j`/`k`, arrows, paging,
//! space to toggle, Enter to switch). On top of those, in normal mode:
//! - `/`: Start typing a search (`current:yes`, `name fragment`)
//! - `s`: Cycle the sort on the session name
//! - `q`: Hide the plugin
//!
//! While typing a search:
//! - `Enter`: Apply immediately
//! - `Esc`: Cancel and clear the query
//! - `Backspace`: Delete the last character

#![allow(clippy::multiple_crate_versions)]

#[cfg(target_family = "wasm")]
mod plugin {
    use std::collections::BTreeMap;
    use zellij_tile::prelude::*;

    use listgrid::app::{Key, KeyEvent};
    use listgrid::domain::{Align, CellValue, Column, ListItem};
    use listgrid::search::SearchShortcut;
    use listgrid::{handle_event, Action, AppState, Config, InputMode};

    /// One Zellij session as shown in the grid.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SessionRow {
        name: String,
        tabs: usize,
        clients: usize,
        current: bool,
    }

    impl SessionRow {
        fn from_info(info: &SessionInfo) -> Self {
            Self {
                name: info.name.clone(),
                tabs: info.tabs.len(),
                clients: info.connected_clients,
                current: info.is_current_session,
            }
        }

        fn current_label(&self) -> &'static str {
            if self.current {
                "yes"
            } else {
                "no"
            }
        }
    }

    impl ListItem for SessionRow {
        fn item_id(&self) -> String {
            self.name.clone()
        }

        fn field(&self, key: &str) -> Option<CellValue> {
            match key {
                "current" => Some(CellValue::from(self.current_label())),
                _ => None,
            }
        }
    }

    fn columns() -> Vec<Column<SessionRow>> {
        vec![
            Column::flexible("name", "Session")
                .sortable()
                .with_value(|s: &SessionRow| Ok(CellValue::from(s.name.as_str()))),
            Column::fixed("tabs", "Tabs", 6)
                .sortable()
                .align(Align::Right)
                .with_value(|s: &SessionRow| Ok(CellValue::from(s.tabs))),
            Column::fixed("clients", "Clients", 9)
                .sortable()
                .align(Align::Right)
                .with_value(|s: &SessionRow| Ok(CellValue::from(s.clients))),
            Column::fixed("current", "Current", 9)
                .with_value(|s: &SessionRow| Ok(CellValue::from(s.current_label()))),
        ]
    }

    fn shortcuts() -> Vec<SearchShortcut> {
        vec![SearchShortcut::new("current", "Current session").with_values(["yes", "no"])]
    }

    /// Plugin state wrapper.
    pub struct State {
        app: AppState<SessionRow>,
        cols: usize,
    }

    impl Default for State {
        fn default() -> Self {
            Self {
                app: listgrid::initialize(&Config::default(), columns(), shortcuts()),
                cols: 0,
            }
        }
    }

    impl ZellijPlugin for State {
        fn load(&mut self, configuration: BTreeMap<String, String>) {
            let config = Config::from_zellij(&configuration);
            listgrid::observability::init_tracing(&config);

            let _span = tracing::debug_span!("plugin_load").entered();
            tracing::debug!(page_size = config.page_size, debounce_ms = config.debounce_ms, "parsed configuration");
            self.app = listgrid::initialize(&config, columns(), shortcuts());

            request_permission(&[
                PermissionType::ReadApplicationState,
                PermissionType::ChangeApplicationState,
            ]);
            subscribe(&[
                EventType::Key,
                EventType::SessionUpdate,
                EventType::Timer,
                EventType::Visible,
                EventType::BeforeClose,
                EventType::PermissionRequestResult,
            ]);
        }

        fn update(&mut self, event: zellij_tile::prelude::Event) -> bool {
            let event_name = Self::event_name(&event);
            let _span = tracing::debug_span!("plugin_update", event_type = %event_name).entered();

            let our_event = match event {
                zellij_tile::prelude::Event::Key(ref key) => match self.map_key(key) {
                    Some(event) => event,
                    None => return false,
                },
                zellij_tile::prelude::Event::SessionUpdate(ref sessions, _) => {
                    tracing::debug!(session_count = sessions.len(), "session update");
                    listgrid::Event::ItemsLoaded(sessions.iter().map(SessionRow::from_info).collect())
                }
                zellij_tile::prelude::Event::Timer(_) => listgrid::Event::Tick,
                zellij_tile::prelude::Event::Visible(visible) => listgrid::Event::Focus(visible),
                zellij_tile::prelude::Event::BeforeClose => listgrid::Event::Teardown,
                zellij_tile::prelude::Event::PermissionRequestResult(status) => {
                    if matches!(status, PermissionStatus::Denied) {
                        tracing::warn!("permissions denied - session switching unavailable");
                    }
                    return false;
                }
                _ => return false,
            };

            self.dispatch(&our_event)
        }

        fn render(&mut self, rows: usize, cols: usize) {
            if cols != self.cols {
                self.cols = cols;
                self.dispatch(&listgrid::Event::Resize { cols });
            }
            for line in self.app.compute_view(rows).lines() {
                println!("{line}");
            }
        }
    }

    impl State {
        fn dispatch(&mut self, event: &listgrid::Event<SessionRow>) -> bool {
            match handle_event(&mut self.app, event) {
                Ok((should_render, actions)) => {
                    tracing::debug!(action_count = actions.len(), should_render, "event handled");
                    for action in actions {
                        Self::execute_action(action);
                    }
                    should_render
                }
                Err(e) => {
                    tracing::debug!(error = %e, "error handling event");
                    false
                }
            }
        }

        fn event_name(event: &zellij_tile::prelude::Event) -> String {
            match event {
                zellij_tile::prelude::Event::Key(key) => format!("Key({:?})", key.bare_key),
                zellij_tile::prelude::Event::SessionUpdate(..) => "SessionUpdate".to_string(),
                zellij_tile::prelude::Event::Timer(..) => "Timer".to_string(),
                zellij_tile::prelude::Event::Visible(..) => "Visible".to_string(),
                zellij_tile::prelude::Event::BeforeClose => "BeforeClose".to_string(),
                zellij_tile::prelude::Event::PermissionRequestResult(..) => {
                    "PermissionRequestResult".to_string()
                }
                _ => "Other".to_string(),
            }
        }

        fn map_key(&self, key: &KeyWithModifier) -> Option<listgrid::Event<SessionRow>> {
            let ctrl = key.has_modifiers(&[KeyModifier::Ctrl]);

            if self.app.input_mode() == InputMode::Search {
                return match key.bare_key {
                    BareKey::Enter => Some(listgrid::Event::SubmitSearch),
                    BareKey::Esc => Some(listgrid::Event::ExitSearch),
                    BareKey::Backspace => Some(listgrid::Event::SearchBackspace),
                    BareKey::Char(c) if !ctrl => Some(listgrid::Event::SearchInput(c)),
                    _ => None,
                };
            }

            if key.has_no_modifiers() {
                match key.bare_key {
                    BareKey::Char('/') => return Some(listgrid::Event::EnterSearch),
                    BareKey::Char('s') => return Some(listgrid::Event::SortBy("name".to_string())),
                    BareKey::Char('q') => {
                        hide_self();
                        return None;
                    }
                    _ => {}
                }
            }

            let mapped = match key.bare_key {
                BareKey::Up => Key::Up,
                BareKey::Down => Key::Down,
                BareKey::Left => Key::Left,
                BareKey::Right => Key::Right,
                BareKey::PageUp => Key::PageUp,
                BareKey::PageDown => Key::PageDown,
                BareKey::Home => Key::Home,
                BareKey::End => Key::End,
                BareKey::Enter => Key::Enter,
                BareKey::Esc => Key::Esc,
                BareKey::Tab => Key::Tab,
                BareKey::Backspace => Key::Backspace,
                BareKey::Delete => Key::Delete,
                BareKey::Char(c) => Key::Char(c),
                _ => return None,
            };
            Some(listgrid::Event::Key(KeyEvent {
                key: mapped,
                ctrl,
                shift: key.has_modifiers(&[KeyModifier::Shift]),
                alt: key.has_modifiers(&[KeyModifier::Alt]),
            }))
        }

        #[allow(clippy::cast_precision_loss)]
        fn execute_action(action: Action<SessionRow>) {
            match action {
                Action::ScheduleTimer { delay_ms } => {
                    set_timeout(delay_ms as f64 / 1000.0);
                }
                Action::ItemAction { item, index } => {
                    tracing::debug!(session = %item.name, index, "switching to session");
                    if !item.current {
                        switch_session(Some(&item.name));
                    }
                    hide_self();
                }
                Action::SearchChanged(search) => {
                    tracing::debug!(filters = search.filters.iter().count(), text = %search.text, "search changed");
                }
                Action::SortChanged(sort) => {
                    tracing::debug!(sort = ?sort, "sort changed");
                }
                Action::PaginationChanged(pagination) => {
                    tracing::debug!(page = pagination.page, total_pages = pagination.total_pages, "page changed");
                }
                Action::SelectionChanged(ids) => {
                    tracing::debug!(selected = ids.len(), "selection changed");
                }
            }
        }
    }
}

#[cfg(target_family = "wasm")]
use zellij_tile::prelude::*;

#[cfg(target_family = "wasm")]
use plugin::State;

#[cfg(target_family = "wasm")]
register_plugin!(State);

#[cfg(not(target_family = "wasm"))]
fn main() {
    eprintln!("listgrid runs as a Zellij plugin; build it for wasm32-wasip1 and load the .wasm from a layout.");
}
