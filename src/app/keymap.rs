//! Key events, triggers, and the logical-action binding table.
//!
//! The host translates its native key events into [`KeyEvent`]s. A
//! [`KeyBindings`] table maps each [`LogicalAction`] to the [`Trigger`]s that
//! fire it, and [`KeyBindings::resolve`] picks the first matching action in
//! [`LogicalAction::PRIORITY`] order.
//!
//! # Trigger Syntax
//!
//! Triggers are written as `[ctrl+][alt+][shift+]<name>`, where `<name>` is a
//! named key (`up`, `pagedown`, `esc`, `space`, ...) or a single character.
//! Character triggers without an explicit `shift+` ignore the shift flag, so
//! `G` matches an uppercase `G` however the terminal reports it.
//!
//! # Keymap Files
//!
//! ```toml
//! [bindings]
//! moveUp = ["up", "k"]
//! triggerAction = ["enter", "o"]
//! ```
//!
//! Every listed action has its whole trigger set replaced. Unlisted actions
//! keep their defaults.

use crate::domain::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A key, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Esc,
    Tab,
    Backspace,
    Delete,
    /// Printable character. Space is `Char(' ')`.
    Char(char),
}

impl Key {
    fn name(self) -> String {
        match self {
            Self::Up => "up".into(),
            Self::Down => "down".into(),
            Self::Left => "left".into(),
            Self::Right => "right".into(),
            Self::PageUp => "pageup".into(),
            Self::PageDown => "pagedown".into(),
            Self::Home => "home".into(),
            Self::End => "end".into(),
            Self::Enter => "enter".into(),
            Self::Esc => "esc".into(),
            Self::Tab => "tab".into(),
            Self::Backspace => "backspace".into(),
            Self::Delete => "delete".into(),
            Self::Char(' ') => "space".into(),
            Self::Char(c) => c.to_string(),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Self::Char(c));
        }
        let key = match name.to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "pageup" => Self::PageUp,
            "pagedown" => Self::PageDown,
            "home" => Self::Home,
            "end" => Self::End,
            "enter" => Self::Enter,
            "esc" | "escape" => Self::Esc,
            "tab" => Self::Tab,
            "backspace" => Self::Backspace,
            "delete" => Self::Delete,
            "space" => Self::Char(' '),
            _ => return None,
        };
        Some(key)
    }
}

/// A key press with its modifier flags, as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyEvent {
    /// A key press without modifiers.
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    /// A key press with only Ctrl held.
    #[must_use]
    pub const fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
            alt: false,
        }
    }

    /// Shorthand for a printable character without modifiers.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }

    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub const fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

/// One key combination that fires a logical action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Trigger {
    key: Key,
    ctrl: bool,
    alt: bool,
    shift: bool,
}

impl Trigger {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }

    /// Whether `event` fires this trigger.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.ctrl != event.ctrl || self.alt != event.alt {
            return false;
        }
        match (self.key, event.key) {
            (Key::Char(want), Key::Char(got)) if self.shift => {
                event.shift && want.to_lowercase().eq(got.to_lowercase())
            }
            (Key::Char(want), Key::Char(got)) => want == got,
            (want, got) => want == got && self.shift == event.shift,
        }
    }
}

fn strip_modifier<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    if input.len() > prefix.len() && head.eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}

impl FromStr for Trigger {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        let mut rest = s.trim();
        let mut trigger = Self::new(Key::Esc);

        loop {
            if let Some(r) = strip_modifier(rest, "ctrl+") {
                trigger.ctrl = true;
                rest = r;
            } else if let Some(r) = strip_modifier(rest, "alt+") {
                trigger.alt = true;
                rest = r;
            } else if let Some(r) = strip_modifier(rest, "shift+") {
                trigger.shift = true;
                rest = r;
            } else {
                break;
            }
        }

        trigger.key = Key::from_name(rest)
            .ok_or_else(|| GridError::Keymap(format!("unknown key '{rest}' in trigger '{s}'")))?;
        Ok(trigger)
    }
}

impl TryFrom<String> for Trigger {
    type Error = GridError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.to_string()
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        f.write_str(&self.key.name())
    }
}

/// Host-independent actions the navigation controller understands.
///
/// Declaration order is resolution priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicalAction {
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    ToggleSelection,
    SelectAll,
    DeselectAll,
    TriggerAction,
}

impl LogicalAction {
    /// Order in which bindings are checked; the first match wins.
    pub const PRIORITY: [Self; 12] = [
        Self::MoveUp,
        Self::MoveDown,
        Self::MoveToTop,
        Self::MoveToBottom,
        Self::NextPage,
        Self::PreviousPage,
        Self::FirstPage,
        Self::LastPage,
        Self::ToggleSelection,
        Self::SelectAll,
        Self::DeselectAll,
        Self::TriggerAction,
    ];

    /// camelCase name used in keymap files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveUp => "moveUp",
            Self::MoveDown => "moveDown",
            Self::MoveToTop => "moveToTop",
            Self::MoveToBottom => "moveToBottom",
            Self::NextPage => "nextPage",
            Self::PreviousPage => "previousPage",
            Self::FirstPage => "firstPage",
            Self::LastPage => "lastPage",
            Self::ToggleSelection => "toggleSelection",
            Self::SelectAll => "selectAll",
            Self::DeselectAll => "deselectAll",
            Self::TriggerAction => "triggerAction",
        }
    }

    const fn help_label(self) -> &'static str {
        match self {
            Self::MoveUp => "up",
            Self::MoveDown => "down",
            Self::MoveToTop => "top",
            Self::MoveToBottom => "bottom",
            Self::NextPage => "next page",
            Self::PreviousPage => "prev page",
            Self::FirstPage => "first page",
            Self::LastPage => "last page",
            Self::ToggleSelection => "select",
            Self::SelectAll => "select all",
            Self::DeselectAll => "clear",
            Self::TriggerAction => "open",
        }
    }
}

impl FromStr for LogicalAction {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| GridError::Keymap(format!("unknown action '{s}'")))
    }
}

impl fmt::Display for LogicalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Deserialize)]
struct KeymapFile {
    #[serde(default)]
    bindings: BTreeMap<String, Vec<String>>,
}

/// Maps each [`LogicalAction`] to its triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    map: BTreeMap<LogicalAction, Vec<Trigger>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use LogicalAction as A;

        let plain = Trigger::new;
        let ch = |c| Trigger::new(Key::Char(c));
        let ctrl = |key| Trigger::new(key).with_ctrl();

        let map = [
            (A::MoveUp, vec![plain(Key::Up), ch('k'), ctrl(Key::Char('p'))]),
            (A::MoveDown, vec![plain(Key::Down), ch('j'), ctrl(Key::Char('n'))]),
            (A::MoveToTop, vec![plain(Key::Home), ch('g')]),
            (A::MoveToBottom, vec![plain(Key::End), ch('G')]),
            (A::NextPage, vec![plain(Key::PageDown), plain(Key::Right), ch('l')]),
            (A::PreviousPage, vec![plain(Key::PageUp), plain(Key::Left), ch('h')]),
            (A::FirstPage, vec![ctrl(Key::Home)]),
            (A::LastPage, vec![ctrl(Key::End)]),
            (A::ToggleSelection, vec![ch(' ')]),
            (A::SelectAll, vec![ctrl(Key::Char('a'))]),
            (A::DeselectAll, vec![plain(Key::Esc)]),
            (A::TriggerAction, vec![plain(Key::Enter)]),
        ]
        .into_iter()
        .collect();

        Self { map }
    }
}

impl KeyBindings {
    /// Replaces the trigger set of every action named in `overrides`.
    #[must_use]
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (LogicalAction, Vec<Trigger>)>,
    {
        for (action, triggers) in overrides {
            tracing::debug!(action = %action, triggers = triggers.len(), "overriding key binding");
            self.map.insert(action, triggers);
        }
        self
    }

    /// Default bindings with the overrides from a TOML keymap document.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Toml`] for malformed TOML and [`GridError::Keymap`]
    /// for unknown action names or unparseable triggers.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let file: KeymapFile = toml::from_str(input)?;
        let overrides = file
            .bindings
            .into_iter()
            .map(|(name, triggers)| {
                let action = name.parse::<LogicalAction>()?;
                let triggers = triggers
                    .iter()
                    .map(|t| t.parse::<Trigger>())
                    .collect::<Result<Vec<_>>>()?;
                Ok((action, triggers))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::default().with_overrides(overrides))
    }

    /// Reads a keymap file and applies it over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Io`] if the file cannot be read, otherwise the
    /// errors of [`KeyBindings::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let _span = tracing::debug_span!("load_keymap", path = %path.display()).entered();
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    #[must_use]
    pub fn triggers(&self, action: LogicalAction) -> &[Trigger] {
        self.map.get(&action).map_or(&[], Vec::as_slice)
    }

    /// First action, in priority order, with a trigger matching `event`.
    #[must_use]
    pub fn resolve(&self, event: &KeyEvent) -> Option<LogicalAction> {
        LogicalAction::PRIORITY
            .into_iter()
            .find(|action| self.triggers(*action).iter().any(|t| t.matches(event)))
    }

    /// One-line summary of the bindings, e.g. `up/k up · down/j down`.
    ///
    /// Lists at most the first two triggers per action and skips unbound
    /// actions.
    #[must_use]
    pub fn help_text(&self) -> String {
        LogicalAction::PRIORITY
            .into_iter()
            .filter_map(|action| {
                let triggers = self.triggers(action);
                if triggers.is_empty() {
                    return None;
                }
                let keys = triggers
                    .iter()
                    .take(2)
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("/");
                Some(format!("{keys} {}", action.help_label()))
            })
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifiers_and_named_keys() {
        let t: Trigger = "ctrl+home".parse().unwrap();
        assert!(t.matches(&KeyEvent::ctrl(Key::Home)));
        assert!(!t.matches(&KeyEvent::plain(Key::Home)));

        let t: Trigger = "Escape".parse().unwrap();
        assert_eq!(t.key(), Key::Esc);
        assert_eq!(t.to_string(), "esc");

        let t: Trigger = "space".parse().unwrap();
        assert_eq!(t.key(), Key::Char(' '));

        let t: Trigger = "alt+shift+x".parse().unwrap();
        assert_eq!(t.to_string(), "alt+shift+x");
    }

    #[test]
    fn plus_is_a_valid_character_key() {
        let t: Trigger = "+".parse().unwrap();
        assert_eq!(t.key(), Key::Char('+'));
        let t: Trigger = "ctrl++".parse().unwrap();
        assert!(t.matches(&KeyEvent::ctrl(Key::Char('+'))));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!("ctrl+hyper".parse::<Trigger>(), Err(GridError::Keymap(_))));
        assert!("".parse::<Trigger>().is_err());
        assert!("jump".parse::<LogicalAction>().is_err());
    }

    #[test]
    fn char_triggers_ignore_shift_unless_requested() {
        let upper: Trigger = "G".parse().unwrap();
        assert!(upper.matches(&KeyEvent::char('G')));
        assert!(upper.matches(&KeyEvent::char('G').with_shift()));
        assert!(!upper.matches(&KeyEvent::char('g')));

        let shifted: Trigger = "shift+g".parse().unwrap();
        assert!(shifted.matches(&KeyEvent::char('G').with_shift()));
        assert!(!shifted.matches(&KeyEvent::char('g')));

        let named: Trigger = "tab".parse().unwrap();
        assert!(!named.matches(&KeyEvent::plain(Key::Tab).with_shift()));
    }

    #[test]
    fn default_table_resolves_vim_and_arrow_keys() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.resolve(&KeyEvent::char('k')), Some(LogicalAction::MoveUp));
        assert_eq!(bindings.resolve(&KeyEvent::plain(Key::Down)), Some(LogicalAction::MoveDown));
        assert_eq!(bindings.resolve(&KeyEvent::char('G')), Some(LogicalAction::MoveToBottom));
        assert_eq!(bindings.resolve(&KeyEvent::ctrl(Key::End)), Some(LogicalAction::LastPage));
        assert_eq!(bindings.resolve(&KeyEvent::plain(Key::End)), Some(LogicalAction::MoveToBottom));
        assert_eq!(bindings.resolve(&KeyEvent::char(' ')), Some(LogicalAction::ToggleSelection));
        assert_eq!(bindings.resolve(&KeyEvent::ctrl(Key::Char('a'))), Some(LogicalAction::SelectAll));
        assert_eq!(bindings.resolve(&KeyEvent::char('z')), None);
    }

    #[test]
    fn priority_decides_overlapping_triggers() {
        let enter = vec![Trigger::new(Key::Enter)];
        let bindings = KeyBindings::default().with_overrides([(LogicalAction::MoveDown, enter)]);
        assert_eq!(bindings.resolve(&KeyEvent::plain(Key::Enter)), Some(LogicalAction::MoveDown));
    }

    #[test]
    fn toml_overrides_replace_whole_trigger_set() {
        let bindings = KeyBindings::from_toml_str(
            r#"
            [bindings]
            moveUp = ["w"]
            triggerAction = ["enter", "o"]
            "#,
        )
        .unwrap();

        assert_eq!(bindings.resolve(&KeyEvent::char('w')), Some(LogicalAction::MoveUp));
        assert_eq!(bindings.resolve(&KeyEvent::char('k')), None);
        assert_eq!(bindings.resolve(&KeyEvent::char('o')), Some(LogicalAction::TriggerAction));
        assert_eq!(bindings.resolve(&KeyEvent::char('j')), Some(LogicalAction::MoveDown));
    }

    #[test]
    fn toml_errors_are_reported() {
        assert!(matches!(
            KeyBindings::from_toml_str("[bindings]\nfly = [\"f\"]"),
            Err(GridError::Keymap(_))
        ));
        assert!(matches!(
            KeyBindings::from_toml_str("[bindings]\nmoveUp = [\"warp\"]"),
            Err(GridError::Keymap(_))
        ));
        assert!(matches!(
            KeyBindings::from_toml_str("[bindings"),
            Err(GridError::Toml(_))
        ));
        assert_eq!(KeyBindings::from_toml_str("").unwrap(), KeyBindings::default());
    }

    #[test]
    fn keymap_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.toml");
        std::fs::write(&path, "[bindings]\ndeselectAll = [\"x\"]\n").unwrap();

        let bindings = KeyBindings::from_file(&path).unwrap();
        assert_eq!(bindings.resolve(&KeyEvent::char('x')), Some(LogicalAction::DeselectAll));
        assert!(matches!(
            KeyBindings::from_file(&dir.path().join("missing.toml")),
            Err(GridError::Io(_))
        ));
    }

    #[test]
    fn help_text_lists_bound_actions() {
        let help = KeyBindings::default().help_text();
        assert!(help.starts_with("up/k up · down/j down"));
        assert!(help.contains("enter open"));

        let unbound = KeyBindings::default().with_overrides([(LogicalAction::TriggerAction, vec![])]);
        assert!(!unbound.help_text().contains("open"));
    }

    #[test]
    fn trigger_deserializes_from_string() {
        let triggers: Vec<Trigger> = serde_json::from_str(r#"["ctrl+n", "j"]"#).unwrap();
        assert_eq!(triggers[0], Trigger::new(Key::Char('n')).with_ctrl());
        assert_eq!(serde_json::to_string(&triggers[1]).unwrap(), "\"j\"");
    }
}
