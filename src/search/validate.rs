//! Search query validation against shortcut value sets.

use super::query::{try_parse_search_query, SearchShortcut};
use serde::Serialize;

/// Message reported when the strict parser rejects a query.
pub const INVALID_SYNTAX_MESSAGE: &str = "Invalid search syntax";

/// Outcome of [`validate_search_query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchValidation {
    /// `true` when `errors` is empty.
    pub valid: bool,
    /// Human-readable problems, in query order.
    pub errors: Vec<String>,
}

/// Checks every recognized filter value against its shortcut's closed value
/// list.
///
/// Parsing failures never propagate; they are reported as a single
/// [`INVALID_SYNTAX_MESSAGE`].
///
/// ```rust
/// use listgrid::search::{validate_search_query, SearchShortcut};
///
/// let shortcuts = vec![SearchShortcut::new("status", "Status").with_values(["done", "todo"])];
///
/// assert!(validate_search_query("status:done", &shortcuts).valid);
/// let result = validate_search_query("status:maybe", &shortcuts);
/// assert!(!result.valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[must_use]
pub fn validate_search_query(query: &str, shortcuts: &[SearchShortcut]) -> SearchValidation {
    let parsed = match try_parse_search_query(query, shortcuts) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "search query rejected by strict parser");
            return SearchValidation {
                valid: false,
                errors: vec![INVALID_SYNTAX_MESSAGE.to_string()],
            };
        }
    };

    let mut errors = Vec::new();
    for (key, values) in parsed.filters.iter() {
        let Some(shortcut) = shortcuts.iter().find(|s| s.key == key) else {
            continue;
        };
        let Some(allowed) = &shortcut.values else {
            continue;
        };
        for value in values.iter().filter(|v| !shortcut.accepts(v)) {
            errors.push(format!(
                "Invalid value \"{value}\" for {}. Expected one of: {}",
                shortcut.label,
                allowed.join(", ")
            ));
        }
    }

    SearchValidation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcuts() -> Vec<SearchShortcut> {
        vec![
            SearchShortcut::new("status", "Status").with_values(["done", "todo"]),
            SearchShortcut::new("owner", "Owner"),
        ]
    }

    #[test]
    fn accepts_declared_values_and_open_shortcuts() {
        let result = validate_search_query("status:todo owner:anyone text", &shortcuts());
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn reports_each_invalid_value() {
        let result = validate_search_query("status:maybe status:done status:later", &shortcuts());
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "Invalid value \"maybe\" for Status. Expected one of: done, todo".to_string(),
                "Invalid value \"later\" for Status. Expected one of: done, todo".to_string(),
            ]
        );
    }

    #[test]
    fn unknown_keys_are_not_errors() {
        assert!(validate_search_query("priority:high", &shortcuts()).valid);
    }

    #[test]
    fn strict_parse_failure_is_one_generic_error() {
        let result = validate_search_query("status:done\u{0}", &shortcuts());
        assert!(!result.valid);
        assert_eq!(result.errors, vec![INVALID_SYNTAX_MESSAGE.to_string()]);
    }
}
