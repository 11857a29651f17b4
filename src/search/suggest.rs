//! Completion suggestions for the search input.

use super::query::{scan, SearchShortcut};

/// Suggests completions for the token that ends at `cursor`.
///
/// `cursor` is a character offset into `query` and is clamped to its length.
/// When the token under the cursor already contains a colon, the suggestions
/// are the matching shortcut's declared values that start with the typed part
/// (case-insensitive). Otherwise they are the shortcut keys that start with the
/// typed part, each rendered as `key:`.
///
/// ```rust
/// use listgrid::search::{search_suggestions, SearchShortcut};
///
/// let shortcuts = vec![
///     SearchShortcut::new("status", "Status").with_values(["done", "todo"]),
///     SearchShortcut::new("sort", "Sort"),
/// ];
///
/// assert_eq!(search_suggestions("fix st", 6, &shortcuts), vec!["status:"]);
/// assert_eq!(search_suggestions("status:D", 8, &shortcuts), vec!["done"]);
/// ```
#[must_use]
pub fn search_suggestions(query: &str, cursor: usize, shortcuts: &[SearchShortcut]) -> Vec<String> {
    let before: String = query.chars().take(cursor).collect();
    let scanned = scan(&before);
    let partial = if scanned.trailing_open {
        scanned.tokens.last().map_or("", String::as_str)
    } else {
        ""
    };

    match partial.split_once(':') {
        Some((key, typed)) => {
            let typed = typed.to_lowercase();
            shortcuts
                .iter()
                .find(|s| s.key == key)
                .and_then(|s| s.values.as_ref())
                .map(|values| {
                    values
                        .iter()
                        .filter(|v| v.to_lowercase().starts_with(&typed))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }
        None => shortcuts
            .iter()
            .filter(|s| s.key.starts_with(partial))
            .map(|s| format!("{}:", s.key))
            .collect(),
    }
}
