//! Search query tokenizing, parsing, and serialization.
//!
//! A query is a space-separated list of tokens. Tokens of the form `key:value`
//! whose key names a known [`SearchShortcut`] become filters; everything else,
//! including `key:value` tokens with an unknown key, is free text. Quotes group
//! words into one token and unbalanced quotes are recovered silently.
//!
//! # Example
//!
//! ```rust
//! use listgrid::search::{parse_search_query, SearchShortcut};
//!
//! let shortcuts = vec![SearchShortcut::new("status", "Status").with_values(["done", "todo"])];
//! let parsed = parse_search_query(r#"status:done urgent task "needs review""#, &shortcuts);
//!
//! assert_eq!(parsed.text, "urgent task needs review");
//! assert_eq!(parsed.filters.get("status"), Some(&["done".to_string()][..]));
//! ```

use crate::domain::{GridError, Result};
use serde::{Deserialize, Serialize};

/// Longest query accepted by [`try_parse_search_query`], in bytes.
pub const MAX_QUERY_LEN: usize = 4096;

/// A named search filter with an optional closed set of accepted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchShortcut {
    /// Filter key as typed before the colon.
    pub key: String,
    /// Human-readable name used in validation messages.
    pub label: String,
    /// Accepted values. `None` accepts anything.
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

impl SearchShortcut {
    /// Creates a shortcut that accepts any value.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            values: None,
        }
    }

    /// Restricts the shortcut to a closed set of values.
    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Whether `value` is acceptable for this shortcut.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.values
            .as_ref()
            .map_or(true, |values| values.iter().any(|v| v == value))
    }
}

/// Filter values keyed by shortcut key, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Filters(Vec<(String, Vec<String>)>);

impl Filters {
    /// Values recorded for `key`, in the order they were found.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Appends `value` under `key`, creating the key at the end if new.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.0.push((key.to_string(), vec![value])),
        }
    }

    /// Iterates `(key, values)` pairs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        let mut filters = Self::default();
        for (key, values) in iter {
            let key = key.into();
            for value in values {
                filters.push(&key, value);
            }
        }
        filters
    }
}

/// Result of parsing a search query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedSearch {
    /// Residual free text, space-joined and trimmed.
    pub text: String,
    /// Recognized filters.
    pub filters: Filters,
}

impl ParsedSearch {
    /// True when there is neither free text nor any filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.filters.is_empty()
    }
}

/// Tokenizer output: the tokens plus whether the input ended mid-token.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    pub tokens: Vec<String>,
    /// The last token was still open at end of input (no trailing space, or an
    /// unterminated quote).
    pub trailing_open: bool,
}

pub(crate) fn scan(input: &str) -> Scan {
    let mut scan = Scan::default();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    for ch in input.chars() {
        match ch {
            '"' | '\'' if prev == Some('\\') => {
                current.pop();
                current.push(ch);
            }
            '"' | '\'' => match quote {
                None => quote = Some(ch),
                Some(open) if open == ch => quote = None,
                Some(_) => current.push(ch),
            },
            ' ' if quote.is_none() => {
                if !current.is_empty() {
                    scan.tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
        prev = Some(ch);
    }

    scan.trailing_open = quote.is_some() || !current.is_empty();
    if !current.is_empty() {
        scan.tokens.push(current);
    }
    scan
}

/// Splits `input` into tokens, honoring `"` and `'` quoting.
///
/// Quote characters are not part of the token. An escaped quote (`\"`) is
/// kept literally without its backslash. An unterminated quote still yields
/// its accumulated content.
///
/// ```rust
/// use listgrid::search::tokenize;
///
/// assert_eq!(tokenize(r#"a "b c" 'd"e'"#), vec!["a", "b c", "d\"e"]);
/// assert_eq!(tokenize(r#"open "quote here"#), vec!["open", "quote here"]);
/// ```
#[must_use]
pub fn tokenize(input: &str) -> Vec<String> {
    scan(input).tokens
}

/// Splits a token at an interior colon into `(key, value)`.
fn split_filter(token: &str) -> Option<(&str, &str)> {
    let colon = token.find(':')?;
    if colon == 0 || colon + 1 >= token.len() {
        return None;
    }
    Some((&token[..colon], &token[colon + 1..]))
}

/// Parses `query` into free text and recognized filters.
///
/// Never fails; malformed quoting is recovered and unknown filter keys fall
/// back to free text.
#[must_use]
pub fn parse_search_query(query: &str, shortcuts: &[SearchShortcut]) -> ParsedSearch {
    let mut text = Vec::new();
    let mut filters = Filters::default();

    for token in tokenize(query) {
        match split_filter(&token) {
            Some((key, value)) if shortcuts.iter().any(|s| s.key == key) => {
                filters.push(key, value);
            }
            _ => text.push(token),
        }
    }

    ParsedSearch {
        text: text.join(" ").trim().to_string(),
        filters,
    }
}

/// Strict variant of [`parse_search_query`].
///
/// # Errors
///
/// Returns [`GridError::InvalidQuery`] when the query is longer than
/// [`MAX_QUERY_LEN`] bytes or contains a control character other than tab.
pub fn try_parse_search_query(query: &str, shortcuts: &[SearchShortcut]) -> Result<ParsedSearch> {
    if query.len() > MAX_QUERY_LEN {
        return Err(GridError::InvalidQuery(format!(
            "query is {} bytes, limit is {MAX_QUERY_LEN}",
            query.len()
        )));
    }
    if let Some(ch) = query.chars().find(|c| c.is_control() && *c != '\t') {
        return Err(GridError::InvalidQuery(format!(
            "control character U+{:04X}",
            u32::from(ch)
        )));
    }
    Ok(parse_search_query(query, shortcuts))
}

fn quote_value(value: &str) -> String {
    let escaped = value.replace('"', "\\\"").replace('\'', "\\'");
    if escaped.contains(' ') {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// Serializes free text and filters back into a query string.
///
/// ```rust
/// use listgrid::search::{build_search_query, Filters};
///
/// let filters: Filters = [("status", vec!["in review".to_string()])].into_iter().collect();
/// assert_eq!(build_search_query("bug", &filters), r#"bug status:"in review""#);
/// ```
#[must_use]
pub fn build_search_query(text: &str, filters: &Filters) -> String {
    let mut parts = Vec::new();
    let text = text.trim();
    if !text.is_empty() {
        parts.push(text.to_string());
    }
    for (key, values) in filters.iter() {
        for value in values {
            parts.push(format!("{key}:{}", quote_value(value)));
        }
    }
    parts.join(" ")
}
