//! Search query handling.
//!
//! Queries mix free text with `key:value` filters. Keys are only recognized
//! when they name a configured [`SearchShortcut`]; anything else stays text.
//!
//! # Modules
//!
//! - [`query`]: Tokenizer, lenient and strict parsers, and query serialization
//! - [`suggest`]: Key and value completion for the token under the cursor
//! - [`validate`]: Value checks against each shortcut's closed value set
//! - [`debounce`]: Quiet-period coalescing of search edits
//! - [`filter`]: Applying a parsed query and a sort to an item set

pub mod debounce;
pub mod filter;
pub mod query;
pub mod suggest;
pub mod validate;

pub use debounce::{Clock, Debouncer, ManualClock, MonotonicClock, DEFAULT_DEBOUNCE_MS};
pub use filter::{filter_items, sort_indices};
pub use query::{
    build_search_query, parse_search_query, tokenize, try_parse_search_query, Filters,
    ParsedSearch, SearchShortcut, MAX_QUERY_LEN,
};
pub use suggest::search_suggestions;
pub use validate::{validate_search_query, SearchValidation, INVALID_SYNTAX_MESSAGE};
