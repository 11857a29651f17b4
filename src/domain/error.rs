//! Error types for the listgrid runtime.
//!
//! This module defines the centralized error type [`GridError`] and a type alias
//! [`Result`] used throughout the crate. All errors are implemented with the
//! `thiserror` crate.
//!
//! Most grid operations never fail: out-of-range pages are clamped, malformed
//! quoting is recovered, and unknown filter keys fall back to free text. The
//! variants below cover the remaining boundaries: configuration and keymap
//! loading, the strict query entry point, and collaborator-supplied cell
//! extractors and renderers.

use thiserror::Error;

/// The main error type for listgrid operations.
///
/// # Examples
///
/// ```
/// use listgrid::GridError;
///
/// fn load_keymap() -> Result<(), GridError> {
///     Err(GridError::Keymap("unknown key name `hyper`".to_string()))
/// }
///
/// assert!(load_keymap().is_err());
/// ```
#[derive(Debug, Error)]
pub enum GridError {
    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A key binding trigger could not be parsed.
    ///
    /// Produced by [`Trigger`](crate::app::keymap::Trigger) parsing and by
    /// keymap files naming an unknown logical action.
    #[error("Keymap error: {0}")]
    Keymap(String),

    /// A search query was rejected by the strict parser.
    ///
    /// The lenient parser never produces this; it is surfaced to users only as a
    /// generic validation message.
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    /// A column value extractor failed for one item.
    #[error("Failed to extract `{column}`: {message}")]
    Extract {
        /// Key of the column whose extractor failed.
        column: String,
        /// Collaborator-provided failure description.
        message: String,
    },

    /// A custom cell renderer failed.
    #[error("Render error: {0}")]
    Render(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML keymap file could not be deserialized.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GridError {
    /// Builds an [`GridError::Extract`] for the given column.
    pub fn extract(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extract {
            column: column.into(),
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for listgrid operations.
pub type Result<T> = std::result::Result<T, GridError>;
