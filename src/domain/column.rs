//! Column descriptors, cell values, and the cell renderer capability.
//!
//! A [`Column`] describes one grid column: its key, header label, requested
//! width (fixed or flexible), optional bounds, sortability, alignment, and the
//! optional collaborator-supplied functions that turn an item into a cell.
//! Column descriptors are built once per view and are read-only afterwards.
//!
//! Extractors and renderers are fallible. Failures are caught per cell by
//! [`Column::cell_content`], logged, and replaced with an empty cell so a single
//! malformed row never aborts the rest of the page.

use super::error::Result;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// An item that can be shown in the grid.
///
/// `item_id` must be unique across the item set; selection is tracked by these
/// identifiers. `field` is the fallback lookup for columns that have no value
/// extractor.
pub trait ListItem {
    /// Unique identifier used by the selection set.
    fn item_id(&self) -> String;

    /// Returns the value of the named field, if the item exposes one.
    fn field(&self, _key: &str) -> Option<CellValue> {
        None
    }
}

/// A primitive cell value produced by a column extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// No value. Rendered as an empty cell and sorted first.
    Empty,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl CellValue {
    const fn rank(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order used for sorting: `Empty < Bool < Number < Text`.
    ///
    /// Numbers compare with [`f64::total_cmp`]; text compares case-insensitively
    /// first and falls back to a byte comparison to keep the order total.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Case-insensitive equality against a filter value.
    #[must_use]
    pub fn matches_filter(&self, value: &str) -> bool {
        self.to_string().to_lowercase() == value.to_lowercase()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for CellValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// An opaque visual node supplied by the painting layer.
///
/// The core never inspects a node beyond asking for a plain-text fallback,
/// which is what gets fitted into the allocated column width.
pub trait VisualNode: fmt::Debug + Send + Sync {
    /// Plain-text rendition of the node.
    fn plain_text(&self) -> String;
}

/// Content produced by a [`CellRenderer`].
#[derive(Debug, Clone)]
pub enum RenderableContent {
    /// Primitive text.
    Text(String),
    /// Primitive number.
    Number(f64),
    /// Painting-layer node, opaque to the core.
    Node(Arc<dyn VisualNode>),
}

impl RenderableContent {
    /// Plain-text rendition used for width fitting.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => CellValue::Number(*n).to_string(),
            Self::Node(node) => node.plain_text(),
        }
    }
}

impl From<CellValue> for RenderableContent {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Number(n) => Self::Number(n),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Custom cell rendering capability.
///
/// Implemented for any `Fn(&CellValue, &T, usize) -> Result<RenderableContent>`
/// closure, so simple renderers need no dedicated type.
pub trait CellRenderer<T>: Send + Sync {
    /// Renders the extracted `value` of `item` at the page-relative `row_index`.
    ///
    /// # Errors
    ///
    /// Implementations return [`GridError::Render`](super::GridError::Render)
    /// when the cell cannot be produced. The caller substitutes an empty cell.
    fn render(&self, value: &CellValue, item: &T, row_index: usize) -> Result<RenderableContent>;
}

impl<T, F> CellRenderer<T> for F
where
    F: Fn(&CellValue, &T, usize) -> Result<RenderableContent> + Send + Sync,
{
    fn render(&self, value: &CellValue, item: &T, row_index: usize) -> Result<RenderableContent> {
        self(value, item, row_index)
    }
}

/// Requested column width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Fixed number of character cells (still clamped to the column bounds).
    Fixed(usize),
    /// Receives a share of the width left over after fixed columns.
    Flexible,
}

/// Horizontal alignment of cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Pad on the right.
    #[default]
    Left,
    /// Pad evenly on both sides (extra cell on the right).
    Center,
    /// Pad on the left.
    Right,
}

/// Fallible item-to-value extraction function.
pub type ValueFn<T> = Arc<dyn Fn(&T) -> Result<CellValue> + Send + Sync>;

/// Column descriptor.
///
/// # Example
///
/// ```rust
/// use listgrid::domain::{Align, CellValue, Column, ColumnWidth};
///
/// struct Row { name: String, size: usize }
///
/// let name: Column<Row> = Column::flexible("name", "Name")
///     .sortable()
///     .with_value(|row: &Row| Ok(CellValue::from(row.name.as_str())));
/// let size: Column<Row> = Column::fixed("size", "Size", 8)
///     .align(Align::Right)
///     .with_value(|row: &Row| Ok(CellValue::from(row.size)));
///
/// assert_eq!(name.width, ColumnWidth::Flexible);
/// assert!(!size.sortable);
/// ```
pub struct Column<T> {
    /// Unique column key. Also the filter key used by item filtering.
    pub key: String,
    /// Header label.
    pub label: String,
    /// Requested width.
    pub width: ColumnWidth,
    /// Per-column lower bound.
    pub min_width: Option<usize>,
    /// Per-column upper bound.
    pub max_width: Option<usize>,
    /// Whether the column shows a sort indicator and accepts sorting.
    pub sortable: bool,
    /// Cell alignment.
    pub align: Align,
    value: Option<ValueFn<T>>,
    sort_key: Option<ValueFn<T>>,
    renderer: Option<Arc<dyn CellRenderer<T>>>,
}

impl<T> Column<T> {
    /// Creates a column with the given requested width.
    pub fn new(key: impl Into<String>, label: impl Into<String>, width: ColumnWidth) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width,
            min_width: None,
            max_width: None,
            sortable: false,
            align: Align::Left,
            value: None,
            sort_key: None,
            renderer: None,
        }
    }

    /// Creates a fixed-width column.
    pub fn fixed(key: impl Into<String>, label: impl Into<String>, width: usize) -> Self {
        Self::new(key, label, ColumnWidth::Fixed(width))
    }

    /// Creates a flexible column.
    pub fn flexible(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, ColumnWidth::Flexible)
    }

    #[must_use]
    pub fn with_min_width(mut self, min_width: usize) -> Self {
        self.min_width = Some(min_width);
        self
    }

    #[must_use]
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = Some(max_width);
        self
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Sets the value extractor.
    #[must_use]
    pub fn with_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<CellValue> + Send + Sync + 'static,
    {
        self.value = Some(Arc::new(f));
        self
    }

    /// Sets the sort-key extractor. Without one, sorting uses the value.
    #[must_use]
    pub fn with_sort_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<CellValue> + Send + Sync + 'static,
    {
        self.sort_key = Some(Arc::new(f));
        self
    }

    /// Sets a custom cell renderer.
    #[must_use]
    pub fn with_renderer<R>(mut self, renderer: R) -> Self
    where
        R: CellRenderer<T> + 'static,
    {
        self.renderer = Some(Arc::new(renderer));
        self
    }
}

impl<T: ListItem> Column<T> {
    /// Extracts this column's value from `item`.
    ///
    /// Falls back to [`ListItem::field`] when no extractor is set, and to
    /// [`CellValue::Empty`] when the item has no such field.
    ///
    /// # Errors
    ///
    /// Propagates the extractor's error.
    pub fn value(&self, item: &T) -> Result<CellValue> {
        match &self.value {
            Some(f) => f(item),
            None => Ok(item.field(&self.key).unwrap_or(CellValue::Empty)),
        }
    }

    /// Extracts the value used for sorting.
    ///
    /// # Errors
    ///
    /// Propagates the extractor's error.
    pub fn sort_value(&self, item: &T) -> Result<CellValue> {
        match &self.sort_key {
            Some(f) => f(item),
            None => self.value(item),
        }
    }

    /// Produces the content of this column's cell for `item`.
    ///
    /// Never fails: extractor and renderer errors are logged and replaced by an
    /// empty cell.
    pub fn cell_content(&self, item: &T, row_index: usize) -> RenderableContent {
        let value = self.value(item).unwrap_or_else(|e| {
            tracing::warn!(column = %self.key, row_index, error = %e, "cell value extraction failed");
            CellValue::Empty
        });

        match &self.renderer {
            Some(renderer) => renderer.render(&value, item, row_index).unwrap_or_else(|e| {
                tracing::warn!(column = %self.key, row_index, error = %e, "cell renderer failed");
                RenderableContent::Text(String::new())
            }),
            None => value.into(),
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            width: self.width,
            min_width: self.min_width,
            max_width: self.max_width,
            sortable: self.sortable,
            align: self.align,
            value: self.value.clone(),
            sort_key: self.sort_key.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("max_width", &self.max_width)
            .field("sortable", &self.sortable)
            .field("align", &self.align)
            .field("has_renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}
