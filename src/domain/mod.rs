//! Domain layer for the listgrid runtime.
//!
//! This module contains the core types shared by every other layer, independent
//! of the Zellij host: the column descriptor model, cell values, the renderer
//! capability, and the error type.
//!
//! # Organization
//!
//! - [`column`]: Column descriptors, cell values, and custom renderers
//! - [`error`]: Error types and result aliases
//! - [`sort`]: Sort state and direction
//!
//! # Examples
//!
//! ```
//! use listgrid::domain::{CellValue, Column, ListItem, Result};
//!
//! struct Task { id: u32, title: String }
//!
//! impl ListItem for Task {
//!     fn item_id(&self) -> String {
//!         self.id.to_string()
//!     }
//! }
//!
//! fn title_column() -> Result<Column<Task>> {
//!     Ok(Column::flexible("title", "Title")
//!         .with_value(|task: &Task| Ok(CellValue::from(task.title.as_str()))))
//! }
//! ```

pub mod column;
pub mod error;
pub mod sort;

pub use column::{
    Align, CellRenderer, CellValue, Column, ColumnWidth, ListItem, RenderableContent, ValueFn,
    VisualNode,
};
pub use error::{GridError, Result};
pub use sort::{SortDirection, SortState};
