//! Column width allocation for the grid.
//!
//! The allocator is a pure function of the column descriptors and a
//! [`LayoutOptions`] budget. It is re-run on every terminal resize; identical
//! inputs always produce an identical [`ColumnLayout`].
//!
//! # Modules
//!
//! - [`widths`]: Two-phase fixed/flexible width allocation

pub mod widths;

pub use widths::{
    allocate_column_widths, clamp_width, header_minimum, ColumnLayout, LayoutOptions,
    CELL_PADDING, SORT_INDICATOR_WIDTH,
};
