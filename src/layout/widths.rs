//! Column width allocation.
//!
//! Computes one width per column, in character cells, from the column
//! descriptors and a terminal width budget. Fixed columns are clamped into their
//! bounds first; flexible columns then split what is left, with the integer
//! remainder handed out one cell at a time from the left so the whole budget is
//! consumed.

use crate::domain::{Column, ColumnWidth};

/// Cells taken by the sort indicator (a space plus an arrow) on sortable headers.
pub const SORT_INDICATOR_WIDTH: usize = 2;

/// Cells of padding around every header and cell (one on each side).
pub const CELL_PADDING: usize = 2;

/// Width budget and global bounds for an allocation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Full terminal width in cells.
    pub terminal_width: usize,
    /// Gap between adjacent columns.
    pub column_gap: usize,
    /// Cells reserved outside the columns (borders, outer padding).
    pub reserved_width: usize,
    /// Global lower bound for every column.
    pub min_column_width: usize,
    /// Global upper bound for every column.
    pub max_column_width: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            terminal_width: 80,
            column_gap: 1,
            reserved_width: 4,
            min_column_width: 4,
            max_column_width: 60,
        }
    }
}

/// Result of an allocation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnLayout {
    /// One width per column, in declaration order.
    pub widths: Vec<usize>,
    /// Sum of widths plus inter-column gaps.
    pub total_width: usize,
    /// Whether `total_width + reserved_width` stays within the terminal width.
    pub fits_in_terminal: bool,
    /// Unused budget. Always zero when flexible columns exist.
    pub remaining_width: usize,
}

/// Minimum width that shows `column`'s header label untruncated.
#[must_use]
pub fn header_minimum<T>(column: &Column<T>) -> usize {
    let indicator = if column.sortable { SORT_INDICATOR_WIDTH } else { 0 };
    column.label.chars().count() + indicator + CELL_PADDING
}

/// Clamps `requested` into the column's effective bounds.
///
/// The upper bound is `min(global_max, column.max_width)`; the lower bound is
/// the largest of the global minimum, the column minimum, and the header
/// minimum. When the bounds cross, the lower bound wins so the header stays
/// readable.
#[must_use]
pub fn clamp_width<T>(column: &Column<T>, requested: usize, options: &LayoutOptions) -> usize {
    let upper = column
        .max_width
        .map_or(options.max_column_width, |max| max.min(options.max_column_width));
    let lower = options
        .min_column_width
        .max(column.min_width.unwrap_or(options.min_column_width))
        .max(header_minimum(column));

    requested.min(upper).max(lower)
}

/// Allocates widths for `columns` within `options.terminal_width`.
///
/// # Algorithm
///
/// 1. `available = terminal - reserved - gap * (n - 1)`, saturating at zero
/// 2. Fixed columns: requested width clamped into bounds
/// 3. Flexible columns: `floor(remaining / flex_count)` each, the first
///    `remaining % flex_count` get one extra cell, then each is clamped
/// 4. `fits_in_terminal` is `total_width + reserved_width <= terminal_width`
///
/// # Example
///
/// ```rust
/// use listgrid::domain::Column;
/// use listgrid::layout::{allocate_column_widths, LayoutOptions};
///
/// let columns: Vec<Column<()>> = vec![Column::flexible("a", "a"), Column::fixed("b", "b", 10)];
/// let options = LayoutOptions {
///     terminal_width: 50,
///     column_gap: 1,
///     reserved_width: 4,
///     min_column_width: 8,
///     max_column_width: 50,
/// };
///
/// let layout = allocate_column_widths(&columns, &options);
/// assert_eq!(layout.widths, vec![35, 10]);
/// assert_eq!(layout.total_width, 46);
/// assert!(layout.fits_in_terminal);
/// ```
#[must_use]
pub fn allocate_column_widths<T>(columns: &[Column<T>], options: &LayoutOptions) -> ColumnLayout {
    let _span = tracing::debug_span!(
        "allocate_column_widths",
        columns = columns.len(),
        terminal_width = options.terminal_width
    )
    .entered();

    if columns.is_empty() {
        return ColumnLayout {
            widths: vec![],
            total_width: 0,
            fits_in_terminal: true,
            remaining_width: options.terminal_width.saturating_sub(options.reserved_width),
        };
    }

    let gaps = options.column_gap.saturating_mul(columns.len() - 1);
    let available = options
        .terminal_width
        .saturating_sub(options.reserved_width)
        .saturating_sub(gaps);

    let mut widths: Vec<Option<usize>> = columns
        .iter()
        .map(|column| match column.width {
            ColumnWidth::Fixed(requested) => Some(clamp_width(column, requested, options)),
            ColumnWidth::Flexible => None,
        })
        .collect();

    let fixed_total = widths.iter().flatten().fold(0usize, |acc, w| acc.saturating_add(*w));
    let flex_count = widths.iter().filter(|w| w.is_none()).count();

    if flex_count > 0 {
        let remaining = available.saturating_sub(fixed_total);
        let base = remaining / flex_count;
        let extra = remaining % flex_count;

        for (flex_index, (column, slot)) in columns
            .iter()
            .zip(widths.iter_mut())
            .filter(|(_, slot)| slot.is_none())
            .enumerate()
        {
            let share = base + usize::from(flex_index < extra);
            *slot = Some(clamp_width(column, share, options));
        }
    }

    let widths: Vec<usize> = widths.into_iter().map(|w| w.unwrap_or(0)).collect();
    let content_width = widths.iter().fold(0usize, |acc, w| acc.saturating_add(*w));
    let total_width = content_width.saturating_add(gaps);

    let layout = ColumnLayout {
        fits_in_terminal: total_width.saturating_add(options.reserved_width) <= options.terminal_width,
        remaining_width: if flex_count > 0 {
            0
        } else {
            available.saturating_sub(content_width)
        },
        total_width,
        widths,
    };

    tracing::debug!(
        total_width = layout.total_width,
        fits = layout.fits_in_terminal,
        remaining = layout.remaining_width,
        "column widths allocated"
    );

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(terminal_width: usize) -> LayoutOptions {
        LayoutOptions {
            terminal_width,
            column_gap: 1,
            reserved_width: 4,
            min_column_width: 8,
            max_column_width: 50,
        }
    }

    #[test]
    fn flexible_column_takes_what_fixed_columns_leave() {
        let columns: Vec<Column<()>> = vec![Column::flexible("a", "a"), Column::fixed("b", "b", 10)];
        let layout = allocate_column_widths(&columns, &options(50));

        assert_eq!(layout.widths, vec![35, 10]);
        assert_eq!(layout.total_width, 46);
        assert!(layout.fits_in_terminal);
        assert_eq!(layout.remaining_width, 0);
    }

    #[test]
    fn remainder_goes_to_leading_flexible_columns() {
        let columns: Vec<Column<()>> = vec![
            Column::flexible("a", "a"),
            Column::flexible("b", "b"),
            Column::flexible("c", "c"),
        ];
        // available = 26 - 4 - 2 = 20
        let opts = LayoutOptions {
            min_column_width: 1,
            ..options(26)
        };
        let layout = allocate_column_widths(&columns, &opts);

        assert_eq!(layout.widths, vec![7, 7, 6]);
        assert_eq!(layout.widths.iter().sum::<usize>(), 20);
    }

    #[test]
    fn fixed_width_is_clamped_into_bounds() {
        let columns: Vec<Column<()>> = vec![
            Column::fixed("tiny", "x", 2),
            Column::fixed("huge", "y", 500),
            Column::fixed("capped", "z", 40).with_max_width(20),
            Column::fixed("floored", "w", 9).with_min_width(12),
        ];
        let layout = allocate_column_widths(&columns, &options(200));

        assert_eq!(layout.widths, vec![8, 50, 20, 12]);
        assert_eq!(layout.remaining_width, 200 - 4 - 3 - 90);
    }

    #[test]
    fn header_minimum_beats_configured_maximum() {
        let column: Column<()> = Column::fixed("desc", "Description", 5)
            .sortable()
            .with_max_width(6);
        // "Description" = 11, + indicator 2, + padding 2
        assert_eq!(header_minimum(&column), 15);

        let layout = allocate_column_widths(&[column], &options(80));
        assert_eq!(layout.widths, vec![15]);
    }

    #[test]
    fn overflowing_layout_does_not_fit() {
        let columns: Vec<Column<()>> = vec![Column::fixed("a", "a", 30), Column::fixed("b", "b", 30)];
        let layout = allocate_column_widths(&columns, &options(50));

        assert_eq!(layout.total_width, 61);
        assert!(!layout.fits_in_terminal);
        assert_eq!(layout.remaining_width, 0);
    }

    #[test]
    fn oversized_gap_and_reserve_saturate_instead_of_fitting() {
        let columns: Vec<Column<()>> = vec![
            Column::flexible("a", "a"),
            Column::flexible("b", "b"),
            Column::flexible("c", "c"),
        ];
        let wide_gap = LayoutOptions {
            column_gap: usize::MAX / 2 + 1,
            ..options(80)
        };
        let layout = allocate_column_widths(&columns, &wide_gap);
        assert_eq!(layout.total_width, usize::MAX);
        assert!(!layout.fits_in_terminal);

        let wide_reserve = LayoutOptions {
            reserved_width: usize::MAX,
            ..options(80)
        };
        let layout = allocate_column_widths(&columns, &wide_reserve);
        assert_eq!(layout.widths, vec![8, 8, 8]);
        assert!(!layout.fits_in_terminal);
    }

    #[test]
    fn narrow_terminal_still_respects_minimums() {
        let columns: Vec<Column<()>> = vec![Column::flexible("a", "a"), Column::flexible("b", "b")];
        let layout = allocate_column_widths(&columns, &options(3));

        assert_eq!(layout.widths, vec![8, 8]);
        assert!(!layout.fits_in_terminal);
    }

    #[test]
    fn zero_columns_fit_trivially() {
        let layout = allocate_column_widths::<()>(&[], &options(50));
        assert!(layout.widths.is_empty());
        assert_eq!(layout.total_width, 0);
        assert!(layout.fits_in_terminal);
        assert_eq!(layout.remaining_width, 46);
    }
}
