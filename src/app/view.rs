//! Render-ready snapshot of the grid.
//!
//! A [`GridView`] is computed by [`AppState::compute_view`](super::AppState::compute_view)
//! and contains no behavior beyond formatting: every cell is already fitted to
//! its allocated width and aligned, so a painting layer only needs to place the
//! strings and pick colors for the highlighted and selected flags.

use super::modes::InputMode;
use super::state::Pagination;
use crate::domain::Align;
use crate::layout::ColumnLayout;
use crate::search::ParsedSearch;

/// Marker appended to text cut to fit its cell.
pub const ELLIPSIS: char = '…';

/// Fits `text` into exactly `width` character cells.
///
/// Control characters become spaces. Text that is too long is cut and ends in
/// [`ELLIPSIS`]; text that is too short is padded according to `align`.
///
/// ```rust
/// use listgrid::app::view::fit_cell;
/// use listgrid::domain::Align;
///
/// assert_eq!(fit_cell("status", 8, Align::Right), "  status");
/// assert_eq!(fit_cell("overflowing", 6, Align::Left), "overf…");
/// ```
#[must_use]
pub fn fit_cell(text: &str, width: usize, align: Align) -> String {
    let clean: Vec<char> = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if clean.len() > width {
        if width == 0 {
            return String::new();
        }
        let mut cut: String = clean[..width - 1].iter().collect();
        cut.push(ELLIPSIS);
        return cut;
    }

    let pad = width - clean.len();
    let (left, right) = match align {
        Align::Left => (0, pad),
        Align::Right => (pad, 0),
        Align::Center => (pad / 2, pad - pad / 2),
    };

    let mut out = String::with_capacity(width + 4);
    out.extend(std::iter::repeat(' ').take(left));
    out.extend(clean);
    out.extend(std::iter::repeat(' ').take(right));
    out
}

/// One header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    /// Label plus sort indicator, fitted to the column width.
    pub text: String,
}

/// One visible data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub id: String,
    /// Position in the filtered and sorted set.
    pub index: usize,
    /// Fitted cell texts, in column order.
    pub cells: Vec<String>,
    pub highlighted: bool,
    pub selected: bool,
}

/// Everything a painting layer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub layout: ColumnLayout,
    pub column_gap: usize,
    pub header: Vec<HeaderCell>,
    /// Rows of the current page that fit the available height.
    pub rows: Vec<GridRow>,
    pub pagination: Pagination,
    /// Query text as applied to the list.
    pub query: String,
    pub search: ParsedSearch,
    /// Query text being typed, while in search mode.
    pub search_input: Option<String>,
    pub input_mode: InputMode,
    pub selected_count: usize,
    /// Shown instead of rows when there is nothing to list.
    pub empty_message: Option<String>,
    pub help: String,
}

impl GridView {
    /// `Page 2/3 · 25 items · 1 selected`
    #[must_use]
    pub fn status_line(&self) -> String {
        let p = &self.pagination;
        let mut status = format!(
            "Page {}/{} · {} items",
            if p.total_pages == 0 { 0 } else { p.page + 1 },
            p.total_pages,
            p.total_items
        );
        if self.selected_count > 0 {
            status.push_str(&format!(" · {} selected", self.selected_count));
        }
        status
    }

    /// Plain-text rendition, one string per terminal line.
    ///
    /// Each row starts with a two-cell marker: `>` for the highlighted row and
    /// `*` for selected rows.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let gap = " ".repeat(self.column_gap);
        let mut lines = Vec::with_capacity(self.rows.len() + 4);

        if let Some(input) = &self.search_input {
            lines.push(format!("/{input}"));
        } else if !self.query.is_empty() {
            lines.push(format!("search: {}", self.query));
        }

        let header: Vec<&str> = self.header.iter().map(|h| h.text.as_str()).collect();
        lines.push(format!("  {}", header.join(&gap)));

        match &self.empty_message {
            Some(message) => lines.push(format!("  {message}")),
            None => {
                for row in &self.rows {
                    let marker = match (row.highlighted, row.selected) {
                        (true, true) => ">*",
                        (true, false) => "> ",
                        (false, true) => " *",
                        (false, false) => "  ",
                    };
                    lines.push(format!("{marker}{}", row.cells.join(&gap)));
                }
            }
        }

        lines.push(self.status_line());
        if !self.help.is_empty() {
            lines.push(self.help.clone());
        }
        lines
    }
}
