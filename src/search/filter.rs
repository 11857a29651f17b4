//! Applying a parsed search and a sort to an item set.
//!
//! Both functions work on indices into the caller's item slice so the items
//! themselves are never cloned or reordered.
//!
//! # Matching Rules
//!
//! - **Filters**: a filter key selects the column with the same key
//!   (case-insensitive). Values for one key are ORed, distinct keys are ANDed,
//!   and each value compares case-insensitively with the cell's text. Keys
//!   without a column are ignored.
//! - **Free text**: the text is split on whitespace and lowercased; every token
//!   must fuzzy-match (Skim v2) the item's column texts joined with spaces.

use super::query::ParsedSearch;
use crate::domain::{CellValue, Column, ListItem, SortState};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

fn value_or_empty<T: ListItem>(column: &Column<T>, item: &T) -> CellValue {
    column.value(item).unwrap_or_else(|e| {
        tracing::warn!(column = %column.key, error = %e, "value extraction failed during filtering");
        CellValue::Empty
    })
}

/// Returns the indices of `items` matching `search`, in original order.
#[must_use]
pub fn filter_items<T: ListItem>(
    items: &[T],
    columns: &[Column<T>],
    search: &ParsedSearch,
) -> Vec<usize> {
    let _span = tracing::debug_span!(
        "filter_items",
        total_items = items.len(),
        text_len = search.text.len(),
        filter_keys = search.filters.len()
    )
    .entered();

    let tokens: Vec<String> = search
        .text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    let matcher = if tokens.is_empty() {
        None
    } else {
        Some(SkimMatcherV2::default())
    };

    let filter_columns: Vec<(&Column<T>, &[String])> = search
        .filters
        .iter()
        .filter_map(|(key, values)| {
            let column = columns.iter().find(|c| c.key.eq_ignore_ascii_case(key));
            if column.is_none() {
                tracing::debug!(filter_key = %key, "filter key has no matching column, ignoring");
            }
            column.map(|c| (c, values))
        })
        .collect();

    let matches: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            let passes_filters = filter_columns.iter().all(|(column, values)| {
                let value = value_or_empty(column, item);
                values.iter().any(|v| value.matches_filter(v))
            });
            if !passes_filters {
                return false;
            }

            matcher.as_ref().map_or(true, |m| {
                let haystack = columns
                    .iter()
                    .map(|c| value_or_empty(c, item).to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                tokens.iter().all(|token| m.fuzzy_match(&haystack, token).is_some())
            })
        })
        .map(|(index, _)| index)
        .collect();

    tracing::debug!(matched = matches.len(), "items filtered");
    matches
}

/// Stable-sorts `indices` by the sort column's sort key.
///
/// Leaves `indices` untouched when `sort` is `None` or names a column that is
/// missing or not sortable.
pub fn sort_indices<T: ListItem>(
    items: &[T],
    columns: &[Column<T>],
    indices: &mut [usize],
    sort: Option<&SortState>,
) {
    let Some(sort) = sort else {
        return;
    };
    let Some(column) = columns.iter().find(|c| c.key == sort.column && c.sortable) else {
        tracing::debug!(column = %sort.column, "sort column missing or not sortable");
        return;
    };

    let mut keyed: Vec<(CellValue, usize)> = indices
        .iter()
        .map(|&index| {
            let key = column.sort_value(&items[index]).unwrap_or_else(|e| {
                tracing::warn!(column = %column.key, error = %e, "sort key extraction failed");
                CellValue::Empty
            });
            (key, index)
        })
        .collect();

    keyed.sort_by(|a, b| sort.direction.apply(a.0.total_cmp(&b.0)));

    for (slot, (_, index)) in indices.iter_mut().zip(keyed) {
        *slot = index;
    }
}
