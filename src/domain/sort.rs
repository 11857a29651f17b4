//! Sort state for the grid.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Applies this direction to an ascending comparison result.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    /// Header glyph for this direction.
    #[must_use]
    pub const fn indicator(self) -> char {
        match self {
            Self::Ascending => '▲',
            Self::Descending => '▼',
        }
    }
}

/// Active sort: column key plus direction. `None` at the use site means unsorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Next state when the user sorts by `column` again.
    ///
    /// Cycles unsorted → ascending → descending → unsorted for the same column;
    /// a different column starts at ascending.
    #[must_use]
    pub fn cycle(current: Option<&Self>, column: &str) -> Option<Self> {
        match current {
            Some(s) if s.column == column => match s.direction {
                SortDirection::Ascending => Some(Self::descending(column)),
                SortDirection::Descending => None,
            },
            _ => Some(Self::ascending(column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_walks_through_directions() {
        let first = SortState::cycle(None, "name");
        assert_eq!(first, Some(SortState::ascending("name")));

        let second = SortState::cycle(first.as_ref(), "name");
        assert_eq!(second, Some(SortState::descending("name")));

        assert_eq!(SortState::cycle(second.as_ref(), "name"), None);
        assert_eq!(
            SortState::cycle(second.as_ref(), "size"),
            Some(SortState::ascending("size"))
        );
    }

    #[test]
    fn descending_reverses_ordering() {
        assert_eq!(SortDirection::Descending.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortDirection::Ascending.apply(Ordering::Less), Ordering::Less);
    }
}
