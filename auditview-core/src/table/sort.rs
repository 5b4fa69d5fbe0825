use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Arrow shown next to the sorted header
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("ascending"),
            Self::Descending => f.write_str("descending"),
        }
    }
}

/// Active sort: accessor key plus direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// Per-table sort state; starts unsorted and is never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<SortSpec>,
}

impl SortState {
    /// Create a new unsorted state
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Select a column. A new key sorts ascending; the same key flips
    /// ascending to descending and descending back to ascending.
    pub fn request(&mut self, key: &str) -> &SortSpec {
        let direction = match &self.active {
            Some(spec) if spec.key == key && spec.direction == SortDirection::Ascending => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        self.active.insert(SortSpec {
            key: key.to_string(),
            direction,
        })
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub const fn active(&self) -> Option<&SortSpec> {
        self.active.as_ref()
    }

    /// Direction for `key` if it is the sorted column
    pub fn direction_for(&self, key: &str) -> Option<SortDirection> {
        self.active
            .as_ref()
            .filter(|spec| spec.key == key)
            .map(|spec| spec.direction)
    }
}

/// Stable sort of `rows` by the cell `cell_of` picks from each row.
///
/// Ties keep their input order in both directions.
pub fn sort_by_cell<R, F>(rows: &mut [R], direction: SortDirection, cell_of: F)
where
    F: Fn(&R) -> &Cell,
{
    rows.sort_by(|a, b| {
        let ordering = cell_of(a).compare(cell_of(b));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Comparator form of [`sort_by_cell`] for callers sorting other containers
pub fn compare_cells(a: &Cell, b: &Cell, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => a.compare(b),
        SortDirection::Descending => b.compare(a),
    }
}
