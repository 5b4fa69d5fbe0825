//! Table model and sorting.
//!
//! Every tabular block of the report (fixed sections and schema-driven views
//! alike) is a [`TableModel`]: ordered columns bound to accessor keys plus
//! rows of typed [`Cell`]s. Sorting never mutates the model; it produces a
//! row order for the current [`SortState`].

pub mod cell;
pub mod model;
pub mod sort;
pub mod width;

pub use cell::Cell;
pub use model::{TableColumn, TableModel, NO_DATA};
pub use sort::{sort_by_cell, SortDirection, SortSpec, SortState};
pub use width::{column_width, ColumnWidth};
