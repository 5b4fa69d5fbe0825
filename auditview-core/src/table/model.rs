use serde::Serialize;
use serde_json::Value;

use super::{column_width, sort::compare_cells, Cell, ColumnWidth, SortState};
use crate::models::ColumnDef;

/// Shown in place of rows when a table is empty
pub const NO_DATA: &str = "No data available";

static NULL_CELL: Cell = Cell::Null;

/// A column bound to its row accessor key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub header: String,
    pub key: String,
    /// Render cells as status badges
    pub badge: bool,
}

impl TableColumn {
    /// Create a new plain column
    pub fn new(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
            badge: false,
        }
    }

    /// Create a new status badge column
    pub fn badge(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            badge: true,
            ..Self::new(header, key)
        }
    }

    pub fn width(&self) -> ColumnWidth {
        column_width(&self.key)
    }
}

/// Ordered columns and rows of typed cells
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableModel {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableModel {
    /// Create a new empty table with the given columns
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Bind schema columns to `col_<index>` accessors and type each row.
    ///
    /// Short rows read their missing cells as null; surplus values are dropped.
    pub fn from_view(columns: &[ColumnDef], rows: &[Vec<Value>]) -> Self {
        let table_columns = columns
            .iter()
            .enumerate()
            .map(|(index, col)| TableColumn::new(col.name.clone(), format!("col_{index}")))
            .collect();

        let typed_rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(index, col)| {
                        row.get(index)
                            .map_or(Cell::Null, |value| Cell::from_value(value, col.semantic_type))
                    })
                    .collect()
            })
            .collect();

        Self {
            columns: table_columns,
            rows: typed_rows,
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.key == key)
    }

    /// Cell accessor by row position and column key
    pub fn cell(&self, row: usize, key: &str) -> Option<&Cell> {
        let column = self.column_index(key)?;
        self.rows.get(row)?.get(column)
    }

    /// Row positions in display order for `state`, always derived from the
    /// original row order. An unknown sort key leaves rows unsorted.
    pub fn sorted_indices(&self, state: &SortState) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        let Some(spec) = state.active() else {
            return indices;
        };
        let Some(column) = self.column_index(&spec.key) else {
            return indices;
        };

        let cell_at = |index: usize| self.rows[index].get(column).unwrap_or(&NULL_CELL);
        indices.sort_by(|&a, &b| compare_cells(cell_at(a), cell_at(b), spec.direction));
        indices
    }

    /// Rows in display order for `state`
    pub fn sorted_rows(&self, state: &SortState) -> Vec<&[Cell]> {
        self.sorted_indices(state)
            .into_iter()
            .map(|index| self.rows[index].as_slice())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SemanticType;
    use serde_json::json;

    fn sample() -> TableModel {
        let columns = vec![
            ColumnDef::new("Host", SemanticType::String),
            ColumnDef::new("Load", SemanticType::Number),
            ColumnDef::new("Healthy", SemanticType::Boolean),
        ];
        let rows = vec![
            vec![json!("db-1"), json!(0.7), json!(true)],
            vec![json!("api"), json!(0.2)],
            vec![json!("cache"), json!(0.7), json!(false), json!("extra")],
        ];
        TableModel::from_view(&columns, &rows)
    }

    #[test]
    fn test_from_view_binds_accessors() {
        let table = sample();
        let keys: Vec<&str> = table.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["col_0", "col_1", "col_2"]);
        assert_eq!(table.cell(1, "col_2"), Some(&Cell::Null));
        assert_eq!(table.rows[2].len(), 3);
        assert_eq!(table.cell(0, "col_1"), Some(&Cell::Number(0.7)));
    }

    #[test]
    fn test_sorted_indices_from_original_order() {
        let table = sample();
        let mut state = SortState::new();
        assert_eq!(table.sorted_indices(&state), vec![0, 1, 2]);

        state.request("col_1");
        assert_eq!(table.sorted_indices(&state), vec![1, 0, 2]);

        state.request("col_1");
        assert_eq!(table.sorted_indices(&state), vec![0, 2, 1]);

        state.request("col_0");
        let hosts: Vec<String> = table
            .sorted_rows(&state)
            .iter()
            .map(|row| format!("{:?}", row[0]))
            .collect();
        assert_eq!(hosts, vec![r#"Text("api")"#, r#"Text("cache")"#, r#"Text("db-1")"#]);
    }

    #[test]
    fn test_unknown_sort_key_is_ignored() {
        let table = sample();
        let mut state = SortState::new();
        state.request("missing");
        assert_eq!(table.sorted_indices(&state), vec![0, 1, 2]);
    }
}
