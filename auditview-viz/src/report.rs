//! Renderer-neutral report structure.
//!
//! A [`Report`] is an ordered list of sections, each made of blocks. Blocks
//! hold display-ready data; only tables keep typed cells so they can be
//! re-sorted interactively.

use auditview_core::stats::BackupDay;
use auditview_core::table::NO_DATA;
use auditview_core::{
    BreakdownTable, Cell, GaugeCard, NumberCard, PieChart, SortState, StatusTone, TableModel,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub description: Option<String>,
    /// Reference time for every relative date in the report
    pub generated_at: DateTime<Utc>,
    pub origin: String,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Every table in display order
    pub fn tables(&self) -> impl Iterator<Item = &TableBlock> {
        self.sections.iter().flat_map(Section::tables)
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut TableBlock> {
        self.sections
            .iter_mut()
            .flat_map(|section| section.blocks.iter_mut())
            .filter_map(|block| match block {
                Block::Table(table) => Some(table),
                _ => None,
            })
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut TableBlock> {
        self.tables_mut().nth(index)
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// Stable anchor, e.g. `incidents` or `view-2`
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    /// Create a new empty section
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Append `block`, dropping empty ones that carry nothing to show
    #[must_use]
    pub fn with(mut self, block: Block) -> Self {
        if !block.is_blank() {
            self.blocks.push(block);
        }
        self
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Block {
    Fields(Vec<Field>),
    Stats(Vec<Stat>),
    Numbers(Vec<NumberCard>),
    Breakdowns(Vec<BreakdownTable>),
    Pies(Vec<PieChart>),
    Gauges(Vec<GaugeCard>),
    Cards(Vec<Card>),
    Calendar(CalendarBlock),
    /// Tables are never blank: an empty one renders its placeholder
    Table(TableBlock),
}

impl Block {
    fn is_blank(&self) -> bool {
        match self {
            Self::Fields(items) => items.is_empty(),
            Self::Stats(items) => items.is_empty(),
            Self::Numbers(items) => items.is_empty(),
            Self::Breakdowns(items) => items.is_empty(),
            Self::Pies(items) => items.iter().all(PieChart::is_empty),
            Self::Gauges(items) => items.is_empty(),
            Self::Cards(items) => items.is_empty(),
            Self::Calendar(calendar) => calendar.days.is_empty(),
            Self::Table(_) => false,
        }
    }
}

/// A labelled value; `tone` marks it as a status badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: String,
    pub value: String,
    pub tone: Option<StatusTone>,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            tone: None,
        }
    }

    pub fn status(label: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            tone: Some(StatusTone::of(&value)),
            label: label.into(),
            value,
        }
    }
}

/// Headline figure above a section table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
    pub detail: Option<String>,
}

impl Stat {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Small titled box: an auth method, a monitoring tool, a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub subtitle: Option<String>,
    pub fields: Vec<Field>,
    pub link: Option<String>,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            fields: Vec::new(),
            link: None,
        }
    }
}

/// Backup outcomes per day between `start` and `end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarBlock {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<BackupDay>,
}

impl CalendarBlock {
    pub fn day(&self, date: NaiveDate) -> Option<&BackupDay> {
        self.days
            .binary_search_by_key(&date, |day| day.date)
            .ok()
            .map(|index| &self.days[index])
    }
}

/// A sortable table and its own sort state
#[derive(Debug, Clone, Serialize)]
pub struct TableBlock {
    pub title: Option<String>,
    pub model: TableModel,
    #[serde(skip)]
    pub sort: SortState,
}

impl TableBlock {
    pub fn new(model: TableModel) -> Self {
        Self {
            title: None,
            model,
            sort: SortState::new(),
        }
    }

    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Header clicked: advance the sort cycle for column `index`
    pub fn request_sort(&mut self, index: usize) {
        if let Some(column) = self.model.columns.get(index) {
            self.sort.request(&column.key);
        }
    }

    /// Rows in current display order
    pub fn rows(&self) -> Vec<&[Cell]> {
        self.model.sorted_rows(&self.sort)
    }

    /// Header text with the sort indicator of the active column
    pub fn header(&self, index: usize) -> String {
        let Some(column) = self.model.columns.get(index) else {
            return String::new();
        };
        match self.sort.direction_for(&column.key) {
            Some(direction) => format!("{} {}", column.header, direction.indicator()),
            None => column.header.clone(),
        }
    }

    pub const fn placeholder() -> &'static str {
        NO_DATA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditview_core::TableColumn;

    fn table() -> TableBlock {
        let mut model = TableModel::new(vec![
            TableColumn::new("Name", "name"),
            TableColumn::badge("Status", "status"),
        ]);
        model.push_row(vec![Cell::text(Some("b")), Cell::text(Some("failed"))]);
        model.push_row(vec![Cell::text(Some("a")), Cell::Null]);
        TableBlock::new(model)
    }

    #[test]
    fn test_request_sort_cycles_per_table() {
        let mut block = table();
        assert_eq!(block.header(0), "Name");

        block.request_sort(0);
        assert_eq!(block.header(0), "Name ▲");
        assert_eq!(block.rows()[0][0], Cell::text(Some("a")));

        block.request_sort(0);
        assert_eq!(block.header(0), "Name ▼");
        assert_eq!(block.rows()[0][0], Cell::text(Some("b")));

        block.request_sort(1);
        assert_eq!(block.header(0), "Name");
        assert_eq!(block.header(1), "Status ▲");
        assert!(block.rows()[0][1].is_null());
    }

    #[test]
    fn test_out_of_range_sort_is_ignored() {
        let mut block = table();
        block.request_sort(9);
        assert!(block.sort.active().is_none());
        assert_eq!(block.header(9), "");
    }

    #[test]
    fn test_blank_blocks_are_dropped() {
        let section = Section::new("s", "S")
            .with(Block::Stats(Vec::new()))
            .with(Block::Fields(vec![Field::new("a", "b")]))
            .with(Block::Table(TableBlock::new(TableModel::default())));
        assert_eq!(section.blocks.len(), 2);
        assert_eq!(section.tables().count(), 1);
    }

    #[test]
    fn test_status_field_tone() {
        assert_eq!(Field::status("Status", "Resolved").tone, Some(StatusTone::Green));
        assert_eq!(Field::new("Id", "7").tone, None);
    }
}
