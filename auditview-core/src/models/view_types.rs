//! Schema-driven view types.
//!
//! A view is self-describing: typed columns plus row-major data, and a list of
//! summary panels. Producers decide the shape; this crate only interprets it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::panels::gauge::GaugeConfig;

/// Logical data kind of a view column.
///
/// Unrecognised type names fall back to [`SemanticType::String`] so that a
/// producer adding a new type never breaks rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Number,
    Boolean,
    Datetime,
    Duration,
    #[default]
    #[serde(other)]
    String,
}

impl SemanticType {
    /// Get all semantic types
    pub const fn all() -> [Self; 5] {
        [
            Self::String,
            Self::Number,
            Self::Boolean,
            Self::Datetime,
            Self::Duration,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column descriptor; its position in the column list is its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub semantic_type: SemanticType,
}

impl ColumnDef {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

/// Discriminant of a summary panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Number,
    Table,
    Piechart,
    Gauge,
    /// Missing or unrecognised kind; never rendered
    #[default]
    #[serde(other)]
    Unknown,
}

/// Pie chart options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PieConfig {
    pub show_labels: bool,
    /// Explicit label → color overrides
    pub colors: Option<BTreeMap<String, String>>,
}

/// Number panel options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberConfig {
    /// Fixed fraction digits
    pub precision: Option<u32>,
    pub unit: Option<String>,
}

/// A summary panel: a named slice of report data plus kind-specific options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: PanelKind,
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
    #[serde(default)]
    pub gauge: Option<GaugeConfig>,
    #[serde(default)]
    pub piechart: Option<PieConfig>,
    #[serde(default)]
    pub number: Option<NumberConfig>,
    /// Row key holding the label; when absent the first non-value key is used
    #[serde(default)]
    pub label_field: Option<String>,
}

impl Panel {
    /// Create a new empty panel of the given kind
    pub fn new(name: impl Into<String>, kind: PanelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Map<String, Value>>) -> Self {
        self.rows = rows;
        self
    }
}

/// Typed columns, row-major data and summary panels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewResult {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
    #[serde(alias = "summaries")]
    pub panels: Vec<Panel>,
}

impl ViewResult {
    /// True when the view carries a tabular part
    pub fn has_table(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// A view as attached to an application, with its display title
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedView {
    pub title: String,
    pub icon: Option<String>,
    pub view: ViewResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_semantic_type_is_string() {
        let col: ColumnDef = serde_json::from_value(json!({"name": "x", "type": "geo"})).unwrap();
        assert_eq!(col.semantic_type, SemanticType::String);

        let col: ColumnDef = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert_eq!(col.semantic_type, SemanticType::String);
    }

    #[test]
    fn test_known_semantic_types_round_trip_by_name() {
        for semantic_type in SemanticType::all() {
            let parsed: SemanticType = serde_json::from_value(json!(semantic_type.as_str())).unwrap();
            assert_eq!(parsed, semantic_type);
        }
    }

    #[test]
    fn test_panel_kind_parsing() {
        let panel: Panel = serde_json::from_value(json!({"name": "a", "type": "gauge"})).unwrap();
        assert_eq!(panel.kind, PanelKind::Gauge);

        let panel: Panel = serde_json::from_value(json!({"name": "a", "kind": "piechart"})).unwrap();
        assert_eq!(panel.kind, PanelKind::Piechart);

        let panel: Panel = serde_json::from_value(json!({"name": "a", "type": "heatmap"})).unwrap();
        assert_eq!(panel.kind, PanelKind::Unknown);

        let panel: Panel = serde_json::from_value(json!({"name": "a"})).unwrap();
        assert_eq!(panel.kind, PanelKind::Unknown);
    }

    #[test]
    fn test_row_key_order_is_preserved() {
        let panel: Panel = serde_json::from_value(json!({
            "name": "by type",
            "type": "piechart",
            "rows": [{"type": "security", "count": 3, "area": "x"}]
        }))
        .unwrap();
        let keys: Vec<&str> = panel.rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["type", "count", "area"]);
    }

    #[test]
    fn test_view_accepts_summaries_alias() {
        let view: ViewResult = serde_json::from_value(json!({
            "columns": [{"name": "n", "type": "number"}],
            "rows": [[1]],
            "summaries": [{"name": "total", "type": "number", "rows": [{"value": 1}]}]
        }))
        .unwrap();
        assert!(view.has_table());
        assert_eq!(view.panels.len(), 1);
    }
}
