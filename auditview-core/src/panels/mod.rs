//! Summary panels.
//!
//! Panels are classified by kind and each group is handed to its builder:
//! number cards and breakdown tables pass values through, pie charts go
//! through [`pie`], gauges through [`gauge`]. The result is a [`PanelSet`]
//! that renderers draw without looking at raw rows again.

pub mod classify;
pub mod gauge;
pub mod pie;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::format;
use crate::models::Panel;
use classify::classify;
use gauge::{GaugeReading, GaugeSegment};
use pie::{PaletteMode, PieSlice};

/// One row of a number panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberCard {
    pub title: String,
    pub description: Option<String>,
    pub value: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub value: String,
}

/// A table panel: label/value pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownTable {
    pub title: String,
    pub description: Option<String>,
    pub entries: Vec<BreakdownEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub description: Option<String>,
    pub show_labels: bool,
    pub slices: Vec<PieSlice>,
    /// Parallel to `slices`
    pub colors: Vec<String>,
}

impl PieChart {
    /// Build a chart from slices, coloring by palette only
    pub fn from_slices(title: impl Into<String>, slices: Vec<PieSlice>, palette: PaletteMode) -> Self {
        let colors = pie::slice_colors(&slices, None, palette);
        Self {
            title: title.into(),
            description: None,
            show_labels: false,
            slices,
            colors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// One row of a gauge panel, evaluated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeCard {
    pub title: String,
    pub description: Option<String>,
    /// Row `health`, else `type`, else "Value"
    pub label: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub reading: GaugeReading,
    pub segments: Vec<GaugeSegment>,
}

/// Evaluated panels of one view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelSet {
    pub numbers: Vec<NumberCard>,
    pub breakdowns: Vec<BreakdownTable>,
    pub pies: Vec<PieChart>,
    pub gauges: Vec<GaugeCard>,
}

impl PanelSet {
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
            && self.breakdowns.is_empty()
            && self.pies.is_empty()
            && self.gauges.is_empty()
    }
}

/// Classify and evaluate `panels`
pub fn evaluate_panels(panels: &[Panel], palette: PaletteMode) -> PanelSet {
    let classified = classify(panels);

    PanelSet {
        numbers: classified.numbers.iter().flat_map(|p| number_cards(p)).collect(),
        breakdowns: classified.tables.iter().map(|p| breakdown_table(p)).collect(),
        pies: classified
            .pie_charts
            .iter()
            .map(|p| pie_chart(p, palette))
            .collect(),
        gauges: classified.gauges.iter().flat_map(|p| gauge_cards(p)).collect(),
    }
}

fn number_value(panel: &Panel, value: &Value) -> String {
    match &panel.number {
        Some(config) => {
            let precision = config.precision.unwrap_or(0) as usize;
            match value.as_f64().or_else(|| value.as_str().and_then(|s| s.trim().parse().ok())) {
                Some(n) => format!("{n:.precision$}"),
                None => "NaN".to_string(),
            }
        }
        None => format::stringify(value),
    }
}

fn number_cards(panel: &Panel) -> Vec<NumberCard> {
    panel
        .rows
        .iter()
        .map(|row| NumberCard {
            title: panel.name.clone(),
            description: panel.description.clone(),
            value: number_value(panel, row.get("value").unwrap_or(&Value::Null)),
            unit: panel.number.as_ref().and_then(|n| n.unit.clone()),
        })
        .collect()
}

fn breakdown_label(row: &Map<String, Value>, label_field: Option<&str>) -> String {
    let key = label_field.or_else(|| row.keys().map(String::as_str).find(|k| *k != "value"));
    key.and_then(|k| row.get(k))
        .map_or_else(|| format::EMPTY.to_string(), format::stringify)
}

fn breakdown_table(panel: &Panel) -> BreakdownTable {
    BreakdownTable {
        title: panel.name.clone(),
        description: panel.description.clone(),
        entries: panel
            .rows
            .iter()
            .map(|row| BreakdownEntry {
                label: breakdown_label(row, panel.label_field.as_deref()),
                value: row
                    .get("value")
                    .map_or_else(|| format::EMPTY.to_string(), format::stringify),
            })
            .collect(),
    }
}

fn pie_chart(panel: &Panel, palette: PaletteMode) -> PieChart {
    let slices = pie::build(&panel.rows, panel.label_field.as_deref());
    let config = panel.piechart.as_ref();
    let colors = pie::slice_colors(&slices, config.and_then(|c| c.colors.as_ref()), palette);

    PieChart {
        title: panel.name.clone(),
        description: panel.description.clone(),
        show_labels: config.is_some_and(|c| c.show_labels),
        slices,
        colors,
    }
}

fn gauge_label(row: &Map<String, Value>) -> String {
    ["health", "type"]
        .iter()
        .filter_map(|key| row.get(*key))
        .find(|value| format::is_truthy(value))
        .map_or_else(|| "Value".to_string(), format::stringify)
}

fn gauge_cards(panel: &Panel) -> Vec<GaugeCard> {
    let Some(config) = &panel.gauge else {
        tracing::debug!("Gauge panel '{}' has no gauge config, skipping", panel.name);
        return Vec::new();
    };
    let segments = config.segments();

    panel
        .rows
        .iter()
        .map(|row| {
            let value = row.get("value").and_then(Value::as_f64).unwrap_or(0.0);
            GaugeCard {
                title: panel.name.clone(),
                description: panel.description.clone(),
                label: gauge_label(row),
                value,
                min: config.min,
                max: config.max,
                reading: config.evaluate(value),
                segments: segments.clone(),
            }
        })
        .collect()
}
