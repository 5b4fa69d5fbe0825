//! Pie chart data: (label, value) slices and their colors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::format;

/// Fallback chart palette
pub const COLOR_BANK: [&str; 20] = [
    "#4F83EF", "#28C19B", "#F4B23C", "#F25C54", "#9A7DFF", "#21B3D8", "#8BC34A", "#FF8C42",
    "#E8589C", "#5965F2", "#1FB3A3", "#F04E6E", "#B678FA", "#39C76E", "#E5C844", "#7F8FA6",
    "#8E7C70", "#D63A3A", "#2E6FF7", "#0A9C72",
];

/// Row keys that hold the slice value rather than its label
const VALUE_KEYS: [&str; 2] = ["count", "value"];

/// How slices without an explicit color pick one from [`COLOR_BANK`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteMode {
    /// Hash of the label text; a label keeps its color across renders
    #[default]
    LabelHash,
    /// By slice position
    Cyclic,
}

impl std::str::FromStr for PaletteMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "label-hash" | "hash" => Ok(Self::LabelHash),
            "cyclic" => Ok(Self::Cyclic),
            other => Err(crate::Error::Config(format!("Unknown palette mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: Value,
    pub value: f64,
}

impl PieSlice {
    /// Create a new slice
    pub fn new(name: impl Into<Value>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Label text
    pub fn label(&self) -> String {
        format::stringify(&self.name)
    }
}

/// Key holding the label of `row`: `label_field` when given, else the first
/// key that is not a value key
pub fn label_key<'a>(row: &'a Map<String, Value>, label_field: Option<&'a str>) -> Option<&'a str> {
    if let Some(field) = label_field {
        return Some(field);
    }
    row.keys()
        .map(String::as_str)
        .find(|key| !VALUE_KEYS.contains(key))
}

fn slice_value(row: &Map<String, Value>) -> f64 {
    VALUE_KEYS
        .iter()
        .find_map(|key| row.get(*key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Reshape grouped rows into slices.
///
/// The value comes from `count` (else `value`); non-numeric values read 0.
pub fn build(rows: &[Map<String, Value>], label_field: Option<&str>) -> Vec<PieSlice> {
    rows.iter()
        .map(|row| PieSlice {
            name: label_key(row, label_field)
                .and_then(|key| row.get(key))
                .cloned()
                .unwrap_or(Value::Null),
            value: slice_value(row),
        })
        .collect()
}

fn fnv1a(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Palette color for a slice label at position `index`
pub fn palette_color(label: &str, index: usize, mode: PaletteMode) -> &'static str {
    let slot = match mode {
        PaletteMode::LabelHash => (fnv1a(label) % COLOR_BANK.len() as u64) as usize,
        PaletteMode::Cyclic => index % COLOR_BANK.len(),
    };
    COLOR_BANK[slot]
}

/// Colors for `slices`: explicit overrides by label first, then the palette
pub fn slice_colors(
    slices: &[PieSlice],
    overrides: Option<&BTreeMap<String, String>>,
    mode: PaletteMode,
) -> Vec<String> {
    slices
        .iter()
        .enumerate()
        .map(|(index, slice)| {
            let label = slice.label();
            overrides
                .and_then(|colors| colors.get(&label))
                .cloned()
                .unwrap_or_else(|| palette_color(&label, index, mode).to_string())
        })
        .collect()
}

/// Share of the total per slice, in percent; all zero when the total is not
/// positive
pub fn shares(slices: &[PieSlice]) -> Vec<f64> {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    slices
        .iter()
        .map(|s| {
            if total > 0.0 {
                s.value.max(0.0) / total * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_build_uses_first_non_value_key() {
        let slices = build(
            &rows(json!([{"type": "security", "count": 3}, {"type": "compliance", "count": 1}])),
            None,
        );
        assert_eq!(
            slices,
            vec![PieSlice::new("security", 3.0), PieSlice::new("compliance", 1.0)]
        );
    }

    #[test]
    fn test_build_with_count_first_and_explicit_label() {
        let data = rows(json!([{"count": 2, "severity": "high", "team": "ops"}]));
        assert_eq!(build(&data, None)[0].name, json!("high"));
        assert_eq!(build(&data, Some("team"))[0].name, json!("ops"));
        assert_eq!(build(&data, Some("missing"))[0].name, Value::Null);
    }

    #[test]
    fn test_value_fallbacks() {
        let data = rows(json!([{"region": "eu", "value": 4}, {"region": "us", "count": "many"}]));
        let slices = build(&data, None);
        assert!((slices[0].value - 4.0).abs() < f64::EPSILON);
        assert!(slices[1].value.abs() < f64::EPSILON);
    }

    #[test]
    fn test_label_hash_is_stable_and_position_free() {
        let a = vec![PieSlice::new("security", 1.0), PieSlice::new("compliance", 1.0)];
        let b = vec![PieSlice::new("compliance", 1.0), PieSlice::new("security", 1.0)];
        let colors_a = slice_colors(&a, None, PaletteMode::LabelHash);
        let colors_b = slice_colors(&b, None, PaletteMode::LabelHash);
        assert_eq!(colors_a[0], colors_b[1]);
        assert_eq!(colors_a[1], colors_b[0]);
    }

    #[test]
    fn test_overrides_and_cyclic() {
        let slices = vec![PieSlice::new("a", 1.0), PieSlice::new("b", 1.0), PieSlice::new(7, 1.0)];
        let mut overrides = BTreeMap::new();
        overrides.insert("7".to_string(), "#000000".to_string());

        let colors = slice_colors(&slices, Some(&overrides), PaletteMode::Cyclic);
        assert_eq!(colors, vec![COLOR_BANK[0], COLOR_BANK[1], "#000000"]);
    }

    #[test]
    fn test_shares() {
        let slices = vec![PieSlice::new("a", 3.0), PieSlice::new("b", 1.0)];
        assert_eq!(shares(&slices), vec![75.0, 25.0]);
        assert_eq!(shares(&[PieSlice::new("z", 0.0)]), vec![0.0]);
    }
}
