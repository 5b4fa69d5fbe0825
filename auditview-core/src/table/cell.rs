use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use crate::format;
use crate::models::SemanticType;

/// A typed table cell.
///
/// Raw JSON values are converted once, by column type, so that sorting
/// compares like with like and display never re-inspects raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A date-like string; `at` is `None` when it could not be parsed
    DateTime {
        raw: String,
        at: Option<DateTime<Utc>>,
    },
    /// Nanoseconds
    Duration(f64),
    /// Whole elapsed hours, shown as `"5h"` or `"2d 3h"`
    Elapsed {
        hours: i64,
    },
}

impl Cell {
    /// Convert a raw value according to its column's semantic type
    pub fn from_value(value: &Value, semantic_type: SemanticType) -> Self {
        if value.is_null() {
            return Self::Null;
        }

        match semantic_type {
            SemanticType::Datetime => match value {
                Value::String(raw) if format::date_like().is_match(raw) => Self::DateTime {
                    raw: raw.clone(),
                    at: format::parse_datetime(raw),
                },
                other => Self::Text(format::stringify(other)),
            },
            SemanticType::Boolean => Self::Bool(format::is_truthy(value)),
            SemanticType::Number => value
                .as_f64()
                .map_or_else(|| Self::Text(format::stringify(value)), Self::Number),
            SemanticType::Duration => value
                .as_f64()
                .map_or_else(|| Self::Text(format::stringify(value)), Self::Duration),
            SemanticType::String => Self::Text(format::stringify(value)),
        }
    }

    /// Optional text; absent becomes [`Cell::Null`]
    pub fn text(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |s| Self::Text(s.to_string()))
    }

    /// Optional date string; absent becomes [`Cell::Null`]
    pub fn date(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |raw| Self::DateTime {
            raw: raw.to_string(),
            at: format::parse_datetime(raw),
        })
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Display string relative to `now`
    pub fn display(&self, now: DateTime<Utc>) -> String {
        match self {
            Self::Null => format::EMPTY.to_string(),
            Self::Text(text) => text.clone(),
            Self::Number(n) => format::format_number(*n),
            Self::Bool(flag) => format::yes_no(*flag).to_string(),
            Self::DateTime { raw, at } => {
                at.map_or_else(|| raw.clone(), |at| format::relative_time(at, now))
            }
            Self::Duration(nanos) => format::format_duration_ns(*nanos),
            Self::Elapsed { hours } => format::format_hours(*hours),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Duration(_) => 3,
            Self::Elapsed { .. } => 4,
            Self::DateTime { .. } => 5,
            Self::Text(_) => 6,
        }
    }

    /// Total order used for sorting: natural order within a variant, fixed
    /// variant rank across variants, nulls first
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) | (Self::Duration(a), Self::Duration(b)) => {
                a.total_cmp(b)
            }
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Elapsed { hours: a }, Self::Elapsed { hours: b }) => a.cmp(b),
            (
                Self::DateTime { raw: ra, at: Some(a) },
                Self::DateTime { raw: rb, at: Some(b) },
            ) => a.cmp(b).then_with(|| ra.cmp(rb)),
            (Self::DateTime { raw: a, .. }, Self::DateTime { raw: b, .. }) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}
