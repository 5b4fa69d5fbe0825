//! Gauge evaluation: clamped percentage and threshold color band.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Color used when a gauge has no thresholds
pub const DEFAULT_GAUGE_COLOR: &str = "#10b981";

/// A (value, color) band boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub value: f64,
    pub color: String,
}

impl Threshold {
    /// Create a new threshold
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self {
            value,
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub thresholds: Vec<Threshold>,
}

/// Evaluated gauge position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeReading {
    /// Always within `[0, 100]`
    pub percentage: f64,
    pub color: String,
}

/// One colored arc of the threshold track, in percent of the range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSegment {
    pub start: f64,
    pub end: f64,
    pub color: String,
}

fn by_value(a: &Threshold, b: &Threshold) -> Ordering {
    a.value
        .total_cmp(&b.value)
        .then_with(|| a.color.cmp(&b.color))
}

/// Thresholds in ascending order; equal values are ordered by color so that
/// input order never matters
pub fn sorted_thresholds(thresholds: &[Threshold]) -> Vec<&Threshold> {
    let mut sorted: Vec<&Threshold> = thresholds.iter().collect();
    sorted.sort_by(|a, b| by_value(a, b));
    sorted
}

/// Position of `value` within `[min, max]` as a percentage in `[0, 100]`.
///
/// An empty range reads 100 when `value >= min` and 0 otherwise; NaN reads 0.
#[allow(clippy::float_cmp)]
pub fn percentage(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if max == min {
        return if value >= min { 100.0 } else { 0.0 };
    }

    let raw = (value - min) / (max - min) * 100.0;
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

/// Color of the band `value` falls in.
///
/// Below every threshold the lowest band's color applies; without thresholds
/// the default color does.
pub fn band_color(value: f64, thresholds: &[Threshold]) -> String {
    let sorted = sorted_thresholds(thresholds);

    for (i, current) in sorted.iter().enumerate() {
        let below_next = sorted.get(i + 1).map_or(true, |next| value < next.value);
        if below_next && value >= current.value {
            return current.color.clone();
        }
    }

    sorted
        .first()
        .map_or_else(|| DEFAULT_GAUGE_COLOR.to_string(), |lowest| lowest.color.clone())
}

/// Evaluate a gauge
pub fn evaluate(value: f64, min: f64, max: f64, thresholds: &[Threshold]) -> GaugeReading {
    GaugeReading {
        percentage: percentage(value, min, max),
        color: band_color(value, thresholds),
    }
}

/// Threshold track arcs: each band runs from its threshold to the next one,
/// the last to 100%
pub fn segments(min: f64, max: f64, thresholds: &[Threshold]) -> Vec<GaugeSegment> {
    let sorted = sorted_thresholds(thresholds);
    sorted
        .iter()
        .enumerate()
        .map(|(i, current)| GaugeSegment {
            start: percentage(current.value, min, max),
            end: sorted
                .get(i + 1)
                .map_or(100.0, |next| percentage(next.value, min, max)),
            color: current.color.clone(),
        })
        .collect()
}

impl GaugeConfig {
    /// Evaluate `value` against this gauge's range and thresholds
    pub fn evaluate(&self, value: f64) -> GaugeReading {
        evaluate(value, self.min, self.max, &self.thresholds)
    }

    pub fn segments(&self) -> Vec<GaugeSegment> {
        segments(self.min, self.max, &self.thresholds)
    }
}
