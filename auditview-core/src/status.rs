//! Status and severity tones, and the fixed category palettes.

use serde::Serialize;

/// Color family of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Green,
    Blue,
    Red,
    Yellow,
    Orange,
    Gray,
}

impl StatusTone {
    /// Tone for a status or severity string (case-insensitive)
    pub fn of(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "completed" | "resolved" | "successful" | "success" => Self::Green,
            "pending" | "in-progress" | "mitigated" | "low" | "running" => Self::Blue,
            "failed" | "critical" | "open" => Self::Red,
            "investigating" | "medium" => Self::Yellow,
            "high" => Self::Orange,
            _ => Self::Gray,
        }
    }

    /// Foreground hex color
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Green => "#15803d",
            Self::Blue => "#1d4ed8",
            Self::Red => "#b91c1c",
            Self::Yellow => "#a16207",
            Self::Orange => "#c2410c",
            Self::Gray => "#374151",
        }
    }

    /// Badge background hex color
    pub const fn background_hex(self) -> &'static str {
        match self {
            Self::Green => "#dcfce7",
            Self::Blue => "#dbeafe",
            Self::Red => "#fee2e2",
            Self::Yellow => "#fef9c3",
            Self::Orange => "#ffedd5",
            Self::Gray => "#f3f4f6",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Gray => "gray",
        }
    }
}

/// Severity → chart color
pub fn severity_color(severity: &str) -> Option<&'static str> {
    match severity.to_lowercase().as_str() {
        "critical" => Some("#ef4444"),
        "high" => Some("#f97316"),
        "medium" => Some("#eab308"),
        "low" => Some("#3b82f6"),
        _ => None,
    }
}

/// Finding type → chart color
pub fn finding_type_color(kind: &str) -> Option<&'static str> {
    match kind.to_lowercase().as_str() {
        "security" => Some("#ef4444"),
        "compliance" => Some("#3b82f6"),
        "performance" => Some("#8b5cf6"),
        "reliability" => Some("#10b981"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tones() {
        assert_eq!(StatusTone::of("Successful"), StatusTone::Green);
        assert_eq!(StatusTone::of("in-progress"), StatusTone::Blue);
        assert_eq!(StatusTone::of("FAILED"), StatusTone::Red);
        assert_eq!(StatusTone::of("investigating"), StatusTone::Yellow);
        assert_eq!(StatusTone::of("high"), StatusTone::Orange);
        assert_eq!(StatusTone::of("archived"), StatusTone::Gray);
    }

    #[test]
    fn test_category_colors() {
        assert_eq!(severity_color("High"), Some("#f97316"));
        assert_eq!(finding_type_color("reliability"), Some("#10b981"));
        assert_eq!(finding_type_color("cost"), None);
    }
}
