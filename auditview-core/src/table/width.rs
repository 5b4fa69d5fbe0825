/// Pixels per terminal column when a renderer maps widths to characters
const PX_PER_CHAR: u16 = 8;

/// Static width class of a column, looked up by accessor key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Takes the remaining space, never narrower than `min_px`
    Fill { min_px: u16 },
    Fixed { px: u16 },
}

impl ColumnWidth {
    /// Minimum width in pixels
    pub const fn min_px(self) -> u16 {
        match self {
            Self::Fill { min_px } => min_px,
            Self::Fixed { px } => px,
        }
    }

    /// Minimum width in terminal columns
    pub const fn min_chars(self) -> u16 {
        self.min_px() / PX_PER_CHAR
    }

    pub const fn is_fill(self) -> bool {
        matches!(self, Self::Fill { .. })
    }
}

/// Width class for an accessor key; not user-configurable
pub fn column_width(key: &str) -> ColumnWidth {
    match key {
        "description" => ColumnWidth::Fill { min_px: 200 },
        "date" | "created" | "lastLogin" | "lastAccessReview" | "completedDate" | "resolvedDate" => {
            ColumnWidth::Fixed { px: 128 }
        }
        "email" => ColumnWidth::Fixed { px: 192 },
        "name" | "user" | "database" | "source" => ColumnWidth::Fixed { px: 160 },
        "role" | "status" | "severity" | "size" => ColumnWidth::Fixed { px: 112 },
        _ => ColumnWidth::Fixed { px: 144 },
    }
}
