//! auditview core - audit report data model and evaluation
//!
//! This crate holds everything needed to turn one application entity into
//! display-ready data, without committing to an output medium:
//! - the application data model and the schema-driven view types
//! - value formatting by semantic type
//! - the table model, typed cells and tri-state sorting
//! - panel classification, gauge evaluation and pie data building
//! - per-section statistics (backups, incidents, pipelines, findings)
//! - data sources (HTTP endpoint or local file) and stale-response guarding

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
)]

pub mod config;
pub mod controller;
pub mod format;
pub mod models;
pub mod panels;
pub mod source;
pub mod stats;
pub mod status;
pub mod table;
pub mod view_state;

pub use config::AuditConfig;
pub use controller::{ReportController, ReportState};
pub use models::{
    view_types::{ColumnDef, NamedView, Panel, PanelKind, SemanticType, ViewResult},
    Application,
};
pub use panels::{
    classify::{classify, ClassifiedPanels},
    evaluate_panels,
    gauge::{evaluate, GaugeConfig, GaugeReading, GaugeSegment, Threshold},
    pie::{PaletteMode, PieSlice},
    BreakdownTable, GaugeCard, NumberCard, PanelSet, PieChart,
};
pub use source::{
    LoadOutcome, ReportLoader, ReportSnapshot, ReportSource, SourceClient, SourceError, SourceKind,
};
pub use status::StatusTone;
pub use table::{Cell, ColumnWidth, SortDirection, SortState, TableColumn, TableModel};
pub use view_state::ViewState;

/// Result type used throughout auditview core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for auditview core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Loading the report failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid report URL or query
    #[error("Invalid URL: {0}")]
    Url(String),

    /// Utility error
    #[error("Utility error: {0}")]
    Util(#[from] auditview_utils::UtilError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
