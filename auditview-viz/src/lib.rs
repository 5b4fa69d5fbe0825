//! auditview viz - report assembly, rendering and export
//!
//! Turns a loaded [`ReportSnapshot`] into a renderer-neutral [`Report`] and
//! draws it for the terminal or as HTML, or exports it to JSON, HTML or PDF.

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::format_push_string,
)]

use auditview_core::{PaletteMode, ReportSnapshot};
use auditview_utils::logging::get_logger;
use chrono::{DateTime, Utc};
use ratatui::text::Line;
use serde::{Deserialize, Serialize};

pub mod export;
pub mod html;
pub mod report;
pub mod sections;
pub mod terminal;

pub use export::{
    check_rasterizer_installed, export_filename, CommandRasterizer, ExportError, Exporter,
    OutputFormat, PdfRasterizer,
};
pub use html::{HtmlLayout, HtmlRenderer};
pub use report::{Block, CalendarBlock, Card, Field, Report, Section, Stat, TableBlock};
pub use sections::SectionBuilder;
pub use terminal::{ansi_text, plain_text, TableFocus, TerminalRenderer};

/// Configuration for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizConfig {
    /// Terminal width (characters)
    pub terminal_width: u16,
    /// Print view: badges as dot and text
    pub print: bool,
    /// Fallback pie colors
    pub palette: PaletteMode,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            terminal_width: 160,
            print: false,
            palette: PaletteMode::default(),
        }
    }
}

/// Main report engine
#[derive(Debug, Clone, Default)]
pub struct ReportEngine {
    config: VizConfig,
}

impl ReportEngine {
    /// Create a new report engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the report engine
    #[must_use]
    pub const fn with_config(mut self, config: VizConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn config(&self) -> &VizConfig {
        &self.config
    }

    /// Assemble the report for `snapshot`, with relative dates measured
    /// from `now`
    pub fn build(&self, snapshot: &ReportSnapshot, now: DateTime<Utc>) -> Report {
        let logger = get_logger("auditview.viz");
        let app = snapshot.application.as_ref();

        let sections = SectionBuilder::new(app, now, self.config.palette).build();
        logger.debug(&format!(
            "Built {} sections from {}",
            sections.len(),
            snapshot.origin
        ));

        Report {
            title: app.heading(),
            description: app.description.clone(),
            generated_at: now,
            origin: snapshot.origin.clone(),
            sections,
        }
    }

    /// Terminal lines for `report`
    pub fn render_terminal(&self, report: &Report, focus: Option<TableFocus>) -> Vec<Line<'static>> {
        TerminalRenderer::new(self.config.terminal_width, self.config.print).lines(report, focus)
    }

    /// HTML document for `report` in the configured layout
    pub fn render_html(&self, report: &Report) -> String {
        let layout = if self.config.print {
            HtmlLayout::Print
        } else {
            HtmlLayout::Screen
        };
        HtmlRenderer::new(layout).render(report)
    }
}
