//! Report export: JSON dump, HTML, and PDF through an external rasterizer.
//!
//! PDF output hands the print-layout HTML to a command-line tool
//! (`wkhtmltopdf` by default). The tool is only specified by interface:
//! anything implementing [`PdfRasterizer`] can stand in.

use auditview_core::ReportSnapshot;
use chrono::NaiveDate;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::html::{HtmlLayout, HtmlRenderer};
use crate::report::Report;

/// Placeholder replaced by the HTML input path in rasterizer arguments
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the PDF output path in rasterizer arguments
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown export format: {0}. Supported: json, html, pdf")]
    UnknownFormat(String),

    #[error("PDF rasterizer '{command}' could not be started: {source}")]
    RasterizerMissing {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF generation failed: {0}")]
    Rasterizer(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed raw report data
    Json,
    /// Print-layout HTML
    Html,
    /// Print-layout HTML rasterized to PDF
    Pdf,
}

impl OutputFormat {
    /// Get file extension for this format
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// `audit-report-<YYYY-MM-DD>.<ext>`
pub fn export_filename(format: OutputFormat, date: NaiveDate) -> String {
    format!("audit-report-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the snapshot's raw document, pretty-printed
pub async fn export_json(snapshot: &ReportSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot.raw.as_ref())?;
    write_file(path, json).await
}

/// Write `report` as an HTML document in `layout`
pub async fn export_html(report: &Report, layout: HtmlLayout, path: &Path) -> Result<()> {
    write_file(path, HtmlRenderer::new(layout).render(report)).await
}

/// Turns an HTML file into a PDF file
pub trait PdfRasterizer: Send + Sync {
    fn rasterize(&self, html: &Path, pdf: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// Rasterizer backed by an external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRasterizer {
    program: String,
    args: Vec<String>,
}

impl CommandRasterizer {
    /// Arguments for `wkhtmltopdf`: A4 landscape with quarter-inch margins
    pub fn default_args() -> Vec<String> {
        [
            "--quiet",
            "--orientation",
            "Landscape",
            "--page-size",
            "A4",
            "--margin-top",
            "0.25in",
            "--margin-bottom",
            "0.25in",
            "--margin-left",
            "0.25in",
            "--margin-right",
            "0.25in",
            INPUT_PLACEHOLDER,
            OUTPUT_PLACEHOLDER,
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Create a new rasterizer. `args` may use `{input}` and `{output}`;
    /// when neither appears both paths are appended in that order. `None`
    /// selects [`CommandRasterizer::default_args`].
    pub fn new(program: impl Into<String>, args: Option<Vec<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.unwrap_or_else(Self::default_args),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with the placeholders filled in
    pub fn command_args(&self, html: &Path, pdf: &Path) -> Vec<String> {
        let input = html.display().to_string();
        let output = pdf.display().to_string();
        let has_placeholder = self
            .args
            .iter()
            .any(|arg| arg.contains(INPUT_PLACEHOLDER) || arg.contains(OUTPUT_PLACEHOLDER));

        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect();
        if !has_placeholder {
            args.push(input);
            args.push(output);
        }
        args
    }
}

impl Default for CommandRasterizer {
    fn default() -> Self {
        Self::new(auditview_core::config::DEFAULT_PDF_COMMAND, None)
    }
}

impl PdfRasterizer for CommandRasterizer {
    async fn rasterize(&self, html: &Path, pdf: &Path) -> Result<()> {
        let args = self.command_args(html, pdf);
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ExportError::RasterizerMissing {
                command: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::Rasterizer(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Check that the rasterizer program runs; returns its version line
pub async fn check_rasterizer_installed(program: &str) -> Result<String> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| ExportError::RasterizerMissing {
            command: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ExportError::Rasterizer(format!("'{program} --version' failed")));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let version = if stdout.trim().is_empty() { stderr } else { stdout };
    Ok(version.trim().to_string())
}

/// Writes exports into one directory
#[derive(Debug, Clone)]
pub struct Exporter<R = CommandRasterizer> {
    output_dir: PathBuf,
    rasterizer: R,
}

impl<R: PdfRasterizer> Exporter<R> {
    /// Create a new exporter writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>, rasterizer: R) -> Self {
        Self {
            output_dir: output_dir.into(),
            rasterizer,
        }
    }

    /// Export in `format`; returns the path written. The file is named
    /// after the date the report was generated.
    pub async fn export(
        &self,
        format: OutputFormat,
        snapshot: &ReportSnapshot,
        report: &Report,
    ) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(export_filename(format, report.generated_at.date_naive()));

        match format {
            OutputFormat::Json => export_json(snapshot, &path).await?,
            OutputFormat::Html => export_html(report, HtmlLayout::Print, &path).await?,
            OutputFormat::Pdf => {
                let html_path = path.with_extension("print.html");
                export_html(report, HtmlLayout::Print, &html_path).await?;
                let result = self.rasterizer.rasterize(&html_path, &path).await;
                if let Err(e) = tokio::fs::remove_file(&html_path).await {
                    warn!("Could not remove {}: {e}", html_path.display());
                }
                result?;
            }
        }

        info!("Exported {} to {}", format, path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Section;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tempfile::tempdir;

    fn report() -> Report {
        Report {
            title: "Billing".to_string(),
            description: None,
            generated_at: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
            origin: "test".to_string(),
            sections: vec![Section::new("s", "Section")],
        }
    }

    fn snapshot() -> ReportSnapshot {
        ReportSnapshot::from_value(json!({"name": "Billing", "incidents": []}), "test").unwrap()
    }

    /// Writes the HTML it was given as the "PDF"
    struct CopyRasterizer;

    impl PdfRasterizer for CopyRasterizer {
        async fn rasterize(&self, html: &Path, pdf: &Path) -> Result<()> {
            tokio::fs::copy(html, pdf).await.map_err(|source| ExportError::Io {
                path: pdf.to_path_buf(),
                source,
            })?;
            Ok(())
        }
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert!(matches!(
            "svg".parse::<OutputFormat>(),
            Err(ExportError::UnknownFormat(_))
        ));
        assert_eq!(OutputFormat::Html.to_string(), "html");
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_filename(OutputFormat::Pdf, date), "audit-report-2024-03-07.pdf");
        assert_eq!(export_filename(OutputFormat::Json, date), "audit-report-2024-03-07.json");
    }

    #[test]
    fn test_command_args_placeholders() {
        let html = Path::new("/tmp/in.html");
        let pdf = Path::new("/tmp/out.pdf");

        let default = CommandRasterizer::default();
        assert_eq!(default.program(), "wkhtmltopdf");
        let args = default.command_args(html, pdf);
        assert_eq!(&args[args.len() - 2..], ["/tmp/in.html", "/tmp/out.pdf"]);
        assert!(args.windows(2).any(|w| w == ["--page-size", "A4"]));

        let custom = CommandRasterizer::new("chromium", Some(vec!["--print-to-pdf={output}".into(), "{input}".into()]));
        assert_eq!(custom.command_args(html, pdf), ["--print-to-pdf=/tmp/out.pdf", "/tmp/in.html"]);

        let bare = CommandRasterizer::new("topdf", Some(vec!["-q".into()]));
        assert_eq!(bare.command_args(html, pdf), ["-q", "/tmp/in.html", "/tmp/out.pdf"]);
    }

    #[tokio::test]
    async fn test_json_export_is_raw_document() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), CopyRasterizer);
        let path = exporter.export(OutputFormat::Json, &snapshot(), &report()).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "audit-report-2024-06-15.json");
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"name": "Billing", "incidents": []}));
    }

    #[tokio::test]
    async fn test_pdf_export_uses_print_layout_and_cleans_up() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), CopyRasterizer);
        let path = exporter.export(OutputFormat::Pdf, &snapshot(), &report()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("size: A4 landscape"));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_rasterizer_is_reported() {
        let dir = tempdir().unwrap();
        let rasterizer = CommandRasterizer::new("auditview-no-such-rasterizer", None);
        let exporter = Exporter::new(dir.path(), rasterizer);
        let err = exporter
            .export(OutputFormat::Pdf, &snapshot(), &report())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::RasterizerMissing { .. }));
        assert!(!dir.path().join("audit-report-2024-06-15.pdf").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_rasterizer_runs_program() {
        let dir = tempdir().unwrap();
        let html = dir.path().join("in.html");
        let pdf = dir.path().join("out.pdf");
        std::fs::write(&html, "<html></html>").unwrap();

        let copy = CommandRasterizer::new(
            "sh",
            Some(vec!["-c".into(), "cp \"$0\" \"$1\"".into(), "{input}".into(), "{output}".into()]),
        );
        copy.rasterize(&html, &pdf).await.unwrap();
        assert_eq!(std::fs::read_to_string(&pdf).unwrap(), "<html></html>");

        let failing = CommandRasterizer::new("sh", Some(vec!["-c".into(), "echo broken >&2; exit 3".into()]));
        let err = failing.rasterize(&html, &pdf).await.unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
