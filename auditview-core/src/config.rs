//! Application configuration.
//!
//! Every field is optional so that layers (config file, environment, command
//! line) merge cleanly: an unset field in an upper layer never clears a lower
//! one. Defaults are applied by the accessors, not stored.

use auditview_utils::{ConfigBuilder, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::panels::pie::PaletteMode;
use crate::source::{ReportSource, SourceError, DEFAULT_TIMEOUT};

/// Default PDF rasterizer program
pub const DEFAULT_PDF_COMMAND: &str = "wkhtmltopdf";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Report endpoint URL
    pub backend: Option<String>,
    /// `user:pass` forwarded as HTTP Basic
    pub basic_auth: Option<String>,
    pub print_view: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<LogLevel>,
    pub pdf_command: Option<String>,
    pub pdf_args: Option<Vec<String>>,
    pub palette: Option<PaletteMode>,
}

impl AuditConfig {
    /// Defaults, then the config file at `path` if it exists
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        Ok(ConfigBuilder::<Self>::new().load_optional_file(path)?.build())
    }

    /// Merge `layer` on top of this config
    pub fn merged(self, layer: Self) -> crate::Result<Self> {
        Ok(ConfigBuilder::new().merge(self)?.merge(layer)?.build())
    }

    pub fn timeout(&self) -> Duration {
        self.request_timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    pub fn print_view(&self) -> bool {
        self.print_view.unwrap_or(false)
    }

    pub fn palette(&self) -> PaletteMode {
        self.palette.unwrap_or_default()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or(LogLevel::Warn)
    }

    pub fn pdf_command(&self) -> &str {
        self.pdf_command.as_deref().unwrap_or(DEFAULT_PDF_COMMAND)
    }

    /// Resolve the report source: a file wins over the backend URL
    pub fn source(&self, file: Option<PathBuf>) -> Result<ReportSource, SourceError> {
        if let Some(path) = file {
            return Ok(ReportSource::File(path));
        }
        match self.backend.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(ReportSource::Http {
                url: url.to_string(),
                basic_auth: self.basic_auth.clone().filter(|c| !c.is_empty()),
            }),
            _ => Err(SourceError::NotConfigured),
        }
    }

    /// Copy safe to print: the credential's password is masked
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.basic_auth = self.basic_auth.as_ref().map(|credential| {
            credential
                .split_once(':')
                .map_or_else(|| "****".to_string(), |(user, _)| format!("{user}:****"))
        });
        copy
    }
}
