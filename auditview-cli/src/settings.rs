//! Configuration layering for the command line
//!
//! Precedence, lowest first: built-in defaults, the config file, environment
//! variables, then flags. Clap resolves the last two into [`SourceArgs`].

use anyhow::{Context, Result};
use auditview_core::AuditConfig;
use auditview_utils::{default_config_path, save_config};
use clap::Args;
use std::path::{Path, PathBuf};

/// Flags that select and shape the report source
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Report endpoint URL
    #[arg(short, long, env = "AUDITVIEW_BACKEND")]
    pub backend: Option<String>,

    /// Read the report from a local JSON file instead of the backend
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Credential forwarded as HTTP Basic (`user:pass`)
    #[arg(long, env = "AUDITVIEW_BASIC_AUTH", hide_env_values = true)]
    pub basic_auth: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Use the print layout (status badges as dot and text)
    #[arg(long)]
    pub print: bool,
}

impl SourceArgs {
    /// The config layer these flags describe
    pub fn layer(&self) -> AuditConfig {
        AuditConfig {
            backend: self.backend.clone(),
            basic_auth: self.basic_auth.clone(),
            request_timeout_secs: self.timeout,
            print_view: self.print.then_some(true),
            ..AuditConfig::default()
        }
    }
}

/// `--config` if given, else the per-user default location
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(default_config_path)
}

/// The config file layer on its own
pub fn file_config(path: Option<&Path>) -> Result<AuditConfig> {
    AuditConfig::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load default config".to_string(),
    })
}

/// Effective configuration: the file layer with `layer` merged on top
pub fn effective_config(base: AuditConfig, layer: AuditConfig) -> Result<AuditConfig> {
    base.merged(layer).context("Failed to merge configuration layers")
}

/// Store `url` as the backend in the config file at `path`, keeping every
/// other setting already in the file
pub fn set_backend(path: &Path, url: &str) -> Result<AuditConfig> {
    let url = url.trim();
    anyhow::ensure!(!url.is_empty(), "Backend URL must not be empty");

    let mut config = file_config(Some(path))?;
    config.backend = Some(url.to_string());
    save_config(path, &config).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(config)
}
