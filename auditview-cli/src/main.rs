//! auditview command-line entry point
//!
//! Renders an application's audit report in the terminal, runs the
//! interactive viewer, and exports JSON, HTML or PDF.

use anyhow::{Context, Result};
use auditview_core::{AuditConfig, ReportSnapshot, SourceClient, ViewState};
use auditview_utils::logging::{init_logging, LogLevel, LoggerConfig};
use auditview_viz::{
    ansi_text, plain_text, CommandRasterizer, Exporter, OutputFormat, ReportEngine, VizConfig,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::debug;

mod settings;
mod tui;

use settings::SourceArgs;

#[derive(Parser)]
#[command(name = "auditview")]
#[command(about = "Audit report viewer for application compliance data")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the report to stdout
    Show {
        #[command(flatten)]
        source: SourceArgs,

        /// Output width in characters
        #[arg(short, long, default_value = "160")]
        width: u16,

        /// Never emit color codes
        #[arg(long)]
        plain: bool,
    },

    /// Browse the report interactively
    Tui {
        #[command(flatten)]
        source: SourceArgs,

        /// Directory for exports started from the viewer
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Export the report to a file
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Export format (json, html, pdf)
        #[arg(short = 't', long, default_value = "json")]
        format: OutputFormat,

        /// Directory the export is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Open a shared report URL (`?backend=...&print=true`)
    Open {
        /// Report URL
        url: String,

        /// Browse interactively instead of printing
        #[arg(long)]
        interactive: bool,
    },

    /// Inspect or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Save the report endpoint to the config file
    SetBackend {
        /// Report endpoint URL
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = settings::config_path(cli.config.as_deref());
    let file_layer = settings::file_config(config_path.as_deref())?;

    let interactive = matches!(
        cli.command,
        Commands::Tui { .. } | Commands::Open { interactive: true, .. }
    );
    init_cli_logging(&file_layer, cli.verbose, interactive)?;
    debug!("Config file: {:?}", config_path);

    match cli.command {
        Commands::Show { source, width, plain } => {
            let config = settings::effective_config(file_layer, source.layer())?;
            show(&config, source.file, width, plain).await
        }
        Commands::Tui { source, output_dir } => {
            let config = settings::effective_config(file_layer, source.layer())?;
            let report_source = config.source(source.file);
            tui::run(config, report_source, output_dir).await
        }
        Commands::Export {
            source,
            format,
            output_dir,
        } => {
            let config = settings::effective_config(file_layer, source.layer())?;
            export(&config, source.file, format, &output_dir).await
        }
        Commands::Open { url, interactive } => {
            let state = ViewState::from_url(&url)?;
            let layer = AuditConfig {
                backend: state.backend,
                print_view: state.print.then_some(true),
                ..AuditConfig::default()
            };
            let config = settings::effective_config(file_layer, layer)?;
            if interactive {
                let report_source = config.source(None);
                tui::run(config, report_source, PathBuf::from(".")).await
            } else {
                show(&config, None, 160, false).await
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { source } => {
                let config = settings::effective_config(file_layer, source.layer())?;
                if let Some(path) = &config_path {
                    println!("# {}", path.display());
                }
                let text = toml::to_string_pretty(&config.redacted())
                    .context("Failed to serialize configuration")?;
                print!("{text}");
                Ok(())
            }
            ConfigAction::SetBackend { url } => {
                let path = config_path
                    .context("No config location: pass --config or set XDG_CONFIG_HOME or HOME")?;
                let saved = settings::set_backend(&path, &url)?;
                println!(
                    "Backend set to {} in {}",
                    saved.backend.unwrap_or_default(),
                    path.display()
                );
                Ok(())
            }
        },
    }
}

fn init_cli_logging(config: &AuditConfig, verbose: bool, interactive: bool) -> Result<()> {
    let level = if verbose {
        LogLevel::Debug
    } else if interactive {
        // Anything below error would scribble over the alternate screen
        LogLevel::Error
    } else {
        config.log_level()
    };
    init_logging(LoggerConfig {
        level,
        colored_output: std::io::stderr().is_terminal(),
        ..LoggerConfig::default()
    })
    .context("Failed to initialize logging")
}

async fn load(config: &AuditConfig, file: Option<PathBuf>) -> Result<ReportSnapshot> {
    let source = config.source(file)?;
    let client = SourceClient::new(config.timeout())?;
    let snapshot = client.load(&source).await?;
    Ok(snapshot)
}

fn engine(config: &AuditConfig, width: u16) -> ReportEngine {
    ReportEngine::new().with_config(VizConfig {
        terminal_width: width,
        print: config.print_view(),
        palette: config.palette(),
    })
}

async fn show(config: &AuditConfig, file: Option<PathBuf>, width: u16, plain: bool) -> Result<()> {
    let snapshot = load(config, file).await?;
    let engine = engine(config, width);
    let report = engine.build(&snapshot, Utc::now());
    let lines = engine.render_terminal(&report, None);

    let text = if plain || !std::io::stdout().is_terminal() {
        plain_text(&lines)
    } else {
        ansi_text(&lines)
    };
    print!("{text}");
    Ok(())
}

async fn export(
    config: &AuditConfig,
    file: Option<PathBuf>,
    format: OutputFormat,
    output_dir: &Path,
) -> Result<()> {
    let snapshot = load(config, file).await?;
    let report = engine(config, 160).build(&snapshot, Utc::now());

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let rasterizer = CommandRasterizer::new(config.pdf_command(), config.pdf_args.clone());
    let path = Exporter::new(output_dir, rasterizer)
        .export(format, &snapshot, &report)
        .await?;

    println!("Exported {}", path.display());
    Ok(())
}
