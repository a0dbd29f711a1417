//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use vts_transform::{ExportConfig, ExportFormat, ExportType};

#[derive(Parser)]
#[command(
    name = "vts",
    version,
    about = "Variable Token Sync - export design variables as tokens and sync them to GitHub",
    long_about = "Export design variables from a document snapshot as DTCG tokens or as the\n\
                  native collection/group hierarchy, and commit changed documents to GitHub.\n\n\
                  The GitHub token is read from --token, VTS_GITHUB_TOKEN or GITHUB_TOKEN."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Export a snapshot to token documents on disk.
    Export(ExportArgs),

    /// Show which documents changed since the last push. No network access.
    Status(StatusArgs),

    /// Export a snapshot and commit the changed documents to GitHub.
    Push(PushArgs),

    /// Check the GitHub token and repository access.
    Validate(ValidateArgs),
}

/// Format selection shared by the commands that export.
#[derive(Args)]
pub struct ExportSelection {
    /// Path to the document snapshot JSON.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Output format (default: from settings).
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// One document per collection (native format only).
    #[arg(long = "per-collection")]
    pub per_collection: bool,
}

impl ExportSelection {
    /// Export configuration with the command line applied over `defaults`.
    #[must_use]
    pub fn config(&self, defaults: ExportConfig) -> ExportConfig {
        let format = match self.format {
            Some(FormatArg::Dtcg) => ExportFormat::Dtcg,
            Some(FormatArg::FigmaNative) => ExportFormat::FigmaNative,
            None => defaults.format,
        };
        let export_type = if self.per_collection {
            ExportType::PerCollection
        } else {
            defaults.export_type
        };
        ExportConfig::new(format, export_type)
    }
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub selection: ExportSelection,

    /// Output directory for the documents.
    #[arg(long = "out-dir", value_name = "DIR", default_value = "tokens")]
    pub out_dir: PathBuf,
}

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub selection: ExportSelection,

    /// Branch whose sync state is compared (default: from settings).
    #[arg(long = "branch")]
    pub branch: Option<String>,
}

#[derive(Args)]
pub struct PushArgs {
    #[command(flatten)]
    pub selection: ExportSelection,

    /// Target branch (default: from settings). Created if missing.
    #[arg(long = "branch")]
    pub branch: Option<String>,

    /// Text put in front of the commit message (default: from settings).
    #[arg(long = "message-prefix")]
    pub message_prefix: Option<String>,

    /// Show what would be committed without contacting GitHub.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[command(flatten)]
    pub token: TokenArg,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub token: TokenArg,
}

#[derive(Args)]
pub struct TokenArg {
    /// GitHub access token.
    #[arg(long = "token", env = "VTS_GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Dtcg,
    FigmaNative,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
