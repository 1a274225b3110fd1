//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Offline DNS zone-export risk analyzer.
#[derive(Parser, Debug)]
#[command(name = "zonerisk", version, about, long_about = None)]
pub struct Cli {
    /// Extended table and per-chunk diagnostics.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress progress lines, keeping only the final report.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one or more zone-export CSV files.
    Analyze(AnalyzeArgs),
    /// Print the embedded default pattern catalog and exit.
    PrintDefaultConfig,
    /// Load and validate a pattern catalog file, exiting 0 or 1.
    ValidateConfig {
        /// Catalog file to validate.
        path: PathBuf,
    },
}

/// Arguments to the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// One or more zone-export CSV files to analyze.
    pub files: Vec<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormatArg::Table)]
    pub output: OutputFormatArg,

    /// Keep only results at this level or higher.
    #[arg(long, value_enum)]
    pub risk_level: Option<RiskLevelArg>,

    /// Stream detailed CSV to this path; summary still goes to stdout.
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Override the pattern catalog location.
    #[arg(long)]
    pub patterns: Option<PathBuf>,

    /// Bypass provider detection and force this adapter id.
    #[arg(long)]
    pub provider: Option<String>,

    /// Force bounded-memory streaming mode.
    #[arg(long)]
    pub stream: bool,

    /// Enable adaptive chunking (otherwise chunk size is fixed).
    #[arg(long)]
    pub enhanced: bool,

    /// Enable worker-parallel mode with the default worker count.
    #[arg(long)]
    pub distributed: bool,

    /// Enable worker-parallel mode with exactly this many workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Fixed chunk size; disables adaptive chunking.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Soft memory cap, in MiB.
    #[arg(long, default_value_t = 100)]
    pub memory_limit: u64,

    /// Force English-locale messages.
    #[arg(long)]
    pub english: bool,

    /// Run provider detection and catalog validation only, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

impl AnalyzeArgs {
    /// Whether `--distributed` or an explicit `--workers` was given.
    pub fn wants_workers(&self) -> Option<usize> {
        if let Some(n) = self.workers {
            Some(n.max(1))
        } else if self.distributed {
            Some(zonerisk::core::pipeline::mode::default_worker_count())
        } else {
            None
        }
    }
}

/// `--output` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// Fixed-width summary table (default).
    Table,
    /// `{summary, results[]}` JSON document.
    Json,
    /// Header + one row per record.
    Csv,
}

/// `--risk-level` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevelArg {
    /// Only `critical`.
    Critical,
    /// `critical` or `high`.
    High,
    /// `critical`, `high`, or `medium`.
    Medium,
    /// Everything except `safe`.
    Low,
}

impl RiskLevelArg {
    /// Map to the classifier's [`crate::core::catalog::RiskLevel`] floor.
    pub fn to_risk_level(self) -> zonerisk::core::catalog::RiskLevel {
        use zonerisk::core::catalog::RiskLevel;
        match self {
            RiskLevelArg::Critical => RiskLevel::Critical,
            RiskLevelArg::High => RiskLevel::High,
            RiskLevelArg::Medium => RiskLevel::Medium,
            RiskLevelArg::Low => RiskLevel::Low,
        }
    }
}

/// `--log-format` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text (default).
    Text,
    /// Newline-delimited JSON, for CI ingestion.
    Json,
}
