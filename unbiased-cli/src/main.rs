//! Unbiased CLI: audit tabular datasets for representation and outcome bias.

mod commands;
mod render;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Unbiased: dataset bias diagnostics
#[derive(Parser, Debug)]
#[command(name = "unbiased", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (looked up for .unbiased/config.toml)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Audit a dataset for bias against a sensitive attribute
    Analyze {
        /// Dataset file (.csv, .tsv, .jsonl, .ndjson)
        file: PathBuf,
        /// Sensitive attribute column (e.g. gender, race)
        #[arg(short, long)]
        sensitive: String,
        /// Outcome column; omit for a representation-only audit
        #[arg(short, long, requires = "positive")]
        target: Option<String>,
        /// Value of the outcome column counted as favorable
        #[arg(short, long, requires = "target")]
        positive: Option<String>,
        /// Baseline group for parity and impact (defaults to the largest group)
        #[arg(short, long, requires = "target")]
        reference: Option<String>,
        /// Output format (overrides output.format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Omit explanations and recommendations
        #[arg(long)]
        no_recommendations: bool,
    },
    /// List columns usable as sensitive attributes and targets
    Columns {
        /// Dataset file
        file: PathBuf,
        /// Also list eligible targets for this sensitive attribute
        #[arg(short, long)]
        sensitive: Option<String>,
        /// Output format (overrides output.format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Show dataset shape, column profiles and a preview
    Inspect {
        /// Dataset file
        file: PathBuf,
        /// Number of preview rows
        #[arg(short = 'n', long, default_value = "5")]
        rows: usize,
        /// Output format (overrides output.format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default workspace configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show effective configuration
    Show,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Explicit flag first, then the configured default.
    fn resolve(flag: Option<OutputFormat>, configured: &str) -> OutputFormat {
        match flag {
            Some(format) => format,
            None if configured == "json" => OutputFormat::Json,
            None => OutputFormat::Text,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "unbiased", "unbiased")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "unbiased.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.config.as_deref())
}
