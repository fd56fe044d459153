//! CLI subcommand handlers.

use crate::render::{self, RenderOptions};
use crate::{Commands, ConfigAction, OutputFormat};
use serde::Serialize;
use std::path::Path;
use unbiased_core::analysis::DatasetSummary;
use unbiased_core::config::{AuditConfig, config_exists, load_config, write_default_config};
use unbiased_core::data::columns::{ColumnAnalysis, analyze_columns, eligible_target_columns};
use unbiased_core::data::schema::{ColumnProfile, profile_columns};
use unbiased_core::{AnalysisRequest, BiasAuditor, Dataset, load_dataset};

/// Handle a CLI subcommand.
pub fn handle_command(
    command: Commands,
    workspace: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace, config_path),
        Commands::Analyze {
            file,
            sensitive,
            target,
            positive,
            reference,
            format,
            no_recommendations,
        } => {
            let config = effective_config(workspace, config_path)?;
            let outcome = target.zip(positive);
            let options = AnalyzeOptions {
                format: OutputFormat::resolve(format, &config.output.format),
                render: RenderOptions {
                    recommendations: config.output.recommendations && !no_recommendations,
                    width: config.output.wrap_width,
                },
            };
            handle_analyze(&file, &sensitive, outcome, reference, &options, config)
        }
        Commands::Columns {
            file,
            sensitive,
            format,
        } => {
            let config = effective_config(workspace, config_path)?;
            handle_columns(&file, sensitive.as_deref(), format, &config)
        }
        Commands::Inspect { file, rows, format } => {
            let config = effective_config(workspace, config_path)?;
            handle_inspect(&file, rows, format, &config)
        }
    }
}

fn effective_config(workspace: &Path, config_path: Option<&Path>) -> anyhow::Result<AuditConfig> {
    if config_path.is_none() && !config_exists(Some(workspace)) {
        tracing::debug!("No configuration file found, using defaults");
    }
    load_config(Some(workspace), config_path)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
}

struct AnalyzeOptions {
    format: OutputFormat,
    render: RenderOptions,
}

fn handle_analyze(
    file: &Path,
    sensitive: &str,
    outcome: Option<(String, String)>,
    reference: Option<String>,
    options: &AnalyzeOptions,
    config: AuditConfig,
) -> anyhow::Result<()> {
    let dataset = load(file, &config)?;
    let mut request = match outcome {
        Some((target, positive)) => {
            let label = dataset
                .resolve_value(&target, &positive)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            AnalysisRequest::supervised(sensitive, target, label)
        }
        None => AnalysisRequest::unsupervised(sensitive),
    };
    if let Some(reference) = reference {
        let group = dataset
            .resolve_value(sensitive, &reference)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        request = request.with_reference_group(group);
    }

    let report = BiasAuditor::new(config)
        .analyze(&dataset, &request)
        .map_err(|e| anyhow::anyhow!("Analysis failed: {}", e))?;

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render::report_text(&report, &options.render)),
    }
    Ok(())
}

fn handle_columns(
    file: &Path,
    sensitive: Option<&str>,
    format: Option<OutputFormat>,
    config: &AuditConfig,
) -> anyhow::Result<()> {
    let dataset = load(file, config)?;
    let listing = column_listing(&dataset, sensitive, config)?;
    match OutputFormat::resolve(format, &config.output.format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Text => print!(
            "{}",
            render::columns_text(&listing.analysis, listing.targets_for())
        ),
    }
    Ok(())
}

fn handle_inspect(
    file: &Path,
    rows: usize,
    format: Option<OutputFormat>,
    config: &AuditConfig,
) -> anyhow::Result<()> {
    let dataset = load(file, config)?;
    let summary = DatasetSummary::of(&dataset);
    let profiles = profile_columns(&dataset).map_err(|e| anyhow::anyhow!("{}", e))?;
    let preview = dataset.head(rows);
    match OutputFormat::resolve(format, &config.output.format) {
        OutputFormat::Json => {
            let inspection = Inspection {
                summary,
                profiles,
                preview,
            };
            println!("{}", serde_json::to_string_pretty(&inspection)?);
        }
        OutputFormat::Text => print!("{}", render::inspect_text(&summary, &profiles, &preview)),
    }
    Ok(())
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init { force } => {
            let path = write_default_config(workspace, force)
                .map_err(|e| anyhow::anyhow!("Failed to write config: {}", e))?;
            println!("Created default configuration at: {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(Some(workspace), config_path)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

fn load(file: &Path, config: &AuditConfig) -> anyhow::Result<Dataset> {
    let dataset = load_dataset(file, &config.data)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", file.display(), e))?;
    tracing::info!(
        path = %file.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Sensitive-attribute candidates plus, optionally, targets for one of them.
#[derive(Debug, Serialize)]
pub struct ColumnListing {
    #[serde(flatten)]
    pub analysis: ColumnAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive_attr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_targets: Option<Vec<String>>,
}

impl ColumnListing {
    fn targets_for(&self) -> Option<(&str, &[String])> {
        match (&self.sensitive_attr, &self.eligible_targets) {
            (Some(attr), Some(targets)) => Some((attr.as_str(), targets.as_slice())),
            _ => None,
        }
    }
}

fn column_listing(
    dataset: &Dataset,
    sensitive: Option<&str>,
    config: &AuditConfig,
) -> anyhow::Result<ColumnListing> {
    let analysis =
        analyze_columns(dataset, &config.columns).map_err(|e| anyhow::anyhow!("{}", e))?;
    let eligible_targets = match sensitive {
        Some(attr) => Some(
            eligible_target_columns(dataset, attr, &config.columns)
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        ),
        None => None,
    };
    Ok(ColumnListing {
        analysis,
        sensitive_attr: sensitive.map(str::to_string),
        eligible_targets,
    })
}

#[derive(Debug, Serialize)]
struct Inspection {
    summary: DatasetSummary,
    profiles: Vec<ColumnProfile>,
    preview: Dataset,
}
