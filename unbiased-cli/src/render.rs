//! Plain-text rendering of reports for the terminal.

use unbiased_core::Dataset;
use unbiased_core::analysis::{BiasReport, DatasetSummary, OutcomeAnalysis};
use unbiased_core::data::columns::ColumnAnalysis;
use unbiased_core::data::display_value;
use unbiased_core::data::schema::ColumnProfile;
use unbiased_core::diagnosis::{BiasType, Diagnosis};
use unbiased_core::metrics::Representation;

/// Text report settings.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub recommendations: bool,
    pub width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            recommendations: true,
            width: 88,
        }
    }
}

fn wrap(text: &str, width: usize, indent: &str) -> String {
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

fn bullet(text: &str, width: usize, indent: &str) -> String {
    let first = format!("{indent}- ");
    let rest = format!("{indent}  ");
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(&first)
        .subsequent_indent(&rest);
    textwrap::fill(text, options)
}

/// Full audit report.
pub fn report_text(report: &BiasReport, options: &RenderOptions) -> String {
    let mut out: Vec<String> = Vec::new();
    out.push(format!("Bias audit of sensitive attribute '{}'", report.sensitive_attr));
    out.push(format!(
        "Dataset: {} rows, {} columns, {} missing values",
        report.dataset.rows, report.dataset.columns, report.dataset.missing_values
    ));
    out.push(String::new());

    representation_lines(&report.representation, &mut out);

    if let Some(outcome) = &report.outcome {
        out.push(String::new());
        outcome_lines(outcome, &mut out);
    }

    out.push(String::new());
    out.push(format!(
        "Verdict: {} ({}% bias, {})",
        report.verdict.verdict,
        report.verdict.bias_percentage,
        report.risk_level.label()
    ));
    out.push(wrap(&report.verdict.reason, options.width, "  "));

    if options.recommendations {
        if let Some(outcome) = &report.outcome {
            out.push(String::new());
            diagnosis_lines(&outcome.diagnosis, options.width, &mut out);
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn representation_lines(rep: &Representation, out: &mut Vec<String>) {
    out.push("Group representation".to_string());
    let name_width = rep
        .groups
        .iter()
        .map(|g| g.group.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);
    for share in &rep.groups {
        out.push(format!(
            "  {:<name_width$}  {:>7}  {:>6.1}%",
            share.group,
            share.count,
            share.proportion * 100.0
        ));
    }
    out.push(format!(
        "  Minimum representation: {:.3}",
        rep.min_representation
    ));
}

fn outcome_lines(outcome: &OutcomeAnalysis, out: &mut Vec<String>) {
    out.push(format!(
        "Positive rates for {} = {} (reference group: {})",
        outcome.target_attr, outcome.positive_label, outcome.reference_group
    ));
    let name_width = outcome
        .group_rates
        .iter()
        .map(|r| r.group.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);
    for rate in &outcome.group_rates {
        let fraction = format!("{}/{}", rate.positives, rate.total);
        out.push(format!(
            "  {:<name_width$}  {:>11}  {:.3}",
            rate.group,
            fraction,
            rate.rate()
        ));
    }

    let m = &outcome.metrics;
    out.push(String::new());
    out.push("Bias metrics".to_string());
    out.push(format!("  {:<24}{:.3}", "Label bias", m.label_diff));
    out.push(format!("  {:<24}{:.3}", "Historical bias", m.historical_diff));
    out.push(format!("  {:<24}{:.3}", "Max parity difference", m.max_spd));
    out.push(format!(
        "  {:<24}{:.3}",
        "Max impact deviation", m.max_di_deviation
    ));
}

fn diagnosis_lines(diagnosis: &Diagnosis, width: usize, out: &mut Vec<String>) {
    if !diagnosis.has_bias() {
        out.push(BiasType::NoSignificantBias.name().to_string());
        for rec in BiasType::NoSignificantBias.recommendations() {
            out.push(bullet(rec, width, "  "));
        }
        return;
    }

    out.push("Detected bias types".to_string());
    for finding in &diagnosis.findings {
        out.push(String::new());
        out.push(format!("  {}", finding.bias_type));
        if let Some(explanation) = finding.bias_type.explanation() {
            out.push(wrap(
                &format!("What went wrong: {}", explanation.what_went_wrong),
                width,
                "    ",
            ));
            out.push(wrap(
                &format!("Why it matters: {}", explanation.why_it_matters),
                width,
                "    ",
            ));
        }
        out.push("    Recommended fixes:".to_string());
        for rec in finding.recommendations {
            out.push(bullet(rec, width, "      "));
        }
    }
}

/// Sensitive-attribute screening, with targets when a sensitive column was given.
pub fn columns_text(analysis: &ColumnAnalysis, targets: Option<(&str, &[String])>) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push("Eligible sensitive attributes".to_string());
    if analysis.eligible_sensitive.is_empty() {
        out.push("  (none)".to_string());
    }
    for column in &analysis.eligible_sensitive {
        out.push(format!("  {column}"));
    }

    if !analysis.excluded.is_empty() {
        out.push(String::new());
        out.push("Excluded columns".to_string());
        let width = analysis
            .excluded
            .iter()
            .map(|e| e.column.chars().count())
            .max()
            .unwrap_or(0);
        for excluded in &analysis.excluded {
            out.push(format!("  {:<width$}  {}", excluded.column, excluded.reason));
        }
    }

    if let Some((sensitive, columns)) = targets {
        out.push(String::new());
        out.push(format!("Eligible targets for '{sensitive}'"));
        if columns.is_empty() {
            out.push("  (none)".to_string());
        }
        for column in columns {
            out.push(format!("  {column}"));
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// Dataset overview: shape, per-column profile, and a preview of rows.
pub fn inspect_text(
    summary: &DatasetSummary,
    profiles: &[ColumnProfile],
    preview: &Dataset,
) -> String {
    let mut out: Vec<String> = Vec::new();
    out.push(format!(
        "Rows: {}  Columns: {}  Missing values: {}",
        summary.rows, summary.columns, summary.missing_values
    ));

    let mut dtypes: Vec<String> = profiles.iter().map(|p| p.dtype.to_string()).collect();
    dtypes.sort();
    dtypes.dedup();
    out.push(format!("Data types: {}", dtypes.join(", ")));

    out.push(String::new());
    let name_width = profiles
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);
    out.push(format!(
        "  {:<name_width$}  {:<8}  {:>7}  {:>7}",
        "column", "type", "missing", "unique"
    ));
    for profile in profiles {
        out.push(format!(
            "  {:<name_width$}  {:<8}  {:>7}  {:>7}",
            profile.name,
            profile.dtype.to_string(),
            profile.missing,
            profile.unique
        ));
    }

    if !preview.is_empty() {
        out.push(String::new());
        out.push(format!("First {} rows", preview.row_count()));
        out.push(format!("  {}", preview.columns().join(" | ")));
        for row in preview.rows() {
            let cells: Vec<String> = row.iter().map(display_value).collect();
            out.push(format!("  {}", cells.join(" | ")));
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}
