//! Column-eligibility heuristics for picking sensitive and target attributes.

use crate::config::ColumnRules;
use crate::data::dataset::Dataset;
use crate::data::schema::{ColumnType, column_type};
use crate::error::AuditError;
use serde::{Deserialize, Serialize};

/// Why a column cannot serve as a sensitive attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    UniqueIdentifier,
    Numeric,
    TooManyCategories,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ExclusionReason::UniqueIdentifier => "Unique identifier",
            ExclusionReason::Numeric => "Numeric attribute",
            ExclusionReason::TooManyCategories => "Too many categories",
        };
        f.write_str(text)
    }
}

/// A column that was ruled out, with the first rule it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedColumn {
    pub column: String,
    pub reason: ExclusionReason,
}

/// Result of scanning a dataset for sensitive-attribute candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnalysis {
    pub eligible_sensitive: Vec<String>,
    pub excluded: Vec<ExcludedColumn>,
}

fn distinct_ratio(dataset: &Dataset, column: &str) -> Result<f64, AuditError> {
    Ok(dataset.nunique(column)? as f64 / dataset.row_count() as f64)
}

/// Classify every column as an eligible sensitive attribute or an exclusion.
///
/// Rules apply in order: identifier-like columns first, then columns that are
/// not string-typed (all-missing columns included), then columns with too many
/// categories.
pub fn analyze_columns(
    dataset: &Dataset,
    rules: &ColumnRules,
) -> Result<ColumnAnalysis, AuditError> {
    let mut analysis = ColumnAnalysis::default();
    if dataset.is_empty() {
        return Ok(analysis);
    }

    for column in dataset.columns() {
        let reason = if distinct_ratio(dataset, column)? > rules.identifier_ratio {
            Some(ExclusionReason::UniqueIdentifier)
        } else if column_type(dataset, column)? != ColumnType::String {
            Some(ExclusionReason::Numeric)
        } else if dataset.nunique(column)? > rules.max_unique {
            Some(ExclusionReason::TooManyCategories)
        } else {
            None
        };

        match reason {
            Some(reason) => analysis.excluded.push(ExcludedColumn {
                column: column.clone(),
                reason,
            }),
            None => analysis.eligible_sensitive.push(column.clone()),
        }
    }

    tracing::debug!(
        eligible = analysis.eligible_sensitive.len(),
        excluded = analysis.excluded.len(),
        "Analyzed sensitive attribute candidates"
    );
    Ok(analysis)
}

/// Columns usable as an outcome for the given sensitive attribute.
///
/// Binary columns are always kept. String columns with a handful of values
/// look demographic rather than like outcomes and are skipped.
pub fn eligible_target_columns(
    dataset: &Dataset,
    sensitive_attr: &str,
    rules: &ColumnRules,
) -> Result<Vec<String>, AuditError> {
    dataset.column_index(sensitive_attr)?;
    if dataset.is_empty() {
        return Ok(Vec::new());
    }

    let mut eligible = Vec::new();
    for column in dataset.columns() {
        if column == sensitive_attr {
            continue;
        }
        if distinct_ratio(dataset, column)? > rules.target_identifier_ratio {
            continue;
        }
        let distinct = dataset.nunique(column)?;
        if distinct < 2 {
            continue;
        }
        let demographic_like = distinct > 2 && distinct <= rules.max_unique;
        if demographic_like && column_type(dataset, column)?.is_categorical() {
            continue;
        }
        eligible.push(column.clone());
    }
    Ok(eligible)
}
