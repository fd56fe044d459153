//! End-to-end bias audit of one dataset.
//!
//! The auditor always computes group representation first. With an outcome
//! column it continues through the rate metrics, severity verdict, and
//! diagnosis; without one it falls back to the representation-only verdict.

use crate::config::AuditConfig;
use crate::data::dataset::{Dataset, display_value};
use crate::diagnosis::{BiasClassifier, Diagnosis};
use crate::error::AuditError;
use crate::metrics::{
    BiasMetrics, GroupRate, OutcomeSpec, Representation, RiskLevel, SeverityModel, SeverityScores,
    UnsupervisedModel, Verdict, compute_bias_metrics, representation_and_sampling_bias,
};
use serde::Serialize;
use serde_json::Value;

/// What to analyze.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub sensitive_attr: String,
    pub outcome: Option<OutcomeSpec>,
    /// Baseline group for parity and impact. Defaults to the largest group.
    pub reference_group: Option<Value>,
}

impl AnalysisRequest {
    /// Representation-only analysis.
    pub fn unsupervised(sensitive_attr: impl Into<String>) -> Self {
        Self {
            sensitive_attr: sensitive_attr.into(),
            outcome: None,
            reference_group: None,
        }
    }

    /// Representation plus outcome analysis.
    pub fn supervised(
        sensitive_attr: impl Into<String>,
        target_attr: impl Into<String>,
        positive_label: Value,
    ) -> Self {
        Self {
            sensitive_attr: sensitive_attr.into(),
            outcome: Some(OutcomeSpec::new(target_attr, positive_label)),
            reference_group: None,
        }
    }

    pub fn with_reference_group(mut self, group: Value) -> Self {
        self.reference_group = Some(group);
        self
    }
}

/// Whether outcome labels took part in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Supervised,
    Unsupervised,
}

/// Shape of the analyzed dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub missing_values: usize,
}

impl DatasetSummary {
    pub fn of(dataset: &Dataset) -> Self {
        Self {
            rows: dataset.row_count(),
            columns: dataset.column_count(),
            missing_values: dataset.missing_count(),
        }
    }
}

/// Outcome-side results of a supervised run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeAnalysis {
    pub target_attr: String,
    pub positive_label: String,
    pub reference_group: String,
    pub group_rates: Vec<GroupRate>,
    pub metrics: BiasMetrics,
    pub severity: SeverityScores,
    pub diagnosis: Diagnosis,
}

/// Everything one audit produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasReport {
    pub mode: AnalysisMode,
    pub dataset: DatasetSummary,
    pub sensitive_attr: String,
    pub representation: Representation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeAnalysis>,
    pub verdict: Verdict,
    pub risk_level: RiskLevel,
}

impl BiasReport {
    pub fn metrics(&self) -> Option<&BiasMetrics> {
        self.outcome.as_ref().map(|o| &o.metrics)
    }
}

/// Runs bias audits under one configuration.
#[derive(Debug, Clone, Default)]
pub struct BiasAuditor {
    config: AuditConfig,
}

impl BiasAuditor {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        dataset: &Dataset,
        request: &AnalysisRequest,
    ) -> Result<BiasReport, AuditError> {
        self.validate(dataset, request)?;

        let representation = representation_and_sampling_bias(dataset, &request.sensitive_attr)?;
        let severity_model = SeverityModel::new(self.config.severity.clone());

        let (mode, outcome, verdict, risk_level) = match &request.outcome {
            Some(outcome_spec) => {
                let outcome =
                    self.analyze_outcome(dataset, request, outcome_spec, &representation)?;
                let verdict = severity_model.verdict_from_scores(&outcome.severity);
                let risk =
                    RiskLevel::from_percentage(verdict.bias_percentage, severity_model.config());
                (AnalysisMode::Supervised, Some(outcome), verdict, risk)
            }
            None => {
                if request.reference_group.is_some() {
                    tracing::warn!("Reference group ignored without an outcome column");
                }
                let model = UnsupervisedModel::new(self.config.unsupervised.clone());
                let verdict = model.verdict(representation.min_representation);
                let risk = model.risk_level(representation.min_representation);
                (AnalysisMode::Unsupervised, None, verdict, risk)
            }
        };

        tracing::info!(
            sensitive_attr = %request.sensitive_attr,
            ?mode,
            verdict = %verdict.verdict,
            bias_percentage = verdict.bias_percentage,
            "Bias analysis complete"
        );

        Ok(BiasReport {
            mode,
            dataset: DatasetSummary::of(dataset),
            sensitive_attr: request.sensitive_attr.clone(),
            representation,
            outcome,
            verdict,
            risk_level,
        })
    }

    fn validate(&self, dataset: &Dataset, request: &AnalysisRequest) -> Result<(), AuditError> {
        dataset.column_index(&request.sensitive_attr)?;
        if let Some(outcome_spec) = &request.outcome {
            dataset.column_index(&outcome_spec.target_attr)?;
            if outcome_spec.target_attr == request.sensitive_attr {
                return Err(AuditError::invalid_input(
                    "Sensitive attribute and target variable must be different.",
                ));
            }
            if outcome_spec.positive_label.is_null() {
                return Err(AuditError::invalid_input("Positive label cannot be missing"));
            }
        }
        if dataset.is_empty() {
            return Err(AuditError::EmptyDataset);
        }
        Ok(())
    }

    fn analyze_outcome(
        &self,
        dataset: &Dataset,
        request: &AnalysisRequest,
        outcome_spec: &OutcomeSpec,
        representation: &Representation,
    ) -> Result<OutcomeAnalysis, AuditError> {
        let reference = match &request.reference_group {
            Some(group) => group.clone(),
            None => representation
                .reference_group()
                .map(|g| g.key.clone())
                .ok_or_else(|| {
                    AuditError::invalid_input(format!(
                        "Sensitive attribute '{}' has no non-missing values",
                        request.sensitive_attr
                    ))
                })?,
        };
        tracing::debug!(reference = %display_value(&reference), "Using reference group");

        let (metrics, group_rates) = compute_bias_metrics(
            dataset,
            &request.sensitive_attr,
            outcome_spec,
            representation.min_representation,
            &reference,
        )?;
        let severity = SeverityModel::new(self.config.severity.clone()).scores(&metrics);
        let diagnosis = BiasClassifier::new(self.config.diagnosis.clone()).diagnose(&metrics);

        Ok(OutcomeAnalysis {
            target_attr: outcome_spec.target_attr.clone(),
            positive_label: display_value(&outcome_spec.positive_label),
            reference_group: display_value(&reference),
            group_rates,
            metrics,
            severity,
            diagnosis,
        })
    }
}
