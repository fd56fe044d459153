//! Bias-type classification with fixed mitigation advice.
//!
//! Diagnosis never touches the dataset; it only maps metric values to named
//! bias types and the recommendations attached to each.

use crate::config::DiagnosisThresholds;
use crate::metrics::BiasMetrics;
use serde::{Deserialize, Serialize};

/// A detected category of bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiasType {
    #[serde(rename = "Representation Bias")]
    Representation,
    #[serde(rename = "Label Bias")]
    Label,
    #[serde(rename = "Historical Bias")]
    Historical,
    #[serde(rename = "Outcome Bias")]
    Outcome,
    #[serde(rename = "No Significant Bias Detected")]
    NoSignificantBias,
}

/// Plain-language account of a bias type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub what_went_wrong: &'static str,
    pub why_it_matters: &'static str,
    pub next_steps: &'static [&'static str],
}

impl BiasType {
    pub fn name(&self) -> &'static str {
        match self {
            BiasType::Representation => "Representation Bias",
            BiasType::Label => "Label Bias",
            BiasType::Historical => "Historical Bias",
            BiasType::Outcome => "Outcome Bias",
            BiasType::NoSignificantBias => "No Significant Bias Detected",
        }
    }

    pub fn is_bias(&self) -> bool {
        !matches!(self, BiasType::NoSignificantBias)
    }

    /// Mitigation strategies for this bias type.
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            BiasType::Representation => &[
                "Collect more data for underrepresented groups",
                "Use stratified sampling during data collection",
                "Apply re-weighting during model training (not data duplication)",
            ],
            BiasType::Label => &[
                "Audit labeling process for human or systemic bias",
                "Use blind or multi-annotator labeling",
                "Apply label smoothing or re-weighting during training",
            ],
            BiasType::Historical => &[
                "Incorporate fairness constraints during model training",
                "Use counterfactual fairness techniques",
                "Add post-processing fairness adjustments",
            ],
            BiasType::Outcome => &[
                "Use fairness-aware algorithms (e.g., Fairlearn)",
                "Apply threshold optimization per group",
                "Use post-processing methods like equalized odds",
            ],
            BiasType::NoSignificantBias => &[
                "Continue monitoring bias over time",
                "Validate fairness after model training",
            ],
        }
    }

    /// Explanation shown alongside a detected bias. `None` for the
    /// no-bias sentinel.
    pub fn explanation(&self) -> Option<Explanation> {
        let explanation = match self {
            BiasType::Representation => Explanation {
                what_went_wrong: "Some groups appear much less frequently in the dataset than others.",
                why_it_matters: "The model learns mostly from dominant groups and performs poorly \
                                 for underrepresented ones.",
                next_steps: &[
                    "Collect more real data for missing or small groups",
                    "Ensure balanced data collection across groups",
                    "Use re-weighting during model training (instead of duplicating data)",
                ],
            },
            BiasType::Label => Explanation {
                what_went_wrong: "The labels (decisions or outcomes) may be influenced by human \
                                  judgment or systemic bias.",
                why_it_matters: "The model treats biased labels as correct and learns unfair patterns.",
                next_steps: &[
                    "Audit how labels were assigned",
                    "Use multiple annotators instead of a single decision-maker",
                    "Reduce the influence of biased labels during training",
                ],
            },
            BiasType::Historical => Explanation {
                what_went_wrong: "The dataset reflects unfair decisions made in the past.",
                why_it_matters: "Even a perfect model will reproduce past discrimination.",
                next_steps: &[
                    "Add fairness constraints during model training",
                    "Apply fairness correction after predictions",
                    "Question whether historical data still represents today's reality",
                ],
            },
            BiasType::Outcome => Explanation {
                what_went_wrong: "Different groups receive different outcomes even when they have \
                                  similar data.",
                why_it_matters: "This can cause unfair approvals, rejections, or predictions in \
                                 real-world use.",
                next_steps: &[
                    "Use fairness-aware algorithms (e.g., Fairlearn, AIF360)",
                    "Adjust decision thresholds separately for each group",
                    "Review model outputs before deployment",
                ],
            },
            BiasType::NoSignificantBias => return None,
        };
        Some(explanation)
    }
}

impl std::fmt::Display for BiasType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One diagnosed bias type and its fixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub bias_type: BiasType,
    pub recommendations: &'static [&'static str],
}

/// Ordered findings for a set of metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub findings: Vec<Finding>,
}

impl Diagnosis {
    pub fn bias_types(&self) -> Vec<BiasType> {
        self.findings.iter().map(|f| f.bias_type).collect()
    }

    pub fn has_bias(&self) -> bool {
        self.findings.iter().any(|f| f.bias_type.is_bias())
    }
}

/// Rule-based classifier over the five metrics.
#[derive(Debug, Clone, Default)]
pub struct BiasClassifier {
    thresholds: DiagnosisThresholds,
}

impl BiasClassifier {
    pub fn new(thresholds: DiagnosisThresholds) -> Self {
        Self { thresholds }
    }

    /// Triggered bias types, checked in the order representation, label,
    /// historical, outcome. Never empty.
    pub fn detect(&self, metrics: &BiasMetrics) -> Vec<BiasType> {
        let t = &self.thresholds;
        let mut types = Vec::new();
        if metrics.min_representation < t.representation_below {
            types.push(BiasType::Representation);
        }
        if metrics.label_diff > t.label_diff_above {
            types.push(BiasType::Label);
        }
        if metrics.historical_diff > t.historical_diff_above {
            types.push(BiasType::Historical);
        }
        if metrics.max_spd > t.spd_above || metrics.max_di_deviation > t.di_deviation_above {
            types.push(BiasType::Outcome);
        }
        if types.is_empty() {
            types.push(BiasType::NoSignificantBias);
        }
        types
    }

    pub fn diagnose(&self, metrics: &BiasMetrics) -> Diagnosis {
        let findings: Vec<Finding> = self
            .detect(metrics)
            .into_iter()
            .map(|bias_type| Finding {
                bias_type,
                recommendations: bias_type.recommendations(),
            })
            .collect();
        tracing::debug!(findings = findings.len(), "Diagnosed bias types");
        Diagnosis { findings }
    }
}

/// Bias types triggered by `metrics` under the default thresholds.
pub fn detect_bias_types(metrics: &BiasMetrics) -> Vec<BiasType> {
    BiasClassifier::default().detect(metrics)
}

/// Bias types with their recommendations under the default thresholds.
pub fn diagnose_bias_and_recommend_fixes(metrics: &BiasMetrics) -> Diagnosis {
    BiasClassifier::default().diagnose(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(min_rep: f64, label: f64, hist: f64, spd: f64, di: f64) -> BiasMetrics {
        BiasMetrics {
            min_representation: min_rep,
            label_diff: label,
            historical_diff: hist,
            max_spd: spd,
            max_di_deviation: di,
        }
    }

    #[test]
    fn test_all_types_in_fixed_order() {
        let types = detect_bias_types(&metrics(0.2, 0.75, 0.75, 0.75, 1.0));
        assert_eq!(
            types,
            vec![
                BiasType::Representation,
                BiasType::Label,
                BiasType::Historical,
                BiasType::Outcome,
            ]
        );
    }

    #[test]
    fn test_no_bias_sentinel() {
        let types = detect_bias_types(&metrics(0.5, 0.1, 0.1, 0.05, 0.1));
        assert_eq!(types, vec![BiasType::NoSignificantBias]);
        assert_eq!(types[0].name(), "No Significant Bias Detected");
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Exactly at the threshold does not trigger.
        let types = detect_bias_types(&metrics(0.4, 0.2, 0.2, 0.1, 0.2));
        assert_eq!(types, vec![BiasType::NoSignificantBias]);
    }

    #[test]
    fn test_outcome_triggered_by_either_signal() {
        assert_eq!(
            detect_bias_types(&metrics(0.5, 0.0, 0.0, 0.11, 0.0)),
            vec![BiasType::Outcome]
        );
        assert_eq!(
            detect_bias_types(&metrics(0.5, 0.0, 0.0, 0.0, 0.21)),
            vec![BiasType::Outcome]
        );
    }

    #[test]
    fn test_diagnosis_pairs_recommendations() {
        let diagnosis = diagnose_bias_and_recommend_fixes(&metrics(0.3, 0.0, 0.0, 0.0, 0.0));
        assert!(diagnosis.has_bias());
        assert_eq!(diagnosis.bias_types(), vec![BiasType::Representation]);
        assert_eq!(
            diagnosis.findings[0].recommendations[0],
            "Collect more data for underrepresented groups"
        );
    }

    #[test]
    fn test_no_bias_diagnosis_recommends_monitoring() {
        let diagnosis = diagnose_bias_and_recommend_fixes(&metrics(0.5, 0.0, 0.0, 0.0, 0.0));
        assert!(!diagnosis.has_bias());
        assert_eq!(diagnosis.findings[0].recommendations.len(), 2);
    }

    #[test]
    fn test_explanations() {
        assert!(BiasType::NoSignificantBias.explanation().is_none());
        let outcome = BiasType::Outcome.explanation().unwrap();
        assert_eq!(outcome.next_steps.len(), 3);
        assert!(outcome.what_went_wrong.starts_with("Different groups"));
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = BiasClassifier::new(DiagnosisThresholds {
            spd_above: 0.5,
            di_deviation_above: 0.5,
            ..DiagnosisThresholds::default()
        });
        assert_eq!(
            classifier.detect(&metrics(0.5, 0.0, 0.0, 0.3, 0.3)),
            vec![BiasType::NoSignificantBias]
        );
    }

    #[test]
    fn test_bias_type_serializes_as_name() {
        let json = serde_json::to_value(BiasType::Historical).unwrap();
        assert_eq!(json, "Historical Bias");
    }
}
