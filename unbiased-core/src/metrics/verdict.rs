//! Severity aggregation and verdicts.
//!
//! Each signal is normalized onto `[0, 1]` and the worst one wins: a single
//! severe disparity is enough to push the verdict up, no averaging.

use crate::config::{SeverityConfig, UnsupervisedConfig};
use crate::metrics::differential::BiasMetrics;
use serde::{Deserialize, Serialize};

/// Absorbs float error so that e.g. `(0.5 - 0.4) / 0.5 * 100` floors to 20, not 19.
const PERCENT_EPSILON: f64 = 1e-9;

const SEVERE_REASON: &str = "Severe outcome-based disparity detected across groups.";
const SOME_REASON: &str = "Some disparity detected. Further investigation recommended.";
const NONE_REASON: &str = "No significant bias detected.";
const UNSUPERVISED_REASON: &str = "Assessment based solely on group representation. \
                                   Outcome fairness cannot be evaluated without labels.";

/// Categorical verdict. Supervised runs use the first three, representation-only
/// runs the last three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictLabel {
    #[serde(rename = "BIASED")]
    Biased,
    #[serde(rename = "POTENTIALLY BIASED")]
    PotentiallyBiased,
    #[serde(rename = "NOT BIASED")]
    NotBiased,
    #[serde(rename = "HIGH RISK OF REPRESENTATION BIAS")]
    HighRepresentationRisk,
    #[serde(rename = "POTENTIAL REPRESENTATION BIAS")]
    PotentialRepresentationBias,
    #[serde(rename = "NO DIRECT EVIDENCE OF BIAS (UNSUPERVISED)")]
    NoDirectEvidence,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Biased => "BIASED",
            VerdictLabel::PotentiallyBiased => "POTENTIALLY BIASED",
            VerdictLabel::NotBiased => "NOT BIASED",
            VerdictLabel::HighRepresentationRisk => "HIGH RISK OF REPRESENTATION BIAS",
            VerdictLabel::PotentialRepresentationBias => "POTENTIAL REPRESENTATION BIAS",
            VerdictLabel::NoDirectEvidence => "NO DIRECT EVIDENCE OF BIAS (UNSUPERVISED)",
        }
    }
}

impl std::fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final assessment of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: VerdictLabel,
    /// Severity as a whole percentage in `0..=100`.
    pub bias_percentage: u8,
    pub reason: String,
}

/// Normalized components behind a supervised verdict.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeverityScores {
    pub rep_score: f64,
    pub label_score: f64,
    pub hist_score: f64,
    pub spd_score: f64,
    pub di_score: f64,
    pub outcome_severity: f64,
    pub severity: f64,
}

/// Traffic-light reading of a bias percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_percentage(pct: u8, config: &SeverityConfig) -> Self {
        if pct >= config.biased_at {
            RiskLevel::High
        } else if pct >= config.potential_at {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Bias",
            RiskLevel::Moderate => "Moderate Bias",
            RiskLevel::High => "High Bias",
        }
    }
}

/// Floor a `[0, 1]` severity to a whole percentage.
fn to_percentage(severity: f64) -> u8 {
    let pct = (severity * 100.0 + PERCENT_EPSILON).floor();
    pct.clamp(0.0, 100.0) as u8
}

/// Supervised severity model: five signals in, one verdict out.
#[derive(Debug, Clone, Default)]
pub struct SeverityModel {
    config: SeverityConfig,
}

impl SeverityModel {
    pub fn new(config: SeverityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeverityConfig {
        &self.config
    }

    /// Normalize every signal and combine them by worst case.
    pub fn scores(&self, metrics: &BiasMetrics) -> SeverityScores {
        let c = &self.config;
        let rep_gap = c.balanced_share - metrics.min_representation;
        let rep_score = (rep_gap / c.balanced_share).max(0.0);
        let label_score = (metrics.label_diff / c.label_scale).min(1.0);
        let hist_score = (metrics.historical_diff / c.historical_scale).min(1.0);
        let spd_score = (metrics.max_spd / c.parity_scale).min(1.0);
        let di_score = (metrics.max_di_deviation / c.impact_scale).min(1.0);

        let outcome_severity = label_score.max(hist_score).max(spd_score).max(di_score);
        let severity = outcome_severity.max(rep_score);

        SeverityScores {
            rep_score,
            label_score,
            hist_score,
            spd_score,
            di_score,
            outcome_severity,
            severity,
        }
    }

    /// Verdict tier for a bias percentage.
    pub fn tier(&self, bias_percentage: u8) -> (VerdictLabel, &'static str) {
        if bias_percentage >= self.config.biased_at {
            (VerdictLabel::Biased, SEVERE_REASON)
        } else if bias_percentage >= self.config.potential_at {
            (VerdictLabel::PotentiallyBiased, SOME_REASON)
        } else {
            (VerdictLabel::NotBiased, NONE_REASON)
        }
    }

    pub fn verdict(&self, metrics: &BiasMetrics) -> Verdict {
        let scores = self.scores(metrics);
        self.verdict_from_scores(&scores)
    }

    pub fn verdict_from_scores(&self, scores: &SeverityScores) -> Verdict {
        let bias_percentage = to_percentage(scores.severity);
        let (verdict, reason) = self.tier(bias_percentage);
        tracing::info!(%verdict, bias_percentage, "Supervised bias verdict");
        Verdict {
            verdict,
            bias_percentage,
            reason: reason.to_string(),
        }
    }
}

/// Representation-only model for datasets without labels.
#[derive(Debug, Clone, Default)]
pub struct UnsupervisedModel {
    config: UnsupervisedConfig,
}

impl UnsupervisedModel {
    pub fn new(config: UnsupervisedConfig) -> Self {
        Self { config }
    }

    pub fn verdict(&self, min_representation: f64) -> Verdict {
        let c = &self.config;
        let verdict = if min_representation < c.high_risk_below {
            VerdictLabel::HighRepresentationRisk
        } else if min_representation < c.potential_below {
            VerdictLabel::PotentialRepresentationBias
        } else {
            VerdictLabel::NoDirectEvidence
        };
        let bias_percentage =
            to_percentage((c.balanced_share - min_representation) / c.balanced_share);

        tracing::info!(%verdict, bias_percentage, "Unsupervised bias verdict");
        Verdict {
            verdict,
            bias_percentage,
            reason: UNSUPERVISED_REASON.to_string(),
        }
    }

    /// Risk level on the same representation cut-offs as [`Self::verdict`].
    pub fn risk_level(&self, min_representation: f64) -> RiskLevel {
        let c = &self.config;
        if min_representation < c.high_risk_below {
            RiskLevel::High
        } else if min_representation < c.potential_below {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// Supervised verdict with the default normalization constants.
pub fn final_bias_verdict(metrics: &BiasMetrics) -> Verdict {
    SeverityModel::default().verdict(metrics)
}

/// Representation-only verdict with the default cut-offs.
pub fn unsupervised_bias_verdict(min_representation: f64) -> Verdict {
    UnsupervisedModel::default().verdict(min_representation)
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
    fn test_severe_disparity_is_biased() {
        let m = metrics(0.2, 0.75, 0.75, 0.75, 1.0);
        let scores = SeverityModel::default().scores(&m);
        assert!((scores.rep_score - 0.6).abs() < 1e-12);
        assert_eq!(scores.outcome_severity, 1.0);
        assert_eq!(scores.severity, 1.0);

        let verdict = final_bias_verdict(&m);
        assert_eq!(
            verdict,
            Verdict {
                verdict: VerdictLabel::Biased,
                bias_percentage: 100,
                reason: "Severe outcome-based disparity detected across groups.".into(),
            }
        );
    }

    #[test]
    fn test_balanced_dataset_is_not_biased() {
        let verdict = final_bias_verdict(&metrics(0.5, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(verdict.verdict, VerdictLabel::NotBiased);
        assert_eq!(verdict.bias_percentage, 0);
        assert_eq!(verdict.reason, "No significant bias detected.");
    }

    #[test]
    fn test_overrepresented_groups_do_not_score_negative() {
        let scores = SeverityModel::default().scores(&metrics(1.0, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(scores.rep_score, 0.0);
        assert_eq!(scores.severity, 0.0);
    }

    #[test]
    fn test_representation_alone_drives_verdict() {
        // rep_score = (0.5 - 0.1) / 0.5 = 0.8
        let verdict = final_bias_verdict(&metrics(0.1, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(verdict.bias_percentage, 80);
        assert_eq!(verdict.verdict, VerdictLabel::Biased);
    }

    #[test]
    fn test_percentages_land_on_exact_values() {
        // 0.18 / 0.3 and 0.09 / 0.3 are not exact in binary floating point.
        assert_eq!(final_bias_verdict(&metrics(0.5, 0.18, 0.0, 0.0, 0.0)).bias_percentage, 60);
        assert_eq!(final_bias_verdict(&metrics(0.5, 0.09, 0.0, 0.0, 0.0)).bias_percentage, 30);
        assert_eq!(final_bias_verdict(&metrics(0.5, 0.0, 0.0, 0.0, 0.145)).bias_percentage, 29);
    }

    #[test]
    fn test_tier_boundaries() {
        let model = SeverityModel::default();
        assert_eq!(model.tier(60).0, VerdictLabel::Biased);
        assert_eq!(model.tier(59).0, VerdictLabel::PotentiallyBiased);
        assert_eq!(model.tier(30).0, VerdictLabel::PotentiallyBiased);
        assert_eq!(model.tier(29).0, VerdictLabel::NotBiased);
        assert_eq!(
            model.tier(45).1,
            "Some disparity detected. Further investigation recommended."
        );
    }

    #[test]
    fn test_custom_tiers() {
        let model = SeverityModel::new(SeverityConfig {
            biased_at: 80,
            potential_at: 50,
            ..SeverityConfig::default()
        });
        assert_eq!(model.tier(79).0, VerdictLabel::PotentiallyBiased);
        assert_eq!(model.tier(49).0, VerdictLabel::NotBiased);
    }

    #[test]
    fn test_unsupervised_tiers() {
        let high = unsupervised_bias_verdict(0.1);
        assert_eq!(high.verdict, VerdictLabel::HighRepresentationRisk);
        assert_eq!(high.bias_percentage, 80);

        let potential = unsupervised_bias_verdict(0.35);
        assert_eq!(potential.verdict, VerdictLabel::PotentialRepresentationBias);
        assert_eq!(potential.bias_percentage, 30);

        let boundary = unsupervised_bias_verdict(0.4);
        assert_eq!(boundary.verdict, VerdictLabel::NoDirectEvidence);
        assert_eq!(boundary.bias_percentage, 20);
    }

    #[test]
    fn test_unsupervised_risk_follows_representation_tiers() {
        let model = UnsupervisedModel::default();
        // 0.25 scores 50% but sits in the high-risk representation tier.
        assert_eq!(unsupervised_bias_verdict(0.25).bias_percentage, 50);
        assert_eq!(model.risk_level(0.25), RiskLevel::High);
        // 0.38 scores 24% but is still below the potential-bias cut-off.
        assert_eq!(unsupervised_bias_verdict(0.38).bias_percentage, 24);
        assert_eq!(model.risk_level(0.38), RiskLevel::Moderate);
        assert_eq!(model.risk_level(0.4), RiskLevel::Low);
    }

    #[test]
    fn test_unsupervised_percentage_is_clamped() {
        assert_eq!(unsupervised_bias_verdict(0.9).bias_percentage, 0);
        assert_eq!(unsupervised_bias_verdict(0.0).bias_percentage, 100);
    }

    #[test]
    fn test_unsupervised_reason_is_fixed() {
        let a = unsupervised_bias_verdict(0.05);
        let b = unsupervised_bias_verdict(0.45);
        assert_eq!(a.reason, b.reason);
        assert!(a.reason.starts_with("Assessment based solely on group representation."));
    }

    #[test]
    fn test_verdict_serializes_display_strings() {
        let verdict = final_bias_verdict(&metrics(0.2, 0.75, 0.75, 0.75, 1.0));
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["verdict"], "BIASED");
        assert_eq!(json["bias_percentage"], 100);
        assert_eq!(
            serde_json::to_value(VerdictLabel::NoDirectEvidence).unwrap(),
            "NO DIRECT EVIDENCE OF BIAS (UNSUPERVISED)"
        );
    }

    #[test]
    fn test_risk_level() {
        let config = SeverityConfig::default();
        assert_eq!(RiskLevel::from_percentage(29, &config), RiskLevel::Low);
        assert_eq!(RiskLevel::from_percentage(30, &config), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_percentage(60, &config), RiskLevel::High);
        assert_eq!(RiskLevel::High.label(), "High Bias");
    }
}
