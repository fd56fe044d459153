//! Rate-based disparity metrics.
//!
//! The dataset-level functions each recompute group rates so they can be
//! called on their own. [`compute_bias_metrics`] computes the rates once and
//! derives every metric from them.

use crate::data::dataset::{Dataset, display_value};
use crate::error::AuditError;
use crate::metrics::rates::{GroupRate, positive_rates, rate_of};
use crate::metrics::round3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Target column and the label treated as the favorable outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSpec {
    pub target_attr: String,
    pub positive_label: Value,
}

impl OutcomeSpec {
    pub fn new(target_attr: impl Into<String>, positive_label: Value) -> Self {
        Self {
            target_attr: target_attr.into(),
            positive_label,
        }
    }
}

/// The five scalar bias signals. All values are rounded to 3 decimals and
/// non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BiasMetrics {
    pub min_representation: f64,
    pub label_diff: f64,
    pub historical_diff: f64,
    pub max_spd: f64,
    pub max_di_deviation: f64,
}

/// Spread between the highest and lowest group rate; 0 with fewer than two groups.
pub fn rate_spread(rates: &[GroupRate]) -> f64 {
    if rates.len() < 2 {
        return 0.0;
    }
    let (lo, hi) = rates
        .iter()
        .map(GroupRate::rate)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r), hi.max(r))
        });
    round3(hi - lo)
}

/// Largest absolute gap between any group's rate and the reference rate.
pub fn max_parity_gap(rates: &[GroupRate], ref_rate: f64) -> f64 {
    let gap = rates
        .iter()
        .map(|r| (r.rate() - ref_rate).abs())
        .fold(0.0, f64::max);
    round3(gap)
}

/// Largest `|1 - rate / ref_rate|` over all groups.
///
/// Nothing is recorded when the reference rate is zero, so the result is 0.
pub fn max_impact_deviation(rates: &[GroupRate], ref_rate: f64) -> f64 {
    if ref_rate <= 0.0 {
        tracing::warn!("Reference group has no positive outcomes; disparate impact reported as 0");
        return 0.0;
    }
    let deviation = rates
        .iter()
        .map(|r| (1.0 - r.rate() / ref_rate).abs())
        .fold(0.0, f64::max);
    round3(deviation)
}

fn reference_rate(rates: &[GroupRate], reference: &Value) -> Result<f64, AuditError> {
    rate_of(rates, reference).ok_or_else(|| {
        AuditError::invalid_input(format!(
            "Reference group '{}' has no rows in the sensitive attribute",
            display_value(reference)
        ))
    })
}

/// Label bias: spread of positive rates across groups.
pub fn label_bias(
    dataset: &Dataset,
    sensitive_attr: &str,
    target_attr: &str,
    positive_label: &Value,
) -> Result<f64, AuditError> {
    let rates = positive_rates(dataset, sensitive_attr, target_attr, positive_label)?;
    Ok(rate_spread(&rates))
}

/// Historical bias. Measured the same way as [`label_bias`]; reported under
/// its own name because it is classified separately.
pub fn historical_bias(
    dataset: &Dataset,
    sensitive_attr: &str,
    target_attr: &str,
    positive_label: &Value,
) -> Result<f64, AuditError> {
    let rates = positive_rates(dataset, sensitive_attr, target_attr, positive_label)?;
    Ok(rate_spread(&rates))
}

/// Maximum statistical parity difference against `reference_group`.
pub fn statistical_parity_difference(
    dataset: &Dataset,
    sensitive_attr: &str,
    target_attr: &str,
    positive_label: &Value,
    reference_group: &Value,
) -> Result<f64, AuditError> {
    let rates = positive_rates(dataset, sensitive_attr, target_attr, positive_label)?;
    let ref_rate = reference_rate(&rates, reference_group)?;
    Ok(max_parity_gap(&rates, ref_rate))
}

/// Maximum disparate-impact deviation against `reference_group`.
pub fn disparate_impact(
    dataset: &Dataset,
    sensitive_attr: &str,
    target_attr: &str,
    positive_label: &Value,
    reference_group: &Value,
) -> Result<f64, AuditError> {
    let rates = positive_rates(dataset, sensitive_attr, target_attr, positive_label)?;
    let ref_rate = reference_rate(&rates, reference_group)?;
    Ok(max_impact_deviation(&rates, ref_rate))
}

/// All outcome metrics plus the given representation figure, from one pass
/// over the group rates.
pub fn compute_bias_metrics(
    dataset: &Dataset,
    sensitive_attr: &str,
    outcome: &OutcomeSpec,
    min_representation: f64,
    reference_group: &Value,
) -> Result<(BiasMetrics, Vec<GroupRate>), AuditError> {
    let rates = positive_rates(
        dataset,
        sensitive_attr,
        &outcome.target_attr,
        &outcome.positive_label,
    )?;
    let ref_rate = reference_rate(&rates, reference_group)?;
    let spread = rate_spread(&rates);

    let metrics = BiasMetrics {
        min_representation,
        label_diff: spread,
        historical_diff: spread,
        max_spd: max_parity_gap(&rates, ref_rate),
        max_di_deviation: max_impact_deviation(&rates, ref_rate),
    };
    tracing::debug!(?metrics, ref_rate, "Computed bias metrics");
    Ok((metrics, rates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rates(values: &[(usize, usize)]) -> Vec<GroupRate> {
        values
            .iter()
            .enumerate()
            .map(|(i, &(positives, total))| GroupRate {
                group: format!("g{i}"),
                key: json!(format!("g{i}")),
                total,
                positives,
            })
            .collect()
    }

    /// group A: 8 rows, 6 "yes"; group B: 2 rows, 0 "yes".
    fn two_groups() -> Dataset {
        let mut rows = Vec::new();
        for i in 0..8 {
            let outcome = if i < 6 { "yes" } else { "no" };
            rows.push(vec![json!("A"), json!(outcome)]);
        }
        for _ in 0..2 {
            rows.push(vec![json!("B"), json!("no")]);
        }
        Dataset::new(vec!["group".into(), "outcome".into()], rows).unwrap()
    }

    #[test]
    fn test_rate_spread() {
        assert_eq!(rate_spread(&rates(&[(3, 4), (1, 4), (2, 4)])), 0.5);
        assert_eq!(rate_spread(&rates(&[(1, 3)])), 0.0);
        assert_eq!(rate_spread(&[]), 0.0);
    }

    #[test]
    fn test_max_parity_gap_includes_reference() {
        let r = rates(&[(3, 4), (1, 4)]);
        assert_eq!(max_parity_gap(&r, 0.75), 0.5);
        assert_eq!(max_parity_gap(&r, 0.5), 0.25);
        assert_eq!(max_parity_gap(&[], 0.5), 0.0);
    }

    #[test]
    fn test_max_impact_deviation() {
        let r = rates(&[(4, 4), (1, 4)]);
        assert_eq!(max_impact_deviation(&r, 1.0), 0.75);
        // Ratios above the reference count too.
        assert_eq!(max_impact_deviation(&r, 0.5), 1.0);
    }

    #[test]
    fn test_zero_reference_rate_reports_no_impact() {
        let r = rates(&[(0, 4), (3, 4)]);
        assert_eq!(max_impact_deviation(&r, 0.0), 0.0);
    }

    #[test]
    fn test_dataset_level_metrics() {
        let ds = two_groups();
        let yes = json!("yes");
        let a = json!("A");
        assert_eq!(label_bias(&ds, "group", "outcome", &yes).unwrap(), 0.75);
        assert_eq!(historical_bias(&ds, "group", "outcome", &yes).unwrap(), 0.75);
        assert_eq!(
            statistical_parity_difference(&ds, "group", "outcome", &yes, &a).unwrap(),
            0.75
        );
        assert_eq!(disparate_impact(&ds, "group", "outcome", &yes, &a).unwrap(), 1.0);
    }

    #[test]
    fn test_reference_from_minority_with_zero_rate() {
        let ds = two_groups();
        let di = disparate_impact(&ds, "group", "outcome", &json!("yes"), &json!("B")).unwrap();
        assert_eq!(di, 0.0);
    }

    #[test]
    fn test_unknown_reference_group() {
        let ds = two_groups();
        let err = statistical_parity_difference(&ds, "group", "outcome", &json!("yes"), &json!("Z"))
            .unwrap_err();
        assert!(err.to_string().contains("Reference group 'Z'"));
    }

    #[test]
    fn test_compute_bias_metrics_bundle() {
        let ds = two_groups();
        let outcome = OutcomeSpec::new("outcome", json!("yes"));
        let (metrics, rates) =
            compute_bias_metrics(&ds, "group", &outcome, 0.2, &json!("A")).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(
            metrics,
            BiasMetrics {
                min_representation: 0.2,
                label_diff: 0.75,
                historical_diff: 0.75,
                max_spd: 0.75,
                max_di_deviation: 1.0,
            }
        );
    }
}
