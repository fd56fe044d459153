//! Bias metrics: group representation, outcome-rate disparities, and the
//! severity verdicts built on top of them.

pub mod differential;
pub mod rates;
pub mod representation;
pub mod verdict;

pub use differential::{
    BiasMetrics, OutcomeSpec, compute_bias_metrics, disparate_impact, historical_bias, label_bias,
    statistical_parity_difference,
};
pub use rates::{GroupRate, positive_rates};
pub use representation::{GroupShare, Representation, representation_and_sampling_bias};
pub use verdict::{
    RiskLevel, SeverityModel, SeverityScores, UnsupervisedModel, Verdict, VerdictLabel,
    final_bias_verdict, unsupervised_bias_verdict,
};

/// Round to 3 decimals, ties to even.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}
