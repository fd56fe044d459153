//! # unbiased-core: dataset bias diagnostics
//!
//! Computes fairness diagnostics for a tabular dataset with respect to a
//! sensitive demographic attribute and, when labels are available, a target
//! outcome:
//!
//! 1. **Representation**: per-group counts and shares of the sensitive attribute
//! 2. **Outcome disparity**: label/historical rate spread, statistical parity
//!    difference, and disparate-impact deviation against a reference group
//! 3. **Verdict**: worst-case severity mapped to a 0–100 score and a tier
//!
//! All metrics are point estimates on the supplied sample. Nothing here
//! modifies the dataset.

pub mod analysis;
pub mod config;
pub mod data;
pub mod diagnosis;
pub mod error;
pub mod metrics;

// Re-exports
pub use analysis::{AnalysisMode, AnalysisRequest, BiasAuditor, BiasReport};
pub use config::{AuditConfig, load_config};
pub use data::{Dataset, load_dataset};
pub use diagnosis::{BiasType, Diagnosis, detect_bias_types, diagnose_bias_and_recommend_fixes};
pub use error::AuditError;
pub use metrics::{
    BiasMetrics, OutcomeSpec, Verdict, VerdictLabel, final_bias_verdict,
    representation_and_sampling_bias, unsupervised_bias_verdict,
};
