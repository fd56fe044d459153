//! Per-group positive outcome rates.

use crate::data::dataset::{Dataset, display_value, value_key};
use crate::error::AuditError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Positive-label tally for one sensitive group.
///
/// Groups come from observed rows, so `total` is at least one and the rate
/// is always defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRate {
    pub group: String,
    pub key: Value,
    pub total: usize,
    pub positives: usize,
}

impl GroupRate {
    /// Fraction of the group's rows carrying the positive label.
    pub fn rate(&self) -> f64 {
        self.positives as f64 / self.total as f64
    }
}

/// Positive-label rate of every non-missing group of `sensitive_attr`.
///
/// A missing target cell never equals the positive label, so it counts
/// toward the group size but not toward its positives.
pub fn positive_rates(
    dataset: &Dataset,
    sensitive_attr: &str,
    target_attr: &str,
    positive_label: &Value,
) -> Result<Vec<GroupRate>, AuditError> {
    let s_idx = dataset.column_index(sensitive_attr)?;
    let t_idx = dataset.column_index(target_attr)?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rates: Vec<GroupRate> = Vec::new();
    for row in dataset.rows() {
        let group = &row[s_idx];
        if group.is_null() {
            continue;
        }
        let key = value_key(group);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key, rates.len());
                rates.push(GroupRate {
                    group: display_value(group),
                    key: group.clone(),
                    total: 0,
                    positives: 0,
                });
                rates.len() - 1
            }
        };
        let entry = &mut rates[slot];
        entry.total += 1;
        if &row[t_idx] == positive_label {
            entry.positives += 1;
        }
    }

    tracing::debug!(
        sensitive_attr,
        target_attr,
        positive_label = %display_value(positive_label),
        groups = rates.len(),
        "Computed positive rates"
    );
    Ok(rates)
}

/// Rate of the group identified by `key`, if it was observed.
pub fn rate_of(rates: &[GroupRate], key: &Value) -> Option<f64> {
    rates.iter().find(|r| &r.key == key).map(GroupRate::rate)
}
