//! Group representation over the sensitive attribute.

use crate::data::dataset::{Dataset, display_value, value_key};
use crate::error::AuditError;
use crate::metrics::round3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One group's share of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupShare {
    /// Display form of the group value (`nan` for missing).
    pub group: String,
    /// The raw cell value identifying the group.
    pub key: Value,
    pub count: usize,
    /// `count / total_rows`, rounded to 3 decimals.
    pub proportion: f64,
}

/// Representation breakdown of a sensitive attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representation {
    pub sensitive_attr: String,
    pub total_rows: usize,
    /// Sorted by descending count; ties keep first-appearance order.
    pub groups: Vec<GroupShare>,
    /// Smallest group share, rounded to 3 decimals.
    pub min_representation: f64,
}

impl Representation {
    /// The largest non-missing group, used as the comparison baseline for
    /// outcome metrics. `None` only when every sensitive value is missing.
    pub fn reference_group(&self) -> Option<&GroupShare> {
        // Groups are sorted by descending count, so the first hit is the mode.
        self.groups.iter().find(|g| !g.key.is_null())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Count each value of `sensitive_attr` (missing included) and derive shares.
pub fn representation_and_sampling_bias(
    dataset: &Dataset,
    sensitive_attr: &str,
) -> Result<Representation, AuditError> {
    let values = dataset.column_values(sensitive_attr)?;
    let total_rows = dataset.row_count();
    if total_rows == 0 {
        return Err(AuditError::EmptyDataset);
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counted: Vec<(Value, usize)> = Vec::new();
    for value in values {
        let key = value_key(value);
        if let Some(&slot) = index.get(&key) {
            counted[slot].1 += 1;
        } else {
            index.insert(key, counted.len());
            counted.push((value.clone(), 1));
        }
    }
    // Stable sort keeps first-appearance order among equal counts.
    counted.sort_by(|a, b| b.1.cmp(&a.1));

    let total = total_rows as f64;
    let min_count = counted.iter().map(|(_, c)| *c).min().unwrap_or(total_rows);
    let groups: Vec<GroupShare> = counted
        .into_iter()
        .map(|(key, count)| GroupShare {
            group: display_value(&key),
            key,
            count,
            proportion: round3(count as f64 / total),
        })
        .collect();
    let min_representation = round3(min_count as f64 / total);

    tracing::debug!(
        sensitive_attr,
        groups = groups.len(),
        min_representation,
        "Computed group representation"
    );

    Ok(Representation {
        sensitive_attr: sensitive_attr.to_string(),
        total_rows,
        groups,
        min_representation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(values: Vec<Value>) -> Dataset {
        Dataset::new(
            vec!["group".into()],
            values.into_iter().map(|v| vec![v]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_counts_sorted_descending() {
        let ds = dataset(vec![json!("B"), json!("A"), json!("A"), json!("C"), json!("A")]);
        let rep = representation_and_sampling_bias(&ds, "group").unwrap();

        let names: Vec<_> = rep.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(rep.groups[0].count, 3);
        assert_eq!(rep.groups[0].proportion, 0.6);
        assert_eq!(rep.min_representation, 0.2);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let ds = dataset(vec![json!("y"), json!("x"), json!("x"), json!("y")]);
        let rep = representation_and_sampling_bias(&ds, "group").unwrap();
        assert_eq!(rep.groups[0].group, "y");
        assert_eq!(rep.groups[1].group, "x");
    }

    #[test]
    fn test_missing_is_its_own_group() {
        let ds = dataset(vec![json!("A"), Value::Null, Value::Null, json!("A"), json!("A")]);
        let rep = representation_and_sampling_bias(&ds, "group").unwrap();
        assert_eq!(rep.group_count(), 2);
        assert_eq!(rep.groups[1].group, "nan");
        assert_eq!(rep.groups[1].proportion, 0.4);
        assert_eq!(rep.min_representation, 0.4);
    }

    #[test]
    fn test_single_row_is_fully_represented() {
        let ds = dataset(vec![json!("only")]);
        let rep = representation_and_sampling_bias(&ds, "group").unwrap();
        assert_eq!(rep.groups[0].proportion, 1.0);
        assert_eq!(rep.min_representation, 1.0);
    }

    #[test]
    fn test_proportions_rounded_to_three_decimals() {
        let ds = dataset(vec![json!("a"), json!("b"), json!("b")]);
        let rep = representation_and_sampling_bias(&ds, "group").unwrap();
        assert_eq!(rep.groups[0].proportion, 0.667);
        assert_eq!(rep.min_representation, 0.333);
    }

    #[test]
    fn test_reference_group_skips_missing() {
        let ds = dataset(vec![
            Value::Null,
            Value::Null,
            Value::Null,
            json!("A"),
            json!("B"),
            json!("A"),
        ]);
        let rep = representation_and_sampling_bias(&ds, "group").unwrap();
        assert_eq!(rep.groups[0].group, "nan");
        assert_eq!(rep.reference_group().unwrap().group, "A");
    }

    #[test]
    fn test_numeric_groups_keep_typed_key() {
        let ds = dataset(vec![json!(1), json!(0), json!(1)]);
        let rep = representation_and_sampling_bias(&ds, "group").unwrap();
        assert_eq!(rep.groups[0].key, json!(1));
        assert_eq!(rep.groups[0].group, "1");
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let ds = dataset(vec![]);
        assert!(matches!(
            representation_and_sampling_bias(&ds, "group"),
            Err(AuditError::EmptyDataset)
        ));
    }

    #[test]
    fn test_unknown_column() {
        let ds = dataset(vec![json!("a")]);
        assert!(matches!(
            representation_and_sampling_bias(&ds, "race"),
            Err(AuditError::ColumnNotFound(_))
        ));
    }
}
