//! In-memory rectangular dataset.

use crate::error::AuditError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// A rectangular table of named columns. Missing cells are `Value::Null`.
///
/// Nothing in the metrics layer mutates a dataset; it is built once by the
/// loader (or by the caller) and then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Unchecked wire form; deserialization goes through [`Dataset::new`].
#[derive(Deserialize)]
struct RawDataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = AuditError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Dataset::new(raw.columns, raw.rows)
    }
}

impl Dataset {
    /// Build a dataset, checking that every row matches the header width and
    /// that column names are unique.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, AuditError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(AuditError::dataset(format!("Duplicate column name '{col}'")));
            }
        }

        let width = columns.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(AuditError::dataset(format!(
                "Row {idx} has {} cells, expected {width}",
                row.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, AuditError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AuditError::column_not_found(name))
    }

    /// Iterate over the cells of one column, in row order.
    pub fn column_values(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = &Value> + '_, AuditError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Total number of missing cells across the whole table.
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|v| v.is_null())
            .count()
    }

    /// Distinct non-missing values of a column, in order of first appearance.
    pub fn unique_values(&self, name: &str) -> Result<Vec<Value>, AuditError> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for value in self.column_values(name)? {
            if value.is_null() {
                continue;
            }
            if seen.insert(value_key(value)) {
                unique.push(value.clone());
            }
        }
        Ok(unique)
    }

    /// Number of distinct non-missing values in a column.
    pub fn nunique(&self, name: &str) -> Result<usize, AuditError> {
        Ok(self.unique_values(name)?.len())
    }

    /// The first `n` rows as a new dataset.
    pub fn head(&self, n: usize) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Map a user-typed label onto the typed value stored in `column`.
    ///
    /// Labels arrive as text (CLI flags, config files) while cells may be
    /// integers or booleans, so the match is done on the display form.
    pub fn resolve_value(&self, column: &str, raw: &str) -> Result<Value, AuditError> {
        let values = self.unique_values(column)?;
        if let Some(found) = values.iter().find(|v| display_value(v) == raw) {
            return Ok(found.clone());
        }
        let available: Vec<String> = values.iter().map(display_value).collect();
        Err(AuditError::invalid_input(format!(
            "Value '{raw}' not found in column '{column}'. Available: {}",
            available.join(", ")
        )))
    }
}

/// Render a cell the way it is shown to users. Missing cells print as `nan`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "nan".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Hashable identity of a cell. Distinguishes `1` from `"1"`.
pub(crate) fn value_key(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["group".into(), "outcome".into(), "score".into()],
            vec![
                vec![json!("A"), json!("yes"), json!(1)],
                vec![json!("B"), json!("no"), json!(0)],
                vec![json!("A"), Value::Null, json!(1)],
                vec![Value::Null, json!("yes"), json!(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![json!(1), json!(2)], vec![json!(3)]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("Row 1 has 1 cells"));
    }

    #[test]
    fn test_deserialize_validates_shape() {
        let err = serde_json::from_value::<Dataset>(json!({
            "columns": ["g", "y"],
            "rows": [["a"]],
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Row 0 has 1 cells, expected 2"));

        assert!(serde_json::from_value::<Dataset>(json!({
            "columns": ["g", "g"],
            "rows": [],
        }))
        .is_err());

        let ds = sample();
        let back: Dataset = serde_json::from_value(serde_json::to_value(&ds).unwrap()).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let err = Dataset::new(vec!["a".into(), "a".into()], vec![]).unwrap_err();
        assert!(matches!(err, AuditError::Dataset(_)));
    }

    #[test]
    fn test_unique_values_skip_missing_and_keep_order() {
        let ds = sample();
        assert_eq!(ds.unique_values("group").unwrap(), vec![json!("A"), json!("B")]);
        assert_eq!(ds.nunique("score").unwrap(), 2);
    }

    #[test]
    fn test_missing_count() {
        assert_eq!(sample().missing_count(), 2);
    }

    #[test]
    fn test_column_not_found() {
        let ds = sample();
        assert!(matches!(
            ds.column_index("race"),
            Err(AuditError::ColumnNotFound(name)) if name == "race"
        ));
    }

    #[test]
    fn test_resolve_value_matches_typed_cells() {
        let ds = sample();
        assert_eq!(ds.resolve_value("score", "1").unwrap(), json!(1));
        assert_eq!(ds.resolve_value("outcome", "yes").unwrap(), json!("yes"));

        let err = ds.resolve_value("outcome", "maybe").unwrap_err();
        assert!(err.to_string().contains("Available: yes, no"));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("A")), "A");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&Value::Null), "nan");
    }

    #[test]
    fn test_head() {
        let ds = sample();
        assert_eq!(ds.head(2).row_count(), 2);
        assert_eq!(ds.head(10).row_count(), 4);
    }
}
