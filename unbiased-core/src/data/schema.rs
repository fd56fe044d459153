//! Column type inference and profiling.

use crate::data::dataset::Dataset;
use crate::error::AuditError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    Null,
}

impl ColumnType {
    /// Whether the column holds free-form categorical values.
    pub fn is_categorical(self) -> bool {
        matches!(self, ColumnType::String)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Null => "null",
        };
        write!(f, "{name}")
    }
}

/// Summary of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: ColumnType,
    pub missing: usize,
    pub unique: usize,
}

/// Infer column type from its values. Any string wins, then float, then integer.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnType {
    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;
    let mut has_string = false;

    for v in values {
        match v {
            Value::Number(n) => {
                if n.is_f64() {
                    has_float = true;
                } else {
                    has_int = true;
                }
            }
            Value::Bool(_) => has_bool = true,
            Value::String(_) => has_string = true,
            Value::Array(_) | Value::Object(_) => has_string = true,
            Value::Null => {}
        }
    }

    if has_string {
        return ColumnType::String;
    }
    if has_float {
        return ColumnType::Float;
    }
    if has_int {
        return ColumnType::Integer;
    }
    if has_bool {
        return ColumnType::Boolean;
    }
    ColumnType::Null
}

/// Type of a named column.
pub fn column_type(dataset: &Dataset, name: &str) -> Result<ColumnType, AuditError> {
    Ok(infer_column_type(dataset.column_values(name)?))
}

/// Profile every column of the dataset.
pub fn profile_columns(dataset: &Dataset) -> Result<Vec<ColumnProfile>, AuditError> {
    dataset
        .columns()
        .iter()
        .map(|name| {
            let missing = dataset.column_values(name)?.filter(|v| v.is_null()).count();
            Ok(ColumnProfile {
                name: name.clone(),
                dtype: column_type(dataset, name)?,
                missing,
                unique: dataset.nunique(name)?,
            })
        })
        .collect()
}
