//! Dataset ingestion from CSV and JSON Lines files.

use crate::config::DataConfig;
use crate::data::dataset::Dataset;
use crate::error::AuditError;
use serde_json::{Map, Value};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Cell contents read as missing, matching the usual spreadsheet/pandas markers.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Load a dataset, choosing the reader from the file extension.
pub fn load_dataset(path: &Path, config: &DataConfig) -> Result<Dataset, AuditError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let file = std::fs::File::open(path)?;
    let dataset = match ext.as_str() {
        "csv" => read_csv(file, config.delimiter, config.max_rows)?,
        "tsv" => read_csv(file, '\t', config.max_rows)?,
        "jsonl" | "ndjson" => read_jsonl(BufReader::new(file), config.max_rows)?,
        other => {
            return Err(AuditError::UnsupportedFormat(format!(
                "'{}' (extension '{other}'); expected .csv, .tsv, .jsonl or .ndjson",
                path.display()
            )));
        }
    };

    tracing::debug!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Read delimited text with a header row, typing each column from its contents.
pub fn read_csv<R: Read>(
    reader: R,
    delimiter: char,
    max_rows: Option<usize>,
) -> Result<Dataset, AuditError> {
    let delimiter = u8::try_from(delimiter).map_err(|_| {
        AuditError::invalid_input(format!("delimiter '{delimiter}' is not a single-byte character"))
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() || columns.iter().all(String::is_empty) {
        return Err(AuditError::dataset("Empty dataset"));
    }

    let mut raw: Vec<Vec<String>> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        if max_rows.is_some_and(|max| raw.len() >= max) {
            tracing::warn!(max_rows = raw.len(), "Row limit reached, remaining rows ignored");
            break;
        }
        let record = result
            .map_err(|e| AuditError::dataset(format!("Failed to read record {idx}: {e}")))?;
        raw.push(record.iter().map(str::to_string).collect());
    }

    let rows = type_columns(columns.len(), raw);
    Dataset::new(columns, rows)
}

/// Read one JSON object per line. Columns follow first-seen key order and
/// keys absent from a line are missing cells.
pub fn read_jsonl<R: BufRead>(reader: R, max_rows: Option<usize>) -> Result<Dataset, AuditError> {
    let mut columns: Vec<String> = Vec::new();
    let mut objects: Vec<Map<String, Value>> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if max_rows.is_some_and(|max| objects.len() >= max) {
            tracing::warn!(max_rows = objects.len(), "Row limit reached, remaining rows ignored");
            break;
        }
        let object = match serde_json::from_str::<Value>(&line)? {
            Value::Object(map) => map,
            _ => {
                return Err(AuditError::dataset(format!(
                    "Line {} is not a JSON object",
                    idx + 1
                )));
            }
        };
        for key in object.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
        objects.push(object);
    }

    if columns.is_empty() {
        return Err(AuditError::dataset("Empty dataset"));
    }

    let rows = objects
        .into_iter()
        .map(|mut obj| {
            columns
                .iter()
                .map(|c| obj.remove(c).unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Dataset::new(columns, rows)
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Convert raw text cells into typed values, one type per column.
fn type_columns(width: usize, raw: Vec<Vec<String>>) -> Vec<Vec<Value>> {
    let kinds: Vec<CellKind> = (0..width)
        .map(|col| {
            CellKind::infer(
                raw.iter()
                    .filter_map(|row| row.get(col))
                    .map(String::as_str)
                    .filter(|c| !is_missing(c)),
            )
        })
        .collect();

    raw.into_iter()
        .map(|row| {
            (0..width)
                .map(|col| match row.get(col) {
                    Some(cell) if !is_missing(cell) => kinds[col].convert(cell),
                    _ => Value::Null,
                })
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl CellKind {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut all_int = true;
        let mut all_float = true;
        let mut all_bool = true;
        let mut any = false;

        for cell in cells {
            any = true;
            all_int &= cell.parse::<i64>().is_ok();
            all_float &= cell.parse::<f64>().is_ok_and(f64::is_finite);
            all_bool &= parse_bool(cell).is_some();
            if !all_int && !all_float && !all_bool {
                return CellKind::Text;
            }
        }

        if !any {
            CellKind::Text
        } else if all_int {
            CellKind::Integer
        } else if all_float {
            CellKind::Float
        } else if all_bool {
            CellKind::Boolean
        } else {
            CellKind::Text
        }
    }

    fn convert(self, cell: &str) -> Value {
        let typed = match self {
            CellKind::Integer => cell.parse::<i64>().ok().map(Value::from),
            CellKind::Float => cell
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            CellKind::Boolean => parse_bool(cell).map(Value::Bool),
            CellKind::Text => None,
        };
        typed.unwrap_or_else(|| Value::String(cell.to_string()))
    }
}
