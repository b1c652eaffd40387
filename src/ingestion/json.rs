//! JSON record reading and writing.
//!
//! Supported inputs:
//! - A single JSON object: `{"field": {...}}`
//! - A JSON array of objects: `[{...}, {...}]`
//! - Newline-delimited JSON (NDJSON): `{...}\n{...}\n`
//!
//! Each object is one [`Record`] in the `{fieldCode: {"type": ..., "value": ...}}` shape.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{FlattenError, FlattenResult};
use crate::types::{Record, json_kind};

/// Output layout for [`records_to_string`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordFormat {
    /// A single pretty-printed JSON array.
    #[default]
    JsonArray,
    /// One compact JSON object per line.
    Ndjson,
}

/// Read records from a file.
pub fn records_from_path(path: impl AsRef<Path>) -> FlattenResult<Vec<Record>> {
    let text = fs::read_to_string(path)?;
    records_from_str(&text)
}

/// Read records from an in-memory string.
pub fn records_from_str(input: &str) -> FlattenResult<Vec<Record>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FlattenError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let records = match v {
            serde_json::Value::Array(items) => {
                let mut records = Vec::with_capacity(items.len());
                for (idx0, item) in items.into_iter().enumerate() {
                    let location = || format!("array element {}", idx0 + 1);
                    records.push(element_to_record(item, location)?);
                }
                records
            }
            serde_json::Value::Object(_) => vec![Record::from_json(v)?],
            other => {
                return Err(FlattenError::SchemaMismatch {
                    message: format!(
                        "json must be an object, an array of objects, or NDJSON; got {}",
                        json_kind(&other)
                    ),
                });
            }
        };
        debug!(records = records.len(), "read json records");
        Ok(records)
    } else {
        // Fall back to NDJSON.
        let mut records = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                FlattenError::SchemaMismatch {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            records.push(element_to_record(v, || format!("ndjson line {}", i + 1))?);
        }
        debug!(records = records.len(), "read ndjson records");
        Ok(records)
    }
}

/// Read exactly one record (a JSON object).
pub fn record_from_str(input: &str) -> FlattenResult<Record> {
    Ok(serde_json::from_str(input)?)
}

/// Write records in the given [`RecordFormat`].
pub fn records_to_string(records: &[Record], format: RecordFormat) -> FlattenResult<String> {
    match format {
        RecordFormat::JsonArray => Ok(serde_json::to_string_pretty(records)?),
        RecordFormat::Ndjson => {
            let mut out = String::new();
            for record in records {
                out.push_str(&serde_json::to_string(record)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn element_to_record(
    value: serde_json::Value,
    location: impl FnOnce() -> String,
) -> FlattenResult<Record> {
    if !value.is_object() {
        return Err(FlattenError::SchemaMismatch {
            message: format!("{} is not a json object", location()),
        });
    }
    Record::from_json(value)
}

#[cfg(test)]
mod tests {
    use super::{RecordFormat, record_from_str, records_from_str, records_to_string};

    #[test]
    fn single_object_is_one_record() {
        let records = records_from_str(r#"{"a": {"type": "NUMBER", "value": "1"}}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].contains("a"));
    }

    #[test]
    fn scalar_top_level_is_rejected() {
        let err = records_from_str("42").unwrap_err();
        assert!(err.to_string().contains("got number"));
    }

    #[test]
    fn record_from_str_rejects_arrays() {
        let err = record_from_str("[]").unwrap_err();
        assert!(err.to_string().starts_with("json error"));
    }

    #[test]
    fn ndjson_output_has_one_line_per_record() {
        let records = records_from_str("{\"a\": 1}\n{\"b\": 2}\n").unwrap();
        let out = records_to_string(&records, RecordFormat::Ndjson).unwrap();
        assert_eq!(out, "{\"a\":1}\n{\"b\":2}\n");
    }
}
