//! Field-identifier mapping.
//!
//! The host decides which record fields the engine reads and writes. A [`FieldMapping`] names the
//! sub-table field and the tracked `(column, target)` pairs. Identifiers are opaque strings; no
//! naming scheme is enforced.
//!
//! ```rust
//! use subtable_flatten::config::FieldMapping;
//!
//! let mapping = FieldMapping::from_json_str(
//!     r#"{"table": "members", "columns": [{"column": "owner", "target": "owner_all"}]}"#,
//! )
//! .unwrap();
//! assert_eq!(mapping, FieldMapping::new("members").track("owner", "owner_all"));
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FlattenResult;

/// One tracked grouped column and the flat field that receives its aggregated codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedColumn {
    /// Column code inside each sub-table row.
    pub column: String,
    /// Top-level field code written with the union of codes.
    pub target: String,
}

impl TrackedColumn {
    pub fn new(column: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            target: target.into(),
        }
    }
}

/// Which fields of a record the projection reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Field code of the sub-table.
    pub table: String,
    /// Tracked pairs, processed independently in this order.
    #[serde(default)]
    pub columns: Vec<TrackedColumn>,
}

impl FieldMapping {
    /// Create a mapping with no tracked columns.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Add a tracked `(column, target)` pair.
    pub fn track(mut self, column: impl Into<String>, target: impl Into<String>) -> Self {
        self.columns.push(TrackedColumn::new(column, target));
        self
    }

    /// Parse a mapping from JSON text.
    pub fn from_json_str(input: &str) -> FlattenResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a mapping from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> FlattenResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldMapping, TrackedColumn};

    #[test]
    fn columns_default_to_empty() {
        let mapping = FieldMapping::from_json_str(r#"{"table": "t"}"#).unwrap();
        assert_eq!(mapping, FieldMapping::new("t"));
    }

    #[test]
    fn track_preserves_order() {
        let mapping = FieldMapping::new("t").track("a", "a_ext").track("b", "b_ext");
        assert_eq!(
            mapping.columns,
            vec![TrackedColumn::new("a", "a_ext"), TrackedColumn::new("b", "b_ext")]
        );
    }

    #[test]
    fn missing_table_is_a_json_error() {
        let err = FieldMapping::from_json_str(r#"{"columns": []}"#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("json error"));
        assert!(msg.contains("missing field `table`"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = FieldMapping::from_path("tests/fixtures/does_not_exist.json").unwrap_err();
        assert!(err.to_string().starts_with("io error"));
    }
}
