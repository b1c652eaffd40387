//! Identifier extraction from a [`crate::types::Subtable`] column.

use indexmap::IndexSet;

use crate::types::{FieldValue, Subtable};

/// Collect the de-duplicated user codes found in `column` across all rows of `table`.
///
/// - Returns an empty vec if `table` is `None` or has no rows.
/// - Codes are returned in first-seen order, rows top to bottom, entities left to right.
/// - Empty codes are skipped. Entity names are ignored.
/// - Rows that are malformed, lack `column`, or hold a non-`USER_SELECT` cell contribute nothing.
pub fn extract_codes(table: Option<&Subtable>, column: &str) -> Vec<String> {
    let Some(table) = table else {
        return Vec::new();
    };

    let mut seen: IndexSet<&str> = IndexSet::new();
    for row in &table.rows {
        match row.cell(column) {
            Some(FieldValue::UserSelect(select)) => {
                seen.extend(select.codes().filter(|code| !code.is_empty()));
            }
            Some(_) | None => {}
        }
    }

    seen.into_iter().map(str::to_owned).collect()
}
