//! Record projection: sub-table column unions written onto flat target fields.

use tracing::{debug, trace};

use crate::config::FieldMapping;
use crate::types::Record;

use super::build::build_selection;
use super::extract::extract_codes;

/// Counters describing what a single projection did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    /// Rows in the sub-table (zero if it was absent).
    pub table_rows: usize,
    /// Target fields that existed and received a new value.
    pub targets_written: usize,
    /// Tracked pairs whose target field was absent from the record.
    pub targets_missing: usize,
    /// Total codes written across all targets.
    pub codes_written: usize,
}

/// Returns a new [`Record`] whose tracked target fields hold the de-duplicated union of codes
/// from the corresponding sub-table column.
///
/// This is a convenience wrapper around [`project_with_stats`].
pub fn project(record: &Record, mapping: &FieldMapping) -> Record {
    project_with_stats(record, mapping).0
}

/// Like [`project`], also reporting [`ProjectionStats`].
///
/// - If the sub-table field is absent, not a `SUBTABLE`, or has no rows, the result is an
///   unchanged copy of `record`.
/// - Each tracked pair is handled independently. A target that does not exist in `record` is
///   never created; its extraction result is dropped.
/// - A present target keeps all of its attributes; only its `value` is replaced.
/// - Every other field is carried over as is, in the same order.
pub fn project_with_stats(record: &Record, mapping: &FieldMapping) -> (Record, ProjectionStats) {
    let mut stats = ProjectionStats::default();

    let table = match record.subtable(&mapping.table) {
        Some(table) if !table.is_empty() => table,
        _ => {
            debug!(table = %mapping.table, "sub-table absent or empty; record unchanged");
            return (record.clone(), stats);
        }
    };
    stats.table_rows = table.row_count();

    let mut out = record.clone();
    for tracked in &mapping.columns {
        let codes = extract_codes(Some(table), &tracked.column);
        let Some(target) = out.get_mut(&tracked.target) else {
            debug!(
                column = %tracked.column,
                target = %tracked.target,
                "target field absent; skipping"
            );
            stats.targets_missing += 1;
            continue;
        };

        target.assign_selection(build_selection(&codes));
        trace!(target = %tracked.target, codes = codes.len(), "target written");
        stats.targets_written += 1;
        stats.codes_written += codes.len();
    }

    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::{ProjectionStats, project, project_with_stats};
    use crate::config::FieldMapping;
    use crate::types::Record;
    use serde_json::{Value, json};

    fn mapping() -> FieldMapping {
        FieldMapping::new("table")
            .track("col1", "col1_ext")
            .track("col2", "col2_ext")
    }

    fn record(value: Value) -> Record {
        Record::from_json(value).unwrap()
    }

    fn users(codes: &[&str]) -> Value {
        let entities: Vec<Value> = codes
            .iter()
            .map(|c| json!({"code": c, "name": c.to_uppercase()}))
            .collect();
        json!({"type": "USER_SELECT", "value": entities})
    }

    #[test]
    fn writes_both_targets_with_stats() {
        let input = record(json!({
            "title": {"type": "SINGLE_LINE_TEXT", "value": "x"},
            "table": {"type": "SUBTABLE", "value": [
                {"id": "1", "value": {"col1": users(&["u1", "u2"]), "col2": users(&["a"])}},
                {"id": "2", "value": {"col1": users(&["u2", "u4"]), "col2": users(&["a", "b"])}}
            ]},
            "col1_ext": {"type": "USER_SELECT", "value": []},
            "col2_ext": {"type": "USER_SELECT", "value": [{"code": "stale", "name": "Stale"}]}
        }));

        let (out, stats) = project_with_stats(&input, &mapping());

        assert_eq!(
            out.get("col1_ext").unwrap().to_json()["value"],
            json!([{"code": "u1"}, {"code": "u2"}, {"code": "u4"}])
        );
        assert_eq!(
            out.get("col2_ext").unwrap().to_json()["value"],
            json!([{"code": "a"}, {"code": "b"}])
        );
        assert_eq!(out.get("title"), input.get("title"));
        assert_eq!(out.get("table"), input.get("table"));
        assert_eq!(
            stats,
            ProjectionStats {
                table_rows: 2,
                targets_written: 2,
                targets_missing: 0,
                codes_written: 5,
            }
        );
    }

    #[test]
    fn wrong_kind_table_is_treated_as_absent() {
        let input = record(json!({
            "table": {"type": "SINGLE_LINE_TEXT", "value": "not a table"},
            "col1_ext": {"type": "USER_SELECT", "value": [{"code": "keep"}]}
        }));
        assert_eq!(project(&input, &mapping()), input);
    }

    #[test]
    fn missing_target_is_counted_not_created() {
        let input = record(json!({
            "table": {"type": "SUBTABLE", "value": [
                {"id": "1", "value": {"col1": users(&["u1"]), "col2": users(&["u2"])}}
            ]},
            "col2_ext": {"type": "USER_SELECT", "value": []}
        }));

        let (out, stats) = project_with_stats(&input, &mapping());

        assert!(!out.contains("col1_ext"));
        assert_eq!(out.len(), input.len());
        assert_eq!(stats.targets_missing, 1);
        assert_eq!(stats.targets_written, 1);
    }

    #[test]
    fn empty_union_clears_target() {
        let input = record(json!({
            "table": {"type": "SUBTABLE", "value": [{"id": "1", "value": {"col1": users(&[])}}]},
            "col1_ext": {"type": "USER_SELECT", "value": [{"code": "old"}]}
        }));
        let out = project(&input, &mapping());
        assert_eq!(
            out.get("col1_ext").unwrap().to_json(),
            json!({"type": "USER_SELECT", "value": []})
        );
    }

    #[test]
    fn field_order_is_preserved() {
        let input = record(json!({
            "col2_ext": {"type": "USER_SELECT", "value": []},
            "table": {"type": "SUBTABLE", "value": [
                {"id": "1", "value": {"col2": users(&["u1"])}}
            ]},
            "z": {"type": "NUMBER", "value": "1"}
        }));
        let out = project(&input, &mapping());
        assert_eq!(
            out.field_codes().collect::<Vec<_>>(),
            vec!["col2_ext", "table", "z"]
        );
    }
}
