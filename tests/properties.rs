use proptest::prelude::*;
use subtable_flatten::config::FieldMapping;
use subtable_flatten::processing::{build_selection, extract_codes, project};
use subtable_flatten::types::{FieldValue, Record, Row, Subtable, UserEntity, UserSelect};

fn code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-e]{1,2}"]
}

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(code_strategy(), 0..5), 0..6)
}

fn table_of(rows: &[Vec<String>]) -> Subtable {
    Subtable::new(
        rows.iter()
            .enumerate()
            .map(|(i, codes)| {
                let select = UserSelect::new(codes.iter().map(UserEntity::new).collect());
                Row::new(i.to_string(), [("col", FieldValue::from(select))])
            })
            .collect(),
    )
}

fn record_of(rows: &[Vec<String>]) -> Record {
    let mut record = Record::new();
    record.insert("table", table_of(rows));
    record.insert("col_ext", UserSelect::new(Vec::new()));
    record
}

proptest! {
    #[test]
    fn extraction_is_first_seen_dedup_without_empties(rows in rows_strategy()) {
        let table = table_of(&rows);
        let out = extract_codes(Some(&table), "col");

        let mut expected: Vec<String> = Vec::new();
        for code in rows.iter().flatten() {
            if !code.is_empty() && !expected.contains(code) {
                expected.push(code.clone());
            }
        }
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn selection_preserves_cardinality(codes in prop::collection::vec("[a-z]{1,4}", 0..10)) {
        let out = build_selection(&codes);
        prop_assert_eq!(out.len(), codes.len());
        let written: Vec<&str> = out.iter().map(|e| e.code()).collect();
        let given: Vec<&str> = codes.iter().map(String::as_str).collect();
        prop_assert_eq!(written, given);
    }

    #[test]
    fn projection_is_pure_and_deterministic(rows in rows_strategy()) {
        let mapping = FieldMapping::new("table").track("col", "col_ext").track("missing", "nowhere");
        let record = record_of(&rows);
        let snapshot = record.clone();

        let first = project(&record, &mapping);
        let second = project(&record, &mapping);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&record, &snapshot);
        prop_assert_eq!(first.len(), record.len());
        prop_assert!(!first.contains("nowhere"));
        if rows.is_empty() {
            prop_assert_eq!(&first, &record);
        }
    }
}
