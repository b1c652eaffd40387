use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use subtable_flatten::config::FieldMapping;
use subtable_flatten::execution::{ExecutionEngine, ExecutionOptions};
use subtable_flatten::processing::project;
use subtable_flatten::types::Record;

fn record_with_rows(rows: usize) -> Record {
    let rows: Vec<_> = (0..rows)
        .map(|i| {
            json!({"id": i.to_string(), "value": {
                "assignee": {"type": "USER_SELECT", "value": [{"code": format!("u{}", i % 17)}, {"code": format!("u{}", i % 5)}]},
                "reviewer": {"type": "USER_SELECT", "value": [{"code": format!("r{}", i % 3)}]}
            }})
        })
        .collect();
    Record::from_json(json!({
        "assignments": {"type": "SUBTABLE", "value": rows},
        "assignees_all": {"type": "USER_SELECT", "value": []},
        "reviewers_all": {"type": "USER_SELECT", "value": []}
    }))
    .expect("bench record")
}

fn mapping() -> FieldMapping {
    FieldMapping::new("assignments")
        .track("assignee", "assignees_all")
        .track("reviewer", "reviewers_all")
}

fn bench_project(c: &mut Criterion) {
    let record = record_with_rows(200);
    let mapping = mapping();
    c.bench_function("project_200_rows", |b| {
        b.iter(|| project(black_box(&record), black_box(&mapping)))
    });
}

fn bench_batch(c: &mut Criterion) {
    let records: Vec<Record> = (0..1_000).map(|_| record_with_rows(20)).collect();
    let mapping = mapping();
    let engine = ExecutionEngine::new(ExecutionOptions::default()).expect("engine");
    c.bench_function("project_batch_1000_records", |b| {
        b.iter(|| engine.project_batch(black_box(&records), black_box(&mapping)))
    });
}

criterion_group!(benches, bench_project, bench_batch);
criterion_main!(benches);
