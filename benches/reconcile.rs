use std::fmt::Write;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use gridnote::registry::builtin;
use gridnote::{
    BuiltinDefinitions, LayoutRegistry, ParsedDocument, ReconcileOptions, SectionReconciler,
    validate_raw,
};
use serde_json::Value;

fn planner_note(entries_per_day: usize) -> String {
    let mut text = String::from("---\nlayout: layout-weekly-planner\n---\n# Week\n\n");
    for day in ["Monday", "Wednesday", "Friday", "Sunday"] {
        let _ = writeln!(text, "## {day}");
        for i in 0..entries_per_day {
            let _ = writeln!(text, "- [ ] task {i} for {day}");
        }
        text.push('\n');
    }
    text.push_str("## Scratch\nloose notes\n");
    text
}

fn parse_large_note(c: &mut Criterion) {
    let text = planner_note(500);
    c.bench_function("parse_large_note", |b| {
        b.iter(|| ParsedDocument::parse(black_box(&text)));
    });
}

fn reconcile_large_note(c: &mut Criterion) {
    let registry = LayoutRegistry::from_source(BuiltinDefinitions).expect("builtin layouts");
    let reconciler = SectionReconciler::new();
    let options = ReconcileOptions::default();
    let text = planner_note(500);

    c.bench_function("reconcile_large_note", |b| {
        b.iter(|| {
            reconciler
                .reconcile(&registry, black_box(&text), builtin::WEEKLY_PLANNER)
                .expect("reconcile")
        });
    });
    c.bench_function("rewrite_large_note", |b| {
        b.iter(|| {
            reconciler
                .apply_missing_sections(&registry, black_box(&text), builtin::WEEKLY_PLANNER, &options)
                .expect("rewrite")
        });
    });
}

fn validate_dense_layout(c: &mut Criterion) {
    let blocks: Vec<Value> = (0..25)
        .map(|row| {
            serde_json::json!({
                "title": format!("Row {row}"),
                "x": 0,
                "y": row * 4,
                "w": 24,
                "h": 4,
            })
        })
        .collect();
    c.bench_function("validate_dense_layout", |b| {
        b.iter(|| validate_raw(black_box(&blocks)));
    });
}

criterion_group!(
    benches,
    parse_large_note,
    reconcile_large_note,
    validate_dense_layout
);
criterion_main!(benches);
