//! Benchmark suite for the claude-loop decision core.
//!
//! Covers the synchronous per-iteration paths:
//! - State document parsing
//! - Idle evaluation
//! - Suggestion rotation
//! - JSON extraction from model responses
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench -- --save-baseline main
//! cargo bench -- --baseline main
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use claude_loop::analysis::response::first_json_object;
use claude_loop::presets::{select, PresetTable};
use claude_loop::{evaluate, Snapshot};

/// Build a state document with `items` backlog and completed entries.
fn state_document(items: usize) -> String {
    let mut doc = String::from(
        "---\niteration: 7\nmax_iterations: 50\nmode: review\nscope: src/\n\
         issues_found: 4\nissues_fixed: 2\n---\n\n## Current Focus\nTighten parser\n\n## Backlog\n",
    );
    for i in 0..items {
        doc.push_str(&format!("- [ ] Backlog item {i}\n"));
    }
    doc.push_str("\n## Completed\n");
    for i in 0..items {
        doc.push_str(&format!("- [x] Completed item {i}\n"));
    }
    doc
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_parse");

    for items in [5, 50, 500] {
        let doc = state_document(items);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &doc, |b, doc| {
            b.iter(|| black_box(Snapshot::parse(black_box(doc))));
        });
    }

    group.finish();
}

// ============================================================================
// Idle Evaluation
// ============================================================================

fn bench_evaluate(c: &mut Criterion) {
    let before = Snapshot::parse(&state_document(50));
    let mut after = before.clone();
    after.completed.push("One more".to_string());

    c.bench_function("idle_evaluate", |b| {
        b.iter(|| black_box(evaluate(black_box(&before), black_box(&after), "")));
    });
}

// ============================================================================
// Rotation
// ============================================================================

fn bench_select(c: &mut Criterion) {
    let table = PresetTable::builtin();

    c.bench_function("suggestion_select", |b| {
        b.iter(|| black_box(select(&table, black_box("ui"), black_box(-12_345))));
    });
}

// ============================================================================
// Response Extraction
// ============================================================================

fn bench_first_json_object(c: &mut Criterion) {
    let response = format!(
        "{} {{not json}} {}",
        "Here is my analysis of the loop state.".repeat(20),
        r#"{"suggested_next_focus": "Add fuzz tests", "progress_status": "progressing", "continuation_prompt": "Write fuzz tests for {braces} in strings.", "scope_aligned": true}"#
    );

    c.bench_function("first_json_object", |b| {
        b.iter(|| black_box(first_json_object(black_box(&response))));
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_evaluate,
    bench_select,
    bench_first_json_object
);
criterion_main!(benches);
