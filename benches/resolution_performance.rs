//! Benchmark suite for cursor resolution and completion
//!
//! This benchmark measures:
//! - Key stack reconstruction as documents grow
//! - Attribute owner resolution through nested inline lists
//! - Schema traversal and key completion
//! - Placeholder trie construction with meta-keyword linking

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lsp_types::Position;
use mythic_analyzer::parsers::get_ancestor_keys;
use ropey::Rope;
use test_utils::fixtures::{large_mob_file, sample_bundle, sample_context};

const LINES_PER_MOB: u32 = 9;

/// Benchmark ancestor-key scans at the end of progressively larger files
fn bench_key_stack(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_stack");

    for mobs in &[1usize, 10, 100, 1000] {
        let rope = Rope::from_str(&large_mob_file(*mobs));
        let position = Position::new((*mobs as u32 - 1) * LINES_PER_MOB + 5, 10);

        group.throughput(Throughput::Elements(*mobs as u64));
        group.bench_with_input(BenchmarkId::new("ancestors", mobs), &rope, |b, rope| {
            b.iter(|| get_ancestor_keys(rope, black_box(position)));
        });
    }

    group.finish();
}

/// Benchmark owner resolution for an attribute of a condition nested in an inline list
fn bench_owner_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("owner_resolution");
    let context = sample_context();

    for mobs in &[1usize, 100, 1000] {
        let rope = Rope::from_str(&large_mob_file(*mobs));
        let position = Position::new((*mobs as u32 - 1) * LINES_PER_MOB + 5, 35);

        group.bench_with_input(BenchmarkId::new("nested_condition_attribute", mobs), &rope, |b, rope| {
            b.iter(|| context.resolve_owner(rope, black_box(position)));
        });
    }

    group.finish();
}

/// Benchmark schema key and value completion in a mob file
fn bench_schema_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_completion");
    let context = sample_context();

    let keys = Rope::from_str("Boss:\n  Options:\n    ");
    group.bench_function("option_keys", |b| {
        b.iter(|| context.complete_schema(&keys, black_box(Position::new(2, 4)), "Mob"));
    });

    let value = Rope::from_str("Boss:\n  Type: ");
    group.bench_function("entity_type_values", |b| {
        b.iter(|| context.complete_schema(&value, black_box(Position::new(1, 8)), "Mob"));
    });

    group.finish();
}

/// Benchmark a full context build, dominated by placeholder trie linking
fn bench_context_build(c: &mut Criterion) {
    let bundle = sample_bundle();
    c.bench_function("context_build", |b| {
        b.iter(|| mythic_analyzer::context::ResolutionContext::build(black_box(&bundle)));
    });
}

criterion_group!(
    benches,
    bench_key_stack,
    bench_owner_resolution,
    bench_schema_completion,
    bench_context_build
);
criterion_main!(benches);
