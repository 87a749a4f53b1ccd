//! # Reconciliation Benchmark
//!
//! Steady-state cost of folding a snapshot into the registry, plus decoding
//! the wire value it came from.
//!
//! Run with: `cargo bench --package arbor_view`

#![allow(missing_docs)]

use arbor_shared::{Entity, Snapshot};
use arbor_view::{EntityViewRegistry, RegistryConfig, VanishedPolicy};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn forest(count: u32, shift: f64) -> Snapshot {
    Snapshot::from_entities(
        (0..count)
            .map(|i| {
                let x = f64::from(i % 50) * 10.0 + shift;
                let y = f64::from(i / 50) * 10.0;
                Entity::tree(i, x, y, 5.0 + f64::from(i % 4))
            })
            .collect(),
    )
}

/// First sight: every identity creates a handle.
fn bench_first_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_first_pass");

    for count in [100_u32, 1_000, 10_000] {
        let snapshot = forest(count, 0.0);
        group.bench_with_input(BenchmarkId::from_parameter(count), &snapshot, |b, snapshot| {
            b.iter(|| {
                let mut registry = EntityViewRegistry::default();
                black_box(registry.reconcile(snapshot))
            });
        });
    }

    group.finish();
}

/// Known identities moving every frame.
fn bench_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_steady_state");

    for count in [100_u32, 1_000, 10_000] {
        let frames = [forest(count, 0.0), forest(count, 1.0)];
        let mut registry = EntityViewRegistry::default();
        registry.reconcile(&frames[0]);

        group.bench_with_input(BenchmarkId::from_parameter(count), &frames, |b, frames| {
            let mut flip = 0;
            b.iter(|| {
                flip ^= 1;
                black_box(registry.reconcile(&frames[flip]))
            });
        });
    }

    group.finish();
}

/// Every other identity vanishes and comes back.
fn bench_remove_policy(c: &mut Criterion) {
    let full = forest(1_000, 0.0);
    let half = Snapshot::from_entities(full.iter().copied().filter(|e| e.id.raw() % 2 == 0).collect());

    c.bench_function("reconcile_remove_churn_1000", |b| {
        let mut registry = EntityViewRegistry::new(RegistryConfig {
            vanished: VanishedPolicy::Remove,
            ..RegistryConfig::default()
        });
        b.iter(|| {
            registry.reconcile(&full);
            black_box(registry.reconcile(&half))
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let wire = forest(1_000, 0.0).to_json();

    c.bench_function("snapshot_decode_1000", |b| {
        b.iter(|| black_box(Snapshot::from_json(black_box(&wire))));
    });
}

criterion_group!(
    benches,
    bench_first_pass,
    bench_steady_state,
    bench_remove_policy,
    bench_decode,
);

criterion_main!(benches);
