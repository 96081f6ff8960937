//! Version dispatch benchmark suite.
//!
//! Benchmarks the per-session decision path:
//! - Version parsing and comparison
//! - Compatibility plan resolution
//! - Registry build and toggle binding
//! - Event normalization into the log
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pusher_compat::connection::{EventBus, NormalizedEvent};
use pusher_compat::library::SimulatedLibrary;
use pusher_compat::transport::{Environment, TransportOverrideController, TransportRegistry};
use pusher_compat::ui::MemoryBoard;
use pusher_compat::version::{CompatibilityPlan, Version, compare};
use pusher_compat::{CategoryVisibility, LogRouter};
use rustc_hash::FxHashSet;
use serde_json::json;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const VERSIONS: &[&str] = &["1.3.0", "1.4.2", "1.9.0", "2.1.6", "3.1.0", "7.0.3"];

// ============================================================================
// Benchmark: Comparator
// ============================================================================

fn bench_version(c: &mut Criterion) {
    let mut group = c.benchmark_group("version");

    group.bench_function("parse", |b| {
        b.iter(|| {
            for v in VERSIONS {
                black_box(v.parse::<Version>().ok());
            }
        });
    });

    let parsed: Vec<Version> = VERSIONS.iter().filter_map(|v| v.parse().ok()).collect();
    group.bench_function("compare_all_pairs", |b| {
        b.iter(|| {
            let mut total = 0i32;
            for a in &parsed {
                for other in &parsed {
                    total += i32::from(compare(black_box(a), black_box(other)));
                }
            }
            total
        });
    });

    group.finish();
}

// ============================================================================
// Benchmark: Plan Resolution
// ============================================================================

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");

    for raw in VERSIONS {
        let version: Version = raw.parse().expect("benchmark version");
        group.bench_with_input(BenchmarkId::new("resolve", raw), &version, |b, &version| {
            b.iter(|| CompatibilityPlan::resolve(black_box(version), Environment::new(true)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Registry + Overrides
// ============================================================================

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");
    let enabled: FxHashSet<String> = ["ws", "sockjs"].iter().map(|s| s.to_string()).collect();

    for raw in ["2.1.6", "3.1.0"] {
        let version: Version = raw.parse().expect("benchmark version");
        let library = SimulatedLibrary::new(version).with_default_transports();
        let plan = CompatibilityPlan::resolve(version, Environment::new(false));

        group.bench_function(BenchmarkId::new("build_and_bind", raw), |b| {
            b.iter(|| {
                let registry = TransportRegistry::build(plan.registry_shape, &library);
                let board = MemoryBoard::standard();
                let overrides = TransportOverrideController::new().initialize(
                    &registry,
                    Environment::new(false),
                    &enabled,
                    &board,
                );
                black_box(overrides.len())
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Event Normalization
// ============================================================================

fn bench_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("events");

    group.bench_function("emit_and_record_1000", |b| {
        b.iter(|| {
            let bus = EventBus::new();
            let log = LogRouter::new(CategoryVisibility::all_visible());
            let recorder = log.clone();
            bus.subscribe_all(std::sync::Arc::new(move |event: &NormalizedEvent| {
                recorder.record(event);
            }));

            for i in 0..1000 {
                bus.emit(NormalizedEvent::message(
                    json!({ "seq": i }),
                    Some("public-channel".to_string()),
                ));
            }
            log.len()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_version, bench_plan, bench_registry, bench_events);
criterion_main!(benches);
