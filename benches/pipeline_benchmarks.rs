//! Performance benchmarks for the template interop pipeline.
//!
//! - Front end: parsing and semantic analysis of guest sources
//! - Specialization: canonicalize, instantiate and emit
//! - Scaling: many distinct instances, and runaway recursion hitting the depth limit

use bumpalo::Bump;
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use interop::{Frontend, GuestFrontend, Session, SessionConfig};
use interop_parser::Parser;
use std::hint::black_box;

const TEST_H: &str = include_str!("../test_sources/test.h");
const CONTAINERS_H: &str = include_str!("../test_sources/containers.h");

/// `count` independent templates, each with a method and a static assertion.
fn many_templates(count: usize) -> String {
    let mut source = String::new();
    for i in 0..count {
        source.push_str(&format!(
            "template<class T, int N = {n}>\nstruct Box{i} {{\n  static_assert(N > 0, \"empty\");\n  T items[N];\n  T get(int at) const;\n}};\n",
            n = i % 7 + 1,
            i = i
        ));
    }
    source
}

/// A template whose instances embed ever smaller instances, without end.
const RUNAWAY_H: &str = "template<int N> struct Level { Level<N - 1> inner; int value; };\n";

fn front_end_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("frontend");

    group.throughput(Throughput::Bytes(TEST_H.len() as u64));
    group.bench_function("parse_test_h", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let unit = Parser::parse(black_box(TEST_H), &arena).map(|unit| unit.items().len());
            black_box(unit.is_ok())
        });
    });

    group.throughput(Throughput::Bytes(CONTAINERS_H.len() as u64));
    group.bench_function("analyze_containers_h", |b| {
        let frontend = GuestFrontend::default();
        b.iter(|| {
            let unit = frontend.parse_source("containers.h", black_box(CONTAINERS_H));
            black_box(unit.map(|unit| unit.decl_count()).ok())
        });
    });

    let large = many_templates(500);
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("analyze_500_templates", |b| {
        let frontend = GuestFrontend::default();
        b.iter(|| {
            let unit = frontend.parse_source("large.h", black_box(&large));
            black_box(unit.map(|unit| unit.decl_count()).ok())
        });
    });

    group.finish();
}

fn specialization_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("specialize");

    group.bench_function("foo_int_4", |b| {
        b.iter_batched(
            || Session::from_source("test.h", TEST_H, SessionConfig::default()).ok(),
            |session| {
                let mut session = session?;
                let spec = session.specialize("Foo", &["int", "4"]).ok()?;
                black_box(spec.size);
                Some(())
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("cached_instance", |b| {
        let Ok(mut session) = Session::from_source("test.h", TEST_H, SessionConfig::default()) else {
            return;
        };
        let _ = session.specialize("Foo", &["int", "4"]);
        b.iter(|| black_box(session.specialize("Foo", &["int", "4"]).map(|s| s.size).ok()));
    });

    group.bench_function("canonicalize_only", |b| {
        let Ok(session) = Session::from_source("containers.h", CONTAINERS_H, SessionConfig::default()) else {
            return;
        };
        let array = session.resolve("geo::Array");
        let Ok(args) = session.build_arguments(&array, &["geo::Point", "3"]) else {
            return;
        };
        b.iter(|| black_box(session.canonicalize(&array, &args).ok()));
    });

    group.bench_function("emit_after_specialize", |b| {
        let Ok(mut session) = Session::from_source("test.h", TEST_H, SessionConfig::default()) else {
            return;
        };
        let _ = session.specialize("Foo", &["int", "4"]);
        b.iter(|| black_box(session.emit().map(|module| module.to_string().len()).ok()));
    });

    group.finish();
}

fn scaling_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    let source = many_templates(1);
    for count in [16u32, 128, 512] {
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_function(format!("distinct_instances_{count}"), |b| {
            b.iter_batched(
                || Session::from_source("box.h", &source, SessionConfig::default()).ok(),
                |session| {
                    let mut session = session?;
                    for n in 1..=count {
                        let token = n.to_string();
                        session.specialize("Box0", &["int", token.as_str()]).ok()?;
                    }
                    black_box(session.unit().decl_count());
                    Some(())
                },
                BatchSize::SmallInput,
            );
        });
    }

    // Measures hitting the depth limit and rolling the arena back.
    for depth in [64usize, 256] {
        group.bench_function(format!("runaway_depth_{depth}"), |b| {
            let config = SessionConfig {
                max_instantiation_depth: depth,
                ..SessionConfig::default()
            };
            let Ok(mut session) = Session::from_source("runaway.h", RUNAWAY_H, config) else {
                return;
            };
            b.iter(|| black_box(session.specialize("Level", &["8"]).is_err()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    front_end_benchmarks,
    specialization_benchmarks,
    scaling_benchmarks
);

criterion_main!(benches);
