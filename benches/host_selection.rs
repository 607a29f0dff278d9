//! Benchmarks for the retry strategy hot path
//!
//! This benchmark measures:
//! - Tryable host selection over registries of various sizes
//! - Outcome classification with state updates
//! - Selection under contention from concurrent tasks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use search_client::config::default_hosts;
use search_client::transport::{CallType, Host, RetryStrategy};

fn registry(size: usize) -> RetryStrategy {
    let hosts: Vec<Host> = (0..size)
        .map(|i| Host::new(format!("host-{}.example.net", i)))
        .collect();
    RetryStrategy::from_hosts(hosts)
}

fn bench_tryable_hosts(c: &mut Criterion) {
    let mut group = c.benchmark_group("tryable_hosts");
    for size in [5usize, 20, 100] {
        let strategy = registry(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &strategy, |b, s| {
            b.iter(|| black_box(s.tryable_hosts(black_box(CallType::READ))))
        });
    }

    let half_down = registry(20);
    for id in (0..20).step_by(2) {
        half_down.decide(id, 503, false, false);
    }
    group.bench_function("half_down_20", |b| {
        b.iter(|| black_box(half_down.tryable_hosts(CallType::READ)))
    });
    group.finish();
}

fn bench_decide(c: &mut Criterion) {
    let strategy = RetryStrategy::from_hosts(default_hosts("BENCHAPP"));
    let mut group = c.benchmark_group("decide");
    for (name, status, timed_out, network_error) in [
        ("success", 200u16, false, false),
        ("server_error", 503, false, false),
        ("client_error", 404, false, false),
        ("timeout", 0, true, false),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(strategy.decide(black_box(2), status, timed_out, network_error)))
        });
    }
    group.finish();
}

fn bench_contended_selection(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .build()
        .unwrap();
    let strategy = Arc::new(RetryStrategy::from_hosts(default_hosts("BENCHAPP")));

    c.bench_function("contended_select_and_decide_x64", |b| {
        b.to_async(&rt).iter(|| {
            let strategy = strategy.clone();
            async move {
                let tasks: Vec<_> = (0..64)
                    .map(|i| {
                        let s = strategy.clone();
                        tokio::spawn(async move {
                            let hosts = s.tryable_hosts(CallType::READ);
                            let status = if i % 8 == 0 { 503 } else { 200 };
                            s.decide(hosts[0].id, status, false, false)
                        })
                    })
                    .collect();
                for t in tasks {
                    black_box(t.await.unwrap());
                }
            }
        })
    });
}

criterion_group!(benches, bench_tryable_hosts, bench_decide, bench_contended_selection);
criterion_main!(benches);
