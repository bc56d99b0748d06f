//! # Sensate Gateway Benchmarks
//!
//! Hot path throughput:
//!
//! | Path | Operation |
//! |------|-----------|
//! | gw-01 Authorization | `can_process` on a warm cache |
//! | gw-02 Ingestion | `submit` (decide + push) |
//! | gw-02 Ingestion | `process` drain of a full buffer |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gw_02_ingestion::IngestionApi;
use gw_tests::fixtures::{measurement, sensor_id, Gateway};
use rand::Rng;
use shared_bus::NoOpPublisher;
use std::sync::Arc;

fn warm_gateway(sensors: u32, capacity: usize) -> Gateway {
    let gw = Gateway::new(Arc::new(NoOpPublisher), capacity);
    for n in 0..sensors {
        gw.register_sensor(n);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    runtime.block_on(gw.reloader.reload_all()).expect("reload");
    gw
}

// ============================================================================
// GW-01: Admission decision
// ============================================================================

fn bench_can_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("gw-01-authorization");

    for sensors in [100u32, 10_000] {
        let gw = warm_gateway(sensors, 16);
        let mut rng = rand::thread_rng();
        let samples: Vec<_> = (0..1_000)
            .map(|i| measurement(sensor_id(rng.gen_range(0..sensors)), i))
            .collect();

        group.throughput(Throughput::Elements(samples.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("can_process", sensors),
            &samples,
            |b, samples| {
                b.iter(|| {
                    for m in samples {
                        black_box(gw.cache.can_process(m));
                    }
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// GW-02: Submit and drain
// ============================================================================

fn bench_submit_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("gw-02-ingestion");

    for batch in [100usize, 10_000] {
        let gw = warm_gateway(100, batch);
        let samples: Vec<_> = (0..batch)
            .map(|i| measurement(sensor_id((i % 100) as u32), i))
            .collect();

        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(
            BenchmarkId::new("submit_then_flush", batch),
            &samples,
            |b, samples| {
                b.iter(|| {
                    for m in samples {
                        black_box(gw.service.submit(m.clone()));
                    }
                    black_box(gw.service.flush().expect("flush"));
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_can_process, bench_submit_and_drain);
criterion_main!(benches);
