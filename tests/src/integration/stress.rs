//! # Concurrency Stress
//!
//! Producers, drains, cache sweeps and reloads racing on one gateway.
//! Every admitted payload must be published exactly once.

#[cfg(test)]
mod tests {
    use crate::fixtures::{measurement, Gateway};
    use gw_02_ingestion::{Admission, IngestionApi};
    use rand::Rng;
    use shared_bus::RecordingPublisher;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 1_000;
    const SENSORS: u32 = 16;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_no_loss_under_concurrent_drain_and_maintenance() {
        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), PRODUCERS * PER_PRODUCER);

        let ids: Vec<_> = (0..SENSORS).map(|n| gw.register_sensor(n)).collect();
        gw.reloader.reload_all().await.unwrap();

        let admitted = AtomicUsize::new(0);
        let reloads = AtomicUsize::new(0);
        let done = AtomicBool::new(false);
        let runtime = tokio::runtime::Handle::current();

        std::thread::scope(|s| {
            let producers: Vec<_> = (0..PRODUCERS)
                .map(|p| {
                    let gw = &gw;
                    let ids = &ids;
                    let admitted = &admitted;
                    s.spawn(move || {
                        let mut rng = rand::thread_rng();
                        for i in 0..PER_PRODUCER {
                            let id = ids[rng.gen_range(0..ids.len())];
                            let outcome = gw.service.submit(measurement(id, p * PER_PRODUCER + i));
                            if outcome == Admission::Admitted {
                                admitted.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    })
                })
                .collect();

            // Drains, sweeps and reloads until every producer is finished
            s.spawn(|| loop {
                let finished = done.load(Ordering::Acquire);
                gw.service.flush().unwrap();
                gw.reloader.sweep();
                let summary = runtime.block_on(gw.reloader.reload_sensors(&ids)).unwrap();
                assert_eq!(summary.sensors, ids.len());
                reloads.fetch_add(1, Ordering::Relaxed);
                if finished {
                    break;
                }
                std::thread::yield_now();
            });

            for producer in producers {
                producer.join().unwrap();
            }
            done.store(true, Ordering::Release);
        });
        gw.service.flush().unwrap();

        let published = publisher.payloads();
        let distinct: HashSet<&String> = published.iter().collect();

        // Clock never moves, so every sensor stays fresh
        assert_eq!(admitted.load(Ordering::Relaxed), PRODUCERS * PER_PRODUCER);
        assert_eq!(published.len(), PRODUCERS * PER_PRODUCER);
        assert_eq!(distinct.len(), published.len());
        assert!(gw.buffer.is_empty());
        assert!(reloads.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn test_overflow_under_contention_accounts_for_every_payload() {
        const CAPACITY: usize = 500;

        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), CAPACITY);
        let id = gw.register_sensor(1);
        gw.cache
            .append_sensors(vec![shared_types::SensorRecord::new(id, uuid::Uuid::new_v4())]);

        let overflowed = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for p in 0..PRODUCERS {
                let gw = &gw;
                let overflowed = &overflowed;
                s.spawn(move || {
                    for i in 0..100 {
                        let outcome = gw.service.submit(measurement(id, p * 100 + i));
                        if let Admission::Overflow(_) = outcome {
                            overflowed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert_eq!(gw.buffer.len(), CAPACITY);
        assert_eq!(
            overflowed.load(Ordering::Relaxed),
            PRODUCERS * 100 - CAPACITY
        );
    }
}
