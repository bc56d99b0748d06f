//! # Integration Test Flows
//!
//! Authorization (1) and Ingestion (2) wired together over the shared bus.
//!
//! ## Flows Tested
//!
//! 1. **Reload → Admit → Drain → Bus**: repository records reach the cache,
//!    admitted payloads reach a bus subscriber in order
//! 2. **Blacklist**: a blacklisted sensor is rejected whether cached or not
//! 3. **Deferred retry**: an unknown sensor is deferred, reloaded, then admitted
//! 4. **Expiry**: without a reload, sensors age out and measurements defer

#[cfg(test)]
mod tests {
    use crate::fixtures::{measurement, sensor_id, Gateway, T0};
    use gw_01_authorization::SensorStatus;
    use gw_02_ingestion::{Admission, BufferError, IngestionApi};
    use shared_bus::{InMemoryMeasurementBus, PublishError, RecordingPublisher};
    use shared_types::TimeSource;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    // =========================================================================
    // RELOAD → ADMIT → DRAIN → BUS
    // =========================================================================

    #[tokio::test]
    async fn test_admitted_measurements_reach_bus_subscriber() {
        let bus = Arc::new(InMemoryMeasurementBus::new());
        let mut subscription = bus.subscribe();
        let gw = Gateway::new(bus.clone(), 100);

        let s1 = gw.register_sensor(1);
        gw.reloader.reload_all().await.unwrap();

        let sent: Vec<_> = (0..3).map(|seq| measurement(s1, seq)).collect();
        for m in &sent {
            assert_eq!(gw.service.submit(m.clone()), Admission::Admitted);
        }
        assert_eq!(gw.service.flush().unwrap(), 3);
        assert!(gw.buffer.is_empty());

        let batch = timeout(Duration::from_millis(100), subscription.recv())
            .await
            .expect("timeout")
            .expect("batch");
        let expected: Vec<String> = sent.into_iter().map(|m| m.payload).collect();
        assert_eq!(batch.payloads, expected);
    }

    #[tokio::test]
    async fn test_json_payloads_flow_end_to_end() {
        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), 100);

        let s1 = gw.register_sensor(1);
        gw.reloader.reload_all().await.unwrap();

        let payload = format!(r#"{{"CreatedById":"{s1}","value":3.2}}"#);
        assert_eq!(gw.service.submit_json(payload.clone()), Admission::Admitted);
        assert_eq!(
            gw.service.submit_json("{broken".to_string()),
            Admission::Rejected
        );

        gw.service.flush().unwrap();
        assert_eq!(publisher.payloads(), vec![payload]);
    }

    #[tokio::test]
    async fn test_bus_without_subscribers_reports_failure() {
        let bus = Arc::new(InMemoryMeasurementBus::new());
        let gw = Gateway::new(bus, 100);

        let s1 = gw.register_sensor(1);
        gw.reloader.reload_all().await.unwrap();
        gw.service.submit(measurement(s1, 0));

        match gw.service.flush() {
            Err(BufferError::PublishFailed { source, batch }) => {
                assert!(matches!(source, PublishError::NoSubscribers { .. }));
                assert_eq!(batch.len(), 1);
            }
            other => panic!("unexpected flush result: {other:?}"),
        }
    }

    // =========================================================================
    // BLACKLIST
    // =========================================================================

    #[tokio::test]
    async fn test_blacklisted_never_appended_sensor_is_unavailable() {
        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), 100);

        let s2 = sensor_id(2);
        gw.cache.append_blacklist(s2);

        assert_eq!(gw.cache.can_process(&measurement(s2, 0)), SensorStatus::Unavailable);
        assert_eq!(gw.service.submit(measurement(s2, 0)), Admission::Rejected);
    }

    #[tokio::test]
    async fn test_blacklist_survives_reload_and_clear() {
        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), 100);

        let s1 = gw.register_sensor(1);
        gw.reloader.reload_all().await.unwrap();
        gw.cache.append_blacklist(s1);

        gw.cache.clear();
        gw.reloader.reload_all().await.unwrap();

        assert!(gw.cache.get_sensor(&s1, T0).is_some());
        assert_eq!(gw.service.submit(measurement(s1, 0)), Admission::Rejected);

        gw.cache.remove_from_blacklist(&s1);
        assert_eq!(gw.service.submit(measurement(s1, 1)), Admission::Admitted);
    }

    // =========================================================================
    // DEFERRED RETRY & EXPIRY
    // =========================================================================

    #[tokio::test]
    async fn test_deferred_measurement_admitted_after_reload() {
        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), 100);

        let s3 = gw.register_sensor(3);
        let deferred = match gw.service.submit(measurement(s3, 0)) {
            Admission::Deferred(m) => m,
            other => panic!("expected deferral, got {other:?}"),
        };

        gw.reloader.reload_sensors(&[deferred.sensor_id]).await.unwrap();
        assert_eq!(gw.service.submit(deferred), Admission::Admitted);
    }

    #[tokio::test]
    async fn test_sensors_expire_without_reload() {
        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), 100);

        let s1 = gw.register_sensor(1);
        gw.reloader.reload_all().await.unwrap();

        gw.clock.advance(Duration::from_secs(5 * 60));
        assert_eq!(gw.service.submit(measurement(s1, 0)), Admission::Admitted);

        gw.clock.advance(Duration::from_secs(2 * 60));
        assert!(matches!(
            gw.service.submit(measurement(s1, 1)),
            Admission::Deferred(_)
        ));

        assert!(gw.reloader.is_reload_due(gw.clock.now()));
        assert_eq!(gw.reloader.sweep(), 3);
        assert_eq!(gw.cache.stats().sensors, 0);
    }

    #[tokio::test]
    async fn test_deleted_sensor_is_flushed_by_incremental_reload() {
        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), 100);

        let s1 = gw.register_sensor(1);
        let s2 = gw.register_sensor(2);
        gw.reloader.reload_all().await.unwrap();

        gw.sensors.delete(&s2);
        let summary = gw.reloader.reload_sensors(&[s1, s2]).await.unwrap();

        assert_eq!(summary.flushed, 1);
        assert!(gw.service.submit(measurement(s1, 0)).is_admitted());
        assert!(matches!(
            gw.service.submit(measurement(s2, 0)),
            Admission::Deferred(_)
        ));
    }

    #[tokio::test]
    async fn test_batch_shares_one_reference_instant() {
        let publisher = Arc::new(RecordingPublisher::new());
        let gw = Gateway::new(publisher.clone(), 100);

        let s1 = gw.register_sensor(1);
        let s2 = gw.register_sensor(2);
        gw.reloader.reload_all().await.unwrap();
        gw.cache.append_blacklist(s2);

        let outcome = gw.service.submit_batch(vec![
            measurement(s1, 0),
            measurement(s2, 1),
            measurement(sensor_id(99), 2),
        ]);

        assert_eq!(outcome.admitted, 1);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.deferred.len(), 1);
        assert_eq!(gw.service.flush().unwrap(), 1);
    }
}
