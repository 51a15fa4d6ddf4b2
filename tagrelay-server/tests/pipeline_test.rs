use tagrelay_api::{DeviceState, Measurement};
use tagrelay_server::services::{parse_gateway_message, MetricSink};
use tokio::sync::mpsc;

mod common;
use common::mock_app::MockApp;

const TAG: &str = "CB:B8:33:4C:88:4F";
const ADVERTISEMENT: &str = "0201061BFF99040512FC5394C37C0004FFFC040CAC364200CDCBB8334C884F";

fn gateway_payload() -> Vec<u8> {
    format!(r#"{{"data": "{}"}}"#, ADVERTISEMENT).into_bytes()
}

#[tokio::test]
async fn test_gateway_message_reaches_live_key() {
    let app = MockApp::new().await.with_devices(&[(TAG, "Living room")]).await;
    app.reconciler.reload().await;

    let mut receiver = app.backend.inner.subscribe("device:cbb8334c884f").await;

    let measurement =
        parse_gateway_message("ruuvi/gw/CB:B8:33:4C:88:4F", &gateway_payload()).unwrap();
    let state = app.enricher.process_at(&measurement, 1_700_000_000_000).await.unwrap();

    assert_eq!(state.display_name, "Living room");
    assert_eq!(state.timestamp_iso, "2023-11-14T22:13:20Z");
    assert_eq!(state.pressure_hpa, 1000.44);
    assert_eq!(state.battery_volts, 2.977);

    let published: DeviceState = serde_json::from_str(&receiver.recv().await.unwrap()).unwrap();
    assert_eq!(published, state);

    let stored = app.relay.fetch("device:cbb8334c884f").await.unwrap().unwrap();
    assert_eq!(serde_json::from_str::<DeviceState>(&stored).unwrap(), state);
}

#[tokio::test]
async fn test_measurement_then_backfill() {
    let app = MockApp::new().await.with_devices(&[(TAG, "Living room")]).await;
    app.reconciler.reload().await;

    let measurement = parse_gateway_message("ruuvi/gw", &gateway_payload()).unwrap();
    app.enricher.process_at(&measurement, 1_000).await.unwrap();
    app.enricher.process_at(&measurement, 61_000).await.unwrap();

    let report = app.reconciler.backfill_at(120_000).await;
    assert_eq!(report.relayed, vec!["cbb8334c884f"]);

    let sample = app.relay.fetch("insert:120000:cbb8334c884f").await.unwrap().unwrap();
    let sample: DeviceState = serde_json::from_str(&sample).unwrap();
    assert_eq!(sample.ping_millis, 60_000);
    assert_eq!(sample.timestamp_millis, 61_000);

    let rows = app.metrics.find_by_tag(TAG).await.unwrap();
    assert_eq!(rows.len(), 5);
    // Rows carry the reading's time, not the backfill tick
    assert!(rows.iter().all(|row| row.time == "1970-01-01T00:01:01Z"));
    assert_eq!(rows[4].metric, "ping");
    assert_eq!(rows[4].value, 60_000.0);
}

#[tokio::test]
async fn test_archived_rows_keep_reading_time() {
    let app = MockApp::new().await.with_devices(&[(TAG, "Living room")]).await;
    app.reconciler.reload().await;

    let measurement = parse_gateway_message("ruuvi/gw", &gateway_payload()).unwrap();
    let state = app.enricher.process_at(&measurement, 1_700_000_000_000).await.unwrap();

    // Ten minutes later
    let report = app.reconciler.backfill_at(1_700_000_600_000).await;
    assert_eq!(report.relayed, vec!["cbb8334c884f"]);

    let rows = app.metrics.find_by_tag(TAG).await.unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| row.time == state.timestamp_iso));
    assert_eq!(rows[0].time, "2023-11-14T22:13:20Z");
}

#[tokio::test]
async fn test_enricher_loop_keeps_going_after_relay_failure() {
    let app = MockApp::new().await;
    app.backend.block("aabbccddeeff").await;

    let (sender, receiver) = mpsc::unbounded_channel();
    sender
        .send(Measurement {
            device_id: "AA:BB:CC:DD:EE:FF".to_string(),
            temperature: 10.0,
            ..Default::default()
        })
        .unwrap();
    sender
        .send(Measurement {
            device_id: TAG.to_string(),
            temperature: 20.0,
            ..Default::default()
        })
        .unwrap();
    drop(sender);

    app.enricher.clone().run(receiver).await;

    // The failed device still advanced in the cache
    assert_eq!(app.cache.last_record("AA:BB:CC:DD:EE:FF").await.unwrap().temperature, 10.0);
    assert!(app.relay.fetch("device:aabbccddeeff").await.unwrap().is_none());
    assert!(app.relay.fetch("device:cbb8334c884f").await.unwrap().is_some());
}

#[tokio::test]
async fn test_metric_rows_written_directly() {
    let app = MockApp::new().await;

    app.metrics
        .insert_metric_row("2024-05-01T12:00:00Z", TAG, "temperature", 24.3)
        .await
        .unwrap();

    let rows = app.metrics.find_by_tag(TAG).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, 24.3);
}
