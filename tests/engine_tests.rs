// SentinelMesh - Integration Tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! End-to-end tests: JSONL loading through scoring, fleet rollups, the query
//! engine and trust replay.

use std::io::Write;

use approx::assert_relative_eq;
use sentinelmesh::query::{NO_FAULTY_DEVICES, NO_UNSTABLE_GATEWAYS, UNSUPPORTED_QUESTION};
use sentinelmesh::*;
use serde_json::json;

// ============================================================================
// Helper Functions
// ============================================================================

fn event_line(
    ts: &str,
    dev: &str,
    name: &str,
    gw: &str,
    rssi: f64,
    score: f64,
    m: &DeviceMetrics,
) -> String {
    let event = Event::new(ts, dev, score)
        .with_name(name)
        .with_profile("environment")
        .with_gateway(gw)
        .with_rssi(rssi);
    EnrichedEvent::new(event, m.clone()).to_json().unwrap()
}

const BOILER: &str = "70b3d5e75e00a001";
const DOOR: &str = "70b3d5e75e00a002";
const TANK: &str = "70b3d5e75e00a003";

fn sample_jsonl() -> String {
    let boiler = DeviceMetrics::new(88.5).with_rssi_std(4.0);
    let door = DeviceMetrics::new(55.0)
        .with_battery_quality(0.3)
        .with_trend(ConfidenceTrend::Degrading)
        .with_completeness(0.7);
    let tank = DeviceMetrics::new(74.0)
        .with_completeness(0.78)
        .with_flag(FLAG_UNRELIABLE_DESPITE_GOOD_RSSI);

    [
        event_line("2025-02-01T08:00:00Z", BOILER, "Boiler", "gw-north", -70.0, 90.0, &boiler),
        event_line("2025-02-01T08:01:00Z", DOOR, "Door Sensor 08", "gw-south", -95.0, 52.0, &door),
        event_line("2025-02-01T08:02:00Z", TANK, "Tank", "gw-north", -72.0, 76.0, &tank),
        String::new(),
        event_line("2025-02-01T09:00:00Z", BOILER, "Boiler", "gw-south", -60.0, 87.0, &boiler),
        event_line("2025-02-01T09:01:00Z", DOOR, "Door Sensor 08", "gw-south", -120.0, 58.0, &door),
        event_line("2025-02-01T09:02:00Z", TANK, "Tank", "gw-north", -74.0, 72.0, &tank),
    ]
    .join("\n")
}

fn sample_store() -> EventStore {
    EventStore::from_reader(sample_jsonl().as_bytes()).unwrap()
}

// ============================================================================
// Section 1: Loading
// ============================================================================

#[test]
fn test_01_load_jsonl_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(sample_jsonl().as_bytes()).unwrap();

    let store = EventStore::load_jsonl(file.path()).unwrap();
    assert_eq!(store.len(), 6);
    assert_eq!(store.device_count(), 3);
    assert!(!store.is_empty());
}

#[test]
fn test_02_malformed_line_reports_position() {
    let mut jsonl = sample_jsonl();
    jsonl.push_str("\n{\"timestamp\": broken");
    let err = EventStore::from_reader(jsonl.as_bytes()).unwrap_err();
    match err {
        LoadError::Json { line, .. } => assert_eq!(line, 8),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_03_missing_file_is_io_error() {
    let err = EventStore::load_jsonl("/nonexistent/enriched_events.jsonl").unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
    let wrapped: SentinelError = err.into();
    assert!(wrapped.to_string().starts_with("Load error"));
}

#[test]
fn test_04_empty_input_is_empty_store() {
    let store = EventStore::from_reader("\n\n".as_bytes()).unwrap();
    assert!(store.is_empty());
    assert!(store.device_metrics().is_empty());
}

// ============================================================================
// Section 2: Scoring Properties
// ============================================================================

#[test]
fn test_05_sla_implications() {
    let grid = [0.0, 50.0, 69.99, 70.0, 85.0, 100.0];
    let completeness = [0.0, 0.5, 0.79, 0.8, 1.0];
    for &avg in &grid {
        for &c in &completeness {
            let m = DeviceMetrics::new(avg).with_completeness(c);
            match sla_status(&m) {
                SlaStatus::Fail => assert!(m.avg_confidence < 70.0),
                SlaStatus::Warn => {
                    assert!(m.avg_confidence >= 70.0 && m.data_completeness < 0.8)
                }
                SlaStatus::Pass => {
                    assert!(m.avg_confidence >= 70.0 && m.data_completeness >= 0.8)
                }
            }
        }
    }
}

#[test]
fn test_06_risk_additive_over_all_combinations() {
    for mask in 0u32..16 {
        let mut m = DeviceMetrics::new(80.0);
        let mut expected = 0;
        if mask & 1 != 0 {
            m = m.with_battery_quality(0.2);
            expected += 30;
        }
        if mask & 2 != 0 {
            m = m.with_trend(ConfidenceTrend::Degrading);
            expected += 25;
        }
        if mask & 4 != 0 {
            m = m.with_rssi_std(15.0);
            expected += 20;
        }
        if mask & 8 != 0 {
            m = m.with_completeness(0.5);
            expected += 15;
        }
        assert_eq!(maintenance_risk(&m), expected, "mask {:04b}", mask);
        assert!(maintenance_risk(&m) <= 90);
    }
}

#[test]
fn test_07_explanations_follow_risk_factors() {
    let store = sample_store();
    let door = store.metrics_for(DOOR).unwrap();
    assert_eq!(
        explain_device(door),
        vec!["Battery telemetry missing", "Confidence decreasing over time"]
    );
    assert_eq!(maintenance_risk(door), 70);
    assert!(is_high_risk(door));
}

// ============================================================================
// Section 3: Gateway Statistics
// ============================================================================

#[test]
fn test_08_gateway_stats_examples() {
    let flat: Vec<Event> = (0..3)
        .map(|i| {
            Event::new("t", &format!("d{}", i), 90.0 + 5.0 * i as f64)
                .with_gateway("gw")
                .with_rssi(10.0)
        })
        .collect();
    let stats = analyze_gateways(&build_gateway_index(&flat));
    let gw = &stats["gw"];
    assert_eq!(gw.rssi_std, 0.0);
    assert_relative_eq!(gw.avg_confidence, 95.0);
    assert_eq!(gw.event_count, 3);

    let single = vec![Event::new("t", "d", 80.0).with_gateway("solo").with_rssi(-80.0)];
    let stats = analyze_gateways(&build_gateway_index(&single));
    assert_eq!(stats["solo"].rssi_std, 0.0);
}

#[test]
fn test_09_gateway_stats_from_store() {
    let store = sample_store();
    let stats = analyze_gateways(&store.gateway_index());

    let keys: Vec<_> = stats.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["gw-north", "gw-south"]);

    let north = &stats["gw-north"];
    assert_eq!(north.event_count, 3);
    assert_relative_eq!(north.avg_confidence, 79.33);
    assert_relative_eq!(north.rssi_std, 1.63);

    let south = &stats["gw-south"];
    assert_eq!(south.event_count, 3);
    assert_relative_eq!(south.avg_confidence, 65.67);
    assert!(south.rssi_std > 12.0);
}

// ============================================================================
// Section 4: Fleet Rollups
// ============================================================================

#[test]
fn test_10_system_summary_two_devices() {
    let mut metrics = DeviceMetricsMap::new();
    metrics.insert("ok".into(), DeviceMetrics::new(95.0));
    metrics.insert(
        "bad".into(),
        DeviceMetrics::new(50.0)
            .with_battery_quality(0.1)
            .with_trend(ConfidenceTrend::Degrading)
            .with_completeness(0.5),
    );
    let summary = system_summary(&metrics, &GatewayStatsMap::new());
    assert_eq!(summary.total_devices, 2);
    assert_eq!(summary.high_risk_devices, 1);
}

#[test]
fn test_11_sample_fleet_summary() {
    let store = sample_store();
    let stats = analyze_gateways(&store.gateway_index());
    let summary = system_summary(store.device_metrics(), &stats);

    assert_eq!(summary.total_devices, 3);
    assert_eq!(summary.high_risk_devices, 1);
    assert_eq!(summary.warn_devices, 1);
    assert_eq!(summary.unstable_gateways, vec!["gw-south".to_string()]);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["unstable_gateways"], json!(["gw-south"]));
}

#[test]
fn test_12_insights_for_sample_fleet() {
    let store = sample_store();
    assert_eq!(
        generate_insights(store.device_metrics()),
        vec![
            "Device 70b3d5e75e00a002 has poor battery telemetry quality.",
            "Device 70b3d5e75e00a002 shows degrading confidence over time.",
            "Device 70b3d5e75e00a002 frequently reports incomplete telemetry.",
            "Device 70b3d5e75e00a003 is unreliable despite stable RF conditions.",
        ]
    );
}

#[test]
fn test_13_views_and_filters() {
    let store = sample_store();
    let names = store.name_maps();
    let metrics = store.device_metrics();

    let low: Vec<_> = query_devices(metrics, DeviceFilter::LowConfidence)
        .into_iter()
        .map(|(d, _)| d)
        .collect();
    assert_eq!(low, vec!["70b3d5e75e00a002", "70b3d5e75e00a003"]);

    let ranked = maintenance_priority(metrics, None, false);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].risk, 70);

    let sla: Vec<_> = sla_table(metrics, &names)
        .into_iter()
        .map(|row| (row.device, row.sla))
        .collect();
    assert_eq!(
        sla,
        vec![
            ("Boiler".to_string(), SlaStatus::Pass),
            ("Door Sensor 08".to_string(), SlaStatus::Fail),
            ("Tank".to_string(), SlaStatus::Warn),
        ]
    );

    let below: Vec<_> = confidence_view(metrics, &names)
        .into_iter()
        .filter(|row| row.below_threshold)
        .map(|row| row.device)
        .collect();
    assert_eq!(below, vec!["Door Sensor 08"]);
}

// ============================================================================
// Section 5: Query Engine
// ============================================================================

#[test]
fn test_14_parse_query_examples() {
    assert_eq!(
        parse_query("How many devices are there?").into_parts(),
        (Intent::CountDevices, None)
    );
    assert_eq!(
        parse_query("Which gateway does Door Sensor 08 use?").into_parts(),
        (
            Intent::DeviceGateway,
            Some("which gateway does door sensor 08 use?".to_string())
        )
    );
}

#[test]
fn test_15_faulty_devices_and_sentinel() {
    let store = sample_store();
    let engine = QueryEngine::new(&store);
    assert_eq!(
        engine.ask("Which devices are faulty?"),
        Answer::List(vec!["Door Sensor 08".to_string()])
    );

    let alpha = DeviceMetrics::new(95.0);
    let line = event_line("2025-02-01T08:00:00Z", "a", "Alpha", "gw", -70.0, 95.0, &alpha);
    let healthy = EventStore::from_reader(line.as_bytes()).unwrap();
    let engine = QueryEngine::new(&healthy);
    assert_eq!(
        engine.ask("Which devices are faulty?"),
        Answer::List(vec![NO_FAULTY_DEVICES.to_string()])
    );
    assert_eq!(
        engine.ask("list unstable gateways"),
        Answer::List(vec![NO_UNSTABLE_GATEWAYS.to_string()])
    );
}

#[test]
fn test_16_entity_precedence_is_name_map_order() {
    let m = DeviceMetrics::new(90.0);
    let jsonl = [
        event_line("2025-02-01T08:00:00Z", "door", "Door", "gw", -70.0, 90.0, &m),
        event_line("2025-02-01T08:01:00Z", "door08", "Door Sensor 08", "gw", -70.0, 90.0, &m),
    ]
    .join("\n");
    let store = EventStore::from_reader(jsonl.as_bytes()).unwrap();
    let engine = QueryEngine::new(&store);

    // "Door" was named first, so it shadows "Door Sensor 08"
    assert_eq!(
        engine.ask("What is the device id of Door Sensor 08?").as_text(),
        Some("Door device ID is door")
    );
}

#[test]
fn test_17_sample_fleet_questions() {
    let store = sample_store();
    let engine = QueryEngine::new(&store);

    assert_eq!(
        engine.ask("Which gateway does Door Sensor 08 use?"),
        Answer::List(vec!["Gateway-2".to_string()])
    );
    assert_eq!(
        engine.ask("Which devices use Gateway-1?"),
        Answer::List(vec!["Boiler".to_string(), "Tank".to_string()])
    );
    assert_eq!(
        engine.ask("Show unstable gateways"),
        Answer::List(vec!["Gateway-2".to_string()])
    );
    assert_eq!(
        engine.ask("What is the most unreliable device?").as_text(),
        Some("Door Sensor 08")
    );
    assert_eq!(
        engine.ask("What is Tank confidence?").as_text(),
        Some("Tank average confidence is 74.0")
    );
    assert_eq!(
        engine.ask("What profile does Boiler have?").as_text(),
        Some("Boiler is a environment sensor")
    );
    assert_eq!(engine.ask("sing me a song").as_text(), Some(UNSUPPORTED_QUESTION));
}

#[test]
fn test_18_answers_serialize_as_plain_json() {
    let store = sample_store();
    let engine = QueryEngine::new(&store);
    let list = serde_json::to_value(engine.ask("list gateways")).unwrap();
    assert_eq!(list, json!(["Gateway-1", "Gateway-2"]));
    let text = serde_json::to_value(engine.ask("how many devices")).unwrap();
    assert_eq!(text, json!("There are 3 devices."));
}

// ============================================================================
// Section 6: Trust Replay
// ============================================================================

#[test]
fn test_19_replay_state_and_warnings() {
    let timeline = Timeline::from_store(&sample_store());
    let (start, end) = timeline.range().unwrap();
    assert_eq!(start, parse_timestamp("2025-02-01T08:00:00Z").unwrap());
    assert_eq!(end, parse_timestamp("2025-02-01T09:02:00Z").unwrap());

    let at = parse_timestamp("2025-02-01 08:30:00").unwrap();
    let states = timeline.state_at(at);
    let devices: Vec<_> = states.iter().map(|s| s.device.as_str()).collect();
    assert_eq!(devices, vec!["Door Sensor 08", "Tank", "Boiler"]);
    assert_eq!(
        timeline.active_warnings(at),
        vec!["Door Sensor 08 confidence dropped to 52.0"]
    );
}

// ============================================================================
// Section 7: Idempotence
// ============================================================================

#[test]
fn test_20_pure_functions_are_stable() {
    let store = sample_store();
    let metrics = store.device_metrics();
    let stats = analyze_gateways(&store.gateway_index());

    assert_eq!(stats, analyze_gateways(&store.gateway_index()));
    assert_eq!(system_summary(metrics, &stats), system_summary(metrics, &stats));
    assert_eq!(generate_insights(metrics), generate_insights(metrics));
    assert_eq!(
        maintenance_priority(metrics, Some(2), true),
        maintenance_priority(metrics, Some(2), true)
    );

    let engine = QueryEngine::new(&store);
    for q in ["list devices", "which devices are faulty", "is tank healthy"] {
        assert_eq!(engine.ask(q), engine.ask(q));
    }
}
