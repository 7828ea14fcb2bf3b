//! # SentinelMesh - Trust & reliability engine for IoT telemetry
//!
//! Turns enriched per-event telemetry into fleet reliability analytics and
//! answers a closed vocabulary of natural-language questions about it.
//!
//! ## Key Features
//!
//! - **SLA classification**: PASS / WARN / FAIL per device
//! - **Maintenance risk**: additive 0..=90 score with explanations
//! - **Gateway analytics**: confidence average and RSSI variability per gateway
//! - **Automated insights**: one observation per breached condition
//! - **Query engine**: rule-table intent classification and answer resolution
//! - **Trust replay**: fleet state at any past instant
//!
//! ## Quick Start
//!
//! ```rust
//! use sentinelmesh::{EventStore, QueryEngine, sla_status, SlaStatus};
//!
//! let jsonl = r#"
//! {"timestamp":"2025-01-01T10:00:00Z","device":{"devEui":"a1","name":"Boiler","profile":"temperature"},"rf":{"gatewayId":"gw-1","rssi":-80.0},"confidence":{"confidence_score":91.0},"device_metrics":{"avg_confidence":91.0,"battery_reporting_quality":1.0,"confidence_trend":"stable","data_completeness":0.95,"rssi_std":3.0}}
//! "#;
//! let store = EventStore::from_reader(jsonl.as_bytes()).unwrap();
//!
//! let metrics = store.metrics_for("a1").unwrap();
//! assert_eq!(sla_status(metrics), SlaStatus::Pass);
//!
//! let engine = QueryEngine::new(&store);
//! assert_eq!(engine.ask("Is Boiler healthy?").to_string(), "Healthy");
//! ```
//!
//! ## Modules
//!
//! - [`event`]: Wire model of enriched events and device rollups
//! - [`store`]: JSONL loading and the in-memory event store
//! - [`index`]: Device and gateway indexes
//! - [`names`]: Display names for devices and gateways
//! - [`gateway`]: Per-gateway statistics
//! - [`scoring`]: SLA, maintenance risk, explanations
//! - [`insights`]: Automated observations
//! - [`fleet`]: Fleet summary, filters and tabular views
//! - [`query`]: Intent classification and answer resolution
//! - [`replay`]: Point-in-time fleet state
//! - [`config`]: Report configuration

// Modules
pub mod config;
pub mod error;
pub mod event;
pub mod fleet;
pub mod gateway;
pub mod index;
pub mod insights;
pub mod names;
pub mod query;
pub mod replay;
pub mod scoring;
pub mod store;

// Re-exports for convenient access
pub use config::ReportConfig;
pub use error::{ConfigError, LoadError, Result, SentinelError};
pub use event::{
    ConfidenceTrend, DeviceInfo, DeviceMetrics, EnrichedEvent, Event, RfInfo,
    FLAG_UNRELIABLE_DESPITE_GOOD_RSSI,
};
pub use fleet::{
    confidence_view, gateway_rf_view, maintenance_priority, query_devices, rf_unstable, sla_table,
    system_summary, ConfidenceRow, DeviceFilter, FleetSummary, GatewayRfRow, MaintenancePriority,
    SlaRow,
};
pub use gateway::{analyze_gateways, GatewayStats, GatewayStatsMap};
pub use index::{build_device_index, build_gateway_index, DeviceIndex, GatewayIndex};
pub use insights::{collect_insights, generate_insights, Insight, InsightKind};
pub use names::NameMaps;
pub use query::{handle_query, parse_query, Answer, Intent, ParsedQuery, QueryEngine};
pub use replay::{parse_timestamp, DeviceState, DeviceStatus, Timeline, TimelinePoint};
pub use scoring::{explain_device, is_high_risk, maintenance_risk, sla_status, SlaStatus};
pub use store::{DeviceMetricsMap, EventStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
