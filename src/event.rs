// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Enriched telemetry event types.
//!
//! On the wire every event carries a copy of its device's rollup metrics
//! ([`EnrichedEvent`]). Once loaded, the rollup is split off and stored once
//! per device by [`crate::store::EventStore`]; the stored [`Event`] keeps only
//! the device identity as back-reference.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Flag set upstream when a device misbehaves while its radio link looks fine.
pub const FLAG_UNRELIABLE_DESPITE_GOOD_RSSI: &str = "unreliable_despite_good_rssi";

/// Device identity block of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Unique device identifier.
    #[serde(rename = "devEui")]
    pub dev_eui: String,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sensor type.
    #[serde(default = "unknown_profile")]
    pub profile: String,
}

fn unknown_profile() -> String {
    "unknown".to_string()
}

impl DeviceInfo {
    /// Display name if one is set and non-empty.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Radio metadata observed by the receiving gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfInfo {
    #[serde(rename = "gatewayId", default)]
    pub gateway_id: Option<String>,
    #[serde(default)]
    pub rssi: Option<f64>,
    /// Free-form location payload (string, object, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
}

impl RfInfo {
    /// Gateway identity, treating an empty string as absent.
    pub fn gateway(&self) -> Option<&str> {
        self.gateway_id.as_deref().filter(|g| !g.is_empty())
    }

    /// Location, treating null and empty payloads as absent.
    pub fn known_location(&self) -> Option<&Value> {
        self.location.as_ref().filter(|loc| match loc {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::Number(n) => n.as_f64().map_or(true, |v| v != 0.0),
        })
    }
}

/// Per-event trust measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    /// 0-100.
    pub confidence_score: f64,
}

/// Direction of a device's confidence over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTrend {
    Degrading,
    #[default]
    Stable,
    Improving,
    /// Any other label, or no label at all; treated like stable.
    #[serde(other)]
    Other,
}

impl ConfidenceTrend {
    pub fn is_degrading(&self) -> bool {
        matches!(self, Self::Degrading)
    }

    /// Lenient wire decoding: `null` or a non-string value maps to `Other`.
    fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => match label.as_str() {
                "degrading" => Self::Degrading,
                "stable" => Self::Stable,
                "improving" => Self::Improving,
                _ => Self::Other,
            },
            _ => Self::Other,
        })
    }
}

/// Device-level rollup computed upstream and attached to every event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetrics {
    /// Mean confidence score (0-100).
    pub avg_confidence: f64,
    /// Share of events with usable battery telemetry (0.0-1.0).
    pub battery_reporting_quality: f64,
    #[serde(default, deserialize_with = "ConfidenceTrend::deserialize_lenient")]
    pub confidence_trend: ConfidenceTrend,
    /// Share of expected fields present (0.0-1.0).
    pub data_completeness: f64,
    /// RSSI standard deviation across the device's events.
    pub rssi_std: f64,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl DeviceMetrics {
    /// Rollup of a well-behaved device with the given average confidence.
    pub fn new(avg_confidence: f64) -> Self {
        Self {
            avg_confidence,
            battery_reporting_quality: 1.0,
            confidence_trend: ConfidenceTrend::Stable,
            data_completeness: 1.0,
            rssi_std: 0.0,
            flags: Vec::new(),
        }
    }

    /// Builder: battery reporting quality.
    pub fn with_battery_quality(mut self, quality: f64) -> Self {
        self.battery_reporting_quality = quality;
        self
    }

    /// Builder: confidence trend.
    pub fn with_trend(mut self, trend: ConfidenceTrend) -> Self {
        self.confidence_trend = trend;
        self
    }

    /// Builder: data completeness.
    pub fn with_completeness(mut self, completeness: f64) -> Self {
        self.data_completeness = completeness;
        self
    }

    /// Builder: RSSI standard deviation.
    pub fn with_rssi_std(mut self, rssi_std: f64) -> Self {
        self.rssi_std = rssi_std;
        self
    }

    /// Builder: add a qualitative flag.
    pub fn with_flag(mut self, flag: &str) -> Self {
        self.flags.push(flag.to_string());
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

/// A telemetry observation as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// ISO-8601 string exactly as received; never normalized.
    pub timestamp: String,
    pub device: DeviceInfo,
    #[serde(default)]
    pub rf: RfInfo,
    pub confidence: Confidence,
}

impl Event {
    /// Create an event with the minimum required fields.
    pub fn new(timestamp: &str, dev_eui: &str, confidence_score: f64) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            device: DeviceInfo {
                dev_eui: dev_eui.to_string(),
                name: None,
                profile: unknown_profile(),
            },
            rf: RfInfo::default(),
            confidence: Confidence { confidence_score },
        }
    }

    /// Builder: device display name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.device.name = Some(name.to_string());
        self
    }

    /// Builder: sensor profile.
    pub fn with_profile(mut self, profile: &str) -> Self {
        self.device.profile = profile.to_string();
        self
    }

    /// Builder: receiving gateway.
    pub fn with_gateway(mut self, gateway_id: &str) -> Self {
        self.rf.gateway_id = Some(gateway_id.to_string());
        self
    }

    /// Builder: RSSI reading.
    pub fn with_rssi(mut self, rssi: f64) -> Self {
        self.rf.rssi = Some(rssi);
        self
    }

    /// Builder: location payload.
    pub fn with_location(mut self, location: Value) -> Self {
        self.rf.location = Some(location);
        self
    }

    pub fn dev_eui(&self) -> &str {
        &self.device.dev_eui
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence.confidence_score
    }
}

/// Wire form of an event: the event plus its device's rollup copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub device_metrics: DeviceMetrics,
}

impl EnrichedEvent {
    pub fn new(event: Event, device_metrics: DeviceMetrics) -> Self {
        Self {
            event,
            device_metrics,
        }
    }

    /// Parse one JSONL line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a single JSONL line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
