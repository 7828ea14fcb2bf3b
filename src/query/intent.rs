// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Closed-vocabulary intent classification.
//!
//! Questions are lower-cased and trimmed, then checked against
//! [`INTENT_RULES`] top to bottom. The first rule that matches wins, so the
//! table order is the precedence order.

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

/// Every question the engine can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ListDevices,
    ListGateways,
    CountDevices,
    CountGateways,
    FaultyDevices,
    MaintenanceDevices,
    WorstDevice,
    DeviceId,
    SensorType,
    LastSeen,
    DeviceLocation,
    MessageCount,
    DeviceConfidence,
    DeviceHealth,
    DeviceGateway,
    GatewayDevices,
    GatewayEvents,
    UnstableGateways,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ListDevices => "list_devices",
            Intent::ListGateways => "list_gateways",
            Intent::CountDevices => "count_devices",
            Intent::CountGateways => "count_gateways",
            Intent::FaultyDevices => "faulty_devices",
            Intent::MaintenanceDevices => "maintenance_devices",
            Intent::WorstDevice => "worst_device",
            Intent::DeviceId => "device_id",
            Intent::SensorType => "sensor_type",
            Intent::LastSeen => "last_seen",
            Intent::DeviceLocation => "device_location",
            Intent::MessageCount => "message_count",
            Intent::DeviceConfidence => "device_confidence",
            Intent::DeviceHealth => "device_health",
            Intent::DeviceGateway => "device_gateway",
            Intent::GatewayDevices => "gateway_devices",
            Intent::GatewayEvents => "gateway_events",
            Intent::UnstableGateways => "unstable_gateways",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule tests the normalized question.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Whole question equals one of the phrases.
    Exact(&'static [&'static str]),
    /// Question contains at least one of the phrases.
    Any(&'static [&'static str]),
    /// Question contains every phrase.
    All(&'static [&'static str]),
}

impl Matcher {
    pub fn matches(&self, question: &str) -> bool {
        match self {
            Matcher::Exact(phrases) => phrases.iter().any(|p| question == *p),
            Matcher::Any(phrases) => phrases.iter().any(|p| question.contains(p)),
            Matcher::All(phrases) => phrases.iter().all(|p| question.contains(p)),
        }
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub intent: Intent,
    pub matcher: Matcher,
    /// Whether the question text is kept for entity extraction.
    pub takes_argument: bool,
}

const fn rule(intent: Intent, matcher: Matcher, takes_argument: bool) -> IntentRule {
    IntentRule {
        intent,
        matcher,
        takes_argument,
    }
}

/// Classification rules in precedence order.
pub const INTENT_RULES: &[IntentRule] = &[
    // Inventory
    rule(Intent::ListDevices, Matcher::Exact(&["what devices exist", "list devices"]), false),
    rule(Intent::ListGateways, Matcher::Exact(&["what gateways exist", "list gateways"]), false),
    rule(Intent::CountDevices, Matcher::Any(&["how many devices"]), false),
    rule(Intent::CountGateways, Matcher::Any(&["how many gateways"]), false),
    // Fleet health
    rule(Intent::FaultyDevices, Matcher::Any(&["faulty"]), false),
    rule(Intent::MaintenanceDevices, Matcher::Any(&["needs maintenance"]), false),
    rule(Intent::WorstDevice, Matcher::Any(&["most unreliable"]), false),
    // Device specific
    rule(Intent::DeviceId, Matcher::Any(&["device id"]), true),
    rule(Intent::SensorType, Matcher::Any(&["sensor type", "profile"]), true),
    rule(Intent::LastSeen, Matcher::Any(&["last data", "last received"]), true),
    rule(Intent::DeviceLocation, Matcher::Any(&["where is", "location"]), true),
    rule(Intent::MessageCount, Matcher::Any(&["how many messages"]), true),
    rule(Intent::DeviceConfidence, Matcher::Any(&["confidence"]), true),
    rule(Intent::DeviceHealth, Matcher::All(&["is", "healthy"]), true),
    rule(Intent::DeviceGateway, Matcher::Any(&["which gateway"]), true),
    // Gateway specific
    rule(Intent::GatewayDevices, Matcher::Any(&["which devices use"]), true),
    rule(Intent::GatewayEvents, Matcher::Any(&["how many events"]), true),
    rule(Intent::UnstableGateways, Matcher::Any(&["unstable gateway"]), false),
];

/// Classified question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    pub intent: Intent,
    /// Normalized question text, kept for entity extraction.
    pub argument: Option<String>,
}

impl ParsedQuery {
    pub fn into_parts(self) -> (Intent, Option<String>) {
        (self.intent, self.argument)
    }
}

/// Classify a free-text question.
pub fn parse_query(text: &str) -> ParsedQuery {
    let question = text.trim().to_lowercase();

    let parsed = INTENT_RULES
        .iter()
        .find(|rule| rule.matcher.matches(&question))
        .map_or(
            ParsedQuery {
                intent: Intent::Unknown,
                argument: None,
            },
            |rule| ParsedQuery {
                intent: rule.intent,
                argument: rule.takes_argument.then(|| question.clone()),
            },
        );

    trace!("classified {:?} as {}", question, parsed.intent);
    parsed
}
