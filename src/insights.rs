// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Automated, human-readable observations about device rollups.

use serde::Serialize;

use crate::event::{DeviceMetrics, FLAG_UNRELIABLE_DESPITE_GOOD_RSSI};
use crate::store::DeviceMetricsMap;

const POOR_BATTERY_QUALITY: f64 = 0.7;
const INCOMPLETE_TELEMETRY: f64 = 0.75;

/// Kind of observation, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    UnreliableDespiteGoodRssi,
    PoorBatteryTelemetry,
    DegradingConfidence,
    IncompleteTelemetry,
}

impl InsightKind {
    const ALL: [InsightKind; 4] = [
        InsightKind::UnreliableDespiteGoodRssi,
        InsightKind::PoorBatteryTelemetry,
        InsightKind::DegradingConfidence,
        InsightKind::IncompleteTelemetry,
    ];

    fn applies(&self, m: &DeviceMetrics) -> bool {
        match self {
            InsightKind::UnreliableDespiteGoodRssi => m.has_flag(FLAG_UNRELIABLE_DESPITE_GOOD_RSSI),
            InsightKind::PoorBatteryTelemetry => m.battery_reporting_quality < POOR_BATTERY_QUALITY,
            InsightKind::DegradingConfidence => m.confidence_trend.is_degrading(),
            InsightKind::IncompleteTelemetry => m.data_completeness < INCOMPLETE_TELEMETRY,
        }
    }

    fn observation(&self) -> &'static str {
        match self {
            InsightKind::UnreliableDespiteGoodRssi => "is unreliable despite stable RF conditions.",
            InsightKind::PoorBatteryTelemetry => "has poor battery telemetry quality.",
            InsightKind::DegradingConfidence => "shows degrading confidence over time.",
            InsightKind::IncompleteTelemetry => "frequently reports incomplete telemetry.",
        }
    }
}

/// A single observation about one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub device: String,
    pub kind: InsightKind,
}

impl Insight {
    /// Render with a custom subject, e.g. a display name.
    pub fn render_as(&self, subject: &str) -> String {
        format!("{} {}", subject, self.kind.observation())
    }

    /// `Device {id} ...` rendering.
    pub fn render(&self) -> String {
        self.render_as(&format!("Device {}", self.device))
    }
}

/// Structured observations for every device, in device order.
pub fn collect_insights(metrics: &DeviceMetricsMap) -> Vec<Insight> {
    metrics
        .iter()
        .flat_map(|(device, m)| {
            InsightKind::ALL
                .into_iter()
                .filter(move |kind| kind.applies(m))
                .map(move |kind| Insight {
                    device: device.clone(),
                    kind,
                })
        })
        .collect()
}

/// One line per breached condition per device. No dedup, no ranking.
pub fn generate_insights(metrics: &DeviceMetricsMap) -> Vec<String> {
    collect_insights(metrics).iter().map(Insight::render).collect()
}
