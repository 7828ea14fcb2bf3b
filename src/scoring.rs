// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Device scoring rules.
//!
//! Three pure functions over a device rollup:
//!
//! - [`sla_status`]: PASS / WARN / FAIL priority ladder
//! - [`maintenance_risk`]: additive 0..=90 score
//! - [`explain_device`]: qualitative reasons behind the risk
//!
//! All thresholds are fixed constants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::DeviceMetrics;

/// Below this average confidence a device fails its SLA.
pub const SLA_MIN_CONFIDENCE: f64 = 70.0;
/// Below this completeness a passing device gets a warning.
pub const SLA_MIN_COMPLETENESS: f64 = 0.8;
/// Risk score at or above which a device counts as high risk.
pub const HIGH_RISK_SCORE: u32 = 60;

const BATTERY_QUALITY_FLOOR: f64 = 0.5;
const RSSI_STD_CEILING: f64 = 10.0;
const COMPLETENESS_FLOOR: f64 = 0.75;

/// SLA classification of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlaStatus {
    Pass,
    Warn,
    Fail,
}

impl SlaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaStatus::Pass => "PASS",
            SlaStatus::Warn => "WARN",
            SlaStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a device. FAIL takes precedence over WARN.
pub fn sla_status(m: &DeviceMetrics) -> SlaStatus {
    if m.avg_confidence < SLA_MIN_CONFIDENCE {
        return SlaStatus::Fail;
    }
    if m.data_completeness < SLA_MIN_COMPLETENESS {
        return SlaStatus::Warn;
    }
    SlaStatus::Pass
}

/// One additive maintenance risk condition.
#[derive(Debug, Clone, Copy)]
pub struct RiskFactor {
    pub points: u32,
    /// Set for conditions that also appear in [`explain_device`].
    pub reason: Option<&'static str>,
    applies: fn(&DeviceMetrics) -> bool,
}

impl RiskFactor {
    pub fn applies(&self, m: &DeviceMetrics) -> bool {
        (self.applies)(m)
    }
}

/// Risk conditions in evaluation (and explanation) order.
pub const RISK_FACTORS: [RiskFactor; 4] = [
    RiskFactor {
        points: 30,
        reason: Some("Battery telemetry missing"),
        applies: |m| m.battery_reporting_quality < BATTERY_QUALITY_FLOOR,
    },
    RiskFactor {
        points: 25,
        reason: Some("Confidence decreasing over time"),
        applies: |m| m.confidence_trend.is_degrading(),
    },
    RiskFactor {
        points: 20,
        reason: Some("Unstable RF conditions"),
        applies: |m| m.rssi_std > RSSI_STD_CEILING,
    },
    RiskFactor {
        points: 15,
        reason: None,
        applies: |m| m.data_completeness < COMPLETENESS_FLOOR,
    },
];

/// Sum of points of every applying risk factor.
pub fn maintenance_risk(m: &DeviceMetrics) -> u32 {
    RISK_FACTORS
        .iter()
        .filter(|factor| factor.applies(m))
        .map(|factor| factor.points)
        .sum()
}

pub fn is_high_risk(m: &DeviceMetrics) -> bool {
    maintenance_risk(m) >= HIGH_RISK_SCORE
}

/// Reasons behind a device's risk, in fixed order. Empty when healthy.
pub fn explain_device(m: &DeviceMetrics) -> Vec<&'static str> {
    RISK_FACTORS
        .iter()
        .filter(|factor| factor.applies(m))
        .filter_map(|factor| factor.reason)
        .collect()
}

/// Devices flagged for maintenance: poor battery telemetry or degrading trend.
pub fn needs_maintenance(m: &DeviceMetrics) -> bool {
    m.battery_reporting_quality < BATTERY_QUALITY_FLOOR || m.confidence_trend.is_degrading()
}
