// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Fleet-wide rollups.
//!
//! Aggregates per-device scores and per-gateway stats into:
//! - the fleet summary (device counts, RF-unstable gateways)
//! - device filter queries
//! - maintenance priority ranking
//! - tabular views for SLA, gateway RF stability and device confidence

use serde::Serialize;

use crate::event::DeviceMetrics;
use crate::gateway::{GatewayStats, GatewayStatsMap};
use crate::names::NameMaps;
use crate::scoring::{
    is_high_risk, maintenance_risk, needs_maintenance, sla_status, SlaStatus, SLA_MIN_CONFIDENCE,
};
use crate::store::DeviceMetricsMap;

/// RSSI std-dev above which a gateway's RF link is considered unstable.
pub const RF_UNSTABLE_RSSI_STD: f64 = 12.0;

/// Fleet-wide counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    pub total_devices: usize,
    /// Devices with maintenance risk >= 60.
    pub high_risk_devices: usize,
    /// Devices whose SLA status is exactly WARN.
    pub warn_devices: usize,
    /// Gateway identities with RSSI std-dev > 12.
    pub unstable_gateways: Vec<String>,
}

/// RF instability of a gateway. Not the same notion as the query engine's
/// confidence-based "unstable gateways".
pub fn rf_unstable(stats: &GatewayStats) -> bool {
    stats.rssi_std > RF_UNSTABLE_RSSI_STD
}

pub fn system_summary(metrics: &DeviceMetricsMap, gateway_stats: &GatewayStatsMap) -> FleetSummary {
    FleetSummary {
        total_devices: metrics.len(),
        high_risk_devices: metrics.values().filter(|m| is_high_risk(m)).count(),
        warn_devices: metrics
            .values()
            .filter(|m| sla_status(m) == SlaStatus::Warn)
            .count(),
        unstable_gateways: gateway_stats
            .iter()
            .filter(|(_, stats)| rf_unstable(stats))
            .map(|(gateway, _)| gateway.clone())
            .collect(),
    }
}

/// Named device filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Average confidence below 80.
    LowConfidence,
    /// Poor battery telemetry or degrading trend.
    NeedsMaintenance,
    /// Data completeness below 0.8.
    IncompleteData,
}

impl DeviceFilter {
    pub fn matches(&self, m: &DeviceMetrics) -> bool {
        match self {
            DeviceFilter::LowConfidence => m.avg_confidence < 80.0,
            DeviceFilter::NeedsMaintenance => needs_maintenance(m),
            DeviceFilter::IncompleteData => m.data_completeness < 0.8,
        }
    }
}

/// Devices matching a filter, in device order.
pub fn query_devices(
    metrics: &DeviceMetricsMap,
    filter: DeviceFilter,
) -> Vec<(&str, &DeviceMetrics)> {
    metrics
        .iter()
        .filter(|(_, m)| filter.matches(m))
        .map(|(device, m)| (device.as_str(), m))
        .collect()
}

/// One entry of the maintenance ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenancePriority {
    pub device: String,
    pub risk: u32,
}

/// Devices by descending risk. Ties keep device order.
///
/// `include_zero = false` drops devices with no risk at all; `top` truncates.
pub fn maintenance_priority(
    metrics: &DeviceMetricsMap,
    top: Option<usize>,
    include_zero: bool,
) -> Vec<MaintenancePriority> {
    let mut ranked: Vec<MaintenancePriority> = metrics
        .iter()
        .map(|(device, m)| MaintenancePriority {
            device: device.clone(),
            risk: maintenance_risk(m),
        })
        .filter(|p| include_zero || p.risk > 0)
        .collect();
    ranked.sort_by(|a, b| b.risk.cmp(&a.risk));
    if let Some(top) = top {
        ranked.truncate(top);
    }
    ranked
}

/// One SLA table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaRow {
    pub device: String,
    pub sla: SlaStatus,
    pub confidence: f64,
    pub completeness: f64,
}

pub fn sla_table(metrics: &DeviceMetricsMap, names: &NameMaps) -> Vec<SlaRow> {
    metrics
        .iter()
        .map(|(device, m)| SlaRow {
            device: names.device_label(device).to_string(),
            sla: sla_status(m),
            confidence: m.avg_confidence,
            completeness: m.data_completeness,
        })
        .collect()
}

/// Gateway RF stability row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayRfRow {
    pub gateway_id: String,
    pub gateway: String,
    #[serde(flatten)]
    pub stats: GatewayStats,
    pub rf_unstable: bool,
}

pub fn gateway_rf_view(stats: &GatewayStatsMap, names: &NameMaps) -> Vec<GatewayRfRow> {
    stats
        .iter()
        .map(|(gateway_id, s)| GatewayRfRow {
            gateway_id: gateway_id.clone(),
            gateway: names.gateway_label(gateway_id).to_string(),
            stats: *s,
            rf_unstable: rf_unstable(s),
        })
        .collect()
}

/// Device confidence row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceRow {
    pub device: String,
    pub avg_confidence: f64,
    pub below_threshold: bool,
}

pub fn confidence_view(metrics: &DeviceMetricsMap, names: &NameMaps) -> Vec<ConfidenceRow> {
    metrics
        .iter()
        .map(|(device, m)| ConfidenceRow {
            device: names.device_label(device).to_string(),
            avg_confidence: m.avg_confidence,
            below_threshold: m.avg_confidence < SLA_MIN_CONFIDENCE,
        })
        .collect()
}
