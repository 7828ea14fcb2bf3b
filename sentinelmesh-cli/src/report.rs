// SentinelMesh CLI - Fleet reliability report
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Fleet report assembled from one event store.

use std::fmt;

use sentinelmesh::{
    analyze_gateways, gateway_rf_view, generate_insights, maintenance_priority, query_devices,
    sla_table, system_summary, DeviceFilter, EventStore, FleetSummary, GatewayRfRow,
    MaintenancePriority, SlaRow,
};
use serde::Serialize;

/// Every report section, in print order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub insights: Vec<String>,
    pub sla: Vec<SlaRow>,
    pub maintenance_priority: Vec<MaintenancePriority>,
    pub gateways: Vec<GatewayRfRow>,
    pub summary: FleetSummary,
    pub needs_maintenance: Vec<String>,
}

impl Report {
    pub fn build(store: &EventStore, top_n: usize) -> Self {
        let metrics = store.device_metrics();
        let names = store.name_maps();
        let stats = analyze_gateways(&store.gateway_index());

        Self {
            insights: generate_insights(metrics),
            sla: sla_table(metrics, &names),
            maintenance_priority: maintenance_priority(metrics, Some(top_n), true),
            gateways: gateway_rf_view(&stats, &names),
            summary: system_summary(metrics, &stats),
            needs_maintenance: query_devices(metrics, DeviceFilter::NeedsMaintenance)
                .into_iter()
                .map(|(device, _)| device.to_string())
                .collect(),
        }
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "=== {} ===", title)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "AUTOMATED INSIGHTS")?;
        for insight in &self.insights {
            writeln!(f, "- {}", insight)?;
        }

        section(f, "SLA STATUS")?;
        for row in &self.sla {
            writeln!(f, "{} {}", row.device, row.sla)?;
        }

        section(f, "MAINTENANCE PRIORITY")?;
        for entry in &self.maintenance_priority {
            writeln!(f, "{} risk = {}", entry.device, entry.risk)?;
        }

        section(f, "GATEWAY HEALTH")?;
        for row in &self.gateways {
            writeln!(
                f,
                "{} ({}) avg_confidence={:.2} rssi_std={:.2} events={}{}",
                row.gateway,
                row.gateway_id,
                row.stats.avg_confidence,
                row.stats.rssi_std,
                row.stats.event_count,
                if row.rf_unstable { " [RF UNSTABLE]" } else { "" }
            )?;
        }

        section(f, "SYSTEM SUMMARY")?;
        writeln!(f, "total_devices: {}", self.summary.total_devices)?;
        writeln!(f, "high_risk_devices: {}", self.summary.high_risk_devices)?;
        writeln!(f, "warn_devices: {}", self.summary.warn_devices)?;
        writeln!(
            f,
            "unstable_gateways: [{}]",
            self.summary.unstable_gateways.join(", ")
        )?;

        section(f, "NEEDS MAINTENANCE")?;
        for device in &self.needs_maintenance {
            writeln!(f, "{}", device)?;
        }
        Ok(())
    }
}
