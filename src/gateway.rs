// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-gateway RF statistics.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::index::GatewayIndex;

/// Statistics for one gateway's event group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GatewayStats {
    /// Mean event confidence, 2 decimals.
    pub avg_confidence: f64,
    /// Population std-dev of RSSI, 2 decimals; 0 with fewer than 2 samples.
    pub rssi_std: f64,
    pub event_count: usize,
}

impl GatewayStats {
    /// Compute stats for a non-empty group.
    ///
    /// # Panics
    ///
    /// Panics on an empty group; the gateway index never produces one.
    pub fn from_events(events: &[&Event]) -> Self {
        assert!(
            !events.is_empty(),
            "gateway group must contain at least one event"
        );

        let confidence_sum: f64 = events.iter().map(|e| e.confidence_score()).sum();
        let rssi: Vec<f64> = events.iter().filter_map(|e| e.rf.rssi).collect();

        Self {
            avg_confidence: round2(confidence_sum / events.len() as f64),
            rssi_std: if rssi.len() > 1 {
                round2(population_std_dev(&rssi))
            } else {
                0.0
            },
            event_count: events.len(),
        }
    }
}

/// Gateway identity -> stats, in gateway index order.
pub type GatewayStatsMap = IndexMap<String, GatewayStats>;

/// Compute stats for every gateway group. Nothing is cached.
pub fn analyze_gateways(index: &GatewayIndex<'_>) -> GatewayStatsMap {
    let stats: GatewayStatsMap = index
        .iter()
        .map(|(gateway, events)| (gateway.to_string(), GatewayStats::from_events(events)))
        .collect();
    debug!("analyzed {} gateways", stats.len());
    stats
}

/// Standard deviation with divisor N.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
