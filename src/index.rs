// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Device and gateway indexes over the loaded events.
//!
//! Both indexes borrow from the event slice and keep arrival order, both
//! between keys (first appearance) and within each group.

use indexmap::IndexMap;
use log::debug;

use crate::event::Event;

/// Device identity -> that device's events in arrival order.
pub type DeviceIndex<'a> = IndexMap<&'a str, Vec<&'a Event>>;

/// Gateway identity -> events received by that gateway in arrival order.
pub type GatewayIndex<'a> = IndexMap<&'a str, Vec<&'a Event>>;

/// Group events by device. Every event lands in exactly one group.
pub fn build_device_index(events: &[Event]) -> DeviceIndex<'_> {
    let mut index = DeviceIndex::new();
    for event in events {
        index.entry(event.dev_eui()).or_default().push(event);
    }
    debug!(
        "device index: {} devices from {} events",
        index.len(),
        events.len()
    );
    index
}

/// Group events by gateway. Events without a gateway identity are skipped.
pub fn build_gateway_index(events: &[Event]) -> GatewayIndex<'_> {
    let mut index = GatewayIndex::new();
    let mut skipped = 0usize;
    for event in events {
        match event.rf.gateway() {
            Some(gateway) => index.entry(gateway).or_default().push(event),
            None => skipped += 1,
        }
    }
    debug!(
        "gateway index: {} gateways, {} events without gateway",
        index.len(),
        skipped
    );
    index
}
