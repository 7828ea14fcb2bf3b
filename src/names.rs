// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Display names for devices and gateways.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::event::Event;

/// Prefix of generated gateway labels (`Gateway-1`, `Gateway-2`, ...).
pub const GATEWAY_LABEL_PREFIX: &str = "Gateway-";

/// Device and gateway display-name maps for one loaded event set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NameMaps {
    /// Named devices only, in order of first named sighting.
    pub devices: IndexMap<String, String>,
    /// Every gateway, in sorted identity order.
    pub gateways: IndexMap<String, String>,
}

impl NameMaps {
    /// Build both maps from the full event set.
    ///
    /// A device renamed mid-stream keeps its first position with the last
    /// non-empty name. Gateway numbering depends only on the sorted set of
    /// gateway identities, so it is stable as long as that set is.
    pub fn from_events(events: &[Event]) -> Self {
        let mut devices = IndexMap::new();
        for event in events {
            if let Some(name) = event.device.display_name() {
                devices.insert(event.dev_eui().to_string(), name.to_string());
            }
        }

        let gateway_ids: BTreeSet<&str> = events.iter().filter_map(|e| e.rf.gateway()).collect();
        let gateways = gateway_ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), format!("{}{}", GATEWAY_LABEL_PREFIX, i + 1)))
            .collect();

        Self { devices, gateways }
    }

    /// Display name of a device, falling back to its identity.
    pub fn device_label<'a>(&'a self, dev_eui: &'a str) -> &'a str {
        self.devices.get(dev_eui).map_or(dev_eui, String::as_str)
    }

    /// Display name of a gateway, falling back to its identity.
    pub fn gateway_label<'a>(&'a self, gateway_id: &'a str) -> &'a str {
        self.gateways.get(gateway_id).map_or(gateway_id, String::as_str)
    }
}
