// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! In-memory event store.
//!
//! Owns the ordered events of a session and one [`DeviceMetrics`] rollup per
//! device. Everything downstream borrows from here and recomputes on demand.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::error::LoadError;
use crate::event::{DeviceMetrics, EnrichedEvent, Event};
use crate::index::{build_device_index, build_gateway_index, DeviceIndex, GatewayIndex};
use crate::names::NameMaps;

/// Device identity -> rollup, in first-appearance order.
pub type DeviceMetricsMap = IndexMap<String, DeviceMetrics>;

/// Immutable event collection for one session.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
    rollups: DeviceMetricsMap,
}

impl EventStore {
    /// Build a store from wire events, keeping the first rollup seen per device.
    pub fn from_events(enriched: impl IntoIterator<Item = EnrichedEvent>) -> Self {
        let mut events = Vec::new();
        let mut rollups = DeviceMetricsMap::new();

        for EnrichedEvent {
            event,
            device_metrics,
        } in enriched
        {
            match rollups.get(event.dev_eui()) {
                Some(first) if *first != device_metrics => {
                    warn!(
                        "device {} rollup differs from its first event; keeping the first",
                        event.dev_eui()
                    );
                }
                Some(_) => {}
                None => {
                    rollups.insert(event.dev_eui().to_string(), device_metrics);
                }
            }
            events.push(event);
        }

        debug!(
            "event store: {} events, {} devices",
            events.len(),
            rollups.len()
        );
        Self { events, rollups }
    }

    /// Read newline-delimited JSON events. Blank lines are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, LoadError> {
        let mut enriched = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = EnrichedEvent::from_json(&line)
                .map_err(|source| LoadError::Json { line: i + 1, source })?;
            enriched.push(event);
        }
        Ok(Self::from_events(enriched))
    }

    /// Load a JSONL file.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let store = Self::from_reader(BufReader::new(file))?;
        info!(
            "loaded {} events for {} devices from {}",
            store.len(),
            store.device_count(),
            path.display()
        );
        Ok(store)
    }

    /// All events in arrival order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Per-device rollups.
    pub fn device_metrics(&self) -> &DeviceMetricsMap {
        &self.rollups
    }

    /// Rollup for one device.
    pub fn metrics_for(&self, dev_eui: &str) -> Option<&DeviceMetrics> {
        self.rollups.get(dev_eui)
    }

    pub fn device_index(&self) -> DeviceIndex<'_> {
        build_device_index(&self.events)
    }

    pub fn gateway_index(&self) -> GatewayIndex<'_> {
        build_gateway_index(&self.events)
    }

    pub fn name_maps(&self) -> NameMaps {
        NameMaps::from_events(&self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn device_count(&self) -> usize {
        self.rollups.len()
    }
}
